pub mod error;
pub mod export;
pub mod storage;

pub use error::{Error, Result};
pub use export::ExportDir;
pub use storage::{Document, DocumentFile, StagedReplace};
