pub mod document;
pub mod loaders;
pub mod record;

pub use document::DocumentHandle;
pub use loaders::{load_all_documents, load_all_pdfs, load_document};
pub use record::{ExtractionRecord, FieldValue, NOT_AVAILABLE};
