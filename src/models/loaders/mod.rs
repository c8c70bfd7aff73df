pub mod pdf_loader;

pub use pdf_loader::{load_all_documents, load_all_pdfs, load_document};
