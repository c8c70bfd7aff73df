pub mod report_writer;

pub use report_writer::{format_currency, prepare_rows, ReportWriter};
