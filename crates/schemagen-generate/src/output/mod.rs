pub mod json;
pub mod zip;

pub use json::{write_dataset_json, write_report_json};
pub use self::zip::{ARCHIVE_FILE, write_datasets_zip};
