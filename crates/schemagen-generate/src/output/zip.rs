use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};

use crate::errors::GenerationError;
use crate::output::json::write_json_to;
use crate::routine::Dataset;

/// Archive written instead of individual files when zip output is on.
pub const ARCHIVE_FILE: &str = "data.zip";

/// Write every dataset as a deflated `<name>.json` entry of one archive.
///
/// Entries use the same serializer as [`super::write_dataset_json`]. The
/// returned counts are the uncompressed entry sizes, in dataset order.
pub fn write_datasets_zip(
    path: &Path,
    datasets: &[Dataset],
    pretty: bool,
) -> Result<Vec<u64>, GenerationError> {
    let mut archive = ZipWriter::new(BufWriter::new(File::create(path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut sizes = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        archive.start_file(format!("{}.json", dataset.name), options)?;
        sizes.push(write_json_to(&mut archive, &dataset.data, pretty)?);
    }

    let mut writer = archive.finish()?;
    writer.flush()?;
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use schemagen_core::Value;

    use super::*;

    #[test]
    fn entries_match_the_plain_json_export() {
        let dir = std::env::temp_dir().join(format!("schemagen_zip_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(ARCHIVE_FILE);

        let datasets = [
            Dataset::new("Numbers", Value::Array(vec![Value::Int(1), Value::Int(2)])),
            Dataset::new("Label", Value::from("x")),
        ];
        let sizes = write_datasets_zip(&path, &datasets, true).expect("write archive");

        let mut archive = ::zip::ZipArchive::new(File::open(&path).expect("open archive"))
            .expect("read archive");
        assert_eq!(archive.len(), 2);

        let mut numbers = String::new();
        archive
            .by_name("Numbers.json")
            .expect("numbers entry")
            .read_to_string(&mut numbers)
            .expect("read entry");
        assert_eq!(numbers, "[\n  1,\n  2\n]\n");
        assert_eq!(sizes, [numbers.len() as u64, 4]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
