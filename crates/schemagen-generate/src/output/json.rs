use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use schemagen_core::Value;

use crate::errors::GenerationError;
use crate::model::GenerationReport;

/// Write a dataset as JSON and return the number of bytes written. Pretty
/// output is indented with two spaces.
pub fn write_dataset_json(path: &Path, data: &Value, pretty: bool) -> Result<u64, GenerationError> {
    write_json(path, data, pretty)
}

pub fn write_report_json(path: &Path, report: &GenerationReport) -> Result<u64, GenerationError> {
    write_json(path, report, true)
}

fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<u64, GenerationError> {
    write_json_to(BufWriter::new(File::create(path)?), value, pretty)
}

/// Serialize `value` into `writer` followed by a newline and return the
/// number of bytes written.
pub(crate) fn write_json_to<W: Write, T: Serialize + ?Sized>(
    writer: W,
    value: &T,
    pretty: bool,
) -> Result<u64, GenerationError> {
    let mut counting = CountingWriter::new(writer);
    if pretty {
        serde_json::to_writer_pretty(&mut counting, value)?;
    } else {
        serde_json::to_writer(&mut counting, value)?;
    }
    counting.write_all(b"\n")?;
    counting.flush()?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_bytes_and_indents_with_two_spaces() {
        let dir = std::env::temp_dir().join(format!("schemagen_json_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("sample.json");

        let mut data = Value::object();
        if let Value::Object(fields) = &mut data {
            fields.insert("id".to_string(), Value::Int(1));
        }

        let bytes = write_dataset_json(&path, &data, true).expect("write json");
        let written = std::fs::read_to_string(&path).expect("read json");
        assert_eq!(written, "{\n  \"id\": 1\n}\n");
        assert_eq!(bytes, written.len() as u64);

        let bytes = write_dataset_json(&path, &data, false).expect("write compact json");
        assert_eq!(std::fs::read_to_string(&path).expect("read json"), "{\"id\":1}\n");
        assert_eq!(bytes, 9);

        std::fs::remove_dir_all(&dir).ok();
    }
}
