//! Batch worker: reduction of one dump file.
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use super::dump;
use super::extract::{extract, ReducedRecord};
use super::segment::records;
use crate::error::Error;

/// Decompressed content of one dump file, ready to be reduced.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub name: String,
    pub sequence: u64,
    pub content: String,
}

impl WorkUnit {
    pub fn new(name: String, sequence: u64, content: String) -> Self {
        Self {
            name,
            sequence,
            content,
        }
    }
}

/// Reduce every record of `content`, preserving their order.
pub fn reduce(content: &str) -> Vec<ReducedRecord> {
    records(content).map(extract).collect()
}

/// Writes reduced files into `dst`.
#[derive(Debug, Clone)]
pub struct BatchWorker {
    dst: PathBuf,
}

impl BatchWorker {
    pub fn new(dst: &Path) -> Self {
        Self {
            dst: dst.to_path_buf(),
        }
    }

    pub fn dst(&self) -> &Path {
        &self.dst
    }

    /// Reduce `unit` and write the result as a pretty-printed JSON array.
    ///
    /// The file is first written in a temporary file in `dst`, then renamed,
    /// so that an existing reduced file is either complete or absent.
    pub fn process(&self, unit: &WorkUnit) -> Result<PathBuf, Error> {
        let reduced = reduce(&unit.content);
        let path = dump::output_path(&self.dst, &unit.name);

        let serialized = serde_json::to_string_pretty(&reduced)?;
        let mut tmp = NamedTempFile::new_in(&self.dst)?;
        tmp.write_all(serialized.as_bytes())?;
        tmp.persist(&path)?;

        debug!(
            "{}: {} records written to {:?}",
            unit.name,
            reduced.len(),
            path
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    const DUMP: &str = "<ListRecords>
<record><metadata><dc:title>A</dc:title>
<dc:subject>X</dc:subject></metadata></record>
<record><metadata><dc:title>B1</dc:title>
<dc:title>B2</dc:title></metadata></record>
</ListRecords>";

    #[test]
    fn two_records() {
        let dst = tempdir().unwrap();
        let w = BatchWorker::new(dst.path());
        let unit = WorkUnit::new("ListRecords.1".to_string(), 1, DUMP.to_string());
        let path = w.process(&unit).unwrap();
        assert_eq!(path, dst.path().join("ReducedListRecords.1"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let expected = json!([
            {"title": ["A"], "description": [], "subject": ["X"], "classcode": [], "autoclasscode": [], "identifier": []},
            {"title": ["B1", "B2"], "description": [], "subject": [], "classcode": [], "autoclasscode": [], "identifier": []},
        ]);
        assert_eq!(written, expected);
    }

    #[test]
    fn reprocessing_is_identical() {
        let dst = tempdir().unwrap();
        let w = BatchWorker::new(dst.path());
        let unit = WorkUnit::new("ListRecords.2".to_string(), 2, DUMP.to_string());

        let path = w.process(&unit).unwrap();
        let first = std::fs::read(&path).unwrap();
        w.process(&unit).unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);

        // no temporary file left behind
        assert_eq!(std::fs::read_dir(dst.path()).unwrap().count(), 1);
    }

    #[test]
    fn non_ascii_is_kept() {
        let dst = tempdir().unwrap();
        let w = BatchWorker::new(dst.path());
        let unit = WorkUnit::new(
            "ListRecords.3".to_string(),
            3,
            "<record><dc:title>Größe</dc:title></record>".to_string(),
        );
        let path = w.process(&unit).unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("\"Größe\""));
    }

    #[test]
    fn empty_dump() {
        let dst = tempdir().unwrap();
        let w = BatchWorker::new(dst.path());
        let unit = WorkUnit::new("ListRecords.4".to_string(), 4, String::new());
        let path = w.process(&unit).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn missing_dst_fails() {
        let dst = tempdir().unwrap();
        let w = BatchWorker::new(&dst.path().join("nope"));
        let unit = WorkUnit::new("ListRecords.5".to_string(), 5, DUMP.to_string());
        assert!(w.process(&unit).is_err());
    }
}
