//! DDC vocabulary.
//!
//! Loaded from a tab-separated file with one `code<TAB>label` entry per line.
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::Error;

/// Bidirectional mapping between class codes and class labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    codes: HashMap<String, String>,
    labels: HashMap<String, String>,
}

impl Vocabulary {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut tsv = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let mut vocab = Self::default();
        for (idx, row) in tsv.records().enumerate() {
            let row = row?;
            match (row.get(0), row.get(1)) {
                (Some(code), Some(label)) => vocab.insert(code, label),
                _ => {
                    return Err(Error::Custom(format!(
                        "vocabulary line {} has less than two columns",
                        idx + 1
                    )))
                }
            }
        }
        Ok(vocab)
    }

    fn insert(&mut self, code: &str, label: &str) {
        self.codes.insert(label.to_string(), code.to_string());
        self.labels.insert(code.to_string(), label.to_string());
    }

    /// Get the code of `label`.
    pub fn code_of(&self, label: &str) -> Result<&str, Error> {
        self.codes
            .get(label)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownLabel(label.to_string()))
    }

    /// Get the label of `code`.
    pub fn label_of(&self, code: &str) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
