//! Field extraction.
//!
//! Extraction is pattern based: each tracked field has an opening/closing tag pair
//! and every non-greedy match between them is kept verbatim, in document order.
//! No markup parsing and no unescaping happen here, so malformed or overlapping markup
//! yields exactly what the patterns capture.
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"<dc:title>(.*?)</dc:title>").unwrap();
    static ref DESCRIPTION: Regex =
        Regex::new(r"<dc:description>(.*?)</dc:description>").unwrap();
    static ref SUBJECT: Regex = Regex::new(r"<dc:subject>(.*?)</dc:subject>").unwrap();
    static ref CLASSCODE: Regex =
        Regex::new(r#"<base_dc:classcode type="ddc">(.*?)</base_dc:classcode>"#).unwrap();
    static ref AUTOCLASSCODE: Regex =
        Regex::new(r#"<base_dc:autoclasscode type="ddc">(.*?)</base_dc:autoclasscode>"#)
            .unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"<identifier>(.*?)</identifier>").unwrap();
}

/// Fields tracked in a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Subject,
    ClassCode,
    AutoClassCode,
    Identifier,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::Description,
        Field::Subject,
        Field::ClassCode,
        Field::AutoClassCode,
        Field::Identifier,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            Field::Title => &*TITLE,
            Field::Description => &*DESCRIPTION,
            Field::Subject => &*SUBJECT,
            Field::ClassCode => &*CLASSCODE,
            Field::AutoClassCode => &*AUTOCLASSCODE,
            Field::Identifier => &*IDENTIFIER,
        }
    }

    /// Get every occurrence of the field in `record`, in order.
    pub fn capture(&self, record: &str) -> Vec<String> {
        self.pattern()
            .captures_iter(record)
            .map(|c| c[1].to_string())
            .collect()
    }
}

/// Six-field extraction of a single raw record.
///
/// Field order is the serialization order of reduced files.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedRecord {
    pub title: Vec<String>,
    pub description: Vec<String>,
    pub subject: Vec<String>,
    pub classcode: Vec<String>,
    pub autoclasscode: Vec<String>,
    pub identifier: Vec<String>,
}

impl ReducedRecord {
    /// Get a reference to the values of `field`.
    pub fn get(&self, field: Field) -> &[String] {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Subject => &self.subject,
            Field::ClassCode => &self.classcode,
            Field::AutoClassCode => &self.autoclasscode,
            Field::Identifier => &self.identifier,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut Vec<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Subject => &mut self.subject,
            Field::ClassCode => &mut self.classcode,
            Field::AutoClassCode => &mut self.autoclasscode,
            Field::Identifier => &mut self.identifier,
        }
    }
}

/// Extract the tracked fields of one raw record.
pub fn extract(record: &str) -> ReducedRecord {
    let mut reduced = ReducedRecord::default();
    for field in Field::ALL {
        *reduced.get_mut(field) = field.capture(record);
    }
    reduced
}
