//! Record segmentation of decompressed dump content.
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RECORD: Regex = Regex::new(r"(?s)<record>.*?</record>").unwrap();
}

/// Iterate over the raw records of `content`, markers included.
///
/// Each record is the shortest span from a `<record>` marker to the next `</record>`,
/// possibly spanning several lines.
pub fn records(content: &str) -> impl Iterator<Item = &str> {
    RECORD.find_iter(content).map(|m| m.as_str())
}
