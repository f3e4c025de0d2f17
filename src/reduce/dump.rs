/*! Dump files

A BASE dump is a directory of `ListRecords.<n>` files, usually bzip2 compressed.
The sequence number `n` orders the files and addresses their reduced counterparts (`ReducedListRecords.<n>`).
!*/
use std::io::Read;
use std::path::{Path, PathBuf};

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use log::debug;

use crate::error::Error;

pub const DUMP_PREFIX: &str = "ListRecords";
pub const REDUCED_PREFIX: &str = "Reduced";

const BZIP2_MAGIC: &[u8] = b"BZh";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// A dump file that has a valid `ListRecords.<n>` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpFile {
    path: PathBuf,
    name: String,
    sequence: u64,
}

impl DumpFile {
    /// Identify a dump file from its path.
    ///
    /// Returns [None] if the file name is not of the `ListRecords.<n>[.ext]` form.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let mut components = file_name.split('.');
        if components.next()? != DUMP_PREFIX {
            return None;
        }
        let number = components.next()?;
        let sequence = match number.parse::<u64>() {
            Ok(n) => n,
            Err(e) => {
                debug!("{:?}: invalid sequence number: {}", path, e);
                return None;
            }
        };

        Some(Self {
            path: path.to_path_buf(),
            name: format!("{}.{}", DUMP_PREFIX, number),
            sequence,
        })
    }

    /// Get the unit name (`ListRecords.<n>`, without extensions).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the reduced file in `dst`.
    pub fn output_path(&self, dst: &Path) -> PathBuf {
        output_path(dst, &self.name)
    }

    /// Read and decompress the whole file.
    pub fn read(&self) -> Result<String, Error> {
        let bytes = std::fs::read(&self.path)?;
        let content = decompress(&bytes)?;
        debug!("decompressed {:?} ({} bytes)", self.path, content.len());
        Ok(content)
    }
}

/// Forge the reduced file path of the unit `name`.
pub fn output_path(dst: &Path, name: &str) -> PathBuf {
    dst.join(format!("{}{}", REDUCED_PREFIX, name))
}

/// Decode `bytes` into text, picking the codec from the magic bytes.
///
/// bzip2 and gzip streams may be concatenated. Anything else is taken as plain text.
pub fn decompress(bytes: &[u8]) -> Result<String, Error> {
    let mut out = String::new();
    if bytes.starts_with(BZIP2_MAGIC) {
        MultiBzDecoder::new(bytes).read_to_string(&mut out)?;
    } else if bytes.starts_with(GZIP_MAGIC) {
        MultiGzDecoder::new(bytes).read_to_string(&mut out)?;
    } else {
        out = String::from_utf8(bytes.to_vec())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    }
    Ok(out)
}

/// Inclusive range over sequence numbers. No `end` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl SequenceRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, sequence: u64) -> bool {
        sequence >= self.start && self.end.map_or(true, |end| sequence <= end)
    }
}

impl Default for SequenceRange {
    fn default() -> Self {
        Self::new(0, None)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use bzip2::write::BzEncoder;
    use flate2::write::GzEncoder;

    use super::*;

    #[test]
    fn dump_names() {
        let d = DumpFile::from_path(Path::new("/dump/ListRecords.000123.bz2")).unwrap();
        assert_eq!(d.name(), "ListRecords.000123");
        assert_eq!(d.sequence(), 123);
        assert_eq!(
            d.output_path(Path::new("/out")),
            Path::new("/out/ReducedListRecords.000123")
        );

        assert!(DumpFile::from_path(Path::new("ListRecords.7")).is_some());
        assert!(DumpFile::from_path(Path::new("ListRecords")).is_none());
        assert!(DumpFile::from_path(Path::new("ListRecords.abc.bz2")).is_none());
        assert!(DumpFile::from_path(Path::new("Other.1.bz2")).is_none());
        assert!(DumpFile::from_path(Path::new("ReducedListRecords.1")).is_none());
    }

    #[test]
    fn range() {
        let r = SequenceRange::new(2, Some(4));
        assert!(!r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(4));
        assert!(!r.contains(5));
        assert!(SequenceRange::default().contains(u64::MAX));
    }

    #[test]
    fn decompress_codecs() {
        let text = "<record>é</record>";

        let mut bz = BzEncoder::new(Vec::new(), bzip2::Compression::default());
        bz.write_all(text.as_bytes()).unwrap();
        assert_eq!(decompress(&bz.finish().unwrap()).unwrap(), text);

        let mut gz = GzEncoder::new(Vec::new(), flate2::Compression::default());
        gz.write_all(text.as_bytes()).unwrap();
        assert_eq!(decompress(&gz.finish().unwrap()).unwrap(), text);

        assert_eq!(decompress(text.as_bytes()).unwrap(), text);
        assert!(decompress(&[0xff, 0xfe, 0x00]).is_err());
    }
}
