/*! Raw corpus pool

A pool is one folder per language, holding for each document `<name>`:
- `<name>.txt`: full text
- `<name>.key`: true labels, one per line
- `<name>.autokey` (optional): labels assigned by the legacy classifier (baseclf), one per line

Presence of the `.autokey` file is the only signal that a document has been auto-classified.
!*/
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Error;

pub const TEXT_EXT: &str = "txt";
pub const KEY_EXT: &str = "key";
pub const AUTOKEY_EXT: &str = "autokey";

/// Documents of a raw corpus pool, split by auto-label presence.
///
/// Both sets are sorted and disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    root: PathBuf,
    auto_labeled: BTreeSet<String>,
    unlabeled: BTreeSet<String>,
}

impl Pool {
    /// Scan `root`, collecting document basenames (file names without their last extension).
    pub fn scan(root: &Path) -> Result<Self, Error> {
        let mut auto_labeled = BTreeSet::new();
        let mut unlabeled = BTreeSet::new();

        for (count, entry) in std::fs::read_dir(root)?.enumerate() {
            if count % 10_000 == 0 {
                info!("{} files", count);
            }
            let path = entry?.path();
            let basename = match path.file_stem().and_then(|s| s.to_str()) {
                Some(b) => b.to_string(),
                None => continue,
            };
            if auto_labeled.contains(&basename) || unlabeled.contains(&basename) {
                continue;
            }
            if artifact(root, &basename, AUTOKEY_EXT).is_file() {
                auto_labeled.insert(basename);
            } else {
                unlabeled.insert(basename);
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            auto_labeled,
            unlabeled,
        })
    }

    /// Build a pool from already known basenames.
    pub fn from_parts<I, J>(root: &Path, auto_labeled: I, unlabeled: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        let auto_labeled: BTreeSet<String> = auto_labeled.into_iter().collect();
        let unlabeled = unlabeled
            .into_iter()
            .filter(|b| !auto_labeled.contains(b))
            .collect();
        Self {
            root: root.to_path_buf(),
            auto_labeled,
            unlabeled,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.auto_labeled.len() + self.unlabeled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn auto_labeled(&self) -> &BTreeSet<String> {
        &self.auto_labeled
    }

    pub fn unlabeled(&self) -> &BTreeSet<String> {
        &self.unlabeled
    }

    pub fn is_auto_labeled(&self, basename: &str) -> bool {
        self.auto_labeled.contains(basename)
    }

    /// Iterate over every basename: unlabeled ones first, then auto-labeled ones.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.unlabeled.iter().chain(self.auto_labeled.iter())
    }

    /// Path of the `ext` artifact of `basename`.
    pub fn artifact(&self, basename: &str, ext: &str) -> PathBuf {
        artifact(&self.root, basename, ext)
    }
}

fn artifact(root: &Path, basename: &str, ext: &str) -> PathBuf {
    root.join(format!("{}.{}", basename, ext))
}

/// Read a label file, one label per line.
pub fn read_keys(path: &Path) -> Result<Vec<String>, Error> {
    let f = BufReader::new(File::open(path)?);
    f.lines().map(|line| line.map_err(Error::from)).collect()
}
