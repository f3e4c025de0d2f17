/*! Corpus materialization

Builds `<lang dir>/<kind>/` as a folder of symbolic links to the text and key files of the raw pool,
then writes the partition manifest next to it:
- `eval_corpus.json`: one [EvalEntry] per document,
- `test_corpus.csv`/`train_corpus.csv`: a document column and empty `annif_class_*` columns, filled later.

[Materializer::reset] is called once before any partition is materialized. It either clears
every partition of the language or refuses to touch a language that already holds a corpus.
Links are created before the manifest is written: a collision aborts the run without touching the manifest.
Links created before the collision are not rolled back.
!*/
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::partition::PartitionKind;
use super::pool::{self, Pool, AUTOKEY_EXT, KEY_EXT, TEXT_EXT};
use crate::error::Error;

pub const EVAL_MANIFEST: &str = "eval_corpus.json";
pub const TRAIN_TEST_HEADER: [&str; 3] = ["document", "annif_class_1", "annif_class_2"];

/// Metadata of an eval corpus document.
///
/// Fields are in alphabetical order, which is the serialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalEntry {
    /// Labels from the legacy classifier. Empty if the document has none.
    pub auto_keys: Vec<String>,
    pub document: String,
    /// True labels.
    pub document_keys: Vec<String>,
}

/// Path of the manifest of `kind` in `lang_dir`.
pub fn manifest_path(lang_dir: &Path, kind: PartitionKind) -> PathBuf {
    match kind {
        PartitionKind::Eval => lang_dir.join(EVAL_MANIFEST),
        kind => lang_dir.join(format!("{}_corpus.csv", kind)),
    }
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}

/// Remove every entry of `dir`, keeping `dir` itself.
fn clear_directory(dir: &Path) -> Result<(), Error> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Materializes the partitions of one language.
pub struct Materializer<'a> {
    pool: &'a Pool,
    lang_dir: PathBuf,
    clear: bool,
}

impl<'a> Materializer<'a> {
    pub fn new(pool: &'a Pool, lang_dir: &Path, clear: bool) -> Self {
        Self {
            pool,
            lang_dir: lang_dir.to_path_buf(),
            clear,
        }
    }

    /// Get the existing state of every partition out of the way.
    ///
    /// With clearing, every partition folder is emptied and every manifest removed,
    /// including those of partitions that end up empty in this run.
    /// Without it, any existing link or manifest is a [Error::Collision].
    /// Nothing is modified in the latter case.
    pub fn reset(&self) -> Result<(), Error> {
        for kind in PartitionKind::ALL {
            let dir = self.lang_dir.join(kind.as_str());
            let manifest = manifest_path(&self.lang_dir, kind);
            if self.clear {
                if dir.is_dir() {
                    info!("Deleting old {} corpus...", kind);
                    clear_directory(&dir)?;
                }
                if manifest.is_file() {
                    std::fs::remove_file(&manifest)?;
                }
                continue;
            }

            if dir.is_dir() {
                if let Some(entry) = std::fs::read_dir(&dir)?.next() {
                    return Err(Error::Collision { path: entry?.path() });
                }
            }
            if manifest.exists() {
                return Err(Error::Collision { path: manifest });
            }
        }
        Ok(())
    }

    fn prepare_dir(&self, kind: PartitionKind) -> Result<PathBuf, Error> {
        let dir = self.lang_dir.join(kind.as_str());
        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }

    /// Link the text and key files of each document into the partition folder.
    fn link_documents(&self, dir: &Path, documents: &[String]) -> Result<(), Error> {
        let root = std::fs::canonicalize(self.pool.root())?;
        for document in documents {
            for ext in [TEXT_EXT, KEY_EXT] {
                let file_name = format!("{}.{}", document, ext);
                let link = dir.join(&file_name);
                match symlink(&root.join(&file_name), &link) {
                    Ok(()) => (),
                    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                        return Err(Error::Collision { path: link });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        debug!("linked {} documents into {:?}", documents.len(), dir);
        Ok(())
    }

    fn eval_entry(&self, document: &str) -> Result<EvalEntry, Error> {
        let autokey_path = self.pool.artifact(document, AUTOKEY_EXT);
        let auto_keys = if autokey_path.is_file() {
            pool::read_keys(&autokey_path)?
        } else {
            Vec::new()
        };
        let document_keys = pool::read_keys(&self.pool.artifact(document, KEY_EXT))?;

        Ok(EvalEntry {
            auto_keys,
            document: document.to_string(),
            document_keys,
        })
    }

    fn write_eval_manifest(&self, entries: &[EvalEntry]) -> Result<PathBuf, Error> {
        let path = manifest_path(&self.lang_dir, PartitionKind::Eval);
        let mut f = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut f, entries)?;
        f.flush()?;
        Ok(path)
    }

    fn write_csv_manifest(
        &self,
        kind: PartitionKind,
        documents: &[String],
    ) -> Result<PathBuf, Error> {
        let path = manifest_path(&self.lang_dir, kind);
        let mut out = csv::WriterBuilder::new().from_path(&path)?;
        out.write_record(TRAIN_TEST_HEADER)?;
        for document in documents {
            out.write_record([document.as_str(), "", ""])?;
        }
        out.flush()?;
        Ok(path)
    }

    /// Materialize `documents` as the `kind` partition, returning the manifest path.
    pub fn materialize(&self, kind: PartitionKind, documents: &[String]) -> Result<PathBuf, Error> {
        let dir = self.prepare_dir(kind)?;

        // gather eval metadata first so that a missing key file fails before linking
        let entries = match kind {
            PartitionKind::Eval => documents
                .iter()
                .map(|d| self.eval_entry(d))
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        self.link_documents(&dir, documents)?;

        let manifest = match kind {
            PartitionKind::Eval => self.write_eval_manifest(&entries)?,
            kind => self.write_csv_manifest(kind, documents)?,
        };
        debug!("{} manifest written to {:?}", kind, manifest);
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::{tempdir, TempDir};

    use super::*;

    /// raw pool with `a` (auto-labeled) and `b`.
    fn raw_pool() -> (TempDir, Pool) {
        let dir = tempdir().unwrap();
        let files = [
            ("a.txt", "text a"),
            ("a.key", "Mathematics\n"),
            ("a.autokey", "Physics\nMathematics\n"),
            ("b.txt", "text b"),
            ("b.key", "Computer science\n"),
        ];
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let pool = Pool::scan(dir.path()).unwrap();
        (dir, pool)
    }

    #[test]
    fn eval_corpus() {
        let (_raw, pool) = raw_pool();
        let dst = tempdir().unwrap();
        let m = Materializer::new(&pool, dst.path(), false);
        let docs = vec!["a".to_string(), "b".to_string()];
        let manifest = m.materialize(PartitionKind::Eval, &docs).unwrap();
        assert_eq!(manifest, dst.path().join("eval_corpus.json"));

        let linked = dst.path().join("eval/a.txt");
        assert!(std::fs::symlink_metadata(&linked)
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(std::fs::read_to_string(linked).unwrap(), "text a");
        assert!(dst.path().join("eval/b.key").exists());

        let entries: Vec<EvalEntry> =
            serde_json::from_reader(File::open(manifest).unwrap()).unwrap();
        assert_eq!(
            entries,
            vec![
                EvalEntry {
                    auto_keys: vec!["Physics".to_string(), "Mathematics".to_string()],
                    document: "a".to_string(),
                    document_keys: vec!["Mathematics".to_string()],
                },
                EvalEntry {
                    auto_keys: vec![],
                    document: "b".to_string(),
                    document_keys: vec!["Computer science".to_string()],
                },
            ]
        );
    }

    #[test]
    fn train_corpus_csv() {
        let (_raw, pool) = raw_pool();
        let dst = tempdir().unwrap();
        let m = Materializer::new(&pool, dst.path(), false);
        let manifest = m
            .materialize(PartitionKind::Train, &["b".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(manifest, dst.path().join("train_corpus.csv"));
        assert_eq!(
            std::fs::read_to_string(manifest).unwrap(),
            "document,annif_class_1,annif_class_2\nb,,\na,,\n"
        );
        assert_eq!(std::fs::read_dir(dst.path().join("train")).unwrap().count(), 4);
    }

    #[test]
    fn collision_keeps_manifest() {
        let (_raw, pool) = raw_pool();
        let dst = tempdir().unwrap();
        let docs = vec!["b".to_string()];
        Materializer::new(&pool, dst.path(), false)
            .materialize(PartitionKind::Test, &docs)
            .unwrap();
        let manifest = dst.path().join("test_corpus.csv");
        let before = std::fs::read_to_string(&manifest).unwrap();

        let other = vec!["a".to_string(), "b".to_string()];
        let err = Materializer::new(&pool, dst.path(), false)
            .materialize(PartitionKind::Test, &other)
            .unwrap_err();
        match err {
            Error::Collision { path } => assert_eq!(path, dst.path().join("test/b.txt")),
            e => panic!("unexpected error {:?}", e),
        }
        assert_eq!(std::fs::read_to_string(&manifest).unwrap(), before);
    }

    #[test]
    fn clear_replaces_corpus() {
        let (_raw, pool) = raw_pool();
        let dst = tempdir().unwrap();
        Materializer::new(&pool, dst.path(), false)
            .materialize(PartitionKind::Test, &["a".to_string()])
            .unwrap();
        let m = Materializer::new(&pool, dst.path(), true);
        m.reset().unwrap();
        m.materialize(PartitionKind::Test, &["b".to_string()])
            .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dst.path().join("test"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["b.key", "b.txt"]);
    }

    #[test]
    fn reset_refuses_existing_corpus() {
        let (_raw, pool) = raw_pool();
        let dst = tempdir().unwrap();
        let m = Materializer::new(&pool, dst.path(), false);
        m.reset().unwrap();
        m.materialize(PartitionKind::Eval, &["a".to_string()])
            .unwrap();
        let manifest = std::fs::read_to_string(dst.path().join("eval_corpus.json")).unwrap();

        // a different document would not collide on its own file names
        match Materializer::new(&pool, dst.path(), false).reset() {
            Err(Error::Collision { path }) => assert!(path.starts_with(dst.path().join("eval"))),
            r => panic!("expected a collision, got {:?}", r),
        }
        assert_eq!(
            std::fs::read_to_string(dst.path().join("eval_corpus.json")).unwrap(),
            manifest
        );
        assert_eq!(std::fs::read_dir(dst.path().join("eval")).unwrap().count(), 2);
    }

    #[test]
    fn reset_refuses_lone_manifest() {
        let (_raw, pool) = raw_pool();
        let dst = tempdir().unwrap();
        std::fs::write(dst.path().join("test_corpus.csv"), "document\n").unwrap();
        match Materializer::new(&pool, dst.path(), false).reset() {
            Err(Error::Collision { path }) => {
                assert_eq!(path, dst.path().join("test_corpus.csv"))
            }
            r => panic!("expected a collision, got {:?}", r),
        }
    }

    #[test]
    fn reset_clears_every_partition() {
        let (_raw, pool) = raw_pool();
        let dst = tempdir().unwrap();
        let m = Materializer::new(&pool, dst.path(), false);
        m.materialize(PartitionKind::Eval, &["a".to_string()])
            .unwrap();
        m.materialize(PartitionKind::Test, &["b".to_string()])
            .unwrap();

        Materializer::new(&pool, dst.path(), true).reset().unwrap();
        for kind in PartitionKind::ALL {
            assert!(!manifest_path(dst.path(), kind).exists());
        }
        assert_eq!(std::fs::read_dir(dst.path().join("eval")).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(dst.path().join("test")).unwrap().count(), 0);
        assert!(!dst.path().join("train").exists());
    }
}
