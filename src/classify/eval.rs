/*! Evaluation corpus classification

Sends the documents of a prepared eval corpus to Annif, compares its suggestions and
the legacy baseclf labels against the true labels, and writes a per-document report:

```text
document,document_classes,baseclf_classes,annif_classes
doc1,510:530,510,510
doc2,004,NA,NA
```
Classes are DDC codes, colon-joined, `NA` when empty.
!*/
use std::fs::File;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::info;

use super::annif::{AnnifClient, Suggest};
use super::vocab::Vocabulary;
use crate::corpus::materialize::{manifest_path, EvalEntry};
use crate::corpus::PartitionKind;
use crate::error::Error;
use crate::lang::Lang;
use crate::pipeline::Pipeline;

pub const REPORT_HEADER: [&str; 4] = [
    "document",
    "document_classes",
    "baseclf_classes",
    "annif_classes",
];
const NA: &str = "NA";

/// An eval corpus document along with the Annif labels it got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub entry: EvalEntry,
    pub annif_keys: Vec<String>,
}

#[inline]
fn same_classes(a: &[String], b: &[String]) -> bool {
    a.iter().sorted_unstable().eq(b.iter().sorted_unstable())
}

#[inline]
fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 * 100.0 / total as f64 * 100.0).round() / 100.0
    }
}

/// Summary of an evaluation run.
///
/// A classification is correct when it has exactly the true classes, regardless of order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalStats {
    pub sent: usize,
    pub baseclf: usize,
    pub annif: usize,
    pub both: usize,
    pub baseclf_correct: usize,
    pub annif_correct: usize,
}

impl EvalStats {
    pub fn new(results: &[Classified]) -> Self {
        let mut stats = Self {
            sent: results.len(),
            ..Default::default()
        };
        for r in results {
            let has_baseclf = !r.entry.auto_keys.is_empty();
            let has_annif = !r.annif_keys.is_empty();
            stats.baseclf += has_baseclf as usize;
            stats.annif += has_annif as usize;
            stats.both += (has_baseclf && has_annif) as usize;
            stats.baseclf_correct +=
                same_classes(&r.entry.auto_keys, &r.entry.document_keys) as usize;
            stats.annif_correct += same_classes(&r.annif_keys, &r.entry.document_keys) as usize;
        }
        stats
    }

    pub fn log(&self) {
        info!(
            "Documents sent to Annif for classification: {}",
            self.sent
        );
        info!(
            "Number of documents with a baseclf classification: {} ({}%)",
            self.baseclf,
            percent(self.baseclf, self.sent)
        );
        info!(
            "Number of documents which could be classified by Annif: {} ({}%)",
            self.annif,
            percent(self.annif, self.sent)
        );
        info!(
            "Number of documents with both an Annif and a baseclf classification: {} ({}%)",
            self.both,
            percent(self.both, self.sent)
        );
        info!(
            "Number of documents classified correctly by baseclf (full match of all classes): {} ({}%)",
            self.baseclf_correct,
            percent(self.baseclf_correct, self.sent)
        );
        info!(
            "Number of documents classified correctly by Annif (full match of all classes): {} ({}%)",
            self.annif_correct,
            percent(self.annif_correct, self.sent)
        );
        info!(
            "baseclf success rate: {}/{} ({}%)",
            self.baseclf_correct,
            self.baseclf,
            percent(self.baseclf_correct, self.baseclf)
        );
        info!(
            "Annif success rate: {}/{} ({}%)",
            self.annif_correct,
            self.annif,
            percent(self.annif_correct, self.annif)
        );
    }
}

/// Translate labels to codes and join them, or [NA] if there are none.
fn classes_cell(labels: &[String], vocab: &Vocabulary) -> Result<String, Error> {
    if labels.is_empty() {
        return Ok(NA.to_string());
    }
    let codes = labels
        .iter()
        .map(|l| vocab.code_of(l))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(codes.join(":"))
}

/// Write the per-document report.
pub fn write_report(path: &Path, results: &[Classified], vocab: &Vocabulary) -> Result<(), Error> {
    let mut out = csv::WriterBuilder::new().from_path(path)?;
    out.write_record(REPORT_HEADER)?;
    for r in results {
        out.write_record([
            r.entry.document.clone(),
            classes_cell(&r.entry.document_keys, vocab)?,
            classes_cell(&r.entry.auto_keys, vocab)?,
            classes_cell(&r.annif_keys, vocab)?,
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Classify the first `limit` entries in manifest order, reading texts from `corpus_dir`.
pub fn classify<S: Suggest>(
    suggester: &S,
    corpus_dir: &Path,
    entries: Vec<EvalEntry>,
    limit: usize,
) -> Result<Vec<Classified>, Error> {
    let mut results = Vec::with_capacity(limit);
    for entry in entries.into_iter().take(limit) {
        let text = std::fs::read_to_string(corpus_dir.join(format!("{}.txt", entry.document)))?;
        let annif_keys = suggester.suggest_labels(&text)?;
        results.push(Classified { entry, annif_keys });

        if results.len() % 100 == 0 {
            info!(
                "{} documents processed ({}%)",
                results.len(),
                percent(results.len(), limit)
            );
        }
    }
    Ok(results)
}

pub struct ClassifyEval {
    prepared: PathBuf,
    lang: Lang,
    backend: String,
    vocab: PathBuf,
    limit: usize,
    threshold: f64,
    percentage: f64,
    url: String,
}

impl ClassifyEval {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        prepared: PathBuf,
        lang: Lang,
        backend: String,
        vocab: PathBuf,
        limit: usize,
        threshold: f64,
        percentage: f64,
        url: String,
    ) -> Self {
        Self {
            prepared,
            lang,
            backend,
            vocab,
            limit,
            threshold,
            percentage,
            url,
        }
    }

    fn lang_dir(&self) -> PathBuf {
        self.prepared.join(self.lang.as_str())
    }

    /// Path of the per-document report.
    pub fn report_path(&self) -> PathBuf {
        self.lang_dir().join(format!(
            "eval_corpus_classified_{}_{}_{}.csv",
            self.backend, self.limit, self.threshold
        ))
    }

    /// Run the evaluation with a provided suggester.
    pub fn run_with<S: Suggest>(&self, suggester: &S) -> Result<EvalStats, Error> {
        let lang_dir = self.lang_dir();
        let entries: Vec<EvalEntry> = serde_json::from_reader(std::io::BufReader::new(
            File::open(manifest_path(&lang_dir, PartitionKind::Eval))?,
        ))?;
        let vocab = Vocabulary::from_path(&self.vocab)?;

        let to_process = (entries.len() as f64 * self.percentage) as usize;
        info!(
            "Starting classification of eval corpus '{}'. Corpus consists of {} documents, {} ({}%) will be processed.",
            self.lang,
            entries.len(),
            to_process,
            self.percentage * 100.0
        );

        let results = classify(
            suggester,
            &lang_dir.join(PartitionKind::Eval.as_str()),
            entries,
            to_process,
        )?;

        info!("Processing finished, results:");
        info!(
            "Annif Settings: backend: {}, corpus language: {}, limit: {}, threshold: {}",
            self.backend, self.lang, self.limit, self.threshold
        );
        let stats = EvalStats::new(&results);
        stats.log();

        let report = self.report_path();
        write_report(&report, &results, &vocab)?;
        info!(
            "Full classification results of this run were written to {:?}",
            report
        );
        Ok(stats)
    }
}

impl Pipeline<EvalStats> for ClassifyEval {
    fn run(&self) -> Result<EvalStats, Error> {
        let client = AnnifClient::new(&self.url, &self.backend, self.limit, self.threshold)?;
        self.run_with(&client)
    }
}
