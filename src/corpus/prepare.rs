//! Final corpora generation.
//!
//! For each language, the raw pool `<raw>/<lang>` is partitioned and materialized
//! into `<dst>/<lang>/{eval,test,train}` along with their manifests.
//! The eval corpus only exists to compare the new classifier against baseclf,
//! so it can be omitted with an eval ratio of 0.
use std::path::PathBuf;

use log::info;

use super::materialize::Materializer;
use super::partition::{self, Partition, PartitionKind, Ratios, Selection};
use super::pool::Pool;
use crate::error::Error;
use crate::lang::Lang;
use crate::pipeline::Pipeline;

#[inline]
fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64 * 10_000.0).round() / 100.0
    }
}

pub struct Prepare {
    raw: PathBuf,
    dst: PathBuf,
    langs: Vec<Lang>,
    ratios: Ratios,
    selection: Selection,
    clear: bool,
}

impl Prepare {
    pub fn new(
        raw: PathBuf,
        dst: PathBuf,
        langs: Vec<Lang>,
        ratios: Ratios,
        selection: Selection,
        clear: bool,
    ) -> Self {
        Self {
            raw,
            dst,
            langs,
            ratios,
            selection,
            clear,
        }
    }

    fn prepare_lang(&self, lang: Lang) -> Result<Partition, Error> {
        info!("Analyzing raw corpus '{}'...", lang);
        let pool = Pool::scan(&self.raw.join(lang.as_str()))?;
        info!(
            "Raw corpus '{}' consists of {} documents, {} have been classified by baseclf",
            lang,
            pool.len(),
            pool.auto_labeled().len()
        );

        let partition =
            partition::partition(&pool, &self.ratios, self.selection, &mut rand::thread_rng());
        let materializer = Materializer::new(&pool, &self.dst.join(lang.as_str()), self.clear);
        materializer.reset()?;

        if !partition.eval.is_empty() {
            info!(
                "Creating evaluation corpus, target size is {} documents ({} %)",
                partition.eval.len(),
                percent(partition.eval.len(), pool.len())
            );
            materializer.materialize(PartitionKind::Eval, &partition.eval)?;
            let auto_labeled = partition
                .eval
                .iter()
                .filter(|d| pool.is_auto_labeled(d))
                .count();
            info!(
                "{} out of {} documents in the evaluation corpus have been classified by baseclf",
                auto_labeled,
                partition.eval.len()
            );
        }

        if !partition.test.is_empty() {
            info!(
                "Creating test corpus, target size is {} documents ({} %)",
                partition.test.len(),
                percent(partition.test.len(), pool.len())
            );
            materializer.materialize(PartitionKind::Test, &partition.test)?;
        }

        info!(
            "Creating training corpus, target size is {} documents",
            partition.train.len()
        );
        materializer.materialize(PartitionKind::Train, &partition.train)?;

        Ok(partition)
    }
}

impl Pipeline<Vec<(Lang, Partition)>> for Prepare {
    fn run(&self) -> Result<Vec<(Lang, Partition)>, Error> {
        let mut partitions = Vec::with_capacity(self.langs.len());
        for lang in &self.langs {
            partitions.push((*lang, self.prepare_lang(*lang)?));
        }
        Ok(partitions)
    }
}
