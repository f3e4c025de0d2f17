/*! Corpus partitioning

Splits a [Pool] into disjoint eval, test and train subsets.

1. The eval subset has `round(pool size × eval ratio)` documents, capped by the number of auto-labeled documents.
   In [Selection::Random] mode it is sampled from the whole pool, in [Selection::NonRandom] mode only from auto-labeled documents.
1. The test subset has `round(remaining × test ratio)` documents, sampled from what is left after eval removal.
1. Everything else goes into train.

Sampling is uniform without replacement from the provided rng, so runs differ unless the rng is seeded.
Rounding is half to even.
!*/
use std::collections::HashSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use super::pool::Pool;
use crate::error::Error;

/// How the eval subset is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Uniformly from the whole pool.
    Random,
    /// Uniformly from auto-labeled documents only.
    NonRandom,
}

/// Validated eval/test ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratios {
    eval: f64,
    test: f64,
}

impl Ratios {
    /// Each ratio must be in `[0, 1]` and their sum must not exceed 1.
    pub fn new(eval: f64, test: f64) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&test) {
            return Err(Error::Config(
                "test ratio (-t) must be a float from 0.0 to 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&eval) {
            return Err(Error::Config(
                "eval ratio (-e) must be a float from 0.0 to 1.0".to_string(),
            ));
        }
        if eval + test > 1.0 {
            return Err(Error::Config(
                "the sum of eval ratio (-e) and test ratio (-t) may not exceed 1.0".to_string(),
            ));
        }
        Ok(Self { eval, test })
    }

    pub fn eval(&self) -> f64 {
        self.eval
    }

    pub fn test(&self) -> f64 {
        self.test
    }
}

/// One of the three partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionKind {
    Eval,
    Test,
    Train,
}

impl PartitionKind {
    pub const ALL: [PartitionKind; 3] = [PartitionKind::Eval, PartitionKind::Test, PartitionKind::Train];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionKind::Eval => "eval",
            PartitionKind::Test => "test",
            PartitionKind::Train => "train",
        }
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a partitioning run.
///
/// `eval` and `test` are in sampling order, `train` keeps the pool order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub eval: Vec<String>,
    pub test: Vec<String>,
    pub train: Vec<String>,
}

impl Partition {
    pub fn get(&self, kind: PartitionKind) -> &[String] {
        match kind {
            PartitionKind::Eval => &self.eval,
            PartitionKind::Test => &self.test,
            PartitionKind::Train => &self.train,
        }
    }

    pub fn len(&self) -> usize {
        self.eval.len() + self.test.len() + self.train.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[inline]
fn target_size(size: usize, ratio: f64) -> usize {
    (size as f64 * ratio).round_ties_even() as usize
}

/// Target size of the eval subset.
pub fn eval_size(pool: &Pool, ratios: &Ratios) -> usize {
    target_size(pool.len(), ratios.eval()).min(pool.auto_labeled().len())
}

/// Target size of the test subset, given the number of documents left after eval removal.
pub fn test_size(remaining: usize, ratios: &Ratios) -> usize {
    target_size(remaining, ratios.test()).min(remaining)
}

/// Partition `pool`.
pub fn partition<R: Rng + ?Sized>(
    pool: &Pool,
    ratios: &Ratios,
    selection: Selection,
    rng: &mut R,
) -> Partition {
    let eval_size = eval_size(pool, ratios);
    let candidates: Vec<&String> = match selection {
        Selection::NonRandom => pool.auto_labeled().iter().collect(),
        Selection::Random => pool.iter().collect(),
    };
    let eval: Vec<String> = candidates
        .choose_multiple(rng, eval_size)
        .map(|b| (*b).clone())
        .collect();

    let taken: HashSet<&str> = eval.iter().map(String::as_str).collect();
    let remaining: Vec<&String> = pool.iter().filter(|b| !taken.contains(b.as_str())).collect();

    let test_size = test_size(remaining.len(), ratios);
    let test: Vec<String> = remaining
        .choose_multiple(rng, test_size)
        .map(|b| (*b).clone())
        .collect();

    let taken: HashSet<&str> = test.iter().map(String::as_str).collect();
    let train = remaining
        .into_iter()
        .filter(|b| !taken.contains(b.as_str()))
        .cloned()
        .collect();

    Partition { eval, test, train }
}
