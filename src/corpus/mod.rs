/*! Corpus preparation

Partitions a raw per-language document pool into eval/test/train corpora and materializes them
using symbolic links rather than copies.
!*/
pub mod materialize;
pub mod partition;
pub mod pool;
mod prepare;

pub use materialize::{EvalEntry, Materializer};
pub use partition::{partition, Partition, PartitionKind, Ratios, Selection};
pub use pool::Pool;
pub use prepare::Prepare;
