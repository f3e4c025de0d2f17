/*! Run statistics

Statistics files from independent runs are merged into one accumulator tree, which summary reports are derived from.
!*/
pub mod accumulator;
pub mod summarize;

pub use accumulator::Node;
pub use summarize::Summarize;
