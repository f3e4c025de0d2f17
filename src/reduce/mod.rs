/*! Record reduction

Turns a BASE dump (a folder of compressed `ListRecords` files) into reduced records:
one JSON array of six-field records per dump file.
!*/
pub mod dump;
pub mod extract;
mod pipeline;
pub mod scheduler;
pub mod segment;
pub mod worker;

pub use extract::{extract, Field, ReducedRecord};
pub use pipeline::Reduce;
pub use scheduler::{Report, Scheduler, Worker};
pub use worker::{BatchWorker, WorkUnit};
