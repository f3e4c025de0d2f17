//! Pipeline trait.
use crate::error::Error;

/// This trait must be implemented for each pipeline stage,
/// and is generic over the return type so that
/// a stage that reports something back can use the
/// trait aswell.
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
