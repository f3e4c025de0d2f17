//! # basecorp
//!
//! Tooling to turn BASE OAI-PMH dumps into DDC training corpora for Annif.
//!
//! This crate can be used both as a tool (see the `basecorp` binary),
//! or as a lib to integrate reduction and corpus preparation into other projects.
//!
//! The main steps are:
//!
//! - [reduce]: extract a handful of fields from every record of the dump files, in parallel.
//! - [corpus]: split a raw document pool into disjoint eval/test/train corpora.
//! - [classify]: send an eval corpus to Annif and compare the results with baseclf.
//! - [stats]: merge statistics files of independent runs and derive reports.
pub mod classify;
pub mod corpus;
pub mod error;
pub mod lang;
pub mod pipeline;
pub mod reduce;
pub mod stats;
