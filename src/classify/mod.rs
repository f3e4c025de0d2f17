/*! Evaluation corpus classification by Annif

The classifier itself is an external service; this module only builds requests,
reads suggestions and compares them with baseclf and the true labels.
!*/
pub mod annif;
pub mod eval;
pub mod vocab;

pub use annif::{AnnifClient, Suggest, Suggestion};
pub use eval::{ClassifyEval, EvalStats};
pub use vocab::Vocabulary;
