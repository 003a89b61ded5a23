pub mod batch;
pub mod classify;
pub mod client;
pub mod db;
pub mod parse;
pub mod retry;

pub use batch::{BatchConfig, BatchRunner, ResumeMode};
pub use classify::{MarkerClassifier, PostClassification, RegexClassifier, ResponseClassifier};
pub use client::{BoldClient, SubmitSequence};
pub use db::{Database, PaneType};
pub use parse::TaxonRecord;
pub use retry::{RetryPolicy, Verdict};

/// What a single submission round trip produced. Errors (network, submission,
/// parse) are reported separately through `BoldError` and are retryable;
/// both variants here are definitive answers from the service, except that
/// `Matched` with zero rows is treated as retryable by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matched(Vec<TaxonRecord>),
    NoMatch,
}
