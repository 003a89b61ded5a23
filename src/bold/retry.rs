//! Retry Controller: drives bounded resubmission of one sequence and
//! classifies the terminal state.

use crate::bio::sequence::SeqRecord;
use crate::bold::client::SubmitSequence;
use crate::bold::db::Database;
use crate::bold::parse::TaxonRecord;
use crate::bold::Outcome;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum submissions per sequence before giving up.
    pub max_attempts: usize,
    /// How many top-ranked rows to keep from a match.
    pub topnum: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            topnum: 1,
        }
    }
}

/// Where a sequence ends up after the attempt loop. Every sequence reaches
/// exactly one of these; nothing is dropped without a trace.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// At least one row came back; truncated to the policy's `topnum`.
    Matched(Vec<TaxonRecord>),
    /// The service definitively answered that nothing matched.
    NoMatch,
    /// The attempt budget ran out without a definitive answer.
    Exhausted,
}

/// Run up to `max_attempts` submissions for `rec`.
///
/// NoMatch stops the loop at once: the service has answered and resubmitting
/// cannot change that. Network, submission and parse failures, and report
/// pages with an empty results table, all count against the budget and loop
/// again with no extra delay (pacing between sequences is the batch
/// runner's job).
pub fn identify(
    client: &dyn SubmitSequence,
    db: Database,
    rec: &SeqRecord,
    policy: &RetryPolicy,
) -> Verdict {
    let residues = rec.cleaned();

    for attempt in 1..=policy.max_attempts {
        if attempt >= 2 {
            info!(seqid = %rec.id, attempt, "resubmitting");
        }

        match client.submit(db, &rec.id, &residues) {
            Ok(Outcome::NoMatch) => {
                debug!(seqid = %rec.id, "no match in selected database");
                return Verdict::NoMatch;
            }
            Ok(Outcome::Matched(mut taxa)) if !taxa.is_empty() => {
                taxa.truncate(policy.topnum);
                return Verdict::Matched(taxa);
            }
            Ok(Outcome::Matched(_)) => {
                warn!(seqid = %rec.id, attempt, "report page had no result rows");
            }
            Err(e) => {
                warn!(seqid = %rec.id, attempt, error = %e, "attempt failed");
            }
        }
    }

    info!(seqid = %rec.id, attempts = policy.max_attempts, "retries exhausted");
    Verdict::Exhausted
}
