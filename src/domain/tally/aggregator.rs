//! Tally Aggregator - full recount of a ballot from its casts.
//!
//! Counts are never bumped incrementally. Every cast and every close
//! recomputes the tally from the complete cast set against the cohort
//! as it is *now*, so a changed choice or a changed cohort can never
//! leave the counters out of step.

use std::collections::HashMap;

use crate::domain::foundation::UserId;

use super::{CastVote, Choice, Cohort, Tally, TallySnapshot};

/// Stateless recount service.
pub struct TallyAggregator;

impl TallyAggregator {
    /// Recomputes `{for, against, abstain, absent}` for a ballot.
    ///
    /// - Only the latest cast per voter is effective.
    /// - Casts from users outside the cohort are ignored.
    /// - `absent = cohort size - distinct effective voters`, so the four
    ///   counters always sum to the cohort size.
    pub fn recount(casts: &[CastVote], cohort: &Cohort) -> Tally {
        let mut effective: HashMap<&UserId, &CastVote> = HashMap::new();
        for cast in casts.iter().filter(|c| cohort.contains(&c.voter_id)) {
            match effective.get(&cast.voter_id) {
                Some(existing) if existing.cast_at > cast.cast_at => {}
                _ => {
                    effective.insert(&cast.voter_id, cast);
                }
            }
        }

        let mut tally = Tally::default();
        for cast in effective.values() {
            match cast.choice {
                Choice::For => tally.for_count += 1,
                Choice::Against => tally.against += 1,
                Choice::Abstain => tally.abstain += 1,
            }
        }
        tally.absent = cohort.size().saturating_sub(effective.len() as u32);
        tally
    }

    /// Recounts and wraps the result with the cohort figures the
    /// evaluator needs.
    pub fn snapshot(casts: &[CastVote], cohort: &Cohort) -> TallySnapshot {
        TallySnapshot::new(
            cohort.size(),
            cohort.online_count(),
            Self::recount(casts, cohort),
        )
    }
}
