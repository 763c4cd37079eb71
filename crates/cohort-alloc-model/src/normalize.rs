// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Availability Normalizer
//!
//! Turns raw poll responses into the engine's availability structures.
//!
//! Participants are kept only if at least one of their *raw* intervals is as
//! long as the meeting block. Overlapping or touching raw intervals are not
//! merged first, so two adjacent 30 minute blocks do not add up to an hour.
//! Facilitators are never filtered; their availability is checked slot by
//! slot during candidate generation.

use crate::{
    availability::{AvailabilitySet, RawResponse},
    err::ProblemBuildError,
    facilitator::{Facilitator, Roster},
    id::{FacilitatorId, ParticipantId, Track},
};
use cohort_alloc_core::{SolverVariable, time::TimeDelta};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Result of normalizing the participant poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAvailability<T: SolverVariable> {
    available: AvailabilitySet<T>,
    unavailable: Vec<ParticipantId>,
}

impl<T: SolverVariable> NormalizedAvailability<T> {
    #[inline]
    pub fn available(&self) -> &AvailabilitySet<T> {
        &self.available
    }

    /// Responders without a single block long enough for a meeting, in poll order.
    #[inline]
    pub fn unavailable(&self) -> &[ParticipantId] {
        &self.unavailable
    }

    #[inline]
    pub fn into_parts(self) -> (AvailabilitySet<T>, Vec<ParticipantId>) {
        (self.available, self.unavailable)
    }
}

/// Capacity and optional track for a facilitator, keyed by poll name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilitatorTerms {
    pub capacity: u32,
    pub track: Option<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTermsError {
    facilitator: FacilitatorId,
}

impl MissingTermsError {
    #[inline]
    pub fn facilitator(&self) -> &FacilitatorId {
        &self.facilitator
    }
}

impl std::fmt::Display for MissingTermsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No capacity given for {}", self.facilitator)
    }
}

impl std::error::Error for MissingTermsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError<T: SolverVariable> {
    Build(ProblemBuildError<T>),
    MissingTerms(MissingTermsError),
}

impl<T: SolverVariable> std::fmt::Display for NormalizeError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::Build(e) => write!(f, "{e}"),
            NormalizeError::MissingTerms(e) => write!(f, "{e}"),
        }
    }
}

impl<T: SolverVariable> std::error::Error for NormalizeError<T> {}

impl<T: SolverVariable> From<ProblemBuildError<T>> for NormalizeError<T> {
    fn from(value: ProblemBuildError<T>) -> Self {
        NormalizeError::Build(value)
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer<T: SolverVariable> {
    time_block: TimeDelta<T>,
    skip: HashSet<String>,
}

impl<T: SolverVariable> Normalizer<T> {
    #[inline]
    pub fn new(time_block: TimeDelta<T>) -> Self {
        Self {
            time_block,
            skip: HashSet::new(),
        }
    }

    /// Responders to drop before any filtering, e.g. test entries.
    pub fn with_skip_list<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(names.into_iter().map(Into::into));
        self
    }

    #[inline]
    pub fn time_block(&self) -> TimeDelta<T> {
        self.time_block
    }

    pub fn normalize_participants(
        &self,
        raw: &[RawResponse<T>],
    ) -> Result<NormalizedAvailability<T>, ProblemBuildError<T>> {
        let mut available = AvailabilitySet::new();
        let mut unavailable = Vec::new();

        for response in raw {
            if self.skip.contains(response.name()) {
                debug!(name = response.name(), "Skipping responder");
                continue;
            }
            let long_enough = response
                .intervals()
                .iter()
                .any(|i| i.duration() >= self.time_block);
            let id = ParticipantId::new(response.name());
            if available.contains(id.as_str()) || unavailable.contains(&id) {
                return Err(ProblemBuildError::DuplicateParticipant(id));
            }
            if long_enough {
                available.insert(id, response.intervals().to_vec())?;
            } else {
                unavailable.push(id);
            }
        }

        debug!(
            available = available.len(),
            unavailable = unavailable.len(),
            "Normalized participant availability"
        );
        Ok(NormalizedAvailability {
            available,
            unavailable,
        })
    }

    /// Builds the roster in poll order; every responder needs an entry in `terms`.
    pub fn normalize_facilitators(
        &self,
        raw: &[RawResponse<T>],
        terms: &HashMap<String, FacilitatorTerms>,
    ) -> Result<Roster<T>, NormalizeError<T>> {
        let mut roster = Roster::new();
        for response in raw {
            if self.skip.contains(response.name()) {
                debug!(name = response.name(), "Skipping facilitator");
                continue;
            }
            let t = terms.get(response.name()).ok_or_else(|| {
                NormalizeError::MissingTerms(MissingTermsError {
                    facilitator: FacilitatorId::new(response.name()),
                })
            })?;
            let mut f = Facilitator::new(
                response.name(),
                response.intervals().to_vec(),
                t.capacity,
            );
            if let Some(track) = &t.track {
                f = f.with_track(track.clone());
            }
            roster.push(f)?;
        }
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_alloc_core::time::{TimeInterval, TimePoint};

    fn ti(a: i64, b: i64) -> TimeInterval<i64> {
        TimeInterval::new(TimePoint::new(a), TimePoint::new(b))
    }

    #[test]
    fn test_short_responder_is_unavailable() {
        let raw = vec![
            RawResponse::new("long", vec![ti(0, 60)]),
            RawResponse::new("short", vec![ti(0, 30)]),
        ];
        let n = Normalizer::new(TimeDelta::new(60))
            .normalize_participants(&raw)
            .unwrap();
        let kept: Vec<&str> = n.available().ids().map(|i| i.as_str()).collect();
        assert_eq!(kept, vec!["long"]);
        assert_eq!(n.unavailable(), &[ParticipantId::new("short")]);
    }

    #[test]
    fn test_adjacent_short_blocks_are_not_merged() {
        let raw = vec![RawResponse::new("split", vec![ti(0, 30), ti(30, 60)])];
        let n = Normalizer::new(TimeDelta::new(60))
            .normalize_participants(&raw)
            .unwrap();
        assert!(n.available().is_empty());
        assert_eq!(n.unavailable(), &[ParticipantId::new("split")]);
    }

    #[test]
    fn test_kept_intervals_are_unchanged() {
        let raw = vec![RawResponse::new("p", vec![ti(0, 30), ti(100, 200)])];
        let n = Normalizer::new(TimeDelta::new(60))
            .normalize_participants(&raw)
            .unwrap();
        assert_eq!(
            n.available().get("p").unwrap().intervals(),
            &[ti(0, 30), ti(100, 200)]
        );
    }

    #[test]
    fn test_skip_list_drops_responders() {
        let raw = vec![
            RawResponse::new("tester", vec![ti(0, 600)]),
            RawResponse::new("p", vec![ti(0, 600)]),
        ];
        let n = Normalizer::new(TimeDelta::new(60))
            .with_skip_list(["tester"])
            .normalize_participants(&raw)
            .unwrap();
        assert_eq!(n.available().len(), 1);
        assert!(n.unavailable().is_empty());
    }

    #[test]
    fn test_duplicate_responder_is_rejected() {
        let raw = vec![
            RawResponse::new("p", vec![ti(0, 10)]),
            RawResponse::new("p", vec![ti(0, 10)]),
        ];
        let err = Normalizer::new(TimeDelta::new(60))
            .normalize_participants(&raw)
            .unwrap_err();
        assert_eq!(err, ProblemBuildError::DuplicateParticipant("p".into()));
    }

    #[test]
    fn test_duplicate_is_rejected_in_either_order() {
        let short = RawResponse::new("p", vec![ti(0, 30)]);
        let long = RawResponse::new("p", vec![ti(0, 120)]);
        let normalizer = Normalizer::new(TimeDelta::new(60));
        for raw in [vec![short.clone(), long.clone()], vec![long, short]] {
            assert_eq!(
                normalizer.normalize_participants(&raw).unwrap_err(),
                ProblemBuildError::DuplicateParticipant("p".into())
            );
        }
    }

    #[test]
    fn test_facilitators_are_not_filtered() {
        let raw = vec![
            RawResponse::new("f1", vec![ti(0, 15)]),
            RawResponse::new("f2", vec![ti(0, 600)]),
        ];
        let terms = HashMap::from([
            (
                "f1".to_string(),
                FacilitatorTerms {
                    capacity: 1,
                    track: None,
                },
            ),
            (
                "f2".to_string(),
                FacilitatorTerms {
                    capacity: 2,
                    track: Some("gov".into()),
                },
            ),
        ]);
        let roster = Normalizer::new(TimeDelta::new(60))
            .normalize_facilitators(&raw, &terms)
            .unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get("f1").unwrap().intervals(), &[ti(0, 15)]);
        assert_eq!(roster.get("f2").unwrap().capacity(), 2);
        assert_eq!(roster.get("f2").unwrap().track().unwrap().as_str(), "gov");
    }

    #[test]
    fn test_missing_terms_is_an_error() {
        let raw = vec![RawResponse::new("f1", vec![ti(0, 60)])];
        let err = Normalizer::new(TimeDelta::new(60))
            .normalize_facilitators(&raw, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, NormalizeError::MissingTerms(_)));
    }
}
