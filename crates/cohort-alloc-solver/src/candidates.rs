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

//! # Candidate Generator
//!
//! Walks every event day with a fixed cursor step and emits one
//! [`CandidateCohort`] per combination of available participants, for every
//! size in the configured range.
//!
//! Emission order is: day order, then cursor order, then group size
//! ascending, then lexicographic combination order over the participants
//! available at that slot (in [`AvailabilitySet`] order). The selector's stable
//! sort leans on this order to break ties between groups of equal size.
//!
//! A slot is skipped entirely when no facilitator both covers it and has
//! capacity left.
//!
//! [`AvailabilitySet`]: cohort_alloc_model::availability::AvailabilitySet

use cohort_alloc_core::{
    SolverVariable,
    iter::{IndexCombinations, binomial},
    time::{TimeDelta, TimeInterval},
};
use cohort_alloc_model::prelude::*;
use num_traits::NumCast;
use std::fmt::Display;
use tracing::{debug, info, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig<T: SolverVariable> {
    /// Distance between two consecutive slot starts.
    pub step: TimeDelta<T>,
    /// Refuse to materialize more candidates than this.
    pub max_candidates: Option<usize>,
}

impl<T: SolverVariable> Default for GeneratorConfig<T> {
    fn default() -> Self {
        Self {
            step: TimeDelta::new(NumCast::from(30).expect("30 fits the time primitive")),
            max_candidates: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonPositiveStepError<T: SolverVariable> {
    step: TimeDelta<T>,
}

impl<T: SolverVariable> NonPositiveStepError<T> {
    #[inline]
    pub fn step(&self) -> TimeDelta<T> {
        self.step
    }
}

impl<T: SolverVariable> Display for NonPositiveStepError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cursor step must be positive, got {}", self.step)
    }
}

impl<T: SolverVariable> std::error::Error for NonPositiveStepError<T> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateLimitError {
    limit: usize,
    required: usize,
}

impl CandidateLimitError {
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Saturated at `usize::MAX`.
    #[inline]
    pub fn required(&self) -> usize {
        self.required
    }
}

impl Display for CandidateLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Instance needs {} candidates, limit is {}",
            self.required, self.limit
        )
    }
}

impl std::error::Error for CandidateLimitError {}

#[derive(Debug, Clone, Copy, Default)]
struct GeneratorStats {
    slots: usize,
    slots_without_facilitator: usize,
    candidates: usize,
}

#[derive(Debug, Clone)]
pub struct CandidateGenerator<T: SolverVariable> {
    config: GeneratorConfig<T>,
}

impl<T: SolverVariable> CandidateGenerator<T> {
    pub fn new(config: GeneratorConfig<T>) -> Result<Self, NonPositiveStepError<T>> {
        if !config.step.is_positive() {
            return Err(NonPositiveStepError { step: config.step });
        }
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig<T> {
        &self.config
    }

    /// Calls `f` for every slot that has at least one usable facilitator,
    /// with the participants covering it. Returns slot statistics.
    fn walk_slots<'p, F>(&self, problem: &'p CohortProblem<T>, mut f: F) -> GeneratorStats
    where
        F: FnMut(TimeInterval<T>, &[&'p ParticipantId]),
    {
        let block = problem.params().time_block();
        let mut stats = GeneratorStats::default();
        let mut available: Vec<&ParticipantId> = Vec::new();

        for day in problem.window().days() {
            let mut cursor = day.start();
            while let Some(slot) = cursor.span_of(block)
                && slot.end() <= day.end()
            {
                stats.slots += 1;
                let staffed = problem
                    .roster()
                    .iter()
                    .any(|fac| fac.capacity() > 0 && fac.covers(&slot));
                if staffed {
                    available.clear();
                    available.extend(
                        problem
                            .availability()
                            .iter()
                            .filter(|a| a.covers(&slot))
                            .map(|a| a.id()),
                    );
                    trace!(%slot, participants = available.len(), "Slot staffed");
                    f(slot, &available);
                } else {
                    stats.slots_without_facilitator += 1;
                    trace!(%slot, "No facilitator for slot");
                }

                match cursor.checked_add(self.config.step) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
        }
        stats
    }

    /// Number of candidates [`CandidateGenerator::generate`] would emit, saturating.
    pub fn count(&self, problem: &CohortProblem<T>) -> usize {
        let sizes = problem.params().size_range();
        let mut total: usize = 0;
        self.walk_slots(problem, |_, available| {
            for k in sizes.clone() {
                total = total.saturating_add(binomial(available.len(), k));
            }
        });
        total
    }

    #[instrument(level = "info", skip_all, fields(days = problem.window().len()))]
    pub fn generate(
        &self,
        problem: &CohortProblem<T>,
    ) -> Result<Vec<CandidateCohort<T>>, CandidateLimitError> {
        if let Some(limit) = self.config.max_candidates {
            let required = self.count(problem);
            if required > limit {
                return Err(CandidateLimitError { limit, required });
            }
        }

        let sizes = problem.params().size_range();
        let mut out = Vec::new();
        let mut stats = self.walk_slots(problem, |slot, available| {
            let before = out.len();
            for k in sizes.clone() {
                for combo in IndexCombinations::new(available.len(), k) {
                    let members: Vec<ParticipantId> =
                        combo.iter().map(|&i| available[i].clone()).collect();
                    out.push(CandidateCohort::new(slot, members));
                }
            }
            debug!(%slot, emitted = out.len() - before, "Emitted candidates");
        });
        stats.candidates = out.len();

        info!(
            slots = stats.slots,
            unstaffed = stats.slots_without_facilitator,
            candidates = stats.candidates,
            "Candidate generation finished"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_alloc_core::time::TimePoint;

    fn ti(a: i64, b: i64) -> TimeInterval<i64> {
        TimeInterval::new(TimePoint::new(a), TimePoint::new(b))
    }

    fn problem(
        participants: &[(&str, Vec<TimeInterval<i64>>)],
        facilitators: Vec<Facilitator<i64>>,
        day: TimeInterval<i64>,
        min: usize,
        max: usize,
    ) -> CohortProblem<i64> {
        let params = CohortParams::new(min, max, TimeDelta::new(60), 1).unwrap();
        let mut b = CohortProblemBuilder::new(params);
        for (name, intervals) in participants {
            b.add_participant(*name, intervals.clone()).unwrap();
        }
        for f in facilitators {
            b.add_facilitator(f).unwrap();
        }
        b.add_day(day);
        b.build().unwrap()
    }

    fn generator() -> CandidateGenerator<i64> {
        CandidateGenerator::new(GeneratorConfig::default()).unwrap()
    }

    fn names(c: &CandidateCohort<i64>) -> Vec<&str> {
        c.members().iter().map(|m| m.as_str()).collect()
    }

    #[test]
    fn test_cursor_walk_and_emission_order() {
        // 09:00-11:00 gives slots at 09:00, 09:30 and 10:00.
        let full = vec![ti(540, 660)];
        let p = problem(
            &[("a", full.clone()), ("b", full.clone()), ("c", full.clone())],
            vec![Facilitator::new("f", full.clone(), 1)],
            ti(540, 660),
            2,
            3,
        );
        let out = generator().generate(&p).unwrap();
        // Per slot: C(3,2) + C(3,3) = 4.
        assert_eq!(out.len(), 12);
        assert_eq!(generator().count(&p), 12);

        let starts: Vec<i64> = out.iter().map(|c| c.start_time().value()).collect();
        assert_eq!(starts[..4], [540, 540, 540, 540]);
        assert_eq!(starts[4], 570);
        assert_eq!(starts[8], 600);

        assert_eq!(names(&out[0]), vec!["a", "b"]);
        assert_eq!(names(&out[1]), vec!["a", "c"]);
        assert_eq!(names(&out[2]), vec!["b", "c"]);
        assert_eq!(names(&out[3]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_partial_overlap_is_excluded() {
        let p = problem(
            &[
                ("a", vec![ti(0, 60)]),
                ("b", vec![ti(0, 60)]),
                ("late", vec![ti(30, 90)]),
            ],
            vec![Facilitator::new("f", vec![ti(0, 60)], 1)],
            ti(0, 60),
            2,
            3,
        );
        let out = generator().generate(&p).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(names(&out[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_slot_without_facilitator_is_skipped() {
        let everyone = vec![ti(0, 120)];
        let p = problem(
            &[("a", everyone.clone()), ("b", everyone.clone())],
            vec![
                Facilitator::new("busy", vec![ti(60, 120)], 0),
                Facilitator::new("late", vec![ti(60, 120)], 1),
            ],
            ti(0, 120),
            2,
            2,
        );
        let out = generator().generate(&p).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].slot(), ti(60, 120));
    }

    #[test]
    fn test_day_shorter_than_block_yields_nothing() {
        let p = problem(
            &[("a", vec![ti(0, 45)]), ("b", vec![ti(0, 45)])],
            vec![Facilitator::new("f", vec![ti(0, 45)], 1)],
            ti(0, 45),
            1,
            2,
        );
        assert!(generator().generate(&p).unwrap().is_empty());
    }

    #[test]
    fn test_candidate_limit_and_step_validation() {
        let full = vec![ti(0, 60)];
        let p = problem(
            &[("a", full.clone()), ("b", full.clone()), ("c", full.clone())],
            vec![Facilitator::new("f", full.clone(), 1)],
            ti(0, 60),
            1,
            3,
        );
        let limited = CandidateGenerator::new(GeneratorConfig {
            max_candidates: Some(6),
            ..GeneratorConfig::default()
        })
        .unwrap();
        let err = limited.generate(&p).unwrap_err();
        assert_eq!(err.required(), 7);
        assert_eq!(err.limit(), 6);

        let bad = CandidateGenerator::<i64>::new(GeneratorConfig {
            step: TimeDelta::new(0),
            ..GeneratorConfig::default()
        });
        assert!(bad.is_err());
    }
}
