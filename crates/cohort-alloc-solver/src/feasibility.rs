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

use cohort_alloc_core::SolverVariable;
use cohort_alloc_model::prelude::*;
use std::fmt::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfeasibleReason {
    /// Fewer candidates than requested cohorts.
    TooFewCandidates { available: usize },
    /// Summed facilitator capacity is below the requested count.
    InsufficientCapacity { total: u64 },
    /// The search tried every inclusion/exclusion; `max_achievable` is the
    /// deepest partial schedule it reached.
    SearchExhausted { max_achievable: usize },
}

impl Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfeasibleReason::TooFewCandidates { available } => {
                write!(f, "only {} candidate cohorts exist", available)
            }
            InfeasibleReason::InsufficientCapacity { total } => {
                write!(f, "facilitators can lead only {} cohorts in total", total)
            }
            InfeasibleReason::SearchExhausted { max_achievable } => write!(
                f,
                "search exhausted, at most {} conflict-free cohorts were found",
                max_achievable
            ),
        }
    }
}

/// The requested number of cohorts cannot be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfeasibleError {
    requested: usize,
    reason: InfeasibleReason,
}

impl InfeasibleError {
    #[inline]
    pub fn new(requested: usize, reason: InfeasibleReason) -> Self {
        Self { requested, reason }
    }

    #[inline]
    pub fn requested(&self) -> usize {
        self.requested
    }

    #[inline]
    pub fn reason(&self) -> InfeasibleReason {
        self.reason
    }

    /// Best known upper bound on what can be formed with the same inputs.
    pub fn max_achievable(&self) -> usize {
        match self.reason {
            InfeasibleReason::TooFewCandidates { available } => available,
            InfeasibleReason::InsufficientCapacity { total } => {
                usize::try_from(total).unwrap_or(usize::MAX)
            }
            InfeasibleReason::SearchExhausted { max_achievable } => max_achievable,
        }
    }
}

impl Display for InfeasibleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot form {} cohorts: {}",
            self.requested, self.reason
        )
    }
}

impl std::error::Error for InfeasibleError {}

/// Necessary conditions checked before the search.
///
/// Passing the gate does not mean a schedule exists. Failing it means none does.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeasibilityGate;

impl FeasibilityGate {
    pub fn check<T: SolverVariable>(
        candidates: &[CandidateCohort<T>],
        target_count: usize,
        roster: &Roster<T>,
    ) -> Result<(), InfeasibleError> {
        if candidates.len() < target_count {
            debug!(
                candidates = candidates.len(),
                target_count, "Gate: too few candidates"
            );
            return Err(InfeasibleError::new(
                target_count,
                InfeasibleReason::TooFewCandidates {
                    available: candidates.len(),
                },
            ));
        }
        let total = roster.total_capacity();
        if total < target_count as u64 {
            debug!(total, target_count, "Gate: insufficient facilitator capacity");
            return Err(InfeasibleError::new(
                target_count,
                InfeasibleReason::InsufficientCapacity { total },
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn is_feasible<T: SolverVariable>(
        candidates: &[CandidateCohort<T>],
        target_count: usize,
        roster: &Roster<T>,
    ) -> bool {
        Self::check(candidates, target_count, roster).is_ok()
    }
}
