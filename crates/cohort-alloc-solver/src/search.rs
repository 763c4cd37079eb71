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

//! # Cohort Selector
//!
//! Backtracking search over inclusion and exclusion of every candidate, larger
//! groups first.
//!
//! The search runs on an explicit frame stack instead of the call stack. A
//! frame holds the candidates still open at its depth and a cursor into them.
//! Excluding a candidate only moves the cursor; including one reserves a
//! facilitator and pushes a child frame with the conflicting candidates
//! filtered out. The stack is therefore never taller than the requested
//! cohort count plus one. When a child runs dry it is popped and its parent
//! releases the reservation before moving on, so capacity is restored in
//! strict LIFO order.

use crate::{
    capacity::CapacityLedger,
    feasibility::{InfeasibleError, InfeasibleReason},
};
use cohort_alloc_core::{SolverVariable, time::TimeInterval};
use cohort_alloc_model::prelude::*;
use std::{
    fmt::Display,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchConfig {
    /// Stop after examining this many candidates.
    pub max_nodes: Option<u64>,
    /// Wall-clock budget, sampled every 16 nodes.
    pub max_solver_time_ms: Option<u64>,
}

/// Cooperative stop signal shared with a running search.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Candidates examined.
    pub nodes: u64,
    /// Candidates committed, including ones later undone.
    pub inclusions: u64,
    /// Commitments undone.
    pub backtracks: u64,
    /// Largest number of cohorts held at once.
    pub deepest: usize,
    pub elapsed: Duration,
}

impl Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchStats(nodes {}, inclusions {}, backtracks {}, deepest {}, {:?})",
            self.nodes, self.inclusions, self.backtracks, self.deepest, self.elapsed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NodeBudget(u64),
    TimeBudget(Duration),
    Cancelled,
    /// The generator refused to materialize the candidate set.
    CandidateLimit { limit: usize, required: usize },
}

impl Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::NodeBudget(n) => write!(f, "node budget of {n} exhausted"),
            AbortReason::TimeBudget(d) => write!(f, "time budget of {d:?} exhausted"),
            AbortReason::Cancelled => write!(f, "cancelled"),
            AbortReason::CandidateLimit { limit, required } => {
                write!(f, "{required} candidates exceed the limit of {limit}")
            }
        }
    }
}

/// The search stopped before proving anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchAbortedError {
    reason: AbortReason,
    stats: SearchStats,
}

impl SearchAbortedError {
    #[inline]
    pub fn new(reason: AbortReason, stats: SearchStats) -> Self {
        Self { reason, stats }
    }

    #[inline]
    pub fn reason(&self) -> AbortReason {
        self.reason
    }

    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

impl Display for SearchAbortedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Search aborted ({}) after {} nodes, deepest {}",
            self.reason, self.stats.nodes, self.stats.deepest
        )
    }
}

impl std::error::Error for SearchAbortedError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    Infeasible(InfeasibleError),
    Aborted(SearchAbortedError),
}

impl Display for SelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectError::Infeasible(e) => write!(f, "{e}"),
            SelectError::Aborted(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SelectError {}

impl From<InfeasibleError> for SelectError {
    fn from(value: InfeasibleError) -> Self {
        SelectError::Infeasible(value)
    }
}

impl From<SearchAbortedError> for SelectError {
    fn from(value: SearchAbortedError) -> Self {
        SelectError::Aborted(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T: SolverVariable> {
    schedule: Schedule<T>,
    stats: SearchStats,
}

impl<T: SolverVariable> Selection<T> {
    #[inline]
    pub fn schedule(&self) -> &Schedule<T> {
        &self.schedule
    }

    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[inline]
    pub fn into_parts(self) -> (Schedule<T>, SearchStats) {
        (self.schedule, self.stats)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    /// The candidate under the cursor has not been tried yet.
    Fresh,
    /// The candidate under the cursor is committed under this facilitator and
    /// a child frame is exploring on top of it.
    Included(usize),
}

#[derive(Debug)]
struct Frame {
    open: Vec<usize>,
    cursor: usize,
    state: FrameState,
}

impl Frame {
    #[inline]
    fn new(open: Vec<usize>) -> Self {
        Self {
            open,
            cursor: 0,
            state: FrameState::Fresh,
        }
    }
}

/// Committed cohort as the search sees it: candidate index and facilitator position.
#[derive(Debug, Clone, Copy)]
struct Commit {
    candidate: usize,
    facilitator: usize,
}

struct Budget<'a> {
    config: SearchConfig,
    cancel: &'a CancellationToken,
    started: Instant,
}

impl Budget<'_> {
    #[inline]
    fn exceeded(&self, nodes: u64) -> Option<AbortReason> {
        if self.cancel.is_cancelled() {
            return Some(AbortReason::Cancelled);
        }
        if let Some(max) = self.config.max_nodes
            && nodes >= max
        {
            return Some(AbortReason::NodeBudget(max));
        }
        if let Some(ms) = self.config.max_solver_time_ms
            && (nodes & 0xF) == 0
        {
            let budget = Duration::from_millis(ms);
            if self.started.elapsed() >= budget {
                return Some(AbortReason::TimeBudget(budget));
            }
        }
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct BacktrackingSelector {
    config: SearchConfig,
    cancel: CancellationToken,
}

impl BacktrackingSelector {
    #[inline]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Shares `token` with the caller so the search can be stopped from outside.
    #[inline]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// First roster facilitator with capacity left who covers `slot` and does
    /// not already lead an overlapping cohort.
    fn assign<T: SolverVariable>(
        roster: &Roster<T>,
        ledger: &CapacityLedger,
        candidates: &[CandidateCohort<T>],
        selected: &[Commit],
        slot: &TimeInterval<T>,
    ) -> Option<usize> {
        roster.iter().enumerate().position(|(i, f)| {
            ledger.has_capacity(i)
                && f.covers(slot)
                && !selected
                    .iter()
                    .any(|c| c.facilitator == i && candidates[c.candidate].slot().intersects(slot))
        })
    }

    /// Selects `params.target_count()` conflict-free cohorts from `candidates`.
    ///
    /// Candidates are tried in descending size; equal sizes keep their input
    /// order. Facilitators are assigned first-fit in roster order.
    ///
    /// Candidates whose size falls outside `params.size_range()` are dropped
    /// before the search starts, which is stricter than the `min_size` filter
    /// applied after each inclusion. Generated candidates always lie in range, so this only matters for
    /// hand-built candidate lists, which could otherwise yield a schedule that
    /// fails [`Schedule::validate`](cohort_alloc_model::schedule::Schedule::validate).
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len(), target = params.target_count()))]
    pub fn select<T: SolverVariable>(
        &self,
        candidates: &[CandidateCohort<T>],
        roster: &Roster<T>,
        params: &CohortParams<T>,
    ) -> Result<Selection<T>, SelectError> {
        let target = params.target_count();
        let sizes = params.size_range();
        let budget = Budget {
            config: self.config,
            cancel: &self.cancel,
            started: Instant::now(),
        };

        let mut order: Vec<usize> = (0..candidates.len())
            .filter(|&i| sizes.contains(&candidates[i].size()))
            .collect();
        order.sort_by_key(|&i| std::cmp::Reverse(candidates[i].size()));

        let mut ledger = CapacityLedger::from(roster);
        let mut selected: Vec<Commit> = Vec::with_capacity(target);
        let mut stack: Vec<Frame> = Vec::with_capacity(target + 1);
        let mut stats = SearchStats::default();
        stack.push(Frame::new(order));

        loop {
            if selected.len() == target {
                stats.elapsed = budget.started.elapsed();
                info!(%stats, "Selection found");
                let cohorts = selected
                    .iter()
                    .map(|c| {
                        candidates[c.candidate].schedule(roster.as_slice()[c.facilitator].id().clone())
                    })
                    .collect();
                let schedule = Schedule::new(cohorts, ledger.snapshot(roster));
                return Ok(Selection { schedule, stats });
            }

            if let Some(reason) = budget.exceeded(stats.nodes) {
                stats.elapsed = budget.started.elapsed();
                info!(%reason, %stats, "Selection aborted");
                return Err(SearchAbortedError::new(reason, stats).into());
            }

            let Some(frame) = stack.last_mut() else {
                stats.elapsed = budget.started.elapsed();
                info!(%stats, "Selection exhausted");
                return Err(InfeasibleError::new(
                    target,
                    InfeasibleReason::SearchExhausted {
                        max_achievable: stats.deepest,
                    },
                )
                .into());
            };

            let state = frame.state;
            match state {
                FrameState::Included(facilitator) => {
                    // The child frame ran dry: undo and try excluding.
                    ledger
                        .release(facilitator)
                        .expect("child frame released in LIFO order");
                    selected.pop();
                    stats.backtracks += 1;
                    frame.state = FrameState::Fresh;
                    frame.cursor += 1;
                }
                FrameState::Fresh if frame.cursor >= frame.open.len() => {
                    stack.pop();
                }
                FrameState::Fresh => {
                    stats.nodes += 1;
                    let current = frame.open[frame.cursor];
                    let cohort = &candidates[current];
                    let slot = cohort.slot();

                    match Self::assign(roster, &ledger, candidates, &selected, &slot) {
                        None => {
                            trace!(%slot, "No facilitator left, excluding");
                            frame.cursor += 1;
                        }
                        Some(facilitator) => {
                            ledger
                                .reserve(facilitator)
                                .expect("assigned facilitator has capacity");
                            selected.push(Commit {
                                candidate: current,
                                facilitator,
                            });
                            stats.inclusions += 1;
                            stats.deepest = stats.deepest.max(selected.len());

                            let open: Vec<usize> = frame.open[frame.cursor + 1..]
                                .iter()
                                .copied()
                                .filter(|&i| {
                                    let other = &candidates[i];
                                    other.size() >= params.min_size()
                                        && !other.members().iter().any(|m| cohort.has_member(m))
                                })
                                .collect();
                            frame.state = FrameState::Included(facilitator);
                            debug!(
                                depth = selected.len(),
                                %slot,
                                size = cohort.size(),
                                open = open.len(),
                                "Included candidate"
                            );
                            stack.push(Frame::new(open));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_alloc_core::time::{TimeDelta, TimePoint};

    fn ti(a: i64, b: i64) -> TimeInterval<i64> {
        TimeInterval::new(TimePoint::new(a), TimePoint::new(b))
    }

    fn cand(slot: TimeInterval<i64>, members: &[&str]) -> CandidateCohort<i64> {
        let members: Vec<ParticipantId> = members.iter().map(|m| ParticipantId::new(m)).collect();
        CandidateCohort::new(slot, members)
    }

    fn params(min: usize, max: usize, target: usize) -> CohortParams<i64> {
        CohortParams::new(min, max, TimeDelta::new(60), target).unwrap()
    }

    fn roster(entries: &[(&str, TimeInterval<i64>, u32)]) -> Roster<i64> {
        Roster::try_from_facilitators(
            entries
                .iter()
                .map(|&(id, iv, cap)| Facilitator::new(id, vec![iv], cap)),
        )
        .unwrap()
    }

    fn members(c: &ScheduledCohort<i64>) -> Vec<&str> {
        c.members().iter().map(|m| m.as_str()).collect()
    }

    #[test]
    fn test_prefers_larger_groups() {
        let cands = vec![
            cand(ti(0, 60), &["a", "b"]),
            cand(ti(0, 60), &["a", "b", "c"]),
        ];
        let sel = BacktrackingSelector::default()
            .select(&cands, &roster(&[("f", ti(0, 60), 1)]), &params(2, 3, 1))
            .unwrap();
        assert_eq!(members(&sel.schedule().cohorts()[0]), vec!["a", "b", "c"]);
        assert_eq!(sel.schedule().remaining_capacity("f"), Some(0));
    }

    #[test]
    fn test_out_of_range_candidates_are_never_selected() {
        let cands = vec![
            cand(ti(0, 60), &["a", "b", "c", "d"]),
            cand(ti(0, 60), &["e"]),
            cand(ti(0, 60), &["a", "b"]),
        ];
        let sel = BacktrackingSelector::default()
            .select(&cands, &roster(&[("f", ti(0, 60), 1)]), &params(2, 3, 1))
            .unwrap();
        assert_eq!(members(&sel.schedule().cohorts()[0]), vec!["a", "b"]);

        let oversized_only = vec![cand(ti(0, 60), &["a", "b", "c", "d"])];
        assert!(matches!(
            BacktrackingSelector::default().select(
                &oversized_only,
                &roster(&[("f", ti(0, 60), 1)]),
                &params(2, 3, 1)
            ),
            Err(SelectError::Infeasible(_))
        ));
    }

    #[test]
    fn test_backtracks_out_of_a_greedy_dead_end() {
        // Taking the big group first blocks both pairs; only the two pairs work.
        let cands = vec![
            cand(ti(0, 60), &["a", "b", "c"]),
            cand(ti(0, 60), &["a", "b"]),
            cand(ti(60, 120), &["c", "d"]),
        ];
        let sel = BacktrackingSelector::default()
            .select(&cands, &roster(&[("f", ti(0, 120), 2)]), &params(2, 3, 2))
            .unwrap();
        let got: Vec<Vec<&str>> = sel.schedule().cohorts().iter().map(members).collect();
        assert_eq!(got, vec![vec!["a", "b"], vec!["c", "d"]]);
        assert!(sel.stats().backtracks >= 1);
        assert_eq!(sel.schedule().remaining_capacity("f"), Some(0));
    }

    #[test]
    fn test_capacity_restored_on_backtrack() {
        // f1 is first in roster order and gets tried first for the big group;
        // after backtracking the schedule must still see both capacities whole.
        let cands = vec![
            cand(ti(0, 60), &["a", "b", "c"]),
            cand(ti(0, 60), &["a", "b"]),
            cand(ti(60, 120), &["c", "d"]),
        ];
        let r = roster(&[("f1", ti(0, 60), 1), ("f2", ti(60, 120), 1)]);
        let sel = BacktrackingSelector::default()
            .select(&cands, &r, &params(2, 3, 2))
            .unwrap();
        let facs: Vec<&str> = sel
            .schedule()
            .cohorts()
            .iter()
            .map(|c| c.facilitator().as_str())
            .collect();
        assert_eq!(facs, vec!["f1", "f2"]);
        assert_eq!(sel.schedule().remaining_capacity("f1"), Some(0));
        assert_eq!(sel.schedule().remaining_capacity("f2"), Some(0));
    }

    #[test]
    fn test_facilitator_not_double_booked() {
        let cands = vec![cand(ti(0, 60), &["a", "b"]), cand(ti(30, 90), &["c", "d"])];
        let r = roster(&[("f", ti(0, 120), 2)]);
        let err = BacktrackingSelector::default()
            .select(&cands, &r, &params(2, 2, 2))
            .unwrap_err();
        assert_eq!(
            err,
            SelectError::Infeasible(InfeasibleError::new(
                2,
                InfeasibleReason::SearchExhausted { max_achievable: 1 }
            ))
        );
    }

    #[test]
    fn test_zero_target_is_empty_success() {
        let sel = BacktrackingSelector::default()
            .select(&[], &roster(&[]), &params(1, 2, 0))
            .unwrap();
        assert!(sel.schedule().is_empty());
        assert_eq!(sel.stats().nodes, 0);
    }

    #[test]
    fn test_node_budget_aborts() {
        let cands: Vec<_> = (0..8)
            .map(|i| cand(ti(0, 60), &[&format!("p{i}"), "shared"]))
            .collect();
        let selector = BacktrackingSelector::new(SearchConfig {
            max_nodes: Some(3),
            ..SearchConfig::default()
        });
        let err = selector
            .select(&cands, &roster(&[("f", ti(0, 60), 8)]), &params(2, 2, 2))
            .unwrap_err();
        match err {
            SelectError::Aborted(e) => {
                assert_eq!(e.reason(), AbortReason::NodeBudget(3));
                assert_eq!(e.stats().nodes, 3);
            }
            other => panic!("expected abort, got {other}"),
        }
    }

    #[test]
    fn test_cancellation_is_observed() {
        let token = CancellationToken::new();
        token.cancel();
        let selector = BacktrackingSelector::default().with_cancellation(token);
        let err = selector
            .select(
                &[cand(ti(0, 60), &["a", "b"])],
                &roster(&[("f", ti(0, 60), 1)]),
                &params(2, 2, 1),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SelectError::Aborted(e) if e.reason() == AbortReason::Cancelled
        ));
    }

    #[test]
    fn test_stack_height_stays_bounded_on_long_exclusion_runs() {
        // Thousands of unusable candidates are skipped by cursor moves only.
        let mut cands: Vec<_> = (0..5_000)
            .map(|i| cand(ti(500, 560), &[&format!("x{i}"), &format!("y{i}")]))
            .collect();
        cands.push(cand(ti(0, 60), &["a", "b"]));
        let sel = BacktrackingSelector::default()
            .select(&cands, &roster(&[("f", ti(0, 60), 1)]), &params(2, 2, 1))
            .unwrap();
        assert_eq!(members(&sel.schedule().cohorts()[0]), vec!["a", "b"]);
        assert_eq!(sel.stats().nodes, 5_001);
    }
}
