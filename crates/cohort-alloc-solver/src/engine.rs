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

//! Engine entry point: Generator, then Gate, then Selector.
//!
//! The engine never relaxes parameters on failure. An infeasible or aborted run
//! is returned as such and the caller decides what to retry.

use crate::{
    candidates::{CandidateGenerator, CandidateLimitError, GeneratorConfig, NonPositiveStepError},
    feasibility::{FeasibilityGate, InfeasibleError},
    framework::Solver,
    search::{
        AbortReason, BacktrackingSelector, CancellationToken, SearchAbortedError, SearchConfig,
        SearchStats, SelectError,
    },
};
use cohort_alloc_core::SolverVariable;
use cohort_alloc_model::prelude::*;
use std::fmt::Display;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig<T: SolverVariable> {
    pub generator: GeneratorConfig<T>,
    pub search: SearchConfig,
}

impl<T: SolverVariable> Default for EngineConfig<T> {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedInputError<T: SolverVariable> {
    Build(ProblemBuildError<T>),
    Step(NonPositiveStepError<T>),
}

impl<T: SolverVariable> Display for MalformedInputError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedInputError::Build(e) => write!(f, "Malformed input: {e}"),
            MalformedInputError::Step(e) => write!(f, "Malformed input: {e}"),
        }
    }
}

impl<T: SolverVariable> std::error::Error for MalformedInputError<T> {}

impl<T: SolverVariable> From<ProblemBuildError<T>> for MalformedInputError<T> {
    fn from(value: ProblemBuildError<T>) -> Self {
        MalformedInputError::Build(value)
    }
}

impl<T: SolverVariable> From<NonPositiveStepError<T>> for MalformedInputError<T> {
    fn from(value: NonPositiveStepError<T>) -> Self {
        MalformedInputError::Step(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError<T: SolverVariable> {
    MalformedInput(MalformedInputError<T>),
    Infeasible(InfeasibleError),
    Aborted(SearchAbortedError),
}

impl<T: SolverVariable> Display for ScheduleError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::MalformedInput(e) => write!(f, "{e}"),
            ScheduleError::Infeasible(e) => write!(f, "{e}"),
            ScheduleError::Aborted(e) => write!(f, "{e}"),
        }
    }
}

impl<T: SolverVariable> std::error::Error for ScheduleError<T> {}

impl<T: SolverVariable> From<MalformedInputError<T>> for ScheduleError<T> {
    fn from(value: MalformedInputError<T>) -> Self {
        ScheduleError::MalformedInput(value)
    }
}

impl<T: SolverVariable> From<ProblemBuildError<T>> for ScheduleError<T> {
    fn from(value: ProblemBuildError<T>) -> Self {
        ScheduleError::MalformedInput(value.into())
    }
}

impl<T: SolverVariable> From<NonPositiveStepError<T>> for ScheduleError<T> {
    fn from(value: NonPositiveStepError<T>) -> Self {
        ScheduleError::MalformedInput(value.into())
    }
}

impl<T: SolverVariable> From<InfeasibleError> for ScheduleError<T> {
    fn from(value: InfeasibleError) -> Self {
        ScheduleError::Infeasible(value)
    }
}

impl<T: SolverVariable> From<SelectError> for ScheduleError<T> {
    fn from(value: SelectError) -> Self {
        match value {
            SelectError::Infeasible(e) => ScheduleError::Infeasible(e),
            SelectError::Aborted(e) => ScheduleError::Aborted(e),
        }
    }
}

impl<T: SolverVariable> From<CandidateLimitError> for ScheduleError<T> {
    fn from(value: CandidateLimitError) -> Self {
        ScheduleError::Aborted(SearchAbortedError::new(
            AbortReason::CandidateLimit {
                limit: value.limit(),
                required: value.required(),
            },
            SearchStats::default(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutcome<T: SolverVariable> {
    schedule: Schedule<T>,
    stats: SearchStats,
    candidates: usize,
}

impl<T: SolverVariable> EngineOutcome<T> {
    #[inline]
    pub fn schedule(&self) -> &Schedule<T> {
        &self.schedule
    }

    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Number of candidates the generator emitted.
    #[inline]
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    #[inline]
    pub fn into_schedule(self) -> Schedule<T> {
        self.schedule
    }
}

fn run<T: SolverVariable>(
    problem: &CohortProblem<T>,
    config: &EngineConfig<T>,
    cancel: CancellationToken,
) -> Result<EngineOutcome<T>, ScheduleError<T>> {
    let generator = CandidateGenerator::new(config.generator)?;
    let params = problem.params();

    if params.target_count() == 0 {
        info!("Nothing requested");
        let remaining = problem
            .roster()
            .iter()
            .map(|f| (f.id().clone(), f.capacity()))
            .collect();
        return Ok(EngineOutcome {
            schedule: Schedule::new(Vec::new(), remaining),
            stats: SearchStats::default(),
            candidates: 0,
        });
    }

    let candidates = generator.generate(problem)?;
    FeasibilityGate::check(&candidates, params.target_count(), problem.roster())?;

    let selection = BacktrackingSelector::new(config.search)
        .with_cancellation(cancel)
        .select(&candidates, problem.roster(), params)?;
    let (schedule, stats) = selection.into_parts();
    info!(
        cohorts = schedule.len(),
        participants = schedule.total_participants(),
        "Schedule formed"
    );
    Ok(EngineOutcome {
        schedule,
        stats,
        candidates: candidates.len(),
    })
}

/// Forms exactly `problem.params().target_count()` cohorts or reports why not.
#[instrument(level = "info", skip_all, fields(params = %problem.params()))]
pub fn schedule_cohorts<T: SolverVariable>(
    problem: &CohortProblem<T>,
    config: &EngineConfig<T>,
) -> Result<EngineOutcome<T>, ScheduleError<T>> {
    run(problem, config, CancellationToken::new())
}

#[derive(Debug, Clone, Default)]
pub struct CohortEngine<T: SolverVariable> {
    config: EngineConfig<T>,
    cancel: CancellationToken,
}

impl<T: SolverVariable> CohortEngine<T> {
    #[inline]
    pub fn new(config: EngineConfig<T>) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig<T> {
        &self.config
    }

    /// Token that stops every solve started from this engine.
    #[inline]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl<T: SolverVariable> Solver<T> for CohortEngine<T> {
    type Error = ScheduleError<T>;

    #[instrument(level = "info", skip_all, fields(params = %problem.params()))]
    fn solve(&self, problem: &CohortProblem<T>) -> Result<EngineOutcome<T>, Self::Error> {
        run(problem, &self.config, self.cancel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::InfeasibleReason;
    use cohort_alloc_core::time::{TimeDelta, TimeInterval, TimePoint};
    use cohort_alloc_model::{
        generator::{InstanceGenConfigBuilder, InstanceGenerator},
        normalize::Normalizer,
    };

    fn ti(a: i64, b: i64) -> TimeInterval<i64> {
        TimeInterval::new(TimePoint::new(a), TimePoint::new(b))
    }

    /// 09:00-11:00, four participants and one facilitator around the whole window.
    fn morning(target: usize, extra: &[RawResponse<i64>]) -> (CohortProblem<i64>, Vec<ParticipantId>) {
        let window = ti(540, 660);
        let mut raw: Vec<RawResponse<i64>> = ["a", "b", "c", "d"]
            .iter()
            .map(|n| RawResponse::new(*n, vec![window]))
            .collect();
        raw.extend_from_slice(extra);

        let block = TimeDelta::new(60);
        let normalized = Normalizer::new(block).normalize_participants(&raw).unwrap();
        let (available, unavailable) = normalized.into_parts();

        let params = CohortParams::new(2, 4, block, target).unwrap();
        let mut b = CohortProblemBuilder::new(params);
        b.availability(available).unwrap();
        b.add_facilitator(Facilitator::new("f", vec![window], 1))
            .unwrap();
        b.add_day(window);
        (b.build().unwrap(), unavailable)
    }

    #[test]
    fn test_single_facilitator_takes_the_largest_group() {
        let (problem, _) = morning(1, &[]);
        let out = schedule_cohorts(&problem, &EngineConfig::default()).unwrap();
        let schedule = out.schedule();
        assert_eq!(schedule.len(), 1);

        let cohort = &schedule.cohorts()[0];
        assert_eq!(cohort.size(), 4);
        assert_eq!(cohort.slot(), ti(540, 600));
        assert_eq!(cohort.facilitator().as_str(), "f");
        assert_eq!(schedule.remaining_capacity("f"), Some(0));
        schedule.validate(&problem).unwrap();
    }

    #[test]
    fn test_second_cohort_is_infeasible() {
        let (problem, _) = morning(2, &[]);
        let err = schedule_cohorts(&problem, &EngineConfig::default()).unwrap_err();
        match err {
            ScheduleError::Infeasible(e) => {
                assert_eq!(e.requested(), 2);
                assert_eq!(e.reason(), InfeasibleReason::InsufficientCapacity { total: 1 });
            }
            other => panic!("expected infeasible, got {other}"),
        }
    }

    #[test]
    fn test_short_responder_is_reported_unavailable() {
        let short = RawResponse::new("short", vec![ti(540, 570)]);
        let (problem, unavailable) = morning(1, &[short]);
        assert_eq!(unavailable, vec![ParticipantId::new("short")]);

        let out = schedule_cohorts(&problem, &EngineConfig::default()).unwrap();
        assert!(!out.schedule().scheduled_participants().any(|p| p.as_str() == "short"));
        assert!(out.schedule().unassigned(problem.availability()).is_empty());
    }

    #[test]
    fn test_zero_target_returns_untouched_capacity() {
        let (problem, _) = morning(0, &[]);
        let out = schedule_cohorts(&problem, &EngineConfig::default()).unwrap();
        assert!(out.schedule().is_empty());
        assert_eq!(out.schedule().remaining_capacity("f"), Some(1));
    }

    #[test]
    fn test_non_positive_step_is_malformed() {
        let (problem, _) = morning(1, &[]);
        let config = EngineConfig {
            generator: GeneratorConfig {
                step: TimeDelta::new(-5),
                ..GeneratorConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(matches!(
            schedule_cohorts(&problem, &config),
            Err(ScheduleError::MalformedInput(MalformedInputError::Step(_)))
        ));
    }

    #[test]
    fn test_candidate_limit_aborts() {
        let (problem, _) = morning(1, &[]);
        let config = EngineConfig {
            generator: GeneratorConfig {
                max_candidates: Some(1),
                ..GeneratorConfig::default()
            },
            ..EngineConfig::default()
        };
        match schedule_cohorts(&problem, &config) {
            Err(ScheduleError::Aborted(e)) => {
                assert!(matches!(e.reason(), AbortReason::CandidateLimit { limit: 1, .. }))
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[test]
    fn test_cancelled_engine_aborts() {
        let (problem, _) = morning(1, &[]);
        let engine = CohortEngine::new(EngineConfig::default());
        engine.cancellation_token().cancel();
        assert!(matches!(
            engine.solve(&problem),
            Err(ScheduleError::Aborted(e)) if e.reason() == AbortReason::Cancelled
        ));
    }

    fn bounded() -> EngineConfig<i64> {
        EngineConfig {
            generator: GeneratorConfig {
                max_candidates: Some(50_000),
                ..GeneratorConfig::default()
            },
            search: SearchConfig {
                max_nodes: Some(200_000),
                ..SearchConfig::default()
            },
        }
    }

    fn instances() -> impl Iterator<Item = CohortProblem<i64>> {
        let base = InstanceGenConfigBuilder::<i64>::new()
            .participants(12)
            .facilitators(3)
            .days(1)
            .intervals_range(2, 3)
            .capacity_range(1, 2)
            .cohort_sizes(2, 3)
            .target_count(2)
            .seed(0)
            .build()
            .unwrap();
        (0..16u64).map(move |seed| InstanceGenerator::new(base.with_seed(seed)).generate())
    }

    #[test]
    fn test_random_instances_respect_invariants() {
        let engine = CohortEngine::new(bounded());
        let mut solved = 0;
        for problem in instances() {
            match engine.solve(&problem) {
                Ok(out) => {
                    assert_eq!(out.schedule().len(), problem.params().target_count());
                    out.schedule().validate(&problem).unwrap();
                    solved += 1;
                }
                Err(ScheduleError::Infeasible(_)) | Err(ScheduleError::Aborted(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(solved > 0, "no random instance was solvable");
    }

    #[test]
    fn test_rerun_yields_same_count() {
        let engine = CohortEngine::new(bounded());
        for problem in instances().take(4) {
            let first = engine.solve(&problem).map(|o| o.schedule().len());
            let second = engine.solve(&problem).map(|o| o.schedule().len());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_gate_failure_implies_infeasible() {
        let config = bounded();
        let generator = CandidateGenerator::new(config.generator).unwrap();
        for problem in instances() {
            let Ok(candidates) = generator.generate(&problem) else {
                continue;
            };
            let target = problem.params().target_count();
            if !FeasibilityGate::is_feasible(&candidates, target, problem.roster()) {
                assert!(matches!(
                    schedule_cohorts(&problem, &config),
                    Err(ScheduleError::Infeasible(_))
                ));
            }
        }
        // A roster without capacity always fails the gate.
        let (problem, _) = morning(1, &[]);
        let mut starved = CohortProblemBuilder::new(*problem.params());
        starved
            .availability(problem.availability().clone())
            .unwrap()
            .add_facilitator(Facilitator::new("idle", vec![ti(540, 660)], 0))
            .unwrap()
            .add_day(ti(540, 660));
        let starved = starved.build().unwrap();
        assert!(matches!(
            schedule_cohorts(&starved, &config),
            Err(ScheduleError::Infeasible(_))
        ));
    }
}
