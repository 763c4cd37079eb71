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

//! # Cohort Allocation Solver (`cohort-alloc-solver`)
//!
//! Turns a [`CohortProblem`](cohort_alloc_model::problem::CohortProblem) into a
//! [`Schedule`](cohort_alloc_model::schedule::Schedule) of exactly the requested
//! number of facilitated cohorts.
//!
//! The pipeline has three stages:
//!
//! 1. [`candidates::CandidateGenerator`] enumerates every feasible group per slot.
//! 2. [`feasibility::FeasibilityGate`] rejects requests that cannot be met on counts alone.
//! 3. [`search::BacktrackingSelector`] picks conflict-free cohorts, larger groups first,
//!    with facilitator capacity tracked by a [`capacity::CapacityLedger`].
//!
//! [`engine::schedule_cohorts`] runs all three; [`engine::CohortEngine`] does the
//! same behind the [`framework::Solver`] trait.

pub mod candidates;
pub mod capacity;
pub mod engine;
pub mod feasibility;
pub mod framework;
pub mod search;

pub mod prelude {
    pub use crate::candidates::{CandidateGenerator, GeneratorConfig};
    pub use crate::engine::{
        CohortEngine, EngineConfig, EngineOutcome, MalformedInputError, ScheduleError,
        schedule_cohorts,
    };
    pub use crate::feasibility::{FeasibilityGate, InfeasibleError, InfeasibleReason};
    pub use crate::framework::Solver;
    pub use crate::search::{
        AbortReason, BacktrackingSelector, CancellationToken, SearchAbortedError, SearchConfig,
        SearchStats, SelectError,
    };
}
