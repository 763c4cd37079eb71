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

//! # Cohort Allocation Model (`cohort-alloc-model`)
//!
//! This crate holds the data model for forming facilitated **cohorts** out of an
//! availability poll. It builds on the time primitives of `cohort-alloc-core`.
//!
//! ## Key Data Structures
//!
//! - **`ParticipantId`**, **`FacilitatorId`**, **`Track`**: cheap-clone string identifiers.
//! - **`AvailabilitySet<T>`**: every participant's free intervals, in poll order. That order
//!   fixes the order in which candidate groups are enumerated.
//! - **`EventWindow<T>`**: the legal meeting bounds of each event day.
//! - **`Facilitator<T>`** / **`Roster<T>`**: who can lead a cohort, when, and how many.
//! - **`CohortParams<T>`**: size range, meeting length and number of cohorts wanted.
//! - **`CohortProblem<T>`**: a validated input, built with `CohortProblemBuilder<T>`.
//! - **`CandidateCohort<T>`** and **`ScheduledCohort<T>`**: a feasible group for one slot,
//!   before and after a facilitator has been committed to it.
//! - **`Schedule<T>`**: the committed cohorts, remaining facilitator capacity, and checks
//!   against the problem it solves.
//!
//! ## Boundary adapters
//!
//! [`poll`] parses poll exports, [`calendar`] aligns facilitator dates with participant
//! dates, [`normalize`] filters responders, [`partition`] splits an intake by track.
//! [`generator`] produces seeded synthetic instances.

pub mod availability;
pub mod calendar;
pub mod cohort;
pub mod err;
pub mod facilitator;
pub mod generator;
pub mod id;
pub mod normalize;
pub mod params;
pub mod partition;
pub mod poll;
pub mod problem;
pub mod schedule;

pub mod prelude {
    pub use crate::availability::{Availability, AvailabilitySet, EventWindow, RawResponse};
    pub use crate::cohort::{CandidateCohort, ScheduledCohort};
    pub use crate::err::{EmptyIntervalError, InvalidParamsError, ProblemBuildError};
    pub use crate::facilitator::{Facilitator, Roster};
    pub use crate::id::{FacilitatorId, ParticipantId, Track};
    pub use crate::params::CohortParams;
    pub use crate::problem::{CohortProblem, CohortProblemBuilder};
    pub use crate::schedule::{Schedule, ScheduleValidationError};
}
