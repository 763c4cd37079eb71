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

use crate::id::{FacilitatorId, ParticipantId};
use cohort_alloc_core::{
    SolverVariable,
    time::{TimeDelta, TimePoint},
};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmptyIntervalError<T: SolverVariable> {
    owner: String,
    at: TimePoint<T>,
}

impl<T: SolverVariable> EmptyIntervalError<T> {
    #[inline]
    pub fn new(owner: impl Into<String>, at: TimePoint<T>) -> Self {
        Self {
            owner: owner.into(),
            at,
        }
    }

    #[inline]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[inline]
    pub fn at(&self) -> TimePoint<T> {
        self.at
    }
}

impl<T: SolverVariable> Display for EmptyIntervalError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Availability of {} contains an empty interval at {}",
            self.owner, self.at
        )
    }
}

impl<T: SolverVariable> std::error::Error for EmptyIntervalError<T> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidParamsError<T: SolverVariable> {
    /// Cohorts must have at least one member.
    MinSizeZero,
    /// `max_size` is smaller than `min_size`.
    MaxBelowMin { min_size: usize, max_size: usize },
    /// The meeting length must be positive.
    NonPositiveTimeBlock(TimeDelta<T>),
}

impl<T: SolverVariable> Display for InvalidParamsError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidParamsError::MinSizeZero => write!(f, "Minimum cohort size must be at least 1"),
            InvalidParamsError::MaxBelowMin { min_size, max_size } => write!(
                f,
                "Maximum cohort size {} is below minimum cohort size {}",
                max_size, min_size
            ),
            InvalidParamsError::NonPositiveTimeBlock(d) => {
                write!(f, "Meeting time block must be positive, got {}", d)
            }
        }
    }
}

impl<T: SolverVariable> std::error::Error for InvalidParamsError<T> {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemBuildError<T: SolverVariable> {
    DuplicateParticipant(ParticipantId),
    DuplicateFacilitator(FacilitatorId),
    EmptyInterval(EmptyIntervalError<T>),
    InvalidParams(InvalidParamsError<T>),
    EmptyEventWindow,
}

impl<T: SolverVariable> Display for ProblemBuildError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemBuildError::DuplicateParticipant(id) => {
                write!(f, "Duplicate participant: {}", id)
            }
            ProblemBuildError::DuplicateFacilitator(id) => {
                write!(f, "Duplicate facilitator: {}", id)
            }
            ProblemBuildError::EmptyInterval(e) => write!(f, "{e}"),
            ProblemBuildError::InvalidParams(e) => write!(f, "{e}"),
            ProblemBuildError::EmptyEventWindow => write!(f, "Event window has no days"),
        }
    }
}

impl<T: SolverVariable> std::error::Error for ProblemBuildError<T> {}

impl<T: SolverVariable> From<InvalidParamsError<T>> for ProblemBuildError<T> {
    fn from(value: InvalidParamsError<T>) -> Self {
        ProblemBuildError::InvalidParams(value)
    }
}

impl<T: SolverVariable> From<EmptyIntervalError<T>> for ProblemBuildError<T> {
    fn from(value: EmptyIntervalError<T>) -> Self {
        ProblemBuildError::EmptyInterval(value)
    }
}
