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

use crate::err::InvalidParamsError;
use cohort_alloc_core::SolverVariable;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeError {
    what: &'static str,
    min: u64,
    max: u64,
}

impl RangeError {
    pub fn new(what: &'static str, min: u64, max: u64) -> Self {
        Self { what, min, max }
    }
    pub fn what(&self) -> &'static str {
        self.what
    }
    pub fn min(&self) -> u64 {
        self.min
    }
    pub fn max(&self) -> u64 {
        self.max
    }
}

impl Display for RangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RangeError: {} has min {} above max {}",
            self.what, self.min, self.max
        )
    }
}

impl std::error::Error for RangeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceGenConfigBuildError<T: SolverVariable> {
    MissingParticipants,
    MissingFacilitators,
    MissingDays,
    NoDays,
    NonPositiveDayLength,
    NonPositiveGrid,
    IntervalTooShort,
    Range(RangeError),
    Params(InvalidParamsError<T>),
}

impl<T: SolverVariable> Display for InstanceGenConfigBuildError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use InstanceGenConfigBuildError::*;
        match self {
            MissingParticipants => write!(f, "Missing participants"),
            MissingFacilitators => write!(f, "Missing facilitators"),
            MissingDays => write!(f, "Missing days"),
            NoDays => write!(f, "At least one event day is required"),
            NonPositiveDayLength => write!(f, "day_length must be positive"),
            NonPositiveGrid => write!(f, "grid must be positive"),
            IntervalTooShort => write!(f, "min_interval_length must be at least one grid step"),
            Range(e) => write!(f, "{}", e),
            Params(e) => write!(f, "{}", e),
        }
    }
}

impl<T: SolverVariable> From<RangeError> for InstanceGenConfigBuildError<T> {
    fn from(err: RangeError) -> Self {
        Self::Range(err)
    }
}

impl<T: SolverVariable> From<InvalidParamsError<T>> for InstanceGenConfigBuildError<T> {
    fn from(err: InvalidParamsError<T>) -> Self {
        Self::Params(err)
    }
}

impl<T: SolverVariable> std::error::Error for InstanceGenConfigBuildError<T> {}
