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

use crate::{
    availability::{AvailabilitySet, EventWindow},
    err::{EmptyIntervalError, ProblemBuildError},
    facilitator::{Facilitator, Roster},
    id::ParticipantId,
    params::CohortParams,
};
use cohort_alloc_core::{SolverVariable, time::TimeInterval};

/// One complete, validated input to the scheduling engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortProblem<T: SolverVariable> {
    availability: AvailabilitySet<T>,
    window: EventWindow<T>,
    roster: Roster<T>,
    params: CohortParams<T>,
}

impl<T: SolverVariable> CohortProblem<T> {
    #[inline]
    pub fn availability(&self) -> &AvailabilitySet<T> {
        &self.availability
    }

    #[inline]
    pub fn window(&self) -> &EventWindow<T> {
        &self.window
    }

    #[inline]
    pub fn roster(&self) -> &Roster<T> {
        &self.roster
    }

    #[inline]
    pub fn params(&self) -> &CohortParams<T> {
        &self.params
    }

    /// Same population and roster with different parameters.
    #[inline]
    pub fn with_params(&self, params: CohortParams<T>) -> Self {
        Self {
            params,
            ..self.clone()
        }
    }
}

fn check_intervals<T: SolverVariable>(
    owner: &str,
    intervals: &[TimeInterval<T>],
) -> Result<(), EmptyIntervalError<T>> {
    match intervals.iter().find(|i| i.is_empty()) {
        Some(i) => Err(EmptyIntervalError::new(owner, i.start())),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct CohortProblemBuilder<T: SolverVariable> {
    availability: AvailabilitySet<T>,
    window: Vec<TimeInterval<T>>,
    roster: Roster<T>,
    params: CohortParams<T>,
}

impl<T: SolverVariable> CohortProblemBuilder<T> {
    pub fn new(params: CohortParams<T>) -> Self {
        Self {
            availability: AvailabilitySet::new(),
            window: Vec::new(),
            roster: Roster::new(),
            params,
        }
    }

    pub fn add_participant(
        &mut self,
        id: impl Into<ParticipantId>,
        intervals: Vec<TimeInterval<T>>,
    ) -> Result<&mut Self, ProblemBuildError<T>> {
        let id = id.into();
        check_intervals(id.as_str(), &intervals)?;
        self.availability.insert(id, intervals)?;
        Ok(self)
    }

    pub fn add_facilitator(
        &mut self,
        facilitator: Facilitator<T>,
    ) -> Result<&mut Self, ProblemBuildError<T>> {
        check_intervals(facilitator.id().as_str(), facilitator.intervals())?;
        self.roster.push(facilitator)?;
        Ok(self)
    }

    pub fn add_day(&mut self, bounds: TimeInterval<T>) -> &mut Self {
        self.window.push(bounds);
        self
    }

    /// Replaces the participant population, e.g. with normalizer output.
    pub fn availability(
        &mut self,
        availability: AvailabilitySet<T>,
    ) -> Result<&mut Self, ProblemBuildError<T>> {
        for a in availability.iter() {
            check_intervals(a.id().as_str(), a.intervals())?;
        }
        self.availability = availability;
        Ok(self)
    }

    pub fn roster(&mut self, roster: Roster<T>) -> Result<&mut Self, ProblemBuildError<T>> {
        for f in roster.iter() {
            check_intervals(f.id().as_str(), f.intervals())?;
        }
        self.roster = roster;
        Ok(self)
    }

    pub fn window(&mut self, window: EventWindow<T>) -> &mut Self {
        self.window = window.days().to_vec();
        self
    }

    pub fn build(&self) -> Result<CohortProblem<T>, ProblemBuildError<T>> {
        if self.window.is_empty() {
            return Err(ProblemBuildError::EmptyEventWindow);
        }
        Ok(CohortProblem {
            availability: self.availability.clone(),
            window: EventWindow::new(self.window.clone()),
            roster: self.roster.clone(),
            params: self.params,
        })
    }
}
