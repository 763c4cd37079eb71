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
    time::{TimeInterval, TimePoint},
};
use std::fmt::Display;

/// A feasible group of participants for one slot, not yet given a facilitator.
///
/// Every member covers the slot. Member order is the combination order the
/// generator produced it in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateCohort<T: SolverVariable> {
    slot: TimeInterval<T>,
    members: Box<[ParticipantId]>,
}

impl<T: SolverVariable> CandidateCohort<T> {
    #[inline]
    pub fn new(slot: TimeInterval<T>, members: impl Into<Box<[ParticipantId]>>) -> Self {
        Self {
            slot,
            members: members.into(),
        }
    }

    #[inline]
    pub fn slot(&self) -> TimeInterval<T> {
        self.slot
    }

    #[inline]
    pub fn start_time(&self) -> TimePoint<T> {
        self.slot.start()
    }

    #[inline]
    pub fn end_time(&self) -> TimePoint<T> {
        self.slot.end()
    }

    #[inline]
    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn has_member(&self, id: &ParticipantId) -> bool {
        self.members.contains(id)
    }

    /// Commits this candidate under `facilitator`.
    #[inline]
    pub fn schedule(&self, facilitator: FacilitatorId) -> ScheduledCohort<T> {
        ScheduledCohort {
            slot: self.slot,
            members: self.members.clone(),
            facilitator,
        }
    }
}

impl<T: SolverVariable> Display for CandidateCohort<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Candidate({}, {} members)", self.slot, self.members.len())
    }
}

/// A committed cohort: slot, members and the facilitator leading it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScheduledCohort<T: SolverVariable> {
    slot: TimeInterval<T>,
    members: Box<[ParticipantId]>,
    facilitator: FacilitatorId,
}

impl<T: SolverVariable> ScheduledCohort<T> {
    #[inline]
    pub fn new(
        slot: TimeInterval<T>,
        members: impl Into<Box<[ParticipantId]>>,
        facilitator: FacilitatorId,
    ) -> Self {
        Self {
            slot,
            members: members.into(),
            facilitator,
        }
    }

    #[inline]
    pub fn slot(&self) -> TimeInterval<T> {
        self.slot
    }

    #[inline]
    pub fn start_time(&self) -> TimePoint<T> {
        self.slot.start()
    }

    #[inline]
    pub fn end_time(&self) -> TimePoint<T> {
        self.slot.end()
    }

    #[inline]
    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn facilitator(&self) -> &FacilitatorId {
        &self.facilitator
    }
}

impl<T: SolverVariable> Display for ScheduledCohort<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cohort({}, {} members, {})",
            self.slot,
            self.members.len(),
            self.facilitator
        )
    }
}
