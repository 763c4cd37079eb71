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
    availability::covers,
    err::ProblemBuildError,
    id::{FacilitatorId, Track},
};
use cohort_alloc_core::{SolverVariable, time::TimeInterval};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facilitator<T: SolverVariable> {
    id: FacilitatorId,
    intervals: Vec<TimeInterval<T>>,
    capacity: u32,
    track: Option<Track>,
}

impl<T: SolverVariable> Facilitator<T> {
    #[inline]
    pub fn new(id: impl Into<FacilitatorId>, intervals: Vec<TimeInterval<T>>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            intervals,
            capacity,
            track: None,
        }
    }

    #[inline]
    pub fn with_track(mut self, track: impl Into<Track>) -> Self {
        self.track = Some(track.into());
        self
    }

    #[inline]
    pub fn id(&self) -> &FacilitatorId {
        &self.id
    }

    #[inline]
    pub fn intervals(&self) -> &[TimeInterval<T>] {
        &self.intervals
    }

    /// Maximum number of cohorts this facilitator may lead.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    #[inline]
    pub fn covers(&self, slot: &TimeInterval<T>) -> bool {
        covers(&self.intervals, slot)
    }
}

/// Ordered facilitator list.
///
/// The order is the assignment scan order: when several facilitators could
/// lead a cohort the earliest one in the roster with spare capacity wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster<T: SolverVariable> {
    facilitators: Vec<Facilitator<T>>,
    index: HashMap<FacilitatorId, usize>,
}

impl<T: SolverVariable> Default for Roster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SolverVariable> Roster<T> {
    pub fn new() -> Self {
        Self {
            facilitators: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn push(&mut self, facilitator: Facilitator<T>) -> Result<(), ProblemBuildError<T>> {
        if self.index.contains_key(facilitator.id()) {
            return Err(ProblemBuildError::DuplicateFacilitator(
                facilitator.id().clone(),
            ));
        }
        self.index
            .insert(facilitator.id().clone(), self.facilitators.len());
        self.facilitators.push(facilitator);
        Ok(())
    }

    pub fn try_from_facilitators<I>(facilitators: I) -> Result<Self, ProblemBuildError<T>>
    where
        I: IntoIterator<Item = Facilitator<T>>,
    {
        let mut roster = Self::new();
        for f in facilitators {
            roster.push(f)?;
        }
        Ok(roster)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.facilitators.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.facilitators.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Facilitator<T>] {
        &self.facilitators
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Facilitator<T>> + '_ {
        self.facilitators.iter()
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Facilitator<T>> {
        self.index.get(id).map(|&i| &self.facilitators[i])
    }

    #[inline]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Sum of declared capacities.
    #[inline]
    pub fn total_capacity(&self) -> u64 {
        self.facilitators.iter().map(|f| u64::from(f.capacity())).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_alloc_core::time::TimePoint;

    fn ti(a: i64, b: i64) -> TimeInterval<i64> {
        TimeInterval::new(TimePoint::new(a), TimePoint::new(b))
    }

    #[test]
    fn test_roster_keeps_order_and_sums_capacity() {
        let roster = Roster::try_from_facilitators([
            Facilitator::new("f2", vec![ti(0, 60)], 2),
            Facilitator::new("f1", vec![ti(0, 60)], 1).with_track("align"),
        ])
        .unwrap();
        let ids: Vec<&str> = roster.iter().map(|f| f.id().as_str()).collect();
        assert_eq!(ids, vec!["f2", "f1"]);
        assert_eq!(roster.total_capacity(), 3);
        assert_eq!(roster.position("f1"), Some(1));
        assert_eq!(roster.get("f1").unwrap().track().unwrap().as_str(), "align");
    }

    #[test]
    fn test_duplicate_facilitator_is_rejected() {
        let err = Roster::try_from_facilitators([
            Facilitator::new("f", vec![ti(0, 60)], 1),
            Facilitator::new("f", vec![ti(0, 60)], 1),
        ])
        .unwrap_err();
        assert_eq!(err, ProblemBuildError::DuplicateFacilitator("f".into()));
    }

    #[test]
    fn test_covers_slot() {
        let f = Facilitator::new("f", vec![ti(0, 90)], 1);
        assert!(f.covers(&ti(30, 90)));
        assert!(!f.covers(&ti(60, 120)));
    }
}
