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

use crate::{err::ProblemBuildError, id::ParticipantId};
use cohort_alloc_core::{SolverVariable, time::TimeInterval};
use std::collections::HashMap;

/// Returns `true` if one of `intervals` fully contains `slot`.
///
/// Partial overlap never counts: somebody who can only join late or leave
/// early is not available for the slot.
#[inline]
pub fn covers<T: SolverVariable>(intervals: &[TimeInterval<T>], slot: &TimeInterval<T>) -> bool {
    intervals.iter().any(|i| i.contains_interval(slot))
}

/// One raw responder from an availability poll, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse<T: SolverVariable> {
    name: String,
    intervals: Vec<TimeInterval<T>>,
}

impl<T: SolverVariable> RawResponse<T> {
    #[inline]
    pub fn new(name: impl Into<String>, intervals: Vec<TimeInterval<T>>) -> Self {
        Self {
            name: name.into(),
            intervals,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn intervals(&self) -> &[TimeInterval<T>] {
        &self.intervals
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability<T: SolverVariable> {
    id: ParticipantId,
    intervals: Vec<TimeInterval<T>>,
}

impl<T: SolverVariable> Availability<T> {
    #[inline]
    pub fn new(id: ParticipantId, intervals: Vec<TimeInterval<T>>) -> Self {
        Self { id, intervals }
    }

    #[inline]
    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    #[inline]
    pub fn intervals(&self) -> &[TimeInterval<T>] {
        &self.intervals
    }

    #[inline]
    pub fn covers(&self, slot: &TimeInterval<T>) -> bool {
        covers(&self.intervals, slot)
    }
}

/// Participant availability keyed by id.
///
/// Iteration follows insertion order. That order is part of the contract:
/// the candidate generator enumerates combinations over it, so it decides
/// which groups are tried first when sizes tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySet<T: SolverVariable> {
    entries: Vec<Availability<T>>,
    index: HashMap<ParticipantId, usize>,
}

impl<T: SolverVariable> Default for AvailabilitySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SolverVariable> AvailabilitySet<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Appends a participant. Ids must be unique.
    pub fn insert(
        &mut self,
        id: ParticipantId,
        intervals: Vec<TimeInterval<T>>,
    ) -> Result<(), ProblemBuildError<T>> {
        if self.index.contains_key(&id) {
            return Err(ProblemBuildError::DuplicateParticipant(id));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(Availability::new(id, intervals));
        Ok(())
    }

    pub fn try_from_entries<I, P>(entries: I) -> Result<Self, ProblemBuildError<T>>
    where
        I: IntoIterator<Item = (P, Vec<TimeInterval<T>>)>,
        P: Into<ParticipantId>,
    {
        let mut set = Self::new();
        for (id, intervals) in entries {
            set.insert(id.into(), intervals)?;
        }
        Ok(set)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Availability<T>> + '_ {
        self.entries.iter()
    }

    #[inline]
    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> + '_ {
        self.entries.iter().map(|a| a.id())
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Availability<T>> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Participants covering `slot`, in set order.
    #[inline]
    pub fn iter_available<'a>(
        &'a self,
        slot: &'a TimeInterval<T>,
    ) -> impl Iterator<Item = &'a Availability<T>> + 'a {
        self.entries.iter().filter(move |a| a.covers(slot))
    }
}

/// Legal meeting bounds, one entry per event day, in day order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWindow<T: SolverVariable> {
    days: Vec<TimeInterval<T>>,
}

impl<T: SolverVariable> EventWindow<T> {
    #[inline]
    pub fn new(days: Vec<TimeInterval<T>>) -> Self {
        Self { days }
    }

    #[inline]
    pub fn days(&self) -> &[TimeInterval<T>] {
        &self.days
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.days.len()
    }
}

impl<T: SolverVariable> FromIterator<TimeInterval<T>> for EventWindow<T> {
    fn from_iter<I: IntoIterator<Item = TimeInterval<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
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
    fn test_covers_requires_containment() {
        let blocks = vec![ti(0, 60), ti(120, 240)];
        assert!(covers(&blocks, &ti(0, 60)));
        assert!(covers(&blocks, &ti(150, 210)));
        assert!(!covers(&blocks, &ti(30, 90)));
        assert!(!covers(&blocks, &ti(60, 120)));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let set = AvailabilitySet::try_from_entries([
            ("zoe", vec![ti(0, 60)]),
            ("adam", vec![ti(0, 60)]),
            ("mia", vec![ti(0, 60)]),
        ])
        .unwrap();
        let names: Vec<&str> = set.ids().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["zoe", "adam", "mia"]);
        assert_eq!(set.get("adam").unwrap().intervals(), &[ti(0, 60)]);
    }

    #[test]
    fn test_duplicate_participant_is_rejected() {
        let err = AvailabilitySet::try_from_entries([("ada", vec![]), ("ada", vec![ti(0, 1)])])
            .unwrap_err();
        assert_eq!(err, ProblemBuildError::DuplicateParticipant("ada".into()));
    }

    #[test]
    fn test_iter_available_filters_by_slot() {
        let set = AvailabilitySet::try_from_entries([
            ("a", vec![ti(0, 120)]),
            ("b", vec![ti(60, 120)]),
            ("c", vec![ti(0, 30), ti(30, 120)]),
        ])
        .unwrap();
        let slot = ti(0, 60);
        let names: Vec<&str> = set.iter_available(&slot).map(|a| a.id().as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}
