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

//! Splitting one intake into independent per-track problems.
//!
//! A course with several tracks runs one engine pass per track. Participants
//! are grouped by their track; facilitators are filtered to the track they
//! lead. Anybody without a known track ends up in the remainder.

use crate::{
    availability::AvailabilitySet,
    err::ProblemBuildError,
    facilitator::Roster,
    id::{ParticipantId, Track},
};
use cohort_alloc_core::SolverVariable;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T: SolverVariable> {
    groups: Vec<(Track, AvailabilitySet<T>)>,
    remainder: AvailabilitySet<T>,
}

impl<T: SolverVariable> Partition<T> {
    /// Groups in order of first appearance in the population.
    #[inline]
    pub fn groups(&self) -> &[(Track, AvailabilitySet<T>)] {
        &self.groups
    }

    #[inline]
    pub fn group(&self, track: &str) -> Option<&AvailabilitySet<T>> {
        self.groups
            .iter()
            .find(|(t, _)| t.as_str() == track)
            .map(|(_, set)| set)
    }

    /// Participants without a track.
    #[inline]
    pub fn remainder(&self) -> &AvailabilitySet<T> {
        &self.remainder
    }
}

/// Splits `population` by `tracks`, keeping population order inside every group.
pub fn partition_by_track<T: SolverVariable>(
    population: &AvailabilitySet<T>,
    tracks: &HashMap<ParticipantId, Track>,
) -> Result<Partition<T>, ProblemBuildError<T>> {
    let mut groups: Vec<(Track, AvailabilitySet<T>)> = Vec::new();
    let mut remainder = AvailabilitySet::new();

    for a in population.iter() {
        let target = match tracks.get(a.id()) {
            Some(track) => {
                let slot = groups.iter().position(|(t, _)| t == track);
                let i = slot.unwrap_or_else(|| {
                    groups.push((track.clone(), AvailabilitySet::new()));
                    groups.len() - 1
                });
                &mut groups[i].1
            }
            None => &mut remainder,
        };
        target.insert(a.id().clone(), a.intervals().to_vec())?;
    }

    Ok(Partition { groups, remainder })
}

/// Facilitators leading `track`, in roster order.
pub fn roster_for_track<T: SolverVariable>(
    roster: &Roster<T>,
    track: &Track,
) -> Result<Roster<T>, ProblemBuildError<T>> {
    Roster::try_from_facilitators(
        roster
            .iter()
            .filter(|f| f.track() == Some(track))
            .cloned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facilitator::Facilitator;
    use cohort_alloc_core::time::{TimeInterval, TimePoint};

    fn ti(a: i64, b: i64) -> TimeInterval<i64> {
        TimeInterval::new(TimePoint::new(a), TimePoint::new(b))
    }

    #[test]
    fn test_partition_keeps_order_and_remainder() {
        let population = AvailabilitySet::try_from_entries([
            ("p1", vec![ti(0, 60)]),
            ("p2", vec![ti(0, 60)]),
            ("p3", vec![ti(0, 60)]),
            ("p4", vec![ti(0, 60)]),
        ])
        .unwrap();
        let tracks: HashMap<ParticipantId, Track> = HashMap::from([
            ("p1".into(), "gov".into()),
            ("p2".into(), "align".into()),
            ("p4".into(), "gov".into()),
        ]);

        let part = partition_by_track(&population, &tracks).unwrap();
        let names: Vec<&str> = part.groups().iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(names, vec!["gov", "align"]);

        let gov: Vec<&str> = part.group("gov").unwrap().ids().map(|i| i.as_str()).collect();
        assert_eq!(gov, vec!["p1", "p4"]);
        assert_eq!(part.group("align").unwrap().len(), 1);
        assert!(part.remainder().contains("p3"));
        assert!(part.group("econ").is_none());
    }

    #[test]
    fn test_roster_for_track_filters() {
        let roster = Roster::try_from_facilitators([
            Facilitator::new("f1", vec![ti(0, 60)], 1).with_track("gov"),
            Facilitator::new("f2", vec![ti(0, 60)], 1).with_track("align"),
            Facilitator::new("f3", vec![ti(0, 60)], 1),
            Facilitator::new("f4", vec![ti(0, 60)], 2).with_track("gov"),
        ])
        .unwrap();
        let gov = roster_for_track(&roster, &"gov".into()).unwrap();
        let ids: Vec<&str> = gov.iter().map(|f| f.id().as_str()).collect();
        assert_eq!(ids, vec!["f1", "f4"]);
        assert_eq!(gov.total_capacity(), 3);
    }
}
