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
    availability::AvailabilitySet,
    cohort::ScheduledCohort,
    id::{FacilitatorId, ParticipantId},
    problem::CohortProblem,
};
use cohort_alloc_core::{SolverVariable, time::TimeInterval};
use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleValidationError<T: SolverVariable> {
    CountMismatch {
        expected: usize,
        actual: usize,
    },
    UnknownParticipant(ParticipantId),
    UnknownFacilitator(FacilitatorId),
    DuplicateParticipant(ParticipantId),
    SizeOutOfRange {
        slot: TimeInterval<T>,
        size: usize,
        min_size: usize,
        max_size: usize,
    },
    ParticipantUnavailable {
        participant: ParticipantId,
        slot: TimeInterval<T>,
    },
    FacilitatorUnavailable {
        facilitator: FacilitatorId,
        slot: TimeInterval<T>,
    },
    CapacityExceeded {
        facilitator: FacilitatorId,
        capacity: u32,
        assigned: u32,
    },
    FacilitatorDoubleBooked {
        facilitator: FacilitatorId,
        first: TimeInterval<T>,
        second: TimeInterval<T>,
    },
}

impl<T: SolverVariable> Display for ScheduleValidationError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountMismatch { expected, actual } => {
                write!(f, "Expected {} cohorts, schedule has {}", expected, actual)
            }
            Self::UnknownParticipant(p) => write!(f, "{} is not part of the problem", p),
            Self::UnknownFacilitator(id) => write!(f, "{} is not on the roster", id),
            Self::DuplicateParticipant(p) => write!(f, "{} is in more than one cohort", p),
            Self::SizeOutOfRange {
                slot,
                size,
                min_size,
                max_size,
            } => write!(
                f,
                "Cohort at {} has {} members, allowed {}..={}",
                slot, size, min_size, max_size
            ),
            Self::ParticipantUnavailable { participant, slot } => {
                write!(f, "{} is not available for {}", participant, slot)
            }
            Self::FacilitatorUnavailable { facilitator, slot } => {
                write!(f, "{} is not available for {}", facilitator, slot)
            }
            Self::CapacityExceeded {
                facilitator,
                capacity,
                assigned,
            } => write!(
                f,
                "{} leads {} cohorts but has capacity {}",
                facilitator, assigned, capacity
            ),
            Self::FacilitatorDoubleBooked {
                facilitator,
                first,
                second,
            } => write!(
                f,
                "{} leads overlapping cohorts at {} and {}",
                facilitator, first, second
            ),
        }
    }
}

impl<T: SolverVariable> std::error::Error for ScheduleValidationError<T> {}

/// A conflict-free set of committed cohorts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule<T: SolverVariable> {
    cohorts: Vec<ScheduledCohort<T>>,
    remaining_capacity: Vec<(FacilitatorId, u32)>,
}

impl<T: SolverVariable> Schedule<T> {
    /// `remaining_capacity` lists every roster facilitator in roster order.
    #[inline]
    pub fn new(
        cohorts: Vec<ScheduledCohort<T>>,
        remaining_capacity: Vec<(FacilitatorId, u32)>,
    ) -> Self {
        Self {
            cohorts,
            remaining_capacity,
        }
    }

    #[inline]
    pub fn cohorts(&self) -> &[ScheduledCohort<T>] {
        &self.cohorts
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    #[inline]
    pub fn into_cohorts(self) -> Vec<ScheduledCohort<T>> {
        self.cohorts
    }

    /// Capacity left for `facilitator` after the search.
    #[inline]
    pub fn remaining_capacity(&self, facilitator: &str) -> Option<u32> {
        self.remaining_capacity
            .iter()
            .find(|(id, _)| id.as_str() == facilitator)
            .map(|(_, c)| *c)
    }

    #[inline]
    pub fn iter_remaining_capacity(&self) -> impl Iterator<Item = (&FacilitatorId, u32)> + '_ {
        self.remaining_capacity.iter().map(|(id, c)| (id, *c))
    }

    #[inline]
    pub fn scheduled_participants(&self) -> impl Iterator<Item = &ParticipantId> + '_ {
        self.cohorts.iter().flat_map(|c| c.members().iter())
    }

    #[inline]
    pub fn total_participants(&self) -> usize {
        self.cohorts.iter().map(|c| c.size()).sum()
    }

    /// Participants of `population` that ended up in no cohort, in population order.
    pub fn unassigned(&self, population: &AvailabilitySet<T>) -> Vec<ParticipantId> {
        let placed: HashSet<&ParticipantId> = self.scheduled_participants().collect();
        population
            .ids()
            .filter(|id| !placed.contains(id))
            .cloned()
            .collect()
    }

    /// Re-checks every schedule invariant against `problem`.
    pub fn validate(&self, problem: &CohortProblem<T>) -> Result<(), ScheduleValidationError<T>> {
        let params = problem.params();
        if self.cohorts.len() != params.target_count() {
            return Err(ScheduleValidationError::CountMismatch {
                expected: params.target_count(),
                actual: self.cohorts.len(),
            });
        }

        let mut seen: HashSet<&ParticipantId> = HashSet::new();
        let mut booked: HashMap<&FacilitatorId, Vec<TimeInterval<T>>> = HashMap::new();

        for cohort in &self.cohorts {
            let slot = cohort.slot();
            if !params.size_range().contains(&cohort.size()) {
                return Err(ScheduleValidationError::SizeOutOfRange {
                    slot,
                    size: cohort.size(),
                    min_size: params.min_size(),
                    max_size: params.max_size(),
                });
            }

            for member in cohort.members() {
                let availability = problem
                    .availability()
                    .get(member.as_str())
                    .ok_or_else(|| ScheduleValidationError::UnknownParticipant(member.clone()))?;
                if !availability.covers(&slot) {
                    return Err(ScheduleValidationError::ParticipantUnavailable {
                        participant: member.clone(),
                        slot,
                    });
                }
                if !seen.insert(member) {
                    return Err(ScheduleValidationError::DuplicateParticipant(
                        member.clone(),
                    ));
                }
            }

            let fid = cohort.facilitator();
            let facilitator = problem
                .roster()
                .get(fid.as_str())
                .ok_or_else(|| ScheduleValidationError::UnknownFacilitator(fid.clone()))?;
            if !facilitator.covers(&slot) {
                return Err(ScheduleValidationError::FacilitatorUnavailable {
                    facilitator: fid.clone(),
                    slot,
                });
            }
            let slots = booked.entry(fid).or_default();
            if let Some(&first) = slots.iter().find(|s| s.intersects(&slot)) {
                return Err(ScheduleValidationError::FacilitatorDoubleBooked {
                    facilitator: fid.clone(),
                    first,
                    second: slot,
                });
            }
            slots.push(slot);
            let assigned = slots.len() as u32;
            if assigned > facilitator.capacity() {
                return Err(ScheduleValidationError::CapacityExceeded {
                    facilitator: fid.clone(),
                    capacity: facilitator.capacity(),
                    assigned,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{facilitator::Facilitator, params::CohortParams, problem::CohortProblemBuilder};
    use cohort_alloc_core::time::{TimeDelta, TimePoint};

    fn ti(a: i64, b: i64) -> TimeInterval<i64> {
        TimeInterval::new(TimePoint::new(a), TimePoint::new(b))
    }

    fn ids(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|n| ParticipantId::new(n)).collect()
    }

    fn problem(target: usize, capacity: u32) -> CohortProblem<i64> {
        let params = CohortParams::new(2, 3, TimeDelta::new(60), target).unwrap();
        let mut b = CohortProblemBuilder::new(params);
        for name in ["a", "b", "c", "d"] {
            b.add_participant(name, vec![ti(0, 120)]).unwrap();
        }
        b.add_participant("late", vec![ti(60, 120)]).unwrap();
        b.add_facilitator(Facilitator::new("f", vec![ti(0, 120)], capacity))
            .unwrap();
        b.add_day(ti(0, 120));
        b.build().unwrap()
    }

    #[test]
    fn test_valid_schedule_and_unassigned() {
        let p = problem(2, 2);
        let s = Schedule::new(
            vec![
                ScheduledCohort::new(ti(0, 60), ids(&["a", "b"]), "f".into()),
                ScheduledCohort::new(ti(60, 120), ids(&["c", "late"]), "f".into()),
            ],
            vec![("f".into(), 0)],
        );
        assert_eq!(s.validate(&p), Ok(()));
        assert_eq!(s.unassigned(p.availability()), ids(&["d"]));
        assert_eq!(s.remaining_capacity("f"), Some(0));
        assert_eq!(s.total_participants(), 4);
    }

    #[test]
    fn test_duplicate_member_detected() {
        let p = problem(2, 2);
        let s = Schedule::new(
            vec![
                ScheduledCohort::new(ti(0, 60), ids(&["a", "b"]), "f".into()),
                ScheduledCohort::new(ti(60, 120), ids(&["b", "c"]), "f".into()),
            ],
            vec![],
        );
        assert_eq!(
            s.validate(&p),
            Err(ScheduleValidationError::DuplicateParticipant("b".into()))
        );
    }

    #[test]
    fn test_capacity_exceeded_detected() {
        let p = problem(2, 1);
        let s = Schedule::new(
            vec![
                ScheduledCohort::new(ti(0, 60), ids(&["a", "b"]), "f".into()),
                ScheduledCohort::new(ti(60, 120), ids(&["c", "d"]), "f".into()),
            ],
            vec![],
        );
        assert!(matches!(
            s.validate(&p),
            Err(ScheduleValidationError::CapacityExceeded { assigned: 2, .. })
        ));
    }

    #[test]
    fn test_overlapping_facilitator_slots_detected() {
        let p = problem(2, 2);
        let s = Schedule::new(
            vec![
                ScheduledCohort::new(ti(0, 60), ids(&["a", "b"]), "f".into()),
                ScheduledCohort::new(ti(30, 90), ids(&["c", "d"]), "f".into()),
            ],
            vec![],
        );
        assert_eq!(
            s.validate(&p),
            Err(ScheduleValidationError::FacilitatorDoubleBooked {
                facilitator: "f".into(),
                first: ti(0, 60),
                second: ti(30, 90),
            })
        );
    }

    #[test]
    fn test_partial_availability_detected() {
        let p = problem(1, 1);
        let s = Schedule::new(
            vec![ScheduledCohort::new(ti(0, 60), ids(&["a", "late"]), "f".into())],
            vec![],
        );
        assert!(matches!(
            s.validate(&p),
            Err(ScheduleValidationError::ParticipantUnavailable { .. })
        ));
    }

    #[test]
    fn test_size_and_count_checked() {
        let p = problem(1, 1);
        let too_small = Schedule::new(
            vec![ScheduledCohort::new(ti(0, 60), ids(&["a"]), "f".into())],
            vec![],
        );
        assert!(matches!(
            too_small.validate(&p),
            Err(ScheduleValidationError::SizeOutOfRange { size: 1, .. })
        ));

        let empty = Schedule::new(vec![], vec![]);
        assert_eq!(
            empty.validate(&p),
            Err(ScheduleValidationError::CountMismatch {
                expected: 1,
                actual: 0
            })
        );
    }
}
