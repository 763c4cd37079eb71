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

//! Facilitator capacity owned by one search.
//!
//! Capacities live in a table indexed by roster position. Every reservation is
//! pushed onto a trail and must be released in LIFO order, so a backtracking
//! search always unwinds to exactly the state it branched from.

use cohort_alloc_core::SolverVariable;
use cohort_alloc_model::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerError {
    /// No facilitator at this roster position.
    UnknownFacilitator(usize),
    /// Reserving would take the capacity below zero.
    Exhausted(usize),
    /// Release without a matching reservation.
    NothingReserved,
    /// Release of a facilitator other than the one reserved last.
    OutOfOrder { expected: usize, got: usize },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::UnknownFacilitator(i) => write!(f, "No facilitator at position {i}"),
            LedgerError::Exhausted(i) => write!(f, "Facilitator at position {i} has no capacity left"),
            LedgerError::NothingReserved => write!(f, "Nothing to release"),
            LedgerError::OutOfOrder { expected, got } => write!(
                f,
                "Release out of order: expected position {expected}, got {got}"
            ),
        }
    }
}

impl std::error::Error for LedgerError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityLedger {
    remaining: Vec<u32>,
    trail: Vec<usize>,
}

impl<T: SolverVariable> From<&Roster<T>> for CapacityLedger {
    fn from(roster: &Roster<T>) -> Self {
        Self::new(roster.iter().map(|f| f.capacity()).collect())
    }
}

impl CapacityLedger {
    #[inline]
    pub fn new(capacities: Vec<u32>) -> Self {
        Self {
            remaining: capacities,
            trail: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    #[inline]
    pub fn remaining(&self, facilitator: usize) -> Option<u32> {
        self.remaining.get(facilitator).copied()
    }

    #[inline]
    pub fn has_capacity(&self, facilitator: usize) -> bool {
        self.remaining(facilitator).is_some_and(|c| c > 0)
    }

    /// Number of reservations not yet released.
    #[inline]
    pub fn depth(&self) -> usize {
        self.trail.len()
    }

    pub fn reserve(&mut self, facilitator: usize) -> Result<(), LedgerError> {
        let slot = self
            .remaining
            .get_mut(facilitator)
            .ok_or(LedgerError::UnknownFacilitator(facilitator))?;
        if *slot == 0 {
            return Err(LedgerError::Exhausted(facilitator));
        }
        *slot -= 1;
        self.trail.push(facilitator);
        Ok(())
    }

    /// Undoes the most recent reservation, which must be for `facilitator`.
    pub fn release(&mut self, facilitator: usize) -> Result<(), LedgerError> {
        match self.trail.last() {
            None => Err(LedgerError::NothingReserved),
            Some(&expected) if expected != facilitator => Err(LedgerError::OutOfOrder {
                expected,
                got: facilitator,
            }),
            Some(_) => {
                self.trail.pop();
                self.remaining[facilitator] += 1;
                Ok(())
            }
        }
    }

    /// Remaining capacity per facilitator, in roster order.
    pub fn snapshot<T: SolverVariable>(&self, roster: &Roster<T>) -> Vec<(FacilitatorId, u32)> {
        roster
            .iter()
            .zip(&self.remaining)
            .map(|(f, &c)| (f.id().clone(), c))
            .collect()
    }
}
