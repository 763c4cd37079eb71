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
use cohort_alloc_core::{SolverVariable, time::TimeDelta};
use std::fmt::Display;

/// Size, length and count requirements for one scheduling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CohortParams<T: SolverVariable> {
    min_size: usize,
    max_size: usize,
    time_block: TimeDelta<T>,
    target_count: usize,
}

impl<T: SolverVariable> CohortParams<T> {
    /// Validates and creates the parameters.
    ///
    /// Requires `min_size >= 1`, `max_size >= min_size` and a positive
    /// `time_block`. A `target_count` of zero is allowed and trivially solved.
    pub fn new(
        min_size: usize,
        max_size: usize,
        time_block: TimeDelta<T>,
        target_count: usize,
    ) -> Result<Self, InvalidParamsError<T>> {
        if min_size == 0 {
            return Err(InvalidParamsError::MinSizeZero);
        }
        if max_size < min_size {
            return Err(InvalidParamsError::MaxBelowMin { min_size, max_size });
        }
        if !time_block.is_positive() {
            return Err(InvalidParamsError::NonPositiveTimeBlock(time_block));
        }
        Ok(Self {
            min_size,
            max_size,
            time_block,
            target_count,
        })
    }

    #[inline]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn time_block(&self) -> TimeDelta<T> {
        self.time_block
    }

    #[inline]
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    #[inline]
    pub fn size_range(&self) -> std::ops::RangeInclusive<usize> {
        self.min_size..=self.max_size
    }

    /// Same parameters with a different number of cohorts.
    #[inline]
    pub fn with_target_count(self, target_count: usize) -> Self {
        Self {
            target_count,
            ..self
        }
    }
}

impl<T: SolverVariable> Display for CohortParams<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CohortParams(size {}..={}, block {}, target {})",
            self.min_size, self.max_size, self.time_block, self.target_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_params() {
        let p = CohortParams::new(2, 4, TimeDelta::new(60i64), 3).unwrap();
        assert_eq!(p.size_range(), 2..=4);
        assert_eq!(p.time_block(), TimeDelta::new(60));
        assert_eq!(p.with_target_count(5).target_count(), 5);
    }

    #[test]
    fn test_invalid_params() {
        assert_eq!(
            CohortParams::new(0, 4, TimeDelta::new(60i64), 1),
            Err(InvalidParamsError::MinSizeZero)
        );
        assert_eq!(
            CohortParams::new(4, 3, TimeDelta::new(60i64), 1),
            Err(InvalidParamsError::MaxBelowMin {
                min_size: 4,
                max_size: 3
            })
        );
        assert_eq!(
            CohortParams::new(1, 3, TimeDelta::new(0i64), 1),
            Err(InvalidParamsError::NonPositiveTimeBlock(TimeDelta::new(0)))
        );
    }
}
