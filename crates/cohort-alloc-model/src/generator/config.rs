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

use super::err::{InstanceGenConfigBuildError, RangeError};
use crate::params::CohortParams;
use cohort_alloc_core::{SolverVariable, time::TimeDelta};
use num_traits::NumCast;
use rand::Rng;
use std::fmt::Display;

#[inline]
fn td<T: SolverVariable>(v: i64) -> TimeDelta<T> {
    TimeDelta::new(NumCast::from(v).expect("default fits the time primitive"))
}

/// Configuration for synthetic intakes (minutes, one poll per instance).
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceGenConfig<T: SolverVariable> {
    pub(crate) participants: usize,
    pub(crate) facilitators: usize,
    pub(crate) days: usize,

    pub(crate) day_start: TimeDelta<T>,
    pub(crate) day_length: TimeDelta<T>,
    pub(crate) grid: TimeDelta<T>,

    pub(crate) intervals_min: usize,
    pub(crate) intervals_max: usize,
    pub(crate) facilitator_intervals_min: usize,
    pub(crate) facilitator_intervals_max: usize,

    pub(crate) interval_mean: TimeDelta<T>,
    pub(crate) interval_sigma: f64,
    pub(crate) min_interval_length: TimeDelta<T>,

    pub(crate) capacity_min: u32,
    pub(crate) capacity_max: u32,

    pub(crate) params: CohortParams<T>,
    pub(crate) seed: u64,
}

impl<T: SolverVariable> Default for InstanceGenConfig<T> {
    fn default() -> Self {
        InstanceGenConfigBuilder::new()
            .participants(40)
            .facilitators(4)
            .days(3)
            .seed(42)
            .build()
            .expect("default generator config is valid")
    }
}

impl<T: SolverVariable> InstanceGenConfig<T> {
    #[inline]
    pub fn participants(&self) -> usize {
        self.participants
    }
    #[inline]
    pub fn facilitators(&self) -> usize {
        self.facilitators
    }
    #[inline]
    pub fn days(&self) -> usize {
        self.days
    }
    #[inline]
    pub fn day_start(&self) -> TimeDelta<T> {
        self.day_start
    }
    #[inline]
    pub fn day_length(&self) -> TimeDelta<T> {
        self.day_length
    }
    #[inline]
    pub fn grid(&self) -> TimeDelta<T> {
        self.grid
    }
    #[inline]
    pub fn intervals_range(&self) -> (usize, usize) {
        (self.intervals_min, self.intervals_max)
    }
    #[inline]
    pub fn facilitator_intervals_range(&self) -> (usize, usize) {
        (self.facilitator_intervals_min, self.facilitator_intervals_max)
    }
    #[inline]
    pub fn min_interval_length(&self) -> TimeDelta<T> {
        self.min_interval_length
    }
    #[inline]
    pub fn capacity_range(&self) -> (u32, u32) {
        (self.capacity_min, self.capacity_max)
    }
    #[inline]
    pub fn params(&self) -> &CohortParams<T> {
        &self.params
    }
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Same config with another seed.
    #[inline]
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Same config with another problem size; everything else is kept.
    #[inline]
    pub fn with_size(&self, participants: usize, facilitators: usize, target_count: usize) -> Self {
        Self {
            participants,
            facilitators,
            params: self.params.with_target_count(target_count),
            ..self.clone()
        }
    }
}

impl<T: SolverVariable> Display for InstanceGenConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "InstanceGenConfig {{ \
             participants: {}, facilitators: {}, days: {}, \
             day_start: {}, day_length: {}, grid: {}, \
             intervals: {}..={}, facilitator_intervals: {}..={}, \
             interval_mean: {}, interval_sigma: {:.2}, min_interval_length: {}, \
             capacity: {}..={}, params: {}, seed: {} \
             }}",
            self.participants,
            self.facilitators,
            self.days,
            self.day_start,
            self.day_length,
            self.grid,
            self.intervals_min,
            self.intervals_max,
            self.facilitator_intervals_min,
            self.facilitator_intervals_max,
            self.interval_mean,
            self.interval_sigma,
            self.min_interval_length,
            self.capacity_min,
            self.capacity_max,
            self.params,
            self.seed
        )
    }
}

/// Builder for `InstanceGenConfig`.
#[derive(Debug, Clone)]
pub struct InstanceGenConfigBuilder<T: SolverVariable> {
    // Required
    participants: Option<usize>,
    facilitators: Option<usize>,
    days: Option<usize>,

    // Optional with defaults
    day_start: TimeDelta<T>,
    day_length: TimeDelta<T>,
    grid: TimeDelta<T>,
    intervals_min: usize,
    intervals_max: usize,
    facilitator_intervals_min: usize,
    facilitator_intervals_max: usize,
    interval_mean: TimeDelta<T>,
    interval_sigma: f64,
    min_interval_length: TimeDelta<T>,
    capacity_min: u32,
    capacity_max: u32,
    min_size: usize,
    max_size: usize,
    time_block: TimeDelta<T>,
    target_count: usize,
    seed: u64,
}

impl<T: SolverVariable> Default for InstanceGenConfigBuilder<T> {
    fn default() -> Self {
        Self {
            participants: None,
            facilitators: None,
            days: None,

            day_start: td(9 * 60),
            day_length: td(8 * 60),
            grid: td(30),
            intervals_min: 1,
            intervals_max: 3,
            facilitator_intervals_min: 2,
            facilitator_intervals_max: 4,
            interval_mean: td(150),
            interval_sigma: 60.0,
            min_interval_length: td(30),
            capacity_min: 1,
            capacity_max: 3,
            min_size: 3,
            max_size: 6,
            time_block: td(60),
            target_count: 6,
            seed: rand::rng().random(),
        }
    }
}

impl<T: SolverVariable> InstanceGenConfigBuilder<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn participants(mut self, v: usize) -> Self {
        self.participants = Some(v);
        self
    }
    #[inline]
    pub fn facilitators(mut self, v: usize) -> Self {
        self.facilitators = Some(v);
        self
    }
    #[inline]
    pub fn days(mut self, v: usize) -> Self {
        self.days = Some(v);
        self
    }

    /// Daily poll window as an offset from midnight plus a length.
    #[inline]
    pub fn day_window(mut self, start: TimeDelta<T>, length: TimeDelta<T>) -> Self {
        self.day_start = start;
        self.day_length = length;
        self
    }
    #[inline]
    pub fn grid(mut self, v: TimeDelta<T>) -> Self {
        self.grid = v;
        self
    }
    pub fn intervals_range(mut self, min: usize, max: usize) -> Self {
        self.intervals_min = min;
        self.intervals_max = max;
        self
    }
    pub fn facilitator_intervals_range(mut self, min: usize, max: usize) -> Self {
        self.facilitator_intervals_min = min;
        self.facilitator_intervals_max = max;
        self
    }
    #[inline]
    pub fn interval_length(mut self, mean: TimeDelta<T>, sigma: f64) -> Self {
        self.interval_mean = mean;
        self.interval_sigma = sigma;
        self
    }
    #[inline]
    pub fn min_interval_length(mut self, v: TimeDelta<T>) -> Self {
        self.min_interval_length = v;
        self
    }
    pub fn capacity_range(mut self, min: u32, max: u32) -> Self {
        self.capacity_min = min;
        self.capacity_max = max;
        self
    }
    pub fn cohort_sizes(mut self, min: usize, max: usize) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }
    #[inline]
    pub fn time_block(mut self, v: TimeDelta<T>) -> Self {
        self.time_block = v;
        self
    }
    #[inline]
    pub fn target_count(mut self, v: usize) -> Self {
        self.target_count = v;
        self
    }
    pub fn random_seed(mut self) -> Self {
        self.seed = rand::rng().random();
        self
    }
    #[inline]
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    pub fn build(self) -> Result<InstanceGenConfig<T>, InstanceGenConfigBuildError<T>> {
        use InstanceGenConfigBuildError::*;
        let participants = self.participants.ok_or(MissingParticipants)?;
        let facilitators = self.facilitators.ok_or(MissingFacilitators)?;
        let days = self.days.ok_or(MissingDays)?;

        if days == 0 {
            return Err(NoDays);
        }
        if !self.day_length.is_positive() {
            return Err(NonPositiveDayLength);
        }
        if !self.grid.is_positive() {
            return Err(NonPositiveGrid);
        }
        if self.min_interval_length < self.grid || self.min_interval_length > self.day_length {
            return Err(IntervalTooShort);
        }
        if self.intervals_min > self.intervals_max {
            return Err(RangeError::new(
                "intervals",
                self.intervals_min as u64,
                self.intervals_max as u64,
            )
            .into());
        }
        if self.facilitator_intervals_min > self.facilitator_intervals_max {
            return Err(RangeError::new(
                "facilitator_intervals",
                self.facilitator_intervals_min as u64,
                self.facilitator_intervals_max as u64,
            )
            .into());
        }
        if self.capacity_min > self.capacity_max {
            return Err(RangeError::new(
                "capacity",
                self.capacity_min as u64,
                self.capacity_max as u64,
            )
            .into());
        }
        let params = CohortParams::new(
            self.min_size,
            self.max_size,
            self.time_block,
            self.target_count,
        )?;

        Ok(InstanceGenConfig {
            participants,
            facilitators,
            days,
            day_start: self.day_start,
            day_length: self.day_length,
            grid: self.grid,
            intervals_min: self.intervals_min,
            intervals_max: self.intervals_max,
            facilitator_intervals_min: self.facilitator_intervals_min,
            facilitator_intervals_max: self.facilitator_intervals_max,
            interval_mean: self.interval_mean,
            interval_sigma: self.interval_sigma.max(0.0),
            min_interval_length: self.min_interval_length,
            capacity_min: self.capacity_min,
            capacity_max: self.capacity_max,
            params,
            seed: self.seed,
        })
    }
}
