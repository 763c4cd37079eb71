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

//! # Synthetic Instance Generator
//!
//! Seeded random intakes for benchmarks and randomized tests. Every interval
//! lies inside one poll day and starts on the configured grid, so slots
//! produced by a cursor walk on the same grid line up with poll answers the
//! way real poll exports do.

mod config;
mod err;

pub use config::{InstanceGenConfig, InstanceGenConfigBuilder};
pub use err::{InstanceGenConfigBuildError, RangeError};

use crate::{facilitator::Facilitator, problem::CohortProblem, problem::CohortProblemBuilder};
use cohort_alloc_core::{
    SolverVariable,
    time::{MINUTES_PER_DAY, TimeInterval, TimePoint},
};
use num_traits::NumCast;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution, Normal};

#[inline]
fn to_i64<T: SolverVariable>(v: T) -> i64 {
    v.to_i64().expect("time value fits in i64")
}

#[inline]
fn from_i64<T: SolverVariable>(v: i64) -> T {
    NumCast::from(v).expect("sampled time fits the time primitive")
}

pub struct InstanceGenerator<T: SolverVariable> {
    config: InstanceGenConfig<T>,
    rng: SmallRng,
    length_distribution: Normal<f64>,
    grid: i64,
    day_start: i64,
    day_length: i64,
    min_length: i64,
}

impl<T: SolverVariable> From<InstanceGenConfig<T>> for InstanceGenerator<T> {
    fn from(config: InstanceGenConfig<T>) -> Self {
        Self::new(config)
    }
}

impl<T: SolverVariable> InstanceGenerator<T> {
    pub fn new(config: InstanceGenConfig<T>) -> Self {
        let mean = to_i64(config.interval_mean.value()) as f64;
        Self {
            length_distribution: Normal::new(mean, config.interval_sigma)
                .expect("finite, non-negative sigma"),
            rng: SmallRng::seed_from_u64(config.seed()),
            grid: to_i64(config.grid.value()),
            day_start: to_i64(config.day_start.value()),
            day_length: to_i64(config.day_length.value()),
            min_length: to_i64(config.min_interval_length.value()),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &InstanceGenConfig<T> {
        &self.config
    }

    #[inline]
    fn day_begin(&self, day: usize) -> i64 {
        day as i64 * MINUTES_PER_DAY + self.day_start
    }

    #[inline]
    fn interval(start: i64, end: i64) -> TimeInterval<T> {
        TimeInterval::new(TimePoint::new(from_i64(start)), TimePoint::new(from_i64(end)))
    }

    pub fn day_bounds(&self, day: usize) -> TimeInterval<T> {
        let begin = self.day_begin(day);
        Self::interval(begin, begin + self.day_length)
    }

    fn sample_length(&mut self) -> i64 {
        let raw = self.length_distribution.sample(&mut self.rng);
        let steps = (raw / self.grid as f64).round().max(0.0) as i64;
        (steps * self.grid).clamp(self.min_length, self.day_length)
    }

    fn sample_interval(&mut self) -> TimeInterval<T> {
        let day = self.rng.random_range(0..self.config.days);
        let length = self.sample_length();
        let slots = (self.day_length - length) / self.grid;
        let offset = self.rng.random_range(0..=slots) * self.grid;
        let start = self.day_begin(day) + offset;
        Self::interval(start, start + length)
    }

    fn sample_intervals(&mut self, min: usize, max: usize) -> Vec<TimeInterval<T>> {
        let n = if min == max {
            min
        } else {
            self.rng.random_range(min..=max)
        };
        let mut out: Vec<TimeInterval<T>> = (0..n).map(|_| self.sample_interval()).collect();
        out.sort_by_key(|i| (i.start(), i.end()));
        out.dedup();
        out
    }

    #[inline]
    fn sample_capacity(&mut self) -> u32 {
        let (min, max) = self.config.capacity_range();
        if min == max {
            min
        } else {
            self.rng.random_range(min..=max)
        }
    }

    pub fn generate(&mut self) -> CohortProblem<T> {
        let mut builder = CohortProblemBuilder::new(*self.config.params());
        for day in 0..self.config.days {
            builder.add_day(self.day_bounds(day));
        }

        let (pmin, pmax) = self.config.intervals_range();
        for i in 0..self.config.participants {
            let intervals = self.sample_intervals(pmin, pmax);
            builder
                .add_participant(format!("P{i:04}"), intervals)
                .expect("generated participant ids are unique");
        }

        let (fmin, fmax) = self.config.facilitator_intervals_range();
        for i in 0..self.config.facilitators {
            let intervals = self.sample_intervals(fmin, fmax);
            let capacity = self.sample_capacity();
            builder
                .add_facilitator(Facilitator::new(format!("F{i:03}"), intervals, capacity))
                .expect("generated facilitator ids are unique");
        }

        builder.build().expect("generator config has at least one day")
    }
}
