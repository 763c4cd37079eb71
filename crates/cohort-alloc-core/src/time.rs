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

//! # Time
//!
//! Strongly typed time values for availability and slot arithmetic.
//!
//! - `TimePoint<T>`: an instant, counted in minutes from an origin chosen by the
//!   caller (the poll adapter uses the Unix epoch).
//! - `TimeDelta<T>`: a signed duration in minutes.
//! - `TimeInterval<T>`: a half-open `[start, end)` interval of `TimePoint`s.
//!
//! Adding two `TimePoint`s does not compile. Operators panic on overflow; the
//! `checked_*` variants return `None` instead and are what the slot walk uses.

use crate::primitives::Interval;
use num_traits::{PrimInt, Signed, Zero};
use std::{
    fmt::Display,
    ops::{Add, AddAssign, Mul, Neg, Sub},
};

/// Minutes in one hour.
pub const MINUTES_PER_HOUR: i64 = 60;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimePoint<T: PrimInt>(T);

impl<T: PrimInt> Default for TimePoint<T> {
    #[inline]
    fn default() -> Self {
        TimePoint(T::zero())
    }
}

impl<T: PrimInt + Display> Display for TimePoint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TimePoint({})", self.value())
    }
}

impl<T: PrimInt> From<T> for TimePoint<T> {
    #[inline]
    fn from(v: T) -> Self {
        TimePoint(v)
    }
}

pub type TimeInterval<T> = Interval<TimePoint<T>>;

impl<T: PrimInt> TimePoint<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        TimePoint(value)
    }

    #[inline]
    pub fn zero() -> Self {
        TimePoint(T::zero())
    }

    #[inline]
    pub const fn value(self) -> T {
        self.0
    }
}

impl<T: PrimInt + Signed> TimePoint<T> {
    #[inline]
    pub fn checked_add(self, delta: TimeDelta<T>) -> Option<Self> {
        self.0.checked_add(&delta.0).map(TimePoint)
    }

    #[inline]
    pub fn checked_sub(self, delta: TimeDelta<T>) -> Option<Self> {
        self.0.checked_sub(&delta.0).map(TimePoint)
    }

    /// Returns the interval `[self, self + len)`, or `None` on overflow.
    #[inline]
    pub fn span_of(self, len: TimeDelta<T>) -> Option<TimeInterval<T>> {
        let end = self.checked_add(len)?;
        Some(TimeInterval::new(self, end))
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeDelta<T: PrimInt + Signed>(T);

impl<T: PrimInt + Signed> TimeDelta<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    #[inline]
    pub fn zero() -> Self {
        Self(T::zero())
    }

    #[inline]
    pub const fn value(self) -> T {
        self.0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0.is_positive()
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    #[inline]
    pub fn checked_add(self, rhs: TimeDelta<T>) -> Option<Self> {
        self.0.checked_add(&rhs.0).map(TimeDelta)
    }

    #[inline]
    pub fn checked_mul(self, rhs: T) -> Option<Self> {
        self.0.checked_mul(&rhs).map(TimeDelta)
    }
}

impl<T: PrimInt + Display + Signed> Display for TimeDelta<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TimeDelta({})", self.value())
    }
}

impl<T: PrimInt + Signed> Default for TimeDelta<T> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: PrimInt + Signed> From<T> for TimeDelta<T> {
    #[inline]
    fn from(v: T) -> Self {
        TimeDelta(v)
    }
}

impl<T: PrimInt + Signed> Add<TimeDelta<T>> for TimePoint<T> {
    type Output = TimePoint<T>;

    #[inline]
    fn add(self, rhs: TimeDelta<T>) -> Self::Output {
        self.checked_add(rhs)
            .expect("overflow in TimePoint + TimeDelta")
    }
}

impl<T: PrimInt + Signed> AddAssign<TimeDelta<T>> for TimePoint<T> {
    #[inline]
    fn add_assign(&mut self, rhs: TimeDelta<T>) {
        *self = *self + rhs;
    }
}

impl<T: PrimInt + Signed> Sub<TimeDelta<T>> for TimePoint<T> {
    type Output = TimePoint<T>;

    #[inline]
    fn sub(self, rhs: TimeDelta<T>) -> Self::Output {
        self.checked_sub(rhs)
            .expect("underflow in TimePoint - TimeDelta")
    }
}

impl<T: PrimInt + Signed> Sub<TimePoint<T>> for TimePoint<T> {
    type Output = TimeDelta<T>;

    #[inline]
    fn sub(self, rhs: TimePoint<T>) -> Self::Output {
        TimeDelta(
            self.0
                .checked_sub(&rhs.0)
                .expect("overflow in TimePoint - TimePoint"),
        )
    }
}

impl<T: PrimInt + Signed> Add for TimeDelta<T> {
    type Output = TimeDelta<T>;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs)
            .expect("overflow in TimeDelta + TimeDelta")
    }
}

impl<T: PrimInt + Signed> Sub for TimeDelta<T> {
    type Output = TimeDelta<T>;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        TimeDelta(
            self.0
                .checked_sub(&rhs.0)
                .expect("underflow in TimeDelta - TimeDelta"),
        )
    }
}

impl<T: PrimInt + Signed> Mul<T> for TimeDelta<T> {
    type Output = TimeDelta<T>;

    #[inline]
    fn mul(self, rhs: T) -> Self::Output {
        self.checked_mul(rhs)
            .expect("overflow in TimeDelta * scalar")
    }
}

impl<T: PrimInt + Signed> Neg for TimeDelta<T> {
    type Output = TimeDelta<T>;

    #[inline]
    fn neg(self) -> Self::Output {
        TimeDelta(
            T::zero()
                .checked_sub(&self.0)
                .expect("underflow in -TimeDelta"),
        )
    }
}

impl<T: PrimInt + Signed> Zero for TimeDelta<T> {
    #[inline]
    fn zero() -> Self {
        TimeDelta(T::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl<T: PrimInt + Signed> Interval<TimePoint<T>> {
    /// Length of the interval.
    #[inline]
    pub fn duration(&self) -> TimeDelta<T> {
        self.end() - self.start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(v: i64) -> TimePoint<i64> {
        TimePoint::new(v)
    }

    fn td(v: i64) -> TimeDelta<i64> {
        TimeDelta::new(v)
    }

    #[test]
    fn test_time_point_display() {
        assert_eq!(format!("{}", tp(90)), "TimePoint(90)");
        assert_eq!(format!("{}", td(-5)), "TimeDelta(-5)");
    }

    #[test]
    fn test_point_delta_arithmetic() {
        assert_eq!(tp(10) + td(5), tp(15));
        assert_eq!(tp(10) - td(5), tp(5));
        assert_eq!(tp(10) - tp(4), td(6));
        assert_eq!(td(30) * 3, td(90));
        assert_eq!(-td(7), td(-7));

        let mut t = tp(0);
        t += td(30);
        assert_eq!(t, tp(30));
    }

    #[test]
    fn test_checked_add_overflow_is_none() {
        let near_max = TimePoint::new(i64::MAX - 1);
        assert_eq!(near_max.checked_add(td(1)), Some(TimePoint::new(i64::MAX)));
        assert_eq!(near_max.checked_add(td(2)), None);
    }

    #[test]
    #[should_panic(expected = "overflow in TimePoint + TimeDelta")]
    fn test_add_panics_on_overflow() {
        let _ = TimePoint::new(i64::MAX) + td(1);
    }

    #[test]
    fn test_span_of_and_duration() {
        let slot = tp(540).span_of(td(60)).unwrap();
        assert_eq!(slot.start(), tp(540));
        assert_eq!(slot.end(), tp(600));
        assert_eq!(slot.duration(), td(60));
        assert!(TimePoint::new(i64::MAX).span_of(td(1)).is_none());
    }

    #[test]
    fn test_delta_sign_helpers() {
        assert!(td(1).is_positive());
        assert!(td(-1).is_negative());
        assert!(TimeDelta::<i64>::zero().is_zero());
        assert_eq!(MINUTES_PER_DAY, 1440);
    }
}
