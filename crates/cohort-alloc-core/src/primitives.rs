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

//! # Core Primitives
//!
//! Generic, reusable building blocks. Currently this is the half-open
//! [`Interval`], which backs every availability block, meeting slot and
//! event day in the workspace.

use std::cmp::Ordering;
use std::fmt;

/// A half-open interval `[start, end)`.
///
/// The start is inclusive and the end is exclusive. The constructor orders its
/// bounds, so `start() <= end()` always holds.
///
/// # Examples
///
/// ```
/// use cohort_alloc_core::primitives::Interval;
/// let interval = Interval::new(1, 5);
/// assert_eq!(interval.start(), 1);
/// assert_eq!(interval.end(), 5);
/// assert!(interval.contains(3));
/// assert!(!interval.contains(5));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    start_inclusive: T,
    end_exclusive: T,
}

impl<T> Interval<T> {
    /// Creates a new half-open interval from two bounds.
    ///
    /// If `b < a` the bounds are swapped. Callers that must reject reversed
    /// input (for example raw poll data) use [`Interval::try_ordered`].
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` are not comparable.
    ///
    /// ```
    /// use cohort_alloc_core::primitives::Interval;
    ///
    /// let interval = Interval::new(5, 3);
    /// assert_eq!(interval.start(), 3);
    /// assert_eq!(interval.end(), 5);
    /// ```
    #[inline]
    pub fn new(a: T, b: T) -> Self
    where
        T: PartialOrd + Copy,
    {
        let ord = a
            .partial_cmp(&b)
            .expect("Interval::new: non-comparable bounds");
        let (s, e) = match ord {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };

        Self {
            start_inclusive: s,
            end_exclusive: e,
        }
    }

    /// Creates `[start, end)` only if `start <= end`.
    ///
    /// Use this instead of [`Interval::new`] where reversed bounds mean the
    /// input is broken.
    ///
    /// ```
    /// use cohort_alloc_core::primitives::Interval;
    ///
    /// assert_eq!(Interval::try_ordered(1, 5), Some(Interval::new(1, 5)));
    /// assert_eq!(Interval::try_ordered(5, 3), None);
    /// ```
    #[inline]
    pub fn try_ordered(start: T, end: T) -> Option<Self>
    where
        T: PartialOrd,
    {
        (start <= end).then_some(Self {
            start_inclusive: start,
            end_exclusive: end,
        })
    }

    #[inline]
    pub fn start(&self) -> T
    where
        T: Copy,
    {
        self.start_inclusive
    }

    #[inline]
    pub fn end(&self) -> T
    where
        T: Copy,
    {
        self.end_exclusive
    }

    /// Returns `true` if the interval has no extent.
    ///
    /// ```
    /// use cohort_alloc_core::primitives::Interval;
    ///
    /// assert!(Interval::new(5, 5).is_empty());
    /// assert!(!Interval::new(1, 5).is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool
    where
        T: PartialEq,
    {
        self.start_inclusive == self.end_exclusive
    }

    #[inline]
    pub fn contains(&self, x: T) -> bool
    where
        T: PartialOrd,
    {
        x >= self.start_inclusive && x < self.end_exclusive
    }

    /// Checks whether `other` lies completely inside `self`.
    ///
    /// This is the coverage test used for availability: a person covers a
    /// slot only if one of their blocks contains the whole slot.
    ///
    /// ```
    /// use cohort_alloc_core::primitives::Interval;
    ///
    /// let block = Interval::new(0, 120);
    /// assert!(block.contains_interval(&Interval::new(0, 60)));
    /// assert!(block.contains_interval(&Interval::new(60, 120)));
    /// assert!(!block.contains_interval(&Interval::new(90, 150)));
    /// ```
    #[inline]
    pub fn contains_interval(&self, other: &Self) -> bool
    where
        T: PartialOrd,
    {
        other.start_inclusive >= self.start_inclusive && other.end_exclusive <= self.end_exclusive
    }

    /// Returns `true` if both intervals share at least one point.
    ///
    /// Touching intervals such as `[0, 5)` and `[5, 9)` do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool
    where
        T: PartialOrd,
    {
        self.start_inclusive < other.end_exclusive && other.start_inclusive < self.end_exclusive
    }

    /// Returns the common part of both intervals, if any.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Self>
    where
        T: Ord + Copy,
    {
        let s = self.start_inclusive.max(other.start_inclusive);
        let e = self.end_exclusive.min(other.end_exclusive);
        (s < e).then_some(Self {
            start_inclusive: s,
            end_exclusive: e,
        })
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_inclusive, self.end_exclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_bounds() {
        let i = Interval::new(9, 2);
        assert_eq!(i.start(), 2);
        assert_eq!(i.end(), 9);
    }

    #[test]
    fn test_try_ordered_rejects_reversed_bounds() {
        assert_eq!(Interval::try_ordered(2, 9), Some(Interval::new(2, 9)));
        assert_eq!(Interval::try_ordered(4, 4), Some(Interval::new(4, 4)));
        assert_eq!(Interval::try_ordered(9, 2), None);
    }

    #[test]
    fn test_contains_is_half_open() {
        let i = Interval::new(2, 4);
        assert!(i.contains(2));
        assert!(i.contains(3));
        assert!(!i.contains(4));
        assert!(!i.contains(1));
    }

    #[test]
    fn test_contains_interval_requires_full_cover() {
        let outer = Interval::new(0, 10);
        assert!(outer.contains_interval(&Interval::new(0, 10)));
        assert!(outer.contains_interval(&Interval::new(3, 7)));
        assert!(!outer.contains_interval(&Interval::new(-1, 5)));
        assert!(!outer.contains_interval(&Interval::new(5, 11)));
    }

    #[test]
    fn test_intersects_and_intersection() {
        let a = Interval::new(0, 5);
        let b = Interval::new(5, 9);
        let c = Interval::new(3, 7);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert_eq!(a.intersection(&b), None);
        assert_eq!(a.intersection(&c), Some(Interval::new(3, 5)));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Interval::new(1, 3)), "[1, 3)");
    }
}
