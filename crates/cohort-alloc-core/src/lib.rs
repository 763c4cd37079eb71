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

//! # Cohort Allocation Core (`cohort-alloc-core`)
//!
//! Numeric building blocks shared by the model and the solver:
//!
//! - [`time`]: `TimePoint<T>`, `TimeDelta<T>` and `TimeInterval<T>` newtypes. All
//!   time values are measured in **minutes**.
//! - [`primitives`]: the generic half-open [`primitives::Interval`].
//! - [`iter`]: the lexicographic [`iter::IndexCombinations`] iterator that drives
//!   candidate enumeration.

use num_traits::{PrimInt, Signed, Zero};
use std::fmt::{Debug, Display};

pub mod iter;
pub mod primitives;
pub mod time;

pub trait SolverVariable: PrimInt + Signed + Zero + Send + Sync + Debug + Display {}
impl<T> SolverVariable for T where T: PrimInt + Signed + Zero + Send + Sync + Debug + Display {}
