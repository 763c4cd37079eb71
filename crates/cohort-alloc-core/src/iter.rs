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

use std::iter::FusedIterator;

/// Iterates all `k`-element subsets of `0..n` as ascending index vectors.
///
/// Subsets are produced in lexicographic order, e.g. for `n = 4, k = 2`:
/// `[0,1] [0,2] [0,3] [1,2] [1,3] [2,3]`. Mapping the indices onto an ordered
/// slice yields combinations in the same order as the slice, which is the
/// emission order the candidate generator guarantees.
///
/// `k = 0` yields a single empty subset; `k > n` yields nothing.
///
/// ```
/// use cohort_alloc_core::iter::IndexCombinations;
///
/// let all: Vec<Vec<usize>> = IndexCombinations::new(3, 2).collect();
/// assert_eq!(all, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
/// ```
#[derive(Debug, Clone)]
pub struct IndexCombinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl IndexCombinations {
    #[inline]
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }

    /// Number of subsets still to be produced, saturating at `usize::MAX`.
    pub fn remaining(&self) -> usize {
        if self.done {
            return 0;
        }
        if !self.started {
            return binomial(self.n, self.indices.len());
        }
        // Count the subsets that come strictly after the current one.
        let k = self.indices.len();
        let mut after = 0usize;
        for (i, &idx) in self.indices.iter().enumerate() {
            let slots_left = k - i - 1;
            let limit = self.n - slots_left;
            for larger in (idx + 1)..limit {
                after = after.saturating_add(binomial(self.n - larger - 1, slots_left));
            }
        }
        after
    }

    fn advance(&mut self) -> bool {
        let k = self.indices.len();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return true;
            }
        }
        false
    }
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        if self.advance() {
            Some(self.indices.clone())
        } else {
            self.done = true;
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let r = self.remaining();
        (r, if r == usize::MAX { None } else { Some(r) })
    }
}

impl FusedIterator for IndexCombinations {}

/// `n choose k`, saturating at `usize::MAX`.
///
/// ```
/// use cohort_alloc_core::iter::binomial;
///
/// assert_eq!(binomial(6, 4), 15);
/// assert_eq!(binomial(3, 5), 0);
/// ```
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > usize::MAX as u128 {
            return usize::MAX;
        }
    }
    acc as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_order() {
        let got: Vec<Vec<usize>> = IndexCombinations::new(4, 2).collect();
        assert_eq!(
            got,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn test_full_and_empty_subsets() {
        let full: Vec<Vec<usize>> = IndexCombinations::new(3, 3).collect();
        assert_eq!(full, vec![vec![0, 1, 2]]);

        let empty: Vec<Vec<usize>> = IndexCombinations::new(3, 0).collect();
        assert_eq!(empty, vec![Vec::<usize>::new()]);

        assert_eq!(IndexCombinations::new(2, 3).count(), 0);
        assert_eq!(IndexCombinations::new(0, 1).count(), 0);
    }

    #[test]
    fn test_count_matches_binomial() {
        for n in 0..8 {
            for k in 0..=n {
                assert_eq!(IndexCombinations::new(n, k).count(), binomial(n, k), "n={n} k={k}");
            }
        }
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let mut it = IndexCombinations::new(5, 3);
        assert_eq!(it.size_hint(), (10, Some(10)));
        it.next();
        assert_eq!(it.size_hint(), (9, Some(9)));
        for _ in 0..9 {
            it.next();
        }
        assert_eq!(it.size_hint(), (0, Some(0)));
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }
}
