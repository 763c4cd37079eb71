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

//! Weekday alignment between two polls.
//!
//! Facilitators and participants are often polled separately, with the
//! facilitator poll covering a different (usually earlier) week. Availability
//! only lines up once each facilitator date is moved onto the participant date
//! that falls on the same weekday.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use std::{collections::HashMap, fmt::Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingWeekdayError {
    date: NaiveDate,
}

impl MissingWeekdayError {
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[inline]
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

impl Display for MissingWeekdayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "No participant date falls on {} (facilitator date {})",
            self.date.weekday(),
            self.date
        )
    }
}

impl std::error::Error for MissingWeekdayError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbiguousWeekdayError {
    first: NaiveDate,
    second: NaiveDate,
}

impl AmbiguousWeekdayError {
    #[inline]
    pub fn first(&self) -> NaiveDate {
        self.first
    }

    #[inline]
    pub fn second(&self) -> NaiveDate {
        self.second
    }
}

impl Display for AmbiguousWeekdayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dates {} and {} are both a {}",
            self.first,
            self.second,
            self.first.weekday()
        )
    }
}

impl std::error::Error for AmbiguousWeekdayError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentError {
    MissingWeekday(MissingWeekdayError),
    AmbiguousWeekday(AmbiguousWeekdayError),
}

impl Display for AlignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentError::MissingWeekday(e) => write!(f, "{e}"),
            AlignmentError::AmbiguousWeekday(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AlignmentError {}

impl From<MissingWeekdayError> for AlignmentError {
    fn from(value: MissingWeekdayError) -> Self {
        AlignmentError::MissingWeekday(value)
    }
}

impl From<AmbiguousWeekdayError> for AlignmentError {
    fn from(value: AmbiguousWeekdayError) -> Self {
        AlignmentError::AmbiguousWeekday(value)
    }
}

fn by_weekday(dates: &[NaiveDate]) -> Result<HashMap<Weekday, NaiveDate>, AmbiguousWeekdayError> {
    let mut out = HashMap::with_capacity(dates.len());
    for &d in dates {
        if let Some(&first) = out.get(&d.weekday())
            && first != d
        {
            return Err(AmbiguousWeekdayError { first, second: d });
        }
        out.insert(d.weekday(), d);
    }
    Ok(out)
}

/// A bijective facilitator-date to participant-date mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAlignment {
    map: HashMap<NaiveDate, NaiveDate>,
}

impl DateAlignment {
    /// Pairs every facilitator date with the participant date on the same weekday.
    ///
    /// Repeating the exact same date is harmless; two different dates on one
    /// weekday on either side is rejected.
    pub fn new(
        facilitator_dates: &[NaiveDate],
        participant_dates: &[NaiveDate],
    ) -> Result<Self, AlignmentError> {
        let targets = by_weekday(participant_dates)?;
        by_weekday(facilitator_dates)?;

        let mut map = HashMap::with_capacity(facilitator_dates.len());
        for &d in facilitator_dates {
            let target = targets
                .get(&d.weekday())
                .ok_or(MissingWeekdayError { date: d })?;
            map.insert(d, *target);
        }
        Ok(Self { map })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn target(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.map.get(&date).copied()
    }

    /// Moves `at` onto the aligned date, keeping the time of day.
    pub fn remap(&self, at: NaiveDateTime) -> Result<NaiveDateTime, MissingWeekdayError> {
        match self.map.get(&at.date()) {
            Some(d) => Ok(d.and_time(at.time())),
            None => Err(MissingWeekdayError { date: at.date() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_aligns_by_weekday() {
        // Mon/Wed one week, Wed/Mon the next.
        let fac = [d(2024, 3, 4), d(2024, 3, 6)];
        let part = [d(2024, 3, 13), d(2024, 3, 11)];
        let a = DateAlignment::new(&fac, &part).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.target(d(2024, 3, 4)), Some(d(2024, 3, 11)));
        assert_eq!(a.target(d(2024, 3, 6)), Some(d(2024, 3, 13)));
    }

    #[test]
    fn test_remap_keeps_time_of_day() {
        let a = DateAlignment::new(&[d(2024, 3, 4)], &[d(2024, 3, 11)]).unwrap();
        let t = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(
            a.remap(d(2024, 3, 4).and_time(t)).unwrap(),
            d(2024, 3, 11).and_time(t)
        );
        assert!(a.remap(d(2024, 3, 5).and_time(t)).is_err());
    }

    #[test]
    fn test_missing_weekday_is_an_error() {
        // Tuesday has no counterpart.
        let err = DateAlignment::new(&[d(2024, 3, 5)], &[d(2024, 3, 11)]).unwrap_err();
        assert_eq!(
            err,
            AlignmentError::MissingWeekday(MissingWeekdayError {
                date: d(2024, 3, 5)
            })
        );
    }

    #[test]
    fn test_duplicate_weekday_is_ambiguous() {
        let err =
            DateAlignment::new(&[d(2024, 3, 4)], &[d(2024, 3, 11), d(2024, 3, 18)]).unwrap_err();
        assert!(matches!(err, AlignmentError::AmbiguousWeekday(_)));

        let err =
            DateAlignment::new(&[d(2024, 3, 4), d(2024, 3, 11)], &[d(2024, 3, 18)]).unwrap_err();
        assert!(matches!(err, AlignmentError::AmbiguousWeekday(_)));
    }
}
