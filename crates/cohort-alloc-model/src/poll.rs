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

//! # Poll Export Ingestion
//!
//! Reads the JSON export of a when-are-you-free poll:
//!
//! ```json
//! { "data": { "event": {
//!     "pollStartTime": "09:00:00.000Z",
//!     "pollEndTime": "17:00:00.000Z",
//!     "pollDates": ["2024-03-11", "2024-03-13"],
//!     "pollResponses": [
//!       { "user": { "name": "Ada" },
//!         "availabilities": [
//!           { "start": "2024-03-11T09:00:00.000Z", "end": "2024-03-11T11:00:00.000Z" } ] } ]
//! } } }
//! ```
//!
//! All timestamps are UTC. The engine sees them as minutes since the Unix epoch.

use crate::{availability::EventWindow, availability::RawResponse, calendar::DateAlignment};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use cohort_alloc_core::time::{TimeInterval, TimePoint};
use serde::Deserialize;
use std::fmt::Display;
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const TIME_FORMAT: &str = "%H:%M:%S%.fZ";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct ExportRoot {
    data: ExportData,
}

#[derive(Debug, Deserialize)]
struct ExportData {
    event: ExportEvent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportEvent {
    poll_start_time: String,
    poll_end_time: String,
    poll_dates: Vec<String>,
    poll_responses: Vec<ExportResponse>,
}

#[derive(Debug, Deserialize)]
struct ExportResponse {
    user: ExportUser,
    #[serde(default)]
    availabilities: Vec<ExportInterval>,
}

#[derive(Debug, Deserialize)]
struct ExportUser {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ExportInterval {
    start: String,
    end: String,
}

#[derive(Debug)]
pub enum PollError {
    Json(serde_json::Error),
    NoDates,
    NoResponses,
    BadTimestamp {
        value: String,
        source: chrono::ParseError,
    },
    EmptyInterval {
        owner: String,
        start: NaiveDateTime,
    },
    Unaligned {
        owner: String,
        date: NaiveDate,
    },
    /// The aligned bounds no longer enclose the original length, e.g. a block
    /// across midnight whose two dates map to different weeks.
    BrokenByAlignment {
        owner: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::Json(e) => write!(f, "Poll export is not valid JSON: {e}"),
            PollError::NoDates => write!(f, "Poll export has no dates"),
            PollError::NoResponses => write!(f, "Poll export has no responses"),
            PollError::BadTimestamp { value, source } => {
                write!(f, "Cannot parse timestamp {value:?}: {source}")
            }
            PollError::EmptyInterval { owner, start } => {
                write!(f, "Interval of {owner} starting {start} does not end after it starts")
            }
            PollError::Unaligned { owner, date } => {
                write!(f, "Availability of {owner} on {date} has no aligned date")
            }
            PollError::BrokenByAlignment { owner, start, end } => write!(
                f,
                "Interval of {owner} from {start} to {end} does not stay one block after alignment"
            ),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Json(e) => Some(e),
            PollError::BadTimestamp { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PollError {
    fn from(value: serde_json::Error) -> Self {
        PollError::Json(value)
    }
}

fn parse_with<F, R>(value: &str, parse: F) -> Result<R, PollError>
where
    F: FnOnce(&str) -> Result<R, chrono::ParseError>,
{
    parse(value).map_err(|source| PollError::BadTimestamp {
        value: value.to_string(),
        source,
    })
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, PollError> {
    parse_with(value, |s| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT))
}

/// Whole minutes since the Unix epoch.
#[inline]
pub fn to_minutes(at: NaiveDateTime) -> TimePoint<i64> {
    TimePoint::new(at.and_utc().timestamp().div_euclid(60))
}

/// Inverse of [`to_minutes`]; `None` outside chrono's representable range.
#[inline]
pub fn from_minutes(at: TimePoint<i64>) -> Option<NaiveDateTime> {
    let secs = at.value().checked_mul(60)?;
    DateTime::from_timestamp(secs, 0).map(|d| d.naive_utc())
}

#[inline]
fn to_interval(start: NaiveDateTime, end: NaiveDateTime) -> TimeInterval<i64> {
    TimeInterval::new(to_minutes(start), to_minutes(end))
}

/// One responder with parsed intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRespondent {
    name: String,
    intervals: Vec<(NaiveDateTime, NaiveDateTime)>,
}

impl PollRespondent {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn intervals(&self) -> &[(NaiveDateTime, NaiveDateTime)] {
        &self.intervals
    }
}

/// A parsed and validated poll export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    dates: Vec<NaiveDate>,
    day_start: NaiveTime,
    day_end: NaiveTime,
    respondents: Vec<PollRespondent>,
}

impl Poll {
    pub fn from_json_str(json: &str) -> Result<Self, PollError> {
        let root: ExportRoot = serde_json::from_str(json)?;
        Self::from_event(root.data.event)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, PollError> {
        let root: ExportRoot = serde_json::from_reader(reader)?;
        Self::from_event(root.data.event)
    }

    fn from_event(event: ExportEvent) -> Result<Self, PollError> {
        if event.poll_dates.is_empty() {
            return Err(PollError::NoDates);
        }
        if event.poll_responses.is_empty() {
            return Err(PollError::NoResponses);
        }

        let day_start = parse_with(&event.poll_start_time, |s| {
            NaiveTime::parse_from_str(s, TIME_FORMAT)
        })?;
        let day_end = parse_with(&event.poll_end_time, |s| {
            NaiveTime::parse_from_str(s, TIME_FORMAT)
        })?;
        let dates = event
            .poll_dates
            .iter()
            .map(|d| parse_with(d, |s| NaiveDate::parse_from_str(s, DATE_FORMAT)))
            .collect::<Result<Vec<_>, _>>()?;
        if day_end <= day_start {
            return Err(PollError::EmptyInterval {
                owner: "poll window".to_string(),
                start: dates[0].and_time(day_start),
            });
        }

        let mut respondents = Vec::with_capacity(event.poll_responses.len());
        for response in event.poll_responses {
            let name = response.user.name;
            let mut intervals = Vec::with_capacity(response.availabilities.len());
            for a in &response.availabilities {
                let start = parse_timestamp(&a.start)?;
                let end = parse_timestamp(&a.end)?;
                if end <= start {
                    return Err(PollError::EmptyInterval { owner: name, start });
                }
                intervals.push((start, end));
            }
            respondents.push(PollRespondent { name, intervals });
        }

        debug!(
            dates = dates.len(),
            respondents = respondents.len(),
            "Parsed poll export"
        );
        Ok(Self {
            dates,
            day_start,
            day_end,
            respondents,
        })
    }

    #[inline]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[inline]
    pub fn respondents(&self) -> &[PollRespondent] {
        &self.respondents
    }

    /// One day per poll date, bounded by the poll's start and end time.
    pub fn event_window(&self) -> EventWindow<i64> {
        self.dates
            .iter()
            .map(|d| to_interval(d.and_time(self.day_start), d.and_time(self.day_end)))
            .collect()
    }

    pub fn raw_responses(&self) -> Vec<RawResponse<i64>> {
        self.respondents
            .iter()
            .map(|r| {
                let intervals = r.intervals.iter().map(|&(s, e)| to_interval(s, e)).collect();
                RawResponse::new(r.name.clone(), intervals)
            })
            .collect()
    }

    /// Like [`Poll::raw_responses`], with every interval moved through `alignment`.
    pub fn raw_responses_aligned(
        &self,
        alignment: &DateAlignment,
    ) -> Result<Vec<RawResponse<i64>>, PollError> {
        let mut out = Vec::with_capacity(self.respondents.len());
        for r in &self.respondents {
            let mut intervals = Vec::with_capacity(r.intervals.len());
            for &(s, e) in &r.intervals {
                let unaligned = |date| PollError::Unaligned {
                    owner: r.name.clone(),
                    date,
                };
                let start = alignment.remap(s).map_err(|err| unaligned(err.date()))?;
                let end = alignment.remap(e).map_err(|err| unaligned(err.date()))?;
                let interval = TimeInterval::try_ordered(to_minutes(start), to_minutes(end))
                    .filter(|i| i.duration() == to_interval(s, e).duration())
                    .ok_or_else(|| PollError::BrokenByAlignment {
                        owner: r.name.clone(),
                        start: s,
                        end: e,
                    })?;
                intervals.push(interval);
            }
            out.push(RawResponse::new(r.name.clone(), intervals));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "data": { "event": {
            "pollStartTime": "09:00:00.000Z",
            "pollEndTime": "17:00:00.000Z",
            "pollDates": ["2024-03-11", "2024-03-13"],
            "pollResponses": [
                { "user": { "name": "Ada" },
                  "availabilities": [
                    { "start": "2024-03-11T09:00:00.000Z", "end": "2024-03-11T11:00:00.000Z" }
                  ] },
                { "user": { "name": "Bo" }, "availabilities": [] }
            ]
        } }
    }"#;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parses_export() {
        let poll = Poll::from_json_str(EXPORT).unwrap();
        assert_eq!(poll.dates().len(), 2);
        assert_eq!(poll.respondents()[0].name(), "Ada");
        assert_eq!(
            poll.respondents()[0].intervals(),
            &[(dt("2024-03-11 09:00"), dt("2024-03-11 11:00"))]
        );

        let window = poll.event_window();
        assert_eq!(window.len(), 2);
        assert_eq!(window.days()[0].duration().value(), 8 * 60);
        assert_eq!(window.days()[0].start(), to_minutes(dt("2024-03-11 09:00")));

        let raw = poll.raw_responses();
        assert_eq!(raw[0].intervals()[0].duration().value(), 120);
        assert!(raw[1].intervals().is_empty());
    }

    #[test]
    fn test_minutes_round_trip_through_chrono() {
        let at = dt("2024-03-11 09:30");
        assert_eq!(from_minutes(to_minutes(at)), Some(at));
    }

    #[test]
    fn test_rejects_bad_exports() {
        assert!(matches!(
            Poll::from_json_str("{ not json"),
            Err(PollError::Json(_))
        ));
        let no_dates = EXPORT.replace(r#"["2024-03-11", "2024-03-13"]"#, "[]");
        assert!(matches!(
            Poll::from_json_str(&no_dates),
            Err(PollError::NoDates)
        ));
        let bad_ts = EXPORT.replace("2024-03-11T11:00:00.000Z", "tomorrow");
        assert!(matches!(
            Poll::from_json_str(&bad_ts),
            Err(PollError::BadTimestamp { .. })
        ));
        let reversed = EXPORT.replace("2024-03-11T11:00:00.000Z", "2024-03-11T08:00:00.000Z");
        assert!(matches!(
            Poll::from_json_str(&reversed),
            Err(PollError::EmptyInterval { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_responses() {
        let json = r#"{ "data": { "event": {
            "pollStartTime": "09:00:00.000Z", "pollEndTime": "17:00:00.000Z",
            "pollDates": ["2024-03-11"], "pollResponses": [] } } }"#;
        assert!(matches!(
            Poll::from_json_str(json),
            Err(PollError::NoResponses)
        ));
    }

    #[test]
    fn test_aligned_responses_move_dates() {
        let poll = Poll::from_json_str(EXPORT).unwrap();
        let from = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
        let alignment = DateAlignment::new(&[from], &[to]).unwrap();
        let raw = poll.raw_responses_aligned(&alignment).unwrap();
        assert_eq!(
            raw[0].intervals()[0].start(),
            to_minutes(dt("2024-03-18 09:00"))
        );
    }

    const OVERNIGHT: &str = r#"{
        "data": { "event": {
            "pollStartTime": "00:00:00.000Z",
            "pollEndTime": "23:59:00.000Z",
            "pollDates": ["2024-03-10", "2024-03-11"],
            "pollResponses": [
                { "user": { "name": "Cy" },
                  "availabilities": [
                    { "start": "2024-03-10T23:00:00.000Z", "end": "2024-03-11T01:00:00.000Z" }
                  ] }
            ]
        } }
    }"#;

    #[test]
    fn test_aligned_overnight_block_into_one_week() {
        let poll = Poll::from_json_str(OVERNIGHT).unwrap();
        let alignment = DateAlignment::new(
            &[d(2024, 3, 10), d(2024, 3, 11)],
            &[d(2024, 3, 17), d(2024, 3, 18)],
        )
        .unwrap();
        let raw = poll.raw_responses_aligned(&alignment).unwrap();
        let block = raw[0].intervals()[0];
        assert_eq!(block.start(), to_minutes(dt("2024-03-17 23:00")));
        assert_eq!(block.duration().value(), 120);
    }

    #[test]
    fn test_aligned_overnight_block_split_across_weeks_is_rejected() {
        let poll = Poll::from_json_str(OVERNIGHT).unwrap();
        // Sunday lands after Monday in the participant poll.
        let backwards = DateAlignment::new(
            &[d(2024, 3, 10), d(2024, 3, 11)],
            &[d(2024, 3, 24), d(2024, 3, 18)],
        )
        .unwrap();
        assert!(matches!(
            poll.raw_responses_aligned(&backwards),
            Err(PollError::BrokenByAlignment { .. })
        ));

        // Still ordered, but stretched over a week.
        let stretched = DateAlignment::new(
            &[d(2024, 3, 10), d(2024, 3, 11)],
            &[d(2024, 3, 17), d(2024, 3, 25)],
        )
        .unwrap();
        assert!(matches!(
            poll.raw_responses_aligned(&stretched),
            Err(PollError::BrokenByAlignment { .. })
        ));
    }
}
