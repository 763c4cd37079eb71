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

use crate::{cli::ScheduleArgs, err::CliError};
use cohort_alloc_core::time::{TimeDelta, TimePoint};
use cohort_alloc_model::{
    calendar::DateAlignment,
    normalize::{FacilitatorTerms, Normalizer},
    partition::{partition_by_track, roster_for_track},
    poll::{Poll, from_minutes},
    prelude::*,
};
use cohort_alloc_solver::{
    candidates::GeneratorConfig,
    engine::{EngineConfig, EngineOutcome, schedule_cohorts},
    search::{SearchConfig, SearchStats},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Deserialize)]
struct RosterEntry {
    capacity: u32,
    #[serde(default)]
    track: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TrackEntry {
    target: usize,
    members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct RunParams {
    min_size: usize,
    max_size: usize,
    block_minutes: i64,
    step_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
struct CohortEntry {
    start: String,
    end: String,
    facilitator: String,
    members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct StatsEntry {
    candidates: usize,
    nodes: u64,
    backtracks: u64,
    elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
struct GroupReport {
    track: Option<String>,
    requested: usize,
    cohorts: Vec<CohortEntry>,
    not_selected: Vec<String>,
    remaining_capacity: BTreeMap<String, u32>,
    stats: StatsEntry,
}

#[derive(Debug, Clone, Serialize)]
struct ScheduleReport {
    params: RunParams,
    groups: Vec<GroupReport>,
    not_in_any_track: Vec<String>,
    not_available: Vec<String>,
}

fn open(path: &Path) -> Result<BufReader<File>, CliError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn read_json<D: for<'de> Deserialize<'de>>(path: &Path) -> Result<D, CliError> {
    serde_json::from_reader(open(path)?).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_poll(path: &Path) -> Result<Poll, CliError> {
    Poll::from_reader(open(path)?).map_err(|source| CliError::Poll {
        path: path.to_path_buf(),
        source,
    })
}

fn format_minutes(at: TimePoint<i64>, pattern: &str) -> String {
    from_minutes(at)
        .map(|t| t.format(pattern).to_string())
        .unwrap_or_else(|| at.to_string())
}

fn names<'a>(ids: impl IntoIterator<Item = &'a ParticipantId>) -> Vec<String> {
    ids.into_iter().map(|p| p.as_str().to_owned()).collect()
}

fn group_report(
    track: Option<&Track>,
    problem: &CohortProblem<i64>,
    outcome: &EngineOutcome<i64>,
) -> GroupReport {
    let schedule = outcome.schedule();
    let stats: &SearchStats = outcome.stats();
    GroupReport {
        track: track.map(|t| t.as_str().to_owned()),
        requested: problem.params().target_count(),
        cohorts: schedule
            .cohorts()
            .iter()
            .map(|c| CohortEntry {
                start: format_minutes(c.start_time(), "%Y-%m-%dT%H:%M"),
                end: format_minutes(c.end_time(), "%Y-%m-%dT%H:%M"),
                facilitator: c.facilitator().as_str().to_owned(),
                members: names(c.members()),
            })
            .collect(),
        not_selected: names(&schedule.unassigned(problem.availability())),
        remaining_capacity: schedule
            .iter_remaining_capacity()
            .map(|(f, c)| (f.as_str().to_owned(), c))
            .collect(),
        stats: StatsEntry {
            candidates: outcome.candidates(),
            nodes: stats.nodes,
            backtracks: stats.backtracks,
            elapsed_ms: stats.elapsed.as_millis(),
        },
    }
}

fn build_problem(
    available: AvailabilitySet<i64>,
    roster: Roster<i64>,
    window: &EventWindow<i64>,
    params: CohortParams<i64>,
) -> Result<CohortProblem<i64>, ProblemBuildError<i64>> {
    let mut builder = CohortProblemBuilder::new(params);
    builder
        .availability(available)?
        .roster(roster)?
        .window(window.clone());
    builder.build()
}

fn solve(
    track: Option<&Track>,
    problem: &CohortProblem<i64>,
    config: &EngineConfig<i64>,
) -> Result<GroupReport, CliError> {
    let outcome = schedule_cohorts(problem, config).map_err(|source| CliError::Schedule {
        track: track.map(|t| t.as_str().to_owned()),
        source,
    })?;
    check(track, problem, outcome.schedule())?;
    Ok(group_report(track, problem, &outcome))
}

fn check(
    track: Option<&Track>,
    problem: &CohortProblem<i64>,
    schedule: &Schedule<i64>,
) -> Result<(), CliError> {
    schedule.validate(problem).map_err(|source| {
        warn!(%source, "Schedule failed validation");
        CliError::Invalid {
            track: track.map(|t| t.as_str().to_owned()),
            source,
        }
    })
}

fn print_summary(report: &ScheduleReport, block_minutes: i64) {
    let mut text = String::new();
    for group in &report.groups {
        let label = group.track.as_deref().unwrap_or("Cohort");
        for (i, c) in group.cohorts.iter().enumerate() {
            text += &format!("{label} {}, {} to {}\n", i + 1, c.start, c.end);
            text += &c.members.join(", ");
            text += &format!("\nFacilitator: {}\n\n", c.facilitator);
        }
        if !group.not_selected.is_empty() {
            text += &format!("{label} applicants not included in cohorts:\n");
            for name in &group.not_selected {
                text += &format!("{name}\n");
            }
            text += "\n";
        }
    }
    if !report.not_in_any_track.is_empty() {
        text += "Applicants without a track:\n";
        for name in &report.not_in_any_track {
            text += &format!("{name}\n");
        }
        text += "\n";
    }
    if !report.not_available.is_empty() {
        text += &format!(
            "Applicants skipped for low availability (less than {block_minutes} minutes in one stretch):\n"
        );
        for name in &report.not_available {
            text += &format!("{name}\n");
        }
    }
    println!("{text}");
}

#[instrument(level = "info", skip_all)]
pub fn run(args: &ScheduleArgs) -> Result<(), CliError> {
    let block = TimeDelta::new(args.block_minutes);
    let params = CohortParams::new(args.min_size, args.max_size, block, args.target)?;
    let config = EngineConfig {
        generator: GeneratorConfig {
            step: TimeDelta::new(args.step_minutes),
            max_candidates: args.max_candidates,
        },
        search: SearchConfig {
            max_nodes: args.max_nodes,
            max_solver_time_ms: args.max_solver_time_ms,
        },
    };

    let participants = read_poll(&args.participants)?;
    let facilitators = read_poll(&args.facilitators)?;
    let window = participants.event_window();

    let facilitator_raw = if args.align_weekdays {
        let alignment = DateAlignment::new(facilitators.dates(), participants.dates())?;
        facilitators
            .raw_responses_aligned(&alignment)
            .map_err(|source| CliError::Poll {
                path: args.facilitators.clone(),
                source,
            })?
    } else {
        facilitators.raw_responses()
    };

    let entries: HashMap<String, RosterEntry> = read_json(&args.roster)?;
    let terms: HashMap<String, FacilitatorTerms> = entries
        .into_iter()
        .map(|(name, e)| {
            let terms = FacilitatorTerms {
                capacity: e.capacity,
                track: e.track.map(Track::from),
            };
            (name, terms)
        })
        .collect();

    let normalizer = Normalizer::new(block).with_skip_list(args.skip.iter().cloned());
    let normalized = normalizer.normalize_participants(&participants.raw_responses())?;
    let roster = normalizer.normalize_facilitators(&facilitator_raw, &terms)?;
    let (available, unavailable) = normalized.into_parts();
    info!(
        available = available.len(),
        unavailable = unavailable.len(),
        facilitators = roster.len(),
        "Inputs normalized"
    );

    let (groups, not_in_any_track) = match &args.tracks {
        None => {
            let problem = build_problem(available, roster, &window, params)?;
            (vec![solve(None, &problem, &config)?], Vec::new())
        }
        Some(path) => {
            let tracks: BTreeMap<String, TrackEntry> = read_json(path)?;
            let membership: HashMap<ParticipantId, Track> = tracks
                .iter()
                .flat_map(|(track, e)| {
                    e.members
                        .iter()
                        .map(move |m| (ParticipantId::new(m), Track::new(track)))
                })
                .collect();
            let partition = partition_by_track(&available, &membership)?;

            let mut groups = Vec::with_capacity(tracks.len());
            for (name, entry) in &tracks {
                let track = Track::new(name);
                let intake = partition
                    .group(name)
                    .cloned()
                    .unwrap_or_else(AvailabilitySet::new);
                let problem = build_problem(
                    intake,
                    roster_for_track(&roster, &track)?,
                    &window,
                    params.with_target_count(entry.target),
                )?;
                groups.push(solve(Some(&track), &problem, &config)?);
            }
            (groups, names(partition.remainder().ids()))
        }
    };

    let report = ScheduleReport {
        params: RunParams {
            min_size: args.min_size,
            max_size: args.max_size,
            block_minutes: args.block_minutes,
            step_minutes: args.step_minutes,
        },
        groups,
        not_in_any_track,
        not_available: names(&unavailable),
    };

    let file = File::create(&args.out).map_err(|source| CliError::Io {
        path: args.out.clone(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report).map_err(|source| {
        CliError::Json {
            path: args.out.clone(),
            source,
        }
    })?;

    print_summary(&report, args.block_minutes);
    info!(out = %args.out.display(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_alloc_core::time::TimeInterval;

    fn ti(a: i64, b: i64) -> TimeInterval<i64> {
        TimeInterval::new(TimePoint::new(a), TimePoint::new(b))
    }

    fn problem() -> CohortProblem<i64> {
        let params = CohortParams::new(2, 3, TimeDelta::new(60), 1).unwrap();
        let mut b = CohortProblemBuilder::new(params);
        for name in ["a", "b", "late"] {
            let from = if name == "late" { 60 } else { 0 };
            b.add_participant(name, vec![ti(from, 120)]).unwrap();
        }
        b.add_facilitator(Facilitator::new("f", vec![ti(0, 120)], 1))
            .unwrap();
        b.add_day(ti(0, 120));
        b.build().unwrap()
    }

    #[test]
    fn test_check_accepts_valid_schedule() {
        let p = problem();
        let s = Schedule::new(
            vec![ScheduledCohort::new(
                ti(0, 60),
                vec![ParticipantId::new("a"), ParticipantId::new("b")],
                "f".into(),
            )],
            vec![("f".into(), 0)],
        );
        assert!(check(None, &p, &s).is_ok());
    }

    #[test]
    fn test_check_stops_on_invalid_schedule() {
        let p = problem();
        let s = Schedule::new(
            vec![ScheduledCohort::new(
                ti(0, 60),
                vec![ParticipantId::new("a"), ParticipantId::new("late")],
                "f".into(),
            )],
            vec![("f".into(), 0)],
        );
        let track = Track::new("fellows");
        match check(Some(&track), &p, &s) {
            Err(CliError::Invalid {
                track: Some(t),
                source: ScheduleValidationError::ParticipantUnavailable { .. },
            }) => assert_eq!(t, "fellows"),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
