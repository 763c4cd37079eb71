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

use crate::{cli::BenchArgs, err::CliError};
use cohort_alloc_model::{
    generator::{InstanceGenConfig, InstanceGenConfigBuilder, InstanceGenerator},
    problem::CohortProblem,
};
use cohort_alloc_solver::{
    candidates::GeneratorConfig,
    engine::{CohortEngine, EngineConfig, ScheduleError},
    framework::Solver,
    search::SearchConfig,
};
use rayon::prelude::*;
use serde::Serialize;
use std::{fs::File, io::BufWriter, time::Instant};
use tracing::{info, instrument};

#[derive(Debug, Clone, Serialize)]
struct InstanceInfo {
    idx: usize,
    seed: u64,
    participants: usize,
    facilitators: usize,
    days: usize,
    target_count: usize,
    total_capacity: u64,
}

#[derive(Debug, Clone, Serialize)]
struct RunResult {
    instance: InstanceInfo,
    outcome: String,
    scheduled: usize,
    scheduled_participants: usize,
    candidates: usize,
    nodes: u64,
    backtracks: u64,
    elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
struct BenchmarkReport {
    description: String,
    instances: Vec<RunResult>,
}

fn interpolate_u(val0: usize, val1: usize, step: usize, steps: usize) -> usize {
    if steps <= 1 {
        return val1;
    }
    let num = (val1 as isize - val0 as isize) * step as isize;
    (val0 as isize + num / (steps as isize - 1)).max(0) as usize
}

fn run_one(
    idx: usize,
    config: &InstanceGenConfig<i64>,
    engine: &CohortEngine<i64>,
) -> RunResult {
    let problem: CohortProblem<i64> = InstanceGenerator::new(config.clone()).generate();
    let instance = InstanceInfo {
        idx,
        seed: config.seed(),
        participants: config.participants(),
        facilitators: config.facilitators(),
        days: config.days(),
        target_count: config.params().target_count(),
        total_capacity: problem.roster().total_capacity(),
    };

    let t0 = Instant::now();
    let result = engine.solve(&problem);
    let elapsed_ms = t0.elapsed().as_millis();

    match result {
        Ok(out) => {
            out.schedule()
                .validate(&problem)
                .expect("engine schedules are valid");
            RunResult {
                instance,
                outcome: "scheduled".into(),
                scheduled: out.schedule().len(),
                scheduled_participants: out.schedule().total_participants(),
                candidates: out.candidates(),
                nodes: out.stats().nodes,
                backtracks: out.stats().backtracks,
                elapsed_ms,
            }
        }
        Err(e) => {
            let (outcome, nodes, backtracks) = match &e {
                ScheduleError::Aborted(a) => ("aborted", a.stats().nodes, a.stats().backtracks),
                ScheduleError::Infeasible(_) => ("infeasible", 0, 0),
                ScheduleError::MalformedInput(_) => ("malformed", 0, 0),
            };
            info!(idx, %e, "Instance not scheduled");
            RunResult {
                instance,
                outcome: outcome.into(),
                scheduled: 0,
                scheduled_participants: 0,
                candidates: 0,
                nodes,
                backtracks,
                elapsed_ms,
            }
        }
    }
}

#[instrument(level = "info", skip_all, fields(instances = args.instances))]
pub fn run(args: &BenchArgs) -> Result<(), CliError> {
    let engine = CohortEngine::new(EngineConfig {
        generator: GeneratorConfig {
            max_candidates: Some(args.max_candidates),
            ..GeneratorConfig::default()
        },
        search: SearchConfig {
            max_solver_time_ms: Some(args.max_solver_time_ms),
            ..SearchConfig::default()
        },
    });

    let n = args.instances;
    let configs = (0..n)
        .map(|i| {
            let participants = interpolate_u(args.min_participants, args.max_participants, i, n);
            let facilitators = interpolate_u(args.min_facilitators, args.max_facilitators, i, n);
            // One cohort per facilitator.
            InstanceGenConfigBuilder::<i64>::new()
                .participants(participants)
                .facilitators(facilitators)
                .target_count(facilitators)
                .seed(args.seed + i as u64)
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let results: Vec<RunResult> = configs
        .par_iter()
        .enumerate()
        .map(|(i, cfg)| run_one(i, cfg, &engine))
        .collect();

    let report = BenchmarkReport {
        description: format!(
            "Cohort allocation benchmark: {n} synthetic instances from small to big, {} ms search budget each.",
            args.max_solver_time_ms
        ),
        instances: results,
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

    let scheduled = report
        .instances
        .iter()
        .filter(|r| r.outcome == "scheduled")
        .count();
    println!();
    println!("=================================================================");
    println!("======================== Benchmark Done =========================");
    println!("=================================================================");
    println!();
    println!("Scheduled {scheduled} of {n} instances");
    println!("Wrote: {}", args.out.display());
    Ok(())
}
