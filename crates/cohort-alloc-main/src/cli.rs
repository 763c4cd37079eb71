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

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Form facilitated cohorts from availability polls", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Schedule cohorts from participant and facilitator poll exports.
    Schedule(ScheduleArgs),
    /// Run the engine on a ramp of synthetic instances.
    Bench(BenchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ScheduleArgs {
    /// Participant poll export (JSON).
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub participants: PathBuf,

    /// Facilitator poll export (JSON).
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub facilitators: PathBuf,

    /// Facilitator capacities and tracks: `{"name": {"capacity": 2, "track": "gov"}}`.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub roster: PathBuf,

    /// Per-track intake: `{"gov": {"target": 2, "members": ["..."]}}`.
    /// Every track is scheduled on its own; `--target` is ignored.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub tracks: Option<PathBuf>,

    /// Move facilitator dates onto the participant date with the same weekday.
    #[arg(long, action = ArgAction::SetTrue)]
    pub align_weekdays: bool,

    /// Responder to drop before filtering. Repeatable.
    #[arg(long = "skip", value_name = "NAME")]
    pub skip: Vec<String>,

    #[arg(long, default_value_t = 4)]
    pub min_size: usize,

    #[arg(long, default_value_t = 6)]
    pub max_size: usize,

    /// Meeting length.
    #[arg(long = "block-minutes", default_value_t = 90)]
    pub block_minutes: i64,

    /// Number of cohorts to form.
    #[arg(short, long, default_value_t = 6)]
    pub target: usize,

    /// Distance between two candidate slot starts.
    #[arg(long = "step-minutes", default_value_t = 30)]
    pub step_minutes: i64,

    #[arg(long, value_name = "N")]
    pub max_candidates: Option<usize>,

    #[arg(long, value_name = "N")]
    pub max_nodes: Option<u64>,

    #[arg(long = "max-ms", value_name = "MS")]
    pub max_solver_time_ms: Option<u64>,

    /// Where to write the JSON report.
    #[arg(short, long, default_value = "cohorts.json", value_hint = ValueHint::FilePath)]
    pub out: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct BenchArgs {
    /// Number of instances from small to big.
    #[arg(long, default_value_t = 10)]
    pub instances: usize,

    #[arg(long, default_value_t = 20)]
    pub min_participants: usize,

    #[arg(long, default_value_t = 80)]
    pub max_participants: usize,

    #[arg(long, default_value_t = 2)]
    pub min_facilitators: usize,

    #[arg(long, default_value_t = 8)]
    pub max_facilitators: usize,

    /// Seed of the first instance; instance `i` uses `seed + i`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long = "max-ms", default_value_t = 10_000)]
    pub max_solver_time_ms: u64,

    #[arg(long, default_value_t = 1_000_000)]
    pub max_candidates: usize,

    #[arg(short, long, default_value = "bench_results.json", value_hint = ValueHint::FilePath)]
    pub out: PathBuf,
}
