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

use cohort_alloc_model::{
    calendar::AlignmentError,
    err::{InvalidParamsError, ProblemBuildError},
    generator::InstanceGenConfigBuildError,
    normalize::NormalizeError,
    poll::PollError,
    schedule::ScheduleValidationError,
};
use cohort_alloc_solver::engine::ScheduleError;
use std::{fmt::Display, path::PathBuf};

#[derive(Debug)]
pub enum CliError {
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Poll { path: PathBuf, source: PollError },
    Alignment(AlignmentError),
    Normalize(NormalizeError<i64>),
    Params(InvalidParamsError<i64>),
    Build(ProblemBuildError<i64>),
    Instance(InstanceGenConfigBuildError<i64>),
    Schedule {
        track: Option<String>,
        source: ScheduleError<i64>,
    },
    Invalid {
        track: Option<String>,
        source: ScheduleValidationError<i64>,
    },
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            CliError::Json { path, source } => write!(f, "{}: {}", path.display(), source),
            CliError::Poll { path, source } => write!(f, "{}: {}", path.display(), source),
            CliError::Alignment(e) => write!(f, "{e}"),
            CliError::Normalize(e) => write!(f, "{e}"),
            CliError::Params(e) => write!(f, "{e}"),
            CliError::Build(e) => write!(f, "{e}"),
            CliError::Instance(e) => write!(f, "{e}"),
            CliError::Schedule {
                track: Some(track),
                source,
            } => write!(f, "Track {track}: {source}"),
            CliError::Schedule {
                track: None,
                source,
            } => write!(f, "{source}"),
            CliError::Invalid {
                track: Some(track),
                source,
            } => write!(f, "Track {track}: schedule failed validation: {source}"),
            CliError::Invalid {
                track: None,
                source,
            } => write!(f, "Schedule failed validation: {source}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io { source, .. } => Some(source),
            CliError::Json { source, .. } => Some(source),
            CliError::Poll { source, .. } => Some(source),
            CliError::Alignment(e) => Some(e),
            CliError::Normalize(e) => Some(e),
            CliError::Params(e) => Some(e),
            CliError::Build(e) => Some(e),
            CliError::Instance(e) => Some(e),
            CliError::Schedule { source, .. } => Some(source),
            CliError::Invalid { source, .. } => Some(source),
        }
    }
}

impl From<AlignmentError> for CliError {
    fn from(value: AlignmentError) -> Self {
        CliError::Alignment(value)
    }
}

impl From<NormalizeError<i64>> for CliError {
    fn from(value: NormalizeError<i64>) -> Self {
        CliError::Normalize(value)
    }
}

impl From<InvalidParamsError<i64>> for CliError {
    fn from(value: InvalidParamsError<i64>) -> Self {
        CliError::Params(value)
    }
}

impl From<ProblemBuildError<i64>> for CliError {
    fn from(value: ProblemBuildError<i64>) -> Self {
        CliError::Build(value)
    }
}

impl From<InstanceGenConfigBuildError<i64>> for CliError {
    fn from(value: InstanceGenConfigBuildError<i64>) -> Self {
        CliError::Instance(value)
    }
}
