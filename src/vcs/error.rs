use std::path::PathBuf;

use snafu::Snafu;

use crate::ext::BestEffortPathExt;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VcsError {
    #[snafu(display("Failed to spawn '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("'{}' failed with exit code {}: {}", command, status, stderr))]
    UnsuccessfulCommand {
        command: String,
        status: i32,
        stderr: String,
    },
    #[snafu(display("Cannot resolve reference '{}'", reference))]
    ReferenceError { reference: String },
    #[snafu(display("Output of '{}' is not valid UTF-8", command))]
    EncodingError {
        command: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Unexpected output from '{}'", command))]
    OutputError { command: String, source: ParseError },
    #[snafu(display("{} is not inside a git work tree", root.best_effort_path_display()))]
    NotARepository { root: PathBuf },
    #[snafu(display("HEAD is detached, check out a branch first"))]
    DetachedHead,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    #[snafu(display("Status '{}' is missing its path", status))]
    MissingPath { status: String },
    #[snafu(display("Malformed tree entry '{}'", entry))]
    MalformedEntry { entry: String },
}
