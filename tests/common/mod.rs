//! Shared integration-test harness for running the `breathpace` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Environment variables that would leak host settings into a test run.
const SCRUBBED_ENV: [&str; 10] = [
    "BREATHPACE_CONFIG",
    "BREATHPACE_COLOR",
    "BREATHPACE_LOG_FORMAT",
    "BREATHPACE_LOG_LEVEL",
    "BREATHPACE_EVENTS_FILE",
    "BREATHPACE_METRICS_PORT",
    "BREATHPACE_MAX_CONFIG_SIZE",
    "BREATHPACE_MAX_PHASE_SECONDS",
    "BREATHPACE_MAX_CYCLES",
    "NO_COLOR",
];

/// Helpers for spawning the binary once per test.
pub struct BreathpaceProcess;

impl BreathpaceProcess {
    fn command(args: &[&str]) -> Command {
        let bin = env!("CARGO_BIN_EXE_breathpace");
        let mut cmd = Command::new(bin);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for var in SCRUBBED_ENV {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Runs the binary to completion and captures its output.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::command(args)
            .output()
            .expect("failed to run breathpace")
    }

    /// Like [`spawn_command`](Self::spawn_command) with extra environment.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = Self::command(args);
        for (key, value) in env {
            cmd.env(key, value);
        }
        cmd.output().expect("failed to run breathpace")
    }

    /// Absolute path to a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    /// Writes `yaml` to `name` inside `dir` and returns the path.
    #[allow(clippy::missing_panics_doc)]
    pub fn write_session(dir: &Path, name: &str, yaml: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, yaml).expect("failed to write session file");
        path
    }
}

/// Exit code of a finished process.
#[allow(clippy::missing_panics_doc)]
pub fn exit_code(output: &Output) -> i32 {
    output.status.code().expect("process killed by signal")
}

/// Stdout as a lossy string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr as a lossy string.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Parses every non-empty stdout line as JSON.
#[allow(clippy::missing_panics_doc)]
pub fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    stdout(output)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON line {l:?}: {e}")))
        .collect()
}
