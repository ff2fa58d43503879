//! Single external-process invocation with streamed diagnostics.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

use super::types::CancelToken;

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process exited with status 0.
    Success,
    /// The process exited non-zero, or could not be started at all.
    /// Both are reported here; the stage-level caller treats them
    /// identically.
    Failed(String),
    /// Cancellation was observed; the process was asked to terminate.
    Cancelled,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

/// Run one external command, forwarding its diagnostic stream.
///
/// The tool's stderr is read line by line; each line is handed to
/// `on_line` and then dropped, so the stream is never buffered whole.
/// The cancellation token is checked around every line: when set, the
/// child is killed and `Cancelled` returned instead of waiting for a
/// natural exit.
pub fn run_tool(
    program: &Path,
    args: &[String],
    cancel: &CancelToken,
    mut on_line: impl FnMut(&str),
) -> RunOutcome {
    tracing::debug!("running: {} {}", program.display(), args.join(" "));

    let mut child = match Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return RunOutcome::Failed(format!("failed to start {}: {}", program.display(), e))
        }
    };

    let Some(stderr) = child.stderr.take() else {
        let _ = child.kill();
        let _ = child.wait();
        return RunOutcome::Failed("failed to capture diagnostic stream".to_string());
    };

    for line in BufReader::new(stderr).lines() {
        if cancel.is_cancelled() {
            return terminate(child);
        }
        match line {
            Ok(line) => on_line(&line),
            Err(_) => break,
        }
        if cancel.is_cancelled() {
            return terminate(child);
        }
    }

    if cancel.is_cancelled() {
        return terminate(child);
    }

    match child.wait() {
        Ok(status) if status.success() => RunOutcome::Success,
        Ok(status) => RunOutcome::Failed(format!("exit code {}", status.code().unwrap_or(-1))),
        Err(e) => RunOutcome::Failed(format!("process error: {}", e)),
    }
}

fn terminate(mut child: std::process::Child) -> RunOutcome {
    let _ = child.kill();
    let _ = child.wait();
    RunOutcome::Cancelled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh(script: &str) -> (PathBuf, Vec<String>) {
        (
            PathBuf::from("sh"),
            vec!["-c".to_string(), script.to_string()],
        )
    }

    #[test]
    fn successful_run_forwards_lines() {
        let (program, args) = sh("echo one 1>&2; echo two 1>&2");
        let mut lines = Vec::new();
        let outcome = run_tool(&program, &args, &CancelToken::new(), |l| {
            lines.push(l.to_string())
        });
        assert_eq!(outcome, RunOutcome::Success);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn nonzero_exit_reports_code() {
        let (program, args) = sh("exit 3");
        let outcome = run_tool(&program, &args, &CancelToken::new(), |_| {});
        assert_eq!(outcome, RunOutcome::Failed("exit code 3".to_string()));
    }

    #[test]
    fn missing_executable_reports_through_outcome() {
        let outcome = run_tool(
            Path::new("/nonexistent/transcoder"),
            &[],
            &CancelToken::new(),
            |_| {},
        );
        match outcome {
            RunOutcome::Failed(detail) => assert!(detail.contains("failed to start")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn cancellation_terminates_promptly() {
        let (program, args) = sh("echo first 1>&2; sleep 30; echo late 1>&2");
        let cancel = CancelToken::new();
        let observer = cancel.clone();

        let started = std::time::Instant::now();
        let outcome = run_tool(&program, &args, &cancel, |_| observer.cancel());

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }
}
