//! External fuzzy finder process

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::Context;
use tracing::debug;

use crate::error::Result;

/// fzf exit status when nothing matched
const EXIT_NO_MATCH: i32 = 1;
/// fzf exit status when the user aborted
const EXIT_ABORTED: i32 = 130;

/// Runs an fzf-compatible finder over search lines
#[derive(Debug, Clone)]
pub struct FuzzyFinder {
    program: String,
    args: Vec<String>,
}

impl FuzzyFinder {
    /// Finder running `program` with extra user `args`
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Let the user pick lines interactively, starting from `query`
    ///
    /// Returns `None` when nothing was selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the finder cannot be started or fails.
    pub fn select(&self, lines: &[String], query: Option<&str>) -> Result<Option<Vec<String>>> {
        let mode = query.map(|q| ("--query", q));
        self.run(lines, mode)
    }

    /// Lines matching `query`, best first, without any interaction
    ///
    /// # Errors
    ///
    /// Returns an error if the finder cannot be started or fails.
    pub fn filter(&self, lines: &[String], query: &str) -> Result<Vec<String>> {
        Ok(self
            .run(lines, Some(("--filter", query)))?
            .unwrap_or_default())
    }

    fn run(&self, lines: &[String], mode: Option<(&str, &str)>) -> Result<Option<Vec<String>>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--delimiter=\t")
            .arg("--with-nth=2..")
            .arg("--prompt=litsync> ");
        if let Some((flag, query)) = mode {
            command.arg(flag).arg(query);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        debug!(program = %self.program, lines = lines.len(), "starting finder");
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                anyhow::bail!(
                    "Fuzzy finder '{}' not found; install fzf or set search.command",
                    self.program
                );
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to start '{}'", self.program));
            }
        };

        let mut stdin = child.stdin.take().context("Finder stdin unavailable")?;
        let input: String = lines.iter().map(|l| format!("{l}\n")).collect();
        let writer = thread::spawn(move || -> io::Result<()> {
            match stdin.write_all(input.as_bytes()) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        });

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for '{}'", self.program))?;
        match writer.join() {
            Ok(written) => written.context("Failed to write finder input")?,
            Err(_) => anyhow::bail!("Finder input thread panicked"),
        }

        match output.status.code() {
            Some(0) => {
                let selected: Vec<String> = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect();
                Ok(if selected.is_empty() { None } else { Some(selected) })
            }
            Some(EXIT_NO_MATCH | EXIT_ABORTED) => Ok(None),
            _ => anyhow::bail!("'{}' failed: {}", self.program, output.status),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn lines() -> Vec<String> {
        vec![
            "Literature/a\ta  Alpha".to_string(),
            "Literature/b\tb  Beta".to_string(),
        ]
    }

    fn shell(script: &str) -> FuzzyFinder {
        FuzzyFinder::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_select_returns_chosen_line() {
        let selected = shell("head -n 1").select(&lines(), None).unwrap();

        assert_eq!(selected, Some(vec!["Literature/a\ta  Alpha".to_string()]));
    }

    #[test]
    fn test_filter_passes_query() {
        // Positional parameters: $0 delimiter, $1 with-nth, $2 prompt, $3 flag, $4 query
        let finder = shell(r#"cat >/dev/null; printf '%s %s\n' "$3" "$4""#);

        let matched = finder.filter(&lines(), "beta").unwrap();

        assert_eq!(matched, vec!["--filter beta".to_string()]);
    }

    #[test]
    fn test_no_match_and_abort_mean_no_selection() {
        assert_eq!(shell("cat >/dev/null; exit 1").select(&lines(), None).unwrap(), None);
        assert_eq!(shell("exit 130").select(&lines(), Some("x")).unwrap(), None);
        assert!(shell("exit 1").filter(&lines(), "x").unwrap().is_empty());
    }

    #[test]
    fn test_failure_is_an_error() {
        assert!(shell("exit 2").select(&lines(), None).is_err());
    }

    #[test]
    fn test_missing_finder() {
        let err = FuzzyFinder::new("litsync-no-such-finder", Vec::new())
            .select(&lines(), None)
            .unwrap_err();

        assert!(err.to_string().contains("not found"));
    }
}
