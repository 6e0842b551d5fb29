use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "introscore",
    version,
    about = "Score a spoken self-introduction transcript against the speaking rubric"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a transcript and print the report as JSON.
    Score(ScoreArgs),
    /// Print the effective rubric after validation.
    Rubric(RubricArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RubricSource {
    /// Rubric JSON file replacing the bundled rubric.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Transcript text.
    #[arg(long, value_name = "TEXT", conflicts_with = "transcript_file")]
    pub transcript: Option<String>,
    /// File holding the transcript text.
    #[arg(long = "transcript-file", value_name = "PATH")]
    pub transcript_file: Option<PathBuf>,
    /// Spoken duration in seconds.
    #[arg(long = "duration-secs", value_name = "SECONDS", conflicts_with = "duration_min")]
    pub duration_secs: Option<f64>,
    /// Spoken duration in minutes.
    #[arg(long = "duration-min", value_name = "MINUTES")]
    pub duration_min: Option<f64>,
    #[command(flatten)]
    pub rubric: RubricSource,
    /// LanguageTool server base URL; the local rule checker is used otherwise.
    #[arg(long = "language-tool", value_name = "URL")]
    pub language_tool: Option<String>,
    /// Per-call service timeout in milliseconds (overrides the rubric).
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,
    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,
}

impl ScoreArgs {
    pub fn transcript_text(&self) -> Result<String> {
        match (&self.transcript, &self.transcript_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read transcript file {:?}", path)),
            (None, None) => bail!("Provide a transcript via --transcript or --transcript-file"),
        }
    }

    /// Duration in minutes. Sign and finiteness are checked by the scorer.
    pub fn duration_minutes(&self) -> Result<f64> {
        match (self.duration_secs, self.duration_min) {
            (Some(seconds), _) => Ok(seconds / 60.0),
            (None, Some(minutes)) => Ok(minutes),
            (None, None) => bail!("Provide a duration via --duration-secs or --duration-min"),
        }
    }

    pub fn timeout(&self) -> Result<Option<Duration>> {
        match self.timeout_ms {
            Some(ms) => {
                ensure!(ms > 0, "timeout-ms must be positive");
                Ok(Some(Duration::from_millis(ms)))
            }
            None => Ok(None),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RubricArgs {
    #[command(flatten)]
    pub rubric: RubricSource,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    fn score_args(args: &[&str]) -> super::ScoreArgs {
        let cli = Cli::try_parse_from(["introscore", "score"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Score(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn seconds_are_converted_to_minutes() {
        let args = score_args(&["--transcript", "Hi there", "--duration-secs", "90"]);
        assert_eq!(args.duration_minutes().unwrap(), 1.5);
        assert_eq!(args.transcript_text().unwrap(), "Hi there");
    }

    #[test]
    fn transcript_sources_conflict() {
        let result = Cli::try_parse_from([
            "introscore",
            "score",
            "--transcript",
            "Hi",
            "--transcript-file",
            "intro.txt",
            "--duration-min",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_duration_is_reported() {
        let args = score_args(&["--transcript", "Hi"]);
        assert!(args.duration_minutes().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = score_args(&["--transcript", "Hi", "--duration-min", "1", "--timeout-ms", "0"]);
        assert!(args.timeout().is_err());
        assert!(!args.pretty);
    }

    #[test]
    fn rubric_subcommand_accepts_config() {
        let cli = Cli::try_parse_from(["introscore", "rubric", "--config", "custom.json"]).unwrap();
        let Command::Rubric(args) = cli.command else {
            panic!("expected rubric command");
        };
        assert_eq!(args.rubric.config.unwrap().to_str(), Some("custom.json"));
    }
}
