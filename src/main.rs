use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use introscore::cli::{Cli, Command, RubricSource, ScoreArgs};
use introscore::services::LanguageToolChecker;
use introscore::{NlpServices, Rubric, RubricComposer};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Score(args) => run_score(&args),
        Command::Rubric(args) => run_rubric(&args.rubric),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_rubric(source: &RubricSource) -> Result<Rubric> {
    match &source.config {
        Some(path) => {
            info!(path = %path.display(), "loading rubric");
            Rubric::load(path).with_context(|| format!("Failed to load rubric from {:?}", path))
        }
        None => Rubric::bundled().context("Bundled rubric is invalid"),
    }
}

fn run_score(args: &ScoreArgs) -> Result<()> {
    let transcript = args.transcript_text()?;
    let duration_minutes = args.duration_minutes()?;
    let rubric = load_rubric(&args.rubric)?;

    let timeout = args.timeout()?.unwrap_or_else(|| rubric.service_timeout());
    let mut services = NlpServices::local().with_timeout(timeout);
    let language_tool = args
        .language_tool
        .as_deref()
        .or(rubric.config().services.language_tool_url.as_deref());
    if let Some(url) = language_tool {
        info!(url, "using LanguageTool grammar checker");
        let checker = LanguageToolChecker::new(url, &rubric.config().services.language, timeout)
            .context("Failed to build LanguageTool client")?;
        services = services.with_grammar(Arc::new(checker));
    }

    let composer = RubricComposer::new(Arc::new(rubric), services);
    let report = composer
        .evaluate(&transcript, duration_minutes)
        .context("Transcript could not be scored")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize score report")?;
    writeln!(io::stdout(), "{json}").context("Failed to write report")?;
    Ok(())
}

fn run_rubric(source: &RubricSource) -> Result<()> {
    let rubric = load_rubric(source)?;
    let json = serde_json::to_string_pretty(rubric.config()).context("Failed to serialize rubric")?;
    writeln!(io::stdout(), "{json}").context("Failed to write rubric")?;
    Ok(())
}
