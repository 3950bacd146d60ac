use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use crate::cli::context::CliContext;
use crate::config::Backend;
use crate::runner::{ChromiumFactory, Outcome, PortFactory, RunReport, SimFactory, SuiteRunner};
use crate::suites::{select, SuiteFilter};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Suite to run
    #[arg(short, long, value_enum, default_value_t = SuiteFilter::All)]
    pub suite: SuiteFilter,

    /// Run one case, by name or `suite/name`
    #[arg(long)]
    pub case: Option<String>,

    /// Browser backend (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Cases to run concurrently (defaults to the configured worker count)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let settings = ctx.settings();
    let cases = select(args.suite, args.case.as_deref());
    if cases.is_empty() {
        bail!(
            "no test cases match suite {:?} and case {:?}",
            args.suite,
            args.case.as_deref().unwrap_or("*")
        );
    }

    let workers = args.workers.unwrap_or(settings.workers);
    if workers == 0 {
        bail!("--workers must be at least 1");
    }

    let backend = args.backend.unwrap_or(settings.backend);
    let factory: Arc<dyn PortFactory> = match backend {
        Backend::Sim => Arc::new(SimFactory::for_base_url(&settings.base_url)),
        Backend::Chromium => Arc::new(ChromiumFactory::new(settings.browser.clone())),
    };
    info!(?backend, cases = cases.len(), workers, "Running suites");

    let runner = SuiteRunner::new(factory, Arc::new(settings.page_settings()?))
        .with_workers(workers)
        .with_case_timeout(settings.test_timeout());
    let report = runner.run(cases).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.is_success() {
        bail!("{}", report.summary());
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Run {} ({:?})", report.run_id, report.backend);
    for case in &report.cases {
        let status = match &case.outcome {
            Outcome::Passed => "PASS".to_string(),
            Outcome::Failed { .. } => "FAIL".to_string(),
            Outcome::TimedOut { after_ms } => format!("TIMEOUT after {}ms", after_ms),
        };
        println!("  [{}] {} ({}ms)", status, case.id, case.duration_ms);
        if let Outcome::Failed { error } = &case.outcome {
            println!("      {}", error);
        }
        if let Some(path) = &case.screenshot {
            println!("      screenshot: {}", path.display());
        }
    }
    println!("{}", report.summary());
}
