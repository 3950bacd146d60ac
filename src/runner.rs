//! Concurrent suite runner
//!
//! Cases run as independent tokio tasks. A semaphore bounds how many are in
//! flight, every case gets a fresh port from the [`PortFactory`], and each
//! one runs under its own timeout. Failures capture a screenshot.

use crate::config::Backend;
use crate::suites::{CaseContext, TestCase};
use anyhow::anyhow;
use async_trait::async_trait;
use browser_port::{BrowserPort, ChromiumConfig, ChromiumPort, PortError};
use chrono::{DateTime, Utc};
use page_objects::{utils, PageSettings};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefront_sim::{SimOptions, Storefront};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Opens one isolated browsing context per test case.
#[async_trait]
pub trait PortFactory: Send + Sync {
    fn backend(&self) -> Backend;

    async fn open(&self) -> Result<Arc<dyn BrowserPort>, PortError>;
}

pub struct SimFactory {
    options: SimOptions,
}

impl SimFactory {
    pub fn new(options: SimOptions) -> Self {
        Self { options }
    }

    /// Simulated storefront served under `base_url`.
    pub fn for_base_url(base_url: &str) -> Self {
        Self::new(SimOptions {
            base_url: base_url.to_string(),
            ..SimOptions::default()
        })
    }
}

#[async_trait]
impl PortFactory for SimFactory {
    fn backend(&self) -> Backend {
        Backend::Sim
    }

    async fn open(&self) -> Result<Arc<dyn BrowserPort>, PortError> {
        Ok(Arc::new(Storefront::new(self.options.clone())))
    }
}

pub struct ChromiumFactory {
    config: ChromiumConfig,
}

impl ChromiumFactory {
    pub fn new(config: ChromiumConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PortFactory for ChromiumFactory {
    fn backend(&self) -> Backend {
        Backend::Chromium
    }

    async fn open(&self) -> Result<Arc<dyn BrowserPort>, PortError> {
        Ok(Arc::new(ChromiumPort::launch(&self.config).await?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { error: String },
    TimedOut { after_ms: u64 },
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub backend: Backend,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed ({} total)",
            self.passed(),
            self.failed(),
            self.cases.len()
        )
    }
}

pub struct SuiteRunner {
    factory: Arc<dyn PortFactory>,
    settings: Arc<PageSettings>,
    workers: usize,
    case_timeout: Duration,
}

impl SuiteRunner {
    pub fn new(factory: Arc<dyn PortFactory>, settings: Arc<PageSettings>) -> Self {
        Self {
            factory,
            settings,
            workers: 1,
            case_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_case_timeout(mut self, timeout: Duration) -> Self {
        self.case_timeout = timeout;
        self
    }

    /// Run `cases` and report them in the order given.
    pub async fn run(&self, cases: Vec<TestCase>) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let limit = Arc::new(Semaphore::new(self.workers));
        let mut join_set = JoinSet::new();

        info!(%run_id, cases = cases.len(), workers = self.workers, "Starting run");

        for (index, case) in cases.iter().copied().enumerate() {
            let pool = limit.clone();
            let factory = self.factory.clone();
            let settings = self.settings.clone();
            let timeout = self.case_timeout;
            join_set.spawn(async move {
                let report = match pool.acquire_owned().await {
                    Ok(_permit) => run_case(factory, settings, case, timeout).await,
                    Err(err) => failed_report(&case, anyhow!("Run cancelled: {}", err), 0),
                };
                (index, report)
            });
        }

        let mut slots: Vec<Option<CaseReport>> = vec![None; cases.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(join_err) => error!(error = %join_err, "Test task aborted"),
            }
        }

        let reports = slots
            .into_iter()
            .zip(cases.iter())
            .map(|(slot, case)| {
                slot.unwrap_or_else(|| failed_report(case, anyhow!("test task aborted"), 0))
            })
            .collect();

        let report = RunReport {
            run_id,
            backend: self.factory.backend(),
            started_at,
            finished_at: Utc::now(),
            cases: reports,
        };
        info!(%run_id, summary = %report.summary(), "Run finished");
        report
    }
}

async fn run_case(
    factory: Arc<dyn PortFactory>,
    settings: Arc<PageSettings>,
    case: TestCase,
    timeout: Duration,
) -> CaseReport {
    let id = case.id();
    let started = Instant::now();
    info!(case = %id, "Case started");

    let port = match factory.open().await {
        Ok(port) => port,
        Err(err) => {
            error!(case = %id, error = %err, "Could not open browsing context");
            return failed_report(&case, err.into(), elapsed_ms(started));
        }
    };

    let cx = CaseContext {
        port: port.clone(),
        settings: settings.clone(),
    };
    let outcome = match tokio::time::timeout(timeout, case.run(cx)).await {
        Ok(Ok(())) => Outcome::Passed,
        Ok(Err(err)) => Outcome::Failed {
            error: format!("{:#}", err),
        },
        Err(_) => Outcome::TimedOut {
            after_ms: timeout.as_millis() as u64,
        },
    };
    let duration_ms = elapsed_ms(started);

    let screenshot = if outcome.is_passed() {
        info!(case = %id, duration_ms, "Case passed");
        None
    } else {
        error!(case = %id, duration_ms, outcome = ?outcome, "Case failed");
        let file_stem = id.replace('/', "-");
        match utils::take_screenshot(port.clone(), &settings.screenshot_dir, &file_stem).await {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(case = %id, error = %err, "Failure screenshot not captured");
                None
            }
        }
    };

    if let Err(err) = port.close().await {
        warn!(case = %id, error = %err, "Browsing context did not close cleanly");
    }

    CaseReport {
        id,
        title: case.title.to_string(),
        outcome,
        duration_ms,
        screenshot,
    }
}

fn failed_report(case: &TestCase, err: anyhow::Error, duration_ms: u64) -> CaseReport {
    CaseReport {
        id: case.id(),
        title: case.title.to_string(),
        outcome: Outcome::Failed {
            error: format!("{:#}", err),
        },
        duration_ms,
        screenshot: None,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
