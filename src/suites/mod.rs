//! Built-in scenario suites
//!
//! A suite is a static list of [`TestCase`]s. Each case receives its own
//! port and shared page settings, and owns everything it creates.

pub mod cart;
pub mod login;

use browser_port::BrowserPort;
use clap::ValueEnum;
use futures::future::BoxFuture;
use page_objects::PageSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub type CaseFuture = BoxFuture<'static, anyhow::Result<()>>;

/// What a case gets to work with.
#[derive(Clone)]
pub struct CaseContext {
    pub port: Arc<dyn BrowserPort>,
    pub settings: Arc<PageSettings>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Login,
    Cart,
}

impl Suite {
    pub fn name(&self) -> &'static str {
        match self {
            Suite::Login => "login",
            Suite::Cart => "cart",
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `--suite` selection on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SuiteFilter {
    Login,
    Cart,
    #[default]
    All,
}

impl SuiteFilter {
    fn includes(&self, suite: Suite) -> bool {
        match self {
            SuiteFilter::All => true,
            SuiteFilter::Login => suite == Suite::Login,
            SuiteFilter::Cart => suite == Suite::Cart,
        }
    }
}

#[derive(Clone, Copy)]
pub struct TestCase {
    pub suite: Suite,
    pub name: &'static str,
    pub title: &'static str,
    run: fn(CaseContext) -> CaseFuture,
}

impl TestCase {
    pub const fn new(
        suite: Suite,
        name: &'static str,
        title: &'static str,
        run: fn(CaseContext) -> CaseFuture,
    ) -> Self {
        Self {
            suite,
            name,
            title,
            run,
        }
    }

    pub fn run(&self, cx: CaseContext) -> CaseFuture {
        (self.run)(cx)
    }

    /// `suite/name`
    pub fn id(&self) -> String {
        format!("{}/{}", self.suite, self.name)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("suite", &self.suite)
            .field("name", &self.name)
            .finish()
    }
}

pub fn all_cases() -> Vec<TestCase> {
    login::CASES.iter().chain(cart::CASES.iter()).copied().collect()
}

/// Cases in `filter`, optionally narrowed to one case name (or `suite/name`).
pub fn select(filter: SuiteFilter, case: Option<&str>) -> Vec<TestCase> {
    all_cases()
        .into_iter()
        .filter(|c| filter.includes(c.suite))
        .filter(|c| case.map_or(true, |wanted| wanted == c.name || wanted == c.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn case_ids_are_unique() {
        let cases = all_cases();
        let ids: HashSet<String> = cases.iter().map(TestCase::id).collect();
        assert_eq!(ids.len(), cases.len());
        assert_eq!(cases.len(), login::CASES.len() + cart::CASES.len());
    }

    #[test]
    fn selection_by_suite_and_name() {
        assert!(select(SuiteFilter::Login, None)
            .iter()
            .all(|c| c.suite == Suite::Login));
        let picked = select(SuiteFilter::All, Some("cart/persistence"));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "persistence");
        assert!(select(SuiteFilter::Login, Some("persistence")).is_empty());
    }
}
