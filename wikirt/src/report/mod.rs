//! Report formatters for round-trip outcomes
//!
//! Reporters turn one page's outcome (results or a fatal error) into text
//! consumed by people (`plain`) or CI tooling (`xml`, JUnit-style). Output of
//! both is byte-stable.
//!
//! Reporters are looked up by name in a [`ReporterRegistry`].

use crate::error::{ReportError, RoundTripError};
use crate::roundtrip::RoundTripReport;
use std::collections::HashMap;

pub mod plain;
pub mod xml;

pub use plain::PlainReporter;
pub use xml::XmlReporter;

/// What happened to one page.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Completed(&'a RoundTripReport),
    Failed {
        title: &'a str,
        error: &'a RoundTripError,
    },
}

impl Outcome<'_> {
    pub fn title(&self) -> &str {
        match self {
            Outcome::Completed(report) => &report.title,
            Outcome::Failed { title, .. } => title,
        }
    }
}

/// Renders an [`Outcome`] as text.
pub trait Reporter: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// `prefix` identifies the wiki (e.g. `enwiki`) in page labels.
    fn render(&self, prefix: &str, outcome: Outcome<'_>) -> String;
}

/// Registry of report formats.
pub struct ReporterRegistry {
    reporters: HashMap<String, Box<dyn Reporter>>,
}

impl ReporterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ReporterRegistry {
            reporters: HashMap::new(),
        }
    }

    /// Register a reporter, replacing any with the same name
    pub fn register<R: Reporter + 'static>(&mut self, reporter: R) {
        self.reporters
            .insert(reporter.name().to_string(), Box::new(reporter));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Reporter, ReportError> {
        self.reporters
            .get(name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ReportError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.reporters.contains_key(name)
    }

    /// List all available reporter names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.reporters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Render `outcome` with the named reporter
    pub fn render(
        &self,
        format: &str,
        prefix: &str,
        outcome: Outcome<'_>,
    ) -> Result<String, ReportError> {
        Ok(self.get(format)?.render(prefix, outcome))
    }

    /// Create a registry with the built-in reporters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PlainReporter);
        registry.register(XmlReporter);
        registry
    }
}

impl Default for ReporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
