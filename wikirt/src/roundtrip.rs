//! Round-trip check of one page
//!
//! Pipeline, each stage consuming the previous stage's output:
//!
//! 1. fetch the page's wikitext
//! 2. parse it to annotated HTML
//! 3. serialize that HTML back in full mode and diff the result against the
//!    original wikitext; reparse the new text and classify each changed
//!    region
//! 4. append an edit marker comment to the HTML, serialize it selectively,
//!    strip the marker again and repeat the diff/classify step, tagging the
//!    results as selser
//!
//! Any service failure aborts the check: the caller gets a
//! [`RoundTripError`] and no partial results.

use crate::classify::{Classifier, DiffResult, Side};
use crate::diff::diff_offsets;
use crate::dom::markup::append_body_comment;
use crate::dom::AnnotatedDocument;
use crate::error::{RoundTripError, ServiceError, Stage};
use crate::service::{SerializeMode, SourceFetcher, WikitextService};
use std::collections::BTreeMap;
use std::time::{Duration, Instant, SystemTime};

/// Body of the comment injected before selective serialization. Selective
/// mode must re-serialize the changed tail while reusing everything else.
pub const EDIT_MARKER: &str = "rtSelserEditTestComment";

/// Wall-clock timings of a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    pub start: SystemTime,
    pub total: Duration,
    /// Accumulated time per stage, in pipeline order
    pub stages: Vec<(String, Duration)>,
}

/// Timings and payload sizes gathered during a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub time: Timing,
    /// Metric name to byte count
    pub size: BTreeMap<String, usize>,
}

impl Profile {
    pub fn new() -> Self {
        Profile {
            time: Timing {
                start: SystemTime::now(),
                total: Duration::ZERO,
                stages: Vec::new(),
            },
            size: BTreeMap::new(),
        }
    }

    pub fn add_time(&mut self, name: &str, elapsed: Duration) {
        match self.time.stages.iter_mut().find(|(stage, _)| stage == name) {
            Some((_, total)) => *total += elapsed,
            None => self.time.stages.push((name.to_string(), elapsed)),
        }
    }

    pub fn add_size(&mut self, name: &str, bytes: usize) {
        self.size.insert(name.to_string(), bytes);
    }

    /// `category:metric` pairs for reports: total and per-stage milliseconds,
    /// then sizes in bytes. The start timestamp is not reported.
    pub fn perf_stats(&self) -> Vec<(String, u64)> {
        let millis = |d: &Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);

        let mut stats = vec![("time:total".to_string(), millis(&self.time.total))];
        stats.extend(
            self.time
                .stages
                .iter()
                .map(|(name, elapsed)| (format!("time:{name}"), millis(elapsed))),
        );
        stats.extend(
            self.size
                .iter()
                .map(|(name, bytes)| (format!("size:{name}"), *bytes as u64)),
        );
        stats
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a completed check.
#[derive(Debug, Clone)]
pub struct RoundTripReport {
    pub title: String,
    /// Full-serialization results, then selser results
    pub results: Vec<DiffResult>,
    pub profile: Profile,
}

impl RoundTripReport {
    pub fn semantic_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_semantic()).count()
    }

    pub fn syntactic_count(&self) -> usize {
        self.results.len() - self.semantic_count()
    }
}

/// The page as fetched and parsed.
struct Original {
    wikitext: String,
    html: String,
    doc: AnnotatedDocument,
}

/// Runs round-trip checks against a fetcher and a parse/serialize service.
pub struct RoundTrip<'a> {
    fetcher: &'a dyn SourceFetcher,
    service: &'a dyn WikitextService,
    classifier: &'a Classifier,
}

impl<'a> RoundTrip<'a> {
    pub fn new(
        fetcher: &'a dyn SourceFetcher,
        service: &'a dyn WikitextService,
        classifier: &'a Classifier,
    ) -> Self {
        RoundTrip {
            fetcher,
            service,
            classifier,
        }
    }

    pub fn run(&self, title: &str) -> Result<RoundTripReport, RoundTripError> {
        let span = tracing::info_span!("roundtrip", %title);
        let _guard = span.enter();

        let started = Instant::now();
        let mut profile = Profile::new();

        let original = self.load(title, &mut profile)?;

        let full = self.stage(&mut profile, Stage::Serialize, title, || {
            self.service
                .serialize(title, &original.html, SerializeMode::Full)
        })?;
        let mut results =
            self.compare(title, &original, &full, Stage::ReparseSerialized, &mut profile)?;

        let marked = append_body_comment(&original.html, EDIT_MARKER)?;
        let selective = self.stage(&mut profile, Stage::SelectiveSerialize, title, || {
            self.service.serialize(
                title,
                &marked,
                SerializeMode::Selective {
                    original_wikitext: &original.wikitext,
                    original_html: &original.html,
                },
            )
        })?;
        let selective = strip_edit_marker(&selective);
        let selser_results = self.compare(
            title,
            &original,
            selective,
            Stage::ReparseSelective,
            &mut profile,
        )?;
        results.extend(selser_results.into_iter().map(|result| DiffResult {
            selser: true,
            ..result
        }));

        profile.time.total = started.elapsed();
        let report = RoundTripReport {
            title: title.to_string(),
            results,
            profile,
        };
        tracing::info!(
            semantic = report.semantic_count(),
            syntactic = report.syntactic_count(),
            total_ms = report.profile.time.total.as_millis() as u64,
            "round trip finished"
        );
        Ok(report)
    }

    fn load(&self, title: &str, profile: &mut Profile) -> Result<Original, RoundTripError> {
        let wikitext = self.stage(profile, Stage::Fetch, title, || {
            self.fetcher.fetch_wikitext(title)
        })?;
        profile.add_size("wikitext", wikitext.len());

        let html = self.stage(profile, Stage::Parse, title, || {
            self.service.parse(title, &wikitext)
        })?;
        profile.add_size("htmlraw", html.len());

        Ok(Original {
            doc: AnnotatedDocument::parse(&html),
            wikitext,
            html,
        })
    }

    /// Diff `new_wt` against the original and classify the changed regions.
    /// The new text is only reparsed when something changed.
    fn compare(
        &self,
        title: &str,
        original: &Original,
        new_wt: &str,
        reparse: Stage,
        profile: &mut Profile,
    ) -> Result<Vec<DiffResult>, RoundTripError> {
        let offsets = diff_offsets(&original.wikitext, new_wt);
        if offsets.is_empty() {
            return Ok(Vec::new());
        }

        let new_html = self.stage(profile, reparse, title, || {
            self.service.parse(title, new_wt)
        })?;
        let new_doc = AnnotatedDocument::parse(&new_html);

        let started = Instant::now();
        let results = self.classifier.classify(
            &offsets,
            Side::new(&original.doc, &original.wikitext),
            Side::new(&new_doc, new_wt),
        );
        profile.add_time("classify", started.elapsed());
        Ok(results)
    }

    fn stage<T>(
        &self,
        profile: &mut Profile,
        stage: Stage,
        title: &str,
        run: impl FnOnce() -> Result<T, ServiceError>,
    ) -> Result<T, RoundTripError> {
        let started = Instant::now();
        let outcome = run();
        let elapsed = started.elapsed();
        profile.add_time(stage.as_str(), elapsed);

        match outcome {
            Ok(value) => {
                tracing::debug!(%stage, duration_ms = elapsed.as_millis() as u64, "stage finished");
                Ok(value)
            }
            Err(source) => {
                tracing::error!(%stage, error = %source, "stage failed");
                Err(RoundTripError::Stage {
                    stage,
                    title: title.to_string(),
                    source,
                })
            }
        }
    }
}

/// Remove the edit marker, and the newlines after it, from the end of a
/// selectively serialized text.
fn strip_edit_marker(wikitext: &str) -> &str {
    let marker = format!("<!--{EDIT_MARKER}-->");
    match wikitext.rfind(&marker) {
        Some(at) if wikitext[at + marker.len()..].chars().all(|c| c == '\n') => &wikitext[..at],
        _ => wikitext,
    }
}
