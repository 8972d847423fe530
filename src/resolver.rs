//! Address resolution: picks the reference address that best matches a
//! free-text candidate.
//!
//! Each reference entry is first tried as a case-insensitive regular
//! expression searched anywhere in the candidate. The first such hit ends the
//! scan. Otherwise the entry is scored with [`similarity`] and accepted when
//! its token sort ratio reaches the threshold, but the scan keeps going, so
//! the last qualifying fuzzy entry wins unless a later entry hits exactly.
//!
//! A winning entry with an empty value counts as no match.
//!
//! The fuzzy branch never stops early. That asymmetry is kept on purpose so
//! results stay identical to earlier runs of this tool; switching it to
//! first-wins changes output whenever several entries qualify.

use log::{debug, trace};
use regex::{Regex, RegexBuilder};

use crate::{data::Cell, similarity};

/// Value written to the derived column when nothing qualifies.
pub const NO_MATCH: &str = "No match found";

pub const DEFAULT_THRESHOLD: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Minimum token sort ratio (0-100) for a fuzzy match.
    pub threshold: u8,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scores {
    pub ratio: u8,
    pub partial_ratio: u8,
    pub token_sort_ratio: u8,
}

impl Scores {
    /// Scores two strings that are already lowercased.
    pub fn compute(reference: &str, candidate: &str) -> Self {
        Self {
            ratio: similarity::ratio(reference, candidate),
            partial_ratio: similarity::partial_ratio(reference, candidate),
            token_sort_ratio: similarity::token_sort_ratio(reference, candidate),
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Pattern(Regex),
    // Entries that are not valid patterns fall back to plain containment.
    Literal(String),
}

impl Matcher {
    fn compile(value: &str) -> Self {
        match RegexBuilder::new(value).case_insensitive(true).build() {
            Ok(regex) => Matcher::Pattern(regex),
            Err(err) => {
                debug!("Reference '{value}' is not a valid pattern ({err}); matching literally");
                Matcher::Literal(value.to_lowercase())
            }
        }
    }

    fn is_match(&self, candidate: &str, candidate_lower: &str) -> bool {
        match self {
            Matcher::Pattern(regex) => regex.is_match(candidate),
            Matcher::Literal(needle) => candidate_lower.contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
struct ReferenceEntry {
    value: String,
    lower: String,
    matcher: Matcher,
}

/// Ordered reference addresses, compiled once and shared read-only by every
/// resolve call of a pass.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceSet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = values
            .into_iter()
            .map(|value| {
                let value: String = value.into();
                ReferenceEntry {
                    lower: value.to_lowercase(),
                    matcher: Matcher::compile(&value),
                    value,
                }
            })
            .collect();
        Self { entries }
    }

    /// Builds the set from a table column, skipping missing cells.
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        Self::new(
            cells
                .into_iter()
                .filter(|cell| !cell.is_empty())
                .map(|cell| cell.as_text().into_owned()),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Exact(String),
    Fuzzy { value: String, token_sort_ratio: u8 },
    NoMatch,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchOutcome::NoMatch)
    }

    /// The matched reference, or [`NO_MATCH`].
    pub fn value(&self) -> &str {
        match self {
            MatchOutcome::Exact(value) | MatchOutcome::Fuzzy { value, .. } => value,
            MatchOutcome::NoMatch => NO_MATCH,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            MatchOutcome::Exact(value) | MatchOutcome::Fuzzy { value, .. } => value,
            MatchOutcome::NoMatch => NO_MATCH.to_string(),
        }
    }
}

/// Receives a step-by-step account of a resolve call.
pub trait ResolveObserver {
    fn comparing(&mut self, _candidate: &str, _reference: &str) {}
    fn exact_match(&mut self, _candidate: &str, _reference: &str) {}
    fn scored(&mut self, _candidate: &str, _reference: &str, _scores: &Scores) {}
    fn fuzzy_match(&mut self, _candidate: &str, _reference: &str, _scores: &Scores) {}
    fn finished(&mut self, _candidate: &str, _outcome: &MatchOutcome) {}
}

pub struct NoopObserver;

impl ResolveObserver for NoopObserver {}

/// Writes every step through the `log` facade: comparisons and scores at
/// `trace`, accepted matches and the final outcome at `debug`.
pub struct LogObserver;

impl ResolveObserver for LogObserver {
    fn comparing(&mut self, candidate: &str, reference: &str) {
        trace!("Comparing row value '{candidate}' with detail value '{reference}'");
    }

    fn exact_match(&mut self, candidate: &str, reference: &str) {
        debug!("Exact match found for row value '{candidate}' with detail value '{reference}'");
    }

    fn scored(&mut self, _candidate: &str, _reference: &str, scores: &Scores) {
        trace!(
            "Fuzzy ratio {}, partial ratio {}, token sort ratio {}",
            scores.ratio, scores.partial_ratio, scores.token_sort_ratio
        );
    }

    fn fuzzy_match(&mut self, candidate: &str, reference: &str, scores: &Scores) {
        debug!(
            "Fuzzy match found for row value '{candidate}' with detail value '{reference}' (token sort ratio {})",
            scores.token_sort_ratio
        );
    }

    fn finished(&mut self, candidate: &str, outcome: &MatchOutcome) {
        match outcome {
            MatchOutcome::NoMatch => debug!("No match found for '{candidate}'"),
            matched => debug!("Match value for '{candidate}' is '{}'", matched.value()),
        }
    }
}

pub struct Resolver<'a> {
    references: &'a ReferenceSet,
    options: ResolverOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(references: &'a ReferenceSet, options: ResolverOptions) -> Self {
        Self {
            references,
            options,
        }
    }

    pub fn resolve(&self, candidate: &str) -> MatchOutcome {
        self.resolve_with(candidate, &mut NoopObserver)
    }

    pub fn resolve_with(
        &self,
        candidate: &str,
        observer: &mut dyn ResolveObserver,
    ) -> MatchOutcome {
        let candidate_lower = candidate.to_lowercase();
        let mut outcome = MatchOutcome::NoMatch;
        for entry in &self.references.entries {
            observer.comparing(candidate, &entry.value);
            if entry.matcher.is_match(candidate, &candidate_lower) {
                observer.exact_match(candidate, &entry.value);
                outcome = MatchOutcome::Exact(entry.value.clone());
                break;
            }
            let scores = Scores::compute(&entry.lower, &candidate_lower);
            observer.scored(candidate, &entry.value, &scores);
            if scores.token_sort_ratio >= self.options.threshold {
                observer.fuzzy_match(candidate, &entry.value, &scores);
                outcome = MatchOutcome::Fuzzy {
                    value: entry.value.clone(),
                    token_sort_ratio: scores.token_sort_ratio,
                };
            }
        }
        let outcome = match outcome {
            MatchOutcome::Exact(value) | MatchOutcome::Fuzzy { value, .. } if value.is_empty() => {
                MatchOutcome::NoMatch
            }
            other => other,
        };
        observer.finished(candidate, &outcome);
        outcome
    }
}

/// Resolves `candidate` against `references` with the default threshold and
/// returns the matched reference or [`NO_MATCH`].
pub fn resolve(candidate: &str, references: &ReferenceSet) -> String {
    Resolver::new(references, ResolverOptions::default())
        .resolve(candidate)
        .into_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ResolveObserver for Recorder {
        fn comparing(&mut self, _candidate: &str, reference: &str) {
            self.events.push(format!("compare {reference}"));
        }

        fn exact_match(&mut self, _candidate: &str, reference: &str) {
            self.events.push(format!("exact {reference}"));
        }

        fn fuzzy_match(&mut self, _candidate: &str, reference: &str, scores: &Scores) {
            self.events
                .push(format!("fuzzy {reference} {}", scores.token_sort_ratio));
        }

        fn finished(&mut self, _candidate: &str, outcome: &MatchOutcome) {
            self.events.push(format!("done {}", outcome.value()));
        }
    }

    #[test]
    fn exact_hit_stops_the_scan() {
        let refs = ReferenceSet::new(["oak ave", "Oak Avenue", "456 Oak Ave"]);
        let mut recorder = Recorder::default();
        let outcome = Resolver::new(&refs, ResolverOptions::default())
            .resolve_with("456 OAK AVE, Springfield", &mut recorder);
        assert_eq!(outcome, MatchOutcome::Exact("oak ave".to_string()));
        assert_eq!(
            recorder.events,
            vec!["compare oak ave", "exact oak ave", "done oak ave"]
        );
    }

    #[test]
    fn fuzzy_hits_keep_scanning_and_the_last_one_wins() {
        let refs = ReferenceSet::new(["12 Elm Road", "12 Elm Rd North"]);
        let mut recorder = Recorder::default();
        let outcome = Resolver::new(&refs, ResolverOptions::default())
            .resolve_with("12 elm rd", &mut recorder);
        assert_eq!(outcome.value(), "12 Elm Rd North");
        assert_eq!(
            recorder
                .events
                .iter()
                .filter(|e| e.starts_with("fuzzy"))
                .count(),
            2
        );
    }

    #[test]
    fn threshold_is_configurable() {
        let refs = ReferenceSet::new(["123 Main Street"]);
        let strict = Resolver::new(&refs, ResolverOptions { threshold: 101 });
        assert_eq!(strict.resolve("123 Main St"), MatchOutcome::NoMatch);
        let lenient = Resolver::new(&refs, ResolverOptions { threshold: 0 });
        assert!(lenient.resolve("zzz").is_match());
    }

    #[test]
    fn invalid_patterns_match_literally() {
        let refs = ReferenceSet::new(["Unit (4"]);
        assert_eq!(resolve("Tower 2 unit (4", &refs), "Unit (4");
    }

    #[test]
    fn missing_cells_are_left_out_of_the_reference_set() {
        let cells = vec![Cell::from("1 Bay St"), Cell::Empty, Cell::Integer(42)];
        let refs = ReferenceSet::from_cells(&cells);
        assert_eq!(refs.values().collect::<Vec<_>>(), vec!["1 Bay St", "42"]);
    }

    #[test]
    fn no_match_outcome_uses_sentinel() {
        assert_eq!(MatchOutcome::NoMatch.value(), NO_MATCH);
        assert_eq!(MatchOutcome::NoMatch.into_value(), "No match found");
        assert!(!MatchOutcome::NoMatch.is_match());
    }
}
