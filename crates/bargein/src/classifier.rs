//! **Utterance classification**: backchannel vs. override-command detection.
//!
//! Pure string processing over two immutable phrase sets: one for passive
//! acknowledgments ("yeah", "uh huh") and one for override commands ("stop",
//! "hang on"). Text is tokenized first and phrases matched as contiguous
//! token runs, never as raw substrings, so "cantaloupe" cannot match "cant".
//! Classification has no side effects and no hidden state; a classifier can
//! be shared across threads without synchronization.

use std::collections::HashSet;

use crate::error::{ArbiterError, ArbiterResult};
use tracing::warn;

/// Normalize a transcript snippet into matchable tokens.
///
/// Lowercases, drops apostrophes in place ("don't" becomes `dont`, not
/// `don t`), turns every other non-alphanumeric character into a separator,
/// and collapses whitespace runs. Empty or whitespace-only input yields an
/// empty token sequence.
pub fn normalize(text: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for lc in ch.to_lowercase() {
                cleaned.push(lc);
            }
        } else if ch == '\'' || ch == '\u{2019}' {
            // apostrophe vanishes without splitting the word
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().map(str::to_owned).collect()
}

/// Result of classifying one utterance. Computed fresh per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Every token is covered by backchannel phrases and no override is present.
    pub is_backchannel: bool,
    /// At least one override phrase occurs somewhere in the utterance.
    pub has_override: bool,
}

/// A set of normalized phrases, stored as token sequences.
///
/// Single-token ("stop") and multi-token ("hang on") entries are both
/// supported; `max_len` bounds the sliding-window lookup.
#[derive(Debug, Clone, Default)]
struct PhraseSet {
    phrases: HashSet<Vec<String>>,
    max_len: usize,
}

impl PhraseSet {
    fn new(entries: &[String]) -> Self {
        let mut phrases = HashSet::new();
        let mut max_len = 0;
        for entry in entries {
            let tokens = normalize(entry);
            if tokens.is_empty() {
                warn!("dropping phrase entry that normalizes to nothing: {:?}", entry);
                continue;
            }
            max_len = max_len.max(tokens.len());
            phrases.insert(tokens);
        }
        Self { phrases, max_len }
    }

    /// True iff `tokens` is non-empty and fully covered by concatenated
    /// phrase matches, with no leftover tokens.
    ///
    /// Forward reachability over token positions rather than greedy
    /// longest-match: greedy would miss covers where a shorter phrase must be
    /// taken first.
    fn covers(&self, tokens: &[String]) -> bool {
        if tokens.is_empty() || self.phrases.is_empty() {
            return false;
        }
        let n = tokens.len();
        let mut reachable = vec![false; n + 1];
        reachable[0] = true;
        for start in 0..n {
            if !reachable[start] {
                continue;
            }
            let longest = self.max_len.min(n - start);
            for len in 1..=longest {
                if !reachable[start + len] && self.phrases.contains(&tokens[start..start + len]) {
                    reachable[start + len] = true;
                }
            }
        }
        reachable[n]
    }

    /// True iff any contiguous token window matches an entry.
    fn matches_within(&self, tokens: &[String]) -> bool {
        let n = tokens.len();
        for start in 0..n {
            let longest = self.max_len.min(n - start);
            for len in 1..=longest {
                if self.phrases.contains(&tokens[start..start + len]) {
                    return true;
                }
            }
        }
        false
    }
}

/// Classifies utterances against immutable backchannel and override phrase sets.
///
/// Word lists are normalized once at construction with the same [`normalize`]
/// applied to utterances, so matching is case- and punctuation-insensitive.
/// Lists are replaced wholesale via configuration, never mutated.
#[derive(Debug, Clone)]
pub struct UtteranceClassifier {
    backchannel: PhraseSet,
    overrides: PhraseSet,
}

impl UtteranceClassifier {
    /// Build a classifier from the two phrase lists.
    ///
    /// A phrase appearing in both lists violates the configuration contract
    /// and is rejected here; were it to slip through, override would still
    /// win at decision time.
    pub fn new(
        backchannel_phrases: &[String],
        override_phrases: &[String],
    ) -> ArbiterResult<Self> {
        let backchannel = PhraseSet::new(backchannel_phrases);
        let overrides = PhraseSet::new(override_phrases);
        if let Some(dup) = backchannel.phrases.intersection(&overrides.phrases).next() {
            return Err(ArbiterError::Config(format!(
                "phrase \"{}\" appears in both the backchannel and override lists",
                dup.join(" ")
            )));
        }
        Ok(Self {
            backchannel,
            overrides,
        })
    }

    /// Classifier over the built-in word lists.
    pub fn with_defaults() -> Self {
        // The built-in lists are disjoint, so construction cannot fail.
        Self {
            backchannel: PhraseSet::new(&crate::config::default_backchannel_phrases()),
            overrides: PhraseSet::new(&crate::config::default_override_phrases()),
        }
    }

    /// True iff the utterance is a pure passive acknowledgment: every token
    /// is covered by backchannel phrases (multi-word phrases match as
    /// contiguous runs) and no override phrase is present. False for empty
    /// input.
    pub fn is_backchannel(&self, text: &str) -> bool {
        let tokens = normalize(text);
        self.tokens_are_backchannel(&tokens)
    }

    /// True iff any normalized token run matches an override phrase.
    /// Containment, not full coverage: "yeah but wait" contains "but".
    pub fn contains_override(&self, text: &str) -> bool {
        let tokens = normalize(text);
        self.tokens_contain_override(&tokens)
    }

    /// Classify one utterance. Both checks over a single tokenization.
    pub fn classify(&self, text: &str) -> Classification {
        let tokens = normalize(text);
        Classification {
            is_backchannel: self.tokens_are_backchannel(&tokens),
            has_override: self.tokens_contain_override(&tokens),
        }
    }

    pub(crate) fn tokens_are_backchannel(&self, tokens: &[String]) -> bool {
        self.backchannel.covers(tokens) && !self.overrides.matches_within(tokens)
    }

    pub(crate) fn tokens_contain_override(&self, tokens: &[String]) -> bool {
        self.overrides.matches_within(tokens)
    }
}

impl Default for UtteranceClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}
