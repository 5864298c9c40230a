//! Literal-to-placeholder substitution.
//!
//! All keyword literals are compiled into one alternation, longest literal
//! first, and replaced in a single left-to-right pass. Text produced by a
//! replacement is never scanned again, so a literal that also occurs inside
//! another literal or inside a placeholder cannot corrupt earlier output.

use crate::config::{Escape, Manifest};
use crate::error::{BuildError, BuildResult};
use indexmap::IndexMap;
use regex::Regex;
use std::borrow::Cow;

/// Replaces keyword literals with their placeholders.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    pattern: Option<Regex>,
    replacements: IndexMap<String, String>,
}

impl KeywordMatcher {
    /// Builds a matcher from `key -> literal` pairs.
    ///
    /// # Errors
    /// * `BuildError::PatternError` if a literal is empty or the alternation
    ///   cannot be compiled
    pub fn new(keyword_map: &IndexMap<String, String>) -> BuildResult<Self> {
        let mut replacements = IndexMap::new();
        for (key, literal) in keyword_map {
            if literal.is_empty() {
                return Err(BuildError::PatternError(format!(
                    "keyword '{}' maps to an empty literal",
                    key
                )));
            }
            replacements.insert(literal.clone(), Manifest::placeholder(key));
        }

        let mut literals: Vec<&String> = replacements.keys().collect();
        // Stable sort keeps manifest order among equal lengths.
        literals.sort_by(|a, b| b.len().cmp(&a.len()));

        let pattern = if literals.is_empty() {
            None
        } else {
            let alternation = literals
                .iter()
                .map(|literal| regex::escape(literal))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation).map_err(|e| {
                BuildError::PatternError(format!("cannot compile keyword pattern: {}", e))
            })?)
        };

        Ok(Self { pattern, replacements })
    }

    /// Returns true if `text` contains any keyword literal.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    /// Replaces every literal occurrence, returning the text and the hit count.
    pub fn replace<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let Some(pattern) = &self.pattern else {
            return (Cow::Borrowed(text), 0);
        };

        let mut hits = 0;
        let replaced = pattern.replace_all(text, |caps: &regex::Captures<'_>| {
            hits += 1;
            self.replacements[&caps[0]].clone()
        });
        (replaced, hits)
    }
}

/// Every content rewrite applied to a templatized file, in order:
/// escapes, then keywords, then uncomment-marker removal.
#[derive(Debug, Clone)]
pub struct Substitutor {
    escapes: Vec<Escape>,
    keywords: KeywordMatcher,
    markers: Vec<String>,
}

impl Substitutor {
    /// Builds the substitutor for a validated manifest.
    pub fn from_manifest(manifest: &Manifest) -> BuildResult<Self> {
        Ok(Self {
            escapes: manifest.escapes.clone(),
            keywords: KeywordMatcher::new(&manifest.keyword_map)?,
            markers: manifest.uncomment_markers.clone(),
        })
    }

    /// Returns the keyword matcher, also used for file names.
    pub fn keywords(&self) -> &KeywordMatcher {
        &self.keywords
    }

    /// Returns true if any rewrite would change `text`.
    pub fn needs_rewrite(&self, text: &str) -> bool {
        self.escapes.iter().any(|e| text.contains(&e.search))
            || self.keywords.is_match(text)
            || self.markers.iter().any(|m| text.contains(m.as_str()))
    }

    /// Applies all rewrites. Returns `None` if the text is unchanged.
    pub fn apply(&self, text: &str) -> Option<String> {
        let mut current = text.to_string();
        for escape in &self.escapes {
            if current.contains(&escape.search) {
                current = current.replace(&escape.search, &escape.replace);
            }
        }

        let (replaced, hits) = self.keywords.replace(&current);
        if hits > 0 {
            current = replaced.into_owned();
        }

        for marker in &self.markers {
            if current.contains(marker.as_str()) {
                current = current.replace(marker.as_str(), "");
            }
        }

        if current == text {
            None
        } else {
            Some(current)
        }
    }
}
