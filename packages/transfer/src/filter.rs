//! Selection criteria for targeted deletion.
//!
//! Mirrors the matching rules of the original purge tooling: an optional
//! folder scope (prefix match on the key), case-insensitive extension
//! suffixes, and filename patterns that match either as a substring or
//! as a shell-style wildcard (`*`, `?`).

use bucket_ops_client::RemoteObject;

use crate::TransferError;

/// A filename pattern, matched case-insensitively.
#[derive(Debug)]
struct PatternFilter {
    /// Lowercased raw text, for substring matching.
    raw: String,
    /// Compiled wildcard form of the same text.
    pattern: glob::Pattern,
}

/// What to delete: folder scope plus extension/pattern filters.
///
/// With a folder but no extensions or patterns, everything under the
/// folder matches.
#[derive(Debug, Default)]
pub struct MatchSpec {
    folder: Option<String>,
    extensions: Vec<String>,
    patterns: Vec<PatternFilter>,
}

impl MatchSpec {
    /// Builds a spec from raw CLI inputs. The folder is normalized to
    /// end with `/`; extensions and patterns are lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidPattern`] if a wildcard pattern
    /// fails to compile.
    pub fn new(
        folder: Option<&str>,
        extensions: &[String],
        patterns: &[String],
    ) -> Result<Self, TransferError> {
        let folder = folder.filter(|f| !f.is_empty()).map(|f| {
            if f.ends_with('/') {
                f.to_string()
            } else {
                format!("{f}/")
            }
        });

        let extensions = extensions.iter().map(|e| e.to_lowercase()).collect();

        let patterns = patterns
            .iter()
            .map(|raw| {
                let raw = raw.to_lowercase();
                glob::Pattern::new(&raw)
                    .map(|pattern| PatternFilter {
                        raw: raw.clone(),
                        pattern,
                    })
                    .map_err(|source| TransferError::InvalidPattern {
                        pattern: raw,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            folder,
            extensions,
            patterns,
        })
    }

    /// Whether no criterion was supplied at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.folder.is_none() && self.extensions.is_empty() && self.patterns.is_empty()
    }

    /// The folder scope, usable as a listing prefix.
    #[must_use]
    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    /// Tests one key against the criteria, returning a human-readable
    /// reason on a match.
    #[must_use]
    pub fn matches(&self, key: &str) -> Option<String> {
        if let Some(folder) = &self.folder {
            if !key.starts_with(folder.as_str()) {
                return None;
            }
            // Folder alone, with no further filters, matches everything
            // beneath it.
            if self.extensions.is_empty() && self.patterns.is_empty() {
                return Some("matches folder".to_string());
            }
        }

        let filename = key.rsplit('/').next().unwrap_or(key).to_lowercase();

        for ext in &self.extensions {
            if filename.ends_with(ext.as_str()) {
                return Some(format!("extension '{ext}'"));
            }
        }

        for filter in &self.patterns {
            if filename.contains(&filter.raw) || filter.pattern.matches(&filename) {
                return Some(format!("pattern '{}'", filter.raw));
            }
        }

        None
    }

    /// Selects matching objects, pairing each with its match reason.
    #[must_use]
    pub fn select<'a>(&self, objects: &'a [RemoteObject]) -> Vec<(&'a RemoteObject, String)> {
        objects
            .iter()
            .filter_map(|object| self.matches(&object.key).map(|reason| (object, reason)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        let spec = MatchSpec::new(None, &strings(&[".TMP"]), &[]).unwrap();
        assert!(spec.matches("logs/scratch.tmp").is_some());
        assert!(spec.matches("logs/keep.txt").is_none());
    }

    #[test]
    fn single_char_wildcard_matches_exactly_one_character() {
        let spec = MatchSpec::new(None, &[], &strings(&["log_?.txt"])).unwrap();
        assert!(spec.matches("log_1.txt").is_some());
        assert!(spec.matches("log_a.txt").is_some());
        assert!(spec.matches("log_10.txt").is_none());
        assert!(spec.matches("log.txt").is_none());
    }

    #[test]
    fn plain_pattern_matches_as_substring() {
        let spec = MatchSpec::new(None, &[], &strings(&["fail"])).unwrap();
        assert!(spec.matches("sys_fail_01").is_some());
        assert!(spec.matches("success").is_none());
    }

    #[test]
    fn folder_scopes_other_filters() {
        let spec = MatchSpec::new(Some("logs"), &strings(&[".tmp"]), &[]).unwrap();
        assert!(spec.matches("logs/scratch.tmp").is_some());
        // Right extension, wrong folder.
        assert!(spec.matches("data/scratch.tmp").is_none());
    }

    #[test]
    fn folder_alone_matches_everything_beneath_it() {
        let spec = MatchSpec::new(Some("markdown/legacy"), &[], &[]).unwrap();
        assert_eq!(
            spec.matches("markdown/legacy/old.md").as_deref(),
            Some("matches folder")
        );
        assert!(spec.matches("markdown/current.md").is_none());
        assert_eq!(spec.folder(), Some("markdown/legacy/"));
    }

    #[test]
    fn empty_spec_reports_empty() {
        let spec = MatchSpec::new(None, &[], &[]).unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn rejects_malformed_wildcard() {
        let err = MatchSpec::new(None, &[], &strings(&["[unclosed"])).unwrap_err();
        assert!(matches!(err, TransferError::InvalidPattern { .. }));
    }

    #[test]
    fn select_pairs_objects_with_reasons() {
        let objects = vec![
            RemoteObject {
                key: "a/error.log".to_string(),
                size: 1,
            },
            RemoteObject {
                key: "a/data.csv".to_string(),
                size: 2,
            },
        ];
        let spec = MatchSpec::new(None, &[], &strings(&["error*"])).unwrap();
        let selected = spec.select(&objects);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].0.key, "a/error.log");
    }
}
