//! Flag-over-environment resolution helpers.
//!
//! Every setting can be passed as a flag; the environment variable is
//! the fallback so the tools stay scriptable without long invocations.

/// Reads an environment variable, treating empty values as unset.
pub fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Reads a boolean environment variable (`true`, case-insensitive).
pub fn bool_var(name: &str) -> bool {
    var(name).is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Resolves the target bucket: `--bucket` flag, then `R2_BUCKET`.
///
/// # Errors
///
/// Returns a descriptive error when neither is set.
pub fn require_bucket(flag: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    flag.or_else(|| var("R2_BUCKET"))
        .ok_or_else(|| "bucket not set (pass --bucket or set R2_BUCKET)".into())
}

/// Resolves the key prefix: `--prefix` flag, then `R2_PREFIX`, then
/// empty (whole bucket).
pub fn prefix_or_env(flag: Option<String>) -> String {
    flag.or_else(|| var("R2_PREFIX")).unwrap_or_default()
}

/// Splits a comma-separated list, trimming whitespace and dropping
/// empty entries.
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map_or_else(Vec::new, |raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
