//! Confirmation gate for destructive operations.
//!
//! The gate is injected into command drivers instead of reading stdin
//! inline, so non-interactive runs (`--yes`, dry-run, tests) bypass the
//! prompt deterministically. Interactive confirmation requires typing an
//! exact case-sensitive token; anything else counts as a refusal.

use dialoguer::Input;

/// How a command driver obtains confirmation before mutating anything.
#[derive(Debug, Clone, Copy)]
pub enum Gate {
    /// Prompt the operator to type the required token.
    Prompt,
    /// Answer deterministically without prompting.
    Assume(bool),
}

impl Gate {
    /// Asks for confirmation, requiring the exact `token` to proceed.
    ///
    /// Returns `false` for any other input — the operation must then be
    /// abandoned with zero mutations performed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the interactive prompt fails (e.g., stdin
    /// is closed).
    pub fn confirm_token(self, token: &str) -> std::io::Result<bool> {
        match self {
            Self::Assume(answer) => Ok(answer),
            Self::Prompt => {
                let input: String = Input::new()
                    .with_prompt(format!("Type '{token}' to confirm"))
                    .allow_empty(true)
                    .interact_text()
                    .map_err(std::io::Error::other)?;
                Ok(token_matches(&input, token))
            }
        }
    }
}

/// Exact, case-sensitive token comparison.
///
/// Deliberately not a prefix or case-folded match: "DELETE extra" or
/// "delete" must not confirm a "DELETE" gate.
#[must_use]
pub fn token_matches(input: &str, token: &str) -> bool {
    input == token
}
