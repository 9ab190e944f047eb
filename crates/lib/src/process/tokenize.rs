//! Splitting of free-form argument strings.
//!
//! Used only where a caller hands over a single string that stands for several
//! arguments (e.g. extra configure arguments). Commands this crate assembles
//! itself are built as argument vectors and never pass through here.
//!
//! Splitting follows POSIX shell word rules via `shlex`: quotes group words and
//! backslashes escape, but no expansion of any kind happens. A `#` at the start
//! of a word begins a comment.

use thiserror::Error;

/// The input had an unbalanced quote or ended with a lone backslash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unbalanced quotes or trailing backslash in: {input}")]
pub struct TokenizeError {
  pub input: String,
}

/// Split `input` into arguments. An empty or all-whitespace input yields an
/// empty vector.
pub fn split_args(input: &str) -> Result<Vec<String>, TokenizeError> {
  shlex::split(input).ok_or_else(|| TokenizeError {
    input: input.to_string(),
  })
}
