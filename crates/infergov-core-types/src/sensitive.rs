//! Redaction wrapper for prompt text and provider secrets
//!
//! Everything that crosses the provider boundary as raw text (system
//! prompt, user input, provider messages before scrubbing) is wrapped in
//! `Sensitive<T>` so a stray `{:?}` in a log line cannot leak it.

use std::fmt;

/// Wrapper that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use infergov_core_types::Sensitive;
///
/// let prompt = Sensitive::new("summarise the quarterly figures");
/// assert_eq!(format!("{:?}", prompt), "***REDACTED***");
/// assert_eq!(prompt.expose(), &"summarise the quarterly figures");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the wrapped value
    ///
    /// Only the provider invoker should need this.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
