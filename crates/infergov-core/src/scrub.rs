//! Message scrubbing for error artifacts
//!
//! Provider error text can echo API keys, bearer tokens or the prompt
//! itself. Only the scrubbed form is ever persisted.

pub const MAX_MESSAGE_CHARS: usize = 240;

const REDACTED: &str = "[redacted]";
const KEY_LIKE_MIN_CHARS: usize = 32;
const SECRET_PREFIXES: [&str; 4] = ["sk-", "sk_", "api_key=", "apikey="];

/// Strip secrets and prompt echoes from `raw`
///
/// - every occurrence of a non-blank `redact` phrase is replaced, however short
/// - tokens that look like credentials are replaced
/// - whitespace is collapsed and the result truncated
///
/// ```
/// use infergov_core::scrub::scrub_message;
///
/// let msg = scrub_message("auth failed for key sk-live-abc123", &[]);
/// assert_eq!(msg, "auth failed for key [redacted]");
/// ```
pub fn scrub_message(raw: &str, redact: &[&str]) -> String {
    let mut text = raw.to_string();
    for phrase in redact {
        let phrase = phrase.trim();
        if !phrase.is_empty() {
            text = text.replace(phrase, REDACTED);
        }
    }

    let mut out: Vec<&str> = Vec::new();
    let mut redact_next = false;
    for token in text.split_whitespace() {
        if redact_next {
            out.push(REDACTED);
            redact_next = false;
            continue;
        }
        if token.eq_ignore_ascii_case("bearer") {
            out.push(token);
            redact_next = true;
        } else if looks_like_secret(token) {
            out.push(REDACTED);
        } else {
            out.push(token);
        }
    }

    let collapsed = out.join(" ");
    let truncated: String = collapsed.chars().take(MAX_MESSAGE_CHARS).collect();
    if truncated.is_empty() {
        "no detail".to_string()
    } else {
        truncated
    }
}

fn looks_like_secret(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    if SECRET_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    let core = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
    core.len() >= KEY_LIKE_MIN_CHARS
        && core
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'))
        && core.bytes().any(|b| b.is_ascii_digit())
        && core.bytes().any(|b| b.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_removed() {
        let msg = scrub_message("401: Bearer abc.def.ghi rejected", &[]);
        assert_eq!(msg, "401: Bearer [redacted] rejected");
    }

    #[test]
    fn test_prompt_echo_removed() {
        let prompt = "tell me the launch codes";
        let msg = scrub_message(&format!("bad input: {}", prompt), &[prompt]);
        assert!(!msg.contains("launch codes"));
        assert!(msg.contains("[redacted]"));
    }

    #[test]
    fn test_short_prompt_echo_removed() {
        let msg = scrub_message("cannot process input: pw=4711", &["pw=4711"]);
        assert_eq!(msg, "cannot process input: [redacted]");
    }

    #[test]
    fn test_blank_phrases_ignored() {
        assert_eq!(scrub_message("rate limit hit", &["", "   "]), "rate limit hit");
    }

    #[test]
    fn test_long_key_like_token_removed() {
        let msg = scrub_message("key a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7 invalid", &[]);
        assert_eq!(msg, "key [redacted] invalid");
    }

    #[test]
    fn test_truncated_and_never_empty() {
        assert_eq!(scrub_message("  \n ", &[]), "no detail");
        let long = "word ".repeat(200);
        assert_eq!(scrub_message(&long, &[]).chars().count(), MAX_MESSAGE_CHARS);
    }
}
