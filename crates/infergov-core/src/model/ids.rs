use super::ArtifactKind;
use crate::errors::{GovError, GovErrorKind, Result};

const MAX_ID_LEN: usize = 200;

/// Ids double as file names, so only a portable subset is allowed
pub fn is_valid_artifact_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && !id.starts_with('.')
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// # Errors
///
/// `SchemaInvalid` when the id is empty, too long, starts with a dot or
/// contains characters outside `[A-Za-z0-9._-]`.
pub fn validate_artifact_id(id: &str) -> Result<()> {
    if is_valid_artifact_id(id) {
        Ok(())
    } else {
        Err(GovError::new(GovErrorKind::SchemaInvalid)
            .with_op("validate_artifact_id")
            .with_artifact_id(id.chars().take(64).collect::<String>())
            .with_message("artifact id must match [A-Za-z0-9._-]{1,200} without a leading dot"))
    }
}

/// Id of the record of `kind` that belongs to request `request_id`
pub fn derived_id(request_id: &str, kind: ArtifactKind) -> String {
    match kind {
        ArtifactKind::Request => request_id.to_string(),
        ArtifactKind::Response => format!("{}--response", request_id),
        ArtifactKind::Error => format!("{}--error", request_id),
        ArtifactKind::Receipt => format!("{}--receipt", request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_hygiene() {
        assert!(is_valid_artifact_id("snap-001"));
        assert!(is_valid_artifact_id("a.b_c-d"));
        assert!(!is_valid_artifact_id(""));
        assert!(!is_valid_artifact_id(".hidden"));
        assert!(!is_valid_artifact_id("../escape"));
        assert!(!is_valid_artifact_id("has space"));
        assert!(!is_valid_artifact_id(&"x".repeat(201)));
        assert!(validate_artifact_id("a/b").is_err());
    }

    #[test]
    fn test_derived_ids() {
        assert_eq!(derived_id("abc", ArtifactKind::Request), "abc");
        assert_eq!(derived_id("abc", ArtifactKind::Response), "abc--response");
        assert_eq!(derived_id("abc", ArtifactKind::Error), "abc--error");
        assert_eq!(derived_id("abc", ArtifactKind::Receipt), "abc--receipt");
        assert!(is_valid_artifact_id(&derived_id(&"f".repeat(64), ArtifactKind::Receipt)));
    }
}
