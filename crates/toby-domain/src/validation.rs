//! Validation for user-entered collection and item fields

use crate::item::{ItemDraft, ItemPatch};

/// A field that failed validation
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn required(field: &str, label: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("{} is required", label),
        }
    }
}

/// Validate a collection name (after trimming)
pub fn validate_collection_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::required("name", "Collection name"));
    }
    Ok(())
}

/// Validate a new item and return all errors found
pub fn validate_draft(draft: &ItemDraft) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push(ValidationError::required("title", "Title"));
    }
    if draft.url.trim().is_empty() {
        errors.push(ValidationError::required("url", "URL"));
    }

    errors
}

/// Validate an item edit. Only fields present in the patch are checked.
pub fn validate_patch(patch: &ItemPatch) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if matches!(patch.title.as_deref(), Some(t) if t.trim().is_empty()) {
        errors.push(ValidationError::required("title", "Title"));
    }
    if matches!(patch.url.as_deref(), Some(u) if u.trim().is_empty()) {
        errors.push(ValidationError::required("url", "URL"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_collection_name() {
        assert!(validate_collection_name("Work").is_ok());
        let err = validate_collection_name("   ").unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_validate_empty_draft() {
        let errors = validate_draft(&ItemDraft::default());
        assert!(errors.iter().any(|e| e.field == "title"));
        assert!(errors.iter().any(|e| e.field == "url"));
    }

    #[test]
    fn test_validate_patch_only_checks_present_fields() {
        assert!(validate_patch(&ItemPatch::default()).is_empty());
        let errors = validate_patch(&ItemPatch {
            url: Some(" ".to_string()),
            ..Default::default()
        });
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "url: URL is required");
    }
}
