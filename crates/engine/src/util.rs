//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Maximum length of a movement concept, in characters.
pub const MAX_CONCEPT_LEN: usize = 500;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Trim a concept and check it is non-empty and within [`MAX_CONCEPT_LEN`].
pub(crate) fn normalize_concept(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidConcept(
            "concept must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_CONCEPT_LEN {
        return Err(EngineError::InvalidConcept(format!(
            "concept must be at most {MAX_CONCEPT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Check `page` / `page_size` and return the row offset of the page.
///
/// `None` means the page starts past any offset the store can address, so it
/// is necessarily empty.
pub(crate) fn page_offset(page: u64, page_size: u64) -> ResultEngine<Option<u64>> {
    if page == 0 {
        return Err(EngineError::InvalidPage("page must be >= 1".to_string()));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(EngineError::InvalidPage(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok((page - 1)
        .checked_mul(page_size)
        .filter(|offset| i64::try_from(*offset).is_ok()))
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}
