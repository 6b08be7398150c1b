use crate::error::{BindError, BindResult};

/// Extracts the element id from an id-only selector such as `#theme-toggle`.
///
/// Surrounding whitespace is ignored. The remainder must be a `#` followed by
/// at least one character that is neither `#` nor whitespace.
pub fn parse_id_selector(selector: &str) -> BindResult<&str> {
    let invalid = || BindError::InvalidSelector {
        selector: selector.to_string(),
    };
    let id = selector.trim().strip_prefix('#').ok_or_else(invalid)?;
    if id.is_empty() || id.chars().any(|ch| ch == '#' || ch.is_whitespace()) {
        return Err(invalid());
    }
    Ok(id)
}
