//! Required-field bookkeeping shared by the document validators.

use crate::error::DomainError;

/// Collects missing required paths while a document is being assembled.
///
/// Messages follow the `<path>: Path `<field>` is required.` shape and are
/// joined in the order the fields were checked.
#[derive(Debug, Default)]
pub(crate) struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `field` (found at `path`) as missing when `value` is `None`.
    pub(crate) fn take<T>(&mut self, path: &str, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.missing.push(format!("{path}: Path `{field}` is required."));
        }
        value
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    /// Build the aggregated validation error, prefixed by e.g. `Course validation failed`.
    pub(crate) fn into_error(self, prefix: &str) -> DomainError {
        DomainError::validation(format!("{prefix}: {}", self.missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_missing_paths_in_order() {
        let mut req = RequiredFields::new();
        assert_eq!(req.take("a", "a", Some(1)), Some(1));
        assert_eq!(req.take::<i32>("b", "b", None), None);
        assert_eq!(req.take::<i32>("c.0.d", "d", None), None);
        assert!(!req.is_empty());

        let err = req.into_error("Thing validation failed");
        assert_eq!(
            err.to_string(),
            "Thing validation failed: b: Path `b` is required., c.0.d: Path `d` is required."
        );
    }
}
