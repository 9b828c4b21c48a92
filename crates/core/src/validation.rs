//! Structured, per-field validation failures.
//!
//! Requests are validated before any handler runs; entities reuse the same
//! collector in their factory methods so both layers report failures in the
//! same shape.

use serde::Serialize;

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered collection of field failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Record a failure for `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.add(field, message);
        }
        self
    }

    pub fn require_non_blank(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "must not be empty")
    }

    pub fn require_max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        self.check(
            value.chars().count() <= max,
            field,
            format!("must be at most {max} characters"),
        )
    }

    pub fn require_nip(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(crate::nip::is_valid(value), field, "invalid NIP")
    }

    /// Finite and strictly greater than zero.
    pub fn require_positive(&mut self, field: &str, value: f64) -> &mut Self {
        self.check(value.is_finite() && value > 0.0, field, "must be greater than 0")
    }

    /// Merge failures reported by a nested value, prefixing their field names.
    pub fn extend_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for e in other.0 {
            self.add(&format!("{prefix}.{}", e.field), e.message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Trim an optional free-text field; blank becomes `None`.
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Request-level validation, run before a handler executes.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_in_order() {
        let mut errors = ValidationErrors::new();
        errors
            .require_non_blank("login", "  ")
            .require_non_blank("name", "Jan")
            .check(false, "page_size", "must be positive");

        assert_eq!(errors.errors().len(), 2);
        assert_eq!(errors.errors()[0].field, "login");
        assert!(errors.has_field("page_size"));
        assert_eq!(
            errors.to_string(),
            "login: must not be empty; page_size: must be positive"
        );
    }

    #[test]
    fn numeric_and_nip_checks() {
        let mut errors = ValidationErrors::new();
        errors
            .require_positive("area_m2", 0.0)
            .require_positive("weight_kg", f64::NAN)
            .require_positive("quantity_tons", 1.5)
            .require_nip("nip", "5260250275")
            .require_nip("seller_nip", "PL 526-025-02-74");
        assert!(errors.has_field("area_m2"));
        assert!(errors.has_field("weight_kg"));
        assert!(!errors.has_field("quantity_tons"));
        assert!(errors.has_field("nip"));
        assert!(!errors.has_field("seller_nip"));
    }

    #[test]
    fn trim_optional_drops_blank() {
        assert_eq!(trim_optional(Some("  ".into())), None);
        assert_eq!(trim_optional(Some(" Kielce ".into())), Some("Kielce".into()));
        assert_eq!(trim_optional(None), None);
    }

    #[test]
    fn prefixed_merge() {
        let mut outer = ValidationErrors::new();
        outer.extend_prefixed("paging", ValidationErrors::single("page_number", "must be at least 1"));
        assert!(outer.has_field("paging.page_number"));
        assert!(outer.into_result().is_err());
    }
}
