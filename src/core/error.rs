use thiserror::Error;

/// Errors that can occur while mapping between the canonical model and UBL.
///
/// Every failure aborts the whole conversion; no partial document or
/// invoice is ever returned alongside an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UblError {
    /// Unrecognised context alias or other caller configuration problem.
    #[error("configuration error: {0}")]
    Config(String),

    /// A mandatory classification field is missing from the input.
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// An amount or percentage string could not be parsed.
    #[error("invalid number '{input}': {message}")]
    Numeric { input: String, message: String },

    /// A date string could not be parsed.
    #[error("invalid date: {0}")]
    Date(String),

    /// The root element namespace is not a supported UBL document.
    #[error("unknown document type")]
    UnknownDocumentType,

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl UblError {
    /// Shorthand for a numeric parse failure.
    pub fn numeric(input: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Numeric {
            input: input.into(),
            message: message.to_string(),
        }
    }

    /// Shorthand for a required-field failure at `field`.
    pub fn required(field: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, "required"))
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "tax.ext.untdid-document-type").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let e = ValidationError::new("tax.ext.untdid-document-type", "required");
        assert_eq!(e.to_string(), "tax.ext.untdid-document-type: required");
        assert_eq!(e, ValidationError::new("tax.ext.untdid-document-type", "required"));
    }

    #[test]
    fn required_wraps_field_path() {
        let err = UblError::required("payment.instructions.ext.untdid-payment-means");
        assert_eq!(
            err.to_string(),
            "validation failed: payment.instructions.ext.untdid-payment-means: required"
        );
    }
}
