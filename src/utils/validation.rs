use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

const DATA_URI_IMAGE_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = "base64,";

/// Checks the envelope of a signature data URI (`data:image/<type>;base64,<payload>`).
/// The payload itself is not decoded.
pub fn is_image_data_uri(value: &str) -> bool {
    value.starts_with(DATA_URI_IMAGE_PREFIX) && value.contains(BASE64_MARKER)
}

/// Validates a set of named signature fields, reporting every bad one.
pub fn validate_signatures(fields: &[(&'static str, &str)]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for &(field, value) in fields {
        let failure = if value.is_empty() {
            Some(("required", format!("{} is required", field)))
        } else if !is_image_data_uri(value) {
            Some((
                "data_uri",
                format!("{} must be a base64-encoded image data URI", field),
            ))
        } else {
            None
        };

        if let Some((code, message)) = failure {
            let mut err = ValidationError::new(code);
            err.message = Some(Cow::Owned(message));
            errors.add(field, err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
