use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::Error;

/// Runs the derived rules and reports only the first failing field,
/// walking `field_order` rather than the unordered error map.
pub fn validate<T: Validate>(val: &T, field_order: &[&str]) -> Result<(), Error> {
    match val.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(Error::Validation(first_message(&errors, field_order))),
    }
}

pub fn first_message(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let fields = errors.field_errors();
    field_order
        .iter()
        .filter_map(|field| fields.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|msg| msg.to_string()))
        .unwrap_or_else(|| "Invalid request body".to_string())
}

pub fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}
