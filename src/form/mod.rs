mod binding;
mod controller;
mod rules;
mod validation;

#[cfg(test)]
mod tests;

pub use controller::{
    FieldKey, FieldMeta, FormController, FormError, FormOptions, FormResult, FormSnapshot,
    RevalidateMode, SubmitState, ValidationMode, ValidationTicket,
};
pub use enrol_form_derive::FormModel;
pub use rules::{RuleViolation, ascii_letters, email, max_chars, min_chars, required};
pub use validation::{
    AsyncFieldValidator, BoxedValidationFuture, FieldLens, FieldValidator, FormModel,
    FormValidator, ValidationError,
};
