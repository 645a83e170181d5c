pub mod application;
pub mod components;
pub mod contracts;
pub mod form;
pub mod id;
pub mod provider;
pub mod style;
pub mod theme;

pub use application::EnrolApplication;
pub use provider::EnrolProvider;

pub mod prelude {
    pub use crate::EnrolProvider;
    pub use crate::components::{
        Alert, AlertKind, Button, PasswordInput, RegistrationForm, RegistrationModel, Stack, Text,
        TextInput, TextTone, registration_controller,
    };
    pub use crate::contracts::{Disableable, FieldLike};
    pub use crate::form::{
        FieldLens, FormController, FormModel, FormOptions, FormSnapshot, RuleViolation,
        SubmitState, ValidationError, ValidationMode,
    };
    pub use crate::style::{FieldLayout, Size, Variant};
}
