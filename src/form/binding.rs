use gpui::SharedString;

use super::controller::{FieldKey, FormController, FormResult, read_lock};
use super::validation::{FieldLens, ValidationError};
use crate::components::{PasswordInput, TextInput};
use crate::contracts::{Disableable, FieldLike};

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn field_error_for_display<L>(&self, lens: L) -> FormResult<Option<SharedString>>
    where
        L: FieldLens<T>,
    {
        self.display_error_message(lens.key())
    }

    /// Wires a text input to a string-valued field: current value, change
    /// and blur handlers, and the gated error/required/description
    /// presentation. The input is disabled while a submission is in flight
    /// or the form is locked.
    pub fn bind_text_input<L>(&self, lens: L, input: TextInput) -> FormResult<TextInput>
    where
        L: FieldLens<T, Value = SharedString>,
    {
        let key = lens.key();
        let snapshot = self.snapshot()?;
        let value = lens.get(&snapshot.model).clone();
        let change_controller = self.clone();
        let blur_controller = self.clone();
        let bound = input
            .value(value)
            .on_change(move |next, _, _| drop(change_controller.set(lens, next)))
            .on_blur(move |_, _| drop(blur_controller.touch(lens)))
            .disabled(snapshot.is_submitting() || snapshot.is_locked());
        self.apply_field_presentation(key, bound)
    }

    pub fn bind_password_input<L>(&self, lens: L, input: PasswordInput) -> FormResult<PasswordInput>
    where
        L: FieldLens<T, Value = SharedString>,
    {
        let key = lens.key();
        let snapshot = self.snapshot()?;
        let value = lens.get(&snapshot.model).clone();
        let change_controller = self.clone();
        let blur_controller = self.clone();
        let bound = input
            .value(value)
            .on_change(move |next, _, _| drop(change_controller.set(lens, next)))
            .on_blur(move |_, _| drop(blur_controller.touch(lens)))
            .disabled(snapshot.is_submitting() || snapshot.is_locked());
        self.apply_field_presentation(key, bound)
    }

    fn apply_field_presentation<C>(&self, key: FieldKey, mut component: C) -> FormResult<C>
    where
        C: FieldLike + Disableable,
    {
        if let Some(description) = read_lock(
            &self.field_descriptions,
            "reading field description for binding",
        )?
        .get(&key)
        .cloned()
        {
            component = component.description(description);
        }

        if read_lock(&self.required_fields, "reading required fields for binding")?.contains(&key) {
            component = component.required(true);
        }

        if let Some(error) = self.display_error_message(key)? {
            component = component.error(error);
        }

        Ok(component)
    }

    /// Error text is held back until the field has been touched or a submit
    /// attempt has happened, so pristine forms render clean.
    fn display_error_message(&self, key: FieldKey) -> FormResult<Option<SharedString>> {
        let state = read_lock(&self.state, "reading display error message")?;
        let Some(meta) = state.field_meta.get(&key) else {
            return Ok(None);
        };
        if !meta.touched && state.submit_count == 0 {
            return Ok(None);
        }
        Ok(meta.errors.first().map(ValidationError::message))
    }
}
