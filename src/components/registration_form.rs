use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_timer::Delay;
use gpui::{IntoElement, ParentElement, RenderOnce, SharedString, Styled, Window, px};

use super::alert::{Alert, AlertKind};
use super::button::Button;
use super::input::{PasswordInput, TextInput};
use super::stack::Stack;
use crate::contracts::{Disableable, FieldLike};
use crate::form::{
    FormController, FormModel, FormOptions, FormResult, FormSnapshot, RuleViolation,
    ValidationError, ValidationMode, ascii_letters, email, max_chars, min_chars, required,
};
use crate::id::ComponentId;
use crate::style::Variant;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 20;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 20;
pub const MAX_SUBMIT_ATTEMPTS: u32 = 3;

const SIMULATED_SUBMIT_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq, FormModel)]
pub struct RegistrationModel {
    pub name: SharedString,
    pub email: SharedString,
    pub password: SharedString,
}

impl Default for RegistrationModel {
    fn default() -> Self {
        Self {
            name: SharedString::default(),
            email: "user@example.com".into(),
            password: SharedString::default(),
        }
    }
}

pub type BoxedSubmitFuture =
    Pin<Box<dyn Future<Output = Result<(), RuleViolation>> + Send + 'static>>;

type SubmitHandlerFn = Arc<dyn Fn(RegistrationModel) -> BoxedSubmitFuture + Send + Sync>;

/// Builds the controller for the registration form with all constraints in
/// one place: the rule set is the single source of truth, the inputs only
/// mirror the max-length bound.
pub fn registration_controller() -> FormResult<FormController<RegistrationModel, RuleViolation>> {
    let controller = FormController::new(
        RegistrationModel::default(),
        FormOptions {
            validate_mode: ValidationMode::OnTouched,
            max_submit_attempts: Some(MAX_SUBMIT_ATTEMPTS),
            ..FormOptions::default()
        },
    );
    let fields = RegistrationModel::fields();

    controller.register_field_validator(fields.name(), required("Required"))?;
    controller.register_field_validator(fields.name(), min_chars(NAME_MIN_CHARS, "Too short"))?;
    controller.register_field_validator(fields.name(), max_chars(NAME_MAX_CHARS, "Too long"))?;
    controller.register_field_validator(fields.name(), ascii_letters("Letters only"))?;

    controller.register_field_validator(fields.email(), required("Required"))?;
    controller.register_field_validator(fields.email(), email("Is not an email"))?;

    controller.register_field_validator(fields.password(), required("Required"))?;
    controller
        .register_field_validator(fields.password(), min_chars(PASSWORD_MIN_CHARS, "Too short"))?;
    controller
        .register_field_validator(fields.password(), max_chars(PASSWORD_MAX_CHARS, "Too long"))?;

    controller.register_required_field(fields.name())?;
    controller.register_required_field(fields.email())?;
    controller.register_required_field(fields.password())?;
    controller.register_field_description(
        fields.password(),
        format!("{PASSWORD_MIN_CHARS} to {PASSWORD_MAX_CHARS} characters"),
    )?;

    Ok(controller)
}

/// Label text for a field, in priority order: the lockout notice, then the
/// in-flight notice, then the live value echoing what is typed, then the
/// field's placeholder.
fn field_label_text(
    locked: bool,
    submitting: bool,
    value: &SharedString,
    placeholder: &str,
) -> SharedString {
    if locked {
        "Too many tries".into()
    } else if submitting {
        "Loading...".into()
    } else if !value.is_empty() {
        value.clone()
    } else {
        placeholder.to_string().into()
    }
}

/// The registration form: three bound fields, a root status alert, and the
/// submit and manual-validate buttons, all rendered from one controller
/// snapshot.
#[derive(IntoElement)]
pub struct RegistrationForm {
    id: ComponentId,
    controller: FormController<RegistrationModel, RuleViolation>,
    submit_handler: SubmitHandlerFn,
    style: gpui::StyleRefinement,
}

impl RegistrationForm {
    #[track_caller]
    pub fn new(controller: FormController<RegistrationModel, RuleViolation>) -> Self {
        Self {
            id: ComponentId::auto("registration-form"),
            controller,
            submit_handler: Arc::new(|_model| -> BoxedSubmitFuture {
                Box::pin(async {
                    // Stands in for the real backend call.
                    Delay::new(SIMULATED_SUBMIT_DELAY).await;
                    Ok(())
                })
            }),
            style: gpui::StyleRefinement::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    /// Replaces the simulated submit delay with a caller-provided handler;
    /// tests use this to control timing and to exercise the failure path.
    pub fn on_submit(
        mut self,
        handler: impl Fn(RegistrationModel) -> BoxedSubmitFuture + Send + Sync + 'static,
    ) -> Self {
        self.submit_handler = Arc::new(handler);
        self
    }

    fn render_form(
        &self,
        snapshot: FormSnapshot<RegistrationModel, RuleViolation>,
    ) -> FormResult<Stack> {
        let fields = RegistrationModel::fields();
        let locked = snapshot.is_locked();
        let submitting = snapshot.is_submitting();

        let name_input = self.controller.bind_text_input(
            fields.name(),
            TextInput::new()
                .with_id("name")
                .placeholder("Name")
                .max_length(NAME_MAX_CHARS)
                .label(field_label_text(
                    locked,
                    submitting,
                    &snapshot.model.name,
                    "Name",
                )),
        )?;

        let email_input = self.controller.bind_text_input(
            fields.email(),
            TextInput::new()
                .with_id("email")
                .placeholder("Email")
                .label(field_label_text(
                    locked,
                    submitting,
                    &snapshot.model.email,
                    "Email",
                )),
        )?;

        let password_input = self.controller.bind_password_input(
            fields.password(),
            PasswordInput::new()
                .with_id("password")
                .placeholder("Password")
                .max_length(PASSWORD_MAX_CHARS)
                .label(field_label_text(
                    locked,
                    submitting,
                    &snapshot.model.password,
                    "Password",
                )),
        )?;

        let submit_button = {
            let controller = self.controller.clone();
            let handler = self.submit_handler.clone();
            Button::new("Submit")
                .with_id(self.id.slot("submit"))
                .loading(submitting)
                .disabled(locked || !snapshot.is_valid)
                .on_click(move |_, window, cx| {
                    let controller = controller.clone();
                    let handler = handler.clone();
                    let window_handle = window.window_handle();
                    cx.spawn(async move |cx| {
                        let _ = controller
                            .submit_async(move |model| handler(model.clone()))
                            .await;
                        let _ = window_handle.update(cx, |_, window, _| {
                            window.refresh();
                        });
                    })
                    .detach();
                    window.refresh();
                })
        };

        let validate_button = {
            let controller = self.controller.clone();
            Button::new("Validate")
                .with_id(self.id.slot("validate"))
                .variant(Variant::Outline)
                .disabled(locked || submitting)
                .on_click(move |_, window, _cx| {
                    let _ = controller.validate_field(fields.name());
                    let _ = controller.touch(fields.name());
                    window.refresh();
                })
        };

        let mut root = Stack::vertical()
            .with_id(self.id.clone())
            .gap(crate::style::Size::Lg)
            .w_full()
            .max_w(px(420.0));

        if let Some(root_error) = &snapshot.root_error {
            root = root.child(
                Alert::new("Submission failed")
                    .with_id(self.id.slot("root-error"))
                    .kind(AlertKind::Error)
                    .message(root_error.message()),
            );
        } else if snapshot.is_submit_successful {
            root = root.child(
                Alert::new("Submission Successful")
                    .with_id(self.id.slot("success"))
                    .kind(AlertKind::Success),
            );
        }

        Ok(root
            .child(name_input)
            .child(email_input)
            .child(password_input)
            .child(
                Stack::horizontal()
                    .with_id(self.id.slot("buttons"))
                    .gap(crate::style::Size::Md)
                    .child(submit_button)
                    .child(validate_button),
            ))
    }
}

impl gpui::Styled for RegistrationForm {
    fn style(&mut self) -> &mut gpui::StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for RegistrationForm {
    fn render(self, _window: &mut Window, _cx: &mut gpui::App) -> impl IntoElement {
        let rendered = self
            .controller
            .snapshot()
            .and_then(|snapshot| self.render_form(snapshot));
        match rendered {
            Ok(mut form) => {
                gpui::Refineable::refine(gpui::Styled::style(&mut form), &self.style);
                form.into_any_element()
            }
            Err(error) => Alert::new("Form unavailable")
                .with_id(self.id.slot("unavailable"))
                .kind(AlertKind::Error)
                .message(error.to_string())
                .into_any_element(),
        }
    }
}
