use super::*;
use futures::executor::block_on;
use gpui::SharedString;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::components::TextInput;

#[derive(Clone, Debug, Eq, PartialEq)]
struct TestError(&'static str);

impl ValidationError for TestError {
    fn message(&self) -> SharedString {
        self.0.into()
    }
}

#[allow(dead_code)]
#[derive(Clone, FormModel)]
struct SignupDraft {
    email: SharedString,
    password: SharedString,
    confirm_password: SharedString,
}

fn base_draft() -> SignupDraft {
    SignupDraft {
        email: "user@example.com".into(),
        password: "pass".into(),
        confirm_password: "pass".into(),
    }
}

fn email_required_rule() -> impl for<'a> Fn(&'a SignupDraft, &'a SharedString) -> Result<(), TestError>
+ Send
+ Sync {
    |_model, value| {
        if value.is_empty() {
            Err(TestError("required"))
        } else {
            Ok(())
        }
    }
}

fn controller_with_email_rule(
    options: FormOptions,
) -> FormController<SignupDraft, TestError> {
    let controller = FormController::new(base_draft(), options);
    controller
        .register_field_validator(SignupDraft::fields().email(), email_required_rule())
        .expect("register validator");
    controller
}

struct TimedValidator {
    delay_ms: u64,
    fail: bool,
}

impl AsyncFieldValidator<SignupDraft, SignupDraftEmailLens, TestError> for TimedValidator {
    type Fut<'a> = BoxedValidationFuture<'a, TestError>;

    fn validate<'a>(&'a self, _model: &'a SignupDraft, _value: &'a SharedString) -> Self::Fut<'a> {
        Box::pin(async move {
            thread::sleep(Duration::from_millis(self.delay_ms));
            if self.fail {
                Err(TestError("async error"))
            } else {
                Ok(())
            }
        })
    }
}

struct ContainsValidator {
    needle: &'static str,
}

impl AsyncFieldValidator<SignupDraft, SignupDraftEmailLens, TestError> for ContainsValidator {
    type Fut<'a> = BoxedValidationFuture<'a, TestError>;

    fn validate<'a>(&'a self, _model: &'a SignupDraft, value: &'a SharedString) -> Self::Fut<'a> {
        let value = value.clone();
        let needle = self.needle;
        Box::pin(async move {
            if value.as_ref().contains(needle) {
                Err(TestError("email invalid"))
            } else {
                Ok(())
            }
        })
    }
}

struct RequiredValidator;

impl AsyncFieldValidator<SignupDraft, SignupDraftEmailLens, TestError> for RequiredValidator {
    type Fut<'a> = BoxedValidationFuture<'a, TestError>;

    fn validate<'a>(&'a self, _model: &'a SignupDraft, value: &'a SharedString) -> Self::Fut<'a> {
        let value = value.clone();
        Box::pin(async move {
            if value.is_empty() {
                Err(TestError("required"))
            } else {
                Ok(())
            }
        })
    }
}

#[test]
fn field_lens_updates_model_and_dirty_state() {
    let controller =
        FormController::<SignupDraft, TestError>::new(base_draft(), FormOptions::default());
    let fields = SignupDraft::fields();

    controller
        .set(fields.email(), "changed@example.com".into())
        .expect("set must succeed");
    let snapshot = controller.snapshot().expect("snapshot must succeed");
    assert!(snapshot.is_dirty);
    assert_eq!(snapshot.model.email, "changed@example.com");

    let email_meta = snapshot
        .field_meta
        .get(&fields.email().key())
        .expect("email meta should exist");
    assert!(email_meta.dirty);

    controller
        .set(fields.email(), "user@example.com".into())
        .expect("set back to initial");
    assert!(!controller.snapshot().expect("snapshot").is_dirty);
}

#[test]
fn validation_mode_controls_when_errors_appear() {
    let fields = SignupDraft::fields();
    let on_change = controller_with_email_rule(FormOptions {
        validate_mode: ValidationMode::OnChange,
        ..FormOptions::default()
    });
    on_change
        .set(fields.email(), "".into())
        .expect("set should trigger validation");
    assert_eq!(
        on_change
            .snapshot()
            .expect("snapshot")
            .field_meta
            .get(&fields.email().key())
            .expect("field meta")
            .errors
            .len(),
        1
    );

    let on_submit = controller_with_email_rule(FormOptions {
        validate_mode: ValidationMode::OnSubmit,
        ..FormOptions::default()
    });
    on_submit
        .set(fields.email(), "".into())
        .expect("set should not trigger validation immediately");
    assert!(
        on_submit
            .snapshot()
            .expect("snapshot")
            .field_meta
            .get(&fields.email().key())
            .is_some_and(|meta| meta.errors.is_empty())
    );
    assert!(!on_submit.validate_form().expect("validate form"));
}

#[test]
fn on_touched_validates_from_the_first_blur_onwards() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions {
        validate_mode: ValidationMode::OnTouched,
        ..FormOptions::default()
    });

    controller
        .set(fields.email(), "".into())
        .expect("set before touch");
    assert!(
        controller
            .snapshot()
            .expect("snapshot")
            .field_meta
            .get(&fields.email().key())
            .is_some_and(|meta| meta.errors.is_empty()),
        "untouched fields stay quiet in on-touched mode"
    );

    controller.touch(fields.email()).expect("touch field");
    assert_eq!(
        controller
            .field_meta(fields.email())
            .expect("meta")
            .expect("meta exists")
            .errors,
        vec![TestError("required")]
    );

    controller
        .set(fields.email(), "fixed@example.com".into())
        .expect("set after touch");
    assert!(
        controller
            .field_meta(fields.email())
            .expect("meta")
            .expect("meta exists")
            .errors
            .is_empty(),
        "touched fields re-validate on every change"
    );
}

#[test]
fn every_change_revalidates_after_a_submit_attempt() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions {
        validate_mode: ValidationMode::OnSubmit,
        ..FormOptions::default()
    });

    controller
        .set(fields.email(), "".into())
        .expect("set invalid email");
    controller
        .submit(|_model| Ok(()))
        .expect("submit returns Ok when validation rejects");
    assert_eq!(
        controller.snapshot().expect("snapshot").submit_state,
        SubmitState::Failed
    );

    controller
        .set(fields.email(), "fixed@example.com".into())
        .expect("set corrected email");
    assert!(
        controller
            .field_meta(fields.email())
            .expect("meta")
            .expect("meta exists")
            .errors
            .is_empty(),
        "changes after a submit attempt re-validate without an explicit trigger"
    );
}

#[test]
fn dependencies_revalidate_linked_fields() {
    let fields = SignupDraft::fields();
    let controller = FormController::<SignupDraft, TestError>::new(
        base_draft(),
        FormOptions {
            validate_mode: ValidationMode::OnChange,
            revalidate_mode: RevalidateMode::OnChange,
            ..FormOptions::default()
        },
    );
    controller
        .register_field_validator(
            fields.confirm_password(),
            |model: &SignupDraft, value: &SharedString| {
                if value != &model.password {
                    Err(TestError("password mismatch"))
                } else {
                    Ok(())
                }
            },
        )
        .expect("register validator");
    controller
        .register_dependency(fields.password(), fields.confirm_password())
        .expect("register dependency");

    controller
        .set(fields.password(), "new-pass".into())
        .expect("set source field");
    let confirm_errors = controller
        .snapshot()
        .expect("snapshot")
        .field_meta
        .get(&fields.confirm_password().key())
        .expect("confirm field meta")
        .errors
        .clone();
    assert_eq!(confirm_errors, vec![TestError("password mismatch")]);
}

#[test]
fn submit_invokes_handler_only_when_valid_and_counts_attempts() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions::default());
    let handler_calls = Arc::new(AtomicUsize::new(0));

    controller
        .set(fields.email(), "".into())
        .expect("set invalid email");
    {
        let handler_calls = handler_calls.clone();
        controller
            .submit(move |_model| {
                handler_calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .expect("submit should return Ok when validation fails");
    }
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
    assert_eq!(snapshot.submit_state, SubmitState::Failed);
    assert_eq!(snapshot.submit_count, 1);

    controller
        .set(fields.email(), "valid@example.com".into())
        .expect("set valid email");
    {
        let handler_calls = handler_calls.clone();
        controller
            .submit(move |_model| {
                handler_calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .expect("submit should succeed");
    }
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    assert_eq!(snapshot.submit_state, SubmitState::Succeeded);
    assert_eq!(snapshot.submit_count, 2);
}

#[test]
fn submit_success_restores_defaults_and_latches_success() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions::default());

    controller
        .set(fields.email(), "ann@example.com".into())
        .expect("set email");
    controller.submit(|_model| Ok(())).expect("submit");

    let snapshot = controller.snapshot().expect("snapshot");
    assert!(snapshot.is_submit_successful);
    assert_eq!(snapshot.model.email, "user@example.com");
    assert!(!snapshot.is_dirty);
    assert_eq!(snapshot.submit_count, 1, "success keeps the attempt count");
}

#[test]
fn submit_failure_sets_the_root_error_and_keeps_values() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions::default());

    controller
        .set(fields.email(), "ann@example.com".into())
        .expect("set email");
    controller
        .submit(|_model| Err(TestError("backend rejected")))
        .expect("submit with failing handler");

    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_state, SubmitState::Failed);
    assert_eq!(snapshot.root_error, Some(TestError("backend rejected")));
    assert!(!snapshot.is_submit_successful);
    assert_eq!(snapshot.model.email, "ann@example.com");

    controller
        .submit(|_model| Ok(()))
        .expect("second submit clears the previous root error");
    assert_eq!(controller.snapshot().expect("snapshot").root_error, None);
}

#[test]
fn nested_submit_is_refused_while_one_is_in_flight() {
    let controller = controller_with_email_rule(FormOptions::default());
    let inner = controller.clone();

    controller
        .submit(move |_model| {
            let result = inner.submit(|_model| Ok(()));
            assert_eq!(result, Err(FormError::AlreadySubmitting));
            Ok(())
        })
        .expect("outer submit");
}

#[test]
fn spending_the_attempt_budget_locks_the_form() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions {
        max_submit_attempts: Some(3),
        ..FormOptions::default()
    });
    let handler_calls = Arc::new(AtomicUsize::new(0));

    controller
        .set(fields.email(), "".into())
        .expect("set invalid email");

    for attempt in 1..=3u32 {
        controller
            .submit(|_model| Ok(()))
            .expect("attempt within budget");
        let snapshot = controller.snapshot().expect("snapshot");
        assert_eq!(snapshot.submit_count, attempt);
        assert_eq!(snapshot.submit_state, SubmitState::Failed);
    }

    // The fourth attempt still runs, then trips the lock.
    controller.submit(|_model| Ok(())).expect("fourth attempt");
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_count, 4);
    assert!(snapshot.is_locked());

    {
        let handler_calls = handler_calls.clone();
        let result = controller.submit(move |_model| {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(result, Err(FormError::FormLocked));
    }
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
    assert_eq!(controller.snapshot().expect("snapshot").submit_count, 4);

    assert_eq!(
        controller.set(fields.email(), "edit@example.com".into()),
        Err(FormError::FormLocked)
    );
    assert_eq!(controller.touch(fields.email()), Err(FormError::FormLocked));
}

#[test]
fn the_lock_engages_even_when_the_final_attempt_succeeds() {
    let controller = controller_with_email_rule(FormOptions {
        max_submit_attempts: Some(1),
        ..FormOptions::default()
    });

    controller.submit(|_model| Ok(())).expect("first attempt");
    assert!(!controller.is_locked().expect("lock state"));

    controller.submit(|_model| Ok(())).expect("second attempt");
    assert!(controller.is_locked().expect("lock state"));
}

#[test]
fn full_reset_unlocks_and_clears_submission_state() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions {
        max_submit_attempts: Some(3),
        ..FormOptions::default()
    });

    controller
        .set(fields.email(), "".into())
        .expect("set invalid email");
    for _ in 0..4 {
        controller.submit(|_model| Ok(())).expect("submit attempt");
    }
    assert!(controller.is_locked().expect("lock state"));

    controller.reset_to_initial().expect("reset form");
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_state, SubmitState::Idle);
    assert_eq!(snapshot.submit_count, 0);
    assert!(!snapshot.is_submit_successful);
    assert_eq!(snapshot.model.email, "user@example.com");

    controller
        .set(fields.email(), "back@example.com".into())
        .expect("edits work again after reset");
}

#[test]
fn values_only_reset_keeps_the_attempt_count() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions::default());

    controller
        .set(fields.email(), "".into())
        .expect("set invalid email");
    controller.submit(|_model| Ok(())).expect("submit attempt");
    controller.reset_values().expect("reset values");

    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.model.email, "user@example.com");
    assert!(!snapshot.is_dirty);
    assert_eq!(snapshot.submit_count, 1);
}

#[test]
fn manual_validation_trigger_is_idempotent() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions::default());

    controller
        .set(fields.email(), "".into())
        .expect("set invalid email");
    let first = controller
        .validate_field(fields.email())
        .expect("first trigger");
    let after_first = controller
        .field_meta(fields.email())
        .expect("meta")
        .expect("meta exists")
        .errors;
    let second = controller
        .validate_field(fields.email())
        .expect("second trigger");
    let after_second = controller
        .field_meta(fields.email())
        .expect("meta")
        .expect("meta exists")
        .errors;

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
    assert_eq!(after_first, vec![TestError("required")]);
    assert_eq!(
        controller.snapshot().expect("snapshot").first_error,
        Some(fields.email().key())
    );
}

#[test]
fn async_validation_ticket_keeps_latest_result() {
    let fields = SignupDraft::fields();
    let controller =
        FormController::<SignupDraft, TestError>::new(base_draft(), FormOptions::default());
    let slow_controller = controller.clone();
    let fast_controller = controller.clone();
    let lens = fields.email();

    let slow = thread::spawn(move || {
        let validator = TimedValidator {
            delay_ms: 70,
            fail: true,
        };
        block_on(slow_controller.validate_field_async(lens, &validator)).expect("slow async");
    });
    thread::sleep(Duration::from_millis(10));
    let fast = thread::spawn(move || {
        let validator = TimedValidator {
            delay_ms: 5,
            fail: false,
        };
        block_on(fast_controller.validate_field_async(lens, &validator)).expect("fast async");
    });

    slow.join().expect("slow thread joins");
    fast.join().expect("fast thread joins");

    let snapshot = controller.snapshot().expect("snapshot");
    let email_meta = snapshot
        .field_meta
        .get(&fields.email().key())
        .expect("email meta");
    assert!(email_meta.errors.is_empty());
}

#[test]
fn async_registered_validator_is_debounced_with_latest_ticket_wins() {
    let fields = SignupDraft::fields();
    let controller = FormController::<SignupDraft, TestError>::new(
        base_draft(),
        FormOptions {
            validate_mode: ValidationMode::OnChange,
            ..FormOptions::default()
        },
    );
    controller
        .register_async_field_validator_with_debounce(
            fields.email(),
            30,
            ContainsValidator { needle: "bad" },
        )
        .expect("register async validator");

    let first = {
        let controller = controller.clone();
        let lens = fields.email();
        thread::spawn(move || {
            block_on(controller.set_async(lens, "bad@example.com".into())).expect("first set");
        })
    };
    thread::sleep(Duration::from_millis(5));
    let second = {
        let controller = controller.clone();
        let lens = fields.email();
        thread::spawn(move || {
            block_on(controller.set_async(lens, "good@example.com".into())).expect("second set");
        })
    };

    first.join().expect("first thread joins");
    second.join().expect("second thread joins");

    let snapshot = controller.snapshot().expect("snapshot");
    let meta = snapshot
        .field_meta
        .get(&fields.email().key())
        .expect("email meta");
    assert!(meta.errors.is_empty());
    assert_eq!(snapshot.model.email, "good@example.com");
}

#[test]
fn validate_form_async_runs_registered_async_validators() {
    let fields = SignupDraft::fields();
    let controller =
        FormController::<SignupDraft, TestError>::new(base_draft(), FormOptions::default());
    controller
        .register_async_field_validator(fields.email(), RequiredValidator)
        .expect("register async validator");
    controller
        .set(fields.email(), "".into())
        .expect("set invalid value");

    let valid = block_on(controller.validate_form_async()).expect("validate async");
    assert!(!valid);
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(
        snapshot
            .field_meta
            .get(&fields.email().key())
            .expect("email meta")
            .errors,
        vec![TestError("required")]
    );
}

#[test]
fn reset_field_and_clear_errors_are_consistent() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions {
        validate_mode: ValidationMode::OnChange,
        ..FormOptions::default()
    });

    controller
        .set(fields.email(), "".into())
        .expect("set invalid value");
    controller
        .clear_field_errors(fields.email())
        .expect("clear field errors");
    assert!(
        controller
            .field_meta(fields.email())
            .expect("meta")
            .expect("meta exists")
            .errors
            .is_empty()
    );

    controller
        .set(fields.email(), "dirty@example.com".into())
        .expect("set dirty value");
    controller.reset_field(fields.email()).expect("reset field");
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.model.email, "user@example.com");
    assert!(
        snapshot
            .field_meta
            .get(&fields.email().key())
            .is_some_and(|meta| !meta.dirty)
    );
}

#[test]
fn error_visibility_requires_touch_or_submit() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions {
        validate_mode: ValidationMode::OnChange,
        ..FormOptions::default()
    });

    controller
        .set(fields.email(), "".into())
        .expect("set invalid");
    assert_eq!(
        controller
            .field_error_for_display(fields.email())
            .expect("display error"),
        None
    );

    controller.touch(fields.email()).expect("touch field");
    assert_eq!(
        controller
            .field_error_for_display(fields.email())
            .expect("display error"),
        Some(SharedString::from("required"))
    );
}

#[test]
fn submit_attempts_ungate_error_display_without_touch() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions::default());

    controller
        .set(fields.email(), "".into())
        .expect("set invalid");
    controller.submit(|_model| Ok(())).expect("submit attempt");
    assert_eq!(
        controller
            .field_error_for_display(fields.email())
            .expect("display error"),
        Some(SharedString::from("required"))
    );
}

#[test]
fn required_and_description_registry_roundtrip() {
    let fields = SignupDraft::fields();
    let controller =
        FormController::<SignupDraft, TestError>::new(base_draft(), FormOptions::default());

    controller
        .register_required_field(fields.email())
        .expect("register required");
    controller
        .register_field_description(fields.email(), "Enter a valid email")
        .expect("register description");

    assert!(controller.is_required(fields.email()).expect("is required"));
    assert_eq!(
        controller
            .field_description(fields.email())
            .expect("field description"),
        Some(SharedString::from("Enter a valid email"))
    );
}

#[test]
fn text_input_binding_compiles_against_a_lens() {
    let fields = SignupDraft::fields();
    let controller = controller_with_email_rule(FormOptions::default());
    let _ = controller
        .bind_text_input(fields.email(), TextInput::new())
        .expect("bind text input");
}

#[test]
fn derive_macro_generates_field_lenses() {
    let fields = SignupDraft::fields();
    assert_eq!(fields.email().key().as_str(), "email");
    assert_eq!(fields.confirm_password().key().as_str(), "confirm_password");
}
