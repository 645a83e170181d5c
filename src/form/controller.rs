use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use gpui::SharedString;

use super::validation::ValidationError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ValidationTicket(pub u64);

/// Submission lifecycle. `Locked` is terminal until a full reset: it is
/// entered when an attempt finishes with the attempt budget spent, and while
/// in it the controller refuses edits and further submits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
    Locked,
}

/// When a field is first validated. `OnTouched` validates on the first blur
/// and on every change after that.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    OnChange,
    OnBlur,
    OnTouched,
    OnSubmit,
}

/// When fields that depend on a changed field are re-validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RevalidateMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    pub revalidate_mode: RevalidateMode,
    /// Submit attempts allowed before the form locks. `None` never locks.
    pub max_submit_attempts: Option<u32>,
    pub validate_first_error_only: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnSubmit,
            revalidate_mode: RevalidateMode::OnChange,
            max_submit_attempts: None,
            validate_first_error_only: false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMeta<E> {
    pub dirty: bool,
    pub touched: bool,
    pub validating: bool,
    pub errors: Vec<E>,
}

impl<E> Default for FieldMeta<E> {
    fn default() -> Self {
        Self {
            dirty: false,
            touched: false,
            validating: false,
            errors: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T, E> {
    pub model: T,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub is_submit_successful: bool,
    pub root_error: Option<E>,
    pub first_error: Option<FieldKey>,
    pub field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
}

impl<T, E> FormSnapshot<T, E> {
    pub fn is_locked(&self) -> bool {
        self.submit_state == SubmitState::Locked
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_state == SubmitState::Submitting
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    AlreadySubmitting,
    FormLocked,
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::InvalidStateTransition { from, to } => {
                write!(f, "invalid submit state transition: {from:?} -> {to:?}")
            }
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
            FormError::FormLocked => f.write_str("form is locked after too many submit attempts"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

pub(super) type SyncFieldValidatorFn<T, E> = Arc<dyn Fn(&T) -> Result<(), E> + Send + Sync>;
pub(super) type SyncFormValidatorFn<T, E> = Arc<dyn Fn(&T) -> Vec<(FieldKey, E)> + Send + Sync>;
pub(super) type AsyncFieldValidatorFn<T, E> =
    Arc<dyn Fn(T) -> Pin<Box<dyn Future<Output = Result<(), E>> + Send + 'static>> + Send + Sync>;

#[derive(Clone)]
pub(super) struct AsyncFieldValidatorEntry<T, E> {
    pub(super) debounce: Duration,
    pub(super) validator: AsyncFieldValidatorFn<T, E>,
}

pub(super) struct FormState<T, E> {
    pub(super) initial_model: T,
    pub(super) model: T,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) is_submit_successful: bool,
    pub(super) root_error: Option<E>,
    pub(super) dirty_fields: BTreeSet<FieldKey>,
    pub(super) field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
    pub(super) tickets: BTreeMap<FieldKey, ValidationTicket>,
    pub(super) first_error: Option<FieldKey>,
}

impl<T, E> FormState<T, E> {
    pub(super) fn ensure_meta(&mut self, key: FieldKey) -> &mut FieldMeta<E> {
        self.field_meta.entry(key).or_default()
    }
}

impl<T: Clone, E> FormState<T, E> {
    /// Values-only reset: defaults restored, errors and dirty/touched flags
    /// cleared. The submit counter, submit state, and success latch survive;
    /// only [`FormController::reset_to_initial`] clears those.
    fn reset_values(&mut self) {
        self.model = self.initial_model.clone();
        self.root_error = None;
        self.dirty_fields.clear();
        self.tickets.clear();
        self.first_error = None;
        for meta in self.field_meta.values_mut() {
            meta.dirty = false;
            meta.touched = false;
            meta.validating = false;
            meta.errors.clear();
        }
    }
}

#[derive(Clone)]
pub struct FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState<T, E>>>,
    pub(super) sync_field_validators:
        Arc<RwLock<BTreeMap<FieldKey, Vec<SyncFieldValidatorFn<T, E>>>>>,
    pub(super) async_field_validators:
        Arc<RwLock<BTreeMap<FieldKey, Vec<AsyncFieldValidatorEntry<T, E>>>>>,
    pub(super) form_validators: Arc<RwLock<Vec<SyncFormValidatorFn<T, E>>>>,
    pub(super) dependencies: Arc<RwLock<BTreeMap<FieldKey, BTreeSet<FieldKey>>>>,
    pub(super) required_fields: Arc<RwLock<BTreeSet<FieldKey>>>,
    pub(super) field_descriptions: Arc<RwLock<BTreeMap<FieldKey, SharedString>>>,
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn new(initial: T, options: FormOptions) -> Self {
        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                initial_model: initial.clone(),
                model: initial,
                submit_state: SubmitState::Idle,
                submit_count: 0,
                is_submit_successful: false,
                root_error: None,
                dirty_fields: BTreeSet::new(),
                field_meta: BTreeMap::new(),
                tickets: BTreeMap::new(),
                first_error: None,
            })),
            sync_field_validators: Arc::new(RwLock::new(BTreeMap::new())),
            async_field_validators: Arc::new(RwLock::new(BTreeMap::new())),
            form_validators: Arc::new(RwLock::new(Vec::new())),
            dependencies: Arc::new(RwLock::new(BTreeMap::new())),
            required_fields: Arc::new(RwLock::new(BTreeSet::new())),
            field_descriptions: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn register_required_field<L>(&self, lens: L) -> FormResult<()>
    where
        L: super::validation::FieldLens<T>,
    {
        let mut required = write_lock(&self.required_fields, "registering required field")?;
        required.insert(lens.key());
        Ok(())
    }

    pub fn register_field_description<L>(
        &self,
        lens: L,
        description: impl Into<SharedString>,
    ) -> FormResult<()>
    where
        L: super::validation::FieldLens<T>,
    {
        let mut descriptions =
            write_lock(&self.field_descriptions, "registering field description")?;
        descriptions.insert(lens.key(), description.into());
        Ok(())
    }

    /// Runs a submit attempt with a synchronous handler.
    ///
    /// Increments the attempt counter and clears the previous root error
    /// before validating. When validation rejects, the handler is not
    /// invoked. A handler `Err` becomes the root error; `Ok` latches success
    /// and restores default values. Either way the form locks once the
    /// attempt budget is spent.
    pub fn submit(&self, f: impl FnOnce(&T) -> Result<(), E> + 'static) -> FormResult<()> {
        self.begin_submit_attempt()?;

        let is_valid = self.validate_form()?;
        if !is_valid {
            return self.finish_rejected_attempt();
        }

        let model = self.begin_handler_phase()?;
        let submit_result = f(&model);
        self.finish_handled_attempt(submit_result)
    }

    /// Async flavor of [`FormController::submit`]; also awaits registered
    /// async field validators before invoking the handler.
    pub async fn submit_async<F, Fut>(&self, f: F) -> FormResult<()>
    where
        F: FnOnce(&T) -> Fut + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        self.begin_submit_attempt()?;

        let is_valid = self.validate_form_async().await?;
        if !is_valid {
            return self.finish_rejected_attempt();
        }

        let model = self.begin_handler_phase()?;
        let submit_result = f(&model).await;
        self.finish_handled_attempt(submit_result)
    }

    fn begin_submit_attempt(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "preparing submit")?;
        match state.submit_state {
            SubmitState::Locked => return Err(FormError::FormLocked),
            SubmitState::Submitting => return Err(FormError::AlreadySubmitting),
            _ => {}
        }
        transition_submit_state(&mut state, SubmitState::Validating)?;
        state.submit_count = state.submit_count.saturating_add(1);
        state.root_error = None;
        Ok(())
    }

    fn finish_rejected_attempt(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "handling submit validation failure")?;
        transition_submit_state(&mut state, SubmitState::Failed)?;
        self.lock_if_attempts_spent(&mut state)
    }

    fn begin_handler_phase(&self) -> FormResult<T> {
        let mut state = write_lock(&self.state, "moving submit state to submitting")?;
        transition_submit_state(&mut state, SubmitState::Submitting)?;
        Ok(state.model.clone())
    }

    fn finish_handled_attempt(&self, submit_result: Result<(), E>) -> FormResult<()> {
        let mut state = write_lock(&self.state, "completing submit")?;
        match submit_result {
            Ok(()) => {
                transition_submit_state(&mut state, SubmitState::Succeeded)?;
                state.is_submit_successful = true;
                state.reset_values();
            }
            Err(error) => {
                transition_submit_state(&mut state, SubmitState::Failed)?;
                state.root_error = Some(error);
            }
        }
        self.lock_if_attempts_spent(&mut state)
    }

    fn lock_if_attempts_spent(&self, state: &mut FormState<T, E>) -> FormResult<()> {
        let Some(max_attempts) = self.options.max_submit_attempts else {
            return Ok(());
        };
        if state.submit_count > max_attempts && state.submit_state != SubmitState::Locked {
            transition_submit_state(state, SubmitState::Locked)?;
        }
        Ok(())
    }

    /// Restores default values while keeping the attempt counter, submit
    /// state, and success latch. Used by the success path.
    pub fn reset_values(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form values")?;
        state.reset_values();
        Ok(())
    }

    /// Full reset: values, errors, attempt counter, success latch, and the
    /// lock. The only way out of [`SubmitState::Locked`].
    pub fn reset_to_initial(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.reset_values();
        state.submit_state = SubmitState::Idle;
        state.submit_count = 0;
        state.is_submit_successful = false;
        Ok(())
    }

    pub fn reset_field<L>(&self, lens: L) -> FormResult<()>
    where
        L: super::validation::FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.state, "resetting field")?;
        let initial_value = lens.get(&state.initial_model).clone();
        lens.set(&mut state.model, initial_value);
        state.dirty_fields.remove(&key);
        let meta = state.ensure_meta(key);
        meta.dirty = false;
        meta.touched = false;
        meta.validating = false;
        meta.errors.clear();
        state.first_error = first_error_key(&state.field_meta);
        Ok(())
    }

    pub fn clear_errors(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "clearing all field errors")?;
        for meta in state.field_meta.values_mut() {
            meta.errors.clear();
            meta.validating = false;
        }
        state.root_error = None;
        state.first_error = None;
        Ok(())
    }

    pub fn clear_field_errors<L>(&self, lens: L) -> FormResult<()>
    where
        L: super::validation::FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.state, "clearing field errors")?;
        if let Some(meta) = state.field_meta.get_mut(&key) {
            meta.errors.clear();
            meta.validating = false;
        }
        state.first_error = first_error_key(&state.field_meta);
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T, E>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        let is_valid = state.field_meta.values().all(|meta| meta.errors.is_empty());
        Ok(FormSnapshot {
            model: state.model.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: !state.dirty_fields.is_empty(),
            is_valid,
            is_submit_successful: state.is_submit_successful,
            root_error: state.root_error.clone(),
            first_error: state.first_error,
            field_meta: state.field_meta.clone(),
        })
    }

    pub fn is_locked(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading lock state")?.submit_state == SubmitState::Locked)
    }

    pub fn field_meta<L>(&self, lens: L) -> FormResult<Option<FieldMeta<E>>>
    where
        L: super::validation::FieldLens<T>,
    {
        Ok(read_lock(&self.state, "reading field meta")?
            .field_meta
            .get(&lens.key())
            .cloned())
    }

    pub fn field_description<L>(&self, lens: L) -> FormResult<Option<SharedString>>
    where
        L: super::validation::FieldLens<T>,
    {
        Ok(
            read_lock(&self.field_descriptions, "reading field description")?
                .get(&lens.key())
                .cloned(),
        )
    }

    pub fn is_required<L>(&self, lens: L) -> FormResult<bool>
    where
        L: super::validation::FieldLens<T>,
    {
        Ok(read_lock(&self.required_fields, "reading required fields")?.contains(&lens.key()))
    }
}

pub(super) fn transition_submit_state<T, E>(
    state: &mut FormState<T, E>,
    next: SubmitState,
) -> FormResult<()> {
    let current = state.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Submitting)
            | (SubmitState::Validating, SubmitState::Failed)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Failed)
            | (SubmitState::Succeeded, SubmitState::Validating)
            | (SubmitState::Failed, SubmitState::Validating)
            | (SubmitState::Succeeded, SubmitState::Locked)
            | (SubmitState::Failed, SubmitState::Locked)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.submit_state = next;
    Ok(())
}

pub(super) fn first_error_key<E>(
    field_meta: &BTreeMap<FieldKey, FieldMeta<E>>,
) -> Option<FieldKey> {
    field_meta
        .iter()
        .find_map(|(key, meta)| (!meta.errors.is_empty()).then_some(*key))
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
