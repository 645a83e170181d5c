use gpui::SharedString;

use super::validation::ValidationError;

/// A declarative rule failure carrying its user-facing message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleViolation(SharedString);

impl RuleViolation {
    pub fn new(message: impl Into<SharedString>) -> Self {
        Self(message.into())
    }
}

impl ValidationError for RuleViolation {
    fn message(&self) -> SharedString {
        self.0.clone()
    }
}

/// The value must contain at least one non-whitespace character.
pub fn required<T>(
    message: impl Into<SharedString>,
) -> impl for<'a> Fn(&'a T, &'a SharedString) -> Result<(), RuleViolation> + Send + Sync {
    let message = message.into();
    move |_model, value| {
        if value.trim().is_empty() {
            Err(RuleViolation::new(message.clone()))
        } else {
            Ok(())
        }
    }
}

/// The value must be at least `min` characters long. Empty values pass so
/// the rule composes with [`required`] without doubling up messages.
pub fn min_chars<T>(
    min: usize,
    message: impl Into<SharedString>,
) -> impl for<'a> Fn(&'a T, &'a SharedString) -> Result<(), RuleViolation> + Send + Sync {
    let message = message.into();
    move |_model, value| {
        let len = value.chars().count();
        if len > 0 && len < min {
            Err(RuleViolation::new(message.clone()))
        } else {
            Ok(())
        }
    }
}

/// The value must be at most `max` characters long.
pub fn max_chars<T>(
    max: usize,
    message: impl Into<SharedString>,
) -> impl for<'a> Fn(&'a T, &'a SharedString) -> Result<(), RuleViolation> + Send + Sync {
    let message = message.into();
    move |_model, value| {
        if value.chars().count() > max {
            Err(RuleViolation::new(message.clone()))
        } else {
            Ok(())
        }
    }
}

/// Every character must be an ASCII letter.
pub fn ascii_letters<T>(
    message: impl Into<SharedString>,
) -> impl for<'a> Fn(&'a T, &'a SharedString) -> Result<(), RuleViolation> + Send + Sync {
    let message = message.into();
    move |_model, value| {
        if value.chars().all(|ch| ch.is_ascii_alphabetic()) {
            Ok(())
        } else {
            Err(RuleViolation::new(message.clone()))
        }
    }
}

/// The value must be a structurally plausible email address: one `@`, a
/// non-empty local part, a dotted domain with non-empty labels, and no
/// whitespace.
pub fn email<T>(
    message: impl Into<SharedString>,
) -> impl for<'a> Fn(&'a T, &'a SharedString) -> Result<(), RuleViolation> + Send + Sync {
    let message = message.into();
    move |_model, value| {
        if value.is_empty() || is_email(value) {
            Ok(())
        } else {
            Err(RuleViolation::new(message.clone()))
        }
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels = domain.split('.').collect::<Vec<_>>();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
