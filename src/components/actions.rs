use std::sync::Once;

use gpui::{App, KeyBinding, actions};

pub const INPUT_KEY_CONTEXT: &str = "enrol_text_input";

actions!(
    enrol_text_input,
    [
        MoveLeft,
        MoveRight,
        MoveHome,
        MoveEnd,
        DeleteBackward,
        DeleteForward,
        Submit,
    ]
);

static BINDINGS_INIT: Once = Once::new();

pub fn ensure_text_keybindings(cx: &mut App) {
    BINDINGS_INIT.call_once(|| {
        cx.bind_keys(input_bindings());
    });
}

fn input_bindings() -> Vec<KeyBinding> {
    let context = INPUT_KEY_CONTEXT;
    vec![
        KeyBinding::new("left", MoveLeft, Some(context)),
        KeyBinding::new("right", MoveRight, Some(context)),
        KeyBinding::new("home", MoveHome, Some(context)),
        KeyBinding::new("end", MoveEnd, Some(context)),
        KeyBinding::new("backspace", DeleteBackward, Some(context)),
        KeyBinding::new("delete", DeleteForward, Some(context)),
        KeyBinding::new("enter", Submit, Some(context)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_context_constant_is_stable() {
        assert_eq!(INPUT_KEY_CONTEXT, "enrol_text_input");
    }

    #[test]
    fn input_bindings_cover_navigation_editing_and_submit() {
        assert_eq!(input_bindings().len(), 7);
    }
}
