//! Render-to-render state for uncontrolled components.
//!
//! Stateless `RenderOnce` components keep their focus and editing state here,
//! keyed by component id and slot, so a re-render can pick up where the last
//! frame left off.

use std::{
    collections::HashMap,
    sync::{LazyLock, Mutex},
};

static BOOL_STATE: LazyLock<Mutex<HashMap<String, bool>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static TEXT_STATE: LazyLock<Mutex<HashMap<String, String>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

pub const FOCUSED_SLOT: &str = "focused";

fn key(id: &str, slot: &str) -> String {
    format!("{id}::{slot}")
}

pub fn bool_state(id: &str, slot: &str, controlled: Option<bool>, default: bool) -> bool {
    if let Some(value) = controlled {
        return value;
    }

    let composed = key(id, slot);
    if let Ok(mut state) = BOOL_STATE.lock() {
        return *state.entry(composed).or_insert(default);
    }
    default
}

pub fn set_bool_state(id: &str, slot: &str, value: bool) {
    let composed = key(id, slot);
    if let Ok(mut state) = BOOL_STATE.lock() {
        state.insert(composed, value);
    }
}

pub fn focused_state(id: &str) -> bool {
    bool_state(id, FOCUSED_SLOT, None, false)
}

pub fn set_focused_state(id: &str, value: bool) {
    set_bool_state(id, FOCUSED_SLOT, value);
}

pub fn text_state(id: &str, slot: &str, controlled: Option<String>, default: String) -> String {
    if let Some(value) = controlled {
        return value;
    }

    let composed = key(id, slot);
    if let Ok(mut state) = TEXT_STATE.lock() {
        return state.entry(composed).or_insert(default).clone();
    }
    default
}

pub fn set_text_state(id: &str, slot: &str, value: String) {
    let composed = key(id, slot);
    if let Ok(mut state) = TEXT_STATE.lock() {
        state.insert(composed, value);
    }
}
