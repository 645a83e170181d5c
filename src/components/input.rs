use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{LazyLock, Mutex};
use std::time::{Duration, Instant};

use gpui::{
    AnyElement, FocusHandle, FontWeight, InteractiveElement, IntoElement, KeyDownEvent,
    MouseButton, ParentElement, RenderOnce, SharedString, StatefulInteractiveElement, Styled,
    Window, div, px,
};

use super::actions::{
    DeleteBackward, DeleteForward, INPUT_KEY_CONTEXT, MoveEnd, MoveHome, MoveLeft, MoveRight,
    Submit, ensure_text_keybindings,
};
use super::control;
use super::input_state::EditState;
use super::stack::Stack;
use super::text::{Text, TextTone};
use crate::contracts::{Disableable, FieldLike};
use crate::id::ComponentId;
use crate::provider::EnrolProvider;
use crate::style::{FieldLayout, Size};

type ChangeHandler = Rc<dyn Fn(SharedString, &mut Window, &mut gpui::App)>;
type SubmitHandler = Rc<dyn Fn(SharedString, &mut Window, &mut gpui::App)>;
type BlurHandler = Rc<dyn Fn(&mut Window, &mut gpui::App)>;

#[derive(Clone, Copy)]
struct MaskRevealState {
    until: Instant,
    value_len: usize,
    last_char: Option<char>,
}

static MASK_REVEAL_STATE: LazyLock<Mutex<HashMap<String, MaskRevealState>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));
static INPUT_FOCUS_HANDLES: LazyLock<Mutex<HashMap<String, FocusHandle>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Single-line text field with a label block, caret editing, and optional
/// masking. Editing is caret-only; the caret is drawn between two text runs
/// so no text measurement is needed.
#[derive(IntoElement)]
pub struct TextInput {
    id: ComponentId,
    value: Option<SharedString>,
    value_controlled: bool,
    default_value: SharedString,
    placeholder: Option<SharedString>,
    label: Option<SharedString>,
    description: Option<SharedString>,
    error: Option<SharedString>,
    required: bool,
    layout: FieldLayout,
    disabled: bool,
    masked: bool,
    mask_reveal_ms: u64,
    max_length: Option<usize>,
    size: Size,
    on_change: Option<ChangeHandler>,
    on_blur: Option<BlurHandler>,
    on_submit: Option<SubmitHandler>,
    style: gpui::StyleRefinement,
}

impl TextInput {
    #[track_caller]
    pub fn new() -> Self {
        Self {
            id: ComponentId::auto("text-input"),
            value: None,
            value_controlled: false,
            default_value: SharedString::default(),
            placeholder: None,
            label: None,
            description: None,
            error: None,
            required: false,
            layout: FieldLayout::Vertical,
            disabled: false,
            masked: false,
            mask_reveal_ms: 0,
            max_length: None,
            size: Size::Md,
            on_change: None,
            on_blur: None,
            on_submit: None,
            style: gpui::StyleRefinement::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn value(mut self, value: impl Into<SharedString>) -> Self {
        self.value = Some(value.into());
        self.value_controlled = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<SharedString>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    pub fn mask_reveal_ms(mut self, duration_ms: u64) -> Self {
        self.mask_reveal_ms = duration_ms;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length.max(1));
        self
    }

    pub fn size(mut self, value: Size) -> Self {
        self.size = value;
        self
    }

    pub fn on_change(
        mut self,
        handler: impl Fn(SharedString, &mut Window, &mut gpui::App) + 'static,
    ) -> Self {
        self.on_change = Some(Rc::new(handler));
        self
    }

    pub fn on_blur(mut self, handler: impl Fn(&mut Window, &mut gpui::App) + 'static) -> Self {
        self.on_blur = Some(Rc::new(handler));
        self
    }

    pub fn on_submit(
        mut self,
        handler: impl Fn(SharedString, &mut Window, &mut gpui::App) + 'static,
    ) -> Self {
        self.on_submit = Some(Rc::new(handler));
        self
    }

    fn resolved_focus_handle(&self, cx: &gpui::App) -> FocusHandle {
        if let Ok(mut handles) = INPUT_FOCUS_HANDLES.lock() {
            return handles
                .entry(self.id.to_string())
                .or_insert_with(|| cx.focus_handle())
                .clone();
        }
        cx.focus_handle()
    }

    fn current_value(id: &str, rendered: &str, value_controlled: bool) -> String {
        control::text_state(
            id,
            "value",
            value_controlled.then_some(rendered.to_string()),
            rendered.to_string(),
        )
    }

    fn edit_state(id: &str, current_value: &str) -> EditState {
        let len = current_value.chars().count();
        let caret = control::text_state(id, "caret-index", None, len.to_string())
            .parse::<usize>()
            .ok()
            .unwrap_or(len)
            .min(len);
        EditState::new(current_value, caret)
    }

    fn display_chars(id: &str, value: &str, masked: bool) -> Vec<char> {
        if !masked {
            return value.chars().collect();
        }
        let mut chars = vec!['*'; value.chars().count()];
        if let Some(reveal) = Self::mask_reveal_char(id, chars.len())
            && let Some(last) = chars.last_mut()
        {
            *last = reveal;
        }
        chars
    }

    fn set_mask_reveal(id: &str, value: &str, duration_ms: u64) {
        if duration_ms == 0 {
            Self::clear_mask_reveal(id);
            return;
        }
        let state = MaskRevealState {
            until: Instant::now() + Duration::from_millis(duration_ms),
            value_len: value.chars().count(),
            last_char: value.chars().last(),
        };
        if let Ok(mut states) = MASK_REVEAL_STATE.lock() {
            states.insert(id.to_string(), state);
        }
    }

    fn clear_mask_reveal(id: &str) {
        if let Ok(mut states) = MASK_REVEAL_STATE.lock() {
            states.remove(id);
        }
    }

    fn mask_reveal_char(id: &str, current_len: usize) -> Option<char> {
        let now = Instant::now();
        let mut states = MASK_REVEAL_STATE.lock().ok()?;
        let state = states.get(id).copied();

        match state {
            Some(state) if now <= state.until && state.value_len == current_len => state.last_char,
            Some(_) => {
                states.remove(id);
                None
            }
            None => None,
        }
    }

    /// Applies an edit to the persisted editor state and notifies the change
    /// handler when the value changed.
    #[allow(clippy::too_many_arguments)]
    fn handle_edit(
        id: &str,
        rendered_value: &str,
        value_controlled: bool,
        masked: bool,
        mask_reveal_ms: u64,
        max_length: Option<usize>,
        on_change: Option<&ChangeHandler>,
        window: &mut Window,
        cx: &mut gpui::App,
        edit: impl FnOnce(&mut EditState),
    ) {
        let previous = Self::current_value(id, rendered_value, value_controlled);
        let mut state = Self::edit_state(id, &previous);
        edit(&mut state);
        state.clamp_to_max_length(max_length);
        let changed = state.value != previous;

        if changed && masked {
            if state.value.chars().count() > previous.chars().count() {
                Self::set_mask_reveal(id, &state.value, mask_reveal_ms);
                if mask_reveal_ms > 0 {
                    let window_handle = window.window_handle();
                    cx.spawn(async move |cx| {
                        cx.background_executor()
                            .timer(Duration::from_millis(mask_reveal_ms))
                            .await;
                        let _ = window_handle.update(cx, |_, window, _| {
                            window.refresh();
                        });
                    })
                    .detach();
                }
            } else {
                Self::clear_mask_reveal(id);
            }
        }

        if changed && !value_controlled {
            control::set_text_state(id, "value", state.value.clone());
        }
        control::set_text_state(id, "caret-index", state.caret.to_string());
        window.refresh();

        if changed && let Some(handler) = on_change {
            (handler)(state.value.clone().into(), window, cx);
        }
    }

    fn char_from_key(event: &KeyDownEvent) -> Option<char> {
        let key_char = event.keystroke.key_char.as_ref()?;
        let mut chars = key_char.chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        (!ch.is_control()).then_some(ch)
    }

    fn render_label_block(&self) -> AnyElement {
        if self.label.is_none() && self.description.is_none() && self.error.is_none() {
            return div().into_any_element();
        }

        let mut block = Stack::vertical()
            .with_id(self.id.slot("label-block"))
            .gap(Size::Sm);

        if let Some(label) = &self.label {
            let mut label_row = Stack::horizontal()
                .with_id(self.id.slot("label-row"))
                .gap(Size::Sm)
                .child(
                    Text::new(label.clone())
                        .with_id(self.id.slot("label"))
                        .weight(FontWeight::MEDIUM),
                );
            if self.required {
                label_row = label_row.child(
                    Text::new("*")
                        .with_id(self.id.slot("required-mark"))
                        .tone(TextTone::Error),
                );
            }
            block = block.child(label_row);
        }

        if let Some(description) = &self.description {
            block = block.child(
                Text::new(description.clone())
                    .with_id(self.id.slot("description"))
                    .size(Size::Sm)
                    .tone(TextTone::Muted),
            );
        }

        if let Some(error) = &self.error {
            block = block.child(
                Text::new(error.clone())
                    .with_id(self.id.slot("error"))
                    .size(Size::Sm)
                    .tone(TextTone::Error),
            );
        }

        block.into_any_element()
    }

    fn render_input_box(&mut self, window: &mut Window, cx: &mut gpui::App) -> AnyElement {
        ensure_text_keybindings(cx);
        let theme = EnrolProvider::theme(cx);

        let rendered_value: SharedString = Self::current_value(
            &self.id,
            self.value.clone().unwrap_or(self.default_value.clone()).as_ref(),
            self.value_controlled,
        )
        .into();
        let focus_handle = self.resolved_focus_handle(cx);
        let is_focused = focus_handle.is_focused(window) || control::focused_state(&self.id);

        let mut root = div()
            .id(self.id.slot("box"))
            .focusable()
            .key_context(INPUT_KEY_CONTEXT)
            .flex()
            .flex_row()
            .items_center()
            .w_full()
            .bg(theme.bg_field)
            .text_color(theme.text_primary)
            .border_1()
            .rounded(px(4.0));

        root = match self.size {
            Size::Sm => root.px_2().py_1().text_sm(),
            Size::Md => root.px_2p5().py_1p5().text_base(),
            Size::Lg => root.px_3().py_2().text_lg(),
        };

        let border = if self.error.is_some() {
            theme.status_error
        } else if is_focused {
            theme.border_focus
        } else {
            theme.border_subtle
        };
        root = root.border_color(border);

        if self.disabled {
            root = root.cursor_default().opacity(0.55);
        } else {
            root = root.cursor_text();
        }
        root = root.track_focus(&focus_handle);

        let id_for_blur = self.id.clone();
        let on_blur = self.on_blur.clone();
        root = root.on_mouse_down_out(move |_, window, cx| {
            if control::focused_state(&id_for_blur) {
                control::set_focused_state(&id_for_blur, false);
                if let Some(handler) = on_blur.as_ref() {
                    (handler)(window, cx);
                }
                window.refresh();
            }
        });

        if !self.disabled {
            let id_for_focus = self.id.clone();
            let focus_handle_for_click = focus_handle.clone();
            let value_for_click = rendered_value.clone();
            let value_controlled = self.value_controlled;
            root = root.on_mouse_down(MouseButton::Left, move |_, window, cx| {
                control::set_focused_state(&id_for_focus, true);
                window.focus(&focus_handle_for_click, cx);
                // Clicking places the caret at the end; there is no
                // per-character hit testing in this kit.
                let current =
                    Self::current_value(&id_for_focus, &value_for_click, value_controlled);
                control::set_text_state(
                    &id_for_focus,
                    "caret-index",
                    current.chars().count().to_string(),
                );
                window.refresh();
            });

            root = self.wire_editing(root, &rendered_value);
        }

        let display = Self::display_chars(&self.id, &rendered_value, self.masked);
        let caret = Self::edit_state(&self.id, &rendered_value).caret.min(display.len());
        let caret_height = px(self.size.caret_height_px());

        let mut content = div()
            .flex_1()
            .flex()
            .flex_row()
            .items_center()
            .overflow_hidden();

        if display.is_empty() {
            if is_focused && !self.disabled {
                content = content.child(
                    div()
                        .w(px(1.0))
                        .h(caret_height)
                        .bg(theme.text_primary)
                        .flex_none(),
                );
            }
            if let Some(placeholder) = &self.placeholder {
                content = content.child(
                    Text::new(placeholder.clone())
                        .with_id(self.id.slot("placeholder"))
                        .size(self.size)
                        .tone(TextTone::Placeholder),
                );
            }
        } else if is_focused && !self.disabled {
            let before: String = display[..caret].iter().collect();
            let after: String = display[caret..].iter().collect();
            if !before.is_empty() {
                content = content.child(div().child(SharedString::from(before)));
            }
            content = content.child(
                div()
                    .w(px(1.0))
                    .h(caret_height)
                    .bg(theme.text_primary)
                    .flex_none(),
            );
            if !after.is_empty() {
                content = content.child(div().child(SharedString::from(after)));
            }
        } else {
            let text: String = display.iter().collect();
            content = content.child(div().child(SharedString::from(text)));
        }

        root.child(content).into_any_element()
    }

    fn wire_editing(
        &self,
        root: gpui::Stateful<gpui::Div>,
        rendered_value: &SharedString,
    ) -> gpui::Stateful<gpui::Div> {
        let value_controlled = self.value_controlled;
        let masked = self.masked;
        let mask_reveal_ms = self.mask_reveal_ms;
        let max_length = self.max_length;

        macro_rules! edit_action {
            ($action:ty, $edit:expr) => {{
                let id = self.id.clone();
                let rendered = rendered_value.clone();
                let on_change = self.on_change.clone();
                move |_: &$action, window: &mut Window, cx: &mut gpui::App| {
                    Self::handle_edit(
                        &id,
                        &rendered,
                        value_controlled,
                        masked,
                        mask_reveal_ms,
                        max_length,
                        on_change.as_ref(),
                        window,
                        cx,
                        $edit,
                    );
                }
            }};
        }

        let root = root
            .on_action(edit_action!(MoveLeft, |state| state.move_left()))
            .on_action(edit_action!(MoveRight, |state| state.move_right()))
            .on_action(edit_action!(MoveHome, |state| state.move_home()))
            .on_action(edit_action!(MoveEnd, |state| state.move_end()))
            .on_action(edit_action!(DeleteBackward, |state| {
                state.delete_backward();
            }))
            .on_action(edit_action!(DeleteForward, |state| {
                state.delete_forward();
            }));

        let root = {
            let id = self.id.clone();
            let rendered = rendered_value.clone();
            let on_submit = self.on_submit.clone();
            root.on_action(move |_: &Submit, window: &mut Window, cx: &mut gpui::App| {
                if let Some(handler) = on_submit.as_ref() {
                    let current = Self::current_value(&id, &rendered, value_controlled);
                    (handler)(current.into(), window, cx);
                }
            })
        };

        let id = self.id.clone();
        let rendered = rendered_value.clone();
        let on_change = self.on_change.clone();
        root.on_key_down(move |event, window, cx| {
            let modifiers = &event.keystroke.modifiers;
            if modifiers.control || modifiers.platform || modifiers.function || modifiers.alt {
                return;
            }
            let Some(ch) = Self::char_from_key(event) else {
                return;
            };
            Self::handle_edit(
                &id,
                &rendered,
                value_controlled,
                masked,
                mask_reveal_ms,
                max_length,
                on_change.as_ref(),
                window,
                cx,
                |state| {
                    state.insert_text(&ch.to_string());
                },
            );
            cx.stop_propagation();
        })
    }
}

impl FieldLike for TextInput {
    fn label(mut self, value: impl Into<SharedString>) -> Self {
        self.label = Some(value.into());
        self
    }

    fn description(mut self, value: impl Into<SharedString>) -> Self {
        self.description = Some(value.into());
        self
    }

    fn error(mut self, value: impl Into<SharedString>) -> Self {
        self.error = Some(value.into());
        self
    }

    fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    fn layout(mut self, value: FieldLayout) -> Self {
        self.layout = value;
        self
    }
}

impl Disableable for TextInput {
    fn disabled(mut self, value: bool) -> Self {
        self.disabled = value;
        self
    }
}

impl gpui::Styled for TextInput {
    fn style(&mut self) -> &mut gpui::StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for TextInput {
    fn render(mut self, window: &mut gpui::Window, cx: &mut gpui::App) -> impl IntoElement {
        match self.layout {
            FieldLayout::Vertical => Stack::vertical()
                .with_id(self.id.clone())
                .gap(Size::Sm)
                .child(self.render_label_block())
                .child(self.render_input_box(window, cx)),
            FieldLayout::Horizontal => Stack::horizontal()
                .with_id(self.id.clone())
                .gap(Size::Lg)
                .child(div().w(px(168.0)).child(self.render_label_block()))
                .child(div().flex_1().child(self.render_input_box(window, cx))),
        }
    }
}

/// Masked [`TextInput`] that briefly reveals the last typed character.
#[derive(IntoElement)]
pub struct PasswordInput {
    inner: TextInput,
}

impl PasswordInput {
    #[track_caller]
    pub fn new() -> Self {
        Self {
            inner: TextInput::new().masked(true).mask_reveal_ms(700),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.inner = self.inner.with_id(id);
        self
    }

    pub fn value(mut self, value: impl Into<SharedString>) -> Self {
        self.inner = self.inner.value(value);
        self
    }

    pub fn default_value(mut self, value: impl Into<SharedString>) -> Self {
        self.inner = self.inner.default_value(value);
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        self.inner = self.inner.placeholder(placeholder);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.inner = self.inner.max_length(max_length);
        self
    }

    pub fn size(mut self, value: Size) -> Self {
        self.inner = self.inner.size(value);
        self
    }

    pub fn reveal_duration_ms(mut self, duration_ms: u64) -> Self {
        self.inner = self.inner.mask_reveal_ms(duration_ms);
        self
    }

    pub fn on_change(
        mut self,
        handler: impl Fn(SharedString, &mut Window, &mut gpui::App) + 'static,
    ) -> Self {
        self.inner = self.inner.on_change(handler);
        self
    }

    pub fn on_blur(mut self, handler: impl Fn(&mut Window, &mut gpui::App) + 'static) -> Self {
        self.inner = self.inner.on_blur(handler);
        self
    }

    pub fn on_submit(
        mut self,
        handler: impl Fn(SharedString, &mut Window, &mut gpui::App) + 'static,
    ) -> Self {
        self.inner = self.inner.on_submit(handler);
        self
    }
}

impl FieldLike for PasswordInput {
    fn label(mut self, value: impl Into<SharedString>) -> Self {
        self.inner = self.inner.label(value);
        self
    }

    fn description(mut self, value: impl Into<SharedString>) -> Self {
        self.inner = self.inner.description(value);
        self
    }

    fn error(mut self, value: impl Into<SharedString>) -> Self {
        self.inner = self.inner.error(value);
        self
    }

    fn required(mut self, value: bool) -> Self {
        self.inner = self.inner.required(value);
        self
    }

    fn layout(mut self, value: FieldLayout) -> Self {
        self.inner = self.inner.layout(value);
        self
    }
}

impl Disableable for PasswordInput {
    fn disabled(mut self, value: bool) -> Self {
        self.inner = self.inner.disabled(value);
        self
    }
}

impl RenderOnce for PasswordInput {
    fn render(self, window: &mut gpui::Window, cx: &mut gpui::App) -> impl IntoElement {
        self.inner.render(window, cx)
    }
}
