use std::rc::Rc;

use gpui::{
    ClickEvent, FontWeight, Hsla, InteractiveElement, IntoElement, ParentElement, RenderOnce,
    SharedString, StatefulInteractiveElement, Styled, Window, div, px,
};

use crate::contracts::Disableable;
use crate::id::ComponentId;
use crate::provider::EnrolProvider;
use crate::style::Variant;
use crate::theme::Theme;

type PressHandler = Rc<dyn Fn(&ClickEvent, &mut Window, &mut gpui::App)>;

#[derive(IntoElement)]
pub struct Button {
    id: ComponentId,
    label: SharedString,
    variant: Variant,
    disabled: bool,
    loading: bool,
    on_click: Option<PressHandler>,
    style: gpui::StyleRefinement,
}

impl Button {
    #[track_caller]
    pub fn new(label: impl Into<SharedString>) -> Self {
        Self {
            id: ComponentId::auto("button"),
            label: label.into(),
            variant: Variant::Filled,
            disabled: false,
            loading: false,
            on_click: None,
            style: gpui::StyleRefinement::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn variant(mut self, value: Variant) -> Self {
        self.variant = value;
        self
    }

    /// A loading button keeps its label but refuses clicks, like a disabled
    /// one; the submit button uses this while a submission is in flight.
    pub fn loading(mut self, value: bool) -> Self {
        self.loading = value;
        self
    }

    pub fn on_click(
        mut self,
        handler: impl Fn(&ClickEvent, &mut Window, &mut gpui::App) + 'static,
    ) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    fn variant_colors(&self, theme: &Theme) -> (Hsla, Hsla, Hsla) {
        match self.variant {
            Variant::Filled => (theme.accent, theme.accent_fg, theme.accent),
            Variant::Outline => (gpui::transparent_black(), theme.accent, theme.accent),
            Variant::Subtle => (theme.bg_surface, theme.text_primary, theme.border_subtle),
        }
    }
}

impl Disableable for Button {
    fn disabled(mut self, value: bool) -> Self {
        self.disabled = value;
        self
    }
}

impl gpui::Styled for Button {
    fn style(&mut self) -> &mut gpui::StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for Button {
    fn render(self, _window: &mut gpui::Window, cx: &mut gpui::App) -> impl IntoElement {
        let theme = EnrolProvider::theme(cx);
        let (bg, fg, border) = self.variant_colors(&theme);
        let inert = self.disabled || self.loading;

        let mut root = div()
            .id(self.id)
            .flex()
            .flex_row()
            .items_center()
            .justify_center()
            .px_3()
            .py_1p5()
            .rounded(px(4.0))
            .border_1()
            .border_color(border)
            .bg(bg)
            .text_color(fg)
            .font_weight(FontWeight::MEDIUM);

        if inert {
            root = root.cursor_default().opacity(0.55);
        } else {
            root = root.cursor_pointer();
            let hover_bg = bg.blend(gpui::white().opacity(0.06));
            let active_bg = bg.blend(gpui::black().opacity(0.12));
            root = root
                .hover(move |style| style.bg(hover_bg))
                .active(move |style| style.bg(active_bg));
            if let Some(handler) = self.on_click.clone() {
                root = root.on_click(move |event, window, cx| (handler)(event, window, cx));
            }
        }

        gpui::Refineable::refine(gpui::Styled::style(&mut root), &self.style);
        root.child(self.label)
    }
}
