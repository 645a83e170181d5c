use gpui::{
    FontWeight, Hsla, InteractiveElement, IntoElement, ParentElement, RenderOnce, SharedString,
    Styled, div, px,
};

use crate::id::ComponentId;
use crate::provider::EnrolProvider;
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlertKind {
    Info,
    Success,
    Warning,
    Error,
}

impl AlertKind {
    fn colors(self, theme: &Theme) -> (Hsla, Hsla) {
        match self {
            AlertKind::Info => (theme.status_info_bg, theme.status_info),
            AlertKind::Success => (theme.status_success_bg, theme.status_success),
            AlertKind::Warning => (theme.status_warning_bg, theme.status_warning),
            AlertKind::Error => (theme.status_error_bg, theme.status_error),
        }
    }
}

/// Inline status box for form-level messages.
#[derive(IntoElement)]
pub struct Alert {
    id: ComponentId,
    title: SharedString,
    message: Option<SharedString>,
    kind: AlertKind,
    style: gpui::StyleRefinement,
}

impl Alert {
    #[track_caller]
    pub fn new(title: impl Into<SharedString>) -> Self {
        Self {
            id: ComponentId::auto("alert"),
            title: title.into(),
            message: None,
            kind: AlertKind::Info,
            style: gpui::StyleRefinement::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn message(mut self, value: impl Into<SharedString>) -> Self {
        self.message = Some(value.into());
        self
    }

    pub fn kind(mut self, value: AlertKind) -> Self {
        self.kind = value;
        self
    }
}

impl gpui::Styled for Alert {
    fn style(&mut self) -> &mut gpui::StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for Alert {
    fn render(self, _window: &mut gpui::Window, cx: &mut gpui::App) -> impl IntoElement {
        let theme = EnrolProvider::theme(cx);
        let (bg, fg) = self.kind.colors(&theme);

        let mut root = div()
            .id(self.id)
            .w_full()
            .p_3()
            .rounded(px(6.0))
            .border_1()
            .border_color(bg.blend(gpui::black().opacity(0.12)))
            .bg(bg)
            .text_color(fg)
            .flex()
            .flex_col()
            .gap_1()
            .child(
                div()
                    .w_full()
                    .font_weight(FontWeight::SEMIBOLD)
                    .child(self.title),
            );

        if let Some(message) = self.message {
            root = root.child(div().w_full().text_sm().child(message));
        }

        gpui::Refineable::refine(gpui::Styled::style(&mut root), &self.style);
        root
    }
}
