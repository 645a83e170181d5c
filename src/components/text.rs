use gpui::{Hsla, InteractiveElement, IntoElement, ParentElement, RenderOnce, SharedString, Styled, div};

use crate::id::ComponentId;
use crate::provider::EnrolProvider;
use crate::style::Size;
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextTone {
    Default,
    Secondary,
    Muted,
    Placeholder,
    Success,
    Error,
}

impl TextTone {
    fn resolve(self, theme: &Theme) -> Hsla {
        match self {
            TextTone::Default => theme.text_primary,
            TextTone::Secondary => theme.text_secondary,
            TextTone::Muted => theme.text_muted,
            TextTone::Placeholder => theme.text_placeholder,
            TextTone::Success => theme.status_success,
            TextTone::Error => theme.status_error,
        }
    }
}

#[derive(IntoElement)]
pub struct Text {
    id: ComponentId,
    content: SharedString,
    tone: TextTone,
    size: Size,
    weight: Option<gpui::FontWeight>,
    style: gpui::StyleRefinement,
}

impl Text {
    #[track_caller]
    pub fn new(content: impl Into<SharedString>) -> Self {
        Self {
            id: ComponentId::auto("text"),
            content: content.into(),
            tone: TextTone::Default,
            size: Size::Md,
            weight: None,
            style: gpui::StyleRefinement::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn tone(mut self, value: TextTone) -> Self {
        self.tone = value;
        self
    }

    pub fn size(mut self, value: Size) -> Self {
        self.size = value;
        self
    }

    pub fn weight(mut self, value: gpui::FontWeight) -> Self {
        self.weight = Some(value);
        self
    }
}

impl gpui::Styled for Text {
    fn style(&mut self) -> &mut gpui::StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for Text {
    fn render(self, _window: &mut gpui::Window, cx: &mut gpui::App) -> impl IntoElement {
        let theme = EnrolProvider::theme(cx);
        let mut node = div().id(self.id).text_color(self.tone.resolve(&theme));

        node = match self.size {
            Size::Sm => node.text_sm(),
            Size::Md => node.text_base(),
            Size::Lg => node.text_lg(),
        };

        if let Some(weight) = self.weight {
            node = node.font_weight(weight);
        }

        gpui::Refineable::refine(gpui::Styled::style(&mut node), &self.style);
        node.child(self.content)
    }
}
