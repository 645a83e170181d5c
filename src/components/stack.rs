use gpui::{AnyElement, InteractiveElement, IntoElement, ParentElement, RenderOnce, Styled, div};

use crate::id::ComponentId;
use crate::style::Size;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StackDirection {
    Vertical,
    Horizontal,
}

/// Flex container for laying out form rows and columns.
#[derive(IntoElement)]
pub struct Stack {
    id: ComponentId,
    direction: StackDirection,
    gap: Size,
    align_center: bool,
    children: Vec<AnyElement>,
    style: gpui::StyleRefinement,
}

impl Stack {
    #[track_caller]
    pub fn vertical() -> Self {
        Self::with_direction(StackDirection::Vertical)
    }

    #[track_caller]
    pub fn horizontal() -> Self {
        Self::with_direction(StackDirection::Horizontal)
    }

    #[track_caller]
    fn with_direction(direction: StackDirection) -> Self {
        Self {
            id: ComponentId::auto("stack"),
            direction,
            gap: Size::Md,
            align_center: false,
            children: Vec::new(),
            style: gpui::StyleRefinement::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn gap(mut self, gap: Size) -> Self {
        self.gap = gap;
        self
    }

    pub fn align_center(mut self) -> Self {
        self.align_center = true;
        self
    }

    pub fn child(mut self, content: impl IntoElement + 'static) -> Self {
        self.children.push(content.into_any_element());
        self
    }

    pub fn children<I, E>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoElement + 'static,
    {
        self.children
            .extend(children.into_iter().map(IntoElement::into_any_element));
        self
    }
}

impl ParentElement for Stack {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements);
    }
}

impl gpui::Styled for Stack {
    fn style(&mut self) -> &mut gpui::StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for Stack {
    fn render(self, _window: &mut gpui::Window, _cx: &mut gpui::App) -> impl IntoElement {
        let mut root = div().id(self.id).flex();

        root = match self.direction {
            StackDirection::Vertical => root.flex_col(),
            StackDirection::Horizontal => root.flex_row(),
        };

        root = match self.gap {
            Size::Sm => root.gap_1(),
            Size::Md => root.gap_2(),
            Size::Lg => root.gap_3(),
        };

        if self.align_center {
            root = root.items_center();
        }

        gpui::Refineable::refine(gpui::Styled::style(&mut root), &self.style);
        root.children(self.children)
    }
}
