use gpui::SharedString;

use crate::style::FieldLayout;

/// Builder surface shared by form field components so the form binding
/// helpers can decorate any of them uniformly.
pub trait FieldLike: Sized {
    fn label(self, value: impl Into<SharedString>) -> Self;
    fn description(self, value: impl Into<SharedString>) -> Self;
    fn error(self, value: impl Into<SharedString>) -> Self;
    fn required(self, value: bool) -> Self;
    fn layout(self, value: FieldLayout) -> Self;
}

pub trait Disableable: Sized {
    fn disabled(self, value: bool) -> Self;
}
