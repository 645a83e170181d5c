use std::sync::Arc;

use crate::theme::Theme;

/// Application-wide services installed as a GPUI global.
///
/// Components resolve the theme through [`EnrolProvider::theme`]; when no
/// provider has been installed (unit tests, headless use) the default theme
/// is used.
#[derive(Clone, Default)]
pub struct EnrolProvider {
    theme: Arc<Theme>,
}

impl gpui::Global for EnrolProvider {}

impl EnrolProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_theme(mut self, configure: impl FnOnce(Arc<Theme>) -> Theme) -> Self {
        self.theme = configure(self.theme).into();
        self
    }

    pub fn install(self, cx: &mut gpui::App) {
        cx.set_global(self);
    }

    pub fn theme(cx: &gpui::App) -> Arc<Theme> {
        cx.try_global::<EnrolProvider>()
            .map(|provider| provider.theme.clone())
            .unwrap_or_default()
    }
}
