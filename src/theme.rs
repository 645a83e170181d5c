use gpui::{Hsla, hsla};

/// Semantic color tokens resolved by every component at render time.
#[derive(Clone, Debug)]
pub struct Theme {
    pub bg_app: Hsla,
    pub bg_surface: Hsla,
    pub bg_field: Hsla,
    pub text_primary: Hsla,
    pub text_secondary: Hsla,
    pub text_muted: Hsla,
    pub text_placeholder: Hsla,
    pub border_subtle: Hsla,
    pub border_focus: Hsla,
    pub accent: Hsla,
    pub accent_fg: Hsla,
    pub status_info: Hsla,
    pub status_info_bg: Hsla,
    pub status_success: Hsla,
    pub status_success_bg: Hsla,
    pub status_warning: Hsla,
    pub status_warning_bg: Hsla,
    pub status_error: Hsla,
    pub status_error_bg: Hsla,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg_app: hsla(0.0, 0.0, 0.98, 1.0),
            bg_surface: hsla(0.0, 0.0, 1.0, 1.0),
            bg_field: hsla(0.0, 0.0, 1.0, 1.0),
            text_primary: hsla(0.0, 0.0, 0.13, 1.0),
            text_secondary: hsla(0.0, 0.0, 0.34, 1.0),
            text_muted: hsla(0.0, 0.0, 0.52, 1.0),
            text_placeholder: hsla(0.0, 0.0, 0.64, 1.0),
            border_subtle: hsla(0.0, 0.0, 0.85, 1.0),
            border_focus: hsla(0.58, 0.82, 0.48, 1.0),
            accent: hsla(0.58, 0.82, 0.48, 1.0),
            accent_fg: hsla(0.0, 0.0, 1.0, 1.0),
            status_info: hsla(0.58, 0.66, 0.38, 1.0),
            status_info_bg: hsla(0.58, 0.72, 0.95, 1.0),
            status_success: hsla(0.36, 0.58, 0.3, 1.0),
            status_success_bg: hsla(0.36, 0.5, 0.94, 1.0),
            status_warning: hsla(0.11, 0.78, 0.38, 1.0),
            status_warning_bg: hsla(0.11, 0.82, 0.94, 1.0),
            status_error: hsla(0.0, 0.72, 0.42, 1.0),
            status_error_bg: hsla(0.0, 0.78, 0.96, 1.0),
        }
    }
}
