#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Variant {
    Filled,
    Outline,
    Subtle,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Size {
    Sm,
    Md,
    Lg,
}

impl Size {
    pub fn font_size_px(self) -> f32 {
        match self {
            Size::Sm => 14.0,
            Size::Md => 16.0,
            Size::Lg => 18.0,
        }
    }

    pub fn caret_height_px(self) -> f32 {
        match self {
            Size::Sm => 15.0,
            Size::Md => 17.0,
            Size::Lg => 19.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldLayout {
    Vertical,
    Horizontal,
}
