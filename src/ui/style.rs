/// Compile-time layout tokens for the menu and demo window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTokens {
    pub spacing_4: i32,
    pub spacing_8: i32,
    pub control_radius: u16,
    pub control_size: i32,
    pub entry_width_chars: i32,
    pub editor_margin: i32,
    pub window_default_width: i32,
    pub window_default_height: i32,
}

pub const LAYOUT_TOKENS: StyleTokens = StyleTokens {
    spacing_4: 4,
    spacing_8: 8,
    control_radius: 8,
    control_size: 32,
    entry_width_chars: 28,
    editor_margin: 24,
    window_default_width: 760,
    window_default_height: 520,
};
