pub mod link_menu;
pub mod style;
pub mod widgets;

pub use link_menu::LinkMenuView;
pub use style::{StyleTokens, LAYOUT_TOKENS};
pub use widgets::icon_button;
