use gtk4::CssProvider;

use crate::ui::StyleTokens;

pub(super) fn runtime_css(tokens: StyleTokens) -> String {
    format!(
        r#"
.link-actions-menu {{
    padding: {spacing_4}px;
}}
.link-actions-menu .icon-button {{
    min-width: {control_size}px;
    min-height: {control_size}px;
    border-radius: {control_radius}px;
}}
.link-actions-menu entry {{
    margin-right: {spacing_8}px;
}}
.markmenu-editor {{
    font-size: 15px;
}}
"#,
        spacing_4 = tokens.spacing_4,
        spacing_8 = tokens.spacing_8,
        control_size = tokens.control_size,
        control_radius = tokens.control_radius,
    )
}

pub(super) fn install_runtime_css(tokens: StyleTokens) {
    let provider = CssProvider::new();
    provider.load_from_data(&runtime_css(tokens));
    if let Some(display) = gtk4::gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        tracing::warn!("no display available; skipping runtime css");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::LAYOUT_TOKENS;

    #[test]
    fn css_carries_layout_tokens() {
        let css = runtime_css(LAYOUT_TOKENS);
        assert!(css.contains("min-width: 32px;"));
        assert!(css.contains("border-radius: 8px;"));
        assert!(css.contains(".link-actions-menu entry"));
    }
}
