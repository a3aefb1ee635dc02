use gtk4::prelude::*;
use gtk4::{Box as GtkBox, Button, Entry, Orientation, Stack, StackTransitionType};

use crate::state::{ContentModeKind, MenuContentMachine};

use super::style::StyleTokens;
use super::widgets::icon_button;

const VIEWING_PAGE: &str = "viewing";
const EDITING_PAGE: &str = "editing";

/// Widgets of the link menu body: view/act buttons, or the URL entry.
pub struct LinkMenuView {
    root: GtkBox,
    stack: Stack,
    edit_button: Button,
    open_button: Button,
    entry: Entry,
    confirm_button: Button,
    cancel_button: Button,
}

impl LinkMenuView {
    pub fn new(tokens: StyleTokens) -> Self {
        let root = GtkBox::new(Orientation::Horizontal, 0);
        root.add_css_class("link-actions-menu");

        let edit_button = icon_button(
            "document-edit-symbolic",
            "Edit link",
            tokens.control_size,
            &[],
        );
        let open_button = icon_button(
            "web-browser-symbolic",
            "Open link in browser",
            tokens.control_size,
            &[],
        );
        let viewing = GtkBox::new(Orientation::Horizontal, tokens.spacing_4);
        viewing.append(&edit_button);
        viewing.append(&open_button);

        let entry = Entry::new();
        entry.set_placeholder_text(Some("https://"));
        entry.set_width_chars(tokens.entry_width_chars);
        let confirm_button = icon_button(
            "object-select-symbolic",
            "Apply link",
            tokens.control_size,
            &["suggested-action"],
        );
        let cancel_button = icon_button(
            "window-close-symbolic",
            "Discard changes",
            tokens.control_size,
            &[],
        );
        let editing = GtkBox::new(Orientation::Horizontal, tokens.spacing_4);
        editing.append(&entry);
        editing.append(&confirm_button);
        editing.append(&cancel_button);

        let stack = Stack::new();
        stack.set_transition_type(StackTransitionType::None);
        stack.set_hhomogeneous(false);
        stack.set_interpolate_size(true);
        stack.add_named(&viewing, Some(VIEWING_PAGE));
        stack.add_named(&editing, Some(EDITING_PAGE));
        root.append(&stack);

        Self {
            root,
            stack,
            edit_button,
            open_button,
            entry,
            confirm_button,
            cancel_button,
        }
    }

    pub fn root(&self) -> &GtkBox {
        &self.root
    }

    pub fn edit_button(&self) -> &Button {
        &self.edit_button
    }

    pub fn open_button(&self) -> &Button {
        &self.open_button
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn confirm_button(&self) -> &Button {
        &self.confirm_button
    }

    pub fn cancel_button(&self) -> &Button {
        &self.cancel_button
    }

    /// Brings the widgets in line with the content machine.
    pub fn render(&self, content: &MenuContentMachine) {
        let has_href = content.href().is_some();
        self.edit_button.set_sensitive(has_href);
        self.open_button.set_sensitive(has_href);

        match content.kind() {
            ContentModeKind::Viewing => {
                self.stack.set_visible_child_name(VIEWING_PAGE);
            }
            ContentModeKind::Editing => {
                let draft = content.draft().unwrap_or_default();
                // Rewriting identical text would fire `changed` and move the cursor.
                if self.entry.text().as_str() != draft {
                    self.entry.set_text(draft);
                }
                self.stack.set_visible_child_name(EDITING_PAGE);
            }
        }
    }
}
