use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::config::MenuConfig;
use crate::document::{DocumentError, EditorHost};
use crate::state::{MenuContentMachine, MenuContentMode, StateError};

use super::opener::{LinkOpener, OpenLinkError};

pub type ActionResult<T> = std::result::Result<T, ActionError>;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to update the link: {0}")]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Open(#[from] OpenLinkError),
}

/// Which mark the actions operate on and which attribute holds the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkTarget {
    pub mark_type: String,
    pub attribute: String,
}

impl Default for MarkTarget {
    fn default() -> Self {
        Self {
            mark_type: "link".to_string(),
            attribute: "href".to_string(),
        }
    }
}

impl MarkTarget {
    pub fn from_config(config: &MenuConfig) -> Self {
        Self {
            mark_type: config.mark_type.clone(),
            attribute: config.href_attribute.clone(),
        }
    }
}

/// Edit/open/confirm/cancel handlers behind the menu's buttons.
///
/// Call [`LinkActions::sync_selection`] on every selection change so a stale
/// edit session never outlives the cursor position it started at.
pub struct LinkActions<H: EditorHost> {
    host: Rc<H>,
    opener: Rc<dyn LinkOpener>,
    target: MarkTarget,
    content: RefCell<MenuContentMachine>,
}

impl<H: EditorHost> LinkActions<H> {
    pub fn new(host: Rc<H>, opener: Rc<dyn LinkOpener>, target: MarkTarget) -> Self {
        let actions = Self {
            host,
            opener,
            target,
            content: RefCell::new(MenuContentMachine::new()),
        };
        actions.sync_selection();
        actions
    }

    pub fn target(&self) -> &MarkTarget {
        &self.target
    }

    pub fn mode(&self) -> MenuContentMode {
        self.content.borrow().mode().clone()
    }

    pub fn href(&self) -> Option<String> {
        self.content.borrow().href().map(str::to_owned)
    }

    pub fn with_content<R>(&self, read: impl FnOnce(&MenuContentMachine) -> R) -> R {
        read(&self.content.borrow())
    }

    fn resolve_href(&self) -> Option<String> {
        let position = self.host.selection().bounds().from;
        self.host
            .marks_at(position)
            .into_iter()
            .find(|mark| mark.is(&self.target.mark_type))
            .and_then(|mark| mark.attr(&self.target.attribute).map(str::to_owned))
    }

    pub fn sync_selection(&self) {
        let href = self.resolve_href();
        tracing::trace!(href = ?href, "menu content follows selection");
        self.content.borrow_mut().reset_for_selection(href);
    }

    pub fn edit(&self) -> ActionResult<()> {
        self.content.borrow_mut().begin_edit()?;
        Ok(())
    }

    pub fn update_draft(&self, value: &str) -> ActionResult<()> {
        self.content.borrow_mut().set_draft(value)?;
        Ok(())
    }

    /// Writes the draft onto the whole link around the cursor, then leaves editing.
    ///
    /// On a document error the edit session stays open with its draft intact.
    pub fn confirm(&self) -> ActionResult<()> {
        let draft = self
            .content
            .borrow()
            .draft()
            .map(str::to_owned)
            .ok_or(StateError::NotEditing)?;

        self.host.apply_mark_attribute(
            &self.target.mark_type,
            &self.target.attribute,
            &draft,
            true,
        )?;
        self.content.borrow_mut().confirm()?;
        tracing::debug!(href = %draft, "link target updated");
        Ok(())
    }

    pub fn cancel(&self) -> ActionResult<()> {
        self.content.borrow_mut().cancel()?;
        Ok(())
    }

    /// Returns whether anything was opened; without a resolved href this is a no-op.
    pub fn open(&self) -> ActionResult<bool> {
        let Some(href) = self.href() else {
            tracing::debug!("no link target at the cursor; nothing to open");
            return Ok(false);
        };
        self.opener.open(&href)?;
        Ok(true)
    }
}
