use std::collections::VecDeque;

use super::error::{StateError, StateResult};
use super::event::{ContentEvent, StateTransition};
use super::model::{ContentModeKind, MenuContentMode};

const HISTORY_LIMIT: usize = 32;

#[derive(Debug)]
pub struct MenuContentMachine {
    mode: MenuContentMode,
    href: Option<String>,
    transition_history: VecDeque<StateTransition>,
}

impl MenuContentMachine {
    pub fn new() -> Self {
        Self {
            mode: MenuContentMode::default(),
            href: None,
            transition_history: VecDeque::new(),
        }
    }

    pub fn mode(&self) -> &MenuContentMode {
        &self.mode
    }

    pub fn kind(&self) -> ContentModeKind {
        self.mode.kind()
    }

    /// Link target resolved at the last selection change.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn draft(&self) -> Option<&str> {
        self.mode.draft()
    }

    /// Most recent transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &StateTransition> {
        self.transition_history.iter()
    }

    pub fn can_transition(&self, event: ContentEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: ContentEvent) -> Option<ContentModeKind> {
        use ContentEvent::*;
        match (self.kind(), event) {
            (ContentModeKind::Viewing, Edit) => Some(ContentModeKind::Editing),
            (ContentModeKind::Editing, Confirm) => Some(ContentModeKind::Viewing),
            (ContentModeKind::Editing, Cancel) => Some(ContentModeKind::Viewing),
            (_, SelectionChanged) => Some(ContentModeKind::Viewing),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: ContentEvent) -> StateResult<ContentModeKind> {
        tracing::debug!(from = ?self.kind(), event = ?event, "request content transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.kind();
            tracing::warn!(from = ?from, event = ?event, "invalid content transition requested");
            StateError::InvalidTransition { from, event }
        })?;

        let record = StateTransition::new(self.kind(), event, next);
        self.mode = match next {
            ContentModeKind::Viewing => MenuContentMode::Viewing,
            ContentModeKind::Editing => MenuContentMode::Editing {
                draft: self.href.clone().unwrap_or_default(),
            },
        };
        if self.transition_history.len() == HISTORY_LIMIT {
            self.transition_history.pop_front();
        }
        self.transition_history.push_back(record);

        Ok(next)
    }

    /// Enters editing with the draft seeded from the current href.
    pub fn begin_edit(&mut self) -> StateResult<()> {
        self.transition(ContentEvent::Edit).map(|_| ())
    }

    pub fn set_draft(&mut self, value: impl Into<String>) -> StateResult<()> {
        match &mut self.mode {
            MenuContentMode::Editing { draft } => {
                *draft = value.into();
                Ok(())
            }
            MenuContentMode::Viewing => Err(StateError::NotEditing),
        }
    }

    /// Leaves editing and returns the committed value, which becomes the href.
    pub fn confirm(&mut self) -> StateResult<String> {
        let draft = self.draft().map(str::to_owned);
        self.transition(ContentEvent::Confirm)?;
        let value = draft.unwrap_or_default();
        self.href = Some(value.clone()).filter(|href| !href.is_empty());
        Ok(value)
    }

    pub fn cancel(&mut self) -> StateResult<()> {
        self.transition(ContentEvent::Cancel).map(|_| ())
    }

    /// Drops any edit session and adopts the href found at the new selection.
    pub fn reset_for_selection(&mut self, href: Option<String>) {
        self.href = href.filter(|href| !href.is_empty());
        if let Err(err) = self.transition(ContentEvent::SelectionChanged) {
            tracing::warn!(%err, "selection reset rejected; forcing viewing mode");
            self.mode = MenuContentMode::Viewing;
        }
    }
}

impl Default for MenuContentMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MenuContentMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MenuContentMode::{:?}", self.kind())
    }
}
