use super::model::ContentModeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEvent {
    Edit,
    Confirm,
    Cancel,
    SelectionChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ContentModeKind,
    pub event: ContentEvent,
    pub to: ContentModeKind,
}

impl StateTransition {
    pub fn new(from: ContentModeKind, event: ContentEvent, to: ContentModeKind) -> Self {
        Self { from, event, to }
    }
}
