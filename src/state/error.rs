use super::event::ContentEvent;
use super::model::ContentModeKind;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid content transition: from {from:?} using event {event:?}")]
    InvalidTransition {
        from: ContentModeKind,
        event: ContentEvent,
    },
    #[error("no link edit is in progress")]
    NotEditing,
}
