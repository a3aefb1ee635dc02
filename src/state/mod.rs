pub mod error;
pub mod event;
pub mod machine;
pub mod model;

pub use error::{StateError, StateResult};
pub use event::{ContentEvent, StateTransition};
pub use machine::MenuContentMachine;
pub use model::{ContentModeKind, MenuContentMode};
