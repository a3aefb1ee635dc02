#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentModeKind {
    Viewing,
    Editing,
}

/// What the menu body currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MenuContentMode {
    /// Edit and open buttons.
    #[default]
    Viewing,
    /// URL entry holding the uncommitted value.
    Editing { draft: String },
}

impl MenuContentMode {
    pub fn kind(&self) -> ContentModeKind {
        match self {
            Self::Viewing => ContentModeKind::Viewing,
            Self::Editing { .. } => ContentModeKind::Editing,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Viewing => None,
            Self::Editing { draft } => Some(draft),
        }
    }
}
