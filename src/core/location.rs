//! Document location relative to the output root.

/// Where a generated document sits, which decides its relative depth prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLocation {
    /// The root document, at the output root.
    Root,
    /// A page document, one directory below the output root.
    Page,
}

impl FileLocation {
    /// Prefix reaching the output root from this location.
    #[inline]
    pub const fn depth_prefix(self) -> &'static str {
        match self {
            Self::Root => "./",
            Self::Page => "../",
        }
    }
}
