use thiserror::Error;

/// Failures while splicing the card grid into the listing page. Both leave
/// the page untouched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpliceError {
    /// The opening grid marker is missing from the page.
    #[error("listing page has no '<div class=\"blog-grid\">' marker")]
    MarkerNotFound,

    /// No closing </div> follows the grid marker.
    #[error("no closing </div> found after the blog grid marker")]
    StructureError,
}

/// Rejections at the authoring boundary, raised before any record is built.
/// Scanned records are never validated (tolerant extraction).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("description cannot be empty")]
    EmptyDescription,

    #[error("invalid image URL: {0}")]
    BadImageUrl(String),

    #[error("invalid YouTube ID (expected 11 characters of [A-Za-z0-9_-]): {0}")]
    BadVideoId(String),

    #[error("YouTube ID is required for video posts")]
    MissingVideoId,

    #[error("unknown series key: {0}")]
    UnknownSeries(String),
}
