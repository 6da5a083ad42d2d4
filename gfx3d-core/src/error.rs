/// Error type shared by the scene graph, schedulers and descriptor validation
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A face has vertices on both sides of another face's partition plane.
    #[error("object {object} straddles the plane of object {plane}; splitting is unsupported")]
    InvalidGeometry { object: usize, plane: usize },

    #[error("malformed {kind} descriptor: {reason}")]
    MalformedDescriptor { kind: &'static str, reason: String },

    #[error("expected a {expected} descriptor, got {found}")]
    DescriptorMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("composite objects have no partition outline")]
    MissingOutline,

    #[error("object was drawn before it was rendered")]
    NotRendered,

    #[error("no such object")]
    UnknownObject,

    #[error("invalid color: {0}")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Error::MalformedDescriptor {
            kind,
            reason: reason.into(),
        }
    }
}
