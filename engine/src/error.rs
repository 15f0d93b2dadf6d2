use std::path::PathBuf;

/// Recoverable failures of pose operations.
///
/// None of them aborts the program. Operation that returns one of these
/// has already logged it and left the skeleton as it was.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PoseError {
    /// Required external object was never assigned or no longer exists.
    #[error("{what} is not assigned")]
    MissingReference { what: &'static str },

    /// Pose names a bone the skeleton doesn't have.
    #[error("Bone '{name}' not found")]
    UnresolvedName { name: String },

    /// Requested pose index is outside of the library.
    #[error("Pose index {index} is out of range 0..{len}")]
    OutOfRange { index: isize, len: usize },
}

/// Failures of reading and writing RON assets.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to access '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{}'", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::Error,
    },

    #[error("Failed to serialize asset")]
    Serialize {
        #[source]
        source: ron::Error,
    },
}
