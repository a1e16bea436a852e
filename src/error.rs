use std::{
    error::Error,
    fmt, io,
    path::{Path, PathBuf},
};

/// The result type used across the model lifecycle.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Coarse classification of a [`ModelError`].
///
/// Presentation layers match on this to tell "no model yet" apart from
/// "bad input" and "bad model file".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InvalidState,
    NumericalError,
    Io,
    CorruptData,
}

/// Failures of the model lifecycle.
#[derive(Debug)]
pub enum ModelError {
    /// An input is invalid for semantic reasons (empty, non-finite, ...).
    InvalidInput(&'static str),

    /// A shape invariant was violated.
    ShapeMismatch {
        /// What was being compared (e.g. "targets", "feature width").
        what: &'static str,
        got: usize,
        expected: usize,
    },

    /// The operation needs fitted parameters and there are none.
    NotTrained,

    /// The centred feature matrix has no unique least-squares solution.
    Singular { rank: usize, features: usize },

    /// Reading or writing a persisted record failed.
    Io { path: PathBuf, source: io::Error },

    /// A persisted record could not be decoded into valid parameters.
    Corrupt { path: PathBuf, reason: String },
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::InvalidInput(_) | ModelError::ShapeMismatch { .. } => {
                ErrorKind::InvalidInput
            }
            ModelError::NotTrained => ErrorKind::InvalidState,
            ModelError::Singular { .. } => ErrorKind::NumericalError,
            ModelError::Io { .. } => ErrorKind::Io,
            ModelError::Corrupt { .. } => ErrorKind::CorruptData,
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        ModelError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        ModelError::Corrupt {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            ModelError::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "shape mismatch for {what}: got {got}, expected {expected}"
            ),
            ModelError::NotTrained => {
                write!(f, "the model has not been trained or loaded yet")
            }
            ModelError::Singular { rank, features } => write!(
                f,
                "feature matrix has rank {rank} for {features} features, no unique least-squares solution"
            ),
            ModelError::Io { path, source } => {
                write!(f, "io error on '{}': {source}", path.display())
            }
            ModelError::Corrupt { path, reason } => {
                write!(f, "corrupt model data in '{}': {reason}", path.display())
            }
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_variants() {
        let shape = ModelError::ShapeMismatch {
            what: "targets",
            got: 4,
            expected: 5,
        };
        assert_eq!(shape.kind(), ErrorKind::InvalidInput);
        assert_eq!(ModelError::NotTrained.kind(), ErrorKind::InvalidState);
        assert_eq!(
            ModelError::Singular {
                rank: 1,
                features: 2,
            }
            .kind(),
            ErrorKind::NumericalError
        );
        assert_eq!(
            ModelError::corrupt(Path::new("m.json"), "bad").kind(),
            ErrorKind::CorruptData
        );
    }

    #[test]
    fn io_error_exposes_source() {
        let err = ModelError::io(
            Path::new("missing.json"),
            io::Error::new(io::ErrorKind::NotFound, "nope"),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.json"));
    }
}
