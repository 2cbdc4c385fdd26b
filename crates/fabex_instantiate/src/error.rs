//! Error types for document mutation and architecture instantiation.

use fabex_arch::ArchError;
use std::path::PathBuf;

/// Errors raised by a [`DocumentEditor`](crate::DocumentEditor) backend.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The editing program could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// The program that failed to start.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The editing program ran but reported failure.
    #[error("edit '{op}' failed on {} (status {status}): {stderr}", file.display())]
    Failed {
        /// Rendering of the failed operation.
        op: String,
        /// The document being edited.
        file: PathBuf,
        /// Exit status, or -1 if the process was terminated by a signal.
        status: i32,
        /// Trimmed standard error output.
        stderr: String,
    },
}

/// Errors raised while materializing an architecture point.
#[derive(Debug, thiserror::Error)]
pub enum InstantiateError {
    /// The point cannot be generated or has no base template.
    #[error(transparent)]
    Arch(#[from] ArchError),

    /// The base template could not be copied to its staging directory.
    #[error("failed to stage {}: {source}", path.display())]
    Stage {
        /// The path being created or copied.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A document edit failed; the staged file has been removed.
    #[error(transparent)]
    Edit(#[from] EditError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_failed_edit() {
        let err = EditError::Failed {
            op: "delete /architecture/switchblocklist".to_string(),
            file: PathBuf::from("/tmp/a.xml"),
            status: 1,
            stderr: "None of the XPaths matched".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "edit 'delete /architecture/switchblocklist' failed on /tmp/a.xml (status 1): None of the XPaths matched"
        );
    }

    #[test]
    fn arch_errors_are_transparent() {
        let err = InstantiateError::from(ArchError::InvalidViaRepeat);
        assert_eq!(err.to_string(), "global via repeat must be at least 1");
    }

    #[test]
    fn display_stage_error() {
        let err = InstantiateError::Stage {
            path: PathBuf::from("/work/a"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("failed to stage /work/a"));
    }
}
