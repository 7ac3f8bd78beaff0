//! Errors raised by the object runtime

use thiserror::Error;

/// Errors surfaced by classes, instances and the facets on them
#[derive(Debug, Error)]
pub enum ObjectError {
    /// `extend` was called without a member definition
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Neither a field nor a member carries this name
    #[error("unknown member '{0}'")]
    UnknownMember(String),

    /// The name resolves to data, not a method
    #[error("member '{0}' is not callable")]
    NotCallable(String),

    /// The parent class has nothing callable under this name
    #[error("no parent implementation of '{0}'")]
    NoSuper(String),

    /// Raised by user code inside a method or listener
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result alias used throughout the crate
pub type Result<T, E = ObjectError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ObjectError::InvalidArgument("cannot extend from nothing".into());
        assert_eq!(err.to_string(), "invalid argument: cannot extend from nothing");

        let err = ObjectError::NotCallable("weight".into());
        assert_eq!(err.to_string(), "member 'weight' is not callable");
    }

    #[test]
    fn test_user_errors_pass_through() {
        let err: ObjectError = anyhow::anyhow!("listener exploded").into();
        assert_eq!(err.to_string(), "listener exploded");
        assert!(matches!(err, ObjectError::Other(_)));
    }
}
