use thiserror::Error;

/// Error of every docvalues-* operation. The kind is boxed to keep `Result`
/// small on the hot decode paths.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Whether the error signals a broken input invariant rather than a failure
    /// of the underlying storage.
    ///
    /// Fatal errors must not be retried: the same input will fail the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ContractViolation { .. } | ErrorKind::InvalidArgument { .. }
        )
    }

    pub fn is_io(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io { .. })
    }

    pub fn invalid_format(name: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: name.into(),
                message: Default::default(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn contract_violation(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::ContractViolation {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("bad argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    #[error("operation not allowed: {name}")]
    InvalidOperation { name: String },

    #[error("contract violation in '{element}': {message}")]
    ContractViolation { element: String, message: String },

    #[error("checksum of '{element}' does not match its footer")]
    ChecksumMismatch { element: String },

    #[error("corrupt doc values in '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("I/O failure on '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
