use std::fmt;

/// Failure categories surfaced by index mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DocumentMissingId,
    DocumentExists,
    DocumentNotExists,
    DocumentMutated,
    FieldNotString,
}

impl ErrorKind {
    /// Fixed user-visible message for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::DocumentMissingId => "document has no id field",
            ErrorKind::DocumentExists => "document id already exists in the index",
            ErrorKind::DocumentNotExists => "document id does not exist in the index",
            ErrorKind::DocumentMutated => "document differs from the indexed version",
            ErrorKind::FieldNotString => "field value cannot be rendered as text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error {
            kind,
            context: context.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}", self.kind.message())
        } else {
            write!(f, "{}: {}", self.kind.message(), self.context)
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_fixed_per_kind() {
        assert_eq!(
            ErrorKind::DocumentMutated.message(),
            "document differs from the indexed version"
        );
        assert_eq!(
            ErrorKind::DocumentMissingId.message(),
            "document has no id field"
        );
    }

    #[test]
    fn display_appends_context() {
        let err = Error::new(ErrorKind::DocumentExists, "id 100");
        assert_eq!(
            err.to_string(),
            "document id already exists in the index: id 100"
        );

        let bare = Error::new(ErrorKind::FieldNotString, "");
        assert_eq!(bare.to_string(), "field value cannot be rendered as text");
    }
}
