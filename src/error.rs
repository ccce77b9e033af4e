/// Error types for the ipasn library
use std::fmt;

/// Result type alias for ipasn operations
pub type Result<T> = std::result::Result<T, AsnError>;

/// Main error type for ipasn operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsnError {
    /// I/O errors (unreadable database or input stream)
    Io(String),

    /// Format/parsing errors in a source that cannot be recovered row by row
    Format(String),

    /// Validation errors (e.g. overlapping ranges under a strict policy)
    Validation(String),

    /// General errors
    Other(String),
}

impl fmt::Display for AsnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsnError::Io(msg) => write!(f, "I/O error: {}", msg),
            AsnError::Format(msg) => write!(f, "Format error: {}", msg),
            AsnError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AsnError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AsnError {}

impl From<std::io::Error> for AsnError {
    fn from(err: std::io::Error) -> Self {
        AsnError::Io(err.to_string())
    }
}

impl From<csv::Error> for AsnError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            AsnError::Io(err.to_string())
        } else {
            AsnError::Format(err.to_string())
        }
    }
}

impl From<String> for AsnError {
    fn from(msg: String) -> Self {
        AsnError::Other(msg)
    }
}

impl From<&str> for AsnError {
    fn from(msg: &str) -> Self {
        AsnError::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            AsnError::Io("disk gone".into()).to_string(),
            "I/O error: disk gone"
        );
        assert_eq!(
            AsnError::Validation("2 overlapping ranges".into()).to_string(),
            "Validation error: 2 overlapping ranges"
        );
        assert_eq!(AsnError::from("plain").to_string(), "plain");
    }

    #[test]
    fn test_from_io_error() {
        let err: AsnError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, AsnError::Io(ref m) if m.contains("missing")));
    }
}
