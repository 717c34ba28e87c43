//! Storage error types
//!
//! Error codes:
//! - STORAGE_IO_ERROR
//! - STORAGE_READ_FAILED
//! - STORAGE_WRITE_FAILED
//! - STORAGE_MALFORMED_CSV
//! - STORAGE_SCHEMA_MISMATCH

use std::fmt;
use std::io;

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Filesystem failure outside a read or write of the mirror itself
    IoError,
    /// Mirror file could not be read
    ReadFailed,
    /// Mirror file could not be written
    WriteFailed,
    /// Text is not well-formed CSV
    MalformedCsv,
    /// Rows or records do not fit the fixed 21-column schema
    SchemaMismatch,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::IoError => "STORAGE_IO_ERROR",
            StorageErrorCode::ReadFailed => "STORAGE_READ_FAILED",
            StorageErrorCode::WriteFailed => "STORAGE_WRITE_FAILED",
            StorageErrorCode::MalformedCsv => "STORAGE_MALFORMED_CSV",
            StorageErrorCode::SchemaMismatch => "STORAGE_SCHEMA_MISMATCH",
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    /// 1-based CSV line, when the error points at one
    line: Option<u64>,
    source: Option<io::Error>,
}

impl StorageError {
    /// Create a generic I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::IoError,
            message: message.into(),
            line: None,
            source: Some(source),
        }
    }

    /// Create a read failure
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::ReadFailed,
            message: message.into(),
            line: None,
            source: Some(source),
        }
    }

    /// Create a write failure
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::WriteFailed,
            message: message.into(),
            line: None,
            source: Some(source),
        }
    }

    /// Create a malformed CSV error
    pub fn malformed_csv(line: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::MalformedCsv,
            message: reason.into(),
            line,
            source: None,
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(line: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::SchemaMismatch,
            message: reason.into(),
            line,
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the message without code or line context
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the CSV line the error refers to, if any
    pub fn line(&self) -> Option<u64> {
        self.line
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<csv::Error> for StorageError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line());
        StorageError::malformed_csv(line, e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line_and_source() {
        let err = StorageError::schema_mismatch(Some(4), "missing column 'fresh.exports'");
        assert_eq!(
            err.to_string(),
            "STORAGE_SCHEMA_MISMATCH: missing column 'fresh.exports' (line 4)"
        );

        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::write_failed("failed to write mirror", io);
        let display = err.to_string();
        assert!(display.starts_with("STORAGE_WRITE_FAILED"));
        assert!(display.ends_with("denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_csv_error_becomes_malformed() {
        let mut reader = csv::ReaderBuilder::new().from_reader("a,b\n1,2,3\n".as_bytes());
        let err: StorageError = reader.records().next().unwrap().unwrap_err().into();
        assert_eq!(err.code(), StorageErrorCode::MalformedCsv);
        assert_eq!(err.line(), Some(2));
    }
}
