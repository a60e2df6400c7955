//! Error handling for the onewire exporter.

use std::io;
use std::num::ParseFloatError;
use std::path::PathBuf;

/// A specialized `Result` type for exporter operations.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// The main error type for exporter operations.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Device discovery failed
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Metrics registry or encoder failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExporterError {
    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// The device root could not be listed. Fatal: nothing can ever be sampled.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("cannot list device directory {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single device could not be sampled this cycle.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The value file is missing or unreadable
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The value file does not hold a finite decimal number
    #[error("cannot parse {:?} from {} as a temperature", .content, .path.display())]
    Parse {
        path: PathBuf,
        content: String,
        /// `None` when the text parsed but is NaN or infinite
        #[source]
        source: Option<ParseFloatError>,
    },
}

impl ReadError {
    /// Path of the value file that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_reports_path() {
        let err = ReadError::Io {
            path: PathBuf::from("/mnt/1wire/28.aaa/temperature"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.path(), &PathBuf::from("/mnt/1wire/28.aaa/temperature"));
        assert!(!err.is_parse_failure());
        assert!(err.to_string().contains("/mnt/1wire/28.aaa/temperature"));
    }

    #[test]
    fn test_parse_failure_keeps_content() {
        let source = "abc".parse::<f64>().unwrap_err();
        let err = ReadError::Parse {
            path: PathBuf::from("/tmp/temperature"),
            content: "abc".to_string(),
            source: Some(source),
        };
        assert!(err.is_parse_failure());
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_discovery_error_converts() {
        let err: ExporterError = DiscoveryError::Unreadable {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        }
        .into();
        assert!(matches!(err, ExporterError::Discovery(_)));
        assert!(err.to_string().contains("/nope"));
    }
}
