/*!
 * Error types for the gpxmerge application.
 *
 * Each layer of the merge has its own error type, built with thiserror:
 * point-level timestamp failures, markup failures, document-level failures
 * and run-level merge failures. Point-level errors never escalate; the
 * document and merge errors abort the run.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing a single `<time>` value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The timestamp text was empty or whitespace only
    #[error("Empty timestamp")]
    Empty,

    /// The timestamp text is not an ISO 8601 date-time
    #[error("Could not parse timestamp '{text}'")]
    Invalid {
        /// Offending text, as found in the document
        text: String,
    },
}

/// Errors raised while reading or writing markup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// Syntax error reported by the XML reader
    #[error("Malformed markup at byte {position}: {message}")]
    Syntax {
        /// Byte offset where the reader stopped
        position: u64,
        /// Reader error message
        message: String,
    },

    /// Malformed or duplicated attribute
    #[error("Invalid attribute: {0}")]
    Attribute(String),

    /// Content is not valid UTF-8
    #[error("Invalid UTF-8 in markup: {0}")]
    Encoding(String),

    /// Closing tag with no matching open element
    #[error("Unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    /// Document ended with an element still open
    #[error("Element <{0}> is never closed")]
    UnclosedElement(String),

    /// Document contains no element at all
    #[error("Document has no root element")]
    NoRoot,

    /// A second top-level element was found
    #[error("Document has more than one root element")]
    MultipleRoots,

    /// Non-whitespace text before or after the root element
    #[error("Text outside the root element: '{0}'")]
    TextOutsideRoot(String),

    /// The XML writer failed
    #[error("Failed to write markup: {0}")]
    Write(String),
}

/// Document-level failures: the whole input file is rejected
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read from disk
    #[error("Failed to read GPX file '{}': {message}", .path.display())]
    Read {
        /// Source file
        path: PathBuf,
        /// Underlying I/O error message
        message: String,
    },

    /// The file is not well-formed XML
    #[error("Invalid GPX file '{}': {source}", .path.display())]
    NotWellFormed {
        /// Source file
        path: PathBuf,
        /// Markup error
        source: XmlError,
    },
}

impl DocumentError {
    /// Path of the document that failed
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. } | Self::NotWellFormed { path, .. } => path,
        }
    }
}

/// Run-level merge failures
#[derive(Error, Debug)]
pub enum MergeError {
    /// No input pattern resolved to a file
    #[error("No valid GPX files found")]
    NoInputFiles,

    /// A resolved input does not name an existing regular file
    #[error("GPX file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// An input document failed as a whole
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Nothing usable was extracted from any input
    #[error("No track points found to merge")]
    NoPoints,

    /// The merged document could not be serialized
    #[error("Failed to serialize merged GPX document: {0}")]
    Serialize(#[from] XmlError),

    /// The merged document could not be written
    #[error("Failed to write merged GPX file '{}': {message}", .path.display())]
    Output {
        /// Output file
        path: PathBuf,
        /// Underlying I/O error message
        message: String,
    },
}
