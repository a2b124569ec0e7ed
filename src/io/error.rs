//! Error types and context management for generation runs

use std::fmt;
use std::path::PathBuf;

/// Main error type for all generation operations
#[derive(Debug)]
pub enum GenerationError {
    /// A layer or element name contains a reserved delimiter
    InvalidName {
        /// Offending name as found on disk or in configuration
        name: String,
        /// Delimiter that must not appear in the name
        delimiter: &'static str,
    },

    /// A layer directory produced no usable elements
    EmptyLayer {
        /// Display name of the layer
        layer: String,
        /// Directory the elements were read from
        path: PathBuf,
    },

    /// Two layers in the same batch share a display name
    DuplicateLayer {
        /// The repeated display name
        layer: String,
    },

    /// A dependency or exclusion rule cannot be indexed
    InvalidRule {
        /// Human readable form of the rule
        rule: String,
        /// Explanation of why the rule was rejected
        reason: String,
    },

    /// Rule narrowing left a layer with nothing to choose from
    ///
    /// Retrying cannot help: the same selection prefix always yields the
    /// same empty set, so the run stops here.
    NoCandidates {
        /// Batch being generated when this occurred
        batch_index: usize,
        /// Layer whose candidate set became empty
        layer: String,
    },

    /// Duplicate DNA rejections reached the configured tolerance
    ToleranceExceeded {
        /// Batch that could not be completed
        batch_index: usize,
        /// Number of items the batch asked for
        target_size: usize,
        /// Consecutive duplicate rejections observed
        rejections: usize,
    },

    /// A DNA token does not resolve against the layer list
    DecodeMismatch {
        /// Batch being decoded when this occurred
        batch_index: usize,
        /// Layer the token was matched against, if any
        layer: Option<String>,
        /// The token that failed to resolve
        token: String,
    },

    /// Run or generation parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to load a layer image from filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a rendered image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// Configuration or metadata could not be (de)serialized
    Serialization {
        /// Path of the document involved
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { name, delimiter } => {
                write!(f, "Name '{name}' must not contain '{delimiter}'")
            }
            Self::EmptyLayer { layer, path } => {
                write!(
                    f,
                    "Layer '{layer}' has no elements in '{}'",
                    path.display()
                )
            }
            Self::DuplicateLayer { layer } => {
                write!(f, "Layer name '{layer}' is used more than once")
            }
            Self::InvalidRule { rule, reason } => {
                write!(f, "Invalid rule {rule}: {reason}")
            }
            Self::NoCandidates { batch_index, layer } => {
                write!(
                    f,
                    "No candidates left for layer '{layer}' in batch {batch_index}"
                )
            }
            Self::ToleranceExceeded {
                batch_index,
                target_size,
                rejections,
            } => {
                write!(
                    f,
                    "Batch {batch_index} cannot grow to {target_size} items: \
                     {rejections} duplicate DNA rejections in a row, add more layers or elements"
                )
            }
            Self::DecodeMismatch {
                batch_index,
                layer,
                token,
            } => match layer {
                Some(layer) => write!(
                    f,
                    "DNA token '{token}' does not match layer '{layer}' in batch {batch_index}"
                ),
                None => write!(
                    f,
                    "DNA token '{token}' has no layer in batch {batch_index}"
                ),
            },
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::Serialization { path, source } => {
                write!(f, "Invalid JSON in '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for generation results
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Additional context to enrich error messages
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Batch being processed
    pub batch_index: Option<usize>,
    /// Operation being performed
    pub operation: Option<&'static str>,
}

/// Enriches error messages with run state information
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Add just the batch context
    ///
    /// # Errors
    ///
    /// Propagates the original error with the batch index applied
    fn with_batch(self, batch_index: usize) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<GenerationError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only errors raised mid-batch carry a batch index
            if let Some(index) = context.batch_index {
                match &mut error {
                    GenerationError::NoCandidates { batch_index, .. }
                    | GenerationError::ToleranceExceeded { batch_index, .. }
                    | GenerationError::DecodeMismatch { batch_index, .. } => {
                        *batch_index = index;
                    }
                    _ => {}
                }
            }
            if let (Some(operation), GenerationError::FileSystem { operation: op, .. }) =
                (context.operation, &mut error)
            {
                *op = operation;
            }
            error
        })
    }

    fn with_batch(self, batch_index: usize) -> Result<T> {
        self.with_context(ErrorContext {
            batch_index: Some(batch_index),
            ..Default::default()
        })
    }
}

impl From<image::ImageError> for GenerationError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GenerationError {
    GenerationError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Wrap an I/O error with the path and operation it came from
pub fn file_system(
    path: impl Into<PathBuf>,
    operation: &'static str,
) -> impl FnOnce(std::io::Error) -> GenerationError {
    let path = path.into();
    move |source| GenerationError::FileSystem {
        path,
        operation,
        source,
    }
}
