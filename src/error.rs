use std::path::PathBuf;

use thiserror::Error;

use crate::openai::OpenAiError;

/// Fatal configuration problems. These abort the run before any item
/// is processed; everything else is recovered at the item boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source directory does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("source path is not a directory: {}", .0.display())]
    SourceNotADirectory(PathBuf),

    #[error("source directory is not readable: {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OpenAI API key not configured. Set OPENAI_API_KEY or `api_key` in stitchsort.toml")]
    MissingApiKey,

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Per-item conversion failure: the design file could not be rendered.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read design file: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a PES file (bad magic)")]
    BadMagic,

    #[error("truncated stitch data at offset {0}")]
    Truncated(usize),

    #[error("design contains no stitches")]
    EmptyDesign,

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Per-item classification failure: the vision model could not be asked
/// or kept answering with errors until retries ran out.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("rendered image not found: {}", .0.display())]
    ImageMissing(PathBuf),

    #[error("failed to read rendered image: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Api(#[from] OpenAiError),

    #[error("classifier returned an empty response")]
    EmptyResponse,

    #[error("all {attempts} classification attempts failed: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

/// Per-item placement failure: the destination tree rejected us.
#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("failed to create category directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::SourceMissing(PathBuf::from("/tmp/nope"));
        assert_eq!(err.to_string(), "source directory does not exist: /tmp/nope");
    }

    #[test]
    fn convert_error_display() {
        assert_eq!(ConvertError::BadMagic.to_string(), "not a PES file (bad magic)");
        assert_eq!(
            ConvertError::Truncated(532).to_string(),
            "truncated stitch data at offset 532"
        );
    }

    #[test]
    fn classify_error_display() {
        let err = ClassifyError::RetriesExhausted {
            attempts: 3,
            last: "API error (status 500): boom".into(),
        };
        assert_eq!(
            err.to_string(),
            "all 3 classification attempts failed: API error (status 500): boom"
        );
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ConvertError>();
        assert_send_sync::<ClassifyError>();
        assert_send_sync::<PlaceError>();
    }
}
