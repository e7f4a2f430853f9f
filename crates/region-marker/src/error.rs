use thiserror::Error;

/// Error type a renderer returns when it cannot produce a widget.
pub type RenderError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
/// Errors produced while building engines or running a scan.
pub enum RegionError {
    #[error("invalid pattern '{pattern}': {source}")]
    /// A delimiter or inline pattern failed to compile.
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// The regex compiler error.
        #[source]
        source: regex::Error,
    },

    #[error("renderer for '{class_name}' failed: {source}")]
    /// A caller-supplied renderer failed; no fallback widget exists.
    Render {
        /// Marker class of the engine whose renderer failed.
        class_name: String,
        /// The renderer's error.
        #[source]
        source: RenderError,
    },
}
