//! Response errors.

use hermes_render::RenderError;
use thiserror::Error;

/// Errors returned to handlers by [`ResponseWriter`](crate::ResponseWriter).
///
/// By the time a handler sees one of these, the writer has already logged
/// it and, where the response was still uncommitted, sent an error response.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The payload could not be encoded.
    #[error("Render failed, reason: {0}")]
    Render(#[from] RenderError),

    /// Reading content or writing to the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for response operations.
pub type ResponseResult<T> = Result<T, ResponseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_message() {
        let err = ResponseError::from(RenderError::TemplateNotFound("home".to_string()));
        assert_eq!(
            err.to_string(),
            "Render failed, reason: html/template: \"home\" is undefined"
        );
    }

    #[test]
    fn test_io_message() {
        let err = ResponseError::from(std::io::Error::other("reset by peer"));
        assert_eq!(err.to_string(), "I/O error: reset by peer");
    }
}
