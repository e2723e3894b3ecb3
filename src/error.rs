use thiserror::Error;

/// Errors that can end the demo.
#[derive(Debug, Error)]
pub enum AppError {
    /// Terminal I/O failed while setting up or presenting a frame.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The terminal did not report its size and no override was given.
    #[error("could not determine terminal size; pass --width and --height")]
    ViewportDetection,
}
