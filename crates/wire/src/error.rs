use crate::frame::END_MARKER;

/// Failures produced while encoding/decoding BINN containers or reading a
/// full frame off the wire.
///
/// [`WireError::Frame`] and [`WireError::Malformed`] are both "fatal for
/// that call" per the specification's error table (§7) — callers close
/// the connection rather than retry on this crate's errors; retrying
/// belongs to the layer above that knows whether a fresh dial makes sense.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("i/o error reading frame: {0}")]
    Io(#[from] std::io::Error),

    /// The 4 bytes following the container did not match `FF FF FF FF`.
    #[error("frame end marker mismatch: expected {END_MARKER:02X?}, found {found:02X?}")]
    EndMarkerMismatch { found: [u8; 4] },

    /// The container bytes did not decode into a well-formed BINN value,
    /// or a typed message constructor found an unexpected shape/width.
    #[error("malformed message: {0}")]
    Malformed(String),
}
