use std::fmt;

/// Message shown to users when both acquisition attempts failed.
pub const ACCESS_HINT: &str =
    "could not access camera; check permissions and that the page is served from localhost or https";

/// The kind of host element an id was expected to name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Element that renders a live stream (`<video>`).
    Display,
    /// Element used as a pixel buffer for encoding (`<canvas>`).
    Drawing,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::Display => write!(f, "video element"),
            SurfaceKind::Drawing => write!(f, "canvas element"),
        }
    }
}

/// A failure reported by the host platform, shaped like a DOMException.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformError {
    name: String,
    message: String,
}

impl PlatformError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Exception name, e.g. "NotAllowedError" or "OverconstrainedError".
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl std::error::Error for PlatformError {}

#[derive(Debug)]
pub enum CameraError {
    ElementNotFound { kind: SurfaceKind, id: String },
    Unsupported(String),
    AcquisitionFailed {
        primary: PlatformError,
        fallback: PlatformError,
    },
    CaptureFailed(String),
    StaleSession(String),
    InvalidOption(String),
    Platform(PlatformError),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::ElementNotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            CameraError::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            CameraError::AcquisitionFailed { primary, fallback } => write!(
                f,
                "{ACCESS_HINT} (requested constraints: {primary}; unconstrained retry: {fallback})"
            ),
            CameraError::CaptureFailed(msg) => write!(f, "capture failed: {msg}"),
            CameraError::StaleSession(id) => {
                write!(f, "session no longer owns the stream attached to {id}")
            }
            CameraError::InvalidOption(msg) => write!(f, "invalid option: {msg}"),
            CameraError::Platform(err) => write!(f, "platform error: {err}"),
        }
    }
}

impl std::error::Error for CameraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CameraError::AcquisitionFailed { fallback, .. } => Some(fallback),
            CameraError::Platform(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PlatformError> for CameraError {
    fn from(err: PlatformError) -> Self {
        CameraError::Platform(err)
    }
}

impl CameraError {
    pub(crate) fn display_not_found(id: &str) -> Self {
        CameraError::ElementNotFound {
            kind: SurfaceKind::Display,
            id: id.to_string(),
        }
    }

    pub(crate) fn drawing_not_found(id: &str) -> Self {
        CameraError::ElementNotFound {
            kind: SurfaceKind::Drawing,
            id: id.to_string(),
        }
    }
}
