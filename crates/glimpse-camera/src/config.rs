use crate::CameraError;
use std::fmt;
use std::str::FromStr;

/// Width requested when the caller does not specify one, and the capture
/// width assumed when a surface reports no intrinsic size yet.
pub const DEFAULT_WIDTH: u32 = 640;

/// Height counterpart of [`DEFAULT_WIDTH`].
pub const DEFAULT_HEIGHT: u32 = 480;

pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

pub const DEFAULT_QUALITY: f64 = 0.85;

/// Which way the requested camera should face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FacingMode {
    /// Front camera, towards the user.
    #[default]
    User,
    /// Rear camera, away from the user.
    Environment,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(FacingMode::User),
            "environment" => Ok(FacingMode::Environment),
            other => Err(CameraError::InvalidOption(format!(
                "facingMode must be \"user\" or \"environment\", got {other:?}"
            ))),
        }
    }
}

/// Options for acquiring a camera stream.
///
/// When a device id is set, width, height and facing mode are not sent to
/// the platform: the exact device wins.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureOptions {
    width: u32,
    height: u32,
    facing_mode: FacingMode,
    device_id: Option<String>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            facing_mode: FacingMode::User,
            device_id: None,
        }
    }
}

impl CaptureOptions {
    /// Set the preferred capture width in pixels.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the preferred capture height in pixels.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Set the preferred facing mode.
    pub fn with_facing_mode(mut self, facing_mode: FacingMode) -> Self {
        self.facing_mode = facing_mode;
        self
    }

    /// Request one exact device, as reported by device enumeration.
    ///
    /// An empty id is the same as no id.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        let device_id = device_id.into();
        self.device_id = if device_id.is_empty() {
            None
        } else {
            Some(device_id)
        };
        self
    }

    // Getters
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }
}

/// Encoding requested for a captured frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameFormat {
    media_type: String,
    quality: f64,
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self {
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            quality: DEFAULT_QUALITY,
        }
    }
}

impl FrameFormat {
    /// Set the media type, e.g. "image/png".
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Set the quality factor in `0.0..=1.0`. Only lossy types use it.
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }
}
