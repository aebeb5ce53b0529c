use crate::{CaptureOptions, FacingMode};

/// Video part of a stream request.
#[derive(Clone, Debug, PartialEq)]
pub enum VideoConstraints {
    /// Any camera, any resolution. Used as the relaxed retry.
    Any,
    /// Ideal resolution and facing mode; the platform may pick something close.
    Preferred {
        width: u32,
        height: u32,
        facing_mode: FacingMode,
    },
    /// Exactly this device, nothing else.
    Device { device_id: String },
}

/// Structured request sent to the platform's acquisition API.
///
/// Audio is never requested.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamConstraints {
    video: VideoConstraints,
}

impl StreamConstraints {
    pub fn new(video: VideoConstraints) -> Self {
        Self { video }
    }

    /// Build the primary request for `options`.
    pub fn from_options(options: &CaptureOptions) -> Self {
        let video = match options.device_id() {
            Some(device_id) => VideoConstraints::Device {
                device_id: device_id.to_string(),
            },
            None => VideoConstraints::Preferred {
                width: options.width(),
                height: options.height(),
                facing_mode: options.facing_mode(),
            },
        };
        Self { video }
    }

    /// The unconstrained `{ video: true, audio: false }` request.
    pub fn fallback() -> Self {
        Self {
            video: VideoConstraints::Any,
        }
    }

    pub fn video(&self) -> &VideoConstraints {
        &self.video
    }

    pub fn audio(&self) -> bool {
        false
    }
}
