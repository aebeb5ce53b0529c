use crate::PlatformError;

/// Receives the events the camera helpers deliberately do not turn into errors.
///
/// Every method logs through the `log` facade by default, so implementors
/// only override what they want to capture.
pub trait CameraObserver {
    /// A stream left on the surface by an earlier call was stopped before acquiring a new one.
    fn previous_stream_released(&self, surface_id: &str, stream_id: &str) {
        log::debug!("released previous stream {stream_id} on {surface_id}");
    }

    /// The requested constraints were rejected; retrying without constraints.
    fn acquisition_retry(&self, surface_id: &str, cause: &PlatformError) {
        log::warn!("camera request for {surface_id} rejected ({cause}); retrying unconstrained");
    }

    /// Both the requested and the unconstrained acquisition failed.
    fn acquisition_failed(&self, surface_id: &str, primary: &PlatformError, fallback: &PlatformError) {
        log::error!("could not access camera for {surface_id}: {primary}; then {fallback}");
    }

    /// Autoplay was refused; playback will be retried on the next click or key press.
    fn playback_deferred(&self, surface_id: &str, cause: &PlatformError) {
        log::warn!("autoplay prevented on {surface_id} ({cause}); waiting for user interaction");
    }

    /// Playback started after the user interacted with the page.
    fn playback_resumed(&self, surface_id: &str) {
        log::info!("playback started on {surface_id} after user interaction");
    }

    /// Playback still failed after the user interacted with the page.
    fn playback_retry_failed(&self, surface_id: &str, cause: &PlatformError) {
        log::error!("video play failed on {surface_id} after interaction: {cause}");
    }
}

/// Observer that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl CameraObserver for LogObserver {}
