use crate::{CameraError, DeviceInfo, DeviceKind, Platform};
use std::rc::Rc;

/// Lists the capture devices a host exposes.
pub struct DeviceEnumerator<P: Platform> {
    platform: Rc<P>,
}

impl<P: Platform> DeviceEnumerator<P> {
    pub fn new(platform: Rc<P>) -> Self {
        Self { platform }
    }

    /// List video input devices, in the order the platform reports them.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Platform` if the platform listing fails. There is no retry.
    pub async fn list_video_devices(&self) -> Result<Vec<DeviceInfo>, CameraError> {
        let devices = self.platform.enumerate_devices().await?;
        Ok(video_inputs(devices))
    }
}

/// Keep only `DeviceKind::VideoInput` entries.
pub fn video_inputs(devices: Vec<DeviceInfo>) -> Vec<DeviceInfo> {
    devices
        .into_iter()
        .filter(|device| device.kind() == DeviceKind::VideoInput)
        .collect()
}
