/// Kind of media device, as reported by device enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::VideoInput => "videoinput",
            DeviceKind::AudioInput => "audioinput",
            DeviceKind::AudioOutput => "audiooutput",
        }
    }
}

/// One entry from the platform's device list.
///
/// Labels are empty until the user has granted camera permission once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    device_id: String,
    group_id: String,
    kind: DeviceKind,
    label: String,
}

impl DeviceInfo {
    pub fn new(
        device_id: impl Into<String>,
        group_id: impl Into<String>,
        kind: DeviceKind,
        label: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            group_id: group_id.into(),
            kind,
            label: label.into(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
