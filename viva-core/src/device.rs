use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Microphone,
    Speakers,
    Camera,
}

impl DeviceKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::Microphone => "microphone",
            DeviceKind::Speakers => "speakers",
            DeviceKind::Camera => "camera",
        }
    }
}

/// Outcome of the most recent probe of one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    #[default]
    Unknown,
    Ok,
    Failed,
}

/// Per-capability probe results. Never persisted; every run starts over
/// from all-unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceReport {
    pub microphone: DeviceStatus,
    pub speakers: DeviceStatus,
    pub camera: DeviceStatus,
}

impl DeviceReport {
    pub fn status(&self, kind: DeviceKind) -> DeviceStatus {
        match kind {
            DeviceKind::Microphone => self.microphone,
            DeviceKind::Speakers => self.speakers,
            DeviceKind::Camera => self.camera,
        }
    }

    pub fn set(&mut self, kind: DeviceKind, status: DeviceStatus) {
        match kind {
            DeviceKind::Microphone => self.microphone = status,
            DeviceKind::Speakers => self.speakers = status,
            DeviceKind::Camera => self.camera = status,
        }
    }

    /// Gate for starting a session: every capability checked and passing.
    pub fn all_ok(&self) -> bool {
        self.microphone == DeviceStatus::Ok
            && self.speakers == DeviceStatus::Ok
            && self.camera == DeviceStatus::Ok
    }
}
