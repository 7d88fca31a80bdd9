use std::sync::Arc;

use viva_core::{DeviceKind, DeviceReport, DeviceStatus};

use crate::source::{MediaSource, StreamConstraints};

/// Pre-session device checks. Each check acquires a short-lived stream for
/// just that capability and releases it immediately; the report gates
/// whether a session may start.
pub struct DeviceProbe {
    source: Arc<dyn MediaSource>,
    report: DeviceReport,
}

impl DeviceProbe {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self {
            source,
            report: DeviceReport::default(),
        }
    }

    pub fn check_microphone(&mut self) -> DeviceStatus {
        self.check(DeviceKind::Microphone, StreamConstraints::audio_only())
    }

    pub fn check_camera(&mut self) -> DeviceStatus {
        self.check(DeviceKind::Camera, StreamConstraints::video_only())
    }

    /// Speakers cannot be probed reliably: opening an output device proves
    /// nothing about audible playback. The check is optimistic; playback
    /// failures surface later as logged speech errors.
    pub fn check_speakers(&mut self) -> DeviceStatus {
        log::info!("speakers check passed (optimistic)");
        self.report.set(DeviceKind::Speakers, DeviceStatus::Ok);
        DeviceStatus::Ok
    }

    pub fn report(&self) -> &DeviceReport {
        &self.report
    }

    fn check(&mut self, kind: DeviceKind, constraints: StreamConstraints) -> DeviceStatus {
        let status = match self.source.open(constraints) {
            Ok(mut stream) => {
                // Probing must not hold the device.
                stream.release();
                log::info!("{} check passed", kind.label());
                DeviceStatus::Ok
            }
            Err(e) => {
                log::warn!("{} check failed: {e}", kind.label());
                DeviceStatus::Failed
            }
        };
        self.report.set(kind, status);
        status
    }
}
