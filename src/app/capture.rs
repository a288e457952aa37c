//! Camera and microphone failures, mapped to guidance the student can act on.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureDevice {
    Camera,
    Microphone,
}

impl CaptureDevice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureErrorKind {
    PermissionDenied,
    NoDevice,
    Unknown(String),
}

pub fn capture_guidance(device: &CaptureDevice, kind: &CaptureErrorKind) -> String {
    match (device, kind) {
        (CaptureDevice::Camera, CaptureErrorKind::PermissionDenied) => {
            "Camera access was denied. Please allow camera access in your settings, \
             or upload a photo instead."
                .into()
        }
        (CaptureDevice::Camera, CaptureErrorKind::NoDevice) => {
            "No camera was found. Please connect a camera or upload a photo instead.".into()
        }
        (CaptureDevice::Microphone, CaptureErrorKind::PermissionDenied) => {
            "Microphone access was denied. Please allow microphone access in your settings, \
             or type your question instead."
                .into()
        }
        (CaptureDevice::Microphone, CaptureErrorKind::NoDevice) => {
            "No microphone was found. Please connect one or type your question instead.".into()
        }
        (device, CaptureErrorKind::Unknown(detail)) => format!(
            "Could not start the {}: {detail}. Please try again.",
            device.as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guidance_distinguishes_denied_from_missing() {
        let denied = capture_guidance(&CaptureDevice::Camera, &CaptureErrorKind::PermissionDenied);
        let missing = capture_guidance(&CaptureDevice::Camera, &CaptureErrorKind::NoDevice);
        assert!(denied.contains("denied"));
        assert!(missing.contains("No camera"));
        assert_ne!(denied, missing);
    }

    #[test]
    fn unknown_carries_detail() {
        let text = capture_guidance(
            &CaptureDevice::Microphone,
            &CaptureErrorKind::Unknown("device busy".into()),
        );
        assert!(text.contains("microphone: device busy"));
    }
}
