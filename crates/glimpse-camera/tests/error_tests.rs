use glimpse_camera::{CameraError, PlatformError, SurfaceKind};
use std::error::Error;

#[test]
fn test_from_platform_error() {
    let platform_err = PlatformError::new("NotReadableError", "device in use");
    let cam_err: CameraError = platform_err.into();

    match cam_err {
        CameraError::Platform(err) => assert_eq!(err.name(), "NotReadableError"),
        _ => panic!("Expected CameraError::Platform variant"),
    }
}

#[test]
fn test_platform_error_display() {
    let err = PlatformError::new("NotAllowedError", "Permission denied");
    assert_eq!(err.to_string(), "NotAllowedError: Permission denied");

    let bare = PlatformError::new("AbortError", "");
    assert_eq!(bare.to_string(), "AbortError");
}

#[test]
fn test_acquisition_failed_mentions_both_causes() {
    let err = CameraError::AcquisitionFailed {
        primary: PlatformError::new("OverconstrainedError", "width"),
        fallback: PlatformError::new("NotAllowedError", "Permission denied"),
    };

    let message = err.to_string();
    assert!(message.contains("could not access camera"));
    assert!(message.contains("OverconstrainedError"));
    assert!(message.contains("NotAllowedError"));
    assert!(err.source().is_some());
}

#[test]
fn test_error_display() {
    let not_found = CameraError::ElementNotFound {
        kind: SurfaceKind::Display,
        id: "video".to_string(),
    };
    assert_eq!(not_found.to_string(), "video element not found: video");

    let canvas = CameraError::ElementNotFound {
        kind: SurfaceKind::Drawing,
        id: "snap".to_string(),
    };
    assert_eq!(canvas.to_string(), "canvas element not found: snap");

    let unsupported = CameraError::Unsupported("no getUserMedia".to_string());
    assert!(unsupported.to_string().contains("no getUserMedia"));

    let capture = CameraError::CaptureFailed("empty blob".to_string());
    assert!(capture.to_string().contains("empty blob"));

    let stale = CameraError::StaleSession("video".to_string());
    assert!(stale.to_string().contains("video"));
}
