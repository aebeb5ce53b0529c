use futures_util::FutureExt;
use glimpse_camera::{
    Camera, CameraError, CameraObserver, CaptureOptions, DeviceInfo, DeviceKind, DisplaySurface,
    HeadlessPlatform, MediaStream, Platform, PlatformError, StreamConstraints, SurfaceKind,
    VideoConstraints,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn setup() -> (HeadlessPlatform, Camera<HeadlessPlatform>) {
    let platform = HeadlessPlatform::new();
    platform.add_display("video");
    let camera = Camera::new(platform.clone());
    (platform, camera)
}

fn denied() -> PlatformError {
    PlatformError::new("NotAllowedError", "Permission denied")
}

#[derive(Default)]
struct RecordingObserver {
    events: RefCell<Vec<String>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl CameraObserver for RecordingObserver {
    fn previous_stream_released(&self, surface_id: &str, stream_id: &str) {
        self.events
            .borrow_mut()
            .push(format!("released {surface_id} {stream_id}"));
    }

    fn acquisition_retry(&self, surface_id: &str, cause: &PlatformError) {
        self.events
            .borrow_mut()
            .push(format!("retry {surface_id} {}", cause.name()));
    }

    fn acquisition_failed(&self, surface_id: &str, _primary: &PlatformError, fallback: &PlatformError) {
        self.events
            .borrow_mut()
            .push(format!("failed {surface_id} {}", fallback.name()));
    }

    fn playback_deferred(&self, surface_id: &str, cause: &PlatformError) {
        self.events
            .borrow_mut()
            .push(format!("deferred {surface_id} {}", cause.name()));
    }

    fn playback_resumed(&self, surface_id: &str) {
        self.events.borrow_mut().push(format!("resumed {surface_id}"));
    }
}

#[tokio::test]
async fn test_setup_attaches_and_plays() {
    let (platform, camera) = setup();

    let session = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();

    let display = platform.display_surface("video").unwrap();
    assert_eq!(session.surface_id(), "video");
    assert!(session.is_live());
    assert_eq!(display.stream_id(), Some(session.stream().id()));
    assert!(display.is_playing());
    assert_eq!(display.video_size(), (640, 480));
    assert_eq!(
        platform.requests(),
        vec![StreamConstraints::from_options(&CaptureOptions::default())]
    );
}

#[tokio::test]
async fn test_setup_then_stop_leaves_no_stream() {
    let (platform, camera) = setup();

    let session = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();
    camera.stop_camera("video");

    let display = platform.display_surface("video").unwrap();
    assert!(display.stream().is_none());
    assert!(!session.is_live());
    assert_eq!(platform.live_stream_count(), 0);
}

#[tokio::test]
async fn test_second_setup_replaces_first() {
    let (platform, camera) = setup();

    let first = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();
    let second = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();

    assert!(!first.is_live());
    assert!(second.is_live());
    assert_eq!(platform.live_stream_count(), 1);
    assert_eq!(
        platform.display_surface("video").unwrap().stream_id(),
        Some(second.stream().id())
    );
}

#[tokio::test]
async fn test_missing_surface_is_reported_before_support() {
    let platform = HeadlessPlatform::new();
    platform.set_capture_supported(false);
    let camera = Camera::new(platform.clone());

    match camera.setup_camera("nope", &CaptureOptions::default()).await {
        Err(CameraError::ElementNotFound { kind, id }) => {
            assert_eq!(kind, SurfaceKind::Display);
            assert_eq!(id, "nope");
        }
        other => panic!("Expected CameraError::ElementNotFound, got {other:?}"),
    }
    assert!(platform.requests().is_empty());
}

#[tokio::test]
async fn test_unsupported_platform() {
    let (platform, camera) = setup();
    platform.set_capture_supported(false);

    let result = camera.setup_camera("video", &CaptureOptions::default()).await;
    assert!(matches!(result, Err(CameraError::Unsupported(_))));
    assert!(platform.requests().is_empty());
}

#[tokio::test]
async fn test_double_rejection_is_one_combined_error() {
    let (platform, camera) = setup();
    platform.reject_next(PlatformError::new("OverconstrainedError", "width"));
    platform.reject_next(denied());

    let err = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap_err();

    match &err {
        CameraError::AcquisitionFailed { primary, fallback } => {
            assert_eq!(primary.name(), "OverconstrainedError");
            assert_eq!(fallback.name(), "NotAllowedError");
        }
        other => panic!("Expected CameraError::AcquisitionFailed, got {other:?}"),
    }
    assert!(err.to_string().contains("localhost or https"));

    let requests = platform.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1], StreamConstraints::fallback());
    assert!(platform.display_surface("video").unwrap().stream().is_none());
}

#[tokio::test]
async fn test_single_rejection_falls_back_unconstrained() {
    let (platform, camera) = setup();
    platform.reject_next(PlatformError::new("OverconstrainedError", "facingMode"));

    let options = CaptureOptions::default().with_width(320).with_height(240);
    let session = camera.setup_camera("video", &options).await.unwrap();

    assert!(session.is_live());
    assert_eq!(session.stream().size(), (1280, 720));
    assert_eq!(platform.requests().len(), 2);
    assert_eq!(platform.requests()[1].video(), &VideoConstraints::Any);
}

#[tokio::test]
async fn test_exact_device_request() {
    let (platform, camera) = setup();
    platform.add_device(DeviceInfo::new("cam-2", "g", DeviceKind::VideoInput, "Rear"));

    let options = CaptureOptions::default().with_device_id("cam-2");
    camera.setup_camera("video", &options).await.unwrap();

    assert_eq!(
        platform.requests(),
        vec![StreamConstraints::from_options(&options)]
    );
    assert_eq!(
        platform.requests()[0].video(),
        &VideoConstraints::Device {
            device_id: "cam-2".to_string()
        }
    );
}

#[tokio::test]
async fn test_unknown_device_falls_back() {
    let (platform, camera) = setup();

    let options = CaptureOptions::default().with_device_id("gone");
    let session = camera.setup_camera("video", &options).await.unwrap();

    assert!(session.is_live());
    assert_eq!(platform.requests().len(), 2);
    assert_eq!(platform.requests()[1], StreamConstraints::fallback());
}

#[tokio::test]
async fn test_setup_waits_for_metadata() {
    let (platform, camera) = setup();
    platform.defer_metadata(true);
    let display = platform.display_surface("video").unwrap();
    let done = Cell::new(false);

    let (result, ()) = tokio::join!(
        async {
            let result = camera.setup_camera("video", &CaptureOptions::default()).await;
            done.set(true);
            result
        },
        async {
            tokio::task::yield_now().await;
            assert!(!done.get());
            assert!(display.stream_id().is_some());
            display.load_metadata();
        }
    );

    assert!(result.is_ok());
    assert!(display.is_playing());
}

#[tokio::test]
async fn test_autoplay_block_defers_to_interaction() {
    let (platform, camera) = setup();
    platform.block_autoplay(true);
    let display = platform.display_surface("video").unwrap();

    let session = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();

    assert!(session.is_live());
    assert!(!display.is_playing());
    assert_eq!(display.play_attempts(), 1);
    assert_eq!(platform.pending_interactions(), 1);

    platform.interact().await;
    assert!(display.is_playing());
    assert_eq!(display.play_attempts(), 2);
    assert_eq!(platform.pending_interactions(), 0);

    // the retry fires once
    platform.interact().await;
    assert_eq!(display.play_attempts(), 2);
}

#[tokio::test]
async fn test_observer_sees_swallowed_failures() {
    let platform = HeadlessPlatform::new();
    platform.add_display("video");
    platform.block_autoplay(true);
    let observer = Rc::new(RecordingObserver::default());
    let camera = Camera::with_observer(platform.clone(), observer.clone());

    let first = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();
    platform.reject_next(denied());
    camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();
    platform.interact().await;

    assert_eq!(
        observer.events(),
        vec![
            "deferred video NotAllowedError".to_string(),
            format!("released video {}", first.stream().id()),
            "retry video NotAllowedError".to_string(),
            "deferred video NotAllowedError".to_string(),
            "resumed video".to_string(),
            "resumed video".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_observer_sees_acquisition_failure() {
    let platform = HeadlessPlatform::new();
    platform.add_display("video");
    platform.reject_next(denied());
    platform.reject_next(PlatformError::new("NotFoundError", "no camera"));
    let observer = Rc::new(RecordingObserver::default());
    let camera = Camera::with_observer(platform, observer.clone());

    assert!(camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .is_err());
    assert_eq!(
        observer.events(),
        vec![
            "retry video NotAllowedError".to_string(),
            "failed video NotFoundError".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_stop_camera_is_idempotent() {
    let (platform, camera) = setup();

    camera.stop_camera("video");
    camera.stop_camera("missing");

    camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();
    camera.stop_camera("video");
    camera.stop_camera("video");

    assert_eq!(platform.live_stream_count(), 0);
    assert!(platform.display_surface("video").unwrap().stream().is_none());
}

#[tokio::test]
async fn test_stop_session_leaves_newer_stream() {
    let (platform, camera) = setup();

    let first = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();
    let second = camera
        .setup_camera("video", &CaptureOptions::default())
        .await
        .unwrap();

    camera.stop_session(first);

    assert!(second.is_live());
    assert_eq!(
        platform.display_surface("video").unwrap().stream_id(),
        Some(second.stream().id())
    );

    camera.stop_session(second);
    assert!(platform.display_surface("video").unwrap().stream().is_none());
    assert_eq!(platform.live_stream_count(), 0);
    assert_eq!(platform.streams().len(), 2);
}

#[tokio::test]
async fn test_concurrent_setups_leave_one_stream() {
    let (platform, camera) = setup();
    platform.hold_permissions();
    let options = CaptureOptions::default();
    let narrow = CaptureOptions::default().with_width(320);

    let (first, second, ()) = tokio::join!(
        camera.setup_camera("video", &options),
        camera.setup_camera("video", &narrow),
        async {
            tokio::task::yield_now().await;
            // only the first call reached the prompt; the second waits on the surface
            assert_eq!(platform.requests().len(), 1);
            platform.grant_permissions();
        }
    );

    let first = first.unwrap();
    let second = second.unwrap();
    assert!(!first.is_live());
    assert!(second.is_live());
    assert_eq!(platform.live_stream_count(), 1);
    assert_eq!(
        platform.display_surface("video").unwrap().stream_id(),
        Some(second.stream().id())
    );
}

#[tokio::test]
async fn test_different_surfaces_do_not_wait_on_each_other() {
    let (platform, camera) = setup();
    platform.add_display("other");
    platform.hold_permissions();
    let options = CaptureOptions::default();

    let (front, back, ()) = tokio::join!(
        camera.setup_camera("video", &options),
        camera.setup_camera("other", &options),
        async {
            tokio::task::yield_now().await;
            // both prompts are open at once
            assert_eq!(platform.requests().len(), 2);
            platform.grant_permissions();
        }
    );

    assert!(front.unwrap().is_live());
    assert!(back.unwrap().is_live());
    assert_eq!(platform.live_stream_count(), 2);
}

#[tokio::test]
async fn test_stop_during_metadata_wait_does_not_block_next_setup() {
    let (platform, camera) = setup();
    platform.defer_metadata(true);
    let options = CaptureOptions::default();

    let first = camera.setup_camera("video", &options);
    tokio::pin!(first);
    assert!(first.as_mut().now_or_never().is_none());

    camera.stop_camera("video");
    platform.defer_metadata(false);

    let second = camera
        .setup_camera("video", &options)
        .now_or_never()
        .expect("second setup waited on the abandoned one")
        .unwrap();
    assert!(second.is_live());
    assert_eq!(platform.requests().len(), 2);

    // the abandoned call finishes on the new stream's metadata
    let first = first.await.unwrap();
    assert!(!first.is_live());
    assert_eq!(platform.live_stream_count(), 1);
}
