use crate::{
    CameraError, CameraObserver, CameraSession, CaptureOptions, CapturedFrame, DeviceEnumerator,
    DeviceInfo, FrameCapturer, FrameFormat, LogObserver, Platform, StreamController,
};
use std::rc::Rc;

/// The four camera operations over one host platform.
///
/// This is the surface a page-binding layer wires to its own entry points.
pub struct Camera<P: Platform> {
    platform: Rc<P>,
    enumerator: DeviceEnumerator<P>,
    controller: StreamController<P>,
    capturer: FrameCapturer<P>,
}

impl<P: Platform> Camera<P> {
    /// Create a camera that reports swallowed failures through `log`.
    pub fn new(platform: P) -> Self {
        Self::with_observer(platform, Rc::new(LogObserver))
    }

    pub fn with_observer(platform: P, observer: Rc<dyn CameraObserver>) -> Self {
        let platform = Rc::new(platform);
        Self {
            enumerator: DeviceEnumerator::new(Rc::clone(&platform)),
            controller: StreamController::new(Rc::clone(&platform), observer),
            capturer: FrameCapturer::new(Rc::clone(&platform)),
            platform,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// See [`DeviceEnumerator::list_video_devices`].
    pub async fn list_video_devices(&self) -> Result<Vec<DeviceInfo>, CameraError> {
        self.enumerator.list_video_devices().await
    }

    /// See [`StreamController::setup_camera`].
    pub async fn setup_camera(
        &self,
        surface_id: &str,
        options: &CaptureOptions,
    ) -> Result<CameraSession<P::Stream>, CameraError> {
        self.controller.setup_camera(surface_id, options).await
    }

    /// See [`FrameCapturer::capture_frame`].
    pub async fn capture_frame(
        &self,
        surface_id: &str,
        canvas_id: &str,
        format: &FrameFormat,
    ) -> Result<CapturedFrame, CameraError> {
        self.capturer
            .capture_frame(surface_id, canvas_id, format)
            .await
    }

    /// See [`FrameCapturer::capture_session_frame`].
    pub async fn capture_session_frame(
        &self,
        session: &CameraSession<P::Stream>,
        canvas_id: &str,
        format: &FrameFormat,
    ) -> Result<CapturedFrame, CameraError> {
        self.capturer
            .capture_session_frame(session, canvas_id, format)
            .await
    }

    /// See [`StreamController::stop_camera`].
    pub fn stop_camera(&self, surface_id: &str) {
        self.controller.stop_camera(surface_id);
    }

    /// See [`StreamController::stop_session`].
    pub fn stop_session(&self, session: CameraSession<P::Stream>) {
        self.controller.stop_session(session);
    }
}
