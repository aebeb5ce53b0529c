use crate::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::{
    CameraError, CameraSession, CapturedFrame, DisplaySurface, DrawingSurface, FrameFormat,
    Platform,
};
use std::rc::Rc;

/// Snapshots the current frame of a display surface into an encoded image.
pub struct FrameCapturer<P: Platform> {
    platform: Rc<P>,
}

impl<P: Platform> FrameCapturer<P> {
    pub fn new(platform: Rc<P>) -> Self {
        Self { platform }
    }

    /// Draw the current frame of `surface_id` onto `canvas_id` and encode it.
    ///
    /// The drawing surface is resized to the frame's intrinsic size, or
    /// 640x480 when the display surface does not know its size yet.
    ///
    /// # Errors
    ///
    /// - `CameraError::ElementNotFound` if either surface is missing
    /// - `CameraError::Platform` if drawing or encoding fails
    /// - `CameraError::CaptureFailed` if encoding produced no data
    pub async fn capture_frame(
        &self,
        surface_id: &str,
        canvas_id: &str,
        format: &FrameFormat,
    ) -> Result<CapturedFrame, CameraError> {
        let (display, canvas) = self.surfaces(surface_id, canvas_id)?;
        Self::capture(&display, &canvas, format).await
    }

    /// Like [`capture_frame`](Self::capture_frame), for the surface a session was started on.
    ///
    /// # Errors
    ///
    /// Additionally returns `CameraError::StaleSession` if the surface now
    /// shows a different stream than the session's.
    pub async fn capture_session_frame(
        &self,
        session: &CameraSession<P::Stream>,
        canvas_id: &str,
        format: &FrameFormat,
    ) -> Result<CapturedFrame, CameraError> {
        let (display, canvas) = self.surfaces(session.surface_id(), canvas_id)?;
        let attached = display.stream();
        if !attached.is_some_and(|current| session.owns(&current)) {
            return Err(CameraError::StaleSession(session.surface_id().to_string()));
        }
        Self::capture(&display, &canvas, format).await
    }

    fn surfaces(
        &self,
        surface_id: &str,
        canvas_id: &str,
    ) -> Result<(P::Display, P::Drawing), CameraError> {
        let display = self
            .platform
            .display_surface(surface_id)
            .ok_or_else(|| CameraError::display_not_found(surface_id))?;
        let canvas = self
            .platform
            .drawing_surface(canvas_id)
            .ok_or_else(|| CameraError::drawing_not_found(canvas_id))?;
        Ok((display, canvas))
    }

    async fn capture(
        display: &P::Display,
        canvas: &P::Drawing,
        format: &FrameFormat,
    ) -> Result<CapturedFrame, CameraError> {
        let (width, height) = frame_size(display.video_size());

        canvas.resize(width, height);
        canvas.draw(display, width, height)?;

        let image = canvas.encode(format).await?.ok_or_else(|| {
            CameraError::CaptureFailed(format!(
                "encoder produced no data for {} ({width}x{height})",
                format.media_type()
            ))
        })?;

        Ok(CapturedFrame::new(image, format.quality(), width, height))
    }
}

/// Substitute the default size for unknown (zero) dimensions.
pub(crate) fn frame_size((width, height): (u32, u32)) -> (u32, u32) {
    let width = if width == 0 { DEFAULT_WIDTH } else { width };
    let height = if height == 0 { DEFAULT_HEIGHT } else { height };
    (width, height)
}
