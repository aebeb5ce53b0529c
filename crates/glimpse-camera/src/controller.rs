use crate::{
    CameraError, CameraObserver, CameraSession, CaptureOptions, DisplaySurface, MediaStream,
    Platform, StreamConstraints,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tokio::sync::Mutex;

/// Acquires camera streams onto display surfaces and releases them.
///
/// Stream swaps on the same surface are serialized: a second call waits until
/// the first has attached its stream and then replaces it. The wait for
/// metadata and playback happens outside the lock. Different surfaces do not
/// wait on each other.
pub struct StreamController<P: Platform> {
    platform: Rc<P>,
    observer: Rc<dyn CameraObserver>,
    locks: RefCell<HashMap<String, Rc<Mutex<()>>>>,
}

impl<P: Platform> StreamController<P> {
    pub fn new(platform: Rc<P>, observer: Rc<dyn CameraObserver>) -> Self {
        Self {
            platform,
            observer,
            locks: RefCell::new(HashMap::new()),
        }
    }

    /// Acquire a camera stream and attach it to the display surface `surface_id`.
    ///
    /// Any stream already on the surface is stopped first. If the platform
    /// rejects the requested constraints, one unconstrained retry is made.
    /// Returns once stream metadata is available; playback may still be
    /// waiting for a user gesture.
    ///
    /// # Errors
    ///
    /// - `CameraError::ElementNotFound` if the surface does not exist
    /// - `CameraError::Unsupported` if the platform cannot capture at all
    /// - `CameraError::AcquisitionFailed` if both attempts were rejected
    pub async fn setup_camera(
        &self,
        surface_id: &str,
        options: &CaptureOptions,
    ) -> Result<CameraSession<P::Stream>, CameraError> {
        let display = self
            .platform
            .display_surface(surface_id)
            .ok_or_else(|| CameraError::display_not_found(surface_id))?;

        if !self.platform.supports_capture() {
            return Err(CameraError::Unsupported(
                "camera capture is not available on this platform".to_string(),
            ));
        }

        let constraints = StreamConstraints::from_options(options);

        // held for the stream swap only, never across the metadata wait or playback
        let lock = self.surface_lock(surface_id);
        let acquired = {
            let _guard = lock.lock().await;
            self.release(surface_id, &display);
            let acquired = self.acquire(surface_id, &constraints).await;
            if let Ok(stream) = &acquired {
                display.attach(Some(stream));
            }
            acquired
        };
        self.forget_lock(surface_id, lock);
        let stream = acquired?;

        // Dimensions are only valid once metadata has arrived
        if !display.has_metadata() {
            display.metadata_loaded().await;
        }

        if let Err(cause) = display.play().await {
            self.observer.playback_deferred(surface_id, &cause);
            let observer = Rc::clone(&self.observer);
            let retry_display = display.clone();
            let id = surface_id.to_string();
            self.platform.on_next_interaction(Box::pin(async move {
                match retry_display.play().await {
                    Ok(()) => observer.playback_resumed(&id),
                    Err(cause) => observer.playback_retry_failed(&id, &cause),
                }
            }));
        }

        Ok(CameraSession::new(surface_id, stream))
    }

    /// Stop the stream attached to `surface_id` and clear the binding.
    ///
    /// Does nothing if the surface does not exist or has no stream.
    pub fn stop_camera(&self, surface_id: &str) {
        if let Some(display) = self.platform.display_surface(surface_id) {
            if let Some(stream) = display.stream() {
                stream.stop_tracks();
            }
            display.attach(None);
        }
    }

    /// Stop a session's stream.
    ///
    /// The surface binding is cleared only if the surface still shows this
    /// session's stream; a newer stream attached since is left alone.
    pub fn stop_session(&self, session: CameraSession<P::Stream>) {
        session.stream().stop_tracks();
        if let Some(display) = self.platform.display_surface(session.surface_id()) {
            if display
                .stream()
                .is_some_and(|current| session.owns(&current))
            {
                display.attach(None);
            }
        }
    }

    fn release(&self, surface_id: &str, display: &P::Display) {
        if let Some(previous) = display.stream() {
            previous.stop_tracks();
            display.attach(None);
            self.observer
                .previous_stream_released(surface_id, &previous.id());
        }
    }

    async fn acquire(
        &self,
        surface_id: &str,
        constraints: &StreamConstraints,
    ) -> Result<P::Stream, CameraError> {
        let primary = match self.platform.get_user_media(constraints).await {
            Ok(stream) => return Ok(stream),
            Err(primary) => primary,
        };

        self.observer.acquisition_retry(surface_id, &primary);
        match self
            .platform
            .get_user_media(&StreamConstraints::fallback())
            .await
        {
            Ok(stream) => Ok(stream),
            Err(fallback) => {
                self.observer
                    .acquisition_failed(surface_id, &primary, &fallback);
                Err(CameraError::AcquisitionFailed { primary, fallback })
            }
        }
    }

    fn surface_lock(&self, surface_id: &str) -> Rc<Mutex<()>> {
        let mut locks = self.locks.borrow_mut();
        Rc::clone(
            locks
                .entry(surface_id.to_string())
                .or_insert_with(|| Rc::new(Mutex::new(()))),
        )
    }

    /// Drop the lock entry for `surface_id` once no other call holds or awaits it.
    fn forget_lock(&self, surface_id: &str, lock: Rc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.locks.borrow_mut();
        if locks
            .get(surface_id)
            .is_some_and(|lock| Rc::strong_count(lock) == 1)
        {
            locks.remove(surface_id);
        }
    }
}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::{HeadlessPlatform, LogObserver, PlatformError};

    fn controller(platform: &HeadlessPlatform) -> StreamController<HeadlessPlatform> {
        StreamController::new(Rc::new(platform.clone()), Rc::new(LogObserver))
    }

    #[tokio::test]
    async fn test_lock_entries_are_dropped_when_idle() {
        let platform = HeadlessPlatform::new();
        platform.add_display("a");
        platform.add_display("b");
        let controller = controller(&platform);

        controller
            .setup_camera("a", &CaptureOptions::default())
            .await
            .unwrap();
        controller
            .setup_camera("b", &CaptureOptions::default())
            .await
            .unwrap();

        assert!(controller.locks.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_lock_entry_is_dropped_after_failure() {
        let platform = HeadlessPlatform::new();
        platform.add_display("a");
        platform.reject_next(PlatformError::new("NotAllowedError", ""));
        platform.reject_next(PlatformError::new("NotAllowedError", ""));
        let controller = controller(&platform);

        assert!(controller
            .setup_camera("a", &CaptureOptions::default())
            .await
            .is_err());
        assert!(controller.locks.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_lock_entry_survives_while_a_call_waits() {
        let platform = HeadlessPlatform::new();
        platform.add_display("a");
        platform.hold_permissions();
        let controller = controller(&platform);
        let options = CaptureOptions::default();

        let (first, second, ()) = tokio::join!(
            controller.setup_camera("a", &options),
            controller.setup_camera("a", &options),
            async {
                tokio::task::yield_now().await;
                assert_eq!(controller.locks.borrow().len(), 1);
                platform.grant_permissions();
            }
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert!(controller.locks.borrow().is_empty());
    }
}
