use crate::{DeviceInfo, EncodedImage, FrameFormat, PlatformError, StreamConstraints};
use futures_util::future::LocalBoxFuture;

/// Handle to a live capture stream.
///
/// Clones refer to the same underlying stream.
pub trait MediaStream: Clone + 'static {
    /// Platform identifier, unique per acquisition.
    fn id(&self) -> String;

    /// Stop every track of the stream. Stopping an ended track is a no-op.
    fn stop_tracks(&self);

    /// Number of tracks that have not been stopped.
    fn live_track_count(&self) -> usize;
}

/// Element that renders a live stream (`<video>`).
#[allow(async_fn_in_trait)]
pub trait DisplaySurface: Clone + 'static {
    type Stream: MediaStream;

    /// The stream currently bound to the surface, if any.
    fn stream(&self) -> Option<Self::Stream>;

    /// Bind `stream`, or clear the binding with `None`.
    fn attach(&self, stream: Option<&Self::Stream>);

    /// Whether stream metadata (and with it the intrinsic size) is available.
    fn has_metadata(&self) -> bool;

    /// Resolve once metadata becomes available.
    ///
    /// Implementations may assume the caller checked `has_metadata` first.
    async fn metadata_loaded(&self);

    /// Start playback. Hosts reject this when it needs a user gesture.
    async fn play(&self) -> Result<(), PlatformError>;

    /// Intrinsic `(width, height)` of the current frame, `(0, 0)` if unknown.
    fn video_size(&self) -> (u32, u32);
}

/// Element used as a pixel buffer to rasterize and encode one frame (`<canvas>`).
#[allow(async_fn_in_trait)]
pub trait DrawingSurface {
    type Source: DisplaySurface;

    /// Resize the pixel buffer. Resizing clears it.
    fn resize(&self, width: u32, height: u32);

    /// Current `(width, height)` of the pixel buffer.
    fn size(&self) -> (u32, u32);

    /// Draw the current frame of `source` at the origin, scaled to `width` x `height`.
    fn draw(&self, source: &Self::Source, width: u32, height: u32) -> Result<(), PlatformError>;

    /// Encode the pixel buffer. `Ok(None)` means the host produced no data.
    async fn encode(&self, format: &FrameFormat) -> Result<Option<EncodedImage>, PlatformError>;
}

/// The host document and its media capabilities.
///
/// Everything the camera helpers need from a browser goes through here, so
/// the same logic runs against `web-sys` or an in-memory host.
#[allow(async_fn_in_trait)]
pub trait Platform: 'static {
    type Stream: MediaStream;
    type Display: DisplaySurface<Stream = Self::Stream>;
    type Drawing: DrawingSurface<Source = Self::Display>;

    /// Whether the host exposes a stream acquisition API at all.
    fn supports_capture(&self) -> bool;

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, PlatformError>;

    /// Acquire a stream. May suspend on a permission prompt.
    async fn get_user_media(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Self::Stream, PlatformError>;

    fn display_surface(&self, id: &str) -> Option<Self::Display>;

    fn drawing_surface(&self, id: &str) -> Option<Self::Drawing>;

    /// Run `task` once, on the next click or key press in the document.
    ///
    /// The listener removes itself before `task` starts.
    fn on_next_interaction(&self, task: LocalBoxFuture<'static, ()>);
}
