//! In-memory host for running the camera helpers without a browser.
//!
//! Streams render a synthetic gradient and canvases encode real JPEG or PNG
//! bytes. Every browser behaviour the helpers react to (permission
//! rejection, slow permission prompts, late metadata, autoplay policy,
//! encoder failure) can be switched on per platform or per surface.

use crate::{
    DeviceInfo, DeviceKind, DisplaySurface, DrawingSurface, EncodedImage, FrameFormat,
    MediaStream, Platform, PlatformError, StreamConstraints, VideoConstraints,
};
use futures_util::future::LocalBoxFuture;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tokio::sync::Notify;

/// Resolution the simulated camera delivers when no size is requested.
pub const NATIVE_WIDTH: u32 = 1280;
pub const NATIVE_HEIGHT: u32 = 720;

// HTML canvas size before the first resize
const DEFAULT_CANVAS_WIDTH: u32 = 300;
const DEFAULT_CANVAS_HEIGHT: u32 = 150;

// browsers substitute this for out-of-range quality values
const DEFAULT_ENCODER_QUALITY: f64 = 0.92;

/// Document-wide switches shared with every surface.
#[derive(Debug, Default)]
struct Policy {
    autoplay_blocked: Cell<bool>,
    user_activated: Cell<bool>,
    defer_metadata: Cell<bool>,
}

struct Inner {
    policy: Rc<Policy>,
    capture_supported: Cell<bool>,
    native_size: Cell<(u32, u32)>,
    devices: RefCell<Vec<DeviceInfo>>,
    enumerate_error: RefCell<Option<PlatformError>>,
    rejections: RefCell<VecDeque<PlatformError>>,
    requests: RefCell<Vec<StreamConstraints>>,
    hold_permission: Cell<bool>,
    permission: Notify,
    next_stream: Cell<u32>,
    streams: RefCell<Vec<HeadlessStream>>,
    displays: RefCell<HashMap<String, HeadlessDisplay>>,
    canvases: RefCell<HashMap<String, HeadlessCanvas>>,
    interactions: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

/// In-memory [`Platform`]. Clones share the same document.
#[derive(Clone)]
pub struct HeadlessPlatform {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for HeadlessPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessPlatform")
            .field("capture_supported", &self.inner.capture_supported.get())
            .field("displays", &self.inner.displays.borrow().len())
            .field("canvases", &self.inner.canvases.borrow().len())
            .field("streams", &self.inner.streams.borrow().len())
            .field("interactions", &self.inner.interactions.borrow().len())
            .finish()
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// An empty document with capture support and no devices.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                policy: Rc::new(Policy::default()),
                capture_supported: Cell::new(true),
                native_size: Cell::new((NATIVE_WIDTH, NATIVE_HEIGHT)),
                devices: RefCell::new(Vec::new()),
                enumerate_error: RefCell::new(None),
                rejections: RefCell::new(VecDeque::new()),
                requests: RefCell::new(Vec::new()),
                hold_permission: Cell::new(false),
                permission: Notify::new(),
                next_stream: Cell::new(0),
                streams: RefCell::new(Vec::new()),
                displays: RefCell::new(HashMap::new()),
                canvases: RefCell::new(HashMap::new()),
                interactions: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Add a `<video>`-like surface. Replaces any surface with the same id.
    pub fn add_display(&self, id: &str) -> HeadlessDisplay {
        let display = HeadlessDisplay::new(Rc::clone(&self.inner.policy));
        self.inner
            .displays
            .borrow_mut()
            .insert(id.to_string(), display.clone());
        display
    }

    /// Add a `<canvas>`-like surface. Replaces any surface with the same id.
    pub fn add_canvas(&self, id: &str) -> HeadlessCanvas {
        let canvas = HeadlessCanvas::new();
        self.inner
            .canvases
            .borrow_mut()
            .insert(id.to_string(), canvas.clone());
        canvas
    }

    pub fn add_device(&self, device: DeviceInfo) {
        self.inner.devices.borrow_mut().push(device);
    }

    pub fn set_capture_supported(&self, supported: bool) {
        self.inner.capture_supported.set(supported);
    }

    /// Resolution delivered for unconstrained and exact-device requests.
    pub fn set_native_size(&self, width: u32, height: u32) {
        self.inner.native_size.set((width, height));
    }

    /// Make every later device enumeration fail with `error`.
    pub fn fail_enumeration(&self, error: PlatformError) {
        *self.inner.enumerate_error.borrow_mut() = Some(error);
    }

    /// Reject the next acquisition with `error`. Calls queue up.
    pub fn reject_next(&self, error: PlatformError) {
        self.inner.rejections.borrow_mut().push_back(error);
    }

    /// Keep acquisitions pending, as if the permission prompt were open.
    pub fn hold_permissions(&self) {
        self.inner.hold_permission.set(true);
    }

    /// Answer every pending and future permission prompt.
    pub fn grant_permissions(&self) {
        self.inner.hold_permission.set(false);
        self.inner.permission.notify_waiters();
    }

    /// Refuse `play()` until the user has interacted with the document.
    pub fn block_autoplay(&self, blocked: bool) {
        self.inner.policy.autoplay_blocked.set(blocked);
    }

    /// Keep newly attached streams without metadata until
    /// [`HeadlessDisplay::load_metadata`] is called.
    pub fn defer_metadata(&self, deferred: bool) {
        self.inner.policy.defer_metadata.set(deferred);
    }

    /// Every constraint set passed to acquisition, in call order.
    pub fn requests(&self) -> Vec<StreamConstraints> {
        self.inner.requests.borrow().clone()
    }

    /// Every stream handed out so far, stopped or not.
    pub fn streams(&self) -> Vec<HeadlessStream> {
        self.inner.streams.borrow().clone()
    }

    pub fn live_stream_count(&self) -> usize {
        self.inner
            .streams
            .borrow()
            .iter()
            .filter(|stream| stream.is_live())
            .count()
    }

    /// Interaction tasks still waiting for a click or key press.
    pub fn pending_interactions(&self) -> usize {
        self.inner.interactions.borrow().len()
    }

    /// Simulate a click: mark the user as active and run every pending
    /// interaction task once.
    pub async fn interact(&self) {
        self.inner.policy.user_activated.set(true);
        let tasks = std::mem::take(&mut *self.inner.interactions.borrow_mut());
        for task in tasks {
            task.await;
        }
    }

    fn known_video_device(&self, device_id: &str) -> bool {
        self.inner
            .devices
            .borrow()
            .iter()
            .any(|device| device.kind() == DeviceKind::VideoInput && device.device_id() == device_id)
    }
}

impl Platform for HeadlessPlatform {
    type Stream = HeadlessStream;
    type Display = HeadlessDisplay;
    type Drawing = HeadlessCanvas;

    fn supports_capture(&self) -> bool {
        self.inner.capture_supported.get()
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, PlatformError> {
        if let Some(error) = self.inner.enumerate_error.borrow().clone() {
            return Err(error);
        }
        Ok(self.inner.devices.borrow().clone())
    }

    async fn get_user_media(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<HeadlessStream, PlatformError> {
        self.inner.requests.borrow_mut().push(constraints.clone());

        while self.inner.hold_permission.get() {
            self.inner.permission.notified().await;
        }

        let rejection = self.inner.rejections.borrow_mut().pop_front();
        if let Some(error) = rejection {
            return Err(error);
        }

        let size = match constraints.video() {
            VideoConstraints::Any => self.inner.native_size.get(),
            VideoConstraints::Preferred { width, height, .. } => (*width, *height),
            VideoConstraints::Device { device_id } => {
                if !self.known_video_device(device_id) {
                    return Err(PlatformError::new(
                        "OverconstrainedError",
                        format!("no video input with deviceId {device_id}"),
                    ));
                }
                self.inner.native_size.get()
            }
        };

        let index = self.inner.next_stream.get();
        self.inner.next_stream.set(index + 1);

        let stream = HeadlessStream {
            state: Rc::new(StreamState {
                id: format!("headless-stream-{index}"),
                size,
                shade: (index as u8).wrapping_mul(40),
                live: Cell::new(true),
            }),
        };
        self.inner.streams.borrow_mut().push(stream.clone());
        log::debug!("granted {} at {}x{}", stream.state.id, size.0, size.1);
        Ok(stream)
    }

    fn display_surface(&self, id: &str) -> Option<HeadlessDisplay> {
        self.inner.displays.borrow().get(id).cloned()
    }

    fn drawing_surface(&self, id: &str) -> Option<HeadlessCanvas> {
        self.inner.canvases.borrow().get(id).cloned()
    }

    fn on_next_interaction(&self, task: LocalBoxFuture<'static, ()>) {
        self.inner.interactions.borrow_mut().push(task);
    }
}

#[derive(Debug)]
struct StreamState {
    id: String,
    size: (u32, u32),
    shade: u8,
    live: Cell<bool>,
}

/// Simulated camera stream with a single video track.
#[derive(Clone, Debug)]
pub struct HeadlessStream {
    state: Rc<StreamState>,
}

impl HeadlessStream {
    /// Resolution the simulated camera delivers.
    pub fn size(&self) -> (u32, u32) {
        self.state.size
    }

    pub fn is_live(&self) -> bool {
        self.state.live.get()
    }

    /// Render the current frame scaled to `width` x `height`.
    fn render(&self, width: u32, height: u32) -> RgbImage {
        let shade = self.state.shade;
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                shade,
            ])
        })
    }
}

impl MediaStream for HeadlessStream {
    fn id(&self) -> String {
        self.state.id.clone()
    }

    fn stop_tracks(&self) {
        self.state.live.set(false);
    }

    fn live_track_count(&self) -> usize {
        usize::from(self.state.live.get())
    }
}

#[derive(Debug, Default)]
struct DisplayState {
    stream: RefCell<Option<HeadlessStream>>,
    metadata: Cell<bool>,
    playing: Cell<bool>,
    play_attempts: Cell<u32>,
    metadata_ready: Notify,
}

/// Simulated `<video>` element.
#[derive(Clone, Debug)]
pub struct HeadlessDisplay {
    state: Rc<DisplayState>,
    policy: Rc<Policy>,
}

impl HeadlessDisplay {
    fn new(policy: Rc<Policy>) -> Self {
        Self {
            state: Rc::new(DisplayState::default()),
            policy,
        }
    }

    /// Deliver metadata for the attached stream, waking any waiter.
    pub fn load_metadata(&self) {
        if self.state.stream.borrow().is_some() {
            self.state.metadata.set(true);
            self.state.metadata_ready.notify_waiters();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing.get()
    }

    pub fn play_attempts(&self) -> u32 {
        self.state.play_attempts.get()
    }

    pub fn stream_id(&self) -> Option<String> {
        self.state.stream.borrow().as_ref().map(|stream| stream.id())
    }
}

impl DisplaySurface for HeadlessDisplay {
    type Stream = HeadlessStream;

    fn stream(&self) -> Option<HeadlessStream> {
        self.state.stream.borrow().clone()
    }

    fn attach(&self, stream: Option<&HeadlessStream>) {
        *self.state.stream.borrow_mut() = stream.cloned();
        self.state.playing.set(false);
        self.state.metadata.set(false);
        if stream.is_some() && !self.policy.defer_metadata.get() {
            self.load_metadata();
        }
    }

    fn has_metadata(&self) -> bool {
        self.state.metadata.get()
    }

    async fn metadata_loaded(&self) {
        while !self.has_metadata() {
            self.state.metadata_ready.notified().await;
        }
    }

    async fn play(&self) -> Result<(), PlatformError> {
        self.state
            .play_attempts
            .set(self.state.play_attempts.get() + 1);

        if self.state.stream.borrow().is_none() {
            return Err(PlatformError::new(
                "NotSupportedError",
                "no stream attached to play",
            ));
        }
        if self.policy.autoplay_blocked.get() && !self.policy.user_activated.get() {
            return Err(PlatformError::new(
                "NotAllowedError",
                "play() failed because the user didn't interact with the document first",
            ));
        }

        self.state.playing.set(true);
        Ok(())
    }

    fn video_size(&self) -> (u32, u32) {
        if !self.has_metadata() {
            return (0, 0);
        }
        self.state
            .stream
            .borrow()
            .as_ref()
            .map_or((0, 0), HeadlessStream::size)
    }
}

#[derive(Debug)]
struct CanvasState {
    pixels: RefCell<RgbImage>,
    encode_disabled: Cell<bool>,
}

/// Simulated `<canvas>` element with an RGB pixel buffer.
#[derive(Clone, Debug)]
pub struct HeadlessCanvas {
    state: Rc<CanvasState>,
}

impl HeadlessCanvas {
    fn new() -> Self {
        Self {
            state: Rc::new(CanvasState {
                pixels: RefCell::new(RgbImage::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)),
                encode_disabled: Cell::new(false),
            }),
        }
    }

    /// Make the encoder yield no data, like `toBlob` calling back with `null`.
    pub fn fail_encoding(&self, failing: bool) {
        self.state.encode_disabled.set(failing);
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let pixels = self.state.pixels.borrow();
        if x < pixels.width() && y < pixels.height() {
            Some(pixels.get_pixel(x, y).0)
        } else {
            None
        }
    }
}

impl DrawingSurface for HeadlessCanvas {
    type Source = HeadlessDisplay;

    fn resize(&self, width: u32, height: u32) {
        *self.state.pixels.borrow_mut() = RgbImage::new(width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.state.pixels.borrow().dimensions()
    }

    fn draw(
        &self,
        source: &HeadlessDisplay,
        width: u32,
        height: u32,
    ) -> Result<(), PlatformError> {
        // a video without a live, loaded stream draws nothing
        let Some(stream) = source.stream() else {
            return Ok(());
        };
        if !stream.is_live() || !source.has_metadata() {
            return Ok(());
        }

        let frame = stream.render(width, height);
        image::imageops::replace(&mut *self.state.pixels.borrow_mut(), &frame, 0, 0);
        Ok(())
    }

    async fn encode(&self, format: &FrameFormat) -> Result<Option<EncodedImage>, PlatformError> {
        if self.state.encode_disabled.get() {
            return Ok(None);
        }

        let pixels = self.state.pixels.borrow();
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let mut data = Vec::new();
        let media_type = match format.media_type() {
            "image/jpeg" => {
                JpegEncoder::new_with_quality(&mut data, jpeg_quality(format.quality()))
                    .write_image(pixels.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(encode_error)?;
                "image/jpeg"
            }
            // anything else falls back to PNG, as toBlob does
            _ => {
                PngEncoder::new(&mut data)
                    .write_image(pixels.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(encode_error)?;
                "image/png"
            }
        };

        Ok(Some(EncodedImage {
            media_type: media_type.to_string(),
            data,
        }))
    }
}

fn jpeg_quality(quality: f64) -> u8 {
    let quality = if (0.0..=1.0).contains(&quality) {
        quality
    } else {
        DEFAULT_ENCODER_QUALITY
    };
    ((quality * 100.0).round() as u8).max(1)
}

fn encode_error(err: image::ImageError) -> PlatformError {
    PlatformError::new("EncodingError", err.to_string())
}
