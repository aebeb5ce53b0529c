//! Browser backend over `web-sys`.
//!
//! Display surfaces are `<video>` elements, drawing surfaces are `<canvas>`
//! elements, both looked up by id in the window's document.

use crate::{
    CameraError, DeviceInfo, DeviceKind, DisplaySurface, DrawingSurface, EncodedImage,
    FrameFormat, MediaStream, Platform, PlatformError, StreamConstraints, VideoConstraints,
};
use futures_util::future::LocalBoxFuture;
use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    AddEventListenerOptions, Blob, CanvasRenderingContext2d, Document, DomException, Event,
    EventTarget, HtmlCanvasElement, HtmlVideoElement, MediaDeviceInfo, MediaDeviceKind,
    MediaDevices, MediaStream as DomMediaStream, MediaStreamConstraints, MediaStreamTrack,
    MediaStreamTrackState, Window,
};

// HTMLMediaElement.HAVE_METADATA
const HAVE_METADATA: u16 = 1;

const INTERACTION_EVENTS: [&str; 2] = ["click", "keydown"];

impl From<JsValue> for PlatformError {
    fn from(value: JsValue) -> Self {
        if let Some(exception) = value.dyn_ref::<DomException>() {
            return PlatformError::new(exception.name(), exception.message());
        }
        if let Some(error) = value.dyn_ref::<js_sys::Error>() {
            return PlatformError::new(String::from(error.name()), String::from(error.message()));
        }
        let message = value.as_string().unwrap_or_else(|| format!("{value:?}"));
        PlatformError::new("Error", message)
    }
}

/// The browser window's document and `navigator.mediaDevices`.
#[derive(Clone, Debug)]
pub struct WebPlatform {
    window: Window,
    document: Document,
}

impl WebPlatform {
    /// Bind to the global window.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Unsupported` outside a window context (e.g. in a worker).
    pub fn new() -> Result<Self, CameraError> {
        let window = web_sys::window()
            .ok_or_else(|| CameraError::Unsupported("no global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| CameraError::Unsupported("window has no document".to_string()))?;
        Ok(Self { window, document })
    }

    fn media_devices(&self) -> Result<MediaDevices, PlatformError> {
        let devices = self.window.navigator().media_devices()?;
        // insecure contexts have no navigator.mediaDevices at all
        if JsValue::from(devices.clone()).is_undefined() {
            return Err(PlatformError::new(
                "NotSupportedError",
                "navigator.mediaDevices is unavailable",
            ));
        }
        Ok(devices)
    }
}

impl Platform for WebPlatform {
    type Stream = WebStream;
    type Display = WebDisplay;
    type Drawing = WebCanvas;

    fn supports_capture(&self) -> bool {
        match self.media_devices() {
            Ok(devices) => Reflect::has(&devices, &JsValue::from_str("getUserMedia")).unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, PlatformError> {
        let promise = self.media_devices()?.enumerate_devices()?;
        let list = JsFuture::from(promise).await?;
        Ok(Array::from(&list)
            .iter()
            .filter_map(|entry| entry.dyn_into::<MediaDeviceInfo>().ok())
            .filter_map(|info| device_info(&info))
            .collect())
    }

    async fn get_user_media(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<WebStream, PlatformError> {
        let request = MediaStreamConstraints::new();
        request.set_audio(&JsValue::from_bool(constraints.audio()));
        request.set_video(&video_constraints(constraints.video())?);

        let promise = self
            .media_devices()?
            .get_user_media_with_constraints(&request)?;
        let stream = JsFuture::from(promise).await?;
        Ok(WebStream(stream.unchecked_into::<DomMediaStream>()))
    }

    fn display_surface(&self, id: &str) -> Option<WebDisplay> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlVideoElement>()
            .ok()
            .map(WebDisplay)
    }

    fn drawing_surface(&self, id: &str) -> Option<WebCanvas> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()
            .map(WebCanvas)
    }

    fn on_next_interaction(&self, task: LocalBoxFuture<'static, ()>) {
        let target: EventTarget = self.document.clone().unchecked_into();
        let task = Rc::new(RefCell::new(Some(task)));
        let listener: Rc<RefCell<Option<Closure<dyn FnMut(Event)>>>> = Rc::new(RefCell::new(None));

        let closure = Closure::<dyn FnMut(Event)>::new({
            let target = target.clone();
            let listener = Rc::clone(&listener);
            move |_event: Event| {
                let registered = listener.borrow_mut().take();
                if let Some(registered) = &registered {
                    let function: &Function = registered.as_ref().unchecked_ref();
                    for event in INTERACTION_EVENTS {
                        let _ = target.remove_event_listener_with_callback(event, function);
                    }
                }
                if let Some(task) = task.borrow_mut().take() {
                    // the closure must outlive its own invocation, so it is dropped by the task
                    spawn_local(async move {
                        task.await;
                        drop(registered);
                    });
                }
            }
        });

        let function: &Function = closure.as_ref().unchecked_ref();
        for event in INTERACTION_EVENTS {
            if let Err(err) = target.add_event_listener_with_callback(event, function) {
                log::warn!("could not listen for {event}: {}", PlatformError::from(err));
            }
        }
        *listener.borrow_mut() = Some(closure);
    }
}

fn device_info(info: &MediaDeviceInfo) -> Option<DeviceInfo> {
    let kind = match info.kind() {
        MediaDeviceKind::Videoinput => DeviceKind::VideoInput,
        MediaDeviceKind::Audioinput => DeviceKind::AudioInput,
        MediaDeviceKind::Audiooutput => DeviceKind::AudioOutput,
        _ => return None,
    };
    Some(DeviceInfo::new(
        info.device_id(),
        info.group_id(),
        kind,
        info.label(),
    ))
}

fn video_constraints(video: &VideoConstraints) -> Result<JsValue, PlatformError> {
    match video {
        VideoConstraints::Any => Ok(JsValue::TRUE),
        VideoConstraints::Preferred {
            width,
            height,
            facing_mode,
        } => {
            let object = Object::new();
            Reflect::set(&object, &"width".into(), &JsValue::from(*width))?;
            Reflect::set(&object, &"height".into(), &JsValue::from(*height))?;
            Reflect::set(&object, &"facingMode".into(), &facing_mode.as_str().into())?;
            Ok(object.into())
        }
        VideoConstraints::Device { device_id } => {
            let exact = Object::new();
            Reflect::set(&exact, &"exact".into(), &device_id.as_str().into())?;
            let object = Object::new();
            Reflect::set(&object, &"deviceId".into(), &exact)?;
            Ok(object.into())
        }
    }
}

/// A `MediaStream` obtained from `getUserMedia`.
#[derive(Clone, Debug)]
pub struct WebStream(DomMediaStream);

impl WebStream {
    pub fn as_media_stream(&self) -> &DomMediaStream {
        &self.0
    }

    fn tracks(&self) -> Vec<MediaStreamTrack> {
        self.0
            .get_tracks()
            .iter()
            .map(|track| track.unchecked_into::<MediaStreamTrack>())
            .collect()
    }
}

impl MediaStream for WebStream {
    fn id(&self) -> String {
        self.0.id()
    }

    fn stop_tracks(&self) {
        self.tracks().iter().for_each(MediaStreamTrack::stop);
    }

    fn live_track_count(&self) -> usize {
        self.tracks()
            .iter()
            .filter(|track| track.ready_state() == MediaStreamTrackState::Live)
            .count()
    }
}

/// A `<video>` element.
#[derive(Clone, Debug)]
pub struct WebDisplay(HtmlVideoElement);

impl DisplaySurface for WebDisplay {
    type Stream = WebStream;

    fn stream(&self) -> Option<WebStream> {
        self.0.src_object().map(WebStream)
    }

    fn attach(&self, stream: Option<&WebStream>) {
        self.0.set_src_object(stream.map(WebStream::as_media_stream));
    }

    fn has_metadata(&self) -> bool {
        self.0.ready_state() >= HAVE_METADATA
    }

    async fn metadata_loaded(&self) {
        let video = self.0.clone();
        let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
            let options = AddEventListenerOptions::new();
            options.set_once(true);
            if let Err(err) = video.add_event_listener_with_callback_and_add_event_listener_options(
                "loadedmetadata",
                &resolve,
                &options,
            ) {
                log::warn!("could not wait for metadata: {}", PlatformError::from(err));
                let _ = resolve.call0(&JsValue::UNDEFINED);
            }
        });
        let _ = JsFuture::from(promise).await;
    }

    async fn play(&self) -> Result<(), PlatformError> {
        JsFuture::from(self.0.play()?).await?;
        Ok(())
    }

    fn video_size(&self) -> (u32, u32) {
        (self.0.video_width(), self.0.video_height())
    }
}

/// A `<canvas>` element drawn through its 2d context.
#[derive(Clone, Debug)]
pub struct WebCanvas(HtmlCanvasElement);

impl WebCanvas {
    fn context(&self) -> Result<CanvasRenderingContext2d, PlatformError> {
        self.0
            .get_context("2d")?
            .ok_or_else(|| PlatformError::new("NotSupportedError", "2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PlatformError::new("TypeError", "2d context has an unexpected type"))
    }
}

impl DrawingSurface for WebCanvas {
    type Source = WebDisplay;

    fn resize(&self, width: u32, height: u32) {
        self.0.set_width(width);
        self.0.set_height(height);
    }

    fn size(&self) -> (u32, u32) {
        (self.0.width(), self.0.height())
    }

    fn draw(&self, source: &WebDisplay, width: u32, height: u32) -> Result<(), PlatformError> {
        self.context()?
            .draw_image_with_html_video_element_and_dw_and_dh(
                &source.0,
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            )?;
        Ok(())
    }

    async fn encode(&self, format: &FrameFormat) -> Result<Option<EncodedImage>, PlatformError> {
        let canvas = self.0.clone();
        let media_type = format.media_type().to_string();
        let quality = JsValue::from_f64(format.quality());
        let promise = Promise::new(&mut |resolve: Function, reject: Function| {
            if let Err(err) =
                canvas.to_blob_with_type_and_encoder_options(&resolve, &media_type, &quality)
            {
                let _ = reject.call1(&JsValue::UNDEFINED, &err);
            }
        });

        let value = JsFuture::from(promise).await?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }

        let blob: Blob = value.unchecked_into();
        let buffer = JsFuture::from(blob.array_buffer()).await?;
        Ok(Some(EncodedImage {
            media_type: blob.type_(),
            data: Uint8Array::new(&buffer).to_vec(),
        }))
    }
}
