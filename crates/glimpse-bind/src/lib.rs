//! JavaScript bindings for the camera helpers.
//!
//! Page scripts import this module, call `init()` once, create a
//! `GlimpseCamera` and wire its methods to their own buttons and templates.
//! Nothing is installed on `window`.

use glimpse_camera::web::WebPlatform;
use glimpse_camera::{Camera, CameraError, CaptureOptions, CapturedFrame, DeviceInfo, FrameFormat};
use js_sys::{Array, Object, Promise, Reflect, Uint8Array};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Blob, BlobPropertyBag};

/// Install the console logger. Safe to call more than once.
#[wasm_bindgen]
pub fn init() {
    glimpse_base::init_logger();
    log::debug!("glimpse bindings ready");
}

/// Camera helpers bound to the current page.
#[wasm_bindgen]
pub struct GlimpseCamera {
    camera: Rc<Camera<WebPlatform>>,
}

#[wasm_bindgen]
impl GlimpseCamera {
    /// Throws outside a window context.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<GlimpseCamera, JsValue> {
        let platform = WebPlatform::new().map_err(js_error)?;
        Ok(Self {
            camera: Rc::new(Camera::new(platform)),
        })
    }

    /// Resolves to `[{ deviceId, groupId, kind, label }]` for video inputs.
    #[wasm_bindgen(js_name = listVideoDevices)]
    pub fn list_video_devices(&self) -> Promise {
        let camera = Rc::clone(&self.camera);
        future_to_promise(async move {
            let devices = camera.list_video_devices().await.map_err(js_error)?;
            let entries = devices
                .iter()
                .map(device_object)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries.into_iter().collect::<Array>().into())
        })
    }

    /// Resolves to the `MediaStream` now attached to `#videoId`.
    #[wasm_bindgen(js_name = setupCamera)]
    pub fn setup_camera(&self, video_id: String, options: JsValue) -> Promise {
        let camera = Rc::clone(&self.camera);
        future_to_promise(async move {
            let options = capture_options(&options)?;
            let session = camera
                .setup_camera(&video_id, &options)
                .await
                .map_err(js_error)?;
            Ok(session.stream().as_media_stream().clone().into())
        })
    }

    /// Resolves to a `Blob` holding the current frame of `#videoId`.
    #[wasm_bindgen(js_name = captureFrame)]
    pub fn capture_frame(
        &self,
        video_id: String,
        canvas_id: String,
        media_type: Option<String>,
        quality: Option<f64>,
    ) -> Promise {
        let camera = Rc::clone(&self.camera);
        future_to_promise(async move {
            let mut format = FrameFormat::default();
            if let Some(media_type) = media_type {
                format = format.with_media_type(media_type);
            }
            if let Some(quality) = quality {
                format = format.with_quality(quality);
            }
            let frame = camera
                .capture_frame(&video_id, &canvas_id, &format)
                .await
                .map_err(js_error)?;
            Ok(frame_blob(&frame)?.into())
        })
    }

    #[wasm_bindgen(js_name = stopCamera)]
    pub fn stop_camera(&self, video_id: &str) {
        self.camera.stop_camera(video_id);
    }
}

fn js_error(err: CameraError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn device_object(device: &DeviceInfo) -> Result<JsValue, JsValue> {
    let object = Object::new();
    Reflect::set(&object, &"deviceId".into(), &device.device_id().into())?;
    Reflect::set(&object, &"groupId".into(), &device.group_id().into())?;
    Reflect::set(&object, &"kind".into(), &device.kind().as_str().into())?;
    Reflect::set(&object, &"label".into(), &device.label().into())?;
    Ok(object.into())
}

fn capture_options(value: &JsValue) -> Result<CaptureOptions, JsValue> {
    let mut options = CaptureOptions::default();
    if value.is_undefined() || value.is_null() {
        return Ok(options);
    }

    if let Some(width) = number_field(value, "width")? {
        options = options.with_width(width);
    }
    if let Some(height) = number_field(value, "height")? {
        options = options.with_height(height);
    }
    if let Some(facing_mode) = string_field(value, "facingMode")? {
        options = options.with_facing_mode(facing_mode.parse().map_err(js_error)?);
    }
    if let Some(device_id) = string_field(value, "deviceId")? {
        options = options.with_device_id(device_id);
    }
    Ok(options)
}

fn number_field(value: &JsValue, name: &str) -> Result<Option<u32>, JsValue> {
    let field = Reflect::get(value, &name.into())?;
    if field.is_undefined() || field.is_null() {
        return Ok(None);
    }
    let number = field.as_f64().ok_or_else(|| {
        js_error(CameraError::InvalidOption(format!("{name} must be a number")))
    })?;
    dimension(name, number).map(Some).map_err(js_error)
}

/// Whole pixel count in `0..=u32::MAX`.
fn dimension(name: &str, number: f64) -> Result<u32, CameraError> {
    if number.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&number) {
        Ok(number as u32)
    } else {
        Err(CameraError::InvalidOption(format!(
            "{name} must be a whole number of pixels, got {number}"
        )))
    }
}

fn string_field(value: &JsValue, name: &str) -> Result<Option<String>, JsValue> {
    let field = Reflect::get(value, &name.into())?;
    if field.is_undefined() || field.is_null() {
        return Ok(None);
    }
    field
        .as_string()
        .map(Some)
        .ok_or_else(|| js_error(CameraError::InvalidOption(format!("{name} must be a string"))))
}

fn frame_blob(frame: &CapturedFrame) -> Result<Blob, JsValue> {
    let parts = Array::of1(&Uint8Array::from(frame.data()).into());
    let properties = BlobPropertyBag::new();
    properties.set_type(frame.media_type());
    Blob::new_with_u8_array_sequence_and_options(&parts, &properties)
}
