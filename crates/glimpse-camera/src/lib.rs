//! Camera capture helpers for browser-like hosts.
//!
//! This crate acquires a camera stream onto a display surface, snapshots
//! frames through a drawing surface, and releases the stream again. All host
//! access goes through the [`Platform`] trait, with a `web-sys` backend
//! (feature `web`) and an in-memory backend (feature `headless`).

pub mod camera;
pub mod capturer;
pub mod config;
pub mod constraints;
pub mod controller;
pub mod device;
pub mod enumerator;
pub mod error;
pub mod frame;
pub mod observer;
pub mod session;
pub mod traits;

#[cfg(feature = "headless")]
pub mod headless;

#[cfg(feature = "web")]
pub mod web;

pub use camera::Camera;
pub use capturer::FrameCapturer;
pub use config::{CaptureOptions, FacingMode, FrameFormat};
pub use constraints::{StreamConstraints, VideoConstraints};
pub use controller::StreamController;
pub use device::{DeviceInfo, DeviceKind};
pub use enumerator::DeviceEnumerator;
pub use error::{CameraError, PlatformError, SurfaceKind};
pub use frame::{CapturedFrame, EncodedImage};
pub use observer::{CameraObserver, LogObserver};
pub use session::CameraSession;
pub use traits::{DisplaySurface, DrawingSurface, MediaStream, Platform};

#[cfg(feature = "headless")]
pub use headless::HeadlessPlatform;

#[cfg(feature = "web")]
pub use web::WebPlatform;
