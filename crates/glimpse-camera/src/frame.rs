/// Bytes produced by a drawing surface's encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedImage {
    /// Media type the encoder actually produced. Hosts fall back to PNG for
    /// types they cannot encode, so this can differ from the request.
    pub media_type: String,
    pub data: Vec<u8>,
}

/// A single encoded still frame, handed over to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedFrame {
    media_type: String,
    quality: f64,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CapturedFrame {
    pub fn new(image: EncodedImage, quality: f64, width: u32, height: u32) -> Self {
        Self {
            media_type: image.media_type,
            quality,
            width,
            height,
            data: image.data,
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Quality factor that was requested from the encoder.
    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
