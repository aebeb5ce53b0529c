use crate::MediaStream;

/// Record of one successful acquisition: which surface the stream was
/// attached to and the stream itself.
///
/// Pass it back to `stop_session` or `capture_session_frame` instead of
/// looking the stream up on the surface again.
#[derive(Clone, Debug)]
pub struct CameraSession<S: MediaStream> {
    surface_id: String,
    stream: S,
}

impl<S: MediaStream> CameraSession<S> {
    pub(crate) fn new(surface_id: &str, stream: S) -> Self {
        Self {
            surface_id: surface_id.to_string(),
            stream,
        }
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn into_stream(self) -> S {
        self.stream
    }

    /// Whether the session's stream still has at least one live track.
    pub fn is_live(&self) -> bool {
        self.stream.live_track_count() > 0
    }

    /// Whether `other` is the very same platform stream as this session's.
    pub(crate) fn owns(&self, other: &S) -> bool {
        self.stream.id() == other.id()
    }
}
