/// Route prefix the static audio directory is mounted under.
pub const STATIC_PREFIX: &str = "/static";

/// Scheme and authority (host plus optional port) of the request being
/// answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }
}

/// Absolute playback URL for `filename` as seen from `origin`.
pub fn audio_url(origin: &RequestOrigin, filename: &str) -> String {
    format!(
        "{}://{}{}/{}",
        origin.scheme,
        origin.host.trim_end_matches('/'),
        STATIC_PREFIX,
        filename.trim_start_matches('/')
    )
}
