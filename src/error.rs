use failure::Fail;

/// Generic alert text for any run that aborts before a plate is read.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process the image. Please try again.";

#[derive(Debug, Fail)]
pub enum CaptureError {
    #[fail(display = "Camera permission not granted")]
    PermissionDenied,
    #[fail(display = "No photo URI returned from camera")]
    NoImage,
    #[fail(display = "Unable to read captured image {}: {}", uri, reason)]
    Unreadable { uri: String, reason: String },
}

#[derive(Debug, Fail)]
pub enum EncodingError {
    #[fail(display = "Unable to decode captured image: {}", _0)]
    Decode(String),
    #[fail(display = "Unable to encode JPEG payload: {}", _0)]
    Encode(String),
}

/// Failure talking to one of the remote services.
#[derive(Debug, Fail)]
pub enum ClientError {
    #[fail(display = "API Error: {} - {}", status, body)]
    Status { status: u16, body: String },
    #[fail(display = "Request timed out")]
    Timeout,
    #[fail(display = "Network error: {}", _0)]
    Transport(String),
    #[fail(display = "Malformed response: {}", _0)]
    Protocol(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Protocol(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

/// Anything that aborts a run before the plate text is known.
#[derive(Debug, Fail)]
pub enum RunError {
    #[fail(display = "{}", _0)]
    Capture(CaptureError),
    #[fail(display = "{}", _0)]
    Encoding(EncodingError),
    #[fail(display = "{}", _0)]
    Detection(ClientError),
}

impl From<CaptureError> for RunError {
    fn from(e: CaptureError) -> Self {
        RunError::Capture(e)
    }
}

impl From<EncodingError> for RunError {
    fn from(e: EncodingError) -> Self {
        RunError::Encoding(e)
    }
}

impl From<ClientError> for RunError {
    fn from(e: ClientError) -> Self {
        RunError::Detection(e)
    }
}

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "Invalid {} URL '{}': {}", name, url, reason)]
    InvalidUrl {
        name: &'static str,
        url: String,
        reason: String,
    },
    #[fail(display = "Request timeout must be greater than zero")]
    ZeroTimeout,
    #[fail(display = "Unable to build HTTP client: {}", _0)]
    HttpClient(String),
}
