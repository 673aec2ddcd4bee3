//! Reference-image helpers
//!
//! Callers hand the reference image over as a URL, a `data:image/...` URI or
//! bare base64. These helpers classify the input and produce the data URI the
//! upstream expects.

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Prefix applied to bare base64 payloads
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Shape of a caller-supplied reference image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageInput<'a> {
    /// `http://` or `https://` URL that must be downloaded
    Remote(&'a str),
    /// Already a `data:image` URI
    DataUri(&'a str),
    /// Bare base64 payload
    Base64(&'a str),
    /// Anything else; the request falls back to text only
    Unsupported,
}

impl<'a> ImageInput<'a> {
    pub fn classify(input: &'a str) -> Self {
        let input = input.trim();
        if input.starts_with("http://") || input.starts_with("https://") {
            Self::Remote(input)
        } else if input.starts_with("data:image") {
            Self::DataUri(input)
        } else if is_base64(input) {
            Self::Base64(input)
        } else {
            Self::Unsupported
        }
    }
}

/// Whether `input` decodes as standard base64
pub fn is_base64(input: &str) -> bool {
    !input.is_empty() && STANDARD.decode(input).is_ok()
}

/// Detect the image MIME type from magic bytes
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

/// Encode downloaded bytes as a data URI, or `None` if they are not an image
pub fn encode_data_uri(bytes: &[u8]) -> Option<String> {
    let mime = sniff_mime(bytes)?;
    Some(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// Prefix a bare base64 payload
pub fn base64_to_data_uri(payload: &str) -> String {
    format!("{}{}", JPEG_DATA_URI_PREFIX, payload)
}
