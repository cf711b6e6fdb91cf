//! Payload normalization
//!
//! Strips data-URI prefixes from image payloads and infers the MIME type
//! from the declared prefix or from magic-byte sniffing

/// Maximum accepted base64 payload size for images and audio (5 MB encoded)
pub const MAX_MEDIA_BASE64_BYTES: usize = 5 * 1024 * 1024;

/// Base64 prefixes of the recognized image magic bytes.
///
/// Sniffing the base64 text directly avoids decoding the whole payload:
/// the first bytes of JPEG/PNG/GIF/WEBP encode to stable prefixes.
const MAGIC_PREFIXES: &[(&str, &str)] = &[
    ("/9j/", "image/jpeg"),
    ("iVBOR", "image/png"),
    ("R0lGO", "image/gif"),
    ("UklGR", "image/webp"),
];

/// Normalize an image payload into `(mime_type, base64_data)`.
///
/// Accepts either a `data:<mime>;base64,<data>` URI or bare base64 text.
/// Never fails: unrecognized content is passed through with a JPEG guess.
pub fn normalize_image(raw: &str) -> (String, String) {
    if let Some(rest) = raw.strip_prefix("data:") {
        if let Some((mime, data)) = rest.split_once(";base64,") {
            if !mime.is_empty() {
                return (mime.to_string(), data.to_string());
            }
            return (sniff_mime(data).to_string(), data.to_string());
        }
    }

    (sniff_mime(raw).to_string(), raw.to_string())
}

/// Infer a MIME type from the base64 text prefix, defaulting to JPEG
fn sniff_mime(data: &str) -> &'static str {
    for (prefix, mime) in MAGIC_PREFIXES {
        if data.starts_with(prefix) {
            return mime;
        }
    }
    "image/jpeg"
}

/// Check an encoded media payload against the size bound
pub fn within_size_limit(data: &str) -> bool {
    !data.is_empty() && data.len() <= MAX_MEDIA_BASE64_BYTES
}
