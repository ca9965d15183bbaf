//! Multipart/form-data decoding.
//!
//! The body is buffered in full and scanned for `--<boundary>` delimiters.
//! Only `name="..."` and `filename="..."` are read from each part's headers;
//! no general MIME header grammar is implemented.
//!
//! Known gap: a payload that contains the delimiter verbatim is split at that
//! point. Delimiter scanning cannot tell the two apart.

use crate::{DriveError, Result};

const HEADER_END: &[u8] = b"\r\n\r\n";

/// One named segment of a decoded multipart body.
///
/// The payload borrows from the request body buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<'a> {
    /// Form field name. Not unique within a body.
    pub field_name: String,
    /// Client-supplied filename. `None` for plain form fields.
    pub filename: Option<String>,
    /// Part body, possibly empty.
    pub payload: &'a [u8],
}

impl Part<'_> {
    /// Whether this part carries a file and may be stored.
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}

/// Decodes a buffered multipart body into parts.
pub trait MultipartDecoder: Send + Sync {
    /// Decode `body` using `boundary` (without the leading dashes).
    ///
    /// Parts are returned in body order. Fails only when the boundary is
    /// empty or never occurs; individual unparseable parts are skipped.
    fn decode<'a>(&self, body: &'a [u8], boundary: &str) -> Result<Vec<Part<'a>>>;
}

/// Buffer-then-scan decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct BufferedDecoder;

impl MultipartDecoder for BufferedDecoder {
    fn decode<'a>(&self, body: &'a [u8], boundary: &str) -> Result<Vec<Part<'a>>> {
        if boundary.is_empty() {
            return Err(DriveError::MalformedRequest(
                "empty multipart boundary".to_string(),
            ));
        }

        let delimiter = format!("--{boundary}").into_bytes();
        let first = find(body, &delimiter, 0).ok_or_else(|| {
            DriveError::MalformedRequest("multipart boundary not found in body".to_string())
        })?;

        let mut parts = Vec::new();
        let mut start = skip_line_end(body, first + delimiter.len());

        while let Some(idx) = find(body, &delimiter, start) {
            match parse_region(&body[start..idx]) {
                Some(part) => parts.push(part),
                None => tracing::debug!(offset = start, "Skipping multipart region without a name"),
            }

            let after = idx + delimiter.len();
            if body[after..].starts_with(b"--") {
                break;
            }
            start = skip_line_end(body, after);
        }

        Ok(parts)
    }
}

/// Decode with the default [`BufferedDecoder`].
pub fn decode<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<Part<'a>>> {
    BufferedDecoder.decode(body, boundary)
}

/// Extract the `boundary` parameter from a `Content-Type` header value.
pub fn boundary_from_content_type(content_type: &str) -> Result<&str> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DriveError::MalformedRequest("missing multipart boundary".to_string()))
}

fn parse_region(region: &[u8]) -> Option<Part<'_>> {
    let header_end = find(region, HEADER_END, 0)?;
    let headers = String::from_utf8_lossy(&region[..header_end]);

    let field_name = header_param(&headers, "name")?;
    let filename = header_param(&headers, "filename");

    let mut payload = &region[header_end + HEADER_END.len()..];
    if let Some(stripped) = payload.strip_suffix(b"\r\n") {
        payload = stripped;
    } else if let Some(stripped) = payload.strip_suffix(b"\n") {
        payload = stripped;
    }

    Some(Part {
        field_name,
        filename,
        payload,
    })
}

/// Value of `key="value"` in a header block. Empty values count as absent.
///
/// `key` must start a parameter, so `name` does not match inside `filename`,
/// and text inside another parameter's quoted value is never matched.
fn header_param(headers: &str, key: &str) -> Option<String> {
    let lowered = headers.to_ascii_lowercase();
    let bytes = lowered.as_bytes();
    let needle = format!("{key}=\"");
    let mut in_quotes = false;
    let mut prev: Option<u8> = None;

    for (at, &b) in bytes.iter().enumerate() {
        match b {
            b'\n' => in_quotes = false,
            b'"' => in_quotes = !in_quotes,
            _ if !in_quotes
                && bytes[at..].starts_with(needle.as_bytes())
                && prev.map_or(true, |c| !(c.is_ascii_alphanumeric() || c == b'_' || c == b'-')) =>
            {
                let value_start = at + needle.len();
                let value_len = headers[value_start..].find('"')?;
                let value = &headers[value_start..value_start + value_len];
                return (!value.is_empty()).then(|| value.to_string());
            }
            _ => {}
        }
        prev = Some(b);
    }

    None
}

fn skip_line_end(buf: &[u8], pos: usize) -> usize {
    if buf[pos..].starts_with(b"\r\n") {
        pos + 2
    } else if buf[pos..].starts_with(b"\n") {
        pos + 1
    } else {
        pos
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}
