//! Data URI encoding for Ignition file contents
//!
//! Every byte outside `A-Z a-z 0-9 - _ . ~` is percent-encoded with uppercase
//! hex, and space becomes `%20`. The result never contains `+`, which boot-time
//! readers would otherwise misread.

use std::borrow::Cow;
use std::string::FromUtf8Error;

/// Scheme and media type prefix of every generated source
pub const DATA_URI_PREFIX: &str = "data:text/plain,";

/// Wrap plain text in a `data:text/plain,` URI
pub fn encode_data_uri(text: &str) -> String {
    format!("{}{}", DATA_URI_PREFIX, urlencoding::encode(text))
}

/// Decode the payload of a `data:text/plain,` URI.
///
/// Returns `None` when `source` is not such a URI.
pub fn decode_data_uri(source: &str) -> Option<Result<Cow<'_, str>, FromUtf8Error>> {
    source.strip_prefix(DATA_URI_PREFIX).map(urlencoding::decode)
}
