//! Batch body encoding.
//!
//! A batch is the submitted messages joined by `\n`. Compressed batches are
//! zlib streams, announced to the collector as `Content-Encoding: deflated`.

use crate::error::Result;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// `Content-Type` of every batch.
pub const CONTENT_TYPE: &str = "application/ndjson; charset=UTF-8";

/// `Content-Encoding` of compressed batches.
pub const CONTENT_ENCODING: &str = "deflated";

/// One message waiting for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionItem {
    /// Serialized record.
    pub message: String,
    /// Whether the message may travel compressed.
    pub compress: bool,
}

impl SubmissionItem {
    /// Create an item.
    pub fn new(message: impl Into<String>, compress: bool) -> Self {
        Self {
            message: message.into(),
            compress,
        }
    }
}

/// Join messages into a newline-delimited body.
pub fn ndjson<'a>(messages: impl IntoIterator<Item = &'a str>) -> String {
    messages.into_iter().collect::<Vec<_>>().join("\n")
}

/// Encode a batch body. The batch is compressed only if every item allows it.
pub fn encode(items: &[SubmissionItem]) -> Result<(Vec<u8>, bool)> {
    let body = ndjson(items.iter().map(|item| item.message.as_str()));
    let compress = items.iter().all(|item| item.compress);
    if !compress {
        return Ok((body.into_bytes(), false));
    }
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
    encoder.write_all(body.as_bytes())?;
    Ok((encoder.finish()?, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn inflate(bytes: &[u8]) -> String {
        let mut text = String::new();
        ZlibDecoder::new(bytes).read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_ndjson_joins_with_newlines() {
        assert_eq!(ndjson(["[[\"a\",\"1\"]]", "[[\"b\",\"2\"]]"]), "[[\"a\",\"1\"]]\n[[\"b\",\"2\"]]");
        assert_eq!(ndjson(["[]"]), "[]");
    }

    #[test]
    fn test_encode_compressed() {
        let items = vec![
            SubmissionItem::new("[[\"now\",\"1\"]]", true),
            SubmissionItem::new("[[\"now\",\"2\"]]", true),
        ];
        let (body, compressed) = encode(&items).unwrap();
        assert!(compressed);
        assert_eq!(inflate(&body), "[[\"now\",\"1\"]]\n[[\"now\",\"2\"]]");
    }

    #[test]
    fn test_encode_plain_when_any_item_skips_compression() {
        let items = vec![
            SubmissionItem::new("[[\"now\",\"1\"]]", true),
            SubmissionItem::new("[[\"now\",\"2\"]]", false),
        ];
        let (body, compressed) = encode(&items).unwrap();
        assert!(!compressed);
        assert_eq!(body, b"[[\"now\",\"1\"]]\n[[\"now\",\"2\"]]");
    }
}
