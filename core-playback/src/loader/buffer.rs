//! Append-only download buffer.

use bridge_traits::ContentInfo;
use bytes::{Bytes, BytesMut};

/// Bytes received so far for one resource, plus what the server declared
/// about it.
///
/// Grows monotonically and never shrinks. The fetch session is its only
/// writer.
#[derive(Debug, Default)]
pub struct DownloadBuffer {
    data: BytesMut,
    content_type: Option<String>,
    content_length: Option<u64>,
    byte_range_access: bool,
    metadata_recorded: bool,
}

impl DownloadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer pre-filled with a complete resource.
    pub fn from_bytes(bytes: Bytes, content_type: impl Into<String>) -> Self {
        let length = bytes.len() as u64;
        Self {
            data: BytesMut::from(&bytes[..]),
            content_type: Some(content_type.into()),
            content_length: Some(length),
            byte_range_access: true,
            metadata_recorded: true,
        }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn append(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    /// Record the declared type and length. Only the first call has an
    /// effect; returns whether it did.
    pub fn record_response(&mut self, content_type: Option<String>, content_length: Option<u64>) -> bool {
        if self.metadata_recorded {
            return false;
        }
        self.metadata_recorded = true;
        self.content_type = content_type;
        self.content_length = content_length;
        self.byte_range_access = true;
        true
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Content information, available once the response head was recorded.
    ///
    /// `fallback_type` stands in when the server did not declare a type.
    pub fn content_info(&self, fallback_type: &str) -> Option<ContentInfo> {
        if !self.metadata_recorded {
            return None;
        }
        let content_type = self
            .content_type
            .as_deref()
            .map(|declared| declared.split(';').next().unwrap_or(declared).trim())
            .filter(|declared| !declared.is_empty())
            .unwrap_or(fallback_type)
            .to_string();

        Some(ContentInfo {
            content_type,
            content_length: self.content_length,
            byte_range_access: self.byte_range_access,
        })
    }

    /// Copy of `[offset, offset + len)`, clamped to what is buffered.
    pub fn slice(&self, offset: u64, len: u64) -> Bytes {
        let start = (offset as usize).min(self.data.len());
        let end = (offset.saturating_add(len) as usize).min(self.data.len());
        Bytes::copy_from_slice(&self.data[start..end])
    }

    /// Copy of everything buffered.
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_slice() {
        let mut buffer = DownloadBuffer::new();
        assert!(buffer.is_empty());

        buffer.append(b"hello ");
        buffer.append(b"world");
        assert_eq!(buffer.len(), 11);
        assert_eq!(buffer.slice(6, 5), Bytes::from_static(b"world"));
        assert_eq!(buffer.slice(6, 100), Bytes::from_static(b"world"));
        assert!(buffer.slice(20, 5).is_empty());
        assert_eq!(buffer.snapshot(), Bytes::from_static(b"hello world"));
    }

    #[test]
    fn test_response_metadata_recorded_once() {
        let mut buffer = DownloadBuffer::new();
        assert!(buffer.content_info("audio/mpeg").is_none());

        assert!(buffer.record_response(Some("audio/aac; charset=binary".into()), Some(42)));
        assert!(!buffer.record_response(Some("text/html".into()), Some(1)));

        let info = buffer.content_info("audio/mpeg").unwrap();
        assert_eq!(info.content_type, "audio/aac");
        assert_eq!(info.content_length, Some(42));
        assert!(info.byte_range_access);
    }

    #[test]
    fn test_fallback_content_type() {
        let mut buffer = DownloadBuffer::new();
        buffer.record_response(None, None);
        let info = buffer.content_info("audio/mpeg").unwrap();
        assert_eq!(info.content_type, "audio/mpeg");
        assert_eq!(info.content_length, None);
    }

    #[test]
    fn test_from_bytes_is_complete() {
        let buffer = DownloadBuffer::from_bytes(Bytes::from_static(b"abc"), "audio/flac");
        assert_eq!(buffer.len(), 3);
        let info = buffer.content_info("audio/mpeg").unwrap();
        assert_eq!(info.content_type, "audio/flac");
        assert_eq!(info.content_length, Some(3));
    }
}
