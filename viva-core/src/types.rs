use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one interview run, issued by the backend when the test is
/// created. Opaque to this client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Topic area the backend draws questions from, resolved by the join call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain(pub String);

impl Domain {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One finalized recording: container bytes plus their mime type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaBlob {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// A zero-length blob, produced when a recording stopped before any
    /// chunk arrived. Submission of these is rejected upstream.
    pub fn empty(mime: impl Into<String>) -> Self {
        Self::new(mime, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Blobs routinely hold megabytes of media; Debug prints the length only.
impl fmt::Debug for MediaBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaBlob")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Lifecycle of a vaulted answer relative to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_reports_empty() {
        let blob = MediaBlob::empty("audio/wav");
        assert!(blob.is_empty());
        assert_eq!(blob.len(), 0);

        let blob = MediaBlob::new("audio/wav", vec![1, 2, 3]);
        assert!(!blob.is_empty());
        assert_eq!(blob.len(), 3);
    }

    #[test]
    fn blob_debug_hides_payload() {
        let blob = MediaBlob::new("audio/wav", vec![0u8; 4096]);
        let shown = format!("{blob:?}");
        assert!(shown.contains("audio/wav"));
        assert!(shown.contains("4096"));
        assert!(shown.len() < 100);
    }
}
