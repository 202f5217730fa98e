use bytes::Bytes;

use crate::error::TransformError;

/// A source media unit: raw bytes plus the MIME type the caller declared.
///
/// The declared type is a hint only; classification sniffs the actual
/// container and wins over the declaration.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    bytes: Bytes,
    declared_mime: String,
}

impl MediaAsset {
    pub fn new(bytes: impl Into<Bytes>, declared_mime: impl Into<String>) -> Result<Self, TransformError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TransformError::InvalidRequest(
                "asset byte buffer is empty".into(),
            ));
        }
        Ok(Self {
            bytes,
            declared_mime: declared_mime.into(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn declared_mime(&self) -> &str {
        &self.declared_mime
    }
}

/// What the classifier learned about an asset by inspecting its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaProbe {
    pub is_animated: bool,
    pub frame_count: u32,
    pub mime_type: String,
}

impl MediaProbe {
    pub fn single_frame(mime_type: impl Into<String>) -> Self {
        Self {
            is_animated: false,
            frame_count: 1,
            mime_type: mime_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_asset_is_rejected() {
        let err = MediaAsset::new(Bytes::new(), "image/png");
        assert!(matches!(err, Err(TransformError::InvalidRequest(_))));
    }

    #[test]
    fn asset_keeps_declared_mime() {
        let asset = MediaAsset::new(vec![1u8, 2, 3], "image/gif").unwrap();
        assert_eq!(asset.declared_mime(), "image/gif");
        assert_eq!(asset.len(), 3);
    }
}
