use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::AssetPayload;

/// An opaque byte payload, handed to the consumer verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub bytes: Vec<u8>,
}

pub struct BlobFactory;

impl AssetFactory for BlobFactory {
    fn decode(&self, _: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        // Blobs accept every declared version; the bytes are opaque anyway.
        let bytes = cursor.read_bytes(cursor.remaining())?.to_vec();
        Ok(AssetPayload::Blob(Blob { bytes }))
    }
}
