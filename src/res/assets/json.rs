use serde_json;

use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::AssetPayload;

/// A parsed JSON document plus the size of the source text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonAsset {
    pub value: serde_json::Value,
    pub source_len: usize,
}

pub struct JsonFactory;

impl AssetFactory for JsonFactory {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        if init.is_xml {
            return Err(Error::DecodeMalformed(
                "json records have no XML form".into(),
            ));
        }

        let bytes = cursor.read_bytes(cursor.remaining())?;
        let value = serde_json::from_slice(bytes)?;

        Ok(AssetPayload::Json(JsonAsset {
            value,
            source_len: bytes.len(),
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::res::assets::TAG_JSON;
    use crate::res::loader::test_support::binary_init;

    #[test]
    fn decodes() {
        let init = binary_init(TAG_JSON, 0);
        let mut cursor = ByteCursor::new(br#"{"speed": 42, "name": "cart"}"#);
        match JsonFactory.decode(&init, &mut cursor).unwrap() {
            AssetPayload::Json(v) => {
                assert_eq!(v.value["speed"], 42);
                assert_eq!(v.value["name"], "cart");
            }
            _ => panic!("expected a json payload"),
        }
    }

    #[test]
    fn broken_document_is_an_error() {
        let init = binary_init(TAG_JSON, 0);
        let mut cursor = ByteCursor::new(b"{broken");
        assert!(JsonFactory.decode(&init, &mut cursor).is_err());
    }
}
