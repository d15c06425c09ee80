use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::{AssetPayload, TAG_TEXTURE};

/// A decoded texture: dimensions, a format word understood by the renderer,
/// and the raw pixel bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub mip_count: u32,
    pub pixels: Vec<u8>,
}

pub struct TextureFactory;

impl AssetFactory for TextureFactory {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        if init.is_xml {
            return Err(Error::DecodeMalformed(
                "texture records have no XML form".into(),
            ));
        }

        // Version 1 introduced pre-baked mip chains.
        if init.version > 1 {
            return Err(Error::DecodeUnsupportedVersion(TAG_TEXTURE, init.version));
        }

        let width = cursor.read_u32()?;
        let height = cursor.read_u32()?;
        let format = cursor.read_u32()?;
        let mip_count = if init.version >= 1 {
            cursor.read_u32()?
        } else {
            1
        };

        let len = cursor.read_u32()? as usize;
        let pixels = cursor.read_bytes(len)?.to_vec();

        Ok(AssetPayload::Texture(Texture {
            width,
            height,
            format,
            mip_count,
            pixels,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::res::cursor::Endian;
    use crate::res::loader::test_support::binary_init;

    #[test]
    fn decodes_v0() {
        let mut buf = Vec::new();
        for v in &[2u32, 2, 7] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&[0xAB; 16]);

        let init = binary_init(TAG_TEXTURE, 0);
        let mut cursor = ByteCursor::with_order(&buf, Endian::Little);
        let payload = TextureFactory.decode(&init, &mut cursor).unwrap();

        match payload {
            AssetPayload::Texture(v) => {
                assert_eq!((v.width, v.height, v.format, v.mip_count), (2, 2, 7, 1));
                assert_eq!(v.pixels.len(), 16);
            }
            _ => panic!("expected a texture payload"),
        }

        assert!(cursor.is_eof());
    }

    #[test]
    fn rejects_unknown_version() {
        let init = binary_init(TAG_TEXTURE, 9);
        let mut cursor = ByteCursor::new(&[]);
        assert!(TextureFactory.decode(&init, &mut cursor).is_err());
    }

    #[test]
    fn truncated_pixels_are_malformed() {
        let mut buf = Vec::new();
        for v in &[4u32, 4, 7, 64] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&[0; 8]);

        let init = binary_init(TAG_TEXTURE, 0);
        let mut cursor = ByteCursor::with_order(&buf, Endian::Little);
        assert!(TextureFactory.decode(&init, &mut cursor).is_err());
    }
}
