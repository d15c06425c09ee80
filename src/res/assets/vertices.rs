use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::{AssetPayload, TAG_VERTICES};

/// A decoded vertex buffer: interleaved float attributes, `stride` bytes per
/// vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    pub stride: u32,
    pub count: u32,
    pub data: Vec<f32>,
}

pub struct VertexBufferFactory;

impl AssetFactory for VertexBufferFactory {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        if init.is_xml {
            return Err(Error::DecodeMalformed(
                "vertex buffer records have no XML form".into(),
            ));
        }

        if init.version > 0 {
            return Err(Error::DecodeUnsupportedVersion(TAG_VERTICES, init.version));
        }

        let stride = cursor.read_u32()?;
        let count = cursor.read_u32()?;

        if stride == 0 || stride % 4 != 0 {
            return Err(Error::DecodeMalformed(format!(
                "vertex stride {} is not a positive multiple of 4",
                stride
            )));
        }

        let floats = (stride / 4) as usize * count as usize;
        let mut data = Vec::with_capacity(floats);
        for _ in 0..floats {
            data.push(cursor.read_f32()?);
        }

        Ok(AssetPayload::Vertices(VertexBuffer {
            stride,
            count,
            data,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::res::cursor::Endian;
    use crate::res::loader::test_support::binary_init;

    #[test]
    fn decodes() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&12u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        for v in &[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }

        let init = binary_init(TAG_VERTICES, 0);
        let mut cursor = ByteCursor::with_order(&buf, Endian::Little);
        match VertexBufferFactory.decode(&init, &mut cursor).unwrap() {
            AssetPayload::Vertices(v) => {
                assert_eq!(v.stride, 12);
                assert_eq!(v.count, 2);
                assert_eq!(v.data, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
            }
            _ => panic!("expected a vertex buffer payload"),
        }
    }

    #[test]
    fn rejects_broken_stride() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());

        let init = binary_init(TAG_VERTICES, 0);
        let mut cursor = ByteCursor::with_order(&buf, Endian::Little);
        assert!(VertexBufferFactory.decode(&init, &mut cursor).is_err());
    }
}
