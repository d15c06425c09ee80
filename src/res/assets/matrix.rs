use cgmath::Matrix4;

use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::{AssetPayload, TAG_MATRIX};

/// Decodes a column-major 4x4 float matrix.
pub struct MatrixFactory;

impl AssetFactory for MatrixFactory {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        if init.is_xml {
            return Err(Error::DecodeMalformed(
                "matrix records have no XML form".into(),
            ));
        }

        if init.version > 0 {
            return Err(Error::DecodeUnsupportedVersion(TAG_MATRIX, init.version));
        }

        let mut m = [0.0f32; 16];
        for v in &mut m {
            *v = cursor.read_f32()?;
        }

        Ok(AssetPayload::Matrix(Matrix4::new(
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8], m[9], m[10], m[11], m[12], m[13],
            m[14], m[15],
        )))
    }
}
