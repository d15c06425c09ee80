use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::{AssetPayload, TAG_SHADER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// A shader stage plus its UTF-8 source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    pub stage: ShaderStage,
    pub source: String,
}

pub struct ShaderFactory;

impl AssetFactory for ShaderFactory {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        if init.is_xml {
            return Err(Error::DecodeMalformed(
                "shader records have no XML form".into(),
            ));
        }

        if init.version > 0 {
            return Err(Error::DecodeUnsupportedVersion(TAG_SHADER, init.version));
        }

        let stage = match cursor.read_u8()? {
            0 => ShaderStage::Vertex,
            1 => ShaderStage::Fragment,
            v => {
                return Err(Error::DecodeMalformed(format!(
                    "unknown shader stage {}",
                    v
                )));
            }
        };

        let source = cursor.read_string()?;
        Ok(AssetPayload::Shader(Shader { stage, source }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::res::cursor::Endian;
    use crate::res::loader::test_support::binary_init;

    #[test]
    fn decodes() {
        let src = "void main() {}";
        let mut buf = vec![1u8];
        buf.extend_from_slice(&(src.len() as u32).to_le_bytes());
        buf.extend_from_slice(src.as_bytes());

        let init = binary_init(TAG_SHADER, 0);
        let mut cursor = ByteCursor::with_order(&buf, Endian::Little);
        match ShaderFactory.decode(&init, &mut cursor).unwrap() {
            AssetPayload::Shader(v) => {
                assert_eq!(v.stage, ShaderStage::Fragment);
                assert_eq!(v.source, src);
            }
            _ => panic!("expected a shader payload"),
        }
    }

    #[test]
    fn unknown_stage_is_malformed() {
        let init = binary_init(TAG_SHADER, 0);
        let mut cursor = ByteCursor::new(&[9]);
        assert!(ShaderFactory.decode(&init, &mut cursor).is_err());
    }
}
