use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::{AssetPayload, TAG_DISPLAY_LIST};

/// A pre-recorded sequence of 32-bit draw command words, replayed verbatim
/// by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<u32>,
}

pub struct DisplayListFactory;

impl AssetFactory for DisplayListFactory {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        if init.is_xml {
            return Err(Error::DecodeMalformed(
                "display list records have no XML form".into(),
            ));
        }

        if init.version > 0 {
            return Err(Error::DecodeUnsupportedVersion(
                TAG_DISPLAY_LIST,
                init.version,
            ));
        }

        let count = cursor.read_u32()? as usize;
        let mut commands = Vec::with_capacity(count);
        for _ in 0..count {
            commands.push(cursor.read_u32()?);
        }

        Ok(AssetPayload::DisplayList(DisplayList { commands }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::res::cursor::Endian;
    use crate::res::loader::test_support::binary_init;

    #[test]
    fn decodes_big_endian() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u32.to_be_bytes());
        for v in &[0xDEAD_BEEFu32, 1, 2] {
            buf.extend_from_slice(&v.to_be_bytes());
        }

        let init = binary_init(TAG_DISPLAY_LIST, 0);
        let mut cursor = ByteCursor::with_order(&buf, Endian::Big);
        match DisplayListFactory.decode(&init, &mut cursor).unwrap() {
            AssetPayload::DisplayList(v) => assert_eq!(v.commands, vec![0xDEAD_BEEF, 1, 2]),
            _ => panic!("expected a display list payload"),
        }
    }

    #[test]
    fn truncated_is_malformed() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&5u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());

        let init = binary_init(TAG_DISPLAY_LIST, 0);
        let mut cursor = ByteCursor::with_order(&buf, Endian::Little);
        assert!(DisplayListFactory.decode(&init, &mut cursor).is_err());
    }
}
