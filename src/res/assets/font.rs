use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::{AssetPayload, TAG_FONT};

/// One glyph's placement data inside the font atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub code: u32,
    pub advance: f32,
    pub uv: [f32; 4],
}

/// A bitmap font: line metrics plus a glyph table. The atlas texture itself
/// is a separate resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub line_height: f32,
    pub baseline: f32,
    pub glyphs: Vec<Glyph>,
}

pub struct FontFactory;

impl AssetFactory for FontFactory {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        if init.is_xml {
            return Err(Error::DecodeMalformed(
                "font records have no XML form".into(),
            ));
        }

        // Version 1 added an explicit baseline; version 0 fonts sit on the
        // line box bottom.
        if init.version > 1 {
            return Err(Error::DecodeUnsupportedVersion(TAG_FONT, init.version));
        }

        let line_height = cursor.read_f32()?;
        let baseline = if init.version >= 1 {
            cursor.read_f32()?
        } else {
            0.0
        };

        let count = cursor.read_u32()? as usize;
        let mut glyphs = Vec::with_capacity(count);
        for _ in 0..count {
            let code = cursor.read_u32()?;
            let advance = cursor.read_f32()?;
            let mut uv = [0.0f32; 4];
            for v in &mut uv {
                *v = cursor.read_f32()?;
            }
            glyphs.push(Glyph { code, advance, uv });
        }

        Ok(AssetPayload::Font(Font {
            line_height,
            baseline,
            glyphs,
        }))
    }
}
