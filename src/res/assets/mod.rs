//! Decoded asset variants and their common attributes.
//!
//! Every record in an archive decodes into one [`AssetPayload`] variant,
//! chosen by the 32-bit type tag in its header. The payloads themselves are
//! plain structure population; the interesting machinery (headers, byte
//! order, version dispatch) lives in [`crate::res::loader`].

pub mod blob;
pub mod display_list;
pub mod font;
pub mod json;
pub mod lights;
pub mod matrix;
pub mod shader;
pub mod texture;
pub mod vertices;

pub use self::blob::Blob;
pub use self::display_list::DisplayList;
pub use self::font::{Font, Glyph};
pub use self::json::JsonAsset;
pub use self::lights::{Light, LightKind, Lights};
pub use self::shader::{Shader, ShaderStage};
pub use self::texture::Texture;
pub use self::vertices::VertexBuffer;

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use cgmath::Matrix4;
use smallvec::SmallVec;

use crate::archive::RawFile;
use crate::res::loader::ResourceInitData;

/// Packs a four-character magic into its 32-bit tag.
pub const fn fourcc(tag: &[u8; 4]) -> u32 {
    ((tag[0] as u32) << 24) | ((tag[1] as u32) << 16) | ((tag[2] as u32) << 8) | (tag[3] as u32)
}

pub const TAG_TEXTURE: u32 = fourcc(b"TEX ");
pub const TAG_VERTICES: u32 = fourcc(b"VERT");
pub const TAG_DISPLAY_LIST: u32 = fourcc(b"DLST");
pub const TAG_MATRIX: u32 = fourcc(b"MTRX");
pub const TAG_BLOB: u32 = fourcc(b"BLOB");
pub const TAG_FONT: u32 = fourcc(b"FONT");
pub const TAG_SHADER: u32 = fourcc(b"SHDR");
pub const TAG_JSON: u32 = fourcc(b"JSON");
pub const TAG_LIGHTS: u32 = fourcc(b"LITS");

/// A decoded, typed asset payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetPayload {
    Texture(Texture),
    Vertices(VertexBuffer),
    DisplayList(DisplayList),
    Matrix(Matrix4<f32>),
    Blob(Blob),
    Font(Font),
    Shader(Shader),
    Json(JsonAsset),
    Lights(Lights),
}

impl AssetPayload {
    /// The type tag this payload decodes under.
    pub fn type_tag(&self) -> u32 {
        match *self {
            AssetPayload::Texture(_) => TAG_TEXTURE,
            AssetPayload::Vertices(_) => TAG_VERTICES,
            AssetPayload::DisplayList(_) => TAG_DISPLAY_LIST,
            AssetPayload::Matrix(_) => TAG_MATRIX,
            AssetPayload::Blob(_) => TAG_BLOB,
            AssetPayload::Font(_) => TAG_FONT,
            AssetPayload::Shader(_) => TAG_SHADER,
            AssetPayload::Json(_) => TAG_JSON,
            AssetPayload::Lights(_) => TAG_LIGHTS,
        }
    }

    /// The size of the payload's bulk data in bytes.
    pub fn byte_size(&self) -> usize {
        match *self {
            AssetPayload::Texture(ref v) => v.pixels.len(),
            AssetPayload::Vertices(ref v) => v.data.len() * mem::size_of::<f32>(),
            AssetPayload::DisplayList(ref v) => v.commands.len() * mem::size_of::<u32>(),
            AssetPayload::Matrix(_) => mem::size_of::<Matrix4<f32>>(),
            AssetPayload::Blob(ref v) => v.bytes.len(),
            AssetPayload::Font(ref v) => v.glyphs.len() * mem::size_of::<Glyph>(),
            AssetPayload::Shader(ref v) => v.source.len(),
            AssetPayload::Json(ref v) => v.source_len,
            AssetPayload::Lights(ref v) => v.lights.len() * mem::size_of::<Light>(),
        }
    }

    /// A raw view of the payload's bulk data, for variants that keep one.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match *self {
            AssetPayload::Texture(ref v) => Some(&v.pixels),
            AssetPayload::Blob(ref v) => Some(&v.bytes),
            AssetPayload::Shader(ref v) => Some(v.source.as_bytes()),
            _ => None,
        }
    }
}

/// A byte range the host has poked through the raw pointer, with the bytes
/// it replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimePatch {
    pub offset: usize,
    pub original: Vec<u8>,
}

/// A decoded in-memory asset plus the attributes every variant shares.
///
/// Resources are created by the loader, handed out behind `Arc` from the
/// cache, and discarded from the logical cache view (though not necessarily
/// destructed) once their dirty flag is set.
#[derive(Debug)]
pub struct Resource {
    init: ResourceInitData,
    file: RawFile,
    payload: AssetPayload,
    dirty: AtomicBool,
    patches: Mutex<SmallVec<[RuntimePatch; 4]>>,
}

impl Resource {
    pub(crate) fn new(init: ResourceInitData, file: RawFile, payload: AssetPayload) -> Self {
        Resource {
            init,
            file,
            payload,
            dirty: AtomicBool::new(false),
            patches: Mutex::new(SmallVec::new()),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.init.unique_id
    }

    #[inline]
    pub fn type_tag(&self) -> u32 {
        self.init.type_tag
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.init.version
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.init.path
    }

    #[inline]
    pub fn init_data(&self) -> &ResourceInitData {
        &self.init
    }

    /// The raw file this resource was decoded from.
    #[inline]
    pub fn backing_file(&self) -> &RawFile {
        &self.file
    }

    #[inline]
    pub fn payload(&self) -> &AssetPayload {
        &self.payload
    }

    /// Lazy invalidation: the next load of this identifier bypasses the
    /// cache and re-resolves, without eagerly destroying this value.
    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// The size of the decoded bulk data in bytes.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.payload.byte_size()
    }

    /// A raw byte view for native consumers. Falls back to the backing
    /// record for variants without a contiguous payload. Callers must not
    /// hold on to this view past an unload of the resource.
    pub fn raw_bytes(&self) -> &[u8] {
        self.payload.raw_bytes().unwrap_or(&self.file.bytes)
    }

    /// Records that the host overwrote `original` at `offset` inside the
    /// decoded data, so the modification can be audited or reverted.
    pub fn record_patch(&self, offset: usize, original: &[u8]) {
        self.patches.lock().unwrap().push(RuntimePatch {
            offset,
            original: original.to_vec(),
        });
    }

    /// The runtime patches recorded so far, oldest first.
    pub fn patches(&self) -> Vec<RuntimePatch> {
        self.patches.lock().unwrap().to_vec()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fourcc_packs() {
        assert_eq!(fourcc(b"TEX "), 0x5445_5820);
        assert_eq!(fourcc(b"JSON"), 0x4A53_4F4E);
    }

    #[test]
    fn tags_are_distinct() {
        let tags = [
            TAG_TEXTURE,
            TAG_VERTICES,
            TAG_DISPLAY_LIST,
            TAG_MATRIX,
            TAG_BLOB,
            TAG_FONT,
            TAG_SHADER,
            TAG_JSON,
            TAG_LIGHTS,
        ];

        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
