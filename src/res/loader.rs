//! Turns raw archive bytes into typed assets.
//!
//! Every binary record starts with a fixed 64-byte header declaring its byte
//! order, type tag, format version and unique id. Records whose first byte is
//! `<` are XML documents instead; the root element name resolves the type tag
//! through a registered name table, and `Version` / `Id` attributes stand in
//! for the header fields.
//!
//! Decoding dispatches on the type tag to an [`AssetFactory`] registered at
//! startup. Factories receive a [`ByteCursor`] already configured with the
//! record's byte order, positioned past the header, and must consume exactly
//! their record. There is no silent truncation: a factory reading past the
//! end of its record gets a hard `DecodeMalformed` error.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use xml::reader::{EventReader, XmlEvent};

use crate::archive::RawFile;
use crate::errors::*;
use crate::utils::FastHashMap;

use super::assets::{self, AssetPayload, Resource};
use super::cursor::{ByteCursor, Endian};

/// The size of the fixed binary record header.
pub const HEADER_SIZE: usize = 64;

/// Per-record metadata, read from the binary header or sniffed from the XML
/// root element.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInitData {
    pub path: String,
    pub type_tag: u32,
    pub version: u32,
    pub unique_id: u64,
    pub byte_order: Endian,
    pub is_custom_asset: bool,
    pub is_xml: bool,
}

/// A per-type decoder. Implementations are registered once at startup,
/// keyed by the 32-bit type tag, and must be version-aware: a record version
/// the factory does not understand is an error, not a guess.
pub trait AssetFactory: Send + Sync + 'static {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload>;
}

fn resolved(order: Endian) -> Endian {
    match order {
        Endian::Native => {
            if cfg!(target_endian = "big") {
                Endian::Big
            } else {
                Endian::Little
            }
        }
        v => v,
    }
}

/// Decodes the fixed 64-byte record header into `(byte order, custom flag,
/// type tag, version, unique id)`.
pub fn decode_header(buf: &[u8]) -> Result<(Endian, bool, u32, u32, u64)> {
    if buf.len() < HEADER_SIZE {
        return Err(Error::DecodeMalformed(format!(
            "record of {} bytes is shorter than the {} byte header",
            buf.len(),
            HEADER_SIZE
        )));
    }

    let order = match buf[0] {
        0 => Endian::Little,
        1 => Endian::Big,
        v => {
            return Err(Error::DecodeMalformed(format!(
                "unknown byte order {} in record header",
                v
            )));
        }
    };

    let is_custom = buf[1] != 0;

    let mut cursor = ByteCursor::with_order(&buf[4..20], order);
    let type_tag = cursor.read_u32()?;
    let version = cursor.read_u32()?;
    let unique_id = cursor.read_u64()?;

    Ok((order, is_custom, type_tag, version, unique_id))
}

/// Encodes a 64-byte record header from init data. Reserved regions are
/// zeroed.
pub fn encode_header(init: &ResourceInitData) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];

    buf[1] = init.is_custom_asset as u8;
    match resolved(init.byte_order) {
        Endian::Big => {
            buf[0] = 1;
            BigEndian::write_u32(&mut buf[4..8], init.type_tag);
            BigEndian::write_u32(&mut buf[8..12], init.version);
            BigEndian::write_u64(&mut buf[12..20], init.unique_id);
        }
        _ => {
            buf[0] = 0;
            LittleEndian::write_u32(&mut buf[4..8], init.type_tag);
            LittleEndian::write_u32(&mut buf[8..12], init.version);
            LittleEndian::write_u64(&mut buf[12..20], init.unique_id);
        }
    }

    buf
}

/// The pluggable, version-aware factory registry.
pub struct ResourceLoader {
    factories: FastHashMap<u32, Box<dyn AssetFactory>>,
    xml_tags: FastHashMap<String, u32>,
}

impl ResourceLoader {
    /// Creates an empty loader with no factories registered.
    pub fn new() -> Self {
        ResourceLoader {
            factories: FastHashMap::default(),
            xml_tags: FastHashMap::default(),
        }
    }

    /// Creates a loader with every built-in asset factory registered.
    pub fn with_builtins() -> Self {
        let mut loader = ResourceLoader::new();

        loader.register(assets::TAG_TEXTURE, Box::new(assets::texture::TextureFactory));
        loader.register(
            assets::TAG_VERTICES,
            Box::new(assets::vertices::VertexBufferFactory),
        );
        loader.register(
            assets::TAG_DISPLAY_LIST,
            Box::new(assets::display_list::DisplayListFactory),
        );
        loader.register(assets::TAG_MATRIX, Box::new(assets::matrix::MatrixFactory));
        loader.register(assets::TAG_BLOB, Box::new(assets::blob::BlobFactory));
        loader.register(assets::TAG_FONT, Box::new(assets::font::FontFactory));
        loader.register(assets::TAG_SHADER, Box::new(assets::shader::ShaderFactory));
        loader.register(assets::TAG_JSON, Box::new(assets::json::JsonFactory));
        loader.register(assets::TAG_LIGHTS, Box::new(assets::lights::LightsFactory));

        loader.register_xml_name("Texture", assets::TAG_TEXTURE);
        loader.register_xml_name("Vertices", assets::TAG_VERTICES);
        loader.register_xml_name("DisplayList", assets::TAG_DISPLAY_LIST);
        loader.register_xml_name("Matrix", assets::TAG_MATRIX);
        loader.register_xml_name("Blob", assets::TAG_BLOB);
        loader.register_xml_name("Font", assets::TAG_FONT);
        loader.register_xml_name("Shader", assets::TAG_SHADER);
        loader.register_xml_name("Json", assets::TAG_JSON);
        loader.register_xml_name("Lights", assets::TAG_LIGHTS);

        loader
    }

    /// Registers a factory for `tag`. A second registration for the same tag
    /// is rejected rather than silently overwriting, to catch duplicate
    /// registration bugs early.
    pub fn register(&mut self, tag: u32, factory: Box<dyn AssetFactory>) -> bool {
        if self.factories.contains_key(&tag) {
            warn!(
                "[ResourceLoader] duplicate factory registration for tag {:#010X} rejected.",
                tag
            );
            return false;
        }

        self.factories.insert(tag, factory);
        true
    }

    /// Maps an XML root element name onto a type tag. Same duplicate rule as
    /// [`register`](ResourceLoader::register).
    pub fn register_xml_name<T: Into<String>>(&mut self, name: T, tag: u32) -> bool {
        let name = name.into();
        if self.xml_tags.contains_key(&name) {
            warn!(
                "[ResourceLoader] duplicate XML name registration for '{}' rejected.",
                name
            );
            return false;
        }

        self.xml_tags.insert(name, tag);
        true
    }

    /// Decodes one raw file into a typed resource. All failures are logged
    /// and reported as absent; nothing crosses this boundary as a panic.
    pub fn decode(&self, file: RawFile) -> Option<Resource> {
        let path = file.path.clone();
        match self.try_decode(file) {
            Ok(resource) => Some(resource),
            Err(err) => {
                warn!("[ResourceLoader] failed to decode '{}': {}.", path, err);
                None
            }
        }
    }

    /// Fallible decode, for callers that care about the failure reason.
    pub fn try_decode(&self, file: RawFile) -> Result<Resource> {
        if file.bytes.is_empty() {
            return Err(Error::DecodeMalformed("record is empty".into()));
        }

        let init = if file.bytes[0] == b'<' {
            let (type_tag, version, unique_id) = self.sniff_xml(&file.bytes)?;
            ResourceInitData {
                path: file.path.clone(),
                type_tag,
                version,
                unique_id,
                byte_order: Endian::Native,
                is_custom_asset: false,
                is_xml: true,
            }
        } else {
            let (byte_order, is_custom_asset, type_tag, version, unique_id) =
                decode_header(&file.bytes)?;
            ResourceInitData {
                path: file.path.clone(),
                type_tag,
                version,
                unique_id,
                byte_order,
                is_custom_asset,
                is_xml: false,
            }
        };

        let factory = self
            .factories
            .get(&init.type_tag)
            .ok_or(Error::DecodeUnsupportedType(init.type_tag))?;

        let payload = {
            let body = if init.is_xml {
                &file.bytes[..]
            } else {
                &file.bytes[HEADER_SIZE..]
            };

            let mut cursor = ByteCursor::with_order(body, init.byte_order);
            factory.decode(&init, &mut cursor)?
        };

        Ok(Resource::new(init, file, payload))
    }

    fn sniff_xml(&self, bytes: &[u8]) -> Result<(u32, u32, u64)> {
        for event in EventReader::new(bytes) {
            let event =
                event.map_err(|err| Error::DecodeMalformed(format!("xml record: {}", err)))?;

            if let XmlEvent::StartElement {
                name, attributes, ..
            } = event
            {
                let &tag = self.xml_tags.get(&name.local_name).ok_or_else(|| {
                    Error::DecodeMalformed(format!(
                        "unknown XML root element '{}'",
                        name.local_name
                    ))
                })?;

                let mut version = 0u32;
                let mut unique_id = 0u64;
                for attr in &attributes {
                    match attr.name.local_name.as_str() {
                        "Version" => {
                            version = attr.value.parse().map_err(|_| {
                                Error::DecodeMalformed(format!(
                                    "bad Version attribute '{}'",
                                    attr.value
                                ))
                            })?;
                        }
                        "Id" => {
                            unique_id = attr.value.parse().map_err(|_| {
                                Error::DecodeMalformed(format!(
                                    "bad Id attribute '{}'",
                                    attr.value
                                ))
                            })?;
                        }
                        _ => {}
                    }
                }

                return Ok((tag, version, unique_id));
            }
        }

        Err(Error::DecodeMalformed(
            "xml record has no root element".into(),
        ))
    }
}

impl Default for ResourceLoader {
    fn default() -> Self {
        ResourceLoader::with_builtins()
    }
}
