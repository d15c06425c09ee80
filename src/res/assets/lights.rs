use cgmath::Vector3;
use xml::reader::{EventReader, XmlEvent};

use crate::errors::*;
use crate::res::cursor::ByteCursor;
use crate::res::loader::{AssetFactory, ResourceInitData};

use super::{AssetPayload, TAG_LIGHTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vector3<f32>,
    pub color: [f32; 4],
    pub intensity: f32,
}

/// A scene's light set.
///
/// This is the one variant with both a binary and an XML form; level editors
/// emit the XML form and the build pipeline packs it down to binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Lights {
    pub lights: Vec<Light>,
}

pub struct LightsFactory;

impl LightsFactory {
    fn decode_binary(&self, cursor: &mut ByteCursor) -> Result<Lights> {
        let count = cursor.read_u32()? as usize;

        let mut lights = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = match cursor.read_u8()? {
                0 => LightKind::Directional,
                1 => LightKind::Point,
                2 => LightKind::Spot,
                v => {
                    return Err(Error::DecodeMalformed(format!(
                        "unknown light kind {}",
                        v
                    )));
                }
            };

            let position = Vector3::new(
                cursor.read_f32()?,
                cursor.read_f32()?,
                cursor.read_f32()?,
            );

            let mut color = [0.0f32; 4];
            for v in &mut color {
                *v = cursor.read_f32()?;
            }

            let intensity = cursor.read_f32()?;
            lights.push(Light {
                kind,
                position,
                color,
                intensity,
            });
        }

        Ok(Lights { lights })
    }

    fn decode_xml(&self, bytes: &[u8]) -> Result<Lights> {
        let mut lights = Vec::new();

        for event in EventReader::new(bytes) {
            let event = event
                .map_err(|err| Error::DecodeMalformed(format!("light document: {}", err)))?;

            if let XmlEvent::StartElement {
                name, attributes, ..
            } = event
            {
                if name.local_name != "Light" {
                    continue;
                }

                let mut kind = LightKind::Point;
                let mut position = Vector3::new(0.0, 0.0, 0.0);
                let mut color = [1.0f32; 4];
                let mut intensity = 1.0f32;

                for attr in &attributes {
                    let value = attr.value.as_str();
                    match attr.name.local_name.as_str() {
                        "kind" => {
                            kind = match value {
                                "directional" => LightKind::Directional,
                                "point" => LightKind::Point,
                                "spot" => LightKind::Spot,
                                v => {
                                    return Err(Error::DecodeMalformed(format!(
                                        "unknown light kind '{}'",
                                        v
                                    )));
                                }
                            };
                        }
                        "x" => position.x = parse_f32(value)?,
                        "y" => position.y = parse_f32(value)?,
                        "z" => position.z = parse_f32(value)?,
                        "r" => color[0] = parse_f32(value)?,
                        "g" => color[1] = parse_f32(value)?,
                        "b" => color[2] = parse_f32(value)?,
                        "a" => color[3] = parse_f32(value)?,
                        "intensity" => intensity = parse_f32(value)?,
                        _ => {}
                    }
                }

                lights.push(Light {
                    kind,
                    position,
                    color,
                    intensity,
                });
            }
        }

        Ok(Lights { lights })
    }
}

fn parse_f32(v: &str) -> Result<f32> {
    v.parse()
        .map_err(|_| Error::DecodeMalformed(format!("'{}' is not a float", v)))
}

impl AssetFactory for LightsFactory {
    fn decode(&self, init: &ResourceInitData, cursor: &mut ByteCursor) -> Result<AssetPayload> {
        if init.version > 0 {
            return Err(Error::DecodeUnsupportedVersion(TAG_LIGHTS, init.version));
        }

        let lights = if init.is_xml {
            let bytes = cursor.read_bytes(cursor.remaining())?;
            self.decode_xml(bytes)?
        } else {
            self.decode_binary(cursor)?
        };

        Ok(AssetPayload::Lights(lights))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::res::cursor::Endian;
    use crate::res::loader::test_support::{binary_init, xml_init};

    #[test]
    fn decodes_binary() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(2);
        for v in &[1.0f32, 2.0, 3.0, 0.5, 0.5, 0.5, 1.0, 4.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }

        let init = binary_init(TAG_LIGHTS, 0);
        let mut cursor = ByteCursor::with_order(&buf, Endian::Little);
        match LightsFactory.decode(&init, &mut cursor).unwrap() {
            AssetPayload::Lights(v) => {
                assert_eq!(v.lights.len(), 1);
                assert_eq!(v.lights[0].kind, LightKind::Spot);
                assert_eq!(v.lights[0].position, Vector3::new(1.0, 2.0, 3.0));
                assert_eq!(v.lights[0].intensity, 4.0);
            }
            _ => panic!("expected a lights payload"),
        }
    }

    #[test]
    fn decodes_xml() {
        let doc = br#"<?xml version="1.0"?>
            <Lights Version="0">
                <Light kind="directional" x="0" y="-1" z="0" intensity="0.8"/>
                <Light kind="point" x="4" y="2" z="1" r="1" g="0.5" b="0.25"/>
            </Lights>"#;

        let init = xml_init(TAG_LIGHTS, 0);
        let mut cursor = ByteCursor::new(doc);
        match LightsFactory.decode(&init, &mut cursor).unwrap() {
            AssetPayload::Lights(v) => {
                assert_eq!(v.lights.len(), 2);
                assert_eq!(v.lights[0].kind, LightKind::Directional);
                assert_eq!(v.lights[0].intensity, 0.8);
                assert_eq!(v.lights[1].color, [1.0, 0.5, 0.25, 1.0]);
            }
            _ => panic!("expected a lights payload"),
        }
    }

    #[test]
    fn bad_attribute_is_malformed() {
        let doc = br#"<Lights><Light x="not-a-number"/></Lights>"#;
        let init = xml_init(TAG_LIGHTS, 0);
        let mut cursor = ByteCursor::new(doc);
        assert!(LightsFactory.decode(&init, &mut cursor).is_err());
    }
}
