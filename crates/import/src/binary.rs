//! # Material Binary Format
//!
//! Wire codec for [`MaterialDescriptor`]. The layout is a flat field
//! sequence with no header of its own; the containing asset file supplies
//! the format version out-of-band.
//!
//! Current layout, in order:
//!
//! ```text
//! material_name        string (empty when absent)
//! textures.len         i32 LE, then per entry: slot string, path string
//! user_data.len        i32 LE, then per entry: key string, value string
//! specular_power       f32 LE
//! diffuse_color x,y,z  3x f32 LE
//! extra_data x,y,z     3x f32 LE
//! technique            string
//! [technique == "GLASS" only]
//! glass_cw, glass_ccw  strings
//! glass_smooth_normals u8 (nonzero = true)
//! ```
//!
//! Strings are a 7-bit-chunked (LEB128) byte-length prefix followed by
//! UTF-8 bytes. Older versions differ in the texture block, the user-data
//! block, the technique encoding and the glass sub-block; see the
//! `VERSION_*` thresholds below.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::trace;

use crate::material::{
    DrawTechnique, MaterialDescriptor, DIFFUSE_TEXTURE_SLOT, NORMAL_TEXTURE_SLOT,
};

// ============================================================================
// Format version thresholds
// ============================================================================
//
// Versions are opaque ordered tokens taken from the containing asset file.
// They only ever participate in `<` / `>=` comparisons and are never
// decomposed into major/minor parts.

/// Glass sub-block carries cw/ccw references and a smooth-normals flag;
/// below this it held four reflection floats that are no longer represented.
pub const VERSION_GLASS_PARAMS: i32 = 1_043_001;

/// Technique is stored as a string; below this it is a legacy
/// [`DrawTechnique`] code.
pub const VERSION_TECHNIQUE_STRING: i32 = 1_052_001;

/// Textures are stored as a count-prefixed slot->path map; below this the
/// stream holds exactly two fixed-slot path strings.
pub const VERSION_TEXTURE_MAP: i32 = 1_052_002;

/// The user-data block is present.
pub const VERSION_USER_DATA: i32 = 1_068_001;

// ============================================================================
// Errors
// ============================================================================

/// Errors produced while reading or writing a material descriptor.
///
/// Every decode error is terminal: the in-progress record is not usable and
/// must be discarded by the caller.
#[derive(Debug, Error)]
pub enum MaterialError {
    /// Underlying stream failure; the only failure mode on the write path.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended in the middle of a field.
    #[error("stream ended mid-field")]
    TruncatedStream,

    /// Bad string length prefix or invalid UTF-8 payload.
    #[error("malformed string: {0}")]
    MalformedString(String),

    /// Negative collection count.
    #[error("malformed collection count: {0}")]
    MalformedCount(i32),

    /// A count-prefixed pair block repeated a key. Surfaced instead of
    /// silently keeping the last value so corrupt streams fail loudly.
    #[error("duplicate {block} key: {key:?}")]
    DuplicateKey { block: &'static str, key: String },

    /// Legacy technique code outside the closed [`DrawTechnique`] set.
    #[error("unknown legacy technique code: {0}")]
    UnknownTechnique(i32),
}

/// An `UnexpectedEof` mid-field means the stream was truncated; anything
/// else is a real transport failure.
fn map_read_err(err: io::Error) -> MaterialError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        MaterialError::TruncatedStream
    } else {
        MaterialError::Io(err)
    }
}

// ============================================================================
// Wire primitives
// ============================================================================

/// Write a 7-bit-chunked (LEB128) unsigned length prefix.
pub fn write_varint<W: Write>(writer: &mut W, mut value: u32) -> Result<(), MaterialError> {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        writer.write_u8(byte)?;
        if value == 0 {
            return Ok(());
        }
    }
}

/// Read a 7-bit-chunked (LEB128) unsigned length prefix. Rejects prefixes
/// that do not fit 32 bits.
pub fn read_varint<R: Read>(reader: &mut R) -> Result<u32, MaterialError> {
    let mut result: u32 = 0;
    let mut shift = 0;
    loop {
        let byte = reader.read_u8().map_err(map_read_err)?;
        if shift == 28 && byte & 0xF0 != 0 {
            return Err(MaterialError::MalformedString(
                "length prefix overflows 32 bits".to_string(),
            ));
        }
        result |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift > 28 {
            return Err(MaterialError::MalformedString(
                "length prefix longer than 5 bytes".to_string(),
            ));
        }
    }
}

/// Write a length-prefixed UTF-8 string.
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), MaterialError> {
    write_varint(writer, value.len() as u32)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Read a length-prefixed UTF-8 string.
pub fn read_string<R: Read>(reader: &mut R) -> Result<String, MaterialError> {
    let len = read_varint(reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(map_read_err)?;
    String::from_utf8(buf).map_err(|e| MaterialError::MalformedString(e.to_string()))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32, MaterialError> {
    reader.read_f32::<LittleEndian>().map_err(map_read_err)
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, MaterialError> {
    reader.read_i32::<LittleEndian>().map_err(map_read_err)
}

fn read_bool<R: Read>(reader: &mut R) -> Result<bool, MaterialError> {
    Ok(reader.read_u8().map_err(map_read_err)? != 0)
}

/// Read a count-prefixed (key, value) string block into a fresh map,
/// preserving stream order. Duplicate keys fail the decode.
fn read_string_map<R: Read>(
    reader: &mut R,
    block: &'static str,
) -> Result<IndexMap<String, String>, MaterialError> {
    let count = read_i32(reader)?;
    if count < 0 {
        return Err(MaterialError::MalformedCount(count));
    }
    let mut map = IndexMap::new();
    for _ in 0..count {
        let key = read_string(reader)?;
        let value = read_string(reader)?;
        if map.contains_key(&key) {
            return Err(MaterialError::DuplicateKey { block, key });
        }
        map.insert(key, value);
    }
    Ok(map)
}

// ============================================================================
// Versioned codec
// ============================================================================

impl MaterialDescriptor {
    /// Write this descriptor in the current format.
    ///
    /// The layout is fixed (see the module docs); apart from transport I/O
    /// errors this cannot fail.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), MaterialError> {
        write_string(writer, self.material_name.as_deref().unwrap_or(""))?;

        writer.write_i32::<LittleEndian>(self.textures.len() as i32)?;
        for (slot, path) in &self.textures {
            write_string(writer, slot)?;
            write_string(writer, path)?;
        }

        writer.write_i32::<LittleEndian>(self.user_data.len() as i32)?;
        for (key, value) in &self.user_data {
            write_string(writer, key)?;
            write_string(writer, value)?;
        }

        writer.write_f32::<LittleEndian>(self.specular_power)?;
        writer.write_f32::<LittleEndian>(self.diffuse_color.x)?;
        writer.write_f32::<LittleEndian>(self.diffuse_color.y)?;
        writer.write_f32::<LittleEndian>(self.diffuse_color.z)?;
        writer.write_f32::<LittleEndian>(self.extra_data.x)?;
        writer.write_f32::<LittleEndian>(self.extra_data.y)?;
        writer.write_f32::<LittleEndian>(self.extra_data.z)?;

        write_string(writer, &self.technique)?;

        if self.is_glass() {
            write_string(writer, &self.glass_cw)?;
            write_string(writer, &self.glass_ccw)?;
            writer.write_u8(self.glass_smooth_normals as u8)?;
        }

        Ok(())
    }

    /// Encode this descriptor into a byte buffer in the current format.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write(&mut buf)
            .expect("writing to a Vec<u8> cannot fail");
        buf
    }

    /// Read a descriptor from `reader`, interpreting the bytes under the
    /// layout rules of `version`.
    ///
    /// The texture and user-data maps and all scalar fields are fully
    /// overwritten; this is not a merge. The glass fields are only touched
    /// when the stream's technique resolves to `"GLASS"`, otherwise they
    /// keep whatever value the record already held. On error the record is
    /// in an unspecified partial state and must be discarded.
    pub fn read<R: Read>(&mut self, reader: &mut R, version: i32) -> Result<(), MaterialError> {
        self.textures.clear();
        self.user_data.clear();

        let name = read_string(reader)?;
        self.material_name = if name.is_empty() { None } else { Some(name) };

        if version < VERSION_TEXTURE_MAP {
            trace!(version, "reading legacy two-slot texture layout");
            let diffuse = read_string(reader)?;
            if !diffuse.is_empty() {
                self.textures.insert(DIFFUSE_TEXTURE_SLOT.to_string(), diffuse);
            }
            let normal = read_string(reader)?;
            if !normal.is_empty() {
                self.textures.insert(NORMAL_TEXTURE_SLOT.to_string(), normal);
            }
        } else {
            self.textures = read_string_map(reader, "texture")?;
        }

        if version >= VERSION_USER_DATA {
            self.user_data = read_string_map(reader, "user data")?;
        } else {
            trace!(version, "stream predates the user data block");
        }

        self.specular_power = read_f32(reader)?;
        self.diffuse_color.x = read_f32(reader)?;
        self.diffuse_color.y = read_f32(reader)?;
        self.diffuse_color.z = read_f32(reader)?;
        self.extra_data.x = read_f32(reader)?;
        self.extra_data.y = read_f32(reader)?;
        self.extra_data.z = read_f32(reader)?;

        self.technique = if version < VERSION_TECHNIQUE_STRING {
            let code = read_i32(reader)?;
            let technique =
                DrawTechnique::from_code(code).ok_or(MaterialError::UnknownTechnique(code))?;
            trace!(code, technique = technique.as_str(), "resolved legacy technique code");
            technique.as_str().to_string()
        } else {
            read_string(reader)?
        };

        if self.is_glass() {
            if version >= VERSION_GLASS_PARAMS {
                self.glass_cw = read_string(reader)?;
                self.glass_ccw = read_string(reader)?;
                self.glass_smooth_normals = read_bool(reader)?;
            } else {
                // Four reflection parameters the format no longer represents;
                // consume them and fall back to the fixed legacy references.
                for _ in 0..4 {
                    read_f32(reader)?;
                }
                self.glass_cw = "GlassCW".to_string();
                self.glass_ccw = "GlassCCW".to_string();
                self.glass_smooth_normals = false;
                trace!(version, "discarded legacy glass parameters");
            }
        }

        Ok(())
    }

    /// Decode a descriptor from `bytes` under the layout rules of
    /// `version`. Returns a fresh record; nothing is returned on error.
    pub fn decode(bytes: &[u8], version: i32) -> Result<Self, MaterialError> {
        let mut reader = bytes;
        let mut material = Self::default();
        material.read(&mut reader, version)?;
        Ok(material)
    }
}
