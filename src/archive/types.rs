use std::fmt;
use std::path::PathBuf;
use serde::{Serialize, Deserialize};

/// Container signature at offset 0.
pub const ARCHIVE_MAGIC: [u8; 4] = *b"BTDX";
pub const MAGIC_OFFSET: usize = 0;
pub const VERSION_OFFSET: usize = 4;
pub const TYPE_OFFSET: usize = 8;
/// Bytes read per inspection: everything up to and including the type tag.
pub const HEADER_LEN: usize = TYPE_OFFSET + 4;
pub const ARCHIVE_EXTENSION: &str = "ba2";

const TAG_GENERAL: [u8; 4] = *b"GNRL";
const TAG_TEXTURE: [u8; 4] = *b"DX10";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchiveVersion {
    V1,
    V7,
    V8,
    Unknown,
}

/// Game release an archive version belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Generation {
    Original,
    NextGen,
}

impl ArchiveVersion {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 => ArchiveVersion::V1,
            0x07 => ArchiveVersion::V7,
            0x08 => ArchiveVersion::V8,
            _ => ArchiveVersion::Unknown,
        }
    }

    pub fn to_byte(self) -> Option<u8> {
        match self {
            ArchiveVersion::V1 => Some(0x01),
            ArchiveVersion::V7 => Some(0x07),
            ArchiveVersion::V8 => Some(0x08),
            ArchiveVersion::Unknown => None,
        }
    }

    pub fn generation(self) -> Option<Generation> {
        match self {
            ArchiveVersion::V1 => Some(Generation::Original),
            ArchiveVersion::V7 | ArchiveVersion::V8 => Some(Generation::NextGen),
            ArchiveVersion::Unknown => None,
        }
    }
}

impl fmt::Display for ArchiveVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveVersion::V1 => write!(f, "v1"),
            ArchiveVersion::V7 => write!(f, "v7"),
            ArchiveVersion::V8 => write!(f, "v8"),
            ArchiveVersion::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchiveType {
    General,
    Texture,
    Unknown,
}

impl ArchiveType {
    pub fn from_tag(tag: [u8; 4]) -> Self {
        match tag {
            TAG_GENERAL => ArchiveType::General,
            TAG_TEXTURE => ArchiveType::Texture,
            _ => ArchiveType::Unknown,
        }
    }
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveType::General => write!(f, "General"),
            ArchiveType::Texture => write!(f, "Texture"),
            ArchiveType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Raw fixed-size header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub magic: [u8; 4],
    pub version_byte: u8,
    pub type_tag: [u8; 4],
}

impl ArchiveHeader {
    /// Parse the header from the start of `buf`.
    ///
    /// Returns `None` when `buf` is shorter than [`HEADER_LEN`]; every field
    /// access is bounds-checked.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let magic = read_tag(buf, MAGIC_OFFSET)?;
        let version_byte = *buf.get(VERSION_OFFSET)?;
        let type_tag = read_tag(buf, TYPE_OFFSET)?;
        Some(Self { magic, version_byte, type_tag })
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == ARCHIVE_MAGIC
    }

    /// Decoded version; `Unknown` unless the magic matches.
    pub fn version(&self) -> ArchiveVersion {
        if !self.has_valid_magic() {
            return ArchiveVersion::Unknown;
        }
        ArchiveVersion::from_byte(self.version_byte)
    }

    /// Decoded type; `Unknown` unless the magic matches.
    pub fn archive_type(&self) -> ArchiveType {
        if !self.has_valid_magic() {
            return ArchiveType::Unknown;
        }
        ArchiveType::from_tag(self.type_tag)
    }
}

fn read_tag(buf: &[u8], offset: usize) -> Option<[u8; 4]> {
    let slice = buf.get(offset..offset.checked_add(4)?)?;
    let mut tag = [0u8; 4];
    tag.copy_from_slice(slice);
    Some(tag)
}

/// Snapshot of an archive's header plus filesystem metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub read_only: bool,
    pub version: ArchiveVersion,
    pub archive_type: ArchiveType,
}

impl ArchiveInfo {
    pub fn is_valid(&self) -> bool {
        self.version != ArchiveVersion::Unknown && self.archive_type != ArchiveType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn header_bytes(magic: &[u8; 4], version: u8, tag: &[u8; 4]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(magic);
        buf.extend_from_slice(&[version, 0, 0, 0]);
        buf.extend_from_slice(tag);
        buf
    }

    #[test_case(0x01, ArchiveVersion::V1)]
    #[test_case(0x07, ArchiveVersion::V7)]
    #[test_case(0x08, ArchiveVersion::V8)]
    #[test_case(0x02, ArchiveVersion::Unknown)]
    fn test_version_decoding(byte: u8, expected: ArchiveVersion) {
        let header = ArchiveHeader::parse(&header_bytes(b"BTDX", byte, b"GNRL")).unwrap();
        assert_eq!(header.version(), expected);
    }

    #[test_case(b"GNRL", ArchiveType::General)]
    #[test_case(b"DX10", ArchiveType::Texture)]
    #[test_case(b"gnrl", ArchiveType::Unknown)]
    fn test_type_decoding(tag: &[u8; 4], expected: ArchiveType) {
        let header = ArchiveHeader::parse(&header_bytes(b"BTDX", 1, tag)).unwrap();
        assert_eq!(header.archive_type(), expected);
    }

    #[test]
    fn test_wrong_magic_hides_fields() {
        let header = ArchiveHeader::parse(&header_bytes(b"BSA\0", 0x08, b"GNRL")).unwrap();
        assert_eq!(header.version(), ArchiveVersion::Unknown);
        assert_eq!(header.archive_type(), ArchiveType::Unknown);
    }

    #[test]
    fn test_short_buffers_do_not_parse() {
        let full = header_bytes(b"BTDX", 1, b"GNRL");
        for len in 0..HEADER_LEN {
            assert!(ArchiveHeader::parse(&full[..len]).is_none(), "len {} parsed", len);
        }
        assert!(ArchiveHeader::parse(&full).is_some());
    }

    #[test]
    fn test_version_byte_round_trip() {
        for version in [ArchiveVersion::V1, ArchiveVersion::V7, ArchiveVersion::V8] {
            assert_eq!(ArchiveVersion::from_byte(version.to_byte().unwrap()), version);
        }
        assert_eq!(ArchiveVersion::Unknown.to_byte(), None);
        assert_eq!(ArchiveVersion::V7.generation(), Some(Generation::NextGen));
        assert_eq!(ArchiveVersion::V1.generation(), Some(Generation::Original));
    }
}
