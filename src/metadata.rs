//! Extension Metadata Footer
//!
//! Defines the fixed footer appended to a DuckDB loadable extension.
//! The artifact structure is:
//! [shared library][0x00][outer_len:varint][16]["duckdb_signature"][payload_len:varint][8 x 32-byte fields][256-byte signature]
//!
//! The framing makes the footer a WebAssembly custom section, so Wasm builds
//! stay valid modules after the metadata is appended.

use crate::error::{MetadataError, Result};
use crate::varint;

/// Section id of a WebAssembly custom section
pub const CUSTOM_SECTION_TAG: u8 = 0x00;

/// Name of the custom section carrying the metadata
pub const SECTION_NAME: &[u8; 16] = b"duckdb_signature";

/// Width of every metadata field slot
pub const FIELD_WIDTH: usize = 32;

/// Number of field slots in the payload
pub const FIELD_COUNT: usize = 8;

/// Bytes reserved for a signature over the artifact
pub const SIGNATURE_LEN: usize = 256;

/// Value of the last field, identifying a DuckDB extension footer
pub const MAGIC_VALUE: &str = "4";

/// ABI type written when none is given
pub const DEFAULT_ABI_TYPE: &str = "C_STRUCT";

/// Bytes following the payload-length prefix: field slots plus signature
pub const PAYLOAD_LEN: usize = FIELD_COUNT * FIELD_WIDTH + SIGNATURE_LEN;

/// Bytes counted by the outer length prefix
pub const SECTION_BODY_LEN: usize =
    1 + SECTION_NAME.len() + varint::encoded_len(PAYLOAD_LEN as u64) + PAYLOAD_LEN;

/// Total size of the footer appended after the raw library
pub const FOOTER_LEN: usize = 1 + varint::encoded_len(SECTION_BODY_LEN as u64) + SECTION_BODY_LEN;

/// The values written into the footer fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMetadata {
    /// Calling-convention contract the library was built against (e.g. "C_STRUCT")
    pub abi_type: String,

    /// Version of the extension itself, usually a git tag or short hash
    pub extension_version: String,

    /// DuckDB version, or C API version depending on the ABI type
    pub duckdb_version: String,

    /// DuckDB platform identifier (e.g. "linux_amd64")
    pub duckdb_platform: String,
}

impl ExtensionMetadata {
    pub fn new(
        duckdb_platform: impl Into<String>,
        duckdb_version: impl Into<String>,
        extension_version: impl Into<String>,
    ) -> Self {
        Self {
            abi_type: DEFAULT_ABI_TYPE.to_string(),
            extension_version: extension_version.into(),
            duckdb_version: duckdb_version.into(),
            duckdb_platform: duckdb_platform.into(),
        }
    }

    pub fn with_abi_type(mut self, abi_type: impl Into<String>) -> Self {
        self.abi_type = abi_type.into();
        self
    }

    /// Field names and values in on-disk order, reserved slots included
    pub fn fields(&self) -> [(&'static str, &str); FIELD_COUNT] {
        [
            ("unused", ""),
            ("unused", ""),
            ("unused", ""),
            ("abi_type", &self.abi_type),
            ("extension_version", &self.extension_version),
            ("duckdb_version", &self.duckdb_version),
            ("duckdb_platform", &self.duckdb_platform),
            ("magic", MAGIC_VALUE),
        ]
    }

    /// Check every field fits its slot without writing anything
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.fields() {
            encode_field(name, value)?;
        }
        Ok(())
    }

    /// Build the complete footer
    pub fn encode_footer(&self) -> Result<Vec<u8>> {
        let mut footer = Vec::with_capacity(FOOTER_LEN);

        footer.push(CUSTOM_SECTION_TAG);
        varint::encode_into(SECTION_BODY_LEN as u64, &mut footer);
        footer.push(SECTION_NAME.len() as u8);
        footer.extend_from_slice(SECTION_NAME);
        varint::encode_into(PAYLOAD_LEN as u64, &mut footer);

        for (name, value) in self.fields() {
            footer.extend_from_slice(&encode_field(name, value)?);
        }
        footer.resize(footer.len() + SIGNATURE_LEN, 0);

        debug_assert_eq!(footer.len(), FOOTER_LEN);
        Ok(footer)
    }
}

/// Encode a value as a left-justified, zero-padded 32-byte ASCII slot
pub fn encode_field(field: &'static str, value: &str) -> Result<[u8; FIELD_WIDTH]> {
    if !value.is_ascii() {
        return Err(MetadataError::Encoding {
            field,
            reason: format!("value {value:?} is not ASCII"),
        });
    }
    if value.len() > FIELD_WIDTH {
        return Err(MetadataError::Encoding {
            field,
            reason: format!(
                "value {value:?} is {} bytes, the slot holds at most {FIELD_WIDTH}",
                value.len()
            ),
        });
    }

    let mut slot = [0u8; FIELD_WIDTH];
    slot[..value.len()].copy_from_slice(value.as_bytes());
    Ok(slot)
}

/// A footer read back from an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFooter {
    pub metadata: ExtensionMetadata,

    /// Length of the raw library preceding the footer
    pub library_len: u64,

    /// Raw 256-byte signature block
    pub signature: Vec<u8>,
}

impl ExtensionFooter {
    /// Parse the footer at the end of a complete artifact
    pub fn parse(artifact: &[u8]) -> Result<Self> {
        if artifact.len() < FOOTER_LEN {
            return Err(MetadataError::InvalidFooter(format!(
                "file is {} bytes, shorter than the {FOOTER_LEN}-byte footer",
                artifact.len()
            )));
        }

        let library_len = artifact.len() - FOOTER_LEN;
        let footer = &artifact[library_len..];

        if footer[0] != CUSTOM_SECTION_TAG {
            return Err(MetadataError::InvalidFooter(format!(
                "expected custom section tag 0x00, found {:#04x}",
                footer[0]
            )));
        }
        let mut pos = 1;

        let section_len = read_length(footer, &mut pos, "section")?;
        if section_len != SECTION_BODY_LEN as u64 {
            return Err(MetadataError::InvalidFooter(format!(
                "section length is {section_len}, expected {SECTION_BODY_LEN}"
            )));
        }

        let name_len = usize::from(footer[pos]);
        pos += 1;
        if name_len != SECTION_NAME.len() || &footer[pos..pos + name_len] != SECTION_NAME {
            return Err(MetadataError::InvalidFooter(
                "section is not named duckdb_signature".to_string(),
            ));
        }
        pos += name_len;

        let payload_len = read_length(footer, &mut pos, "payload")?;
        if payload_len != PAYLOAD_LEN as u64 {
            return Err(MetadataError::InvalidFooter(format!(
                "payload length is {payload_len}, expected {PAYLOAD_LEN}"
            )));
        }
        if pos != FOOTER_LEN - PAYLOAD_LEN {
            return Err(MetadataError::InvalidFooter(
                "non-canonical length encoding".to_string(),
            ));
        }

        let mut values = Vec::with_capacity(FIELD_COUNT);
        for slot in footer[pos..pos + FIELD_COUNT * FIELD_WIDTH].chunks_exact(FIELD_WIDTH) {
            values.push(decode_field(slot)?);
        }
        pos += FIELD_COUNT * FIELD_WIDTH;

        if values[7] != MAGIC_VALUE {
            return Err(MetadataError::InvalidFooter(format!(
                "magic field is {:?}, expected {MAGIC_VALUE:?}",
                values[7]
            )));
        }

        let metadata = ExtensionMetadata {
            abi_type: values[3].clone(),
            extension_version: values[4].clone(),
            duckdb_version: values[5].clone(),
            duckdb_platform: values[6].clone(),
        };

        Ok(Self {
            metadata,
            library_len: library_len as u64,
            signature: footer[pos..].to_vec(),
        })
    }
}

fn read_length(footer: &[u8], pos: &mut usize, what: &str) -> Result<u64> {
    let (value, used) = varint::decode(&footer[*pos..])
        .ok_or_else(|| MetadataError::InvalidFooter(format!("malformed {what} length")))?;
    *pos += used;
    Ok(value)
}

fn decode_field(slot: &[u8]) -> Result<String> {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    if slot[end..].iter().any(|&b| b != 0) {
        return Err(MetadataError::InvalidFooter(
            "field has data after its zero padding".to_string(),
        ));
    }
    std::str::from_utf8(&slot[..end])
        .ok()
        .filter(|s| s.is_ascii())
        .map(str::to_string)
        .ok_or_else(|| MetadataError::InvalidFooter("field is not ASCII".to_string()))
}
