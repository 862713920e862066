//! Topology document: a whole `.tplg` file as an ordered list of sections.
//!
//! Sections of unknown type keep their payload verbatim so that a parsed
//! document always builds back.

use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::codec::{len_u32, ByteReader, ByteWriter};
use crate::error::{EncodeError, FormatError, FormatReason, TplgError};
use crate::format::{SectionType, SECTION_HEADER_SIZE, TPLG_ABI_VERSION, TPLG_MAGIC};

/// Parsed section header (`snd_soc_tplg_hdr`, magic excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SectionHeader {
    pub abi: u32,
    pub version: u32,
    pub section_type: SectionType,
    pub vendor_type: u32,
    /// Declared payload size. Recomputed on build.
    pub payload_size: u32,
    pub index: u32,
    /// Declared block count. Recomputed on build.
    pub count: u32,
}

impl SectionHeader {
    pub fn new(section_type: SectionType, index: u32) -> Self {
        Self {
            abi: TPLG_ABI_VERSION,
            version: 0,
            section_type,
            vendor_type: 0,
            payload_size: 0,
            index,
            count: 0,
        }
    }

    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let magic_at = r.offset();
        let magic: [u8; 4] = r.array("header.magic")?;
        if magic != TPLG_MAGIC {
            return Err(FormatError::new(magic_at, FormatReason::BadMagic(magic)));
        }
        let abi = r.u32("header.abi")?;
        let version = r.u32("header.version")?;
        let section_type = SectionType::from(r.u32("header.type")?);
        let size_at = r.offset();
        let size = r.u32("header.size")?;
        if size as usize != SECTION_HEADER_SIZE {
            return Err(FormatError::new(size_at, FormatReason::BadHeaderSize(size)));
        }
        Ok(Self {
            abi,
            version,
            section_type,
            vendor_type: r.u32("header.vendor_type")?,
            payload_size: r.u32("header.payload_size")?,
            index: r.u32("header.index")?,
            count: r.u32("header.count")?,
        })
    }

    fn encode(&self, w: &mut ByteWriter) {
        w.bytes(&TPLG_MAGIC);
        w.u32(self.abi);
        w.u32(self.version);
        w.u32(self.section_type.as_u32());
        w.u32(SECTION_HEADER_SIZE as u32);
        w.u32(self.vendor_type);
        w.u32(self.payload_size);
        w.u32(self.index);
        w.u32(self.count);
    }
}

/// Section payload: decoded blocks, or raw bytes for types without a known layout.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SectionBody {
    Blocks(Vec<Block>),
    Opaque(Vec<u8>),
}

/// A header and the blocks it introduces.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Section {
    pub header: SectionHeader,
    pub body: SectionBody,
}

impl Section {
    /// Build a section with a default header and consistent count / payload size.
    pub fn new(section_type: SectionType, index: u32, blocks: Vec<Block>) -> Result<Self, EncodeError> {
        let mut section = Self {
            header: SectionHeader::new(section_type, index),
            body: SectionBody::Blocks(blocks),
        };
        let payload = section.encode_payload()?;
        section.header.payload_size = len_u32(payload.len(), "section payload")?;
        section.header.count = section.block_count()?;
        Ok(section)
    }

    pub fn section_type(&self) -> SectionType {
        self.header.section_type
    }

    /// Decoded blocks; empty for opaque sections.
    pub fn blocks(&self) -> &[Block] {
        match &self.body {
            SectionBody::Blocks(blocks) => blocks,
            SectionBody::Opaque(_) => &[],
        }
    }

    fn block_count(&self) -> Result<u32, EncodeError> {
        match &self.body {
            SectionBody::Blocks(blocks) => len_u32(blocks.len(), "section count"),
            SectionBody::Opaque(_) => Ok(self.header.count),
        }
    }

    fn encode_payload(&self) -> Result<Vec<u8>, EncodeError> {
        match &self.body {
            SectionBody::Blocks(blocks) => {
                let mut w = ByteWriter::new();
                for block in blocks {
                    block.encode_into(&mut w)?;
                }
                Ok(w.into_inner())
            }
            SectionBody::Opaque(raw) => Ok(raw.clone()),
        }
    }

    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let header = SectionHeader::decode(r)?;
        let mut payload = r.sub(header.payload_size as usize, "section payload")?;
        if !Block::is_decodable(header.section_type) {
            tracing::warn!(
                section_type = header.section_type.as_u32(),
                payload_size = header.payload_size,
                "skipping section of unsupported type"
            );
            return Ok(Self {
                header,
                body: SectionBody::Opaque(payload.bytes_all()),
            });
        }

        let mut blocks = Vec::new();
        for _ in 0..header.count {
            if let Some(block) = Block::decode_from(&mut payload, header.section_type)? {
                blocks.push(block);
            }
        }
        if !payload.is_empty() {
            return Err(payload.error(FormatReason::SizeMismatch {
                what: "section payload",
                declared: header.payload_size as usize,
                consumed: payload.consumed(),
            }));
        }
        tracing::debug!(
            section_type = ?header.section_type,
            index = header.index,
            blocks = blocks.len(),
            "decoded section"
        );
        Ok(Self {
            header,
            body: SectionBody::Blocks(blocks),
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        let payload = self.encode_payload()?;
        let header = SectionHeader {
            payload_size: len_u32(payload.len(), "section payload")?,
            count: self.block_count()?,
            ..self.header
        };
        header.encode(w);
        w.bytes(&payload);
        Ok(())
    }
}

/// A whole topology file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Parse a complete topology image. Every byte must belong to a section.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut r = ByteReader::new(bytes);
        let mut sections = Vec::new();
        while !r.is_empty() {
            if r.remaining() < SECTION_HEADER_SIZE {
                return Err(r.error(FormatReason::TrailingData(r.remaining())));
            }
            sections.push(Section::decode(&mut r)?);
        }
        Ok(Self { sections })
    }

    /// Read and parse a topology file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TplgError> {
        let bytes = std::fs::read(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), len = bytes.len(), "parsing topology");
        Ok(Self::parse(&bytes)?)
    }

    /// Encode all sections in order.
    pub fn build(&self) -> Result<Vec<u8>, EncodeError> {
        let mut w = ByteWriter::new();
        for section in &self.sections {
            section.encode(&mut w)?;
        }
        Ok(w.into_inner())
    }

    /// Iterate over every decoded block with the type of its section.
    pub fn blocks(&self) -> impl Iterator<Item = (SectionType, &Block)> {
        self.sections
            .iter()
            .flat_map(|s| s.blocks().iter().map(move |b| (s.section_type(), b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{GraphEdge, Manifest};

    #[test]
    fn empty_input_is_an_empty_document() {
        assert_eq!(Document::parse(&[]).unwrap(), Document::default());
    }

    #[test]
    fn section_new_computes_header() {
        let section = Section::new(
            SectionType::DapmGraph,
            3,
            vec![Block::GraphEdge(GraphEdge::new("a", "b")), Block::GraphEdge(GraphEdge::new("b", "c"))],
        )
        .unwrap();
        assert_eq!(section.header.count, 2);
        assert_eq!(section.header.payload_size, 2 * 132);
        assert_eq!(section.header.index, 3);
        assert_eq!(section.header.abi, TPLG_ABI_VERSION);
    }

    #[test]
    fn short_tail_is_trailing_data() {
        let section = Section::new(SectionType::Manifest, 0, vec![Block::Manifest(Manifest::default())]).unwrap();
        let doc = Document::new(vec![section]);
        let mut raw = doc.build().unwrap();
        raw.extend_from_slice(&[0u8; 5]);
        let err = Document::parse(&raw).unwrap_err();
        assert_eq!(err.reason, FormatReason::TrailingData(5));
    }

    #[test]
    fn payload_larger_than_blocks_is_rejected() {
        let edge = Block::GraphEdge(GraphEdge::new("a", "b"));
        let doc = Document::new(vec![Section::new(SectionType::DapmGraph, 0, vec![edge]).unwrap()]);
        let mut raw = doc.build().unwrap();
        // Bump payload_size and append the matching extra bytes.
        raw[24..28].copy_from_slice(&(132u32 + 4).to_le_bytes());
        raw.extend_from_slice(&[0u8; 4]);
        let err = Document::parse(&raw).unwrap_err();
        assert!(matches!(err.reason, FormatReason::SizeMismatch { what: "section payload", .. }));
    }
}
