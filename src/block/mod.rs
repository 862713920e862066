//! Per-block byte layouts and the section-type driven dispatch between them.
//!
//! Each block kind has one decode/encode pair. Nothing here knows about
//! other blocks; cross-block views live in [`crate::grouped`].

mod kcontrol;
mod stream;
mod widget;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use kcontrol::{
    BytesControl, Channel, CtlTlv, EnumControl, IoOps, Kcontrol, KcontrolBody, KcontrolHeader,
    MixerControl, TlvDbScale,
};
pub use stream::{HwConfig, LinkConfig, Pcm, StreamCaps, StreamConfig};
pub use widget::{TupleValue, VendorArray, VendorTuple, Widget};

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{EncodeError, FormatError};
use crate::format::{sizes, SectionType, ID_NAME_MAXLEN, MANIFEST_RESERVED_WORDS};

/// `snd_soc_tplg_dapm_graph_elem`: a directed route `source -> sink`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphEdge {
    pub source: String,
    pub control: String,
    pub sink: String,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, sink: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            control: String::new(),
            sink: sink.into(),
        }
    }

    // Wire order is sink, control, source.
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let sink = r.fixed_str(ID_NAME_MAXLEN, "graph.sink")?;
        let control = r.fixed_str(ID_NAME_MAXLEN, "graph.control")?;
        let source = r.fixed_str(ID_NAME_MAXLEN, "graph.source")?;
        Ok(Self { source, control, sink })
    }

    fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        w.fixed_str(&self.sink, ID_NAME_MAXLEN, "graph.sink")?;
        w.fixed_str(&self.control, ID_NAME_MAXLEN, "graph.control")?;
        w.fixed_str(&self.source, ID_NAME_MAXLEN, "graph.source")
    }
}

/// `snd_soc_tplg_manifest`: per-type element counts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Manifest {
    pub size: u32,
    pub control_elems: u32,
    pub widget_elems: u32,
    pub graph_elems: u32,
    pub pcm_elems: u32,
    pub dai_link_elems: u32,
    pub dai_elems: u32,
    pub private: Vec<u8>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            size: sizes::MANIFEST as u32,
            control_elems: 0,
            widget_elems: 0,
            graph_elems: 0,
            pcm_elems: 0,
            dai_link_elems: 0,
            dai_elems: 0,
            private: Vec::new(),
        }
    }
}

impl Manifest {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let manifest = Self {
            size: r.u32("manifest.size")?,
            control_elems: r.u32("manifest.control_elems")?,
            widget_elems: r.u32("manifest.widget_elems")?,
            graph_elems: r.u32("manifest.graph_elems")?,
            pcm_elems: r.u32("manifest.pcm_elems")?,
            dai_link_elems: r.u32("manifest.dai_link_elems")?,
            dai_elems: r.u32("manifest.dai_elems")?,
            private: Vec::new(),
        };
        r.skip(4 * MANIFEST_RESERVED_WORDS, "manifest.reserved")?;
        Ok(Self {
            private: r.private("manifest.priv")?.bytes_all(),
            ..manifest
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        for v in [
            self.size,
            self.control_elems,
            self.widget_elems,
            self.graph_elems,
            self.pcm_elems,
            self.dai_link_elems,
            self.dai_elems,
        ] {
            w.u32(v);
        }
        w.zeros(4 * MANIFEST_RESERVED_WORDS);
        w.private(&self.private, "manifest.priv")
    }
}

/// One decoded block of a known section type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Block {
    Manifest(Manifest),
    Kcontrol(Kcontrol),
    GraphEdge(GraphEdge),
    Widget(Widget),
    Pcm(Pcm),
    Link(LinkConfig),
}

impl Block {
    /// True if blocks of `section_type` have a layout this crate decodes.
    pub fn is_decodable(section_type: SectionType) -> bool {
        matches!(
            section_type,
            SectionType::Manifest | SectionType::DapmGraph | SectionType::DapmWidget | SectionType::Pcm
        ) || section_type.is_kcontrol()
            || section_type.is_link()
    }

    /// Decode one block of `section_type` from the start of `bytes`.
    /// Returns the block and the number of bytes it occupied.
    ///
    /// Returns `Ok(None)` for section types without a known block layout.
    pub fn decode(bytes: &[u8], section_type: SectionType) -> Result<Option<(Block, usize)>, FormatError> {
        let mut r = ByteReader::new(bytes);
        let block = Self::decode_from(&mut r, section_type)?;
        Ok(block.map(|b| (b, r.consumed())))
    }

    pub(crate) fn decode_from(
        r: &mut ByteReader<'_>,
        section_type: SectionType,
    ) -> Result<Option<Block>, FormatError> {
        let block = match section_type {
            SectionType::Manifest => Block::Manifest(Manifest::decode(r)?),
            t if t.is_kcontrol() => Block::Kcontrol(Kcontrol::decode(r)?),
            SectionType::DapmGraph => Block::GraphEdge(GraphEdge::decode(r)?),
            SectionType::DapmWidget => Block::Widget(Widget::decode(r)?),
            SectionType::Pcm => Block::Pcm(Pcm::decode(r)?),
            t if t.is_link() => Block::Link(LinkConfig::decode(r)?),
            _ => return Ok(None),
        };
        Ok(Some(block))
    }

    /// Encode this block to its wire form.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut w = ByteWriter::new();
        self.encode_into(&mut w)?;
        Ok(w.into_inner())
    }

    pub(crate) fn encode_into(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        match self {
            Block::Manifest(m) => m.encode(w),
            Block::Kcontrol(k) => k.encode(w),
            Block::GraphEdge(e) => e.encode(w),
            Block::Widget(wd) => wd.encode(w),
            Block::Pcm(p) => p.encode(w),
            Block::Link(l) => l.encode(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatReason;
    use crate::format::{tokens, DapmType, TupleType};

    fn sample_widget() -> Widget {
        Widget {
            id: DapmType::Pga,
            name: "PGA1.1".to_string(),
            private: vec![
                VendorArray {
                    tuple_type: TupleType::Word,
                    tuples: vec![VendorTuple {
                        token: tokens::SOF_TKN_COMP_CORE_ID,
                        value: TupleValue::Scalar(1),
                    }],
                },
                VendorArray {
                    tuple_type: TupleType::Uuid,
                    tuples: vec![VendorTuple {
                        token: tokens::SOF_TKN_COMP_UUID,
                        value: TupleValue::Uuid([7; 16]),
                    }],
                },
            ],
            kcontrols: vec![Kcontrol {
                hdr: KcontrolHeader {
                    name: "Master Playback Volume".to_string(),
                    ..KcontrolHeader::default()
                },
                body: KcontrolBody::Mixer(MixerControl {
                    max: 32,
                    private: vec![1, 2, 3],
                    ..MixerControl::default()
                }),
            }],
            ..Widget::default()
        }
    }

    #[test]
    fn graph_edge_wire_order_is_sink_control_source() {
        let edge = GraphEdge {
            source: "A".into(),
            control: "C".into(),
            sink: "B".into(),
        };
        let raw = Block::GraphEdge(edge.clone()).encode().unwrap();
        assert_eq!(raw.len(), sizes::GRAPH_EDGE);
        assert_eq!(raw[0], b'B');
        assert_eq!(raw[ID_NAME_MAXLEN], b'C');
        assert_eq!(raw[2 * ID_NAME_MAXLEN], b'A');
        let (block, used) = Block::decode(&raw, SectionType::DapmGraph).unwrap().unwrap();
        assert_eq!(used, raw.len());
        assert_eq!(block, Block::GraphEdge(edge));
    }

    #[test]
    fn widget_with_tuples_and_kcontrol_decodes_back() {
        let widget = sample_widget();
        let raw = Block::Widget(widget.clone()).encode().unwrap();
        let tuples_len = 12 + 8 + 12 + 20;
        let expected = sizes::WIDGET + 4 + tuples_len + sizes::KCONTROL_HEADER + sizes::MIXER_BODY + 4 + 3;
        assert_eq!(raw.len(), expected);
        let (block, used) = Block::decode(&raw, SectionType::DapmWidget).unwrap().unwrap();
        assert_eq!(used, expected);
        assert_eq!(block, Block::Widget(widget));
    }

    #[test]
    fn unknown_tuple_type_is_fatal() {
        let mut raw = Block::Widget(sample_widget()).encode().unwrap();
        // First vendor array type word sits after widget header, priv size and array size.
        let type_at = sizes::WIDGET + 4 + 4;
        raw[type_at..type_at + 4].copy_from_slice(&9u32.to_le_bytes());
        let err = Block::decode(&raw, SectionType::DapmWidget).unwrap_err();
        assert_eq!(err.reason, FormatReason::UnknownTupleType(9));
        assert_eq!(err.offset, type_at);
    }

    #[test]
    fn vendor_array_size_must_match_elements() {
        let mut raw = Block::Widget(sample_widget()).encode().unwrap();
        let size_at = sizes::WIDGET + 4;
        raw[size_at..size_at + 4].copy_from_slice(&24u32.to_le_bytes());
        let err = Block::decode(&raw, SectionType::DapmWidget).unwrap_err();
        assert!(matches!(err.reason, FormatReason::SizeMismatch { what: "vendor_array", declared: 24, consumed: 20 }));
    }

    #[test]
    fn unknown_kcontrol_type_is_fatal() {
        let mut raw = Block::Widget(sample_widget()).encode().unwrap();
        let kc_type_at = sizes::WIDGET + 4 + 52 + 4;
        raw[kc_type_at..kc_type_at + 4].copy_from_slice(&42u32.to_le_bytes());
        let err = Block::decode(&raw, SectionType::DapmWidget).unwrap_err();
        assert_eq!(err.reason, FormatReason::UnknownKcontrolType(42));
    }

    #[test]
    fn tuple_shape_mismatch_fails_encode() {
        let mut widget = sample_widget();
        widget.private[0].tuples[0].value = TupleValue::String("x".into());
        let err = Block::Widget(widget).encode().unwrap_err();
        assert!(matches!(err, EncodeError::TupleShape { .. }));
    }

    #[test]
    fn enum_control_has_fixed_layout() {
        let kc = Kcontrol {
            hdr: KcontrolHeader::default(),
            body: KcontrolBody::Enum(EnumControl {
                items: 2,
                texts: {
                    let mut t = vec![String::new(); crate::format::NUM_TEXTS];
                    t[0] = "Off".into();
                    t[1] = "On".into();
                    t
                },
                ..EnumControl::default()
            }),
        };
        let raw = Block::Kcontrol(kc.clone()).encode().unwrap();
        assert_eq!(raw.len(), sizes::KCONTROL_HEADER + sizes::ENUM_BODY + 4);
        let (block, _) = Block::decode(&raw, SectionType::Enum).unwrap().unwrap();
        assert_eq!(block, Block::Kcontrol(kc));
    }

    #[test]
    fn pcm_and_link_have_abi_sizes() {
        let pcm = Block::Pcm(Pcm::default()).encode().unwrap();
        assert_eq!(pcm.len(), sizes::PCM + 4);
        let link = Block::Link(LinkConfig::default()).encode().unwrap();
        assert_eq!(link.len(), sizes::LINK + 4);
        let manifest = Block::Manifest(Manifest::default()).encode().unwrap();
        assert_eq!(manifest.len(), sizes::MANIFEST + 4);
    }

    #[test]
    fn unknown_section_type_has_no_block_layout() {
        assert!(Block::decode(&[0u8; 8], SectionType::Unknown(99)).unwrap().is_none());
        assert!(Block::decode(&[0u8; 8], SectionType::Dai).unwrap().is_none());
    }
}
