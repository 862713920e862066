//! Topology binary format types and constants.
//!
//! Defines section types, DAPM widget types, PCM format flags, vendor tuple
//! types and the fixed record sizes of the ALSA topology ABI (version 5).
//! All multi-byte fields are little-endian.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magic bytes at the start of every section header: "CoSA".
pub const TPLG_MAGIC: [u8; 4] = *b"CoSA";

/// ABI version written by the builder (`SND_SOC_TPLG_ABI_VERSION`).
pub const TPLG_ABI_VERSION: u32 = 5;

/// Size of a section header: magic + 8 u32 fields.
pub const SECTION_HEADER_SIZE: usize = 4 + 4 * 8;

/// Width of most identifier strings (`SNDRV_CTL_ELEM_ID_NAME_MAXLEN`).
pub const ID_NAME_MAXLEN: usize = 44;

/// Maximum channels per control / hw config channel map.
pub const MAX_CHANNEL: usize = 8;

/// Stream config slots in PCM and link records.
pub const STREAM_CONFIG_MAX: usize = 8;

/// Hardware config slots in a link record.
pub const HW_CONFIG_MAX: usize = 8;

/// TLV union size in 32-bit words.
pub const TLV_SIZE: usize = 32;

/// Enum control text entries.
pub const NUM_TEXTS: usize = 16;

/// Enum control value words (`NUM_TEXTS * ID_NAME_MAXLEN / 4`).
pub const ENUM_VALUES: usize = NUM_TEXTS * ID_NAME_MAXLEN / 4;

/// Reserved words at the end of the manifest record.
pub const MANIFEST_RESERVED_WORDS: usize = 20;

/// Fixed sizes of records, excluding trailing private data.
pub mod sizes {
    use super::*;

    /// `snd_soc_tplg_io_ops`.
    pub const IO_OPS: usize = 12;
    /// `snd_soc_tplg_ctl_tlv`.
    pub const CTL_TLV: usize = 8 + 4 * TLV_SIZE;
    /// `snd_soc_tplg_ctl_hdr`.
    pub const KCONTROL_HEADER: usize = 4 + 4 + ID_NAME_MAXLEN + 4 + IO_OPS + CTL_TLV;
    /// `snd_soc_tplg_channel`.
    pub const CHANNEL: usize = 16;
    /// Mixer control body without header.
    pub const MIXER_BODY: usize = 4 * 6 + MAX_CHANNEL * CHANNEL;
    /// Enum control body without header.
    pub const ENUM_BODY: usize =
        4 * 2 + MAX_CHANNEL * CHANNEL + 4 * 3 + NUM_TEXTS * ID_NAME_MAXLEN + ENUM_VALUES * 4;
    /// Bytes control body without header.
    pub const BYTES_BODY: usize = 4 * 5 + IO_OPS;
    /// `snd_soc_tplg_dapm_graph_elem`.
    pub const GRAPH_EDGE: usize = 3 * ID_NAME_MAXLEN;
    /// `snd_soc_tplg_dapm_widget` without private data.
    pub const WIDGET: usize = 4 * 2 + 2 * ID_NAME_MAXLEN + 4 * 6 + 2 * 2 + 4;
    /// `snd_soc_tplg_stream`.
    pub const STREAM_CONFIG: usize = 4 + ID_NAME_MAXLEN + 8 + 4 * 4;
    /// `snd_soc_tplg_stream_caps`.
    pub const STREAM_CAPS: usize = 4 + ID_NAME_MAXLEN + 8 + 4 * 12;
    /// `snd_soc_tplg_pcm` without private data.
    pub const PCM: usize =
        4 + 2 * ID_NAME_MAXLEN + 4 * 5 + STREAM_CONFIG_MAX * STREAM_CONFIG + 4 + 2 * STREAM_CAPS + 4 * 2;
    /// `snd_soc_tplg_hw_config`.
    pub const HW_CONFIG: usize = 4 * 3 + 6 + 2 + 4 * 8 + 4 * MAX_CHANNEL + 4 + 4 * MAX_CHANNEL;
    /// `snd_soc_tplg_link_config` without private data.
    pub const LINK: usize = 4 * 2
        + 2 * ID_NAME_MAXLEN
        + STREAM_CONFIG_MAX * STREAM_CONFIG
        + 4
        + HW_CONFIG_MAX * HW_CONFIG
        + 4 * 4;
    /// `snd_soc_tplg_manifest` without private data.
    pub const MANIFEST: usize = 4 * 7 + 4 * MANIFEST_RESERVED_WORDS;
    /// Vendor array header: size + type + num_elems.
    pub const VENDOR_ARRAY_HEADER: usize = 12;
}

/// Section (block header) type, `SND_SOC_TPLG_TYPE_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SectionType {
    Mixer,
    Bytes,
    Enum,
    DapmGraph,
    DapmWidget,
    DaiLink,
    Pcm,
    Manifest,
    CodecLink,
    BackendLink,
    Pdata,
    Dai,
    /// Any value this crate does not know; carried through untouched.
    Unknown(u32),
}

impl SectionType {
    /// Raw header value.
    pub fn as_u32(self) -> u32 {
        match self {
            SectionType::Mixer => 1,
            SectionType::Bytes => 2,
            SectionType::Enum => 3,
            SectionType::DapmGraph => 4,
            SectionType::DapmWidget => 5,
            SectionType::DaiLink => 6,
            SectionType::Pcm => 7,
            SectionType::Manifest => 8,
            SectionType::CodecLink => 9,
            SectionType::BackendLink => 10,
            SectionType::Pdata => 11,
            SectionType::Dai => 12,
            SectionType::Unknown(v) => v,
        }
    }

    /// True for the three kcontrol section types.
    pub fn is_kcontrol(self) -> bool {
        matches!(self, SectionType::Mixer | SectionType::Bytes | SectionType::Enum)
    }

    /// True for section types carrying `snd_soc_tplg_link_config` records.
    pub fn is_link(self) -> bool {
        matches!(
            self,
            SectionType::DaiLink | SectionType::CodecLink | SectionType::BackendLink
        )
    }
}

impl From<u32> for SectionType {
    fn from(v: u32) -> Self {
        match v {
            1 => SectionType::Mixer,
            2 => SectionType::Bytes,
            3 => SectionType::Enum,
            4 => SectionType::DapmGraph,
            5 => SectionType::DapmWidget,
            6 => SectionType::DaiLink,
            7 => SectionType::Pcm,
            8 => SectionType::Manifest,
            9 => SectionType::CodecLink,
            10 => SectionType::BackendLink,
            11 => SectionType::Pdata,
            12 => SectionType::Dai,
            other => SectionType::Unknown(other),
        }
    }
}

/// DAPM widget type, `SND_SOC_TPLG_DAPM_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DapmType {
    #[default]
    Input,
    Output,
    Mux,
    Mixer,
    Pga,
    OutDrv,
    Adc,
    Dac,
    Switch,
    Pre,
    Post,
    AifIn,
    AifOut,
    DaiIn,
    DaiOut,
    DaiLink,
    Buffer,
    Scheduler,
    Effect,
    Siggen,
    Src,
    Asrc,
    Encoder,
    Decoder,
    Other(u32),
}

const DAPM_TYPES: [DapmType; 24] = [
    DapmType::Input,
    DapmType::Output,
    DapmType::Mux,
    DapmType::Mixer,
    DapmType::Pga,
    DapmType::OutDrv,
    DapmType::Adc,
    DapmType::Dac,
    DapmType::Switch,
    DapmType::Pre,
    DapmType::Post,
    DapmType::AifIn,
    DapmType::AifOut,
    DapmType::DaiIn,
    DapmType::DaiOut,
    DapmType::DaiLink,
    DapmType::Buffer,
    DapmType::Scheduler,
    DapmType::Effect,
    DapmType::Siggen,
    DapmType::Src,
    DapmType::Asrc,
    DapmType::Encoder,
    DapmType::Decoder,
];

impl DapmType {
    /// Raw widget `id` value.
    pub fn as_u32(self) -> u32 {
        match self {
            DapmType::Other(v) => v,
            known => DAPM_TYPES.iter().position(|t| *t == known).unwrap_or_default() as u32,
        }
    }
}

impl From<u32> for DapmType {
    fn from(v: u32) -> Self {
        DAPM_TYPES.get(v as usize).copied().unwrap_or(DapmType::Other(v))
    }
}

/// PCM sample format bits (`SND_PCM_FMTBIT_*`) with their display names.
pub const PCM_FORMATS: [(u64, &str); 16] = [
    (1 << 0, "S8"),
    (1 << 1, "U8"),
    (1 << 2, "S16_LE"),
    (1 << 3, "S16_BE"),
    (1 << 4, "U16_LE"),
    (1 << 5, "U16_BE"),
    (1 << 6, "S24_LE"),
    (1 << 7, "S24_BE"),
    (1 << 8, "U24_LE"),
    (1 << 9, "U24_BE"),
    (1 << 10, "S32_LE"),
    (1 << 11, "S32_BE"),
    (1 << 12, "U32_LE"),
    (1 << 13, "U32_BE"),
    (1 << 14, "FLOAT_LE"),
    (1 << 15, "FLOAT_BE"),
];

/// Names of the format bits set in `formats`, lowest bit first.
pub fn format_names(formats: u64) -> Vec<&'static str> {
    PCM_FORMATS
        .iter()
        .filter(|(bit, _)| formats & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// Vendor tuple array type, `SND_SOC_TPLG_TUPLE_TYPE_*`. Decides element layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TupleType {
    Uuid,
    String,
    Bool,
    Byte,
    Word,
    Short,
}

impl TupleType {
    /// Raw array `type` value.
    pub fn as_u32(self) -> u32 {
        match self {
            TupleType::Uuid => 0,
            TupleType::String => 1,
            TupleType::Bool => 2,
            TupleType::Byte => 3,
            TupleType::Word => 4,
            TupleType::Short => 5,
        }
    }

    /// Parse a raw array type; `None` for unknown tags.
    pub fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            0 => TupleType::Uuid,
            1 => TupleType::String,
            2 => TupleType::Bool,
            3 => TupleType::Byte,
            4 => TupleType::Word,
            5 => TupleType::Short,
            _ => return None,
        })
    }

    /// Size of one element (token + value) on the wire.
    pub fn element_size(self) -> usize {
        4 + match self {
            TupleType::Uuid => 16,
            TupleType::String => ID_NAME_MAXLEN,
            TupleType::Bool | TupleType::Byte | TupleType::Word | TupleType::Short => 4,
        }
    }
}

/// SOF vendor tokens this crate looks up. Values follow the SOF `tokens.h` ABI.
pub mod tokens {
    /// Scheduler period in microseconds.
    pub const SOF_TKN_SCHED_PERIOD: u32 = 200;
    /// Scheduler priority.
    pub const SOF_TKN_SCHED_PRIORITY: u32 = 201;
    /// Scheduler core.
    pub const SOF_TKN_SCHED_CORE: u32 = 203;
    /// Pipeline is powered up on demand.
    pub const SOF_TKN_SCHED_DYNAMIC_PIPELINE: u32 = 206;
    /// Core a component runs on.
    pub const SOF_TKN_COMP_CORE_ID: u32 = 404;
    /// Component module UUID.
    pub const SOF_TKN_COMP_UUID: u32 = 405;
    /// Cycles per chunk.
    pub const SOF_TKN_COMP_CPC: u32 = 406;
    /// Kcontrol names are not prefixed with the widget name.
    pub const SOF_TKN_COMP_NO_WNAME_IN_KCONTROL_NAME: u32 = 417;
}
