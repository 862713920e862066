//! Kcontrol records: a common header followed by a mixer, enum or bytes body.
//!
//! The header's `type` word selects the body layout, so it is not stored on
//! [`Kcontrol`]; it is derived from the [`KcontrolBody`] variant on encode.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{EncodeError, FormatError, FormatReason};
use crate::format::{SectionType, ENUM_VALUES, ID_NAME_MAXLEN, MAX_CHANNEL, NUM_TEXTS, TLV_SIZE};

/// `snd_soc_tplg_io_ops`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IoOps {
    pub get: u32,
    pub put: u32,
    pub info: u32,
}

impl IoOps {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            get: r.u32("io_ops.get")?,
            put: r.u32("io_ops.put")?,
            info: r.u32("io_ops.info")?,
        })
    }

    fn encode(&self, w: &mut ByteWriter) {
        w.u32(self.get);
        w.u32(self.put);
        w.u32(self.info);
    }
}

/// dB scale carried in the TLV union; the rest of the union is padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TlvDbScale {
    pub min: u32,
    pub step: u32,
    pub mute: u32,
}

/// `snd_soc_tplg_ctl_tlv`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CtlTlv {
    pub size: u32,
    pub tlv_type: u32,
    pub scale: TlvDbScale,
}

impl CtlTlv {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let size = r.u32("tlv.size")?;
        let tlv_type = r.u32("tlv.type")?;
        let scale = TlvDbScale {
            min: r.u32("tlv.scale.min")?,
            step: r.u32("tlv.scale.step")?,
            mute: r.u32("tlv.scale.mute")?,
        };
        r.skip(4 * (TLV_SIZE - 3), "tlv padding")?;
        Ok(Self { size, tlv_type, scale })
    }

    fn encode(&self, w: &mut ByteWriter) {
        w.u32(self.size);
        w.u32(self.tlv_type);
        w.u32(self.scale.min);
        w.u32(self.scale.step);
        w.u32(self.scale.mute);
        w.zeros(4 * (TLV_SIZE - 3));
    }
}

/// `snd_soc_tplg_channel`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Channel {
    pub size: u32,
    pub reg: u32,
    pub shift: u32,
    pub id: u32,
}

impl Channel {
    fn decode_all(r: &mut ByteReader<'_>) -> Result<[Channel; MAX_CHANNEL], FormatError> {
        let mut out = [Channel::default(); MAX_CHANNEL];
        for ch in &mut out {
            *ch = Channel {
                size: r.u32("channel.size")?,
                reg: r.u32("channel.reg")?,
                shift: r.u32("channel.shift")?,
                id: r.u32("channel.id")?,
            };
        }
        Ok(out)
    }

    fn encode_all(channels: &[Channel; MAX_CHANNEL], w: &mut ByteWriter) {
        for ch in channels {
            w.u32(ch.size);
            w.u32(ch.reg);
            w.u32(ch.shift);
            w.u32(ch.id);
        }
    }
}

/// Common kcontrol header (`snd_soc_tplg_ctl_hdr` without `type`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KcontrolHeader {
    pub size: u32,
    pub name: String,
    pub access: u32,
    pub ops: IoOps,
    pub tlv: CtlTlv,
}

/// Mixer (volume / switch) body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MixerControl {
    pub size: u32,
    pub min: u32,
    pub max: u32,
    pub platform_max: u32,
    pub invert: u32,
    pub num_channels: u32,
    pub channels: [Channel; MAX_CHANNEL],
    pub private: Vec<u8>,
}

/// Enumerated (selector) body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumControl {
    pub size: u32,
    pub num_channels: u32,
    pub channels: [Channel; MAX_CHANNEL],
    pub items: u32,
    pub mask: u32,
    pub count: u32,
    /// Exactly `NUM_TEXTS` entries.
    pub texts: Vec<String>,
    /// Exactly `ENUM_VALUES` entries.
    pub values: Vec<u32>,
    pub private: Vec<u8>,
}

impl Default for EnumControl {
    fn default() -> Self {
        Self {
            size: 0,
            num_channels: 0,
            channels: [Channel::default(); MAX_CHANNEL],
            items: 0,
            mask: 0,
            count: 0,
            texts: vec![String::new(); NUM_TEXTS],
            values: vec![0; ENUM_VALUES],
            private: Vec::new(),
        }
    }
}

/// Opaque bytes body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BytesControl {
    pub size: u32,
    pub max: u32,
    pub mask: u32,
    pub base: u32,
    pub num_regs: u32,
    pub ext_ops: IoOps,
    pub private: Vec<u8>,
}

/// Kcontrol variant body, selected by the header type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KcontrolBody {
    Mixer(MixerControl),
    Enum(EnumControl),
    Bytes(BytesControl),
}

impl KcontrolBody {
    /// Header `type` value for this variant.
    pub fn section_type(&self) -> SectionType {
        match self {
            KcontrolBody::Mixer(_) => SectionType::Mixer,
            KcontrolBody::Enum(_) => SectionType::Enum,
            KcontrolBody::Bytes(_) => SectionType::Bytes,
        }
    }
}

/// A kcontrol: header plus exactly one body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kcontrol {
    pub hdr: KcontrolHeader,
    pub body: KcontrolBody,
}

impl Kcontrol {
    pub fn name(&self) -> &str {
        &self.hdr.name
    }

    /// Mixer body, if this is a mixer control.
    pub fn mixer(&self) -> Option<&MixerControl> {
        match &self.body {
            KcontrolBody::Mixer(m) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let size = r.u32("kcontrol.size")?;
        let type_offset = r.offset();
        let ctl_type = r.u32("kcontrol.type")?;
        let hdr = KcontrolHeader {
            size,
            name: r.fixed_str(ID_NAME_MAXLEN, "kcontrol.name")?,
            access: r.u32("kcontrol.access")?,
            ops: IoOps::decode(r)?,
            tlv: CtlTlv::decode(r)?,
        };
        let body = match SectionType::from(ctl_type) {
            SectionType::Mixer => KcontrolBody::Mixer(decode_mixer(r)?),
            SectionType::Enum => KcontrolBody::Enum(decode_enum(r)?),
            SectionType::Bytes => KcontrolBody::Bytes(decode_bytes(r)?),
            _ => {
                return Err(FormatError::new(
                    type_offset,
                    FormatReason::UnknownKcontrolType(ctl_type),
                ))
            }
        };
        Ok(Self { hdr, body })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        w.u32(self.hdr.size);
        w.u32(self.body.section_type().as_u32());
        w.fixed_str(&self.hdr.name, ID_NAME_MAXLEN, "kcontrol.name")?;
        w.u32(self.hdr.access);
        self.hdr.ops.encode(w);
        self.hdr.tlv.encode(w);
        match &self.body {
            KcontrolBody::Mixer(m) => encode_mixer(m, w),
            KcontrolBody::Enum(e) => encode_enum(e, w),
            KcontrolBody::Bytes(b) => encode_bytes(b, w),
        }
    }
}

fn decode_mixer(r: &mut ByteReader<'_>) -> Result<MixerControl, FormatError> {
    Ok(MixerControl {
        size: r.u32("mixer.size")?,
        min: r.u32("mixer.min")?,
        max: r.u32("mixer.max")?,
        platform_max: r.u32("mixer.platform_max")?,
        invert: r.u32("mixer.invert")?,
        num_channels: r.u32("mixer.num_channels")?,
        channels: Channel::decode_all(r)?,
        private: r.private("mixer.priv")?.bytes_all(),
    })
}

fn encode_mixer(m: &MixerControl, w: &mut ByteWriter) -> Result<(), EncodeError> {
    w.u32(m.size);
    w.u32(m.min);
    w.u32(m.max);
    w.u32(m.platform_max);
    w.u32(m.invert);
    w.u32(m.num_channels);
    Channel::encode_all(&m.channels, w);
    w.private(&m.private, "mixer.priv")
}

fn decode_enum(r: &mut ByteReader<'_>) -> Result<EnumControl, FormatError> {
    let size = r.u32("enum.size")?;
    let num_channels = r.u32("enum.num_channels")?;
    let channels = Channel::decode_all(r)?;
    let items = r.u32("enum.items")?;
    let mask = r.u32("enum.mask")?;
    let count = r.u32("enum.count")?;
    let texts = (0..NUM_TEXTS)
        .map(|_| r.fixed_str(ID_NAME_MAXLEN, "enum.texts"))
        .collect::<Result<Vec<_>, _>>()?;
    let values = (0..ENUM_VALUES)
        .map(|_| r.u32("enum.values"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EnumControl {
        size,
        num_channels,
        channels,
        items,
        mask,
        count,
        texts,
        values,
        private: r.private("enum.priv")?.bytes_all(),
    })
}

fn encode_enum(e: &EnumControl, w: &mut ByteWriter) -> Result<(), EncodeError> {
    if e.texts.len() != NUM_TEXTS {
        return Err(EncodeError::ArrayLength {
            what: "enum.texts",
            expected: NUM_TEXTS,
            actual: e.texts.len(),
        });
    }
    if e.values.len() != ENUM_VALUES {
        return Err(EncodeError::ArrayLength {
            what: "enum.values",
            expected: ENUM_VALUES,
            actual: e.values.len(),
        });
    }
    w.u32(e.size);
    w.u32(e.num_channels);
    Channel::encode_all(&e.channels, w);
    w.u32(e.items);
    w.u32(e.mask);
    w.u32(e.count);
    for text in &e.texts {
        w.fixed_str(text, ID_NAME_MAXLEN, "enum.texts")?;
    }
    for v in &e.values {
        w.u32(*v);
    }
    w.private(&e.private, "enum.priv")
}

fn decode_bytes(r: &mut ByteReader<'_>) -> Result<BytesControl, FormatError> {
    Ok(BytesControl {
        size: r.u32("bytes.size")?,
        max: r.u32("bytes.max")?,
        mask: r.u32("bytes.mask")?,
        base: r.u32("bytes.base")?,
        num_regs: r.u32("bytes.num_regs")?,
        ext_ops: IoOps::decode(r)?,
        private: r.private("bytes.priv")?.bytes_all(),
    })
}

fn encode_bytes(b: &BytesControl, w: &mut ByteWriter) -> Result<(), EncodeError> {
    w.u32(b.size);
    w.u32(b.max);
    w.u32(b.mask);
    w.u32(b.base);
    w.u32(b.num_regs);
    b.ext_ops.encode(w);
    w.private(&b.private, "bytes.priv")
}
