//! DAPM widgets and their vendor tuple arrays.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::kcontrol::Kcontrol;
use crate::codec::{expect_consumed, len_u32, ByteReader, ByteWriter};
use crate::error::{EncodeError, FormatError, FormatReason};
use crate::format::{sizes, DapmType, TupleType, ID_NAME_MAXLEN};

/// Value of one vendor tuple. The shape is fixed by the enclosing array's type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TupleValue {
    Uuid([u8; 16]),
    String(String),
    Scalar(u32),
}

impl TupleValue {
    pub fn as_scalar(&self) -> Option<u32> {
        match self {
            TupleValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<&[u8; 16]> {
        match self {
            TupleValue::Uuid(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TupleValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn fits(&self, tuple_type: TupleType) -> bool {
        matches!(
            (self, tuple_type),
            (TupleValue::Uuid(_), TupleType::Uuid)
                | (TupleValue::String(_), TupleType::String)
                | (
                    TupleValue::Scalar(_),
                    TupleType::Bool | TupleType::Byte | TupleType::Word | TupleType::Short
                )
        )
    }
}

/// `{token, value}` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VendorTuple {
    pub token: u32,
    pub value: TupleValue,
}

/// One `snd_soc_tplg_vendor_array`: a typed group of tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VendorArray {
    pub tuple_type: TupleType,
    pub tuples: Vec<VendorTuple>,
}

impl VendorArray {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let start = r.consumed();
        let size = r.u32("vendor_array.size")? as usize;
        let type_offset = r.offset();
        let raw_type = r.u32("vendor_array.type")?;
        let tuple_type = TupleType::from_u32(raw_type)
            .ok_or_else(|| FormatError::new(type_offset, FormatReason::UnknownTupleType(raw_type)))?;
        let num_elems = r.u32("vendor_array.num_elems")? as usize;
        let mut tuples = Vec::with_capacity(num_elems.min(r.remaining() / tuple_type.element_size()));
        for _ in 0..num_elems {
            let token = r.u32("vendor_tuple.token")?;
            let value = match tuple_type {
                TupleType::Uuid => TupleValue::Uuid(r.array("vendor_tuple.uuid")?),
                TupleType::String => TupleValue::String(r.fixed_str(ID_NAME_MAXLEN, "vendor_tuple.string")?),
                TupleType::Bool | TupleType::Byte | TupleType::Word | TupleType::Short => {
                    TupleValue::Scalar(r.u32("vendor_tuple.value")?)
                }
            };
            tuples.push(VendorTuple { token, value });
        }
        let consumed = r.consumed() - start;
        if consumed != size {
            return Err(r.error(FormatReason::SizeMismatch {
                what: "vendor_array",
                declared: size,
                consumed,
            }));
        }
        Ok(Self { tuple_type, tuples })
    }

    /// Bytes this array occupies on the wire, header included.
    pub fn encoded_len(&self) -> usize {
        sizes::VENDOR_ARRAY_HEADER + self.tuples.len() * self.tuple_type.element_size()
    }

    fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        w.u32(len_u32(self.encoded_len(), "vendor_array")?);
        w.u32(self.tuple_type.as_u32());
        w.u32(len_u32(self.tuples.len(), "vendor_array.num_elems")?);
        for tuple in &self.tuples {
            if !tuple.value.fits(self.tuple_type) {
                return Err(EncodeError::TupleShape {
                    token: tuple.token,
                    tuple_type: self.tuple_type,
                });
            }
            w.u32(tuple.token);
            match &tuple.value {
                TupleValue::Uuid(u) => w.bytes(u),
                TupleValue::String(s) => w.fixed_str(s, ID_NAME_MAXLEN, "vendor_tuple.string")?,
                TupleValue::Scalar(v) => w.u32(*v),
            }
        }
        Ok(())
    }
}

/// `snd_soc_tplg_dapm_widget` with its vendor tuples and owned kcontrols.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Widget {
    pub size: u32,
    pub id: DapmType,
    pub name: String,
    /// Stream name; may be empty.
    pub sname: String,
    pub reg: u32,
    pub shift: u32,
    pub mask: u32,
    pub subseq: u32,
    pub invert: u32,
    pub ignore_suspend: u32,
    pub event_flags: u16,
    pub event_type: u16,
    pub private: Vec<VendorArray>,
    pub kcontrols: Vec<Kcontrol>,
}

impl Default for Widget {
    fn default() -> Self {
        Self {
            size: sizes::WIDGET as u32,
            id: DapmType::default(),
            name: String::new(),
            sname: String::new(),
            reg: 0,
            shift: 0,
            mask: 0,
            subseq: 0,
            invert: 0,
            ignore_suspend: 0,
            event_flags: 0,
            event_type: 0,
            private: Vec::new(),
            kcontrols: Vec::new(),
        }
    }
}

impl Widget {
    /// Iterate every tuple across all vendor arrays, in file order.
    pub fn tuples(&self) -> impl Iterator<Item = &VendorTuple> {
        self.private.iter().flat_map(|array| array.tuples.iter())
    }

    pub(crate) fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let size = r.u32("widget.size")?;
        let id = DapmType::from(r.u32("widget.id")?);
        let name = r.fixed_str(ID_NAME_MAXLEN, "widget.name")?;
        let sname = r.fixed_str(ID_NAME_MAXLEN, "widget.sname")?;
        let reg = r.u32("widget.reg")?;
        let shift = r.u32("widget.shift")?;
        let mask = r.u32("widget.mask")?;
        let subseq = r.u32("widget.subseq")?;
        let invert = r.u32("widget.invert")?;
        let ignore_suspend = r.u32("widget.ignore_suspend")?;
        let event_flags = r.u16("widget.event_flags")?;
        let event_type = r.u16("widget.event_type")?;
        let num_kcontrols = r.u32("widget.num_kcontrols")? as usize;

        let mut priv_reader = r.private("widget.priv")?;
        let declared = priv_reader.remaining();
        let mut private = Vec::new();
        while !priv_reader.is_empty() {
            private.push(VendorArray::decode(&mut priv_reader)?);
        }
        expect_consumed(&priv_reader, declared, "widget.priv")?;

        let kcontrols = (0..num_kcontrols)
            .map(|_| Kcontrol::decode(r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            size,
            id,
            name,
            sname,
            reg,
            shift,
            mask,
            subseq,
            invert,
            ignore_suspend,
            event_flags,
            event_type,
            private,
            kcontrols,
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        w.u32(self.size);
        w.u32(self.id.as_u32());
        w.fixed_str(&self.name, ID_NAME_MAXLEN, "widget.name")?;
        w.fixed_str(&self.sname, ID_NAME_MAXLEN, "widget.sname")?;
        w.u32(self.reg);
        w.u32(self.shift);
        w.u32(self.mask);
        w.u32(self.subseq);
        w.u32(self.invert);
        w.u32(self.ignore_suspend);
        w.u16(self.event_flags);
        w.u16(self.event_type);
        w.u32(len_u32(self.kcontrols.len(), "widget.num_kcontrols")?);

        let priv_len: usize = self.private.iter().map(VendorArray::encoded_len).sum();
        w.u32(len_u32(priv_len, "widget.priv")?);
        for array in &self.private {
            array.encode(w)?;
        }
        for kcontrol in &self.kcontrols {
            kcontrol.encode(w)?;
        }
        Ok(())
    }
}
