//! PCM and link records with their stream configs, capabilities and hw configs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{EncodeError, FormatError};
use crate::format::{sizes, HW_CONFIG_MAX, ID_NAME_MAXLEN, MAX_CHANNEL, STREAM_CONFIG_MAX};

/// `snd_soc_tplg_stream`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamConfig {
    pub size: u32,
    pub name: String,
    pub format: u64,
    pub rate: u32,
    pub period_bytes: u32,
    pub buffer_bytes: u32,
    pub channels: u32,
}

impl StreamConfig {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            size: r.u32("stream.size")?,
            name: r.fixed_str(ID_NAME_MAXLEN, "stream.name")?,
            format: r.u64("stream.format")?,
            rate: r.u32("stream.rate")?,
            period_bytes: r.u32("stream.period_bytes")?,
            buffer_bytes: r.u32("stream.buffer_bytes")?,
            channels: r.u32("stream.channels")?,
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        w.u32(self.size);
        w.fixed_str(&self.name, ID_NAME_MAXLEN, "stream.name")?;
        w.u64(self.format);
        w.u32(self.rate);
        w.u32(self.period_bytes);
        w.u32(self.buffer_bytes);
        w.u32(self.channels);
        Ok(())
    }

    fn decode_all(r: &mut ByteReader<'_>) -> Result<[StreamConfig; STREAM_CONFIG_MAX], FormatError> {
        let mut out: [StreamConfig; STREAM_CONFIG_MAX] = Default::default();
        for slot in &mut out {
            *slot = StreamConfig::decode(r)?;
        }
        Ok(out)
    }
}

/// `snd_soc_tplg_stream_caps`. Index 0 of a PCM is playback, index 1 capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamCaps {
    pub size: u32,
    /// Name of the widget this direction attaches to.
    pub name: String,
    pub formats: u64,
    pub rates: u32,
    pub rate_min: u32,
    pub rate_max: u32,
    pub channels_min: u32,
    pub channels_max: u32,
    pub periods_min: u32,
    pub periods_max: u32,
    pub period_size_min: u32,
    pub period_size_max: u32,
    pub buffer_size_min: u32,
    pub buffer_size_max: u32,
    pub sig_bits: u32,
}

impl StreamCaps {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            size: r.u32("caps.size")?,
            name: r.fixed_str(ID_NAME_MAXLEN, "caps.name")?,
            formats: r.u64("caps.formats")?,
            rates: r.u32("caps.rates")?,
            rate_min: r.u32("caps.rate_min")?,
            rate_max: r.u32("caps.rate_max")?,
            channels_min: r.u32("caps.channels_min")?,
            channels_max: r.u32("caps.channels_max")?,
            periods_min: r.u32("caps.periods_min")?,
            periods_max: r.u32("caps.periods_max")?,
            period_size_min: r.u32("caps.period_size_min")?,
            period_size_max: r.u32("caps.period_size_max")?,
            buffer_size_min: r.u32("caps.buffer_size_min")?,
            buffer_size_max: r.u32("caps.buffer_size_max")?,
            sig_bits: r.u32("caps.sig_bits")?,
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        w.u32(self.size);
        w.fixed_str(&self.name, ID_NAME_MAXLEN, "caps.name")?;
        w.u64(self.formats);
        for v in [
            self.rates,
            self.rate_min,
            self.rate_max,
            self.channels_min,
            self.channels_max,
            self.periods_min,
            self.periods_max,
            self.period_size_min,
            self.period_size_max,
            self.buffer_size_min,
            self.buffer_size_max,
            self.sig_bits,
        ] {
            w.u32(v);
        }
        Ok(())
    }
}

/// `snd_soc_tplg_hw_config`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HwConfig {
    pub size: u32,
    pub id: u32,
    pub fmt: u32,
    pub clock_gated: u8,
    pub invert_bclk: u8,
    pub invert_fsync: u8,
    pub bclk_provider: u8,
    pub fsync_provider: u8,
    pub mclk_direction: u8,
    pub mclk_rate: u32,
    pub bclk_rate: u32,
    pub fsync_rate: u32,
    pub tdm_slots: u32,
    pub tdm_slot_width: u32,
    pub tx_slots: u32,
    pub rx_slots: u32,
    pub tx_channels: u32,
    pub tx_chanmap: [u32; MAX_CHANNEL],
    pub rx_channels: u32,
    pub rx_chanmap: [u32; MAX_CHANNEL],
}

impl HwConfig {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let mut hw = HwConfig {
            size: r.u32("hw_config.size")?,
            id: r.u32("hw_config.id")?,
            fmt: r.u32("hw_config.fmt")?,
            clock_gated: r.u8("hw_config.clock_gated")?,
            invert_bclk: r.u8("hw_config.invert_bclk")?,
            invert_fsync: r.u8("hw_config.invert_fsync")?,
            bclk_provider: r.u8("hw_config.bclk_provider")?,
            fsync_provider: r.u8("hw_config.fsync_provider")?,
            mclk_direction: r.u8("hw_config.mclk_direction")?,
            ..HwConfig::default()
        };
        r.skip(2, "hw_config.reserved")?;
        hw.mclk_rate = r.u32("hw_config.mclk_rate")?;
        hw.bclk_rate = r.u32("hw_config.bclk_rate")?;
        hw.fsync_rate = r.u32("hw_config.fsync_rate")?;
        hw.tdm_slots = r.u32("hw_config.tdm_slots")?;
        hw.tdm_slot_width = r.u32("hw_config.tdm_slot_width")?;
        hw.tx_slots = r.u32("hw_config.tx_slots")?;
        hw.rx_slots = r.u32("hw_config.rx_slots")?;
        hw.tx_channels = r.u32("hw_config.tx_channels")?;
        for slot in &mut hw.tx_chanmap {
            *slot = r.u32("hw_config.tx_chanmap")?;
        }
        hw.rx_channels = r.u32("hw_config.rx_channels")?;
        for slot in &mut hw.rx_chanmap {
            *slot = r.u32("hw_config.rx_chanmap")?;
        }
        Ok(hw)
    }

    fn encode(&self, w: &mut ByteWriter) {
        w.u32(self.size);
        w.u32(self.id);
        w.u32(self.fmt);
        w.u8(self.clock_gated);
        w.u8(self.invert_bclk);
        w.u8(self.invert_fsync);
        w.u8(self.bclk_provider);
        w.u8(self.fsync_provider);
        w.u8(self.mclk_direction);
        w.zeros(2);
        for v in [
            self.mclk_rate,
            self.bclk_rate,
            self.fsync_rate,
            self.tdm_slots,
            self.tdm_slot_width,
            self.tx_slots,
            self.rx_slots,
            self.tx_channels,
        ] {
            w.u32(v);
        }
        for v in self.tx_chanmap {
            w.u32(v);
        }
        w.u32(self.rx_channels);
        for v in self.rx_chanmap {
            w.u32(v);
        }
    }
}

/// `snd_soc_tplg_pcm`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pcm {
    pub size: u32,
    pub pcm_name: String,
    pub dai_name: String,
    pub pcm_id: u32,
    pub dai_id: u32,
    pub playback: u32,
    pub capture: u32,
    pub compress: u32,
    pub stream: [StreamConfig; STREAM_CONFIG_MAX],
    pub num_streams: u32,
    /// `[playback, capture]`.
    pub caps: [StreamCaps; 2],
    pub flag_mask: u32,
    pub flags: u32,
    pub private: Vec<u8>,
}

impl Default for Pcm {
    fn default() -> Self {
        Self {
            size: sizes::PCM as u32,
            pcm_name: String::new(),
            dai_name: String::new(),
            pcm_id: 0,
            dai_id: 0,
            playback: 0,
            capture: 0,
            compress: 0,
            stream: Default::default(),
            num_streams: 0,
            caps: Default::default(),
            flag_mask: 0,
            flags: 0,
            private: Vec::new(),
        }
    }
}

impl Pcm {
    pub(crate) fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            size: r.u32("pcm.size")?,
            pcm_name: r.fixed_str(ID_NAME_MAXLEN, "pcm.pcm_name")?,
            dai_name: r.fixed_str(ID_NAME_MAXLEN, "pcm.dai_name")?,
            pcm_id: r.u32("pcm.pcm_id")?,
            dai_id: r.u32("pcm.dai_id")?,
            playback: r.u32("pcm.playback")?,
            capture: r.u32("pcm.capture")?,
            compress: r.u32("pcm.compress")?,
            stream: StreamConfig::decode_all(r)?,
            num_streams: r.u32("pcm.num_streams")?,
            caps: [StreamCaps::decode(r)?, StreamCaps::decode(r)?],
            flag_mask: r.u32("pcm.flag_mask")?,
            flags: r.u32("pcm.flags")?,
            private: r.private("pcm.priv")?.bytes_all(),
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        w.u32(self.size);
        w.fixed_str(&self.pcm_name, ID_NAME_MAXLEN, "pcm.pcm_name")?;
        w.fixed_str(&self.dai_name, ID_NAME_MAXLEN, "pcm.dai_name")?;
        w.u32(self.pcm_id);
        w.u32(self.dai_id);
        w.u32(self.playback);
        w.u32(self.capture);
        w.u32(self.compress);
        for stream in &self.stream {
            stream.encode(w)?;
        }
        w.u32(self.num_streams);
        for caps in &self.caps {
            caps.encode(w)?;
        }
        w.u32(self.flag_mask);
        w.u32(self.flags);
        w.private(&self.private, "pcm.priv")
    }
}

/// `snd_soc_tplg_link_config`, used by DAI, codec and backend link sections.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    pub size: u32,
    pub id: u32,
    pub name: String,
    pub stream_name: String,
    pub stream: [StreamConfig; STREAM_CONFIG_MAX],
    pub num_streams: u32,
    pub hw_config: [HwConfig; HW_CONFIG_MAX],
    pub num_hw_configs: u32,
    pub default_hw_config_id: u32,
    pub flag_mask: u32,
    pub flags: u32,
    pub private: Vec<u8>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            size: sizes::LINK as u32,
            id: 0,
            name: String::new(),
            stream_name: String::new(),
            stream: Default::default(),
            num_streams: 0,
            hw_config: [HwConfig::default(); HW_CONFIG_MAX],
            num_hw_configs: 0,
            default_hw_config_id: 0,
            flag_mask: 0,
            flags: 0,
            private: Vec::new(),
        }
    }
}

impl LinkConfig {
    pub(crate) fn decode(r: &mut ByteReader<'_>) -> Result<Self, FormatError> {
        let size = r.u32("link.size")?;
        let id = r.u32("link.id")?;
        let name = r.fixed_str(ID_NAME_MAXLEN, "link.name")?;
        let stream_name = r.fixed_str(ID_NAME_MAXLEN, "link.stream_name")?;
        let stream = StreamConfig::decode_all(r)?;
        let num_streams = r.u32("link.num_streams")?;
        let mut hw_config = [HwConfig::default(); HW_CONFIG_MAX];
        for slot in &mut hw_config {
            *slot = HwConfig::decode(r)?;
        }
        Ok(Self {
            size,
            id,
            name,
            stream_name,
            stream,
            num_streams,
            hw_config,
            num_hw_configs: r.u32("link.num_hw_configs")?,
            default_hw_config_id: r.u32("link.default_hw_config_id")?,
            flag_mask: r.u32("link.flag_mask")?,
            flags: r.u32("link.flags")?,
            private: r.private("link.priv")?.bytes_all(),
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<(), EncodeError> {
        w.u32(self.size);
        w.u32(self.id);
        w.fixed_str(&self.name, ID_NAME_MAXLEN, "link.name")?;
        w.fixed_str(&self.stream_name, ID_NAME_MAXLEN, "link.stream_name")?;
        for stream in &self.stream {
            stream.encode(w)?;
        }
        w.u32(self.num_streams);
        for hw in &self.hw_config {
            hw.encode(w);
        }
        w.u32(self.num_hw_configs);
        w.u32(self.default_hw_config_id);
        w.u32(self.flag_mask);
        w.u32(self.flags);
        w.private(&self.private, "link.priv")
    }
}
