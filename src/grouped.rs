//! Grouped view over a parsed document: same-typed blocks merged across
//! sections into canonical, sorted lists.
//!
//! [`GroupedTopology`] borrows from the [`Document`]; it never copies blocks.

use std::collections::BTreeMap;
use std::fmt;

use crate::block::{Block, GraphEdge, Kcontrol, LinkConfig, Manifest, Pcm, TupleValue, Widget};
use crate::document::Document;
use crate::error::ConsistencyError;
use crate::format::{format_names, tokens, DapmType};

/// Direction(s) a PCM supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PcmType {
    Playback,
    Capture,
    Duplex,
    None,
}

impl PcmType {
    pub fn as_str(self) -> &'static str {
        match self {
            PcmType::Playback => "playback",
            PcmType::Capture => "capture",
            PcmType::Duplex => "duplex",
            PcmType::None => "none",
        }
    }
}

impl fmt::Display for PcmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topology blocks grouped by type.
#[derive(Debug, Clone, Default)]
pub struct GroupedTopology<'a> {
    /// The single manifest, if the document has one.
    pub manifest: Option<&'a Manifest>,
    /// All PCMs, sorted by `pcm_id` (stable).
    pub pcm_list: Vec<&'a Pcm>,
    /// All widgets in section order.
    pub widget_list: Vec<&'a Widget>,
    /// All graph edges in section order.
    pub graph_list: Vec<&'a GraphEdge>,
    /// All DAI / codec / backend links, sorted by `id` (stable).
    pub link_list: Vec<&'a LinkConfig>,
    /// Kcontrols from top-level kcontrol sections (not those owned by widgets).
    pub kcontrol_list: Vec<&'a Kcontrol>,
    /// Pipeline id -> index into `widget_list` of its `PIPELINE.<id>.*` widget.
    pipeline_widgets: BTreeMap<String, usize>,
}

impl<'a> GroupedTopology<'a> {
    /// Group all sections of `doc`. More than one manifest block is an error.
    pub fn new(doc: &'a Document) -> Result<Self, ConsistencyError> {
        let mut grouped = GroupedTopology::default();
        let mut manifests = Vec::new();
        for (_, block) in doc.blocks() {
            match block {
                Block::Manifest(m) => manifests.push(m),
                Block::Pcm(p) => grouped.pcm_list.push(p),
                Block::Widget(w) => grouped.widget_list.push(w),
                Block::GraphEdge(e) => grouped.graph_list.push(e),
                Block::Link(l) => grouped.link_list.push(l),
                Block::Kcontrol(k) => grouped.kcontrol_list.push(k),
            }
        }
        if manifests.len() > 1 {
            return Err(ConsistencyError::DuplicateManifest(manifests.len()));
        }
        grouped.manifest = manifests.first().copied();

        // sort_by_key is stable: equal ids keep section order.
        grouped.pcm_list.sort_by_key(|p| p.pcm_id);
        grouped.link_list.sort_by_key(|l| l.id);

        for (index, widget) in grouped.widget_list.iter().enumerate() {
            if let Some(id) = pipeline_widget_id(&widget.name) {
                grouped.pipeline_widgets.entry(id.to_string()).or_insert(index);
            }
        }
        tracing::debug!(
            pcms = grouped.pcm_list.len(),
            widgets = grouped.widget_list.len(),
            edges = grouped.graph_list.len(),
            links = grouped.link_list.len(),
            pipelines = grouped.pipeline_widgets.len(),
            "grouped topology"
        );
        Ok(grouped)
    }

    /// Format flag names of the playback (`[0]`) and capture (`[1]`) capabilities.
    pub fn pcm_formats(pcm: &Pcm) -> [Vec<&'static str>; 2] {
        [format_names(pcm.caps[0].formats), format_names(pcm.caps[1].formats)]
    }

    pub fn pcm_type(pcm: &Pcm) -> PcmType {
        match (pcm.playback != 0, pcm.capture != 0) {
            (true, true) => PcmType::Duplex,
            (true, false) => PcmType::Playback,
            (false, true) => PcmType::Capture,
            (false, false) => PcmType::None,
        }
    }

    /// `[playback (min, max), capture (min, max)]` rates.
    pub fn pcm_rates(pcm: &Pcm) -> [(u32, u32); 2] {
        [
            (pcm.caps[0].rate_min, pcm.caps[0].rate_max),
            (pcm.caps[1].rate_min, pcm.caps[1].rate_max),
        ]
    }

    /// `[playback (min, max), capture (min, max)]` channel counts.
    pub fn pcm_channels(pcm: &Pcm) -> [(u32, u32); 2] {
        [
            (pcm.caps[0].channels_min, pcm.caps[0].channels_max),
            (pcm.caps[1].channels_min, pcm.caps[1].channels_max),
        ]
    }

    /// One summary line, reporting the capture capability for capture-only PCMs
    /// and the playback capability otherwise.
    pub fn pcm_info_line(pcm: &Pcm) -> String {
        let pcm_type = Self::pcm_type(pcm);
        let idx = usize::from(pcm_type == PcmType::Capture);
        let caps = &pcm.caps[idx];
        format!(
            "pcm={};id={};type={};rate_min={};rate_max={};ch_min={};ch_max={};fmts={}",
            pcm.pcm_name,
            pcm.pcm_id,
            pcm_type,
            caps.rate_min,
            caps.rate_max,
            caps.channels_min,
            caps.channels_max,
            format_names(caps.formats).join(" ")
        )
    }

    /// All PCMs with the given id.
    pub fn pcms_with_id(&self, pcm_id: u32) -> Vec<&'a Pcm> {
        self.pcm_list.iter().copied().filter(|p| p.pcm_id == pcm_id).collect()
    }

    /// Input, output and out-driver widgets have no DSP counterpart.
    pub fn is_virtual_widget(widget: &Widget) -> bool {
        matches!(widget.id, DapmType::Input | DapmType::Output | DapmType::OutDrv)
    }

    /// First tuple carrying `token`, across all vendor arrays of `widget`.
    pub fn find_token(widget: &Widget, token: u32) -> Option<&TupleValue> {
        widget.tuples().find(|t| t.token == token).map(|t| &t.value)
    }

    /// Scalar value of `token`, or `default` if absent or not a scalar.
    pub fn token_or(widget: &Widget, token: u32, default: u32) -> u32 {
        Self::find_token(widget, token)
            .and_then(TupleValue::as_scalar)
            .unwrap_or(default)
    }

    /// Module UUID of a component widget.
    pub fn widget_uuid(widget: &Widget) -> Option<[u8; 16]> {
        Self::find_token(widget, tokens::SOF_TKN_COMP_UUID)
            .and_then(TupleValue::as_uuid)
            .copied()
    }

    /// Whether kcontrol names of this widget are prefixed with the widget name.
    pub fn has_wname_prefix(widget: &Widget) -> bool {
        Self::token_or(widget, tokens::SOF_TKN_COMP_NO_WNAME_IN_KCONTROL_NAME, 0) == 0
    }

    /// The scheduler widget of pipeline `pipeline_id`.
    pub fn pipeline_widget(&self, pipeline_id: &str) -> Option<&'a Widget> {
        self.pipeline_widgets
            .get(pipeline_id)
            .map(|&index| self.widget_list[index])
    }

    /// Ids of all pipelines with a scheduler widget, in ascending string order.
    pub fn pipeline_ids(&self) -> impl Iterator<Item = &str> {
        self.pipeline_widgets.keys().map(String::as_str)
    }

    /// Whether pipeline `pipeline_id` is powered up on demand.
    pub fn is_dynamic_pipeline(&self, pipeline_id: &str) -> bool {
        self.pipeline_widget(pipeline_id)
            .is_some_and(|w| Self::token_or(w, tokens::SOF_TKN_SCHED_DYNAMIC_PIPELINE, 0) != 0)
    }
}

/// `PIPELINE.<digits>.*` -> `<digits>`.
fn pipeline_widget_id(name: &str) -> Option<&str> {
    let rest = name.strip_prefix("PIPELINE.")?;
    let (id, _) = rest.split_once('.')?;
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_widget_names() {
        assert_eq!(pipeline_widget_id("PIPELINE.1.SSP0.OUT"), Some("1"));
        assert_eq!(pipeline_widget_id("PIPELINE.12.PCM0P"), Some("12"));
        assert_eq!(pipeline_widget_id("PIPELINE.x.PCM0P"), None);
        assert_eq!(pipeline_widget_id("PIPELINE.3"), None);
        assert_eq!(pipeline_widget_id("PGA1.1"), None);
    }

    #[test]
    fn pcm_type_covers_all_flag_combinations() {
        let mut pcm = Pcm::default();
        for (playback, capture, expected) in [
            (1, 0, "playback"),
            (1, 1, "duplex"),
            (0, 1, "capture"),
            (0, 0, "none"),
        ] {
            pcm.playback = playback;
            pcm.capture = capture;
            assert_eq!(GroupedTopology::pcm_type(&pcm).to_string(), expected);
        }
    }
}
