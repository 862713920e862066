//! Builders shared by the integration tests.

#![allow(dead_code)]

use tplg::block::{StreamCaps, VendorTuple};
use tplg::{Block, DapmType, Document, GraphEdge, Pcm, Section, SectionType, TupleType, TupleValue, VendorArray, Widget};

pub fn widget(id: DapmType, name: &str) -> Widget {
    Widget {
        id,
        name: name.to_string(),
        ..Widget::default()
    }
}

pub fn widget_with_tuples(id: DapmType, name: &str, tuple_type: TupleType, tuples: &[(u32, TupleValue)]) -> Widget {
    Widget {
        private: vec![VendorArray {
            tuple_type,
            tuples: tuples
                .iter()
                .map(|(token, value)| VendorTuple {
                    token: *token,
                    value: value.clone(),
                })
                .collect(),
        }],
        ..widget(id, name)
    }
}

pub fn pcm(name: &str, id: u32, playback: &str, capture: &str) -> Pcm {
    let caps = |cap_name: &str| StreamCaps {
        name: cap_name.to_string(),
        formats: 1 << 2 | 1 << 10,
        rate_min: 48000,
        rate_max: 48000,
        channels_min: 2,
        channels_max: 2,
        ..StreamCaps::default()
    };
    Pcm {
        pcm_name: name.to_string(),
        pcm_id: id,
        playback: u32::from(!playback.is_empty()),
        capture: u32::from(!capture.is_empty()),
        caps: [caps(playback), caps(capture)],
        ..Pcm::default()
    }
}

pub fn widget_section(index: u32, widgets: Vec<Widget>) -> Section {
    Section::new(SectionType::DapmWidget, index, widgets.into_iter().map(Block::Widget).collect()).unwrap()
}

/// Graph section from a `source -> sink` chain per entry.
pub fn graph_section(index: u32, chains: &[&[&str]]) -> Section {
    let edges = chains
        .iter()
        .flat_map(|chain| chain.windows(2))
        .map(|pair| Block::GraphEdge(GraphEdge::new(pair[0], pair[1])))
        .collect();
    Section::new(SectionType::DapmGraph, index, edges).unwrap()
}

pub fn pcm_section(index: u32, pcms: Vec<Pcm>) -> Section {
    Section::new(SectionType::Pcm, index, pcms.into_iter().map(Block::Pcm).collect()).unwrap()
}

/// `PCM0P -> BUF1.0 -> PGA1.1 -> SSP0.OUT` with one playback PCM "Speaker".
pub fn playback_scenario() -> Document {
    Document::new(vec![
        widget_section(
            1,
            vec![
                widget(DapmType::AifIn, "PCM0P"),
                widget(DapmType::Buffer, "BUF1.0"),
                widget(DapmType::Pga, "PGA1.1"),
                widget(DapmType::DaiIn, "SSP0.OUT"),
            ],
        ),
        graph_section(1, &[&["PCM0P", "BUF1.0", "PGA1.1", "SSP0.OUT"]]),
        pcm_section(0, vec![pcm("Speaker", 0, "PCM0P", "")]),
    ])
}

/// Echo reference pipelines (PCM0P / PCM3C through `ECHO REF 7`) next to a
/// smart amplifier pair (PCM2P / PCM2C through `SMART_AMP5.0`).
pub fn interweaved_scenario() -> Document {
    let names = [
        (DapmType::AifIn, "PCM0P"),
        (DapmType::Buffer, "BUF1.0"),
        (DapmType::Pga, "PGA1.1"),
        (DapmType::Buffer, "BUF1.1"),
        (DapmType::Effect, "MUXDEMUX1.0"),
        (DapmType::Buffer, "BUF1.2"),
        (DapmType::DaiIn, "SSP0.OUT"),
        (DapmType::DaiOut, "SSP0.IN"),
        (DapmType::Effect, "ECHO REF 7"),
        (DapmType::Buffer, "BUF7.0"),
        (DapmType::AifOut, "PCM3C"),
        (DapmType::Buffer, "BUF2.1"),
        (DapmType::Pga, "PGA2.0"),
        (DapmType::Buffer, "BUF2.0"),
        (DapmType::AifOut, "PCM0C"),
        (DapmType::AifIn, "PCM2P"),
        (DapmType::Buffer, "BUF5.0"),
        (DapmType::Effect, "SMART_AMP5.0"),
        (DapmType::Buffer, "BUF5.1"),
        (DapmType::DaiIn, "SSP2.OUT"),
        (DapmType::DaiOut, "SSP2.IN"),
        (DapmType::Buffer, "BUF6.1"),
        (DapmType::Effect, "MUXDEMUX6.0"),
        (DapmType::Buffer, "BUF5.2"),
        (DapmType::Buffer, "BUF6.0"),
        (DapmType::AifOut, "PCM2C"),
    ];
    Document::new(vec![
        widget_section(0, names.iter().map(|(id, name)| widget(*id, name)).collect()),
        graph_section(
            0,
            &[
                &["PCM0P", "BUF1.0", "PGA1.1", "BUF1.1", "MUXDEMUX1.0", "BUF1.2", "SSP0.OUT"],
                &["MUXDEMUX1.0", "BUF7.0"],
                &["SSP0.IN", "ECHO REF 7", "BUF7.0", "PCM3C"],
                &["SSP0.IN", "BUF2.1", "PGA2.0", "BUF2.0", "PCM0C"],
                &["PCM2P", "BUF5.0", "SMART_AMP5.0", "BUF5.1", "SSP2.OUT"],
                &["SSP2.IN", "BUF6.1", "MUXDEMUX6.0", "BUF5.2", "SMART_AMP5.0"],
                &["MUXDEMUX6.0", "BUF6.0", "PCM2C"],
            ],
        ),
    ])
}
