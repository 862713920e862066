//! Minimal example: build a one-pipeline topology, write it to a temp file, read it back,
//! then print the PCM summary, the PGAs on its playback path and the DOT graph.
//!
//! Run: cargo run --example build_and_read

use std::io::Write;

use tplg::block::StreamCaps;
use tplg::{
    Block, DapmType, Document, GraphEdge, GraphView, GroupedTopology, Pcm, PipelineGraph, RenderOptions, Section,
    SectionType, Widget,
};

fn widget(id: DapmType, name: &str) -> Block {
    Block::Widget(Widget {
        id,
        name: name.to_string(),
        ..Widget::default()
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let widgets = vec![
        widget(DapmType::AifIn, "PCM0P"),
        widget(DapmType::Buffer, "BUF1.0"),
        widget(DapmType::Pga, "PGA1.1"),
        widget(DapmType::DaiIn, "SSP0.OUT"),
    ];
    let edges = [("PCM0P", "BUF1.0"), ("BUF1.0", "PGA1.1"), ("PGA1.1", "SSP0.OUT")]
        .into_iter()
        .map(|(source, sink)| Block::GraphEdge(GraphEdge::new(source, sink)))
        .collect();
    let pcm = Pcm {
        pcm_name: "Speaker".to_string(),
        playback: 1,
        caps: [
            StreamCaps {
                name: "PCM0P".to_string(),
                formats: 1 << 2,
                rate_min: 48000,
                rate_max: 48000,
                channels_min: 2,
                channels_max: 2,
                ..StreamCaps::default()
            },
            StreamCaps::default(),
        ],
        ..Pcm::default()
    };

    let doc = Document::new(vec![
        Section::new(SectionType::DapmWidget, 1, widgets)?,
        Section::new(SectionType::DapmGraph, 1, edges)?,
        Section::new(SectionType::Pcm, 0, vec![Block::Pcm(pcm)])?,
    ]);

    let mut tmp = tempfile::NamedTempFile::new()?;
    tmp.write_all(&doc.build()?)?;
    let path = tmp.path();

    let read = Document::from_file(path)?;
    assert_eq!(read, doc);
    let grouped = GroupedTopology::new(&read)?;
    let graph = PipelineGraph::new(&grouped);
    for pcm in &grouped.pcm_list {
        println!("{}", GroupedTopology::pcm_info_line(pcm));
        let [playback, _] = graph.find_comp_for_pcm(pcm, "pga");
        for comp in playback {
            println!("  playback PGA: {} (pipeline {:?})", comp.name, graph.get_pipeline_id(&comp.name));
        }
    }
    print!("{}", GraphView::new(&graph, &RenderOptions::default()).to_dot());
    Ok(())
}
