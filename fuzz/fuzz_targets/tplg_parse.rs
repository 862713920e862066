#![no_main]

use libfuzzer_sys::fuzz_target;
use tplg::{Document, GroupedTopology, PipelineGraph};

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = Document::parse(data) else {
        return;
    };
    // Anything that parses must build and parse back to the same structure.
    let rebuilt = doc.build().expect("parsed document must build");
    assert_eq!(Document::parse(&rebuilt).expect("rebuilt document must parse"), doc);

    if let Ok(grouped) = GroupedTopology::new(&doc) {
        let graph = PipelineGraph::new(&grouped);
        for widget in &grouped.widget_list {
            let _ = graph.get_pipeline_id(&widget.name);
        }
        let _ = graph.find_interweaved_pipelines();
    }
});
