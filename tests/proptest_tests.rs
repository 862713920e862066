//! Property tests: generated documents survive build/parse, and grouping keeps PCMs ordered.

mod common;

use common::{pcm, pcm_section, widget_section};
use proptest::prelude::*;
use tplg::block::VendorTuple;
use tplg::{
    Block, DapmType, Document, GraphEdge, GroupedTopology, Section, SectionType, TupleType, TupleValue, VendorArray,
    Widget,
};

fn name() -> impl Strategy<Value = String> {
    "[A-Z0-9. _]{0,20}"
}

fn vendor_array() -> impl Strategy<Value = VendorArray> {
    prop_oneof![
        prop::collection::vec((any::<u32>(), any::<[u8; 16]>()), 0..4).prop_map(|tuples| VendorArray {
            tuple_type: TupleType::Uuid,
            tuples: tuples
                .into_iter()
                .map(|(token, uuid)| VendorTuple { token, value: TupleValue::Uuid(uuid) })
                .collect(),
        }),
        prop::collection::vec((any::<u32>(), name()), 0..4).prop_map(|tuples| VendorArray {
            tuple_type: TupleType::String,
            tuples: tuples
                .into_iter()
                .map(|(token, s)| VendorTuple { token, value: TupleValue::String(s) })
                .collect(),
        }),
        prop::collection::vec((any::<u32>(), any::<u32>()), 0..4).prop_map(|tuples| VendorArray {
            tuple_type: TupleType::Word,
            tuples: tuples
                .into_iter()
                .map(|(token, v)| VendorTuple { token, value: TupleValue::Scalar(v) })
                .collect(),
        }),
    ]
}

fn widget() -> impl Strategy<Value = Widget> {
    (0u32..40, name(), name(), any::<u32>(), prop::collection::vec(vendor_array(), 0..3)).prop_map(
        |(id, name, sname, reg, private)| Widget {
            id: DapmType::from(id),
            name,
            sname,
            reg,
            private,
            ..Widget::default()
        },
    )
}

fn document() -> impl Strategy<Value = Document> {
    (
        prop::collection::vec(widget(), 0..6),
        prop::collection::vec((name(), name(), name()), 0..8),
        prop::collection::vec((any::<u32>(), name()), 0..4),
    )
        .prop_map(|(widgets, edges, pcms)| {
            let edges = edges
                .into_iter()
                .map(|(source, control, sink)| GraphEdge { control, ..GraphEdge::new(source, sink) })
                .map(Block::GraphEdge)
                .collect();
            let pcms = pcms.into_iter().map(|(id, cap)| pcm("pcm", id, &cap, "")).collect();
            Document::new(vec![
                widget_section(0, widgets),
                Section::new(SectionType::DapmGraph, 0, edges).unwrap(),
                pcm_section(0, pcms),
            ])
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any generated document parses back equal to itself, and rebuilding is byte-stable.
    #[test]
    fn build_then_parse_is_identity(doc in document()) {
        let raw = doc.build().unwrap();
        let parsed = Document::parse(&raw).unwrap();
        prop_assert_eq!(&parsed, &doc);
        prop_assert_eq!(parsed.build().unwrap(), raw);
    }

    /// Arbitrary bytes never panic the decoder.
    #[test]
    fn parse_arbitrary_bytes_does_not_panic(raw in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = Document::parse(&raw);
    }

    /// PCM ids spread over several sections come out non-decreasing after grouping.
    #[test]
    fn grouped_pcms_are_sorted(sections in prop::collection::vec(prop::collection::vec(0u32..16, 0..6), 1..4)) {
        let total: usize = sections.iter().map(Vec::len).sum();
        let doc = Document::new(
            sections
                .iter()
                .enumerate()
                .map(|(index, ids)| pcm_section(index as u32, ids.iter().map(|&id| pcm("p", id, "", "")).collect()))
                .collect(),
        );
        let grouped = GroupedTopology::new(&doc).unwrap();
        prop_assert_eq!(grouped.pcm_list.len(), total);
        prop_assert!(grouped.pcm_list.windows(2).all(|pair| pair[0].pcm_id <= pair[1].pcm_id));
    }
}
