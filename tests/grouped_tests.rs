//! Grouping across sections and the PCM / widget accessors.

mod common;

use common::{pcm, pcm_section, playback_scenario, widget, widget_section, widget_with_tuples};
use tplg::block::{KcontrolHeader, MixerControl};
use tplg::format::tokens;
use tplg::{
    Block, ConsistencyError, DapmType, Document, GroupedTopology, Kcontrol, KcontrolBody, LinkConfig, Manifest,
    PcmType, Section, SectionType, TupleType, TupleValue,
};

/// PCMs from several sections come out sorted by id; equal ids keep file order.
#[test]
fn pcms_are_sorted_across_sections() {
    let doc = Document::new(vec![
        pcm_section(0, vec![pcm("c", 7, "PCM7P", ""), pcm("a", 2, "PCM2P", "")]),
        pcm_section(1, vec![pcm("b", 0, "PCM0P", ""), pcm("d", 2, "", "PCM2C")]),
    ]);
    let grouped = GroupedTopology::new(&doc).unwrap();
    let order: Vec<(u32, &str)> = grouped.pcm_list.iter().map(|p| (p.pcm_id, p.pcm_name.as_str())).collect();
    assert_eq!(order, [(0, "b"), (2, "a"), (2, "d"), (7, "c")]);
    assert_eq!(grouped.pcms_with_id(2).len(), 2);
}

#[test]
fn links_from_all_link_sections_are_sorted() {
    let link = |id| Block::Link(LinkConfig { id, ..LinkConfig::default() });
    let doc = Document::new(vec![
        Section::new(SectionType::BackendLink, 0, vec![link(5), link(1)]).unwrap(),
        Section::new(SectionType::DaiLink, 0, vec![link(3)]).unwrap(),
        Section::new(SectionType::CodecLink, 0, vec![link(0)]).unwrap(),
    ]);
    let grouped = GroupedTopology::new(&doc).unwrap();
    let ids: Vec<u32> = grouped.link_list.iter().map(|l| l.id).collect();
    assert_eq!(ids, [0, 1, 3, 5]);
}

#[test]
fn widgets_and_edges_keep_file_order() {
    let doc = playback_scenario();
    let grouped = GroupedTopology::new(&doc).unwrap();
    let names: Vec<&str> = grouped.widget_list.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["PCM0P", "BUF1.0", "PGA1.1", "SSP0.OUT"]);
    assert_eq!(grouped.graph_list.len(), 3);
    assert_eq!(grouped.graph_list[0].source, "PCM0P");
    assert!(grouped.manifest.is_none());
}

/// Kcontrols owned by widgets stay with their widget; only top-level ones are grouped.
#[test]
fn kcontrol_list_holds_top_level_kcontrols() {
    let kcontrol = |name: &str| Kcontrol {
        hdr: KcontrolHeader {
            name: name.to_string(),
            ..KcontrolHeader::default()
        },
        body: KcontrolBody::Mixer(MixerControl::default()),
    };
    let mut pga = widget(DapmType::Pga, "PGA1.1");
    pga.kcontrols.push(kcontrol("PGA1.1 Master Playback Volume"));
    let doc = Document::new(vec![
        Section::new(SectionType::Mixer, 0, vec![Block::Kcontrol(kcontrol("Mic Gain"))]).unwrap(),
        widget_section(1, vec![pga]),
        Section::new(SectionType::Mixer, 2, vec![Block::Kcontrol(kcontrol("Line Gain"))]).unwrap(),
    ]);
    let grouped = GroupedTopology::new(&doc).unwrap();
    let names: Vec<&str> = grouped.kcontrol_list.iter().map(|k| k.name()).collect();
    assert_eq!(names, ["Mic Gain", "Line Gain"]);
    assert_eq!(grouped.widget_list[0].kcontrols.len(), 1);
}

/// Two manifests are rejected whether they share a section or not.
#[test]
fn duplicate_manifest_is_a_consistency_error() {
    let manifest = || Block::Manifest(Manifest::default());
    let one_section =
        Document::new(vec![Section::new(SectionType::Manifest, 0, vec![manifest(), manifest()]).unwrap()]);
    let two_sections = Document::new(vec![
        Section::new(SectionType::Manifest, 0, vec![manifest()]).unwrap(),
        Section::new(SectionType::Manifest, 1, vec![manifest()]).unwrap(),
    ]);
    for doc in [one_section, two_sections] {
        assert!(matches!(GroupedTopology::new(&doc), Err(ConsistencyError::DuplicateManifest(2))));
    }

    let single = Document::new(vec![Section::new(SectionType::Manifest, 0, vec![manifest()]).unwrap()]);
    assert!(GroupedTopology::new(&single).unwrap().manifest.is_some());
}

#[test]
fn pcm_type_for_every_flag_combination() {
    for (playback, capture, expected) in [
        (1, 0, PcmType::Playback),
        (1, 1, PcmType::Duplex),
        (0, 1, PcmType::Capture),
        (0, 0, PcmType::None),
    ] {
        let mut p = pcm("x", 0, "", "");
        p.playback = playback;
        p.capture = capture;
        assert_eq!(GroupedTopology::pcm_type(&p), expected);
    }
}

#[test]
fn pcm_info_line_uses_capture_caps_for_capture_pcms() {
    let playback = pcm("Speaker", 0, "PCM0P", "");
    assert_eq!(
        GroupedTopology::pcm_info_line(&playback),
        "pcm=Speaker;id=0;type=playback;rate_min=48000;rate_max=48000;ch_min=2;ch_max=2;fmts=S16_LE S32_LE"
    );

    let mut capture = pcm("DMIC", 10, "", "PCM10C");
    capture.caps[1].rate_min = 16000;
    capture.caps[1].channels_max = 4;
    capture.caps[1].formats = 1 << 10;
    assert_eq!(
        GroupedTopology::pcm_info_line(&capture),
        "pcm=DMIC;id=10;type=capture;rate_min=16000;rate_max=48000;ch_min=2;ch_max=4;fmts=S32_LE"
    );
    assert_eq!(GroupedTopology::pcm_rates(&capture)[1], (16000, 48000));
    assert_eq!(GroupedTopology::pcm_channels(&capture)[1], (2, 4));
    assert_eq!(GroupedTopology::pcm_formats(&capture), [vec!["S16_LE", "S32_LE"], vec!["S32_LE"]]);
}

#[test]
fn virtual_widgets() {
    for (id, expected) in [
        (DapmType::Input, true),
        (DapmType::Output, true),
        (DapmType::OutDrv, true),
        (DapmType::Pga, false),
        (DapmType::AifIn, false),
    ] {
        assert_eq!(GroupedTopology::is_virtual_widget(&widget(id, "w")), expected, "{id:?}");
    }
}

#[test]
fn token_lookup_returns_first_match_or_default() {
    let w = widget_with_tuples(
        DapmType::Pga,
        "PGA1.1",
        TupleType::Word,
        &[
            (tokens::SOF_TKN_COMP_CORE_ID, TupleValue::Scalar(2)),
            (tokens::SOF_TKN_COMP_CORE_ID, TupleValue::Scalar(3)),
        ],
    );
    assert_eq!(GroupedTopology::token_or(&w, tokens::SOF_TKN_COMP_CORE_ID, 0), 2);
    assert_eq!(GroupedTopology::token_or(&w, tokens::SOF_TKN_COMP_CPC, 7), 7);
    assert!(GroupedTopology::find_token(&w, tokens::SOF_TKN_COMP_UUID).is_none());
    assert!(GroupedTopology::has_wname_prefix(&w));

    let no_prefix = widget_with_tuples(
        DapmType::Pga,
        "PGA2.1",
        TupleType::Bool,
        &[(tokens::SOF_TKN_COMP_NO_WNAME_IN_KCONTROL_NAME, TupleValue::Scalar(1))],
    );
    assert!(!GroupedTopology::has_wname_prefix(&no_prefix));

    let uuid = widget_with_tuples(
        DapmType::Src,
        "SRC1.0",
        TupleType::Uuid,
        &[(tokens::SOF_TKN_COMP_UUID, TupleValue::Uuid([0x11; 16]))],
    );
    assert_eq!(GroupedTopology::widget_uuid(&uuid), Some([0x11; 16]));
}

#[test]
fn dynamic_pipeline_reads_scheduler_token() {
    let sched = |name: &str, dynamic: u32| {
        widget_with_tuples(
            DapmType::Scheduler,
            name,
            TupleType::Bool,
            &[(tokens::SOF_TKN_SCHED_DYNAMIC_PIPELINE, TupleValue::Scalar(dynamic))],
        )
    };
    let doc = Document::new(vec![widget_section(
        0,
        vec![
            sched("PIPELINE.1.SSP0.OUT", 1),
            sched("PIPELINE.2.PCM0C", 0),
            widget(DapmType::Pga, "PGA1.1"),
        ],
    )]);
    let grouped = GroupedTopology::new(&doc).unwrap();
    assert_eq!(grouped.pipeline_ids().collect::<Vec<_>>(), ["1", "2"]);
    assert_eq!(grouped.pipeline_widget("1").map(|w| w.name.as_str()), Some("PIPELINE.1.SSP0.OUT"));
    assert!(grouped.is_dynamic_pipeline("1"));
    assert!(!grouped.is_dynamic_pipeline("2"));
    assert!(!grouped.is_dynamic_pipeline("3"));
}
