//! Node/edge view of a pipeline graph with display attributes, and its
//! Graphviz DOT serialisation.
//!
//! Only text is produced here; turning DOT into an image is left to external
//! tools.

use std::fmt::Write as _;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::block::{TupleValue, Widget};
use crate::format::{tokens, DapmType};
use crate::graph::PipelineGraph;
use crate::grouped::GroupedTopology;

/// Line style of a node outline or an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    fn as_dot(self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some("dashed"),
            LineStyle::Dotted => Some("dotted"),
        }
    }
}

/// Display attributes of a node or an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    pub line: LineStyle,
    pub color: Option<String>,
}

impl Style {
    fn new(line: LineStyle, color: &str) -> Self {
        Self {
            line,
            color: Some(color.to_string()),
        }
    }
}

/// Rendering knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Colour of widgets in dynamic pipelines.
    pub dynamic_color: String,
    /// Colour of virtual widgets and of edges touching them.
    pub virtual_color: String,
    /// Add a `core: N` line for widgets carrying a core id.
    pub show_core: bool,
    /// Add a `cpc: N` line for widgets carrying a cycles-per-chunk value.
    pub show_cpc: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dynamic_color: "blue".to_string(),
            virtual_color: "gray".to_string(),
            show_core: true,
            show_cpc: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    /// Graph name; edges refer to nodes by it.
    pub id: String,
    /// Label lines, first line is the node title.
    pub label: Vec<String>,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeView {
    pub source: String,
    pub sink: String,
    pub control: String,
    pub style: Style,
}

/// Everything an external renderer needs to draw a topology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    /// `PCM<id><P|C>` widgets whose id matched zero or several PCMs.
    pub lookup_misses: usize,
}

impl GraphView {
    /// Build the view. Isolated widgets are left out.
    pub fn new(graph: &PipelineGraph<'_>, opts: &RenderOptions) -> Self {
        let tplg = graph.topology();
        let mut view = GraphView::default();
        for widget in &tplg.widget_list {
            let id = graph.node_name_in_graph(widget);
            if graph.isolated().contains(id) {
                continue;
            }
            let title = match pcm_widget_id(&widget.name) {
                Some(pcm_id) => match tplg.pcms_with_id(pcm_id)[..] {
                    [pcm] => format!("{id} ({})", pcm.pcm_name),
                    ref matches => {
                        tracing::warn!(
                            widget = %widget.name,
                            pcm_id,
                            matches = matches.len(),
                            "PCM widget does not resolve to exactly one PCM"
                        );
                        view.lookup_misses += 1;
                        id.to_string()
                    }
                },
                None => id.to_string(),
            };
            let mut label = vec![title];
            label.extend(sub_labels(widget, opts));

            let style = if GroupedTopology::is_virtual_widget(widget) {
                Style::new(LineStyle::Dotted, &opts.virtual_color)
            } else if graph
                .get_pipeline_id(id)
                .iter()
                .any(|pipe| tplg.is_dynamic_pipeline(pipe))
            {
                Style::new(LineStyle::Dashed, &opts.dynamic_color)
            } else {
                Style::default()
            };
            view.nodes.push(NodeView {
                id: id.to_string(),
                label,
                style,
            });
        }

        let is_virtual = |name: &str| graph.node(name).is_some_and(GroupedTopology::is_virtual_widget);
        for edge in &tplg.graph_list {
            let style = if is_virtual(&edge.source) || is_virtual(&edge.sink) {
                Style::new(LineStyle::Dotted, &opts.virtual_color)
            } else {
                Style::default()
            };
            view.edges.push(EdgeView {
                source: edge.source.clone(),
                sink: edge.sink.clone(),
                control: edge.control.clone(),
                style,
            });
        }
        view
    }

    /// Graphviz DOT text.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph \"Topology Graph\" {\n");
        for node in &self.nodes {
            let label = node.label.iter().map(|l| escape(l)).collect::<Vec<_>>().join("\\n");
            let _ = write!(out, "    \"{}\" [label=\"{}\"", escape(&node.id), label);
            write_style(&mut out, &node.style);
            out.push_str("];\n");
        }
        for edge in &self.edges {
            let _ = write!(out, "    \"{}\" -> \"{}\" [", escape(&edge.source), escape(&edge.sink));
            let mut attrs = Vec::new();
            if !edge.control.is_empty() {
                attrs.push(format!("label=\"{}\"", escape(&edge.control)));
            }
            if let Some(line) = edge.style.line.as_dot() {
                attrs.push(format!("style={line}"));
            }
            if let Some(color) = &edge.style.color {
                attrs.push(format!("color=\"{}\"", escape(color)));
            }
            out.push_str(&attrs.join(", "));
            out.push_str("];\n");
        }
        out.push_str("}\n");
        out
    }
}

fn sub_labels(widget: &Widget, opts: &RenderOptions) -> Vec<String> {
    let mut lines = Vec::new();
    match widget.id {
        DapmType::Pga => {
            if let Some(kcontrol) = widget.kcontrols.first() {
                lines.push(kcontrol.name().to_string());
            }
        }
        DapmType::AifIn | DapmType::AifOut | DapmType::DaiIn | DapmType::DaiOut => {
            if !widget.sname.is_empty() {
                lines.push(widget.sname.clone());
            }
        }
        _ => {}
    }
    let scalar = |token| GroupedTopology::find_token(widget, token).and_then(TupleValue::as_scalar);
    if let Some(core) = scalar(tokens::SOF_TKN_COMP_CORE_ID).filter(|_| opts.show_core) {
        lines.push(format!("core: {core}"));
    }
    if let Some(cpc) = scalar(tokens::SOF_TKN_COMP_CPC).filter(|_| opts.show_cpc) {
        lines.push(format!("cpc: {cpc}"));
    }
    lines
}

fn write_style(out: &mut String, style: &Style) {
    if let Some(line) = style.line.as_dot() {
        let _ = write!(out, ", style={line}");
    }
    if let Some(color) = &style.color {
        let _ = write!(out, ", color=\"{}\"", escape(color));
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `PCM<digits><P|C>` -> PCM id.
fn pcm_widget_id(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("PCM")?.strip_suffix(['P', 'C'])?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm_widget_names() {
        assert_eq!(pcm_widget_id("PCM0P"), Some(0));
        assert_eq!(pcm_widget_id("PCM12C"), Some(12));
        assert_eq!(pcm_widget_id("PCMP"), None);
        assert_eq!(pcm_widget_id("PCM0X"), None);
        assert_eq!(pcm_widget_id("BUF1.0"), None);
    }

    #[test]
    fn dot_escapes_quotes() {
        let view = GraphView {
            nodes: vec![NodeView {
                id: "a\"b".to_string(),
                label: vec!["a\"b".to_string(), "core: 1".to_string()],
                style: Style::new(LineStyle::Dashed, "blue"),
            }],
            edges: Vec::new(),
            lookup_misses: 0,
        };
        let dot = view.to_dot();
        assert!(dot.contains("\"a\\\"b\" [label=\"a\\\"b\\ncore: 1\", style=dashed, color=\"blue\"];"));
    }
}
