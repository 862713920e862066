//! Pipeline graph: DAPM widgets connected by graph edges.
//!
//! Nodes are identified by the strings the graph edges use, which may be a
//! widget's name or its stream name. Adjacency is kept in both directions so
//! searches can run forward (source to sink) and backward (sink to source).
//!
//! All searches use explicit work lists with visited sets, so cyclic graphs
//! terminate, and results are ordered by node name.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::block::{Pcm, Widget};
use crate::error::ConsistencyError;
use crate::grouped::GroupedTopology;

/// Marker component prefixes used by [`PipelineGraph::find_interweaved_pipelines`].
pub const DEFAULT_INTERWEAVED_MARKERS: [&str; 2] = ["ECHO", "SMART_AMP"];

/// Position of a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// No edges at all.
    Isolated,
    /// Incoming edges only.
    Head,
    /// Outgoing edges only.
    Tail,
    /// Both incoming and outgoing edges.
    Interior,
}

/// Two pipelines cross-linked through a shared component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterweavedPipeline<'a> {
    /// The shared component (echo reference, smart amplifier, ...).
    pub marker: &'a Widget,
    /// PCM endpoint widgets of both pipelines, ordered by name.
    pub pcms: Vec<&'a Widget>,
}

type Edges<'a> = HashMap<&'a str, Vec<&'a str>>;

/// Search structures built once over a [`GroupedTopology`].
#[derive(Debug, Clone)]
pub struct PipelineGraph<'a> {
    tplg: &'a GroupedTopology<'a>,
    /// Widget name or stream name -> widget. Names win over stream names.
    nodes: HashMap<&'a str, &'a Widget>,
    /// Name or stream name -> the identity used by graph edges, where they differ.
    graph_names: HashMap<&'a str, &'a str>,
    forward: Edges<'a>,
    backward: Edges<'a>,
    isolated: BTreeSet<&'a str>,
    heads: BTreeSet<&'a str>,
    tails: BTreeSet<&'a str>,
}

impl<'a> PipelineGraph<'a> {
    pub fn new(tplg: &'a GroupedTopology<'a>) -> Self {
        let mut nodes = HashMap::new();
        for widget in &tplg.widget_list {
            nodes.insert(widget.name.as_str(), *widget);
        }
        for widget in &tplg.widget_list {
            if !widget.sname.is_empty() {
                nodes.entry(widget.sname.as_str()).or_insert(*widget);
            }
        }

        let mut graph_names = HashMap::new();
        let mut forward: Edges<'a> = HashMap::new();
        let mut backward: Edges<'a> = HashMap::new();
        for edge in &tplg.graph_list {
            forward.entry(edge.source.as_str()).or_default().push(edge.sink.as_str());
            backward.entry(edge.sink.as_str()).or_default().push(edge.source.as_str());
            for edge_name in [edge.source.as_str(), edge.sink.as_str()] {
                let Some(&node) = nodes.get(edge_name) else {
                    tracing::debug!(name = edge_name, "graph edge names no widget");
                    continue;
                };
                for name in [node.name.as_str(), node.sname.as_str()] {
                    if !name.is_empty() && name != edge_name {
                        graph_names.insert(name, edge_name);
                    }
                }
            }
        }

        let mut graph = Self {
            tplg,
            nodes,
            graph_names,
            forward,
            backward,
            isolated: BTreeSet::new(),
            heads: BTreeSet::new(),
            tails: BTreeSet::new(),
        };
        for widget in &tplg.widget_list {
            let name = graph.graph_names.get(widget.name.as_str()).copied().unwrap_or(widget.name.as_str());
            match graph.leaf_kind(name) {
                LeafKind::Isolated => graph.isolated.insert(name),
                LeafKind::Head => graph.heads.insert(name),
                LeafKind::Tail => graph.tails.insert(name),
                LeafKind::Interior => false,
            };
        }
        graph
    }

    pub fn topology(&self) -> &'a GroupedTopology<'a> {
        self.tplg
    }

    /// Identity of `name` as used by graph edges; `name` itself if it has no other.
    pub fn graph_name<'s>(&'s self, name: &'s str) -> &'s str {
        self.graph_names.get(name).copied().unwrap_or(name)
    }

    /// Identity of `widget` as used by graph edges.
    pub fn node_name_in_graph<'s>(&'s self, widget: &'s Widget) -> &'s str {
        self.graph_name(&widget.name)
    }

    /// Widget reachable under `name` (name first, then stream name).
    pub fn node(&self, name: &str) -> Option<&'a Widget> {
        self.nodes.get(name).copied()
    }

    pub fn leaf_kind(&self, graph_name: &str) -> LeafKind {
        let has_out = self.forward.get(graph_name).is_some_and(|v| !v.is_empty());
        let has_in = self.backward.get(graph_name).is_some_and(|v| !v.is_empty());
        match (has_out, has_in) {
            (false, false) => LeafKind::Isolated,
            (false, true) => LeafKind::Head,
            (true, false) => LeafKind::Tail,
            (true, true) => LeafKind::Interior,
        }
    }

    pub fn isolated(&self) -> &BTreeSet<&'a str> {
        &self.isolated
    }

    pub fn heads(&self) -> &BTreeSet<&'a str> {
        &self.heads
    }

    pub fn tails(&self) -> &BTreeSet<&'a str> {
        &self.tails
    }

    /// Widgets matching `predicate` that are reachable from `start`.
    ///
    /// Forward and backward reachability are explored separately: a branch
    /// entered in one direction is never left in the other. In
    ///
    /// ```text
    /// A -> B -> C
    ///      |
    ///      v
    /// D -> E -> F
    /// ```
    ///
    /// starting from `B` finds `A B C E F`, from `E` finds `A B D E F`, and
    /// from `C` only `A B C`. The start itself is included when it matches.
    pub fn find_connected_comp<P>(&self, start: &Widget, predicate: P) -> Vec<&'a Widget>
    where
        P: Fn(&Widget) -> bool,
    {
        let start = self.node_name_in_graph(start);
        self.connected(start, |name| self.nodes.get(name).is_some_and(|w| predicate(w)))
    }

    /// `[playback, capture]` components whose names start with `prefix`
    /// (case-insensitive), reachable from the PCM's capability widgets.
    pub fn find_comp_for_pcm(&self, pcm: &Pcm, prefix: &str) -> [Vec<&'a Widget>; 2] {
        let prefix = prefix.to_ascii_uppercase();
        let search = |cap_name: &str| {
            if cap_name.is_empty() {
                return Vec::new();
            }
            self.connected(self.graph_name(cap_name), |name| {
                name.to_ascii_uppercase().starts_with(&prefix)
            })
        };
        [search(&pcm.caps[0].name), search(&pcm.caps[1].name)]
    }

    /// Pipeline id(s) of a node.
    ///
    /// Names following `<letters><id>.<index>` carry their id directly.
    /// Otherwise neighbours are examined one hop at a time in both
    /// directions: a single candidate id is accepted and no candidate moves
    /// one hop further. Several candidates are returned as they are when one
    /// direction alone yields more than one id; when each direction yields at
    /// most one, the conflict is settled one hop further. Returns an empty set
    /// when the graph is exhausted.
    pub fn get_pipeline_id(&self, name: &str) -> BTreeSet<String> {
        if let Some(id) = pipeline_id_from_name(name) {
            return BTreeSet::from([id.to_string()]);
        }
        let start = self.graph_name(name);
        let mut visited = HashSet::from([start]);
        let mut forward = vec![start];
        let mut backward = vec![start];
        loop {
            forward = next_frontier(&self.forward, &forward, &mut visited);
            backward = next_frontier(&self.backward, &backward, &mut visited);
            if forward.is_empty() && backward.is_empty() {
                return BTreeSet::new();
            }
            let forward_ids = ids_of(&forward);
            let backward_ids = ids_of(&backward);
            let ambiguous_per_direction = forward_ids.len() > 1 || backward_ids.len() > 1;
            let ids: BTreeSet<String> = forward_ids.union(&backward_ids).map(|id| id.to_string()).collect();
            match ids.len() {
                1 => return ids,
                0 => continue,
                _ if !ambiguous_per_direction => continue,
                _ => return ids,
            }
        }
    }

    /// Interweaved pipelines, marked by components with the default prefixes.
    pub fn find_interweaved_pipelines(&self) -> Result<Vec<InterweavedPipeline<'a>>, ConsistencyError> {
        self.find_interweaved_pipelines_with(&DEFAULT_INTERWEAVED_MARKERS)
    }

    /// Interweaved pipelines whose shared component name starts with one of
    /// `markers` (compared on the component prefix).
    ///
    /// Each head whose same-prefix backward search yields exactly two
    /// endpoints is expanded to the heads and tails around those endpoints.
    /// That set must hold exactly four endpoints, and the first endpoint (by
    /// name) with any marker in reach must reach exactly one. A pairing found
    /// from several heads is reported once.
    pub fn find_interweaved_pipelines_with<S>(
        &self,
        markers: &[S],
    ) -> Result<Vec<InterweavedPipeline<'a>>, ConsistencyError>
    where
        S: AsRef<str>,
    {
        let is_marker = |name: &str| {
            let prefix = get_comp_prefix(name);
            markers.iter().any(|m| m.as_ref() == prefix)
        };
        let mut pipelines = Vec::new();
        let mut reported = HashSet::new();
        for &head in &self.heads {
            let prefix = get_comp_prefix(head);
            let mut endpoints = BTreeSet::new();
            walk(&self.backward, head, |n| get_comp_prefix(n) == prefix, &mut endpoints);
            if endpoints.len() != 2 {
                continue;
            }
            for endpoint in endpoints.clone() {
                walk(&self.forward, endpoint, |n| self.heads.contains(n), &mut endpoints);
                walk(&self.backward, endpoint, |n| self.tails.contains(n), &mut endpoints);
            }
            if endpoints.len() != 4 {
                return Err(ConsistencyError::InterweavedEndpoints {
                    head: head.to_string(),
                    found: endpoints.iter().map(|s| s.to_string()).collect(),
                });
            }

            let mut found = Vec::new();
            for endpoint in &endpoints {
                found = self.connected(endpoint, &is_marker);
                if !found.is_empty() {
                    break;
                }
            }
            let &[marker] = found.as_slice() else {
                return Err(ConsistencyError::InterweavedMarker {
                    head: head.to_string(),
                    found: found.iter().map(|w| w.name.clone()).collect(),
                });
            };
            if !reported.insert(marker.name.as_str()) {
                continue;
            }
            let pcms = endpoints
                .iter()
                .filter(|n| n.starts_with("PCM"))
                .filter_map(|n| self.node(n))
                .collect();
            tracing::debug!(head, marker = %marker.name, "found interweaved pipelines");
            pipelines.push(InterweavedPipeline { marker, pcms });
        }
        Ok(pipelines)
    }

    /// Widgets whose graph name matches `predicate`, reachable from `start`
    /// forward or backward, ordered by graph name.
    fn connected<P>(&self, start: &str, predicate: P) -> Vec<&'a Widget>
    where
        P: Fn(&str) -> bool,
    {
        let mut found = BTreeSet::new();
        walk(&self.forward, start, &predicate, &mut found);
        walk(&self.backward, start, &predicate, &mut found);
        found.into_iter().filter_map(|name| self.node(name)).collect()
    }
}

/// Collect every node reachable from `start` along `edges` (start included)
/// for which `predicate` holds.
fn walk<'s, P>(edges: &HashMap<&'s str, Vec<&'s str>>, start: &'s str, predicate: P, acc: &mut BTreeSet<&'s str>)
where
    P: Fn(&str) -> bool,
{
    let mut visited = HashSet::new();
    let mut work = vec![start];
    while let Some(name) = work.pop() {
        if !visited.insert(name) {
            continue;
        }
        if predicate(name) {
            acc.insert(name);
        }
        if let Some(next) = edges.get(name) {
            work.extend(next.iter().copied());
        }
    }
}

/// Unvisited neighbours of `frontier`, sorted and deduplicated.
fn next_frontier<'s>(
    edges: &HashMap<&'s str, Vec<&'s str>>,
    frontier: &[&'s str],
    visited: &mut HashSet<&'s str>,
) -> Vec<&'s str> {
    let mut next: Vec<&'s str> = frontier
        .iter()
        .filter_map(|n| edges.get(n))
        .flatten()
        .copied()
        .filter(|n| !visited.contains(n))
        .collect();
    next.sort_unstable();
    next.dedup();
    visited.extend(next.iter().copied());
    next
}

fn ids_of<'s>(frontier: &[&'s str]) -> BTreeSet<&'s str> {
    frontier.iter().filter_map(|&n| pipeline_id_from_name(n)).collect()
}

/// Leading run of ASCII letters and underscores: `SSP0.IN` -> `SSP`,
/// `SMART_AMP1.0` -> `SMART_AMP`, `ECHO REF 5` -> `ECHO`.
pub fn get_comp_prefix(name: &str) -> &str {
    let end = name
        .bytes()
        .position(|b| !(b.is_ascii_alphabetic() || b == b'_'))
        .unwrap_or(name.len());
    &name[..end]
}

/// `<letters><id>.<index>` -> `<id>`, e.g. `PGA1.1` -> `1`.
fn pipeline_id_from_name(name: &str) -> Option<&str> {
    let prefix = get_comp_prefix(name);
    if prefix.is_empty() {
        return None;
    }
    let (id, index) = name[prefix.len()..].split_once('.')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    (digits(id) && digits(index)).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comp_prefix() {
        assert_eq!(get_comp_prefix("PCM0C"), "PCM");
        assert_eq!(get_comp_prefix("SSP0.IN"), "SSP");
        assert_eq!(get_comp_prefix("ALH0x102"), "ALH");
        assert_eq!(get_comp_prefix("SMART_AMP1.0"), "SMART_AMP");
        assert_eq!(get_comp_prefix("ECHO REF 5"), "ECHO");
        assert_eq!(get_comp_prefix("0abc"), "");
    }

    #[test]
    fn pipeline_id_naming_convention() {
        assert_eq!(pipeline_id_from_name("PGA1.1"), Some("1"));
        assert_eq!(pipeline_id_from_name("MUXDEMUX12.0"), Some("12"));
        assert_eq!(pipeline_id_from_name("SMART_AMP5.0"), Some("5"));
        assert_eq!(pipeline_id_from_name("SSP0.OUT"), None);
        assert_eq!(pipeline_id_from_name("PCM0P"), None);
        assert_eq!(pipeline_id_from_name("1.0"), None);
        assert_eq!(pipeline_id_from_name("BUF1."), None);
    }

    #[test]
    fn walk_terminates_on_cycles() {
        let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
        edges.insert("a", vec!["b"]);
        edges.insert("b", vec!["c"]);
        edges.insert("c", vec!["a"]);
        let mut acc = BTreeSet::new();
        walk(&edges, "a", |_| true, &mut acc);
        assert_eq!(acc.into_iter().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn frontier_skips_visited_nodes() {
        let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
        edges.insert("a", vec!["c", "b", "b"]);
        edges.insert("b", vec!["a"]);
        let mut visited = HashSet::from(["a"]);
        assert_eq!(next_frontier(&edges, &["a"], &mut visited), ["b", "c"]);
        assert!(next_frontier(&edges, &["b"], &mut visited).is_empty());
    }
}
