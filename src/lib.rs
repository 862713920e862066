//! SOF topology (`.tplg`) codec and pipeline graph.
//!
//! This crate provides:
//! - **Format constants** (`format`): magic, ABI version, record sizes, section / DAPM / tuple types, vendor tokens.
//! - **Blocks** (`block`): one decode/encode pair per block kind (manifest, kcontrols, graph edges,
//!   widgets, PCMs, links).
//! - **Document** (`document`): `Document::parse(bytes)`, `Document::from_file(path)` and `Document::build()`.
//! - **Grouped view** (`grouped`): blocks merged across sections into sorted lists, plus PCM / widget accessors.
//! - **Pipeline graph** (`graph`): connectivity queries over widgets and graph edges.
//! - **Render** (`render`): node/edge view with display attributes and Graphviz DOT text.
//! - **Config** (`config`, `serde` feature): TOML tool configuration.
//! - **Tool** (binary `tplgtool`): PCM summaries, DOT graphs, JSON dumps and more over batches of files.
//!
//! ```no_run
//! use tplg::{Document, GroupedTopology, PipelineGraph};
//!
//! # fn main() -> Result<(), tplg::TplgError> {
//! let doc = Document::from_file("sof-hda-generic.tplg")?;
//! let grouped = GroupedTopology::new(&doc)?;
//! let graph = PipelineGraph::new(&grouped);
//! for pcm in &grouped.pcm_list {
//!     println!("{}", GroupedTopology::pcm_info_line(pcm));
//!     let [playback, capture] = graph.find_comp_for_pcm(pcm, "PGA");
//!     println!("  {} playback / {} capture PGAs", playback.len(), capture.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod block;
mod codec;
#[cfg(feature = "serde")]
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod graph;
pub mod grouped;
pub mod render;

pub use block::{Block, GraphEdge, Kcontrol, KcontrolBody, LinkConfig, Manifest, Pcm, TupleValue, VendorArray, Widget};
pub use document::{Document, Section, SectionBody, SectionHeader};
pub use error::{ConsistencyError, EncodeError, FormatError, FormatReason, TplgError};
pub use format::{DapmType, SectionType, TupleType, TPLG_ABI_VERSION, TPLG_MAGIC};
pub use graph::{get_comp_prefix, InterweavedPipeline, LeafKind, PipelineGraph};
pub use grouped::{GroupedTopology, PcmType};
pub use render::{GraphView, RenderOptions};
