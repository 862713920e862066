//! tplgtool: inspect SOF topology (.tplg) files.
//!
//! Every command takes files and/or directories (expanded to their `*.tplg`
//! entries). Files are processed independently: a failure is logged, counted,
//! and the remaining files are still processed. The exit status is non-zero
//! when any file failed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tplg::config::ToolConfig;
use tplg::{DapmType, Document, GraphView, GroupedTopology, KcontrolBody, PipelineGraph, SectionType, Widget};

#[derive(Parser)]
#[command(name = "tplgtool")]
#[command(author, version, about = "Inspect SOF topology (.tplg) files", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one summary line per PCM
    Pcm(Files),

    /// Write a Graphviz DOT file per topology
    Graph {
        #[command(flatten)]
        files: Files,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        outdir: PathBuf,
        /// Treat unresolved PCM widget names as a failure
        #[arg(long)]
        strict: bool,
    },

    /// Dump the decoded document as JSON
    Dump {
        #[command(flatten)]
        files: Files,
        /// Pretty-print
        #[arg(long)]
        pretty: bool,
    },

    /// List pipelines cross-linked through a shared component
    Interweaved(Files),

    /// List widgets of each widget section with their scheduler
    Dapms(Files),

    /// List PGA volume kcontrols, or the bytes kcontrols of one effect widget
    Kcontrols {
        #[command(flatten)]
        files: Files,
        /// Effect widget whose bytes kcontrols to list
        #[arg(long)]
        effect: Option<String>,
    },

    /// List component UUIDs
    Uuids(Files),

    /// Parse, rebuild and compare each file
    Roundtrip(Files),
}

#[derive(Args)]
struct Files {
    /// Topology files or directories
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

impl Commands {
    fn files(&self) -> &Files {
        match self {
            Commands::Pcm(files)
            | Commands::Interweaved(files)
            | Commands::Dapms(files)
            | Commands::Uuids(files)
            | Commands::Roundtrip(files) => files,
            Commands::Graph { files, .. } | Commands::Dump { files, .. } | Commands::Kcontrols { files, .. } => files,
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    let files = expand_paths(&cli.command.files().paths)?;

    let mut failed = 0usize;
    for file in &files {
        if let Err(e) = run(&cli.command, file, &config) {
            tracing::error!(path = %file.display(), "{e:#}");
            failed += 1;
        }
    }
    if failed > 0 {
        tracing::error!(failed, total = files.len(), "some topologies failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Directories expand to their `*.tplg` entries, sorted by name.
fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("read directory {}", path.display()))? {
            let entry_path = entry?.path();
            if entry_path.is_file() && entry_path.extension().is_some_and(|ext| ext == "tplg") {
                found.push(entry_path);
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn run(command: &Commands, path: &Path, config: &ToolConfig) -> Result<()> {
    if let Commands::Roundtrip(_) = command {
        return roundtrip(path);
    }
    let doc = Document::from_file(path)?;
    let mut out = std::io::stdout().lock();
    match command {
        Commands::Dump { pretty, .. } => {
            if *pretty {
                serde_json::to_writer_pretty(&mut out, &doc)?;
            } else {
                serde_json::to_writer(&mut out, &doc)?;
            }
            writeln!(out)?;
        }
        Commands::Dapms(_) => dapms(&doc, &mut out)?,
        _ => {
            let grouped = GroupedTopology::new(&doc)?;
            match command {
                Commands::Pcm(_) => {
                    for pcm in &grouped.pcm_list {
                        writeln!(out, "{}", GroupedTopology::pcm_info_line(pcm))?;
                    }
                }
                Commands::Graph { outdir, strict, .. } => {
                    let graph = PipelineGraph::new(&grouped);
                    let view = GraphView::new(&graph, &config.render);
                    if *strict && view.lookup_misses > 0 {
                        bail!("{} PCM widget(s) did not resolve to exactly one PCM", view.lookup_misses);
                    }
                    let stem = path.file_stem().context("topology path has no file name")?;
                    let dot_path = outdir.join(stem).with_extension("dot");
                    fs::write(&dot_path, view.to_dot()).with_context(|| format!("write {}", dot_path.display()))?;
                    tracing::info!(path = %dot_path.display(), nodes = view.nodes.len(), "wrote graph");
                }
                Commands::Interweaved(_) => {
                    let graph = PipelineGraph::new(&grouped);
                    for pipeline in graph.find_interweaved_pipelines_with(&config.interweaved_markers)? {
                        let pcms: Vec<&str> = pipeline.pcms.iter().map(|w| w.name.as_str()).collect();
                        writeln!(out, "{}: {}", pipeline.marker.name, pcms.join(" "))?;
                    }
                }
                Commands::Kcontrols { effect, .. } => kcontrols(&grouped, effect.as_deref(), &mut out)?,
                Commands::Uuids(_) => {
                    for widget in &grouped.widget_list {
                        if let Some(uuid) = GroupedTopology::widget_uuid(widget) {
                            writeln!(out, "{} {}", format_uuid(&uuid), widget.name)?;
                        }
                    }
                }
                Commands::Dump { .. } | Commands::Dapms(_) | Commands::Roundtrip(_) => {}
            }
        }
    }
    Ok(())
}

fn roundtrip(path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let doc = Document::parse(&bytes)?;
    let rebuilt = doc.build()?;
    if rebuilt == bytes {
        println!("{}: identical", path.display());
        return Ok(());
    }
    if Document::parse(&rebuilt)? != doc {
        bail!("rebuilt document does not parse back to the same structure");
    }
    println!("{}: equivalent (padding differs)", path.display());
    Ok(())
}

fn dapms(doc: &Document, out: &mut impl Write) -> Result<()> {
    for section in doc.sections.iter().filter(|s| s.section_type() == SectionType::DapmWidget) {
        let widgets: Vec<&Widget> = section
            .blocks()
            .iter()
            .filter_map(|b| match b {
                tplg::Block::Widget(w) => Some(w),
                _ => None,
            })
            .collect();
        let schedulers: Vec<&str> = widgets
            .iter()
            .filter(|w| w.id == DapmType::Scheduler)
            .map(|w| w.name.as_str())
            .collect();
        let scheduler = match schedulers[..] {
            [] => "none",
            [name] => name,
            _ => bail!("widget section {} has {} schedulers", section.header.index, schedulers.len()),
        };
        writeln!(out, "\n --- SCHEDULER = {scheduler} ------- \n")?;
        for widget in widgets.iter().filter(|w| w.id != DapmType::Scheduler) {
            writeln!(out, "{:?}: {}", widget.id, widget.name)?;
        }
    }
    Ok(())
}

fn kcontrols(grouped: &GroupedTopology<'_>, effect: Option<&str>, out: &mut impl Write) -> Result<()> {
    for widget in &grouped.widget_list {
        let prefix = if GroupedTopology::has_wname_prefix(widget) {
            format!("{} ", widget.name)
        } else {
            String::new()
        };
        match effect {
            None if widget.id == DapmType::Pga => {
                let volumes: Vec<_> = widget
                    .kcontrols
                    .iter()
                    .filter(|kc| kc.mixer().is_some_and(|m| m.max != 1))
                    .collect();
                if volumes.len() != 1 {
                    tracing::warn!(widget = %widget.name, count = volumes.len(), "expected one volume kcontrol");
                }
                for kc in volumes {
                    writeln!(out, "{prefix}{}", kc.name())?;
                }
            }
            Some(name) if widget.id == DapmType::Effect && widget.name == name => {
                for kc in widget.kcontrols.iter().filter(|kc| matches!(kc.body, KcontrolBody::Bytes(_))) {
                    writeln!(out, "{prefix}{}", kc.name())?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Canonical 8-4-4-4-12 form of a UUID stored as `{u32, u16, u16, u8[8]}` little-endian.
fn format_uuid(b: &[u8; 16]) -> String {
    let a = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    let c = u16::from_le_bytes([b[4], b[5]]);
    let d = u16::from_le_bytes([b[6], b[7]]);
    let tail: String = b[10..].iter().map(|x| format!("{x:02x}")).collect();
    format!("{a:08x}-{c:04x}-{d:04x}-{:02x}{:02x}-{tail}", b[8], b[9])
}
