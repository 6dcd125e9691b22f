use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use slipstream_tools::{decode_packet, format_decode_pretty, inspect_packet, InspectReport};
use wire::{PacketKind, PlayerId};

#[derive(Parser)]
#[command(
    name = "slipstream-tools",
    version,
    about = "slipstream packet inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect packet lengths, frames and checksums.
    Inspect {
        /// Path to a packet file or a capture directory.
        packet_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected packets.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected packets (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Decode a packet into structured output.
    Decode {
        /// Path to the packet bytes.
        packet_file: PathBuf,
        /// Packet layout; detected from length when omitted.
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Peer a game-state packet must come from.
        #[arg(long, value_enum)]
        player: Option<PlayerArg>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
    Frame,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Input,
    State,
}

impl From<KindArg> for PacketKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Input => Self::Input,
            KindArg::State => Self::GameState,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlayerArg {
    Host,
    Client,
}

impl From<PlayerArg> for PlayerId {
    fn from(player: PlayerArg) -> Self {
        match player {
            PlayerArg::Host => Self::HOST,
            PlayerArg::Client => Self::CLIENT,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            packet_path,
            glob,
            sort,
            limit,
            format,
        } => {
            let paths = if packet_path.is_dir() {
                collect_packet_paths(&packet_path, glob.as_deref())?
            } else {
                vec![packet_path]
            };
            let mut entries = Vec::with_capacity(paths.len());
            for path in paths {
                let bytes =
                    fs::read(&path).with_context(|| format!("read packet {}", path.display()))?;
                entries.push(PacketEntry {
                    report: inspect_packet(&bytes),
                    path,
                });
            }
            sort_entries(&mut entries, sort);
            if let Some(limit) = limit.or(sort.map(|_| 10)) {
                entries.truncate(limit);
            }
            match format {
                OutputFormat::Json => {
                    let reports: Vec<_> = entries
                        .iter()
                        .map(|entry| {
                            serde_json::json!({
                                "path": entry.path.display().to_string(),
                                "report": entry.report,
                            })
                        })
                        .collect();
                    let json =
                        serde_json::to_string_pretty(&reports).context("serialize json")?;
                    println!("{json}");
                }
                OutputFormat::Pretty => {
                    for entry in &entries {
                        println!("== {} ({} bytes) ==", entry.path.display(), entry.report.len);
                        print_inspect_report(&entry.report);
                    }
                }
            }
        }
        Command::Decode {
            packet_file,
            kind,
            player,
            format,
        } => {
            let bytes = fs::read(&packet_file)
                .with_context(|| format!("read packet {}", packet_file.display()))?;
            let output = decode_packet(&bytes, kind.map(Into::into), player.map(Into::into))
                .with_context(|| format!("decode {}", packet_file.display()))?;
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                OutputFormat::Pretty => {
                    println!("{}", format_decode_pretty(&output));
                }
            }
        }
    }
    Ok(())
}

struct PacketEntry {
    path: PathBuf,
    report: InspectReport,
}

fn collect_packet_paths(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

fn sort_entries(entries: &mut [PacketEntry], sort: Option<InspectSort>) {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| {
                b.report
                    .len
                    .cmp(&a.report.len)
                    .then_with(|| a.path.cmp(&b.path))
            });
        }
        Some(InspectSort::Frame) => {
            entries.sort_by(|a, b| {
                a.report
                    .frame
                    .cmp(&b.report.frame)
                    .then_with(|| a.path.cmp(&b.path))
            });
        }
        None => {}
    }
}

fn print_inspect_report(report: &InspectReport) {
    let kind = report.kind.as_deref().unwrap_or("unknown");
    let player = report
        .player_id
        .map_or_else(|| "n/a".to_string(), |id| id.to_string());
    let frame = report
        .frame
        .map_or_else(|| "n/a".to_string(), |frame| frame.to_string());
    println!("kind: {kind} player: {player} frame: {frame}");
    match (report.crc_expected, report.crc_found) {
        (Some(expected), Some(found)) => println!(
            "crc: expected 0x{expected:04x} found 0x{found:04x} ({})",
            if report.checksum_ok { "ok" } else { "MISMATCH" }
        ),
        _ => println!("crc: n/a"),
    }
    if let Some(error) = &report.error {
        println!("decode error: {error}");
    }
}
