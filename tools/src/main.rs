use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::{DecodeLimits, SerializerOptions};
use glob::Pattern;
use soa_tools::{
    decode_packet_json, encode_entities, format_decode_pretty, format_inspect_report,
    inspect_report, load_schema, EntityState,
};

#[derive(Parser)]
#[command(
    name = "soa-tools",
    version,
    about = "soa columnar codec inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize packet size by component.
    Inspect {
        /// Path to the packet bytes, or a directory of packets.
        packet_path: PathBuf,
        /// Schema JSON describing the packet contents.
        #[arg(long)]
        schema: PathBuf,
        /// Packets use diff framing.
        #[arg(long)]
        diff: bool,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected packets.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected packets (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode packet records into structured JSON.
    Decode {
        /// Path to the packet bytes.
        packet_file: PathBuf,
        /// Schema JSON describing the packet contents.
        #[arg(long)]
        schema: PathBuf,
        /// Packet uses diff framing.
        #[arg(long)]
        diff: bool,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Encode entity state from JSON into a packet.
    Encode {
        /// JSON array of `{"index": n, "values": {"Comp.field": value}}`.
        state_file: PathBuf,
        /// Schema JSON describing the components.
        #[arg(long)]
        schema: PathBuf,
        /// Emit diff framing (against neutral values).
        #[arg(long)]
        diff: bool,
        /// Output path for the packet bytes.
        #[arg(long, short)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let limits = DecodeLimits::default();
    match cli.command {
        Command::Inspect {
            packet_path,
            schema,
            diff,
            glob,
            sort,
            limit,
        } => {
            let schema = load_schema(&schema).context("load schema")?;
            if packet_path.is_dir() {
                let entries = collect_packet_entries(&packet_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = read_packet(&entry.path)?;
                    let report = inspect_report(&bytes, &schema, diff, &limits)
                        .with_context(|| format!("inspect {}", entry.path.display()))?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    println!("{}", format_inspect_report(&report));
                }
            } else {
                let bytes = read_packet(&packet_path)?;
                let report = inspect_report(&bytes, &schema, diff, &limits)?;
                println!("{}", format_inspect_report(&report));
            }
        }
        Command::Decode {
            packet_file,
            schema,
            diff,
            format,
        } => {
            let bytes = read_packet(&packet_file)?;
            let schema = load_schema(&schema).context("load schema")?;
            let output = decode_packet_json(&bytes, &schema, diff, &limits)?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    println!("{}", format_decode_pretty(&output));
                }
            }
        }
        Command::Encode {
            state_file,
            schema,
            diff,
            out,
        } => {
            let schema = load_schema(&schema).context("load schema")?;
            let contents = fs::read_to_string(&state_file)
                .with_context(|| format!("read state {}", state_file.display()))?;
            let entities: Vec<EntityState> =
                serde_json::from_str(&contents).context("parse state json")?;
            let bytes = encode_entities(&schema, &entities, diff, SerializerOptions::default())?;
            fs::write(&out, &bytes).with_context(|| format!("write packet {}", out.display()))?;
            println!("wrote {} bytes to {}", bytes.len(), out.display());
        }
    }
    Ok(())
}

fn read_packet(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read packet {}", path.display()))
}

struct PacketEntry {
    path: PathBuf,
    size: u64,
}

fn collect_packet_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<PacketEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
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
        let size = entry.metadata()?.len();
        entries.push(PacketEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<PacketEntry>,
    sort: Option<InspectSort>,
) -> Vec<PacketEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}
