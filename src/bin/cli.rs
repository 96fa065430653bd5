// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Scanforge CLI - replay recorded scans and export meshes

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use scanforge::{ExportFormat, GeometryBuffer, ScanSession};
use serde::Deserialize;
use std::path::Path;

#[derive(Parser)]
#[command(name = "scanforge")]
#[command(about = "Scanforge - mesh capture replay and export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded fragment stream and export the merged mesh
    Export {
        /// Recorded scan (JSON array of anchor/buffer records)
        input: String,

        /// Output file
        #[arg(short, long)]
        output: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Ply)]
        format: ExportFormat,
    },

    /// Print fragment and geometry counts for a recorded scan
    Info {
        /// Recorded scan (JSON array of anchor/buffer records)
        input: String,
    },

    /// Show version information
    Version,
}

/// One line of a recorded fragment stream.
#[derive(Debug, Deserialize)]
struct FragmentRecord {
    anchor: String,
    buffer: GeometryBuffer,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Export {
            input,
            output,
            format,
        } => export_command(input, output, *format, cli.verbose)?,
        Commands::Info { input } => info_command(input)?,
        Commands::Version => {
            println!("Scanforge v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_recording(path: &str) -> Result<Vec<FragmentRecord>> {
    if !Path::new(path).exists() {
        anyhow::bail!("Recording not found: {}", path);
    }

    let data = std::fs::read_to_string(path)
        .context(format!("Failed to read recording: {}", path))?;
    serde_json::from_str(&data).context(format!("Failed to parse recording: {}", path))
}

/// Drive a full session over the recorded stream, frame order preserved.
fn replay(records: Vec<FragmentRecord>, verbose: bool) -> Result<ScanSession> {
    let session = ScanSession::new();
    session.start();

    for record in records {
        if let Err(e) = session.on_fragment_update(&record.anchor, record.buffer) {
            // A noisy frame never aborts the replay, same as live capture.
            eprintln!(
                "{} fragment {} rejected: {}",
                "Warning:".yellow(),
                record.anchor,
                e
            );
        }
    }

    let points = session.stop().context("Recording produced no points")?;
    if verbose {
        println!("Captured {} points", points);
    }

    Ok(session)
}

fn export_command(input: &str, output: &str, format: ExportFormat, verbose: bool) -> Result<()> {
    let records = load_recording(input)?;
    if verbose {
        println!("Replaying {} fragment updates from {}", records.len(), input);
    }

    let start = std::time::Instant::now();
    let session = replay(records, verbose)?;
    session.export(format, output)?;

    if verbose {
        println!("Exported in {:.2?}", start.elapsed());
        println!("Output: {}", output);
    } else {
        println!(
            "{} {} -> {} ({})",
            "Exported".green(),
            input,
            output,
            format
        );
    }

    Ok(())
}

fn info_command(input: &str) -> Result<()> {
    let records = load_recording(input)?;
    let session = replay(records, false)?;

    let snapshot = session.snapshot();
    let merged = snapshot.merged();

    println!("{}", "Recording summary".bold());
    println!("  {} {}", "Fragments:".bright_black(), snapshot.fragment_count());
    println!("  {} {}", "Points:".bright_black(), snapshot.point_count());
    println!("  {} {}", "Vertices:".bright_black(), merged.vertex_count());
    println!("  {} {}", "Triangles:".bright_black(), merged.triangle_count());

    Ok(())
}
