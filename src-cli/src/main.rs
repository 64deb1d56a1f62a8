//! Command line inspector for the peak engine: decodes a WAV file and
//! prints the peaks a waveform view would draw.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use peakview_core::{export_diagnostics, EngineState, LoadSummary, WaveformData, WaveformLoader};
use peakview_infra_decode_hound::HoundDecoder;
use peakview_infra_storage_fs::FsSettingsStorage;
use peakview_ports::settings::{AnalysisSettings, SettingsPort};
use peakview_ports::waveform::Peak;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "peakview")]
#[command(version)]
#[command(about = "Waveform peak inspector", long_about = None)]
struct Cli {
    /// Analysis settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show format, length and source of a file
    Info { file: PathBuf },

    /// Print the cached peak table for a zoom level
    Peaks {
        file: PathBuf,

        /// Samples per pixel (rounded up to a power of two)
        #[arg(long, default_value_t = 1024)]
        spp: usize,

        /// Only this channel
        #[arg(long, conflicts_with = "mixed")]
        channel: Option<usize>,

        /// Mix all channels down to one
        #[arg(long)]
        mixed: bool,
    },

    /// Print pixel-exact min/max peaks for a frame range
    Range {
        file: PathBuf,

        #[arg(long, default_value_t = 0)]
        start: usize,

        /// End frame (exclusive); defaults to the end of the file
        #[arg(long)]
        end: Option<usize>,

        #[arg(long, default_value_t = 80)]
        width: usize,
    },

    /// Write diagnostics for a loaded file into a directory
    Diagnostics {
        file: PathBuf,

        #[arg(long)]
        out: PathBuf,

        /// Zoom levels to build before exporting
        #[arg(long, value_delimiter = ',', default_value = "256,1024")]
        spp: Vec<usize>,
    },
}

#[derive(Serialize)]
struct PeakRows<'a> {
    samples_per_pixel: usize,
    channels: Vec<&'a [Peak]>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(cli.settings.as_deref())?;
    let loader = WaveformLoader::new(
        Box::new(HoundDecoder::from_settings(&settings)),
        Arc::new(WaveformData::with_settings(&settings)),
    );

    match cli.command {
        Commands::Info { file } => {
            let summary = load(&loader, &file)?;
            match cli.format {
                OutputFormat::Json => print_json(&summary)?,
                OutputFormat::Text => {
                    println!("source:      {}", summary.source_id);
                    println!("sample rate: {} Hz", summary.format.sample_rate_hz);
                    println!("channels:    {}", summary.format.channels);
                    println!("frames:      {}", summary.frames);
                    println!("duration:    {:.3} s", summary.duration_secs);
                }
            }
        }
        Commands::Peaks {
            file,
            spp,
            channel,
            mixed,
        } => {
            load(&loader, &file)?;
            let waveform = loader.waveform();
            let table = waveform.peaks(spp);
            let mixed_peaks;
            let channels: Vec<&[Peak]> = if mixed {
                mixed_peaks = waveform.mixed_peaks(spp);
                vec![mixed_peaks.as_slice()]
            } else if let Some(channel) = channel {
                vec![table.channel(channel).unwrap_or(&[])]
            } else {
                table.channels.iter().map(Vec::as_slice).collect()
            };
            let rows = PeakRows {
                samples_per_pixel: table.samples_per_pixel,
                channels,
            };
            match cli.format {
                OutputFormat::Json => print_json(&rows)?,
                OutputFormat::Text => print_peak_rows(&rows),
            }
        }
        Commands::Range {
            file,
            start,
            end,
            width,
        } => {
            let summary = load(&loader, &file)?;
            let end = end.unwrap_or(summary.frames);
            let peaks = loader.waveform().peaks_for_range(start, end, width);
            match cli.format {
                OutputFormat::Json => print_json(&peaks)?,
                OutputFormat::Text => {
                    for (idx, peak) in peaks.iter().enumerate() {
                        println!("{:>6} {}", idx, bar(peak));
                    }
                }
            }
        }
        Commands::Diagnostics { file, out, spp } => {
            load(&loader, &file)?;
            for level in spp {
                loader.waveform().peaks(level);
            }
            export_diagnostics(&out, &settings, loader.waveform())
                .with_context(|| format!("failed to write diagnostics to {}", out.display()))?;
            match cli.format {
                OutputFormat::Json => print_json(&EngineState::capture(loader.waveform()))?,
                OutputFormat::Text => println!("diagnostics written to {}", out.display()),
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<AnalysisSettings> {
    let storage = match path {
        Some(path) => FsSettingsStorage::at_file(path.to_path_buf()),
        None => FsSettingsStorage::default(),
    };
    storage
        .load_settings()
        .with_context(|| format!("failed to read {}", storage.settings_path().display()))
}

fn load(loader: &WaveformLoader, file: &Path) -> Result<LoadSummary> {
    loader
        .load_path(file, &mut |progress| {
            debug!(
                frames = progress.frames_decoded,
                fraction = progress.fraction().unwrap_or(0.0),
                "decoding"
            )
        })
        .with_context(|| format!("failed to load audio from {}", file.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_peak_rows(rows: &PeakRows<'_>) {
    println!("samples per pixel: {}", rows.samples_per_pixel);
    for (channel, peaks) in rows.channels.iter().enumerate() {
        println!("channel {}", channel);
        for (idx, peak) in peaks.iter().enumerate() {
            println!(
                "{:>6} {:+.4} {:+.4} rms {:.4} bands {:.2}/{:.2}/{:.2}",
                idx,
                peak.min,
                peak.max,
                peak.rms,
                peak.bands.bass,
                peak.bands.mid,
                peak.bands.high
            );
        }
    }
}

/// Renders one peak as a 41-column min/max bar centred on zero.
fn bar(peak: &Peak) -> String {
    const HALF: f32 = 20.0;
    let lo = (HALF + peak.min.clamp(-1.0, 1.0) * HALF).round() as usize;
    let hi = (HALF + peak.max.clamp(-1.0, 1.0) * HALF).round() as usize;
    (0..=2 * HALF as usize)
        .map(|col| {
            if col >= lo && col <= hi {
                '#'
            } else if col == HALF as usize {
                '|'
            } else {
                ' '
            }
        })
        .collect()
}
