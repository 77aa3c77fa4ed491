use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use omega_resonance::dsp::renderer::render_wav_seconds;
use omega_resonance::{
    CustomProtocolDraft, DraftModality, EngineConfig, PlaybackRequest, ProtocolLibrary,
    ProtocolStore, ToneEngine, play_protocol,
};

#[derive(Parser, Debug)]
#[command(name = "omega", version, about = "Render and manage frequency protocols")]
struct Cli {
    /// Directory holding custom protocols (defaults to the platform data dir)
    #[arg(long)]
    store_dir: Option<PathBuf>,
    /// JSON engine configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output sample rate in Hz (overrides the config file)
    #[arg(long)]
    sample_rate: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in and custom protocols
    List,
    /// Render a protocol to a WAV file
    Render {
        id: String,
        #[arg(long, default_value_t = 30.0)]
        seconds: f64,
        #[arg(long, default_value_t = 0.5)]
        volume: f64,
        /// Sequence step length in milliseconds
        #[arg(long)]
        step_ms: Option<u64>,
        #[arg(long, short)]
        out: PathBuf,
    },
    /// Author a custom protocol
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated effects
        #[arg(long, default_value = "")]
        effects: String,
        #[arg(long, default_value_t = 120.0)]
        carrier: f64,
        /// Binaural beat offset in Hz
        #[arg(long, conflicts_with = "pulse")]
        binaural: Option<f64>,
        /// Pulse (amplitude modulation) frequency in Hz
        #[arg(long)]
        pulse: Option<f64>,
    },
    /// Delete a custom protocol
    Remove { id: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let store = ProtocolStore::in_dir(store_dir(cli.store_dir.clone())?);
    let mut library = ProtocolLibrary::load(&store)
        .with_context(|| format!("loading custom protocols from {}", store.path().display()))?;
    let config = engine_config(&cli)?;

    match cli.command {
        Commands::List => {
            for p in library.all() {
                let kind = if p.is_sequence() {
                    "sequence".to_string()
                } else if let Some(offset) = p.binaural_beat_offset {
                    format!("binaural {offset} Hz")
                } else if let Some(pulse) = p.pulse_frequency {
                    format!("pulse {pulse} Hz")
                } else {
                    "plain".to_string()
                };
                let carrier = p
                    .carrier_frequencies
                    .first()
                    .map(|hz| format!("{hz} Hz"))
                    .unwrap_or_else(|| "-".to_string());
                let custom = if p.is_custom() { " [custom]" } else { "" };
                println!("{:<28} {:<28} {:>9}  {kind}{custom}", p.id, p.name, carrier);
            }
        }
        Commands::Render {
            id,
            seconds,
            volume,
            step_ms,
            out,
        } => {
            let protocol = library
                .find(&id)
                .with_context(|| format!("unknown protocol '{id}'"))?;
            let step = step_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.default_step());

            let mut engine = ToneEngine::new(config);
            if !engine.is_enabled() {
                bail!("audio output unavailable; check --sample-rate");
            }
            let on_step = |r: &PlaybackRequest| {
                log::info!("step: {} Hz {:?}", r.carrier_frequency(), r.modality())
            };
            play_protocol(&mut engine, protocol, volume, on_step, step)?;
            let wav = render_wav_seconds(&mut engine, seconds)?;
            fs::write(&out, wav).with_context(|| format!("writing {}", out.display()))?;
            log::info!("rendered {seconds}s of '{}' to {}", protocol.name, out.display());
        }
        Commands::Add {
            name,
            description,
            effects,
            carrier,
            binaural,
            pulse,
        } => {
            let modality = match (binaural, pulse) {
                (Some(hz), _) => DraftModality::Binaural(hz),
                (None, Some(hz)) => DraftModality::Pulse(hz),
                (None, None) => DraftModality::None,
            };
            let draft = CustomProtocolDraft {
                name,
                description,
                effects,
                carrier_frequency: carrier,
                modality,
            };
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
            let protocol = draft.build(now)?;
            println!("added {}", protocol.id);
            library.add_custom(protocol);
            library.save(&store)?;
        }
        Commands::Remove { id } => {
            let removed = library.remove_custom(&id)?;
            library.save(&store)?;
            println!("removed {} ({})", removed.id, removed.name);
        }
    }
    Ok(())
}

fn store_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let dirs = ProjectDirs::from("net", "omega", "omega-resonance")
        .context("no home directory to keep custom protocols in; pass --store-dir")?;
    Ok(dirs.data_dir().to_path_buf())
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(sr) = cli.sample_rate {
        config.sample_rate = sr;
    }
    Ok(config)
}
