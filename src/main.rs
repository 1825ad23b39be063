//! rssilab - Wi-Fi RSSI lab logger
//!
//! A CLI tool that records signal strength at measured distances
//! and reports how it attenuates.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (invalid entry, unreadable data file, capture failure, etc.)

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rssilab::analysis::generate_commentary;
use rssilab::capture::{
    record_readings, CaptureSummary, CapturePlan, CommandSource, FixedSource, SignalSource,
};
use rssilab::cli::{Args, Command, OutputFormat};
use rssilab::config::{Config, CONFIG_FILE_NAME};
use rssilab::display::{display_groups, display_samples};
use rssilab::models::{Experiment, Sample};
use rssilab::report::{self, csv};
use rssilab::store::{DebouncedWriter, ExperimentStore, JsonStore};
use rssilab::units::{format_distance, DistanceUnit};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    debug!("rssilab v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .rssilab.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize quality bands, validation and capture.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch a subcommand against the experiment on disk.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let store = JsonStore::new(&config.general.data_file);
    let is_new = !store.path().exists();
    let mut experiment = store.load()?;
    info!("Using data file: {}", store.path().display());

    // A stored experiment keeps its own unit unless --unit is given
    if is_new || args.unit.is_some() {
        experiment.meta.unit = config.general.unit;
    }
    let unit = experiment.meta.unit;

    match args.command {
        Command::Add {
            distance,
            rssi,
            noise,
            tx_rate,
            note,
        } => {
            let meters = unit.to_meters(distance);
            config.validation.check_entry(meters, rssi, tx_rate)?;

            let sample = Sample::new(meters, rssi)
                .with_noise(noise)
                .with_tx_rate(tx_rate)
                .with_note(note);
            println!(
                "➕ Added {} dBm at {} ({})",
                rssi,
                format_distance(meters, unit),
                sample.id
            );
            experiment.add_sample(sample);
            store.save(&experiment)?;
        }

        Command::Capture {
            distance,
            samples,
            interval_ms,
            note,
            simulate,
        } => {
            let meters = unit.to_meters(distance);
            config.validation.check_distance(meters)?;
            let plan = CapturePlan {
                distance: meters,
                count: samples,
                interval: Duration::from_millis(interval_ms),
                note,
            };

            let writer = DebouncedWriter::spawn(
                store.clone(),
                Duration::from_millis(config.storage.debounce_ms),
            );
            let before = experiment.samples.len();

            let result = match simulate {
                Some(dbm) => {
                    warn!("Simulating capture with a fixed reading of {} dBm", dbm);
                    let source = FixedSource(dbm);
                    capture_with(&source, &plan, &config, &mut experiment, &writer, unit).await
                }
                None => match CommandSource::from_config(&config.capture) {
                    Ok(source) => {
                        capture_with(&source, &plan, &config, &mut experiment, &writer, unit)
                            .await
                    }
                    Err(e) => Err(e.into()),
                },
            };

            // Readings taken before a failure are kept
            writer.flush().await?;
            let kept = experiment.samples.len() - before;

            match result {
                Ok(summary) => {
                    println!("✅ Recorded {} reading(s)", summary.recorded);
                    if summary.rejected > 0 {
                        println!(
                            "⚠️  Skipped {} reading(s) outside the valid range",
                            summary.rejected
                        );
                    }
                }
                Err(e) => {
                    if kept > 0 {
                        eprintln!("💾 Saved {} reading(s) taken before the failure", kept);
                    }
                    return Err(e);
                }
            }
        }

        Command::Remove { id } => match experiment.remove_sample(&id) {
            Some(removed) => {
                store.save(&experiment)?;
                println!(
                    "🗑️  Removed {} dBm at {}",
                    removed.signal_strength,
                    format_distance(removed.distance, unit)
                );
            }
            None => bail!("No reading with id {}", id),
        },

        Command::List => display_samples(&experiment.samples, unit),

        Command::Summary => {
            let groups = experiment.groups(&config.quality);
            display_groups(&groups, unit);
            println!(
                "\n{}",
                generate_commentary(&groups, &experiment.meta, &config.commentary)
            );
        }

        Command::Reset => {
            let removed = experiment.samples.len();
            experiment.reset();
            store.save(&experiment)?;
            println!("♻️  Removed {} readings", removed);
        }

        Command::Meta {
            title,
            name,
            location,
            band,
            ssid,
            notes,
        } => {
            let meta = &mut experiment.meta;
            if let Some(title) = title {
                meta.title = title;
            }
            if name.is_some() {
                meta.name = name;
            }
            if location.is_some() {
                meta.location = location;
            }
            if let Some(band) = band {
                meta.band = band;
            }
            if ssid.is_some() {
                meta.ssid = ssid;
            }
            if notes.is_some() {
                meta.notes = notes;
            }
            store.save(&experiment)?;
            println!("✅ Updated experiment \"{}\"", experiment.meta.title);
        }

        Command::ExportCsv { output, groups } => {
            if groups {
                csv::write_groups_csv(&experiment.groups(&config.quality), &output)?;
            } else {
                csv::write_samples_csv(&experiment.samples, &output)?;
            }
            println!("✅ CSV saved to: {}", output.display());
        }

        Command::ImportCsv { input } => {
            let imported = csv::read_samples_csv(&input)?;
            let count = import_samples(&mut experiment, imported, &config)?;
            store.save(&experiment)?;
            println!("✅ Imported {} readings from {}", count, input.display());
        }

        Command::Report { output, format } => {
            let groups = experiment.groups(&config.quality);
            let built = report::build_report(&experiment, groups, &config.commentary);

            let content = match format {
                OutputFormat::Json => report::generate_json_report(&built)?,
                OutputFormat::Markdown => report::generate_markdown_report(&built),
            };

            std::fs::write(&output, &content)
                .with_context(|| format!("Failed to write report to {}", output.display()))?;

            println!("\n📊 Report Summary:");
            println!("   Distances: {}", built.metadata.distance_count);
            println!("   Samples: {}", built.metadata.total_samples);
            println!("\n✅ Report saved to: {}", output.display());
        }

        Command::InitConfig => unreachable!("handled before logging is initialised"),
    }

    Ok(())
}

/// Record readings from any source behind a spinner.
///
/// Ctrl-C stops the run; whatever was recorded so far is left to be flushed.
async fn capture_with<S: SignalSource>(
    source: &S,
    plan: &CapturePlan,
    config: &Config,
    experiment: &mut Experiment,
    writer: &DebouncedWriter,
    unit: DistanceUnit,
) -> Result<CaptureSummary> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("📡 Capturing {} reading(s)...", plan.count));
    pb.enable_steady_tick(Duration::from_millis(100));

    let recording = record_readings(
        source,
        plan,
        &config.validation,
        experiment,
        writer,
        |sample| {
            pb.println(format!(
                "📶 {} dBm at {}",
                sample.signal_strength,
                format_distance(sample.distance, unit)
            ))
        },
    );

    let result = tokio::select! {
        result = recording => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow!("Capture interrupted")),
    };
    pb.finish_and_clear();

    result.context("Live capture failed")
}

/// Append imported samples, skipping ids already present.
fn import_samples(experiment: &mut Experiment, samples: Vec<Sample>, config: &Config) -> Result<usize> {
    let mut count = 0;

    for sample in samples {
        if experiment.samples.iter().any(|s| s.id == sample.id) {
            warn!("Skipping duplicate reading {}", sample.id);
            continue;
        }
        config
            .validation
            .check_entry(sample.distance, sample.signal_strength, sample.tx_rate)
            .with_context(|| format!("Reading {} is invalid", sample.id))?;
        experiment.add_sample(sample);
        count += 1;
    }

    Ok(count)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
