//! Kiln CLI - incremental stylesheet bundler
//!
//! Usage: kiln <COMMAND>
//!
//! Commands:
//!   build   Compile the stylesheet bundle once
//!   watch   Keep rebuilding as dependencies change

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use kiln::{
    BuildEvent, BuildPlugin, BuildSettings, EventSink, NotifyWatcher, NullWatcher, SassPlugin,
    SettingsWarning,
};

/// Kiln - incremental stylesheet bundler
#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit events as NDJSON for CI
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v logs dependency churn)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile the stylesheet bundle once
    Build {
        /// Path to the settings file
        #[arg(short, long, default_value = "kiln.toml")]
        settings: PathBuf,

        /// Compress the output
        #[arg(long)]
        release: bool,
    },

    /// Keep rebuilding as watched dependencies change
    Watch {
        /// Path to the settings file
        #[arg(short, long, default_value = "kiln.toml")]
        settings: PathBuf,

        /// Compress the output
        #[arg(long)]
        release: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { settings, release } => {
            cmd_build(&settings, release, cli.json, cli.verbose)
        }
        Commands::Watch { settings, release } => {
            cmd_watch(&settings, release, cli.json, cli.verbose)
        }
    }
}

fn cmd_build(settings_path: &Path, release: bool, json: bool, verbose: u8) -> Result<()> {
    let (settings, warnings) = BuildSettings::load_with_warnings(settings_path)?;
    print_settings_warnings(&warnings);
    let release = release || settings.release;
    let settings = settings.with_release(release);

    if !json {
        println!("🧱 Kiln Build");
        println!("Settings: {}", settings_path.display());
        if release {
            println!("Mode: Release (compressed output)");
        }
    }

    let events = event_sink(json, verbose, false);
    let handle = SassPlugin::new().activate(Arc::new(NullWatcher), &settings, events)?;

    if !handle.is_active() && !json {
        println!("No Sass sources configured; nothing to build.");
    }

    handle.shutdown();
    Ok(())
}

fn cmd_watch(settings_path: &Path, release: bool, json: bool, verbose: u8) -> Result<()> {
    let (settings, warnings) = BuildSettings::load_with_warnings(settings_path)?;
    print_settings_warnings(&warnings);
    let release = release || settings.release;
    let settings = settings.with_release(release);

    if !json {
        println!("👀 Kiln Watch");
        println!("Settings: {}", settings_path.display());
        println!("Output: {}", settings.output_path().display());
        println!("Press Ctrl+C to stop\n");
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let watcher = Arc::new(NotifyWatcher::spawn()?);
    let events = event_sink(json, verbose, true);
    let handle = SassPlugin::new().activate(watcher.clone(), &settings, events)?;

    if !handle.is_active() {
        if !json {
            println!("No Sass sources configured; nothing to watch.");
        }
        return Ok(());
    }

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    handle.shutdown();
    Ok(())
}

fn event_sink(json: bool, verbose: u8, watch_mode: bool) -> Arc<dyn EventSink> {
    if json {
        Arc::new(JsonSink)
    } else {
        Arc::new(ConsoleSink {
            verbose,
            watch_mode,
        })
    }
}

fn print_settings_warnings(warnings: &[SettingsWarning]) {
    for w in warnings {
        if let Some(line) = w.line {
            eprintln!(
                "⚠ Unknown settings key '{}' in {}:{}",
                w.key,
                w.file.display(),
                line
            );
        } else {
            eprintln!("⚠ Unknown settings key '{}' in {}", w.key, w.file.display());
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?\n", suggestion);
        }
    }
}

/// Human-readable event lines; timestamped in watch mode.
struct ConsoleSink {
    verbose: u8,
    watch_mode: bool,
}

impl ConsoleSink {
    fn stamp(&self) -> String {
        if self.watch_mode {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

impl EventSink for ConsoleSink {
    fn on_event(&self, event: BuildEvent) {
        match event {
            BuildEvent::BuildStarted => {
                println!("{}🔄 Building...", self.stamp());
            }
            BuildEvent::DependencyAdded { path } => {
                println!("{}  + watching {}", self.stamp(), path);
            }
            BuildEvent::DependencyDropped { path } => {
                println!("{}  - dropped {}", self.stamp(), path);
            }
            BuildEvent::BuildFinished {
                output,
                dependencies,
                duration_ms,
            } => {
                println!(
                    "{}✓ {} ({} dependencies, {}ms)",
                    self.stamp(),
                    output,
                    dependencies,
                    duration_ms
                );
            }
            BuildEvent::BuildFailed { message } => {
                eprintln!("{}✗ {}", self.stamp(), message);
            }
            BuildEvent::WatchStopped => {
                if self.watch_mode {
                    println!("\n👋 Stopped watching");
                }
            }
        }
        let _ = std::io::stdout().flush();
    }

    fn wants_dependency_events(&self) -> bool {
        self.verbose > 0
    }
}

/// One JSON object per line, flushed immediately so CI consumers see
/// events as they happen.
struct JsonSink;

impl EventSink for JsonSink {
    fn on_event(&self, event: BuildEvent) {
        println!("{}", event.to_json());
        let _ = std::io::stdout().flush();
    }
}
