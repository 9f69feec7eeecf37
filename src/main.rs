//! Entry point for **hyprlayouts**.
//!
//! One-shot subcommands (`capture`, `restore`, `select`, `profiles`) run
//! against Hyprland directly, or are forwarded to a running daemon with
//! `--send`.  `daemon` spawns all [`CommandSource`]s on background threads
//! and processes incoming commands on the main thread, one at a time.

use clap::{Parser, Subcommand};
use hyprlayouts::command::Command;
use hyprlayouts::config::{config_dir, AutoRestore, Config};
use hyprlayouts::hyprland::events::MonitorEventSource;
use hyprlayouts::hyprland::wm::HyprlandWm;
use hyprlayouts::ipc::listener::UnixSocketListener;
use hyprlayouts::ipc::{default_socket_path, send};
use hyprlayouts::manager::{LayoutManager, Outcome};
use hyprlayouts::store::ProfileStore;
use hyprlayouts::traits::{CommandSource, WindowManager};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "hyprlayouts")]
#[command(about = "Save and restore Hyprland window layouts per display setup", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Forward the command to a running daemon instead of executing it
    #[arg(long, global = true)]
    send: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Save the current window layout
    Capture {
        /// Profile name (defaults to the active profile)
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Move windows back to a saved layout
    Restore {
        /// Profile name (defaults to the active profile)
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Make a saved profile the active one
    Select { profile: String },
    /// List profiles saved for the current displays
    Profiles,
    /// Run in the background, accepting commands on a Unix socket
    Daemon,
}

/// Load the config from `--config` or `$XDG_CONFIG_HOME/hyprlayouts/config.json`,
/// falling back to compiled-in defaults.
fn load_config(explicit: Option<&Path>) -> Config {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config_dir().join("config.json"));
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            if explicit.is_some() {
                warn!("{}, using defaults", e);
            } else {
                info!("no config file ({}), using defaults", e);
            }
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let cmd = match cli.command {
        Commands::Capture { profile } => Command::Capture { profile },
        Commands::Restore { profile } => Command::Restore { profile },
        Commands::Select { profile } => Command::SelectProfile(profile),
        Commands::Profiles => {
            list_profiles(&config);
            return;
        }
        Commands::Daemon => {
            run_daemon(config);
            return;
        }
    };

    if cli.send {
        let path = default_socket_path();
        if let Err(e) = send(&path, &cmd) {
            error!("failed to reach daemon at {}: {}", path.display(), e);
            std::process::exit(1);
        }
        return;
    }

    let store = ProfileStore::new(config.profiles_path());
    let mut manager = LayoutManager::new(HyprlandWm::new(), store, config);
    match manager.handle(cmd) {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => {
            eprintln!("hyprlayouts: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Captured(r) => {
            println!("saved {} windows as {:?}", r.windows, r.profile)
        }
        Outcome::Restored(r) => println!(
            "restored {} of {} matched windows from {:?}, {} missing (id {}, exact {}, fuzzy {}, slot {})",
            r.restored, r.matched, r.profile, r.missed, r.tiers.id, r.tiers.exact, r.tiers.fuzzy, r.tiers.slot
        ),
        Outcome::Selected { profile, .. } => println!("active profile: {}", profile),
        Outcome::Skipped => {}
    }
}

fn list_profiles(config: &Config) {
    let wm = HyprlandWm::new();
    let monitors = match wm.monitors() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("hyprlayouts: {}", e);
            std::process::exit(1);
        }
    };
    let id = hyprlayouts::display::config_id(&monitors);
    let doc = ProfileStore::new(config.profiles_path()).load();
    match doc.collection(&id) {
        Some(c) => {
            for (name, snapshot) in &c.layouts {
                let marker = if *name == c.active { "*" } else { " " };
                match snapshot {
                    Some(s) => println!("{} {} ({} windows, {})", marker, name, s.windows.len(), s.timestamp),
                    None => println!("{} {} (empty)", marker, name),
                }
            }
        }
        None => println!("no profiles for displays {}", id),
    }
}

/// Daemon mode.
fn run_daemon(config: Config) {
    let wm = HyprlandWm::new();
    match wm.monitors() {
        Ok(m) => info!("found {} monitor(s)", m.len()),
        Err(e) => {
            error!("failed to query monitors: {}", e);
            std::process::exit(1);
        }
    }

    let watch_displays = config.auto_restore == AutoRestore::OnDisplayChange;
    let store = ProfileStore::new(config.profiles_path());
    info!("profiles at {}", store.path().display());
    let mut manager = LayoutManager::new(wm, store, config);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx, watch_displays);

    info!("hyprlayouts running");
    for cmd in cmd_rx {
        match manager.handle(cmd) {
            Ok(outcome) => info!("{:?}", outcome),
            Err(e) => warn!("command failed: {}", e),
        }
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>, watch_displays: bool) {
    {
        let tx = tx.clone();
        let path = default_socket_path();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("socket listener on {} failed: {}", source.path().display(), e);
            }
        });
    }

    if watch_displays {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut source = MonitorEventSource::new();
            if let Err(e) = source.run(tx) {
                error!("display event source error: {}", e);
            }
        });
    }

    drop(tx);
}
