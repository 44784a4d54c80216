//! Entry point for the **nictl** command-line tool.
//!
//! Parses the subcommand, resolves the niri socket and runs one operation.
//! Any failure is printed to stderr and turns into exit status 1.

use clap::{Parser, Subcommand};
use log::debug;
use nictl::command::Direction;
use nictl::config::Config;
use nictl::fitter::LayoutFitter;
use nictl::launcher::spawn_or_focus;
use nictl::navigator::WorkspaceNavigator;
use nictl::niri::client::NiriIpc;
use nictl::NiriError;

#[derive(Parser)]
#[command(name = "nictl")]
#[command(about = "Send commands to niri over its socket")]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Focus a running application, or spawn it. If it already has focus,
    /// focus the previous window instead.
    SpawnOrFocus {
        /// The app id to look for.
        app_id: String,
        /// The command to run if no window is found for the app id.
        cmd: String,
    },
    /// Cycle the workspaces of the focused output up or down, wrapping at the
    /// first and last workspace.
    CycleWorkspace {
        /// The direction to move (up/down).
        direction: Direction,
        /// When the current and next workspaces are both empty, jump to the
        /// nearest workspace with windows.
        #[arg(long)]
        skip_next_empty: bool,
    },
    /// Give every column on the active workspace the same width.
    FitAllWindows {
        /// Gap in pixels before, between and after columns.
        gaps: u32,
    },
}

/// Read the fitter settings from the config file, if there is one.
fn load_config() -> Result<Config, NiriError> {
    let Some(path) = Config::default_path() else {
        debug!("neither $XDG_CONFIG_HOME nor $HOME is set, using default settings");
        return Ok(Config::default());
    };
    let config = Config::load_or_default(&path)?;
    debug!(
        "fit confirm timeout {} ms (config: {})",
        config.fit.confirm_timeout_ms,
        path.display()
    );
    Ok(config)
}

fn run(args: Args) -> Result<(), NiriError> {
    let niri = NiriIpc::from_env()?;
    match args.command {
        Cmd::SpawnOrFocus { app_id, cmd } => {
            spawn_or_focus(&niri, &app_id, &cmd)?;
        }
        Cmd::CycleWorkspace {
            direction,
            skip_next_empty,
        } => {
            WorkspaceNavigator::new(niri).cycle(direction, skip_next_empty)?;
        }
        Cmd::FitAllWindows { gaps } => {
            let config = load_config()?;
            LayoutFitter::new(niri, config.fit.confirm_timeout()).fit_all(gaps)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("nictl: {}", e);
        std::process::exit(1);
    }
}
