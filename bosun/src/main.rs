mod cli;
mod launch;
mod logging;

use anyhow::Result;
use bosun_core::{
    AppState, ConfigStore, Outcome, Registry, Snapshot,
    config::TomlConfigStore,
    outcome::CreateParams,
    prereq::{CliPrereqChecker, PrereqChecker},
    registry::DockerRegistry,
    state::wizard_entry,
};
use bosun_tui::Theme;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode, sync::Arc};

#[derive(Parser)]
#[command(version, about = "Terminal dashboard for ephemeral containerized work sessions")]
struct Cli {
    /// Override path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for the rotating log file
    #[arg(long, default_value = logging::DEFAULT_LOG_LEVEL)]
    log_level: log::LevelFilter,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List managed sessions
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create a session and connect to it
    New {
        name: String,
        #[arg(long)]
        branch: Option<String>,
        /// Don't attach after creation
        #[arg(long)]
        no_connect: bool,
    },
    /// Attach to a session, starting it if stopped
    Connect { name: String },
    /// Run the interactive authentication container
    Auth,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_errors = matches!(cli.command, Some(Commands::List { json: true }));

    if let Err(error) = logging::setup_logging(cli.log_level) {
        eprintln!("warning: failed to initialise logging: {error}");
    }

    let store = match TomlConfigStore::new(cli.config.as_deref()) {
        Ok(store) => store,
        Err(error) => {
            let cli_error = cli::CliError::system(format!("{error:#}"));
            cli::print_error(&cli_error, json_errors);
            return ExitCode::from(2);
        }
    };
    let registry: Arc<dyn Registry> = Arc::new(DockerRegistry);

    let result = match cli.command {
        Some(Commands::List { json }) => {
            let prefix = store.load().session.prefix;
            cli::cmd_list(registry.as_ref(), &prefix, json)
        }
        Some(Commands::New {
            name,
            branch,
            no_connect,
        }) => {
            let params = CreateParams {
                name,
                branch,
                no_connect,
            };
            launch::create_session(&params, &store.load()).map_err(cli::CliError::from)
        }
        Some(Commands::Connect { name }) => launch::connect(&name).map_err(cli::CliError::from),
        Some(Commands::Auth) => launch::run_auth(&store.load()).map_err(cli::CliError::from),
        None => run_tui(store, &registry).map_err(cli::CliError::from),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(error) => {
            cli::print_error(&error, json_errors);
            let code: u8 = match error.code() {
                1 => 1,
                _ => 2,
            };
            ExitCode::from(code)
        }
    }
}

/// Outer dashboard loop. Each external handoff (attach, create, auth)
/// tears down the terminal, runs docker in the foreground, and re-enters
/// the TUI with the previous session snapshot for an instant first draw.
fn run_tui(store: TomlConfigStore, registry: &Arc<dyn Registry>) -> Result<()> {
    let store: Arc<dyn ConfigStore> = Arc::new(store);
    let prereqs: Arc<dyn PrereqChecker> = Arc::new(CliPrereqChecker);
    let mut snapshot: Option<Snapshot> = None;

    loop {
        let settings = store.load();
        let theme = Theme::from_config(&settings.theme);
        let wizard = wizard_entry(store.as_ref(), &settings);
        let mut state = AppState::new(settings, wizard, snapshot.take());

        let mut terminal = if should_disable_alt_screen() {
            // Inline viewport keeps drawing in the primary screen buffer,
            // which makes tmux capture-pane output usable for automation.
            ratatui::init_with_options(ratatui::TerminalOptions {
                viewport: ratatui::Viewport::Inline(30),
            })
        } else {
            ratatui::init()
        };
        let result = bosun_tui::run(&mut terminal, &mut state, registry, &store, &prereqs, &theme);
        ratatui::restore();
        let (outcome, snap) = result?;

        match outcome {
            Outcome::Quit => return Ok(()),
            Outcome::Connect { name } => {
                launch::connect(&name)?;
                snapshot = Some(snap);
            }
            Outcome::Create(params) => {
                launch::create_session(&params, &store.load())?;
                snapshot = Some(snap);
            }
            Outcome::RunAuth => {
                launch::run_auth(&store.load())?;
                // The wizard resumes at the auth step on re-entry.
                snapshot = None;
            }
        }
    }
}

fn should_disable_alt_screen() -> bool {
    match std::env::var("BOSUN_NO_ALT_SCREEN") {
        Ok(value) => {
            let value = value.trim().to_ascii_lowercase();
            !matches!(value.as_str(), "" | "0" | "false" | "no" | "off")
        }
        Err(_) => false,
    }
}
