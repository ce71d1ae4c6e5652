use clap::Parser;
use color_eyre::Result;
use todo_tui::cli::{Cli, Commands};
use todo_tui::logging::{LogTarget, init_logging};
use todo_tui::{Config, Profile, SqliteKeyValue, TaskStore};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps a separate config and database
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config {
        Some(ref path) => Config::load_from_path(path, profile)?,
        None => Config::load_with_profile(profile)?,
    };

    let command = cli.command.unwrap_or(Commands::Tui);
    let interactive = command == Commands::Tui;
    init_logging(&config, LogTarget::for_mode(&config, interactive))?;

    let kv = SqliteKeyValue::new(&config.get_database_path())?;
    let mut store = TaskStore::load(kv);

    if interactive {
        let app = todo_tui::tui::App::new(config, store);
        todo_tui::tui::run_event_loop(app)?;
    } else {
        todo_tui::cli::dispatch(command, &mut store, &config, todo_tui::utils::today())?;
    }

    Ok(())
}
