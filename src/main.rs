use parrot::{
    AppResult,
    cli::{Cli, LaunchMode},
    config::Config,
    init_logging,
    session::SessionManager,
    ui::{UIManager, cli as console},
};

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse_args();

    match cli.launch_mode() {
        LaunchMode::Manual => return console::print_manual(),
        LaunchMode::Unknown(command) => return console::print_unknown_command(&command),
        LaunchMode::Interactive => {}
    }

    // Load configuration
    let config = Config::load_or_default(&cli.config_file);

    // Initialize logging; the guard flushes the file writer on drop
    let _log_guard = init_logging(
        &cli.effective_log_level(&config.log_level),
        &config.log.file_path,
    )?;

    tracing::info!("Parrot Terminal starting...");
    tracing::debug!("CLI arguments: {:?}", cli);

    let manager = SessionManager::new(&config)?;
    let mut ui = UIManager::new(manager, &config);
    ui.run().await?;

    tracing::info!("Parrot Terminal exited");
    Ok(())
}
