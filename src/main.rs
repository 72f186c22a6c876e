//! snipdesk: screenshot capture and annotation tool
//!
//! Without arguments the resident service starts (or, if one is already
//! running, it is asked to open the editor). `--snip` captures once.

use anyhow::{Context, Result};
use clap::Parser;
use snipdesk::{
    app::{Controller, HeadlessFrontend},
    capture::create_default_backend,
    cli::Args,
    config::AppConfig,
    ipc::{self, Command, IpcServer},
    logging,
    model::CaptureMode,
    service::CaptureService,
};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let log_path =
        logging::setup_logging(&config, args.log_console).context("Failed to set up logging")?;
    info!("snipdesk {} starting (log: {})", env!("CARGO_PKG_VERSION"), log_path.display());

    let socket = ipc::socket_path();

    if args.snip {
        if args.output.is_none() && ipc::send_command(&socket, Command::Snip).await {
            info!("Capture request handed to the running instance");
            return Ok(());
        }

        let mode = CaptureMode::from(args.mode);
        let delay = args.delay_or(config.default_delay);
        info!("Standalone capture: mode={}, delay={}s", mode, delay);

        let mut controller = build_controller(config, HeadlessFrontend::new(args.output))?;
        controller.snip(mode, delay).await?;
        for path in controller.frontend().saved() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    if ipc::send_command(&socket, Command::Editor).await {
        println!("snipdesk is already running; opening the editor.");
        return Ok(());
    }

    let server = IpcServer::bind(&socket).context("Failed to start the command socket")?;
    let (tx, rx) = mpsc::channel(16);
    let listener = server.spawn(tx);

    let mut controller = build_controller(config, HeadlessFrontend::new(None))?;
    info!("Resident service started");
    controller.run(rx).await;

    listener.abort();
    info!("snipdesk shutting down");
    Ok(())
}

fn build_controller(
    config: AppConfig,
    frontend: HeadlessFrontend,
) -> Result<Controller<HeadlessFrontend>> {
    let backend = create_default_backend(config.capture_backend)
        .context("Failed to initialize the capture backend")?;
    info!("Capture backend initialized: {}", backend.name());
    Ok(Controller::new(config, CaptureService::new(backend), frontend))
}
