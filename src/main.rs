use anyhow::Context;
use clap::Parser;
use room_booking_demo::utils::logger;
use room_booking_demo::{CliConfig, DemoRunner, HttpBookingClient, Transcript};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.log_format);

    tracing::info!("Starting room-booking-demo");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let client = HttpBookingClient::new(&config.api.base_url, config.timeout())
        .context("failed to build HTTP client")?;
    tracing::info!("🔗 Booking service: {}", client.base_url());

    let runner = DemoRunner::new(
        Arc::new(client),
        Transcript::stdout(),
        config.runner_settings(),
    );

    // Step failures are part of the transcript; the demo itself always succeeds.
    let context = runner.run_steps(&config.demo.steps).await;
    tracing::debug!("Final demo context: {:?}", context);

    Ok(())
}
