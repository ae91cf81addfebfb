mod pipeline;
mod settings;

pub use pipeline::{Pipeline, RunSummary, DEFAULT_SCREENSHOTS};
pub use settings::Settings;

use anyhow::Result;
use rock_vision::Tesseract;
use tracing::{debug, info, warn};

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scan_reader=debug,scan_reader_lib=debug,rock_capture=debug,rock_vision=debug"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();
    debug!("logger initialized");

    let settings = Settings::from_env();
    let engine = Tesseract::new(settings.tesseract);
    if !engine.is_available() {
        warn!(
            command = %engine.config().command.display(),
            "Tesseract not found. Every scan will fail until it is installed"
        );
    }

    let pipeline = Pipeline::new(engine);
    let summary = pipeline.run(&DEFAULT_SCREENSHOTS, &mut std::io::stdout().lock())?;
    info!(
        scanned = summary.scanned,
        failed = summary.failed,
        "scan run finished"
    );

    Ok(())
}
