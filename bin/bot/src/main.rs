use program_advisor_bot::app::App;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = match App::load() {
        Ok(app) => app,
        Err(report) => {
            tracing::error!(error = %report, "failed to start");
            return ExitCode::FAILURE;
        }
    };

    app.run().await;
    ExitCode::SUCCESS
}
