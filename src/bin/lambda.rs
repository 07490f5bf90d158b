//! AWS Lambda entry point for web-monitor
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//! `WEB_MONITOR_FUNCTION` selects the handler, see [`web_monitor::lambda`].

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use web_monitor::config::LambdaEnv;
use web_monitor::lambda::{self, LambdaApp};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("web-monitor Lambda starting...");

    let app = LambdaApp::init(LambdaEnv::from_env()).await?;
    let app_ref = &app;
    let result = lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        lambda::handler(app_ref, event).await
    }))
    .await;

    if let Err(e) = app.shutdown().await {
        error!("Shutdown failed: {}", e);
    }
    result
}
