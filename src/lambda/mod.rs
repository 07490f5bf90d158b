// src/lambda/mod.rs

//! AWS Lambda handlers for the monitor.
//!
//! One binary serves four functions, selected by `WEB_MONITOR_FUNCTION`:
//! 1. `task_scheduler`: publish one check event per configured target
//! 2. `detect_website_changes`: check one website from an SNS event
//! 3. `detect_rss_entry`: check one feed from an SNS event
//! 4. `handle_events`: render detector results into status messages

use std::str::FromStr;
use std::sync::Arc;

use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

use crate::config::{LambdaConfigLoader, LambdaEnv};
use crate::context::MonitorContext;
use crate::error::{AppError, Result};
use crate::models::{Config, FeedCheckEvent, FetcherConfig, MonitorResult, WebsiteTarget};
use crate::pipeline::{ScheduleTopics, handle_result, schedule_checks};
use crate::services::{Notifier, SnsNotifier};
use crate::storage::s3::S3Storage;

/// Function served by this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LambdaFunction {
    TaskScheduler,
    DetectWebsiteChanges,
    DetectRssEntry,
    HandleEvents,
}

impl LambdaFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskScheduler => "task_scheduler",
            Self::DetectWebsiteChanges => "detect_website_changes",
            Self::DetectRssEntry => "detect_rss_entry",
            Self::HandleEvents => "handle_events",
        }
    }

    /// Whether the function checks targets and needs a fetcher and store.
    pub fn is_detector(&self) -> bool {
        matches!(self, Self::DetectWebsiteChanges | Self::DetectRssEntry)
    }
}

impl FromStr for LambdaFunction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "task_scheduler" => Ok(Self::TaskScheduler),
            "detect_website_changes" => Ok(Self::DetectWebsiteChanges),
            "detect_rss_entry" => Ok(Self::DetectRssEntry),
            "handle_events" => Ok(Self::HandleEvents),
            other => Err(AppError::config(format!("Unknown function: {other}"))),
        }
    }
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct HandlerResponse {
    /// Whether the invocation was successful
    pub success: bool,

    /// Function-specific outcome
    #[serde(skip_serializing_if = "Value::is_null")]
    pub detail: Value,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// State kept across invocations of a warm Lambda container.
pub struct LambdaApp {
    function: LambdaFunction,
    env: LambdaEnv,
    notifier: Arc<SnsNotifier>,
    ctx: Option<MonitorContext>,
}

impl LambdaApp {
    /// Build the state for the function named in the environment.
    ///
    /// Detector functions get a fetcher and an S3 fingerprint store here,
    /// once per container.
    pub async fn init(env: LambdaEnv) -> Result<Self> {
        let function: LambdaFunction = env
            .function
            .as_deref()
            .ok_or_else(|| AppError::config("WEB_MONITOR_FUNCTION is not set"))?
            .parse()?;
        let notifier = Arc::new(SnsNotifier::from_env().await);

        let ctx = if function.is_detector() {
            let fetcher = env.fetcher_config()?;
            let store = Arc::new(S3Storage::from_env().await?);
            Some(build_context(&fetcher, store, notifier.clone()).await?)
        } else {
            None
        };

        info!(function = function.as_str(), "Lambda initialized");
        Ok(Self {
            function,
            env,
            notifier,
            ctx,
        })
    }

    pub fn function(&self) -> LambdaFunction {
        self.function
    }

    async fn dispatch(&self, payload: Value) -> Result<Value> {
        match self.function {
            LambdaFunction::TaskScheduler => {
                let config = self.load_config().await?;
                let topics = self.env.schedule_topics()?;
                Ok(run_scheduler(&config, self.notifier.as_ref(), &topics).await)
            }
            LambdaFunction::DetectWebsiteChanges => {
                run_website_check(self.context()?, payload, self.env.next_topic()?).await
            }
            LambdaFunction::DetectRssEntry => {
                run_feed_check(self.context()?, payload, self.env.next_topic()?).await
            }
            LambdaFunction::HandleEvents => {
                let config = self.load_config().await?;
                run_handle_events(
                    &config,
                    self.notifier.as_ref(),
                    payload,
                    self.env.status_topic()?,
                )
                .await
            }
        }
    }

    fn context(&self) -> Result<&MonitorContext> {
        self.ctx
            .as_ref()
            .ok_or_else(|| AppError::config("Monitor context is not initialized"))
    }

    async fn load_config(&self) -> Result<Config> {
        LambdaConfigLoader::from_env(&self.env)
            .await?
            .load_config()
            .await
    }

    /// Release the fetcher, if any.
    pub async fn shutdown(self) -> Result<()> {
        match self.ctx {
            Some(ctx) => ctx.shutdown().await,
            None => Ok(()),
        }
    }
}

#[cfg(feature = "browser")]
async fn build_context(
    fetcher: &FetcherConfig,
    store: Arc<S3Storage>,
    notifier: Arc<SnsNotifier>,
) -> Result<MonitorContext> {
    MonitorContext::browser(fetcher, store, notifier).await
}

#[cfg(not(feature = "browser"))]
async fn build_context(
    fetcher: &FetcherConfig,
    store: Arc<S3Storage>,
    notifier: Arc<SnsNotifier>,
) -> Result<MonitorContext> {
    MonitorContext::http(fetcher, store, notifier)
}

/// Main Lambda handler function.
#[instrument(skip(app, event), fields(function = app.function().as_str()))]
pub async fn handler(
    app: &LambdaApp,
    event: LambdaEvent<Value>,
) -> std::result::Result<HandlerResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (payload, _context) = event.into_parts();

    let outcome = app.dispatch(payload).await;
    respond(app.function(), outcome, start.elapsed().as_millis() as u64)
}

/// Turn a dispatch outcome into the invocation result.
///
/// Detector failures are returned as errors so the runtime records a failed
/// invocation and SNS can retry it. Other functions report failures in the
/// response body.
fn respond(
    function: LambdaFunction,
    outcome: Result<Value>,
    execution_time_ms: u64,
) -> std::result::Result<HandlerResponse, LambdaError> {
    match outcome {
        Ok(detail) => {
            info!(%detail, execution_time_ms, "Invocation completed");
            Ok(HandlerResponse {
                success: true,
                detail,
                error: None,
                execution_time_ms,
            })
        }
        Err(e) => {
            error!(kind = ?e.kind(), "Invocation failed: {}", e);
            if function.is_detector() {
                return Err(e.into());
            }
            Ok(HandlerResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms,
                ..Default::default()
            })
        }
    }
}

/// Message body of the first record of an SNS event.
pub fn first_sns_message(payload: Value) -> Result<String> {
    let event: SnsEvent = serde_json::from_value(payload)?;
    let record = event
        .records
        .into_iter()
        .next()
        .ok_or_else(|| AppError::validation("SNS event has no records"))?;

    info!(message_id = %record.sns.message_id, "Received SNS message");
    Ok(record.sns.message)
}

/// Publish check events for every configured target.
pub async fn run_scheduler(config: &Config, notifier: &dyn Notifier, topics: &ScheduleTopics) -> Value {
    let published = schedule_checks(config, notifier, topics).await;
    json!({
        "published": published,
        "site_targets": config.site_targets.len(),
        "rss_targets": config.rss_targets.len(),
    })
}

/// Check the website named in an SNS event.
pub async fn run_website_check(ctx: &MonitorContext, payload: Value, topic: &str) -> Result<Value> {
    let target = WebsiteTarget::from_message(&first_sns_message(payload)?)?;
    let result = ctx.check_website(&target, topic).await?;
    Ok(json!({
        "url": result.url,
        "has_changed": result.has_changed,
        "notified": result.should_notify(),
    }))
}

/// Check the feed named in an SNS event.
pub async fn run_feed_check(ctx: &MonitorContext, payload: Value, topic: &str) -> Result<Value> {
    let event = FeedCheckEvent::from_message(&first_sns_message(payload)?)?;
    let report = ctx.check_feed(&event, topic).await?;
    Ok(json!({
        "feed_url": report.feed_url,
        "new_entries": report.new_entries,
        "matches": report.matches.len(),
        "failures": report.failures.len(),
    }))
}

/// Render a detector result from an SNS event into a status message.
///
/// Messages of an unknown type are logged and ignored.
pub async fn run_handle_events(
    config: &Config,
    notifier: &dyn Notifier,
    payload: Value,
    topic: &str,
) -> Result<Value> {
    let message = first_sns_message(payload)?;
    let result: MonitorResult = match serde_json::from_str(&message) {
        Ok(result) => result,
        Err(e) => {
            warn!("Ignoring unrecognized message: {}", e);
            return Ok(json!({ "status": Value::Null }));
        }
    };

    let status = handle_result(&result, &config.message_format, notifier, topic).await;
    Ok(json!({ "status": status.map(|s| s.status) }))
}
