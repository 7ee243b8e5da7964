//! AWS Lambda entry point for content generation
//!
//! Event: `{"topic": "..."}`
//! Response: `{"statusCode": 200|207|400|500, "body": "<json>"}`
//!
//! Configuration comes from the same `CONTENT_GEN_*` environment variables as
//! the CLI. Set `CONTENT_GEN_PROVISION_TABLE=false` when the table is created
//! at deploy time.

use anyhow::Context;
use content_gen::{ContentGenerator, ContentHandler, GenerateEvent, HandlerResponse, SETTINGS};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// JSON lines without timestamps; the platform stamps each log line itself
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(false)
        .without_time()
        .init();
}

async fn handle_event(
    handler: &ContentHandler,
    event: LambdaEvent<GenerateEvent>,
) -> Result<HandlerResponse, Error> {
    let (payload, context) = event.into_parts();
    info!(request_id = %context.request_id, "Handling generation request");

    Ok(handler.handle(payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    // Built once per execution environment and reused across warm invocations.
    let generator = ContentGenerator::connect(&SETTINGS)
        .await
        .context("Failed to initialise content generator")?;
    let handler = ContentHandler::new(generator);
    let handler = &handler;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<GenerateEvent>| async move {
        handle_event(handler, event).await
    }))
    .await
}
