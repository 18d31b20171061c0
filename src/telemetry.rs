use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging. JSON output so workflow transitions and
/// collaborator calls carry their fields through whatever collects the logs.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Assignflow telemetry initialized with structured logging");
    Ok(())
}

/// Generate a correlation ID for linking the calls of one assignment run.
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one workflow operation.
pub fn create_workflow_span(operation: &str, correlation_id: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "material_assignment",
        operation = operation,
        correlation.id = correlation_id,
    )
}
