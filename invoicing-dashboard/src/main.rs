use dotenvy::dotenv;
use invoicing_dashboard::config::get_configuration;
use invoicing_dashboard::services::init_metrics;
use invoicing_dashboard::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let settings = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("invoicing-dashboard", &settings.logging)?;
    init_metrics();

    let application = Application::build(settings)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?;
    application.run_until_stopped().await?;

    Ok(())
}
