use std::sync::Arc;

use anyhow::Context;
use jobtrack_client::views::{ApplicationListView, DashboardView};
use jobtrack_client::{ApplicationsApi, ClientConfig, HttpApi, NotificationChannel};
use jobtrack_core::analytics::DEFAULT_TIMELINE_DAYS;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Print the first page of applications and the dashboard summary.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobtrack_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().context("Invalid configuration")?;
    tracing::info!(api_url = %config.api_url, "Connecting to applications service");

    let api: Arc<dyn ApplicationsApi> = Arc::new(
        HttpApi::new(config.api_url.clone(), config.request_timeout)
            .context("Failed to build HTTP client")?,
    );
    let notifications = NotificationChannel::new(config.notify_duration);

    let list = ApplicationListView::new(Arc::clone(&api), notifications.clone(), config.page_size)?;
    list.refresh().await.context("Failed to load applications")?;

    let query = list.query();
    println!("Applications (page {}, size {})", query.page(), query.size());
    for app in list.rows().await {
        println!(
            "  #{:<5} {:<15} {:<30} {}",
            app.id,
            app.current_status,
            app.company_name,
            app.position_title
        );
    }

    let dashboard = DashboardView::new(Arc::clone(&api), DEFAULT_TIMELINE_DAYS)?;
    dashboard.load().await.context("Failed to load analytics")?;
    if let Some(summary) = dashboard.state().summary {
        println!(
            "Total {} | interview rate {:.1}% | applied last 7 days {}",
            summary.total_applications,
            summary.interview_rate_percent(),
            summary.applied_last_7_days
        );
    }

    Ok(())
}
