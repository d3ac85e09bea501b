//! Print the sends of the last week and their open events.
//!
//! Credentials come from the usual configuration sources (see
//! `mcreport_infra::config`):
//!
//! ```bash
//! MCREPORT_ENDPOINT=https://webservice.s7.exacttarget.com/Service.asmx \
//! MCREPORT_USERNAME=api-user MCREPORT_PASSWORD=secret \
//! cargo run -p mcreport-infra --example send_report
//! ```
//!
//! Set `MCREPORT_LOG_FORMAT=json` for JSON log lines.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use mcreport_core::ReportingService;
use mcreport_domain::EventType;
use mcreport_infra::{config, init_tracing, LogFormat, SoapTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = std::env::var("MCREPORT_LOG_FORMAT")
        .ok()
        .map(|raw| raw.parse::<LogFormat>())
        .transpose()?
        .unwrap_or_default();
    init_tracing(format)?;

    let config = config::load().context("loading configuration")?;
    let transport = Arc::new(SoapTransport::from_config(&config)?);
    let reporting = ReportingService::new(transport, config.marketing_cloud.client_id());

    let status = reporting.check_system_status().await?;
    tracing::info!(system_status = ?status.system_status, "connected");

    let end = Utc::now();
    let start = end - Duration::days(7);
    let sends = reporting.get_sends(start, end, config.reporting.lookback_days).await?;

    for send in &sends {
        let mut total = 0usize;
        let mut token = None;
        loop {
            let page = reporting
                .load_tracking_events(
                    start,
                    end,
                    &send.id,
                    EventType::Open,
                    config.reporting.batch_size,
                    token.as_ref(),
                )
                .await?;
            total += page.len();
            match page.continuation {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::info!(
            send_id = %send.id,
            email = send.email_name.as_deref().unwrap_or("-"),
            opens = total,
            "send summary"
        );
    }

    Ok(())
}
