use std::sync::Arc;

use anyhow::Result;

use streampick::probe::{FullProbeStrategy, LightProbeStrategy};
use streampick::{CandidateSource, ProbeClient, SelectionConfig};

use super::output::print_measurement;

pub async fn cmd_probe(url: &str, light: bool, config: &SelectionConfig) -> Result<()> {
    let transport = Arc::new(ProbeClient::with_config(config)?);
    let candidate = CandidateSource::new(url, url, vec![url.to_string()]);

    let measurement = if light {
        let strategy = LightProbeStrategy::new(transport, config.light_timeout());
        Some(strategy.probe(&candidate).await)
    } else {
        FullProbeStrategy::new(transport, config)
            .probe(&candidate)
            .await
    };

    print_measurement(url, measurement.as_ref());
    Ok(())
}
