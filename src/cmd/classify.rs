use anyhow::Result;

use streampick::{DeviceTier, SelectionConfig};

pub fn cmd_classify(user_agent: &str, config: &SelectionConfig) -> Result<()> {
    let tier = config.classifier()?.classify(user_agent);

    println!("📱 Tier: {tier}");
    let detail = match tier {
        DeviceTier::Constrained => "no probing, static provider preference",
        DeviceTier::LightProbe => "one HEAD per candidate, lowest ping wins",
        DeviceTier::FullProbe => "resolution + throughput + latency, scored",
    };
    println!("   {detail}");

    Ok(())
}
