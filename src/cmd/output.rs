use anyhow::Result;

use streampick::{ProbeMeasurement, ScoredCandidate, SelectionResult, PING_UNREACHABLE_MS};

pub fn print_result_json(result: &SelectionResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Measurement cache as a table, in candidate order.
pub fn print_measurements(measurements: &[ScoredCandidate]) {
    println!(
        "   {:>2}  {:<24} {:>8} {:>8} {:>11} {:>7}",
        "#", "source", "ping", "quality", "speed", "score"
    );

    for entry in measurements {
        let name = truncate_text(&entry.source.display_name, 24);
        match &entry.measurement {
            Some(m) => {
                let score = entry
                    .score
                    .map(|s| format!("{:.2}", s.composite))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "   {:>2}  {:<24} {:>8} {:>8} {:>11} {:>7}",
                    entry.index,
                    name,
                    format_ping(m),
                    m.quality.map_or("-".to_string(), |q| q.to_string()),
                    m.throughput.map_or("-".to_string(), |t| t.to_string()),
                    score
                );
            }
            None => println!(
                "   {:>2}  {:<24} {:>8}",
                entry.index, name, "measurement failed"
            ),
        }
    }
}

/// Single probe result for `streampick probe`.
pub fn print_measurement(url: &str, measurement: Option<&ProbeMeasurement>) {
    println!("📡 {url}");
    let Some(m) = measurement else {
        println!("   ❌ Measurement failed");
        return;
    };

    println!("   Ping: {}", format_ping(m));
    if let Some(quality) = m.quality {
        println!("   Quality: {quality}");
    }
    if let Some(throughput) = m.throughput {
        println!("   Speed: {throughput}");
    }
}

fn format_ping(m: &ProbeMeasurement) -> String {
    if !m.reachable || m.ping_ms == PING_UNREACHABLE_MS {
        "timeout".to_string()
    } else {
        format!("{}ms", m.ping_ms)
    }
}

pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
