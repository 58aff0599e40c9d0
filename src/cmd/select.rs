use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use streampick::{CandidateSource, SelectionConfig, SourceSelector};

use super::output::{print_measurements, print_result_json};

/// TOML candidates file: a list of `[[candidates]]` tables.
#[derive(Debug, Deserialize)]
struct CandidatesFile {
    #[serde(default)]
    candidates: Vec<CandidateSource>,
}

pub async fn cmd_select(
    file: &Path,
    user_agent: &str,
    json: bool,
    config: SelectionConfig,
) -> Result<()> {
    let candidates = load_candidates(file)?;
    let selector = SourceSelector::new(config)?;

    if !json {
        eprintln!(
            "🔎 {} candidates, tier: {}",
            candidates.len(),
            selector.classify(user_agent)
        );
    }

    let result = selector.select_best_source(&candidates, user_agent).await?;

    if json {
        return print_result_json(&result);
    }

    println!(
        "🎬 Chosen: {} ({})",
        result.chosen.display_name, result.chosen.source_id
    );
    if result.fallback {
        println!("   ⚠️  Fallback: no candidate could be measured, using the first one");
    }
    if !result.measurements.is_empty() {
        println!();
        print_measurements(&result.measurements);
    }

    Ok(())
}

/// Read candidates from a `.json` array or a TOML `[[candidates]]` file.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateSource>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_candidates(&content, path.extension().and_then(|e| e.to_str()))
        .with_context(|| format!("invalid candidates in {}", path.display()))
}

fn parse_candidates(content: &str, extension: Option<&str>) -> Result<Vec<CandidateSource>> {
    if extension.is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        return Ok(serde_json::from_str(content)?);
    }
    let file: CandidatesFile = toml::from_str(content)?;
    Ok(file.candidates)
}
