use anyhow::{Context, Result};
use glob::glob;
use log::warn;
use rayon::prelude::*;
use roi_calculator::{recompute, Scenario, ScenarioRow};
use std::path::{Path, PathBuf};

pub struct ScenarioBatch {
    pub rows: Vec<ScenarioRow>,
    pub failures: Vec<(PathBuf, String)>,
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let contents = std::fs::read_to_string(path)?;
    let mut scenario: Scenario = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid scenario JSON in {:?}", path))?;

    // Unnamed scenarios are labelled by their file
    if scenario.name == Scenario::default().name {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            scenario.name = stem.to_string();
        }
    }
    Ok(scenario)
}

pub fn evaluate_directory(input_dir: &Path) -> Result<ScenarioBatch> {
    let pattern = input_dir.join("*.json");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("Non UTF-8 path {:?}", input_dir))?;

    let mut files: Vec<PathBuf> = glob(pattern)?.filter_map(|entry| entry.ok()).collect();
    files.sort();

    let loaded: Vec<(PathBuf, Result<Scenario>)> = files
        .into_par_iter()
        .map(|file| {
            let scenario = load_scenario(&file);
            (file, scenario)
        })
        .collect();

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for (file, scenario) in loaded {
        match scenario {
            Ok(scenario) => {
                let results = recompute(&scenario.traffic, &scenario.costs, &scenario.monetization);
                rows.push(ScenarioRow::new(&scenario, &results));
            }
            Err(e) => {
                warn!("Skipping {:?}: {:#}", file, e);
                failures.push((file, format!("{:#}", e)));
            }
        }
    }

    Ok(ScenarioBatch { rows, failures })
}

pub fn process_scenarios(input_dir: &Path, output_dir: &Path) -> Result<()> {
    println!("\n📂 Evaluating scenario files in {:?}", input_dir);
    println!("{}", "=".repeat(60));

    let batch = evaluate_directory(input_dir)?;
    if batch.rows.is_empty() && batch.failures.is_empty() {
        anyhow::bail!("No scenario files found in {:?}", input_dir);
    }

    for (file, error) in &batch.failures {
        println!("  ❌ Skipped {:?}: {}", file, error);
    }

    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("scenario_results.csv");
    let mut writer = csv::Writer::from_path(&output_path)?;
    for row in &batch.rows {
        writer.serialize(row)?;
        let marker = if row.net_profit > 0.0 { "✅" } else { "⚠️ " };
        println!(
            "  {} {:<24} {} revenue ${:.2}, cost ${:.2}, profit ${:.2}",
            marker, row.scenario, row.ad_type, row.total_revenue, row.inference_cost, row.net_profit
        );
    }
    writer.flush()?;

    println!(
        "\n✅ {} scenarios evaluated, {} skipped, results in {:?}",
        batch.rows.len(),
        batch.failures.len(),
        output_path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_directory_batch_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a_cpm.json", r#"{"name": "baseline"}"#);
        write(dir.path(), "b_cpc.json", r#"{"monetization": {"adType": "CPC"}}"#);
        write(dir.path(), "c_broken.json", "{ nope");
        write(dir.path(), "notes.txt", "ignored");

        let batch = evaluate_directory(dir.path()).unwrap();

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[0].scenario, "baseline");
        assert_eq!(batch.rows[1].scenario, "b_cpc");
        assert!((batch.rows[1].cpc_revenue - 93.84).abs() < 1e-9);
        assert_eq!(batch.failures.len(), 1);
        assert!(batch.failures[0].0.ends_with("c_broken.json"));
    }

    #[test]
    fn test_process_scenarios_writes_csv() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(input.path(), "one.json", r#"{"costs": {"costPerMillionTokens": 1.0}}"#);

        process_scenarios(input.path(), output.path()).unwrap();

        let mut reader = csv::Reader::from_path(output.path().join("scenario_results.csv")).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "one");
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(process_scenarios(dir.path(), dir.path()).is_err());
    }
}
