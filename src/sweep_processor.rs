use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use rayon::prelude::*;
use roi_calculator::{recompute, AdType, CostParams, InputField, MonetizationParams, Scenario};
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct SweepPoint {
    pub ad_type: AdType,
    pub ad_frequency: f64,
    pub fill_rate: f64,
    pub cost_per_million_tokens: f64,
    pub total_revenue: f64,
    pub inference_cost: f64,
    pub net_profit: f64,
    pub roi: f64,
    pub per_convo_net_profit: f64,
}

/// Every combination of ad frequency (full slider range), fill-rate presets,
/// inference-cost presets and both ad types, on top of `base` traffic.
pub fn sweep_grid(base: &Scenario) -> Vec<Scenario> {
    let frequency = InputField::AdFrequency.spec();
    let frequencies: Vec<f64> = (frequency.min as u32..=frequency.max as u32)
        .map(f64::from)
        .collect();

    let mut grid = Vec::new();
    for ad_type in [AdType::Cpm, AdType::Cpc] {
        for &ad_frequency in &frequencies {
            for &fill_rate in InputField::FillRate.spec().presets {
                for &cost in InputField::CostPerMillionTokens.spec().presets {
                    grid.push(Scenario {
                        name: format!("{}-f{}-fill{}-c{}", ad_type, ad_frequency, fill_rate, cost),
                        traffic: base.traffic,
                        costs: CostParams {
                            cost_per_million_tokens: cost,
                        },
                        monetization: MonetizationParams {
                            ad_type,
                            ad_frequency,
                            fill_rate,
                            ..base.monetization
                        },
                    });
                }
            }
        }
    }
    grid
}

pub fn evaluate_grid(grid: &[Scenario], pb: &ProgressBar) -> Vec<SweepPoint> {
    grid.par_iter()
        .map(|scenario| {
            pb.inc(1);
            let results = recompute(&scenario.traffic, &scenario.costs, &scenario.monetization);
            SweepPoint {
                ad_type: scenario.monetization.ad_type,
                ad_frequency: scenario.monetization.ad_frequency,
                fill_rate: scenario.monetization.fill_rate,
                cost_per_million_tokens: scenario.costs.cost_per_million_tokens,
                total_revenue: results.total_revenue,
                inference_cost: results.inference_cost,
                net_profit: results.net_profit,
                roi: results.roi,
                per_convo_net_profit: results.per_convo_net_profit,
            }
        })
        .collect()
}

pub fn points_to_dataframe(points: &[SweepPoint]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new("ad_type", points.iter().map(|p| p.ad_type.as_str()).collect::<Vec<_>>()),
        Series::new("ad_frequency", points.iter().map(|p| p.ad_frequency).collect::<Vec<_>>()),
        Series::new("fill_rate", points.iter().map(|p| p.fill_rate).collect::<Vec<_>>()),
        Series::new(
            "cost_per_million_tokens",
            points.iter().map(|p| p.cost_per_million_tokens).collect::<Vec<_>>(),
        ),
        Series::new("total_revenue", points.iter().map(|p| p.total_revenue).collect::<Vec<_>>()),
        Series::new("inference_cost", points.iter().map(|p| p.inference_cost).collect::<Vec<_>>()),
        Series::new("net_profit", points.iter().map(|p| p.net_profit).collect::<Vec<_>>()),
        Series::new("roi", points.iter().map(|p| p.roi).collect::<Vec<_>>()),
        Series::new(
            "per_convo_net_profit",
            points.iter().map(|p| p.per_convo_net_profit).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

/// Best profit, mean ROI and number of profitable configurations per ad type.
pub fn summarize_by_ad_type(df: &DataFrame) -> Result<DataFrame> {
    let summary = df
        .clone()
        .lazy()
        .group_by([col("ad_type")])
        .agg([
            col("net_profit").max().alias("best_net_profit"),
            col("roi").mean().alias("mean_roi"),
            col("net_profit")
                .gt(lit(0.0))
                .cast(DataType::UInt32)
                .sum()
                .alias("profitable_configs"),
            col("net_profit").count().alias("configs"),
        ])
        .sort("ad_type", Default::default())
        .collect()?;
    Ok(summary)
}

pub fn top_points(points: &[SweepPoint], n: usize) -> Vec<SweepPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| b.net_profit.total_cmp(&a.net_profit));
    sorted.truncate(n);
    sorted
}

pub fn run_sweep(base: &Scenario, output_dir: &Path) -> Result<Vec<SweepPoint>> {
    println!("\n🧮 Ad monetization parameter sweep");
    println!("{}", "=".repeat(60));

    let grid = sweep_grid(base);
    println!("  {} configurations on {} conversations/month", grid.len(), base.traffic.monthly_conversations);

    let pb = ProgressBar::new(grid.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?,
    );
    let points = evaluate_grid(&grid, &pb);
    pb.finish_with_message("Sweep evaluated");

    std::fs::create_dir_all(output_dir)?;
    let mut df = points_to_dataframe(&points)?;

    let base_name = "roi_sweep";
    let csv_path = output_dir.join(format!("{}.csv", base_name));
    println!("  💾 Saving CSV...");
    CsvWriter::new(std::fs::File::create(&csv_path)?).finish(&mut df)?;

    let parquet_path = output_dir.join(format!("{}.parquet", base_name));
    println!("  📦 Saving Parquet...");
    ParquetWriter::new(std::fs::File::create(&parquet_path)?).finish(&mut df)?;

    let arrow_path = output_dir.join(format!("{}.arrow", base_name));
    println!("  🏹 Saving Arrow IPC...");
    IpcWriter::new(std::fs::File::create(&arrow_path)?).finish(&mut df)?;

    let summary = summarize_by_ad_type(&df)?;
    println!("\n📊 Summary by ad type:\n{}", summary);

    println!("\n🏆 Most profitable configurations:");
    for point in top_points(&points, 5) {
        println!(
            "  {} every {:>2} msgs, {:>3}% fill, ${:.2}/1M tokens: ${:.2} profit ({:+.0}% ROI)",
            point.ad_type,
            point.ad_frequency,
            point.fill_rate,
            point.cost_per_million_tokens,
            point.net_profit,
            point.roi
        );
    }

    println!("  ✅ Sweep written to {:?}", output_dir);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_grid_covers_every_combination() {
        let grid = sweep_grid(&Scenario::default());
        // 2 ad types x 18 frequencies x 5 fill rates x 6 costs
        assert_eq!(grid.len(), 2 * 18 * 5 * 6);
        assert!(grid.iter().all(|s| s.traffic == Scenario::default().traffic));
    }

    #[test]
    fn test_summary_counts_configurations() {
        let grid = sweep_grid(&Scenario::default());
        let points = evaluate_grid(&grid, &ProgressBar::hidden());
        let df = points_to_dataframe(&points).unwrap();
        let summary = summarize_by_ad_type(&df).unwrap();

        assert_eq!(summary.height(), 2);
        let configs = summary.column("configs").unwrap().cast(&DataType::UInt32).unwrap();
        assert_eq!(configs.u32().unwrap().get(0), Some(540));
    }

    #[test]
    fn test_top_points_are_sorted_by_profit() {
        let grid = sweep_grid(&Scenario::default());
        let points = evaluate_grid(&grid, &ProgressBar::hidden());
        let top = top_points(&points, 3);

        assert_eq!(top.len(), 3);
        assert!(top[0].net_profit >= top[1].net_profit);
        // Densest ads, fullest fill and cheapest tokens win
        assert_eq!(top[0].ad_frequency, 3.0);
        assert_eq!(top[0].fill_rate, 98.0);
        assert_eq!(top[0].cost_per_million_tokens, 0.40);
        assert_eq!(top[0].ad_type, AdType::Cpc);
    }

    #[test]
    fn test_run_sweep_writes_all_formats() {
        let dir = TempDir::new().unwrap();
        let points = run_sweep(&Scenario::default(), dir.path()).unwrap();

        assert_eq!(points.len(), 1080);
        for ext in ["csv", "parquet", "arrow"] {
            assert!(dir.path().join(format!("roi_sweep.{}", ext)).exists());
        }

        let df = CsvReader::new(std::fs::File::open(dir.path().join("roi_sweep.csv")).unwrap())
            .has_header(true)
            .finish()
            .unwrap();
        assert_eq!(df.height(), 1080);
    }
}
