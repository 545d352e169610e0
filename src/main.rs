use anyhow::Result;
use log::info;
use roi_calculator::report::render_summary;
use roi_calculator::{recompute, Scenario, Theme};
use std::path::PathBuf;

mod roi_report;
mod roi_visualization;
mod scenario_processor;
mod sweep_processor;

fn output_dir_arg(args: &[String], index: usize, default: &str) -> PathBuf {
    args.get(index)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn main() -> Result<()> {
    env_logger::init();

    // Set Rayon to use all available cores
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .build_global()?;

    let args: Vec<String> = std::env::args().collect();
    let base = Scenario::default();
    info!("Base scenario: {:?}", base);

    if args.len() > 1 && args[1] == "--sweep" {
        // Grid over ad frequency, fill rate, inference cost and ad type
        let output_dir = output_dir_arg(&args, 2, "roi_analysis");
        let start = std::time::Instant::now();
        sweep_processor::run_sweep(&base, &output_dir)?;
        println!("\n✅ Sweep complete in {:?}!", start.elapsed());
    } else if args.len() > 1 && args[1] == "--scenarios" {
        // Batch-evaluate scenario JSON files
        if args.len() > 2 {
            let input_dir = PathBuf::from(&args[2]);
            let output_dir = output_dir_arg(&args, 3, "roi_analysis");
            scenario_processor::process_scenarios(&input_dir, &output_dir)?;
        } else {
            println!("Usage: --scenarios <directory> [output_directory]");
            println!("Example: --scenarios scenarios/ roi_analysis");
        }
    } else if args.len() > 1 && args[1] == "--report" {
        // Markdown report over the preset scenarios
        let output_dir = output_dir_arg(&args, 2, "roi_analysis");
        roi_report::generate_report(&output_dir)?;
    } else if args.len() > 1 && args[1] == "--viz" {
        // Profit and cost charts
        let output_dir = output_dir_arg(&args, 2, "roi_analysis/charts");
        roi_visualization::generate_roi_visualizations(&base, &output_dir)?;
    } else {
        println!("🚀 AI Chat Ad Economics - Rust Processor");
        println!("Using {} CPU cores", num_cpus::get());
        println!("Rayon thread pool configured with {} threads", rayon::current_num_threads());
        println!("Options: --sweep [dir] | --scenarios <dir> [dir] | --report [dir] | --viz [dir]");
        println!("{}", "=".repeat(60));

        let results = recompute(&base.traffic, &base.costs, &base.monetization);
        println!("{}", render_summary(&base, &results, Theme::default()));
    }

    Ok(())
}
