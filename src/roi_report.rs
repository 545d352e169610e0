use anyhow::Result;
use roi_calculator::format::{fmt_compact, fmt_currency, fmt_roi};
use roi_calculator::{break_even, recompute, BreakEven, ResultSet, Scenario};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Scenarios every report covers, built from the calculator presets.
pub fn preset_scenarios() -> Vec<Scenario> {
    let mut long_chats = Scenario::cpm("Long conversations (CPM)");
    long_chats.traffic.msgs_per_convo = 20.0;
    long_chats.traffic.tokens_per_msg = 1000.0;

    vec![
        Scenario::cpm("Baseline (CPM)"),
        Scenario::cpc("Baseline (CPC)"),
        Scenario::cpm("High traffic (CPM)").with_conversations(100_000.0),
        Scenario::cpm("Mid-tier model (CPM)").with_cost_per_million(5.0),
        Scenario::cpc("Mid-tier model (CPC)").with_cost_per_million(5.0),
        Scenario::cpc("Frontier model (CPC)").with_cost_per_million(15.0),
        long_chats,
    ]
}

pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub results: ResultSet,
    pub break_even: BreakEven,
}

pub fn evaluate(scenarios: Vec<Scenario>) -> Vec<ScenarioOutcome> {
    scenarios
        .into_iter()
        .map(|scenario| {
            let results = recompute(&scenario.traffic, &scenario.costs, &scenario.monetization);
            let break_even = break_even(&scenario.traffic, &scenario.costs, &scenario.monetization);
            ScenarioOutcome {
                scenario,
                results,
                break_even,
            }
        })
        .collect()
}

fn optional_currency(value: Option<f64>) -> String {
    value.map(fmt_currency).unwrap_or_else(|| "n/a".to_string())
}

pub fn write_report<W: Write>(out: &mut W, outcomes: &[ScenarioOutcome]) -> Result<()> {
    writeln!(out, "# AI Chat Native Ads - Unit Economics Report")?;
    writeln!(out, "\nReport Generated: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;

    let profitable = outcomes.iter().filter(|o| o.results.is_profitable()).count();
    writeln!(out, "## Overview")?;
    writeln!(out)?;
    writeln!(out, "- **Scenarios analyzed**: {}", outcomes.len())?;
    writeln!(out, "- **Profitable scenarios**: {}", profitable)?;
    if let Some(best) = outcomes
        .iter()
        .max_by(|a, b| a.results.net_profit.total_cmp(&b.results.net_profit))
    {
        writeln!(
            out,
            "- **Best monthly profit**: {} ({})",
            fmt_currency(best.results.net_profit),
            best.scenario.name
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Monthly Results")?;
    writeln!(out)?;
    writeln!(out, "| Scenario | Ad Type | Messages | Tokens | Cost | Revenue | Net Profit | ROI |")?;
    writeln!(out, "|----------|---------|----------|--------|------|---------|------------|-----|")?;
    for outcome in outcomes {
        let r = &outcome.results;
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} | {} |",
            outcome.scenario.name,
            outcome.scenario.monetization.ad_type,
            fmt_compact(r.total_messages),
            fmt_compact(r.total_tokens),
            fmt_currency(r.inference_cost),
            fmt_currency(r.total_revenue),
            fmt_currency(r.net_profit),
            fmt_roi(r.roi)
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Per Conversation")?;
    writeln!(out)?;
    writeln!(out, "| Scenario | Tokens | Ads Served | Cost | Revenue | Net Profit |")?;
    writeln!(out, "|----------|--------|------------|------|---------|------------|")?;
    for outcome in outcomes {
        let r = &outcome.results;
        writeln!(
            out,
            "| {} | {:.0} | {:.3} | {} | {} | {} |",
            outcome.scenario.name,
            r.per_convo_tokens,
            r.per_convo_ads_served,
            fmt_currency(r.per_convo_inference_cost),
            fmt_currency(r.per_convo_revenue),
            fmt_currency(r.per_convo_net_profit)
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Break-even")?;
    writeln!(out)?;
    writeln!(out, "| Scenario | Break-even Ad Price | Max Cost per 1M Tokens |")?;
    writeln!(out, "|----------|---------------------|------------------------|")?;
    for outcome in outcomes {
        writeln!(
            out,
            "| {} | {} {} | {} |",
            outcome.scenario.name,
            optional_currency(outcome.break_even.ad_price),
            outcome.break_even.ad_type,
            optional_currency(outcome.break_even.max_cost_per_million_tokens)
        )?;
    }

    Ok(())
}

pub fn generate_report(output_dir: &Path) -> Result<PathBuf> {
    println!("\n📊 Generating unit economics report");
    println!("{}", "=".repeat(60));

    std::fs::create_dir_all(output_dir)?;
    let outcomes = evaluate(preset_scenarios());

    let output_path = output_dir.join("roi_market_report.md");
    let mut file = std::fs::File::create(&output_path)?;
    write_report(&mut file, &outcomes)?;

    println!("  ✅ Report written to {:?}", output_path);
    Ok(output_path)
}
