use crate::calculator::break_even;
use crate::format::{fmt_compact, fmt_currency, fmt_num_with_commas, fmt_percent, fmt_roi, fmt_tokens};
use crate::models::{AdType, ResultSet, Scenario};
use crate::theme::Theme;
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Summary,
}

/// One flat CSV/JSON row: scenario inputs followed by every result field.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRow {
    pub scenario: String,
    pub ad_type: AdType,
    pub monthly_conversations: f64,
    pub msgs_per_convo: f64,
    pub tokens_per_msg: f64,
    pub cost_per_million_tokens: f64,
    pub ad_frequency: f64,
    pub fill_rate: f64,
    pub cpm_price: f64,
    pub cpc_price: f64,
    pub ctr: f64,
    pub total_messages: f64,
    pub total_tokens: f64,
    pub inference_cost: f64,
    pub total_ad_slots: f64,
    pub ads_served: f64,
    pub cpm_revenue: f64,
    pub cpc_revenue: f64,
    pub total_revenue: f64,
    pub net_profit: f64,
    pub roi: f64,
    pub per_convo_messages: f64,
    pub per_convo_tokens: f64,
    pub per_convo_inference_cost: f64,
    pub per_convo_ad_slots: f64,
    pub per_convo_ads_served: f64,
    pub per_convo_revenue: f64,
    pub per_convo_net_profit: f64,
}

impl ScenarioRow {
    pub fn new(scenario: &Scenario, results: &ResultSet) -> Self {
        let traffic = &scenario.traffic;
        let monetization = &scenario.monetization;
        Self {
            scenario: scenario.name.clone(),
            ad_type: monetization.ad_type,
            monthly_conversations: traffic.monthly_conversations,
            msgs_per_convo: traffic.msgs_per_convo,
            tokens_per_msg: traffic.tokens_per_msg,
            cost_per_million_tokens: scenario.costs.cost_per_million_tokens,
            ad_frequency: monetization.ad_frequency,
            fill_rate: monetization.fill_rate,
            cpm_price: monetization.cpm_price,
            cpc_price: monetization.cpc_price,
            ctr: monetization.ctr,
            total_messages: results.total_messages,
            total_tokens: results.total_tokens,
            inference_cost: results.inference_cost,
            total_ad_slots: results.total_ad_slots,
            ads_served: results.ads_served,
            cpm_revenue: results.cpm_revenue,
            cpc_revenue: results.cpc_revenue,
            total_revenue: results.total_revenue,
            net_profit: results.net_profit,
            roi: results.roi,
            per_convo_messages: results.per_convo_messages,
            per_convo_tokens: results.per_convo_tokens,
            per_convo_inference_cost: results.per_convo_inference_cost,
            per_convo_ad_slots: results.per_convo_ad_slots,
            per_convo_ads_served: results.per_convo_ads_served,
            per_convo_revenue: results.per_convo_revenue,
            per_convo_net_profit: results.per_convo_net_profit,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    scenario: &'a Scenario,
    results: &'a ResultSet,
}

pub fn render(
    format: OutputFormat,
    scenario: &Scenario,
    results: &ResultSet,
    theme: Theme,
) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(scenario, results),
        OutputFormat::Csv => render_csv(&[ScenarioRow::new(scenario, results)]),
        OutputFormat::Summary => Ok(render_summary(scenario, results, theme)),
    }
}

pub fn render_json(scenario: &Scenario, results: &ResultSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport { scenario, results })?)
}

pub fn render_csv(rows: &[ScenarioRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Widths (0-100) of the cost and revenue bars, scaled to the larger of the two.
pub fn bar_shares(results: &ResultSet) -> (f64, f64) {
    let scale = results.total_revenue.max(results.inference_cost);
    if scale <= 0.0 {
        return (0.0, 0.0);
    }
    let share = |value: f64| (value / scale * 100.0).min(100.0);
    (share(results.inference_cost), share(results.total_revenue))
}

pub fn insight(results: &ResultSet) -> &'static str {
    if results.is_profitable() {
        "Your unit economics are sustainable!"
    } else {
        "Try increasing fill rate or CPM to improve profitability."
    }
}

pub fn render_summary(scenario: &Scenario, results: &ResultSet, theme: Theme) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_summary(&mut out, scenario, results, theme);
    out
}

fn write_summary(
    out: &mut String,
    scenario: &Scenario,
    results: &ResultSet,
    theme: Theme,
) -> std::fmt::Result {
    let annotate = theme.shows_annotations();
    let monetization = &scenario.monetization;

    if annotate {
        writeln!(out, "Earnings Calculator </>  [{}]", scenario.name)?;
        writeln!(out, "// AI unit economics, at a glance")?;
    } else {
        writeln!(out, "Earnings Calculator  [{}]", scenario.name)?;
    }
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Net profit per month: {}", fmt_currency(results.net_profit))?;
    writeln!(
        out,
        "ROI: {}   Revenue: {}   Costs: {}",
        fmt_roi(results.roi),
        fmt_currency(results.total_revenue),
        fmt_currency(results.inference_cost)
    )?;
    writeln!(out)?;

    writeln!(out, "Traffic & Usage")?;
    writeln!(
        out,
        "  {} conversations x {} msgs x {} tokens = {} messages, {} tokens",
        fmt_num_with_commas(scenario.traffic.monthly_conversations),
        fmt_num_with_commas(scenario.traffic.msgs_per_convo),
        fmt_num_with_commas(scenario.traffic.tokens_per_msg),
        fmt_compact(results.total_messages),
        fmt_compact(results.total_tokens)
    )?;
    writeln!(
        out,
        "  Inference at {} per 1M tokens",
        fmt_currency(scenario.costs.cost_per_million_tokens)
    )?;

    writeln!(out, "Monetization ({})", monetization.ad_type)?;
    writeln!(
        out,
        "  1 ad every {} msgs, {} fill: {} slots, {} ads served",
        fmt_num_with_commas(monetization.ad_frequency),
        fmt_percent(monetization.fill_rate),
        fmt_compact(results.total_ad_slots),
        fmt_compact(results.ads_served)
    )?;
    match monetization.ad_type {
        AdType::Cpm => writeln!(
            out,
            "  CPM {} -> {}",
            fmt_currency(monetization.cpm_price),
            fmt_currency(results.cpm_revenue)
        )?,
        AdType::Cpc => writeln!(
            out,
            "  CPC {} at {} CTR -> {}",
            fmt_currency(monetization.cpc_price),
            fmt_percent(monetization.ctr),
            fmt_currency(results.cpc_revenue)
        )?,
    }
    writeln!(out)?;

    let (cost_share, revenue_share) = bar_shares(results);
    writeln!(out, "Cost vs Revenue")?;
    writeln!(
        out,
        "  AI Costs   {:<width$} {}",
        bar(cost_share),
        fmt_currency(results.inference_cost),
        width = BAR_WIDTH
    )?;
    writeln!(
        out,
        "  Ad Revenue {:<width$} {}",
        bar(revenue_share),
        fmt_currency(results.total_revenue),
        width = BAR_WIDTH
    )?;
    writeln!(out)?;

    writeln!(out, "Per Conversation")?;
    writeln!(
        out,
        "  Messages {}   Tokens {}",
        fmt_num_with_commas(results.per_convo_messages),
        fmt_tokens(results.per_convo_tokens)
    )?;
    writeln!(out, "  Cost        {}", fmt_currency(results.per_convo_inference_cost))?;
    writeln!(out, "  Revenue     {}", fmt_currency(results.per_convo_revenue))?;
    writeln!(out, "  Net Profit  {}", fmt_currency(results.per_convo_net_profit))?;
    writeln!(out)?;

    let even = break_even(&scenario.traffic, &scenario.costs, monetization);
    if let Some(price) = even.ad_price {
        writeln!(out, "Break-even {} price: {}", even.ad_type, fmt_currency(price))?;
    }
    if let Some(max_cost) = even.max_cost_per_million_tokens {
        writeln!(out, "Max affordable cost per 1M tokens: {}", fmt_currency(max_cost))?;
    }

    writeln!(out, "{}", insight(results))?;
    if annotate {
        writeln!(out, "// Real-time calculations • API-ready metrics")?;
    }
    Ok(())
}

fn bar(share: f64) -> String {
    let filled = ((share / 100.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled.min(BAR_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::recompute;

    fn evaluate(scenario: &Scenario) -> ResultSet {
        recompute(&scenario.traffic, &scenario.costs, &scenario.monetization)
    }

    #[test]
    fn test_bar_shares() {
        let results = evaluate(&Scenario::cpm("default"));
        let (cost, revenue) = bar_shares(&results);

        assert_eq!(revenue, 100.0);
        assert!((cost - 15.60 / 27.60 * 100.0).abs() < 1e-9);
        assert_eq!(bar_shares(&ResultSet::default()), (0.0, 0.0));
    }

    #[test]
    fn test_insight_follows_profit() {
        let profitable = evaluate(&Scenario::cpm("default"));
        assert_eq!(insight(&profitable), "Your unit economics are sustainable!");

        let losing = evaluate(&Scenario::cpm("pricey").with_cost_per_million(60.0));
        assert!(insight(&losing).starts_with("Try increasing"));
    }

    #[test]
    fn test_summary_contains_headline_figures() {
        let scenario = Scenario::cpm("default");
        let summary = render_summary(&scenario, &evaluate(&scenario), Theme::Amphora);

        assert!(summary.contains("Net profit per month: $12.00"));
        assert!(summary.contains("ROI: +77%"));
        assert!(summary.contains("Revenue: $27.60"));
        assert!(summary.contains("Tokens 3.9k"));
        assert!(summary.contains("// AI unit economics"));
    }

    #[test]
    fn test_apple_theme_drops_annotations() {
        let scenario = Scenario::cpc("default");
        let summary = render_summary(&scenario, &evaluate(&scenario), Theme::Apple);

        assert!(!summary.contains("//"));
        assert!(summary.contains("CPC $1.00 at 1.7% CTR -> $93.84"));
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let scenario = Scenario::cpc("chat");
        let csv = render_csv(&[ScenarioRow::new(&scenario, &evaluate(&scenario))]).unwrap();
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("scenario,ad_type,monthly_conversations"));
        assert!(header.ends_with("per_convo_net_profit"));
        assert!(lines.next().unwrap().starts_with("chat,CPC,10000.0"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_json_round_trips_the_scenario() {
        let scenario = Scenario::cpm("json");
        let json = render(OutputFormat::Json, &scenario, &evaluate(&scenario), Theme::Premium).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["scenario"]["name"], "json");
        assert_eq!(value["results"]["totalMessages"], 60_000.0);
        assert!(value["results"].get("perConvoNetProfit").is_some());
    }
}
