use crate::models::{AdType, CostParams, MonetizationParams, ResultSet, TrafficParams};

const TOKENS_PER_PRICING_UNIT: f64 = 1_000_000.0;
const IMPRESSIONS_PER_CPM_UNIT: f64 = 1000.0;

/// Map the three input groups to a full result set.
///
/// Inputs are trusted to be clamped by the caller. Nothing is validated here;
/// zero or negative traffic gives degenerate numbers and non-finite input
/// gives non-finite output.
pub fn recompute(
    traffic: &TrafficParams,
    costs: &CostParams,
    monetization: &MonetizationParams,
) -> ResultSet {
    // Monthly
    let total_messages = traffic.monthly_conversations * traffic.msgs_per_convo;
    let monthly = UnitEconomics::for_messages(total_messages, traffic, costs, monetization);

    let roi = if monthly.inference_cost > 0.0 {
        (monthly.net_profit / monthly.inference_cost) * 100.0
    } else {
        0.0
    };

    // Per conversation: evaluated on its own message count, not divided down
    let per_convo =
        UnitEconomics::for_messages(traffic.msgs_per_convo, traffic, costs, monetization);

    ResultSet {
        total_messages,
        total_tokens: monthly.tokens,
        inference_cost: monthly.inference_cost,
        total_ad_slots: monthly.ad_slots,
        ads_served: monthly.ads_served,
        cpm_revenue: monthly.cpm_revenue,
        cpc_revenue: monthly.cpc_revenue,
        total_revenue: monthly.revenue,
        net_profit: monthly.net_profit,
        roi,
        per_convo_messages: traffic.msgs_per_convo,
        per_convo_tokens: per_convo.tokens,
        per_convo_inference_cost: per_convo.inference_cost,
        per_convo_ad_slots: per_convo.ad_slots,
        per_convo_ads_served: per_convo.ads_served,
        per_convo_revenue: per_convo.revenue,
        per_convo_net_profit: per_convo.net_profit,
    }
}

/// Cost and revenue for an arbitrary number of messages.
#[derive(Debug, Clone, Copy)]
struct UnitEconomics {
    tokens: f64,
    inference_cost: f64,
    ad_slots: f64,
    ads_served: f64,
    cpm_revenue: f64,
    cpc_revenue: f64,
    revenue: f64,
    net_profit: f64,
}

impl UnitEconomics {
    fn for_messages(
        messages: f64,
        traffic: &TrafficParams,
        costs: &CostParams,
        monetization: &MonetizationParams,
    ) -> Self {
        let tokens = messages * traffic.tokens_per_msg;
        let inference_cost = (tokens / TOKENS_PER_PRICING_UNIT) * costs.cost_per_million_tokens;

        let ad_slots = messages / monetization.ad_frequency;
        let ads_served = ad_slots * (monetization.fill_rate / 100.0);

        let (cpm_revenue, cpc_revenue) = match monetization.ad_type {
            AdType::Cpm => ((ads_served / IMPRESSIONS_PER_CPM_UNIT) * monetization.cpm_price, 0.0),
            AdType::Cpc => (
                0.0,
                ads_served * (monetization.ctr / 100.0) * monetization.cpc_price,
            ),
        };

        let revenue = cpm_revenue + cpc_revenue;

        Self {
            tokens,
            inference_cost,
            ad_slots,
            ads_served,
            cpm_revenue,
            cpc_revenue,
            revenue,
            net_profit: revenue - inference_cost,
        }
    }
}

/// Prices at which the monthly figures stop being profitable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakEven {
    pub ad_type: AdType,
    /// CPM or CPC price (depending on `ad_type`) giving zero net profit.
    pub ad_price: Option<f64>,
    /// Highest cost per 1M tokens the current ad revenue still covers.
    pub max_cost_per_million_tokens: Option<f64>,
}

pub fn break_even(
    traffic: &TrafficParams,
    costs: &CostParams,
    monetization: &MonetizationParams,
) -> BreakEven {
    let results = recompute(traffic, costs, monetization);

    let revenue_per_price_unit = match monetization.ad_type {
        AdType::Cpm => results.ads_served / IMPRESSIONS_PER_CPM_UNIT,
        AdType::Cpc => results.ads_served * (monetization.ctr / 100.0),
    };

    let ad_price = if revenue_per_price_unit > 0.0 {
        Some(results.inference_cost / revenue_per_price_unit)
    } else {
        None
    };

    let million_tokens = results.total_tokens / TOKENS_PER_PRICING_UNIT;
    let max_cost_per_million_tokens = if million_tokens > 0.0 {
        Some(results.total_revenue / million_tokens)
    } else {
        None
    };

    BreakEven {
        ad_type: monetization.ad_type,
        ad_price,
        max_cost_per_million_tokens,
    }
}

pub struct RoiCalculator {
    traffic: TrafficParams,
    costs: CostParams,
    monetization: MonetizationParams,
}

impl RoiCalculator {
    pub fn new(traffic: TrafficParams, costs: CostParams, monetization: MonetizationParams) -> Self {
        Self {
            traffic,
            costs,
            monetization,
        }
    }

    pub fn calculate(&self) -> ResultSet {
        recompute(&self.traffic, &self.costs, &self.monetization)
    }

    pub fn break_even(&self) -> BreakEven {
        break_even(&self.traffic, &self.costs, &self.monetization)
    }
}

impl Default for RoiCalculator {
    fn default() -> Self {
        Self::new(
            TrafficParams::default(),
            CostParams::default(),
            MonetizationParams::default(),
        )
    }
}
