use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TrafficParams {
    pub monthly_conversations: f64,
    pub msgs_per_convo: f64,
    pub tokens_per_msg: f64, // input + output combined
}

impl Default for TrafficParams {
    fn default() -> Self {
        Self {
            monthly_conversations: 10_000.0,
            msgs_per_convo: 6.0,
            tokens_per_msg: 650.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CostParams {
    pub cost_per_million_tokens: f64,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            cost_per_million_tokens: 0.40,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AdType {
    #[default]
    #[serde(rename = "CPM", alias = "cpm")]
    Cpm,
    #[serde(rename = "CPC", alias = "cpc")]
    Cpc,
}

impl AdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::Cpm => "CPM",
            AdType::Cpc => "CPC",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MonetizationParams {
    pub ad_type: AdType,
    pub ad_frequency: f64, // one ad every N messages
    pub fill_rate: f64,    // %
    pub cpm_price: f64,
    pub cpc_price: f64,
    pub ctr: f64, // %
}

impl Default for MonetizationParams {
    fn default() -> Self {
        Self {
            ad_type: AdType::Cpm,
            ad_frequency: 10.0,
            fill_rate: 92.0,
            cpm_price: 5.00,
            cpc_price: 1.00,
            ctr: 1.7,
        }
    }
}

/// Output of one engine evaluation. Always rebuilt in full, never patched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    // Monthly totals
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

    // Per conversation
    pub per_convo_messages: f64,
    pub per_convo_tokens: f64,
    pub per_convo_inference_cost: f64,
    pub per_convo_ad_slots: f64,
    pub per_convo_ads_served: f64,
    pub per_convo_revenue: f64,
    pub per_convo_net_profit: f64,
}

impl ResultSet {
    pub fn is_profitable(&self) -> bool {
        self.net_profit > 0.0
    }
}

/// A named set of inputs, as stored in scenario JSON files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub traffic: TrafficParams,
    pub costs: CostParams,
    pub monetization: MonetizationParams,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            traffic: TrafficParams::default(),
            costs: CostParams::default(),
            monetization: MonetizationParams::default(),
        }
    }
}

impl Scenario {
    pub fn cpm(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn cpc(name: &str) -> Self {
        let mut scenario = Self::cpm(name);
        scenario.monetization.ad_type = AdType::Cpc;
        scenario
    }

    pub fn with_cost_per_million(mut self, cost_per_million_tokens: f64) -> Self {
        self.costs.cost_per_million_tokens = cost_per_million_tokens;
        self
    }

    pub fn with_conversations(mut self, monthly_conversations: f64) -> Self {
        self.traffic.monthly_conversations = monthly_conversations;
        self
    }
}
