use crate::models::{CostParams, MonetizationParams, TrafficParams};
use std::fmt;

/// Every numeric input the calculator exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    MonthlyConversations,
    MsgsPerConvo,
    TokensPerMsg,
    CostPerMillionTokens,
    AdFrequency,
    FillRate,
    CpmPrice,
    CpcPrice,
    Ctr,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    pub presets: &'static [f64],
    pub is_currency: bool,
    pub unit: &'static str,
}

const MONTHLY_CONVERSATIONS: FieldSpec = FieldSpec {
    name: "monthlyConversations",
    label: "Monthly conversations",
    min: 100.0,
    max: 1_000_000.0,
    step: 100.0,
    default: 10_000.0,
    presets: &[1000.0, 10_000.0, 50_000.0, 100_000.0],
    is_currency: false,
    unit: "convos",
};

const MSGS_PER_CONVO: FieldSpec = FieldSpec {
    name: "msgsPerConvo",
    label: "Messages per conversation",
    min: 3.0,
    max: 30.0,
    step: 1.0,
    default: 6.0,
    presets: &[3.0, 6.0, 10.0, 15.0, 20.0],
    is_currency: false,
    unit: "msgs",
};

const TOKENS_PER_MSG: FieldSpec = FieldSpec {
    name: "tokensPerMsg",
    label: "Tokens per message",
    min: 200.0,
    max: 3000.0,
    step: 50.0,
    default: 650.0,
    presets: &[400.0, 650.0, 1000.0, 1500.0, 2000.0],
    is_currency: false,
    unit: "tokens",
};

const COST_PER_MILLION_TOKENS: FieldSpec = FieldSpec {
    name: "costPerMillionTokens",
    label: "Cost per 1M tokens",
    min: 0.20,
    max: 100.0,
    step: 0.10,
    default: 0.40,
    presets: &[0.40, 1.00, 5.00, 15.00, 30.00, 60.00],
    is_currency: true,
    unit: "",
};

const AD_FREQUENCY: FieldSpec = FieldSpec {
    name: "adFrequency",
    label: "Ad frequency",
    min: 3.0,
    max: 20.0,
    step: 1.0,
    default: 10.0,
    presets: &[5.0, 10.0, 15.0, 20.0],
    is_currency: false,
    unit: "msgs",
};

const FILL_RATE: FieldSpec = FieldSpec {
    name: "fillRate",
    label: "Fill rate",
    min: 50.0,
    max: 100.0,
    step: 1.0,
    default: 92.0,
    presets: &[70.0, 85.0, 92.0, 95.0, 98.0],
    is_currency: false,
    unit: "%",
};

const CPM_PRICE: FieldSpec = FieldSpec {
    name: "cpmPrice",
    label: "CPM price",
    min: 0.50,
    max: 50.0,
    step: 0.50,
    default: 5.00,
    presets: &[2.00, 5.00, 10.00, 15.00],
    is_currency: true,
    unit: "",
};

const CPC_PRICE: FieldSpec = FieldSpec {
    name: "cpcPrice",
    label: "CPC price",
    min: 0.10,
    max: 10.0,
    step: 0.10,
    default: 1.00,
    presets: &[0.50, 1.00, 2.00, 3.00],
    is_currency: true,
    unit: "",
};

const CTR: FieldSpec = FieldSpec {
    name: "ctr",
    label: "Click-through rate",
    min: 0.1,
    max: 5.0,
    step: 0.1,
    default: 1.7,
    presets: &[0.5, 1.0, 1.7, 2.5, 3.5],
    is_currency: false,
    unit: "%",
};

impl FieldSpec {
    /// Value committed when editing finishes: garbage or too small snaps to
    /// `min`, too large to `max`. No rounding to `step`.
    pub fn clamp(&self, raw: f64) -> f64 {
        if raw.is_nan() || raw < self.min {
            self.min
        } else if raw > self.max {
            self.max
        } else {
            raw
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// A preset chip counts as selected when within half a step of the value.
    pub fn is_preset_active(&self, value: f64, preset: f64) -> bool {
        (value - preset).abs() < self.step / 2.0
    }
}

impl InputField {
    pub const ALL: [InputField; 9] = [
        InputField::MonthlyConversations,
        InputField::MsgsPerConvo,
        InputField::TokensPerMsg,
        InputField::CostPerMillionTokens,
        InputField::AdFrequency,
        InputField::FillRate,
        InputField::CpmPrice,
        InputField::CpcPrice,
        InputField::Ctr,
    ];

    pub fn spec(&self) -> &'static FieldSpec {
        match self {
            InputField::MonthlyConversations => &MONTHLY_CONVERSATIONS,
            InputField::MsgsPerConvo => &MSGS_PER_CONVO,
            InputField::TokensPerMsg => &TOKENS_PER_MSG,
            InputField::CostPerMillionTokens => &COST_PER_MILLION_TOKENS,
            InputField::AdFrequency => &AD_FREQUENCY,
            InputField::FillRate => &FILL_RATE,
            InputField::CpmPrice => &CPM_PRICE,
            InputField::CpcPrice => &CPC_PRICE,
            InputField::Ctr => &CTR,
        }
    }

    /// Accepts `fillRate`, `fill_rate` or `fill-rate`, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|field| field.spec().name.to_ascii_lowercase() == wanted)
    }

    pub fn read(
        &self,
        traffic: &TrafficParams,
        costs: &CostParams,
        monetization: &MonetizationParams,
    ) -> f64 {
        match self {
            InputField::MonthlyConversations => traffic.monthly_conversations,
            InputField::MsgsPerConvo => traffic.msgs_per_convo,
            InputField::TokensPerMsg => traffic.tokens_per_msg,
            InputField::CostPerMillionTokens => costs.cost_per_million_tokens,
            InputField::AdFrequency => monetization.ad_frequency,
            InputField::FillRate => monetization.fill_rate,
            InputField::CpmPrice => monetization.cpm_price,
            InputField::CpcPrice => monetization.cpc_price,
            InputField::Ctr => monetization.ctr,
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_records() {
        let traffic = TrafficParams::default();
        let costs = CostParams::default();
        let monetization = MonetizationParams::default();

        for field in InputField::ALL {
            let spec = field.spec();
            assert_eq!(field.read(&traffic, &costs, &monetization), spec.default, "{field}");
            assert!(spec.contains(spec.default), "{field} default out of range");
            assert!(spec.presets.iter().all(|p| spec.contains(*p)), "{field} preset out of range");
        }
    }

    #[test]
    fn test_clamp_commit_rules() {
        let spec = InputField::FillRate.spec();

        assert_eq!(spec.clamp(f64::NAN), 50.0);
        assert_eq!(spec.clamp(10.0), 50.0);
        assert_eq!(spec.clamp(140.0), 100.0);
        assert_eq!(spec.clamp(f64::INFINITY), 100.0);
        assert_eq!(spec.clamp(92.5), 92.5);
    }

    #[test]
    fn test_preset_activation_uses_half_step() {
        let spec = InputField::CostPerMillionTokens.spec();

        assert!(spec.is_preset_active(0.42, 0.40));
        assert!(!spec.is_preset_active(0.46, 0.40));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(InputField::from_name("fillRate"), Some(InputField::FillRate));
        assert_eq!(
            InputField::from_name("cost_per_million_tokens"),
            Some(InputField::CostPerMillionTokens)
        );
        assert_eq!(InputField::from_name("CTR"), Some(InputField::Ctr));
        assert_eq!(InputField::from_name("ad-frequency"), Some(InputField::AdFrequency));
        assert_eq!(InputField::from_name("budget"), None);
    }
}
