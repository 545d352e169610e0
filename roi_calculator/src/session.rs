use crate::calculator::recompute;
use crate::inputs::InputField;
use crate::models::{AdType, CostParams, MonetizationParams, ResultSet, Scenario, TrafficParams};
use anyhow::Result;
use log::debug;

/// Current inputs plus the results derived from them.
///
/// Every setter swaps in a whole input record and recomputes before
/// returning, so `results()` always matches the current inputs.
pub struct CalculatorSession {
    traffic: TrafficParams,
    costs: CostParams,
    monetization: MonetizationParams,
    results: ResultSet,
}

impl CalculatorSession {
    pub fn new(traffic: TrafficParams, costs: CostParams, monetization: MonetizationParams) -> Self {
        let results = recompute(&traffic, &costs, &monetization);
        Self {
            traffic,
            costs,
            monetization,
            results,
        }
    }

    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self::new(scenario.traffic, scenario.costs, scenario.monetization)
    }

    pub fn traffic(&self) -> &TrafficParams {
        &self.traffic
    }

    pub fn costs(&self) -> &CostParams {
        &self.costs
    }

    pub fn monetization(&self) -> &MonetizationParams {
        &self.monetization
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn set_traffic(&mut self, traffic: TrafficParams) {
        self.traffic = traffic;
        self.refresh();
    }

    pub fn set_costs(&mut self, costs: CostParams) {
        self.costs = costs;
        self.refresh();
    }

    pub fn set_monetization(&mut self, monetization: MonetizationParams) {
        self.monetization = monetization;
        self.refresh();
    }

    pub fn set_ad_type(&mut self, ad_type: AdType) {
        self.set_monetization(MonetizationParams {
            ad_type,
            ..self.monetization
        });
    }

    /// Clamp `raw` to the field's range and store it. Returns the value kept.
    pub fn set_field(&mut self, field: InputField, raw: f64) -> f64 {
        let value = field.spec().clamp(raw);

        match field {
            InputField::MonthlyConversations => self.set_traffic(TrafficParams {
                monthly_conversations: value,
                ..self.traffic
            }),
            InputField::MsgsPerConvo => self.set_traffic(TrafficParams {
                msgs_per_convo: value,
                ..self.traffic
            }),
            InputField::TokensPerMsg => self.set_traffic(TrafficParams {
                tokens_per_msg: value,
                ..self.traffic
            }),
            InputField::CostPerMillionTokens => self.set_costs(CostParams {
                cost_per_million_tokens: value,
            }),
            InputField::AdFrequency => self.set_monetization(MonetizationParams {
                ad_frequency: value,
                ..self.monetization
            }),
            InputField::FillRate => self.set_monetization(MonetizationParams {
                fill_rate: value,
                ..self.monetization
            }),
            InputField::CpmPrice => self.set_monetization(MonetizationParams {
                cpm_price: value,
                ..self.monetization
            }),
            InputField::CpcPrice => self.set_monetization(MonetizationParams {
                cpc_price: value,
                ..self.monetization
            }),
            InputField::Ctr => self.set_monetization(MonetizationParams {
                ctr: value,
                ..self.monetization
            }),
        }

        value
    }

    /// Select preset chip `index` (0-based) of `field`.
    pub fn apply_preset(&mut self, field: InputField, index: usize) -> Result<f64> {
        let spec = field.spec();
        let Some(preset) = spec.presets.get(index) else {
            anyhow::bail!(
                "{} has {} presets, no preset #{}",
                spec.name,
                spec.presets.len(),
                index + 1
            );
        };
        Ok(self.set_field(field, *preset))
    }

    pub fn value(&self, field: InputField) -> f64 {
        field.read(&self.traffic, &self.costs, &self.monetization)
    }

    pub fn to_scenario(&self, name: &str) -> Scenario {
        Scenario {
            name: name.to_string(),
            traffic: self.traffic,
            costs: self.costs,
            monetization: self.monetization,
        }
    }

    fn refresh(&mut self) {
        self.results = recompute(&self.traffic, &self.costs, &self.monetization);
        debug!(
            "Recomputed: revenue {:.4}, cost {:.4}, roi {:.2}",
            self.results.total_revenue, self.results.inference_cost, self.results.roi
        );
    }
}

impl Default for CalculatorSession {
    fn default() -> Self {
        Self::new(
            TrafficParams::default(),
            CostParams::default(),
            MonetizationParams::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_default_results() {
        let session = CalculatorSession::default();

        assert_eq!(session.results().total_messages, 60_000.0);
        assert_eq!(session.monetization().ad_type, AdType::Cpm);
    }

    #[test]
    fn test_every_setter_recomputes() {
        let mut session = CalculatorSession::default();

        session.set_traffic(TrafficParams {
            monthly_conversations: 20_000.0,
            ..*session.traffic()
        });
        assert_eq!(session.results().total_messages, 120_000.0);

        session.set_costs(CostParams {
            cost_per_million_tokens: 0.0,
        });
        assert_eq!(session.results().inference_cost, 0.0);
        assert_eq!(session.results().roi, 0.0);

        session.set_ad_type(AdType::Cpc);
        assert_eq!(session.results().cpm_revenue, 0.0);
        assert!(session.results().cpc_revenue > 0.0);

        let expected = recompute(session.traffic(), session.costs(), session.monetization());
        assert_eq!(*session.results(), expected);
    }

    #[test]
    fn test_set_field_clamps_and_keeps_other_fields() {
        let mut session = CalculatorSession::default();

        assert_eq!(session.set_field(InputField::FillRate, 250.0), 100.0);
        assert_eq!(session.set_field(InputField::AdFrequency, 1.0), 3.0);
        assert_eq!(session.monetization().fill_rate, 100.0);
        assert_eq!(session.monetization().cpm_price, 5.0);
        assert_eq!(session.value(InputField::AdFrequency), 3.0);
        assert_eq!(session.results().total_ad_slots, 20_000.0);
    }

    #[test]
    fn test_apply_preset() {
        let mut session = CalculatorSession::default();

        assert_eq!(session.apply_preset(InputField::CostPerMillionTokens, 2).unwrap(), 5.0);
        assert_eq!(session.costs().cost_per_million_tokens, 5.0);
        assert!(session.apply_preset(InputField::CpcPrice, 9).is_err());
    }

    #[test]
    fn test_scenario_round_trip() {
        let mut session = CalculatorSession::default();
        session.set_field(InputField::Ctr, 2.5);

        let restored = CalculatorSession::from_scenario(&session.to_scenario("saved"));
        assert_eq!(restored.results(), session.results());
    }
}
