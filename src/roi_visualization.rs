use anyhow::Result;
use plotters::prelude::*;
use roi_calculator::{recompute, AdType, CostParams, InputField, MonetizationParams, Scenario};
use std::path::{Path, PathBuf};

pub struct RoiVisualizer {
    output_dir: PathBuf,
}

/// Net profit at each ad frequency of the slider range, for one ad type.
pub fn profit_by_frequency(base: &Scenario, ad_type: AdType) -> Vec<(f64, f64)> {
    let spec = InputField::AdFrequency.spec();
    (spec.min as u32..=spec.max as u32)
        .map(|frequency| {
            let monetization = MonetizationParams {
                ad_type,
                ad_frequency: f64::from(frequency),
                ..base.monetization
            };
            let results = recompute(&base.traffic, &base.costs, &monetization);
            (f64::from(frequency), results.net_profit)
        })
        .collect()
}

/// (cost per 1M tokens, inference cost, ad revenue) for each cost preset.
pub fn cost_vs_revenue(base: &Scenario) -> Vec<(f64, f64, f64)> {
    InputField::CostPerMillionTokens
        .spec()
        .presets
        .iter()
        .map(|&cost| {
            let costs = CostParams {
                cost_per_million_tokens: cost,
            };
            let results = recompute(&base.traffic, &costs, &base.monetization);
            (cost, results.inference_cost, results.total_revenue)
        })
        .collect()
}

fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad)..(max + pad)
}

impl RoiVisualizer {
    pub fn new(output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn generate_all_visualizations(&self, base: &Scenario) -> Result<()> {
        println!("📊 Generating ROI Visualizations");
        println!("{}", "=".repeat(60));

        self.generate_frequency_chart(base)?;
        self.generate_cost_chart(base)?;

        println!("  ✅ Charts written to {:?}", self.output_dir);
        Ok(())
    }

    fn generate_frequency_chart(&self, base: &Scenario) -> Result<()> {
        println!("\n📈 Net profit vs ad frequency...");

        let cpm = profit_by_frequency(base, AdType::Cpm);
        let cpc = profit_by_frequency(base, AdType::Cpc);
        let y_range = padded_range(cpm.iter().chain(cpc.iter()).map(|(_, p)| *p));
        let spec = InputField::AdFrequency.spec();

        let output_path = self.output_dir.join("net_profit_by_ad_frequency.png");
        let root = BitMapBackend::new(&output_path, (800, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Monthly Net Profit: {}", base.name),
                ("sans-serif", 30).into_font(),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(spec.min..spec.max, y_range)?;

        chart
            .configure_mesh()
            .x_desc("One ad every N messages")
            .y_desc("Net Profit ($)")
            .draw()?;

        chart
            .draw_series(LineSeries::new(cpm.iter().copied(), &BLUE))?
            .label("CPM")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));

        chart
            .draw_series(LineSeries::new(cpc.iter().copied(), &GREEN))?
            .label("CPC")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &GREEN));

        chart
            .draw_series(LineSeries::new(vec![(spec.min, 0.0), (spec.max, 0.0)], &BLACK.mix(0.4)))?;

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn generate_cost_chart(&self, base: &Scenario) -> Result<()> {
        println!("\n📉 Inference cost vs ad revenue...");

        let points = cost_vs_revenue(base);
        let max_cost = points.iter().map(|(c, _, _)| *c).fold(0.0, f64::max);
        let y_range = padded_range(points.iter().flat_map(|(_, cost, rev)| [*cost, *rev]));

        let output_path = self.output_dir.join("cost_vs_revenue.png");
        let root = BitMapBackend::new(&output_path, (800, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Cost vs Revenue ({})", base.monetization.ad_type),
                ("sans-serif", 30).into_font(),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..max_cost * 1.05, y_range)?;

        chart
            .configure_mesh()
            .x_desc("Cost per 1M tokens ($)")
            .y_desc("Monthly ($)")
            .draw()?;

        chart
            .draw_series(LineSeries::new(points.iter().map(|(c, cost, _)| (*c, *cost)), &RED))?
            .label("AI Costs")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &RED));

        chart
            .draw_series(LineSeries::new(points.iter().map(|(c, _, rev)| (*c, *rev)), &BLUE))?
            .label("Ad Revenue")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));

        chart.draw_series(
            points
                .iter()
                .map(|(c, cost, _)| Circle::new((*c, *cost), 4, RED.filled())),
        )?;

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

pub fn generate_roi_visualizations(base: &Scenario, output_dir: &Path) -> Result<()> {
    let visualizer = RoiVisualizer::new(output_dir)?;
    visualizer.generate_all_visualizations(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_by_frequency_covers_slider() {
        let points = profit_by_frequency(&Scenario::default(), AdType::Cpm);

        assert_eq!(points.len(), 18);
        assert_eq!(points[0].0, 3.0);
        assert_eq!(points[17].0, 20.0);
        assert!(points.windows(2).all(|w| w[0].1 > w[1].1));
    }

    #[test]
    fn test_cost_vs_revenue_keeps_revenue_flat() {
        let points = cost_vs_revenue(&Scenario::default());

        assert_eq!(points.len(), 6);
        assert!(points.iter().all(|(_, _, rev)| (*rev - points[0].2).abs() < 1e-12));
        assert!(points.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn test_padded_range_includes_zero() {
        let range = padded_range([5.0, 25.0].into_iter());
        assert!(range.start < 0.0 && range.end > 25.0);
    }
}
