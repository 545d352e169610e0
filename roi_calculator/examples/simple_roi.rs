use roi_calculator::{
    format::{fmt_currency, fmt_roi},
    AdType, CalculatorSession, InputField,
};

fn main() {
    // Default scenario: 10k conversations, 6 msgs each, $0.40 per 1M tokens
    let mut session = CalculatorSession::default();

    println!("ROI Analysis Results");
    println!("===================");
    print_headline("CPM $5.00", &session);

    // Same traffic sold per click instead
    session.set_ad_type(AdType::Cpc);
    print_headline("CPC $1.00 @ 1.7% CTR", &session);

    // A pricier model eats the margin
    session.set_field(InputField::CostPerMillionTokens, 15.0);
    print_headline("CPC with $15 / 1M tokens", &session);

    println!();
    println!("Ad frequency sweep (CPM):");
    session.set_ad_type(AdType::Cpm);
    session.set_field(InputField::CostPerMillionTokens, 0.40);
    for frequency in [3.0, 5.0, 10.0, 15.0, 20.0] {
        session.set_field(InputField::AdFrequency, frequency);
        let results = session.results();
        println!(
            "  every {:>2} msgs: {:>6.0} ads, profit {}",
            frequency,
            results.ads_served,
            fmt_currency(results.net_profit)
        );
    }
}

fn print_headline(label: &str, session: &CalculatorSession) {
    let results = session.results();
    println!(
        "{:<26} revenue {:>10}  cost {:>10}  profit {:>10}  ROI {}",
        label,
        fmt_currency(results.total_revenue),
        fmt_currency(results.inference_cost),
        fmt_currency(results.net_profit),
        fmt_roi(results.roi)
    );
}
