use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use roi_calculator::report::{self, OutputFormat};
use roi_calculator::{
    AdType, CalculatorSession, FileStore, InputField, KeyValueStore, Scenario, ThemeState,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roi_calculator")]
#[command(about = "Estimate how native ads offset AI chat inference costs")]
struct Args {
    /// Scenario JSON file; explicit flags override its values
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Conversations per month
    #[arg(long)]
    monthly_conversations: Option<f64>,

    /// Messages per conversation
    #[arg(long)]
    msgs_per_convo: Option<f64>,

    /// Input + output tokens per message
    #[arg(long)]
    tokens_per_msg: Option<f64>,

    /// Inference cost in $ per 1M tokens
    #[arg(long)]
    cost_per_million_tokens: Option<f64>,

    /// Show one ad every N messages
    #[arg(long)]
    ad_frequency: Option<f64>,

    /// Share of ad slots filled (%)
    #[arg(long)]
    fill_rate: Option<f64>,

    /// $ per 1000 impressions
    #[arg(long)]
    cpm_price: Option<f64>,

    /// $ per click
    #[arg(long)]
    cpc_price: Option<f64>,

    /// Click-through rate (%)
    #[arg(long)]
    ctr: Option<f64>,

    /// Ad pricing model
    #[arg(short, long, value_enum)]
    ad_type: Option<AdTypeArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    output: OutputArg,

    /// Where the theme preference is stored
    #[arg(long, default_value = ".roi_calculator_state.json")]
    state_file: PathBuf,

    /// Switch theme before rendering
    #[arg(long)]
    toggle_theme: bool,

    /// Read commands from stdin and re-render after each change
    #[arg(short, long)]
    interactive: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum AdTypeArg {
    Cpm,
    Cpc,
}

impl From<AdTypeArg> for AdType {
    fn from(arg: AdTypeArg) -> Self {
        match arg {
            AdTypeArg::Cpm => AdType::Cpm,
            AdTypeArg::Cpc => AdType::Cpc,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputArg {
    Json,
    Csv,
    Summary,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Json => OutputFormat::Json,
            OutputArg::Csv => OutputFormat::Csv,
            OutputArg::Summary => OutputFormat::Summary,
        }
    }
}

impl Args {
    fn overrides(&self) -> Vec<(InputField, f64)> {
        [
            (InputField::MonthlyConversations, self.monthly_conversations),
            (InputField::MsgsPerConvo, self.msgs_per_convo),
            (InputField::TokensPerMsg, self.tokens_per_msg),
            (InputField::CostPerMillionTokens, self.cost_per_million_tokens),
            (InputField::AdFrequency, self.ad_frequency),
            (InputField::FillRate, self.fill_rate),
            (InputField::CpmPrice, self.cpm_price),
            (InputField::CpcPrice, self.cpc_price),
            (InputField::Ctr, self.ctr),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

/// What the REPL should do after a command.
#[derive(Debug, PartialEq)]
enum Outcome {
    Render,
    Message(String),
    Quit,
}

fn run_command<S: KeyValueStore>(
    line: &str,
    session: &mut CalculatorSession,
    theme: &mut ThemeState<S>,
) -> Result<Outcome> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.as_slice() {
        [] => Ok(Outcome::Message(String::new())),
        ["quit"] | ["exit"] | ["q"] => Ok(Outcome::Quit),
        ["show"] => Ok(Outcome::Render),
        ["help"] => Ok(Outcome::Message(
            "commands: set <field> <value> | preset <field> <n> | type cpm|cpc | theme | fields | show | quit"
                .to_string(),
        )),
        ["fields"] => {
            let lines: Vec<String> = InputField::ALL
                .iter()
                .map(|field| {
                    let spec = field.spec();
                    format!(
                        "{:<22} {:<26} {:>10} [{} - {}, step {}] presets {:?}",
                        spec.name,
                        spec.label,
                        session.value(*field),
                        spec.min,
                        spec.max,
                        spec.step,
                        spec.presets
                    )
                })
                .collect();
            Ok(Outcome::Message(lines.join("\n")))
        }
        ["set", name, raw] => {
            let field = parse_field(name)?;
            // Unparsable text commits as the minimum, like an emptied input box
            let raw = raw.parse::<f64>().unwrap_or(f64::NAN);
            let kept = session.set_field(field, raw);
            info!("{} = {}", field, kept);
            Ok(Outcome::Render)
        }
        ["preset", name, index] => {
            let field = parse_field(name)?;
            let index: usize = index
                .parse()
                .with_context(|| format!("Preset number must be a positive integer, got '{}'", index))?;
            if index == 0 {
                anyhow::bail!("Presets are numbered from 1");
            }
            session.apply_preset(field, index - 1)?;
            Ok(Outcome::Render)
        }
        ["type", kind] => {
            let ad_type = match kind.to_ascii_lowercase().as_str() {
                "cpm" => AdType::Cpm,
                "cpc" => AdType::Cpc,
                other => anyhow::bail!("Unknown ad type '{}', expected cpm or cpc", other),
            };
            session.set_ad_type(ad_type);
            Ok(Outcome::Render)
        }
        ["theme"] => {
            theme.toggle();
            Ok(Outcome::Render)
        }
        _ => anyhow::bail!("Unrecognised command '{}', try 'help'", line.trim()),
    }
}

fn parse_field(name: &str) -> Result<InputField> {
    InputField::from_name(name).with_context(|| format!("Unknown field '{}', try 'fields'", name))
}

fn run_interactive<S: KeyValueStore>(
    session: &mut CalculatorSession,
    theme: &mut ThemeState<S>,
    name: &str,
    format: OutputFormat,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!(
        "{}",
        report::render(format, &session.to_scenario(name), session.results(), theme.theme())?
    );

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match run_command(&line, session, theme) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Render) => println!(
                "{}",
                report::render(format, &session.to_scenario(name), session.results(), theme.theme())?
            ),
            Ok(Outcome::Message(message)) => {
                if !message.is_empty() {
                    println!("{}", message);
                }
            }
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => {
            info!("Loading scenario from {:?}", path);
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read scenario {:?}", path))?;
            serde_json::from_str::<Scenario>(&contents)
                .with_context(|| format!("Invalid scenario {:?}", path))?
        }
        None => Scenario::default(),
    };

    let mut session = CalculatorSession::from_scenario(&scenario);
    for (field, value) in args.overrides() {
        session.set_field(field, value);
    }
    if let Some(ad_type) = args.ad_type {
        session.set_ad_type(ad_type.into());
    }

    let mut theme = ThemeState::load(FileStore::new(&args.state_file));
    if args.toggle_theme {
        theme.toggle();
    }

    let format = OutputFormat::from(args.output);
    if args.interactive {
        return run_interactive(&mut session, &mut theme, &scenario.name, format);
    }

    let output = report::render(
        format,
        &session.to_scenario(&scenario.name),
        session.results(),
        theme.theme(),
    )?;
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_calculator::{MemoryStore, Theme};

    fn fresh() -> (CalculatorSession, ThemeState<MemoryStore>) {
        (
            CalculatorSession::default(),
            ThemeState::load(MemoryStore::default()),
        )
    }

    #[test]
    fn test_set_command_updates_results() {
        let (mut session, mut theme) = fresh();

        let outcome = run_command("set monthlyConversations 20000", &mut session, &mut theme).unwrap();
        assert_eq!(outcome, Outcome::Render);
        assert_eq!(session.results().total_messages, 120_000.0);

        run_command("set fill_rate abc", &mut session, &mut theme).unwrap();
        assert_eq!(session.monetization().fill_rate, 50.0);
    }

    #[test]
    fn test_preset_and_type_commands() {
        let (mut session, mut theme) = fresh();

        run_command("preset ctr 5", &mut session, &mut theme).unwrap();
        run_command("type CPC", &mut session, &mut theme).unwrap();

        assert_eq!(session.monetization().ctr, 3.5);
        assert_eq!(session.monetization().ad_type, AdType::Cpc);
        assert!(run_command("preset ctr 0", &mut session, &mut theme).is_err());
        assert!(run_command("type cpa", &mut session, &mut theme).is_err());
    }

    #[test]
    fn test_theme_and_quit_commands() {
        let (mut session, mut theme) = fresh();

        run_command("theme", &mut session, &mut theme).unwrap();
        assert_eq!(theme.theme(), Theme::Premium);
        assert_eq!(run_command("quit", &mut session, &mut theme).unwrap(), Outcome::Quit);
        assert!(run_command("launch rockets", &mut session, &mut theme).is_err());
    }

    #[test]
    fn test_flag_overrides_are_clamped() {
        let args = Args::parse_from(["roi_calculator", "--fill-rate", "120", "--ctr", "2.5"]);
        let mut session = CalculatorSession::default();
        for (field, value) in args.overrides() {
            session.set_field(field, value);
        }

        assert_eq!(session.monetization().fill_rate, 100.0);
        assert_eq!(session.monetization().ctr, 2.5);
    }
}
