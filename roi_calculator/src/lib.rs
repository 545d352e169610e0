pub mod calculator;
pub mod format;
pub mod inputs;
pub mod models;
pub mod report;
pub mod session;
pub mod theme;

pub use calculator::{break_even, recompute, BreakEven, RoiCalculator};
pub use inputs::{FieldSpec, InputField};
pub use models::{AdType, CostParams, MonetizationParams, ResultSet, Scenario, TrafficParams};
pub use report::{OutputFormat, ScenarioRow};
pub use session::CalculatorSession;
pub use theme::{FileStore, KeyValueStore, MemoryStore, Theme, ThemeState};
