use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::price_plan::window_format;
use crate::models::{DayOfWeek, PeakTimeMultiplier, PeriodType, PricePlan};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
const ENV_PREFIX: &str = "JOI_ENERGY";
/// One day
pub const MAX_READING_INTERVAL_SECONDS: i64 = 86_400;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub seed: SeedConfig,
    pub price_plans: Vec<PricePlanConfig>,
    pub accounts: Vec<AccountConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            metrics: MetricsConfig::default(),
            seed: SeedConfig::default(),
            price_plans: default_price_plans(),
            accounts: default_accounts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

/// Synthetic readings loaded for every account meter at startup
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SeedConfig {
    pub readings_per_meter: usize,
    pub reading_interval_seconds: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            readings_per_meter: 20,
            reading_interval_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricePlanConfig {
    pub id: String,
    pub supplier: String,
    pub unit_rate: Decimal,
    #[serde(default)]
    pub peak_multipliers: Vec<PeakMultiplierConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeakMultiplierConfig {
    pub period: PeriodType,
    pub day_of_week: DayOfWeek,
    pub multiplier: Decimal,
    #[serde(with = "window_format")]
    pub start: NaiveDateTime,
    #[serde(with = "window_format")]
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    pub smart_meter_id: String,
    pub price_plan_id: String,
}

impl From<&PeakMultiplierConfig> for PeakTimeMultiplier {
    fn from(cfg: &PeakMultiplierConfig) -> Self {
        PeakTimeMultiplier {
            period: cfg.period,
            day_of_week: cfg.day_of_week,
            multiplier: cfg.multiplier,
            start_date_time: cfg.start,
            end_date_time: cfg.end,
        }
    }
}

impl From<&PricePlanConfig> for PricePlan {
    fn from(cfg: &PricePlanConfig) -> Self {
        PricePlan::new(cfg.id.clone(), cfg.supplier.clone(), cfg.unit_rate)
            .with_peak_time_multipliers(cfg.peak_multipliers.iter().map(Into::into).collect())
    }
}

impl Config {
    /// Seed catalog in configuration order
    pub fn price_plans(&self) -> Vec<PricePlan> {
        self.price_plans.iter().map(Into::into).collect()
    }
}

fn default_price_plans() -> Vec<PricePlanConfig> {
    [
        ("price-plan-0", "Dr Evil's Dark Energy", 10),
        ("price-plan-1", "The Green Eco", 2),
        ("price-plan-2", "Power for Everyone", 1),
    ]
    .into_iter()
    .map(|(id, supplier, rate)| PricePlanConfig {
        id: id.to_string(),
        supplier: supplier.to_string(),
        unit_rate: Decimal::from(rate),
        peak_multipliers: Vec::new(),
    })
    .collect()
}

fn default_accounts() -> Vec<AccountConfig> {
    [
        ("smart-meter-0", "price-plan-0"),
        ("smart-meter-1", "price-plan-1"),
        ("smart-meter-2", "price-plan-0"),
        ("smart-meter-3", "price-plan-2"),
        ("smart-meter-4", "price-plan-1"),
    ]
    .into_iter()
    .map(|(meter, plan)| AccountConfig {
        smart_meter_id: meter.to_string(),
        price_plan_id: plan.to_string(),
    })
    .collect()
}

pub fn load_config(path: &str) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if !matches!(cfg.server.log_format.as_str(), "text" | "json") {
        anyhow::bail!(
            "Invalid log format '{}', expected 'text' or 'json'",
            cfg.server.log_format
        );
    }

    if !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("Metrics endpoint must start with '/': {}", cfg.metrics.endpoint);
    }

    if !(1..=MAX_READING_INTERVAL_SECONDS).contains(&cfg.seed.reading_interval_seconds) {
        anyhow::bail!(
            "Seed reading interval must be between 1 and {} seconds, got {}",
            MAX_READING_INTERVAL_SECONDS,
            cfg.seed.reading_interval_seconds
        );
    }

    let mut plan_ids = HashSet::new();
    for plan in &cfg.price_plans {
        if plan.id.is_empty() {
            anyhow::bail!("Price plan id cannot be empty");
        }
        if !plan_ids.insert(plan.id.as_str()) {
            anyhow::bail!("Duplicate price plan id: {}", plan.id);
        }
        if plan.unit_rate.is_sign_negative() {
            anyhow::bail!("Price plan '{}' has a negative unit rate", plan.id);
        }

        for rule in &plan.peak_multipliers {
            if rule.multiplier.is_sign_negative() {
                anyhow::bail!("Price plan '{}' has a negative peak multiplier", plan.id);
            }
            if rule.start > rule.end {
                anyhow::bail!(
                    "Price plan '{}' has a peak window ending before it starts",
                    plan.id
                );
            }
        }
    }

    for account in &cfg.accounts {
        if !plan_ids.contains(account.price_plan_id.as_str()) {
            anyhow::bail!(
                "Account '{}' references unknown price plan: {}",
                account.smart_meter_id,
                account.price_plan_id
            );
        }
    }

    Ok(())
}
