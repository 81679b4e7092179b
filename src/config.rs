use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::geo::{defaults, Point, Zone, ZoneSet};
use crate::storage::DistanceUnit;

// ============================================================================
// Configuration
// ============================================================================
//
// Static settings loaded once at startup. Every value has a default and can
// be overridden through an environment variable (see `Config::from_env`).
// Zones come from the JSON file named by ZONES_FILE, or the built-in
// St. Petersburg area when unset.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("Unknown store backend: {}", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfig {
    pub min_price: f64,
    pub max_price: f64,
    pub min_delivery_price: f64,
    pub max_delivery_price: f64,
    pub max_age_secs: u64,
}

impl OrderConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            min_price: 1000.0,
            max_price: 3000.0,
            min_delivery_price: 100.0,
            max_delivery_price: 500.0,
            max_age_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub interval_ms: u64,
    pub capacity: usize,
    pub cooldown_secs: u64,
}

impl GenerationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10,
            capacity: 200,
            cooldown_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    pub interval_secs: u64,
}

impl CleanupConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourierConfig {
    pub start: Point,
    pub visibility_radius: f64,
    pub visibility_unit: DistanceUnit,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            start: defaults::COURIER_START,
            visibility_radius: 2.8,
            visibility_unit: DistanceUnit::Kilometers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub metrics_port: u16,
    pub orders: OrderConfig,
    pub generation: GenerationConfig,
    pub cleanup: CleanupConfig,
    pub courier: CourierConfig,
    pub zones_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            metrics_port: 9090,
            orders: OrderConfig::default(),
            generation: GenerationConfig::default(),
            cleanup: CleanupConfig::default(),
            courier: CourierConfig::default(),
            zones_file: None,
        }
    }
}

/// On-disk zone definition: vertices as `[lat, lng]` pairs.
#[derive(Debug, Deserialize)]
struct ZonesFile {
    allowed: Vec<[f64; 2]>,
    #[serde(default)]
    disallowed: Vec<Vec<[f64; 2]>>,
}

fn ring(vertices: &[[f64; 2]]) -> Vec<Point> {
    vertices.iter().map(|[lat, lng]| Point::new(*lat, *lng)).collect()
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {} value {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, falling back to defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Config::default();

        let config = Config {
            store: StoreConfig {
                backend: parse_or(&lookup, "STORE_BACKEND", d.store.backend)?,
                redis_url: lookup("REDIS_URL").unwrap_or(d.store.redis_url),
            },
            metrics_port: parse_or(&lookup, "METRICS_PORT", d.metrics_port)?,
            orders: OrderConfig {
                min_price: parse_or(&lookup, "ORDER_MIN_PRICE", d.orders.min_price)?,
                max_price: parse_or(&lookup, "ORDER_MAX_PRICE", d.orders.max_price)?,
                min_delivery_price: parse_or(&lookup, "DELIVERY_MIN_PRICE", d.orders.min_delivery_price)?,
                max_delivery_price: parse_or(&lookup, "DELIVERY_MAX_PRICE", d.orders.max_delivery_price)?,
                max_age_secs: parse_or(&lookup, "ORDER_MAX_AGE_SECS", d.orders.max_age_secs)?,
            },
            generation: GenerationConfig {
                interval_ms: parse_or(&lookup, "ORDER_GENERATION_INTERVAL_MS", d.generation.interval_ms)?,
                capacity: parse_or(&lookup, "ORDER_GENERATION_CAPACITY", d.generation.capacity)?,
                cooldown_secs: parse_or(&lookup, "ORDER_GENERATION_COOLDOWN_SECS", d.generation.cooldown_secs)?,
            },
            cleanup: CleanupConfig {
                interval_secs: parse_or(&lookup, "ORDER_CLEANUP_INTERVAL_SECS", d.cleanup.interval_secs)?,
            },
            courier: CourierConfig {
                start: Point::new(
                    parse_or(&lookup, "COURIER_DEFAULT_LAT", d.courier.start.lat)?,
                    parse_or(&lookup, "COURIER_DEFAULT_LNG", d.courier.start.lng)?,
                ),
                visibility_radius: parse_or(&lookup, "COURIER_VISIBILITY_RADIUS", d.courier.visibility_radius)?,
                visibility_unit: parse_or(&lookup, "COURIER_VISIBILITY_UNIT", d.courier.visibility_unit)?,
            },
            zones_file: lookup("ZONES_FILE").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let o = &self.orders;
        if !(o.min_price.is_finite() && o.max_price.is_finite() && o.min_price <= o.max_price) {
            bail!("Order price range [{}, {}] is invalid", o.min_price, o.max_price);
        }
        if !(o.min_delivery_price.is_finite()
            && o.max_delivery_price.is_finite()
            && o.min_delivery_price <= o.max_delivery_price)
        {
            bail!(
                "Delivery price range [{}, {}] is invalid",
                o.min_delivery_price,
                o.max_delivery_price
            );
        }
        if o.max_age_secs == 0 {
            bail!("ORDER_MAX_AGE_SECS must be positive");
        }
        if self.generation.interval_ms == 0 {
            bail!("ORDER_GENERATION_INTERVAL_MS must be positive");
        }
        if self.cleanup.interval_secs == 0 {
            bail!("ORDER_CLEANUP_INTERVAL_SECS must be positive");
        }
        let radius = self.courier.visibility_radius;
        if !(radius.is_finite() && radius > 0.0) {
            bail!("COURIER_VISIBILITY_RADIUS must be a positive number, got {}", radius);
        }
        if !self.courier.start.is_finite() {
            bail!("Courier start position must be finite");
        }
        Ok(())
    }

    pub fn load_zones(&self) -> Result<ZoneSet> {
        match &self.zones_file {
            Some(path) => load_zones_file(path),
            None => Ok(defaults::zone_set()?),
        }
    }
}

fn load_zones_file(path: &Path) -> Result<ZoneSet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read zones file {}", path.display()))?;
    parse_zones(&raw).with_context(|| format!("Invalid zones file {}", path.display()))
}

fn parse_zones(raw: &str) -> Result<ZoneSet> {
    let file: ZonesFile = serde_json::from_str(raw)?;

    let allowed = Zone::allowed(ring(&file.allowed)).context("allowed zone")?;
    let disallowed = file
        .disallowed
        .iter()
        .enumerate()
        .map(|(i, v)| Zone::disallowed(ring(v)).with_context(|| format!("disallowed zone {}", i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ZoneSet::new(allowed, disallowed))
}
