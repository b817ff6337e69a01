//! TOML configuration: game settings and product descriptors.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::product::{Conversion, FeeSchedule, Product, ProductCatalog};
use crate::types::{Price, Symbol};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    pub products: Vec<ProductConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Tick horizon of the run.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Name of the tracked player.
    #[serde(default = "default_player")]
    pub player: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            player: default_player(),
        }
    }
}

fn default_ticks() -> u64 {
    500
}

fn default_player() -> String {
    "Player".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    pub ticker: String,
    #[serde(default = "default_mpv")]
    pub mpv: f64,
    #[serde(default = "default_lot_size")]
    pub lot_size: u64,
    pub pos_limit: Option<u64>,
    #[serde(default)]
    pub min_price: f64,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub fine: f64,
    pub trade_fee: Option<f64>,
    pub fee_type: Option<String>,
    /// Constituent tickers with integer multiplicities.
    pub conversions: Option<BTreeMap<String, u64>>,
    pub conversion_fee: Option<f64>,
}

fn default_mpv() -> f64 {
    1.0
}

fn default_lot_size() -> u64 {
    1
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants not expressible in the schema.
    pub fn validate(&self) -> Result<()> {
        if self.game.ticks == 0 {
            return Err(Error::InvalidConfig("ticks must be > 0".into()));
        }
        if Symbol::try_new(&self.game.player).is_none() {
            return Err(Error::InvalidConfig(format!(
                "player name {:?} must be short ASCII",
                self.game.player
            )));
        }
        if self.products.is_empty() {
            return Err(Error::InvalidConfig("at least one product required".into()));
        }
        for product in &self.products {
            if Symbol::try_new(&product.ticker).is_none() {
                return Err(Error::InvalidConfig(format!(
                    "ticker {:?} must be short ASCII",
                    product.ticker
                )));
            }
            if product.trade_fee.is_some() {
                match product.fee_type.as_deref() {
                    Some("SetFee") | Some("PercentageFee") => {}
                    other => {
                        return Err(Error::InvalidConfig(format!(
                            "{}: fee_type must be SetFee or PercentageFee, got {other:?}",
                            product.ticker
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Build the immutable product catalog.
    pub fn catalog(&self) -> Result<ProductCatalog> {
        let products = self
            .products
            .iter()
            .map(|p| self.build_product(p))
            .collect::<Result<Vec<_>>>()?;
        ProductCatalog::new(products)
    }

    fn build_product(&self, config: &ProductConfig) -> Result<Product> {
        let ticker = Symbol::try_new(&config.ticker)
            .ok_or_else(|| Error::InvalidConfig(format!("bad ticker {:?}", config.ticker)))?;

        let fee = match (config.trade_fee, config.fee_type.as_deref()) {
            (Some(fee), Some("SetFee")) => Some(FeeSchedule::Set(fee)),
            (Some(fee), Some("PercentageFee")) => Some(FeeSchedule::Percentage(fee)),
            (Some(_), other) => {
                return Err(Error::InvalidConfig(format!(
                    "{}: fee_type must be SetFee or PercentageFee, got {other:?}",
                    config.ticker
                )));
            }
            (None, _) => None,
        };

        let conversion = match &config.conversions {
            Some(components) => {
                let components = components
                    .iter()
                    .map(|(t, mult)| {
                        Symbol::try_new(t)
                            .map(|sym| (sym, *mult))
                            .ok_or_else(|| {
                                Error::InvalidConfig(format!(
                                    "{}: bad conversion ticker {t:?}",
                                    config.ticker
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Some(Conversion {
                    components,
                    fee: config.conversion_fee.unwrap_or(0.0),
                })
            }
            None => None,
        };

        Ok(Product {
            ticker,
            mpv: Price::from_f64(config.mpv),
            lot_size: config.lot_size,
            pos_limit: config.pos_limit,
            min_price: Price::from_f64(config.min_price),
            max_price: config.max_price.map(Price::from_f64),
            fine: config.fine,
            fee,
            conversion,
        })
    }
}
