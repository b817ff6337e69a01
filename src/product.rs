//! Product descriptors and the immutable catalog.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::types::{Price, Size, Symbol};

/// How a per-trade fee is computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FeeSchedule {
    /// Flat amount debited per trade.
    Set(f64),
    /// Fraction of the trade's notional (rate × price × size).
    Percentage(f64),
}

impl FeeSchedule {
    /// Fee owed for one trade at the given price and size.
    pub fn amount(&self, price: f64, size: Size) -> f64 {
        match *self {
            FeeSchedule::Set(fee) => fee,
            FeeSchedule::Percentage(rate) => rate * price * size as f64,
        }
    }
}

/// Basket decomposition for a composite product.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    /// Constituent tickers with integer multiplicities.
    pub components: Vec<(Symbol, u64)>,
    /// Flat fee per converted unit.
    pub fee: f64,
}

/// Immutable descriptor for one tradable product.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub ticker: Symbol,
    /// Minimum price variation; every order price must be a multiple.
    pub mpv: Price,
    pub lot_size: u64,
    /// Maximum absolute position before fines apply. `None` = unbounded.
    pub pos_limit: Option<u64>,
    pub min_price: Price,
    pub max_price: Option<Price>,
    /// Per-unit overrun penalty per tick.
    pub fine: f64,
    pub fee: Option<FeeSchedule>,
    pub conversion: Option<Conversion>,
}

impl Product {
    /// A product with the given tick size and permissive defaults.
    pub fn new(ticker: &str, mpv: f64) -> Self {
        Self {
            ticker: Symbol::new(ticker),
            mpv: Price::from_f64(mpv),
            lot_size: 1,
            pos_limit: None,
            min_price: Price::ZERO,
            max_price: None,
            fine: 0.0,
            fee: None,
            conversion: None,
        }
    }

    pub fn with_pos_limit(mut self, limit: u64, fine: f64) -> Self {
        self.pos_limit = Some(limit);
        self.fine = fine;
        self
    }

    pub fn with_price_bounds(mut self, min: f64, max: Option<f64>) -> Self {
        self.min_price = Price::from_f64(min);
        self.max_price = max.map(Price::from_f64);
        self
    }

    pub fn with_fee(mut self, fee: FeeSchedule) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn with_conversion(mut self, components: &[(&str, u64)], fee: f64) -> Self {
        self.conversion = Some(Conversion {
            components: components
                .iter()
                .map(|(t, mult)| (Symbol::new(t), *mult))
                .collect(),
            fee,
        });
        self
    }

    /// True if the price is non-negative, MPV-aligned, and within bounds.
    pub fn accepts_price(&self, price: Price) -> bool {
        price >= Price::ZERO
            && price.is_multiple_of(self.mpv)
            && price >= self.min_price
            && self.max_price.is_none_or(|max| price <= max)
    }
}

/// The full set of products for a run. Built once, never mutated.
#[derive(Clone, Debug)]
pub struct ProductCatalog {
    products: Vec<Product>,
    index: FxHashMap<Symbol, usize>,
}

impl ProductCatalog {
    /// Build a catalog, validating every descriptor.
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, product) in products.iter().enumerate() {
            if product.mpv <= Price::ZERO {
                return Err(Error::InvalidConfig(format!(
                    "{}: mpv must be positive",
                    product.ticker
                )));
            }
            if product.lot_size == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{}: lot_size must be positive",
                    product.ticker
                )));
            }
            if product.fine < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{}: fine must be non-negative",
                    product.ticker
                )));
            }
            if let Some(max) = product.max_price {
                if max < product.min_price {
                    return Err(Error::InvalidConfig(format!(
                        "{}: max_price below min_price",
                        product.ticker
                    )));
                }
            }
            if let Some(FeeSchedule::Set(fee) | FeeSchedule::Percentage(fee)) = product.fee {
                if fee < 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "{}: trade fee must be non-negative",
                        product.ticker
                    )));
                }
            }
            if index.insert(product.ticker, i).is_some() {
                return Err(Error::InvalidConfig(format!(
                    "duplicate ticker {}",
                    product.ticker
                )));
            }
        }
        // Conversion components must themselves be catalog products.
        for product in &products {
            if let Some(conversion) = &product.conversion {
                if conversion.fee < 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "{}: conversion fee must be non-negative",
                        product.ticker
                    )));
                }
                for (component, mult) in &conversion.components {
                    if !index.contains_key(component) {
                        return Err(Error::InvalidConfig(format!(
                            "{}: conversion references unknown ticker {component}",
                            product.ticker
                        )));
                    }
                    if *mult == 0 {
                        return Err(Error::InvalidConfig(format!(
                            "{}: conversion multiplicity for {component} must be positive",
                            product.ticker
                        )));
                    }
                }
            }
        }
        Ok(Self { products, index })
    }

    pub fn get(&self, ticker: Symbol) -> Option<&Product> {
        self.index.get(&ticker).map(|&i| &self.products[i])
    }

    /// Products in configuration order (stable across runs).
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
