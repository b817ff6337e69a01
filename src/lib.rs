//! # pitsim
//!
//! A deterministic multi-product limit order book and trading-game
//! simulator.
//!
//! Agents submit orders and cancellations once per tick; the engine matches
//! them under strict price-time priority and fans executed trades back out,
//! while each agent's ledger tracks positions, cash, position-limit fines,
//! and mark-to-market PnL.
//!
//! ## Quick start
//!
//! ```
//! use pitsim::{Engine, Order, OrderId, Price, Product, ProductCatalog, Side, Symbol};
//!
//! let catalog = ProductCatalog::new(vec![Product::new("UEC", 0.1)]).unwrap();
//! let mut engine = Engine::new(catalog);
//! let uec = Symbol::new("UEC");
//!
//! // A resting ask, then a crossing bid
//! let ask = Order::new(uec, Price::from_f64(100.0), 5, OrderId(1), Side::Sell,
//!     Symbol::new("maker")).unwrap();
//! engine.submit(ask, 0).unwrap();
//!
//! let bid = Order::new(uec, Price::from_f64(100.5), 3, OrderId(2), Side::Buy,
//!     Symbol::new("taker")).unwrap();
//! let trades = engine.submit(bid, 0).unwrap();
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].size, 3);
//! // Maker-price rule: execution at the resting price
//! assert_eq!(trades[0].price, Price::from_f64(100.0));
//! ```
//!
//! ## Running a game
//!
//! ```
//! use pitsim::agent::{PlayerAgent, ScriptedAction, ScriptedAgent};
//! use pitsim::{Engine, Game, Product, ProductCatalog, Side, Symbol};
//!
//! let catalog = ProductCatalog::new(vec![Product::new("UEC", 0.1)]).unwrap();
//! let mut game = Game::new(Engine::new(catalog.clone()));
//!
//! game.add_agent(Box::new(ScriptedAgent::new("maker", &catalog, vec![
//!     (0, ScriptedAction::Quote {
//!         ticker: Symbol::new("UEC"), price: 100.0, size: 5, side: Side::Sell,
//!     }),
//! ])));
//! game.add_agent(Box::new(ScriptedAgent::new("taker", &catalog, vec![
//!     (1, ScriptedAction::Quote {
//!         ticker: Symbol::new("UEC"), price: 100.0, size: 5, side: Side::Buy,
//!     }),
//! ])));
//! game.add_agent(Box::new(PlayerAgent::new("Player", &catalog)));
//!
//! game.run(2);
//!
//! assert_eq!(game.log().trades.len(), 1);
//! assert_eq!(game.final_pnl(), Some(0.0));
//! ```
//!
//! ## Prices
//!
//! Prices are fixed point with four decimal places: [`Price`] wraps the
//! count of 1e-4 units, so every MPV-aligned price is exact and the
//! crossing test needs no epsilon.

pub mod agent;
mod book;
mod book_side;
pub mod config;
mod engine;
mod error;
pub mod export;
mod game;
mod ledger;
mod level;
mod message;
mod order;
mod product;
mod record;
mod side;
mod trade;
mod types;

// Re-export public API
pub use engine::Engine;
pub use error::{Error, Result};
pub use game::{Game, ID_BLOCK};
pub use ledger::{round_to_mpv, Ledger, RoundMode, DEFAULT_MID};
pub use message::{ConversionOutcome, ConversionRequest, Message};
pub use order::{Order, Rest};
pub use product::{Conversion, FeeSchedule, Product, ProductCatalog};
pub use record::{BookView, GameLog, RestView, TickReport, TickerView};
pub use side::Side;
pub use trade::Trade;
pub use types::{OrderId, Position, Price, Size, Symbol, Timestamp};
