//! Whole-game tests: conservation, determinism, and the export surface.

use pitsim::agent::{PlayerAgent, ScriptedAction, ScriptedAgent};
use pitsim::{
    export, Engine, Game, GameLog, Ledger, Product, ProductCatalog, Side, Symbol,
};

fn catalog() -> ProductCatalog {
    ProductCatalog::new(vec![Product::new("UEC", 0.1), Product::new("QFIN", 0.5)]).unwrap()
}

fn quote(tick: u64, ticker: &str, price: f64, size: u64, side: Side) -> (u64, ScriptedAction) {
    (
        tick,
        ScriptedAction::Quote {
            ticker: Symbol::new(ticker),
            price,
            size,
            side,
        },
    )
}

/// A small deterministic market: a re-quoting maker and a crosser that
/// alternates sides.
fn build_game(catalog: &ProductCatalog, player: &str) -> Game {
    let mut maker_script = Vec::new();
    let mut crosser_script = Vec::new();
    for tick in 0..20 {
        if tick % 5 == 0 {
            if tick > 0 {
                maker_script.push((tick, ScriptedAction::CancelAll));
            }
            maker_script.push(quote(tick, "UEC", 999.5, 20, Side::Buy));
            maker_script.push(quote(tick, "UEC", 1000.5, 20, Side::Sell));
            maker_script.push(quote(tick, "QFIN", 499.5, 10, Side::Buy));
            maker_script.push(quote(tick, "QFIN", 500.5, 10, Side::Sell));
        }
        if tick % 4 == 1 {
            let side = if tick % 8 == 1 { Side::Buy } else { Side::Sell };
            let price = if side == Side::Buy { 1000.5 } else { 999.5 };
            crosser_script.push(quote(tick, "UEC", price, 5, side));
        }
    }

    let mut game = Game::new(Engine::new(catalog.clone()));
    game.add_agent(Box::new(ScriptedAgent::new("maker", catalog, maker_script)));
    game.add_agent(Box::new(ScriptedAgent::new(
        "crosser",
        catalog,
        crosser_script,
    )));
    game.add_agent(Box::new(PlayerAgent::new(player, catalog)));
    game
}

#[test]
fn market_produces_trades() {
    let catalog = catalog();
    let mut game = build_game(&catalog, "Player");
    game.run(20);

    assert!(!game.log().trades.is_empty());
    assert_eq!(game.log().books.len(), 20);
    assert_eq!(game.log().reports.len(), 20);
}

#[test]
fn cash_and_inventory_are_conserved() {
    let catalog = catalog();
    let mut game = build_game(&catalog, "Player");
    game.run(20);

    // Rebuild both counterparties' accounts from the trade log alone; with
    // no fees configured, the market is zero-sum.
    let mut maker = Ledger::new(Symbol::new("maker"), &catalog);
    let mut crosser = Ledger::new(Symbol::new("crosser"), &catalog);
    maker.apply_trades(&game.log().trades);
    crosser.apply_trades(&game.log().trades);

    assert!((maker.cash() + crosser.cash()).abs() < 1e-6);
    for ticker in ["UEC", "QFIN"] {
        assert_eq!(
            maker.position(Symbol::new(ticker)) + crosser.position(Symbol::new(ticker)),
            0,
            "inventory imbalance in {ticker}"
        );
    }
}

#[test]
fn no_self_cross_after_any_tick() {
    let catalog = catalog();
    let mut game = build_game(&catalog, "Player");

    for _ in 0..20 {
        game.step();
        for tv in game.engine().snapshot().iter() {
            if let (Some(bid), Some(ask)) = (tv.bids.first(), tv.asks.first()) {
                assert!(
                    bid.price < ask.price,
                    "{}: book crossed at {} / {}",
                    tv.ticker,
                    bid.price,
                    ask.price
                );
            }
        }
    }
}

#[test]
fn identical_runs_produce_identical_artifacts() {
    let catalog = catalog();

    let run = |dir: &std::path::Path| -> GameLog {
        let mut game = build_game(&catalog, "Player");
        game.run(20);
        export::export_game(game.log(), &catalog, game.player().unwrap(), dir).unwrap();
        game.log().clone()
    };

    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let log_a = run(dir_a.path());
    let log_b = run(dir_b.path());

    assert_eq!(log_a.trades, log_b.trades);

    for file in [
        export::GAME_RECORD_FILE,
        export::ORDERBOOK_FILE,
        export::TRADES_FILE,
    ] {
        let a = std::fs::read_to_string(dir_a.path().join(file)).unwrap();
        let b = std::fs::read_to_string(dir_b.path().join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between identical runs");
    }
}

#[test]
fn export_schemas_and_anonymization() {
    let catalog = catalog();
    let mut game = build_game(&catalog, "Player");
    game.run(20);

    let dir = tempfile::tempdir().unwrap();
    export::export_game(game.log(), &catalog, game.player().unwrap(), dir.path()).unwrap();

    let record = std::fs::read_to_string(dir.path().join(export::GAME_RECORD_FILE)).unwrap();
    let mut lines = record.lines();
    assert_eq!(
        lines.next().unwrap(),
        "timestamp,Loop,Player_UEC,Player_QFIN,Player_Cash,Player_PnL,UEC,QFIN"
    );
    assert_eq!(record.lines().count(), 21); // header + one row per tick

    let orderbook = std::fs::read_to_string(dir.path().join(export::ORDERBOOK_FILE)).unwrap();
    let mut lines = orderbook.lines();
    assert_eq!(
        lines.next().unwrap(),
        "timestamp,ticker,side,price,size,bot_name"
    );
    assert!(orderbook.contains("ANONYMOUS"));
    assert!(!orderbook.contains("maker"));
    assert!(!orderbook.contains("crosser"));

    let trades = std::fs::read_to_string(dir.path().join(export::TRADES_FILE)).unwrap();
    let mut lines = trades.lines();
    assert_eq!(
        lines.next().unwrap(),
        "timestamp,ticker,price,size,side,agg_bot,rest_bot"
    );
    let row = lines.next().unwrap();
    assert!(row.contains("ANONYMOUS"));
    assert!(row.ends_with("ANONYMOUS,ANONYMOUS"));
}

#[test]
fn player_report_marks_to_market() {
    let catalog = ProductCatalog::new(vec![Product::new("UEC", 0.1)]).unwrap();

    let mut game = Game::new(Engine::new(catalog.clone()));
    // Maker quotes both sides; the player lifts the ask through a script
    // registered under the player's own name.
    game.add_agent(Box::new(ScriptedAgent::new(
        "maker",
        &catalog,
        vec![
            quote(0, "UEC", 999.5, 20, Side::Buy),
            quote(0, "UEC", 1000.5, 20, Side::Sell),
        ],
    )));
    game.add_agent(Box::new(ScriptedAgent::new(
        "Player",
        &catalog,
        vec![quote(1, "UEC", 1000.5, 5, Side::Buy)],
    )));
    game.add_agent(Box::new(PlayerAgent::new("Player", &catalog)));

    game.run(3);

    // The tracked PlayerAgent shares the name, so it booked the trade too.
    assert_eq!(game.log().trades.len(), 1);
    let report = game.log().reports.last().unwrap();
    assert_eq!(report.positions, vec![(Symbol::new("UEC"), 5)]);
    assert!((report.cash + 5.0 * 1000.5).abs() < 1e-9);
    // Mid after the trade: bid 999.5, ask 1000.5 (15 left) -> 1000.0
    assert!((report.pnl - (5.0 * 1000.0 - 5.0 * 1000.5)).abs() < 1e-9);
}

#[test]
fn conversions_adjust_only_the_requester() {
    let catalog = ProductCatalog::new(vec![
        Product::new("UEC", 0.1),
        Product::new("ETF", 0.1).with_conversion(&[("UEC", 2)], 0.25),
    ])
    .unwrap();

    let mut game = Game::new(Engine::new(catalog.clone()));
    game.add_agent(Box::new(ScriptedAgent::new(
        "converter",
        &catalog,
        vec![(
            0,
            ScriptedAction::Convert {
                ticker: Symbol::new("ETF"),
                size: 3,
                side: Side::Buy,
            },
        )],
    )));
    game.add_agent(Box::new(PlayerAgent::new("Player", &catalog)));

    game.run(1);

    // No book activity, no trades; the player saw nothing.
    assert!(game.log().trades.is_empty());
    let report = game.log().reports.last().unwrap();
    assert_eq!(report.positions, vec![
        (Symbol::new("UEC"), 0),
        (Symbol::new("ETF"), 0),
    ]);
    assert_eq!(report.cash, 0.0);
}
