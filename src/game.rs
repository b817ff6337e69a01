//! Game: the deterministic tick loop driving agents and the engine.

use crate::agent::Agent;
use crate::engine::Engine;
use crate::message::Message;
use crate::record::GameLog;
use crate::trade::Trade;
use crate::types::Symbol;

/// Width of the order id block handed to each agent at registration, so
/// agents draw from disjoint ranges of the engine-global id space.
pub const ID_BLOCK: u64 = 1_000_000;

/// The simulation driver.
///
/// Agents are registered once and iterated in registration order every
/// tick; given the same agents and horizon, two runs produce identical
/// trades and records.
pub struct Game {
    engine: Engine,
    agents: Vec<Box<dyn Agent>>,
    /// Name of the first agent that produced a tick report.
    player: Option<Symbol>,
    log: GameLog,
    loop_num: u64,
}

impl Game {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            agents: Vec::new(),
            player: None,
            log: GameLog::new(),
            loop_num: 0,
        }
    }

    /// Register an agent and hand it the next order id block.
    pub fn add_agent(&mut self, mut agent: Box<dyn Agent>) {
        agent.set_order_id_base(self.agents.len() as u64 * ID_BLOCK);
        self.agents.push(agent);
    }

    /// Run `ticks` more ticks.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Advance the game by one tick.
    pub fn step(&mut self) {
        // Every agent observes the same start-of-tick book.
        let view = self.engine.snapshot();
        let mut batches: Vec<Vec<Message>> = Vec::with_capacity(self.agents.len());
        for agent in &mut self.agents {
            batches.push(agent.on_book(&view));
        }

        // Messages hit the engine per agent, in the order returned.
        // Per-message failures are logged and skipped; the tick goes on.
        let mut tick_trades: Vec<Trade> = Vec::new();
        for (i, batch) in batches.into_iter().enumerate() {
            for message in batch {
                match message {
                    Message::Order(order) => {
                        match self.engine.submit(order, self.loop_num) {
                            Ok(mut trades) => tick_trades.append(&mut trades),
                            Err(e) => {
                                log::warn!("tick {}: order rejected: {e}", self.loop_num);
                            }
                        }
                    }
                    Message::Remove(order_id) => {
                        if !self.engine.cancel(order_id) {
                            log::debug!("tick {}: cancel missed {order_id}", self.loop_num);
                        }
                    }
                    Message::Conversion(request) => match self.engine.convert(&request) {
                        Ok(outcome) => self.agents[i].on_conversion(&outcome),
                        Err(e) => {
                            log::warn!("tick {}: conversion rejected: {e}", self.loop_num);
                        }
                    },
                }
            }
        }

        // Fan the tick's trades out to everyone.
        for agent in &mut self.agents {
            agent.on_trades(&tick_trades);
        }

        // Bookkeeping and recording against the end-of-tick book.
        let end_view = self.engine.snapshot();
        for agent in &mut self.agents {
            agent.end_of_tick(&end_view);
        }
        self.record_report(&end_view);

        self.log.books.push(end_view);
        self.log.trades.extend(tick_trades);
        self.loop_num += 1;
    }

    fn record_report(&mut self, end_view: &crate::record::BookView) {
        match self.player {
            Some(name) => {
                if let Some(report) = self
                    .agents
                    .iter()
                    .find(|a| a.name() == name)
                    .and_then(|a| a.tick_report(self.loop_num, end_view))
                {
                    self.log.reports.push(report);
                }
            }
            None => {
                for agent in &self.agents {
                    if let Some(report) = agent.tick_report(self.loop_num, end_view) {
                        self.player = Some(agent.name());
                        self.log.reports.push(report);
                        break;
                    }
                }
            }
        }
    }

    // === Queries ===

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    /// The designated player, once one has reported.
    pub fn player(&self) -> Option<Symbol> {
        self.player
    }

    pub fn loop_num(&self) -> u64 {
        self.loop_num
    }

    /// Final mark-to-market PnL of the player, if any.
    pub fn final_pnl(&self) -> Option<f64> {
        self.log.reports.last().map(|r| r.pnl)
    }
}
