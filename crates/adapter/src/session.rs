//! One game session: an Engine plus the policy around it.
//!
//! The core never decides when the game ends. The session does: a raise that
//! leaves anything in row 0 ends the game, after which board commands are
//! refused until `restart`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::BoardConfig;
use crate::core::Engine;
use crate::protocol::{
    build_observation, create_ack, create_error, current_timestamp_ms, CommandAction, ErrorCode,
    ObservationMessage, OutcomeMessage, RaisedMessage, ServerMessage, WireMove, WireResult,
};
use crate::types::{Cell, EMPTY};

pub struct Session {
    engine: Engine,
    board: BoardConfig,
    seed: u64,
    game_over: bool,
    games: u32,
}

impl Session {
    pub fn new(board: BoardConfig) -> anyhow::Result<Self> {
        board.validate()?;
        let seed = board.seed;
        let engine = seeded_engine(&board, seed)?;
        Ok(Self {
            engine,
            board,
            seed,
            game_over: false,
            games: 1,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn observation(&self, seq: u64) -> ObservationMessage {
        build_observation(seq, &self.engine.snapshot(), self.game_over)
    }

    /// Apply one client command and build its reply.
    pub fn handle(&mut self, seq: u64, action: CommandAction) -> ServerMessage {
        let mutates_board = !matches!(action, CommandAction::Observe | CommandAction::Restart);
        if self.game_over && mutates_board {
            return create_error(seq, ErrorCode::GameOver, "Game over; send restart");
        }

        match action {
            CommandAction::Dig { row, col } => {
                let result = self.engine.dig(row, col);
                self.outcome(seq, WireResult::from(&result))
            }
            CommandAction::Place { row, col, color } => {
                let result = self.engine.place(row, col, color);
                self.outcome(seq, WireResult::from(&result))
            }
            CommandAction::Raise => ServerMessage::Raised(self.raise(seq)),
            CommandAction::InitColors => {
                self.engine.initialize_colors();
                create_ack(seq)
            }
            CommandAction::RefreshColors => {
                self.engine.refresh_colors();
                create_ack(seq)
            }
            CommandAction::Observe => ServerMessage::Observation(self.observation(seq)),
            CommandAction::Restart => match self.restart() {
                Ok(()) => ServerMessage::Observation(self.observation(seq)),
                Err(e) => create_error(seq, ErrorCode::InvalidCommand, &e.to_string()),
            },
        }
    }

    /// Raise one row and apply the overflow rule.
    pub fn raise(&mut self, seq: u64) -> RaisedMessage {
        let moves = self.engine.raise_one_row();
        let overflow = self.engine.top_row_occupied();
        if overflow && !self.game_over {
            self.game_over = true;
            info!(
                total_score = self.engine.total_score(),
                game = self.games,
                "game over: board reached the top row"
            );
        }
        RaisedMessage {
            seq,
            ts: current_timestamp_ms(),
            moves: moves.iter().map(WireMove::from).collect(),
            overflow,
            observation: self.observation(seq),
        }
    }

    /// Start a new game on a board seeded from the next seed.
    pub fn restart(&mut self) -> anyhow::Result<()> {
        let seed = self.seed.wrapping_add(1);
        self.engine = seeded_engine(&self.board, seed)?;
        self.seed = seed;
        self.game_over = false;
        self.games += 1;
        info!(seed, game = self.games, "session restarted");
        Ok(())
    }

    fn outcome(&self, seq: u64, result: WireResult) -> ServerMessage {
        ServerMessage::Outcome(OutcomeMessage {
            seq,
            ts: current_timestamp_ms(),
            result,
            observation: self.observation(seq),
        })
    }
}

/// Empty board with `filled_rows` random bottom rows, queue ready to play.
fn seeded_engine(board: &BoardConfig, seed: u64) -> anyhow::Result<Engine> {
    let rows = seed_rows(board, seed);
    let mut engine = Engine::from_rows(&rows, board.rules, seed)?;
    engine.refresh_colors();
    engine.initialize_colors();
    Ok(engine)
}

fn seed_rows(board: &BoardConfig, seed: u64) -> Vec<Vec<Cell>> {
    // Board fill uses its own stream so the queue's picks stay independent of it.
    let mut rng = StdRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
    let empty_rows = board.height.saturating_sub(board.filled_rows);
    (0..board.height)
        .map(|row| {
            if row < empty_rows {
                vec![EMPTY; board.width]
            } else {
                (0..board.width)
                    .map(|_| rng.gen_range(1..=board.colors))
                    .collect()
            }
        })
        .collect()
}
