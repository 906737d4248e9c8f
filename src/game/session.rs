//! The table: seats, the live game, chat and the turn clock.
//!
//! Every operation here runs on the single `GameServer` actor, so the table
//! never needs a lock. Effects leave through the [`Gateway`] and the turn
//! timer's scheduler.

use log::{debug, info, warn};

use crate::config::TableConfig;
use crate::error::MoveError;
use crate::game::chat::ChatLog;
use crate::game::rules::{MoveOutcome, RulesEngine, Terminal};
use crate::game::timer::{TimerScheduler, TurnTimer};
use crate::models::{
    Assigned, ClientMessage, EndReason, GameOver, GameState, LastMove, MoveEcho, MoveRequest,
    PlayerNames, Seat, SeatNames, Seats, ServerMessage, Side, StateSnapshot,
};

const MAX_NAME_LEN: usize = 32;
const SPECTATOR_NAME: &str = "Spectator";

/// Outbound delivery to connected viewers
pub trait Gateway {
    fn send_to(&mut self, connection: &str, message: ServerMessage);
    fn broadcast(&mut self, message: ServerMessage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePhase {
    Empty,
    AwaitingSecondPlayer,
    InProgress,
    Ended,
}

pub struct Table<R: RulesEngine, G, S> {
    rules: R,
    gateway: G,
    timer: TurnTimer<S>,
    seats: Seats,
    game: GameState<R::Position>,
    chat: ChatLog,
}

impl<R, G, S> Table<R, G, S>
where
    R: RulesEngine,
    G: Gateway,
    S: TimerScheduler,
{
    pub fn new(rules: R, gateway: G, scheduler: S, config: TableConfig) -> Self {
        let game = GameState::new(rules.initial_position());
        Table {
            rules,
            gateway,
            timer: TurnTimer::new(scheduler, config.turn_budget),
            seats: Seats::default(),
            game,
            chat: ChatLog::new(config.chat_capacity, config.chat_body_limit),
        }
    }

    pub fn phase(&self) -> TablePhase {
        if self.game.ended {
            TablePhase::Ended
        } else if self.game.started {
            TablePhase::InProgress
        } else if self.seats.is_empty() {
            TablePhase::Empty
        } else {
            TablePhase::AwaitingSecondPlayer
        }
    }

    pub fn seats(&self) -> &Seats {
        &self.seats
    }

    pub fn game(&self) -> &GameState<R::Position> {
        &self.game
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn timer(&self) -> &TurnTimer<S> {
        &self.timer
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn handle_message(&mut self, id: &str, message: ClientMessage) {
        match message {
            ClientMessage::Join { name } => self.join(id, &name),
            ClientMessage::Move(request) => self.submit_move(id, request),
            ClientMessage::ChatPost { body } => self.post_chat(id, &body),
            ClientMessage::RequestNewGame => self.request_new_game(id),
        }
    }

    /// Backfills a freshly opened connection with the current table state
    pub fn connect(&mut self, id: &str) {
        self.gateway
            .send_to(id, ServerMessage::ChatHistory(self.chat.snapshot()));
        self.gateway
            .send_to(id, ServerMessage::StateSnapshot(self.snapshot()));
        self.gateway.send_to(
            id,
            ServerMessage::Position(self.rules.encode(&self.game.position)),
        );
        self.gateway
            .send_to(id, ServerMessage::SeatsUpdate(self.seat_names()));
        if let Some(update) = self.timer.status() {
            self.gateway.send_to(id, ServerMessage::TimerUpdate(update));
        }
    }

    pub fn join(&mut self, id: &str, name: &str) {
        let name = clean_name(name);

        if let Some(side) = self.seats.side_of(id) {
            debug!("Connection {} already seated as {}", id, side.name());
            let seated_name = self.seats.display_name(side);
            self.notify_assigned(id, side, seated_name);
        } else if let Some(side) = [Side::White, Side::Black]
            .into_iter()
            .find(|side| !self.seats.get(*side).is_occupied())
        {
            info!("Assigning {} ({}) as {}", name, id, side.name());
            *self.seats.get_mut(side) = Seat::Occupied {
                connection: id.to_string(),
                name: name.clone(),
            };
            self.notify_assigned(id, side, name);

            if self.seats.is_full() {
                self.begin_game();
            }
        } else {
            info!("Table is full, {} ({}) joins as spectator", name, id);
            self.gateway.send_to(id, ServerMessage::Spectator);
        }

        self.broadcast_seats();
    }

    pub fn submit_move(&mut self, id: &str, request: MoveRequest) {
        if self.game.ended {
            debug!("Ignoring move from {}: {}", id, MoveError::GameOver);
            return;
        }

        match self.check_move(id, &request) {
            Ok(outcome) => self.commit_move(request, outcome),
            Err(e) => {
                warn!("Rejected move {}-{} from {}: {}", request.from, request.to, id, e);
                self.gateway
                    .send_to(id, ServerMessage::InvalidMove(MoveEcho::Parsed(request)));
            }
        }
    }

    /// A move frame whose payload could not be read
    pub fn reject_malformed_move(&mut self, id: &str, payload: serde_json::Value) {
        if self.game.ended {
            debug!("Ignoring malformed move from {}: {}", id, MoveError::GameOver);
            return;
        }
        self.gateway
            .send_to(id, ServerMessage::InvalidMove(MoveEcho::Raw(payload)));
    }

    pub fn disconnect(&mut self, id: &str) {
        self.timer.stop();

        if let Some(side) = self.seats.vacate(id) {
            info!("Player {} left the {} seat", id, side.name());

            if self.game.is_in_progress() {
                let winner = side.opponent();
                info!("{} wins by disconnect", winner.name());
                self.game.finish(Some(winner), EndReason::Disconnect);
                self.broadcast_game_over();
            }

            if self.seats.is_empty() {
                info!("Both seats vacant, resetting table");
                self.reset();
            }
        }

        self.broadcast_seats();
    }

    pub fn request_new_game(&mut self, id: &str) {
        if self.seats.side_of(id).is_none() {
            debug!("Ignoring new game request from spectator {}", id);
            return;
        }

        info!("New game requested by {}", id);
        self.reset();
        self.gateway.broadcast(ServerMessage::GameReset);
        if self.seats.is_full() {
            self.begin_game();
        }
    }

    pub fn post_chat(&mut self, id: &str, body: &str) {
        let author = self
            .seats
            .side_of(id)
            .and_then(|side| self.seats.get(side).name())
            .unwrap_or(SPECTATOR_NAME)
            .to_string();
        let message = self.chat.post(&author, id, body);
        self.gateway.broadcast(ServerMessage::ChatMessage(message));
    }

    /// Deferred firing from the turn timer
    pub fn turn_expired(&mut self, generation: u64) {
        if !self.timer.expire(generation) {
            debug!("Dropping stale turn timer {}", generation);
            return;
        }
        if self.game.ended {
            return;
        }

        let loser = self.game.side_to_move;
        info!("{} ran out of time", loser.name());
        self.game.finish(Some(loser.opponent()), EndReason::Timeout);
        self.broadcast_game_over();
    }

    fn check_move(
        &self,
        id: &str,
        request: &MoveRequest,
    ) -> Result<MoveOutcome<R::Position>, MoveError> {
        let side = self.seats.side_of(id).ok_or(MoveError::NotSeated)?;
        if side != self.game.side_to_move {
            return Err(MoveError::NotYourTurn);
        }
        self.rules.apply_move(&self.game.position, request)
    }

    fn commit_move(&mut self, mut request: MoveRequest, outcome: MoveOutcome<R::Position>) {
        self.timer.stop();

        request.from = outcome.from;
        request.to = outcome.to;
        if let Some(piece) = outcome.captured {
            self.game.captured.record(outcome.mover, piece.into());
        }

        self.game.last_move = Some(LastMove {
            from: request.from.clone(),
            to: request.to.clone(),
            piece: outcome.moved_piece,
            color: outcome.mover,
        });
        self.game.position = outcome.position;
        self.game.side_to_move = outcome.side_to_move;
        self.game.in_check = outcome.is_check;

        match outcome.terminal {
            Terminal::Checkmate => {
                info!("Checkmate, {} wins", outcome.mover.name());
                self.game.finish(Some(outcome.mover), EndReason::Checkmate);
            }
            Terminal::Draw => {
                info!("Game drawn");
                self.game.finish(None, EndReason::Draw);
            }
            Terminal::Ongoing => {}
        }

        self.gateway.broadcast(ServerMessage::Move(request));
        self.gateway.broadcast(ServerMessage::Position(
            self.rules.encode(&self.game.position),
        ));
        self.gateway
            .broadcast(ServerMessage::StateSnapshot(self.snapshot()));

        if self.game.ended {
            self.broadcast_game_over();
        } else {
            self.start_turn();
        }
    }

    fn begin_game(&mut self) {
        if self.game.ended {
            info!("Clearing finished game for new pairing");
            self.reset();
            self.gateway.broadcast(ServerMessage::GameReset);
        }

        let names = PlayerNames {
            white: self.seats.display_name(Side::White),
            black: self.seats.display_name(Side::Black),
        };
        info!("Game started: {} vs {}", names.white, names.black);
        self.game.started = true;
        self.gateway.broadcast(ServerMessage::GameStarted(names));
        self.start_turn();
    }

    fn start_turn(&mut self) {
        let update = self.timer.start();
        self.gateway.broadcast(ServerMessage::TimerUpdate(update));
    }

    fn reset(&mut self) {
        self.game = GameState::new(self.rules.initial_position());
        self.chat.clear();
        self.timer.stop();
    }

    fn notify_assigned(&mut self, id: &str, side: Side, name: String) {
        self.gateway.send_to(id, ServerMessage::Role(side));
        self.gateway.send_to(
            id,
            ServerMessage::Assigned(Assigned {
                side: side.name().to_string(),
                name,
            }),
        );
    }

    fn broadcast_game_over(&mut self) {
        let Some(reason) = self.game.end_reason else {
            return;
        };
        let winner = self.game.winner;
        self.gateway.broadcast(ServerMessage::GameOver(GameOver {
            winner: winner.map(|side| side.name().to_string()),
            reason,
            winner_name: winner.map(|side| self.seats.display_name(side)),
        }));
    }

    fn broadcast_seats(&mut self) {
        self.gateway
            .broadcast(ServerMessage::SeatsUpdate(self.seat_names()));
    }

    fn seat_names(&self) -> SeatNames {
        SeatNames {
            white: self.seats.get(Side::White).name().map(str::to_string),
            black: self.seats.get(Side::Black).name().map(str::to_string),
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            last_move: self.game.last_move.clone(),
            captured_pieces: self.game.captured.clone(),
            side_to_move: self.game.side_to_move,
            in_check: self.game.in_check,
            ended: self.game.ended,
        }
    }
}

fn clean_name(name: &str) -> String {
    let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    if name.is_empty() {
        "Anonymous".to_string()
    } else {
        name
    }
}
