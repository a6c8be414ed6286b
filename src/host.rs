//! Headless host - owns one running game and serves adapter commands
//!
//! The host is the single owner of the current board. Commands arrive one at
//! a time from the adapter queue and are applied in order, so moves on the
//! game are never interleaved.

use tracing::{debug, info};

use crate::adapter::protocol::{build_observation, create_ack, create_error, ErrorCode};
use crate::adapter::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::core::{EngineError, GameState};
use crate::types::GameAction;

/// Host configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// Seed of the first episode
    pub seed: u64,
}

impl HostConfig {
    /// Read `TILES2048_SEED`; falls back to a time-based seed
    pub fn from_env() -> Self {
        let seed = std::env::var("TILES2048_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_else(time_seed);
        Self { seed }
    }
}

fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

/// Game owner driven by adapter commands
#[derive(Debug, Clone)]
pub struct Host {
    game: GameState,
    /// Sequence number of the last observation sent
    obs_seq: u64,
}

impl Host {
    pub fn new(config: HostConfig) -> Self {
        info!(seed = config.seed, "new game");
        Self {
            game: GameState::new(config.seed),
            obs_seq: 0,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    fn next_obs_seq(&mut self) -> u64 {
        self.obs_seq += 1;
        self.obs_seq
    }

    /// Apply one inbound message and return the replies to deliver, in order.
    pub fn handle(&mut self, inbound: InboundCommand) -> Vec<OutboundMessage> {
        let client_id = inbound.client_id;
        match inbound.payload {
            InboundPayload::SnapshotRequest => {
                let seq = self.next_obs_seq();
                let obs = build_observation(&self.game.snapshot(), seq, None);
                vec![OutboundMessage::ToClientObservation { client_id, obs }]
            }
            InboundPayload::Command(cmd) => self.handle_command(client_id, inbound.seq, cmd),
        }
    }

    fn handle_command(
        &mut self,
        client_id: usize,
        seq: u64,
        cmd: ClientCommand,
    ) -> Vec<OutboundMessage> {
        let mut out = Vec::with_capacity(2);
        let mut updated = false;
        let mut rejected: Option<EngineError> = None;

        for action in cmd.actions {
            match action {
                GameAction::Move(direction) => match self.game.try_apply_move(direction) {
                    Ok(changed) => updated |= changed,
                    Err(e) => {
                        rejected = Some(e);
                        break;
                    }
                },
                GameAction::Restart => {
                    self.game.restart();
                    info!(
                        episode_id = self.game.episode_id(),
                        seed = self.game.seed(),
                        "game restarted"
                    );
                    updated = true;
                }
            }
        }

        match rejected {
            None => out.push(OutboundMessage::ToClientAck {
                client_id,
                ack: create_ack(seq),
            }),
            Some(e) => {
                debug!(client_id, seq, error = %e, "move rejected");
                out.push(OutboundMessage::ToClientError {
                    client_id,
                    err: create_error(seq, ErrorCode::GameFinished, &e.to_string()),
                });
            }
        }

        let last_event = self.game.take_last_event();
        if updated {
            let status = self.game.status();
            if status.is_terminal() {
                info!(%status, score = self.game.score(), "game finished");
            }
            let obs_seq = self.next_obs_seq();
            let obs = build_observation(&self.game.snapshot(), obs_seq, last_event);
            out.push(OutboundMessage::BroadcastObservation { obs });
        }

        out
    }
}
