//! Round resolution: pick a loser and split their bet among the winners.
//!
//! [`settle`] is the pure payout math over a bet snapshot. The
//! crate-private `resolve_round` wraps it: snapshot the room's declared
//! bets, ask the injected [`LoserSelector`] for a loser, settle, then
//! apply balances and results to the room.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tenpercent_protocol::{LooseNumber, PlayerId, Precision, RoundOutcome};

use crate::{GameConfig, Room, RoomError};

// ---------------------------------------------------------------------------
// Loser selection
// ---------------------------------------------------------------------------

/// Chooses a round's loser.
///
/// Injected into the [`Lobby`](crate::Lobby) so tests can script
/// outcomes. Implementations must return an index into `candidates`,
/// which always holds at least two players.
pub trait LoserSelector: Send + 'static {
    /// Index of the loser within `candidates`.
    fn select(&mut self, candidates: &[PlayerId]) -> usize;
}

impl<S: LoserSelector + ?Sized> LoserSelector for Box<S> {
    fn select(&mut self, candidates: &[PlayerId]) -> usize {
        (**self).select(candidates)
    }
}

/// Uniform choice over all candidates.
///
/// Every player has probability `1/n` whatever their id; the candidate
/// order only decides which index maps to which player.
#[derive(Debug)]
pub struct UniformSelector {
    rng: StdRng,
}

impl UniformSelector {
    /// Seeds from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformSelector {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl LoserSelector for UniformSelector {
    fn select(&mut self, candidates: &[PlayerId]) -> usize {
        self.rng.random_range(0..candidates.len())
    }
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Outcome of one round, before it is applied to a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub loser: PlayerId,
    /// Sum of every snapshotted bet.
    pub pot: f64,
    /// One entry per player, in bet-snapshot order.
    pub outcomes: Vec<(PlayerId, RoundOutcome)>,
}

impl Settlement {
    /// Sum of all deltas; zero up to share rounding.
    pub fn net(&self) -> f64 {
        self.outcomes.iter().map(|(_, o)| o.delta).sum()
    }
}

/// Computes payouts for `bets` with `bets[loser_index]` losing.
///
/// The loser pays exactly their bet. Each winner receives
/// `bet / others_total * loser_bet`, rounded to [`Precision::Share`];
/// when the other bets sum to zero every winner receives 0.
///
/// # Errors
/// [`RoomError::InvalidState`] for fewer than two bets or an out-of-range
/// loser index.
pub fn settle(bets: &[(PlayerId, f64)], loser_index: usize) -> Result<Settlement, RoomError> {
    if bets.len() < 2 {
        return Err(RoomError::InvalidState(format!(
            "settlement needs at least two bets, got {}",
            bets.len()
        )));
    }
    let &(loser, loser_bet) = bets.get(loser_index).ok_or_else(|| {
        RoomError::InvalidState(format!(
            "loser index {loser_index} out of range for {} players",
            bets.len()
        ))
    })?;

    let pot: f64 = bets.iter().map(|(_, bet)| bet).sum();
    let others_total = pot - loser_bet;
    let others_count = (bets.len() - 1) as f64;

    let outcomes = bets
        .iter()
        .enumerate()
        .map(|(i, &(player_id, bet))| {
            let avg_others = Precision::Average.apply((pot - bet) / others_count);
            let outcome = if i == loser_index {
                RoundOutcome {
                    win: false,
                    delta: -loser_bet,
                    last_bet: bet,
                    avg_others,
                }
            } else {
                let share = if others_total > 0.0 {
                    Precision::Share.apply(bet / others_total * loser_bet)
                } else {
                    0.0
                };
                RoundOutcome {
                    win: true,
                    delta: share,
                    last_bet: bet,
                    avg_others,
                }
            };
            (player_id, outcome)
        })
        .collect();

    Ok(Settlement {
        loser,
        pot,
        outcomes,
    })
}

// ---------------------------------------------------------------------------
// Applying a round to a room
// ---------------------------------------------------------------------------

/// What [`resolve_round`] reports back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RoundReport {
    pub(crate) round_index: u64,
    pub(crate) loser: PlayerId,
    pub(crate) pot: f64,
}

/// Every player's declared bet, re-coerced into the configured range.
/// The only input to payout math; later bet changes can't reach it.
pub(crate) fn snapshot_bets(room: &Room, config: &GameConfig) -> Vec<(PlayerId, f64)> {
    room.players()
        .iter()
        .map(|(id, player)| (*id, config.sanitize_bet(LooseNumber(Some(player.declared_bet)))))
        .collect()
}

/// Resolves one round in `room`.
pub(crate) fn resolve_round(
    room: &mut Room,
    selector: &mut dyn LoserSelector,
    config: &GameConfig,
) -> Result<RoundReport, RoomError> {
    let have = room.player_count();
    if have < config.min_players {
        return Err(RoomError::InsufficientPlayers {
            room_id: room.id().clone(),
            have,
            required: config.min_players,
        });
    }

    let bets = snapshot_bets(room, config);
    let candidates: Vec<PlayerId> = bets.iter().map(|(id, _)| *id).collect();
    let settlement = settle(&bets, selector.select(&candidates))?;

    for (player_id, outcome) in &settlement.outcomes {
        if let Some(player) = room.player_mut(*player_id) {
            player.balance += outcome.delta;
            player.last_result = Some(*outcome);
        }
    }
    room.round_counter += 1;

    Ok(RoundReport {
        round_index: room.round_counter,
        loser: settlement.loser,
        pot: settlement.pot,
    })
}
