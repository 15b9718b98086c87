use crate::state::{AppState, CountdownOutcome, RevealOutcome};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// The two timers driving a running game: the clue reveal cadence and the
/// one-second display countdown. Both carry the epoch they were started
/// with, so a tick that outlives its game is a no-op.
#[derive(Debug)]
pub struct ClueScheduler {
    epoch: u64,
    reveal: JoinHandle<()>,
    countdown: JoinHandle<()>,
}

impl ClueScheduler {
    /// Spawn both timers. The first clue is revealed by the caller, so the
    /// reveal timer first fires one full period from now.
    pub fn spawn(state: AppState, epoch: u64, period: Duration) -> Self {
        let reveal_state = state.clone();
        let reveal = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match reveal_state.reveal_next_clue(epoch).await {
                    RevealOutcome::Revealed { .. } => {}
                    RevealOutcome::Finished { .. } | RevealOutcome::Stale => break,
                }
            }
            tracing::debug!("Reveal timer for epoch {} stopped", epoch);
        });

        let countdown = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + COUNTDOWN_PERIOD, COUNTDOWN_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if state.tick_countdown(epoch).await == CountdownOutcome::Stale {
                    break;
                }
            }
        });

        Self {
            epoch,
            reveal,
            countdown,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Abort both timers
    pub fn cancel(self) {
        self.reveal.abort();
        self.countdown.abort();
    }
}
