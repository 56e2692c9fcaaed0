//! Engine facade - creates matches and routes actions to them
//!
//! Creation is two-phase: the match task is spawned waiting on a start signal, its handle
//! is inserted in the registry, and only then is the signal sent. A cleanup task removes
//! the handle once the match task reports done.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

use tetromatch_core::types::{MatchAction, MatchMode};

use crate::config::{EngineConfig, MatchConfig};
use crate::dispatch::{ActionOutcome, Dispatcher};
use crate::error::EngineError;
use crate::event::EventSink;
use crate::link::{PairingLink, Side};
use crate::registry::{MatchHandle, MatchId, Registry};
use crate::runtime::{Command, MatchTask};
use crate::session::Match;

pub struct Engine {
    config: EngineConfig,
    registry: Arc<Registry>,
    dispatcher: Dispatcher,
    sink: Arc<dyn EventSink>,
}

impl Engine {
    pub fn new(config: EngineConfig, sink: impl EventSink + 'static) -> Self {
        Self::with_sink(config, Arc::new(sink))
    }

    pub fn with_sink(config: EngineConfig, sink: Arc<dyn EventSink>) -> Self {
        let registry = Arc::new(Registry::new());
        Self {
            config,
            dispatcher: Dispatcher::new(Arc::clone(&registry)),
            registry,
            sink,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Create a solo or open match
    pub async fn create_match(&self, config: MatchConfig) -> Result<MatchId, EngineError> {
        config.validate()?;
        if config.mode == MatchMode::Paired {
            return Err(EngineError::InvalidConfig(
                "paired matches are created two at a time".to_string(),
            ));
        }

        let id = self.registry.allocate();
        let start_delay = self.config.start_delay_for(&config);
        let session = Match::new(id, config, self.config.gravity, self.seed_for(id))?;
        let (tx, rx) = mpsc::unbounded_channel();

        let start = self.register(session, tx, rx, None, start_delay).await;
        let _ = start.send(());
        Ok(id)
    }

    /// Create two matches coupled by a pairing link
    ///
    /// Both sides share a seed so they see the same piece sequence, and neither starts
    /// before both are registered.
    pub async fn create_paired_matches(
        &self,
        a: MatchConfig,
        b: MatchConfig,
    ) -> Result<(MatchId, MatchId), EngineError> {
        a.validate()?;
        b.validate()?;
        if a.mode != MatchMode::Paired || b.mode != MatchMode::Paired {
            return Err(EngineError::InvalidConfig(
                "both sides must be paired matches".to_string(),
            ));
        }
        if a.pair_id != b.pair_id {
            return Err(EngineError::InvalidConfig(
                "both sides must share a pair id".to_string(),
            ));
        }
        if a.player == b.player {
            return Err(EngineError::InvalidConfig(
                "a player cannot be paired with themselves".to_string(),
            ));
        }

        let id_a = self.registry.allocate();
        let id_b = self.registry.allocate();
        let seed = self.seed_for(id_a);
        let delay_a = self.config.start_delay_for(&a);
        let delay_b = self.config.start_delay_for(&b);
        let pair_id = a.pair_id.clone().unwrap_or_default();
        let players = [a.player.clone(), b.player.clone()];

        let session_a = Match::new(id_a, a, self.config.gravity, seed)?;
        let session_b = Match::new(id_b, b, self.config.gravity, seed)?;
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();

        let link = Arc::new(PairingLink::new(
            pair_id.clone(),
            players,
            [tx_a.downgrade(), tx_b.downgrade()],
            Arc::clone(&self.sink),
        ));

        let start_a = self
            .register(session_a, tx_a, rx_a, Some((Arc::clone(&link), Side::A)), delay_a)
            .await;
        let start_b = self
            .register(session_b, tx_b, rx_b, Some((link, Side::B)), delay_b)
            .await;
        let _ = start_a.send(());
        let _ = start_b.send(());

        log::info!("[pair {}] created matches {} and {}", pair_id, id_a, id_b);
        Ok((id_a, id_b))
    }

    pub async fn submit(
        &self,
        id: MatchId,
        player: &str,
        action: MatchAction,
    ) -> Result<ActionOutcome, EngineError> {
        self.dispatcher.submit(id, player, action).await
    }

    pub async fn submit_raw(
        &self,
        id: MatchId,
        player: &str,
        raw_action: &str,
    ) -> Result<ActionOutcome, EngineError> {
        self.dispatcher.submit_raw(id, player, raw_action).await
    }

    /// Whether `id` is still live (not yet removed)
    pub async fn contains(&self, id: MatchId) -> bool {
        self.registry.contains(id).await
    }

    pub async fn match_count(&self) -> usize {
        self.registry.len().await
    }

    /// Spawn the task in pending state and insert its handle; returns the start signal
    pub(crate) async fn register(
        &self,
        session: Match,
        tx: UnboundedSender<Command>,
        rx: UnboundedReceiver<Command>,
        link: Option<(Arc<PairingLink>, Side)>,
        start_delay: std::time::Duration,
    ) -> oneshot::Sender<()> {
        let id = session.id();
        let handle = MatchHandle {
            id,
            player: session.config().player.clone(),
            mode: session.config().mode,
            tx,
        };
        let (start_tx, start_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();

        let task = MatchTask::new(session, rx, link, Arc::clone(&self.sink), start_delay);
        tokio::spawn(task.run(start_rx, done_tx));
        self.registry.insert(handle).await;

        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            let _ = done_rx.await;
            if let Some(handle) = registry.remove(id).await {
                log::info!(
                    "[engine] {:?} match {} of {} cleaned up",
                    handle.mode,
                    id,
                    handle.player
                );
            }
        });

        log::debug!("[engine] created match {}", id);
        start_tx
    }

    fn seed_for(&self, id: MatchId) -> u32 {
        let salt = (id.raw() as u32).wrapping_mul(0x9e37_79b9);
        match self.config.seed {
            Some(seed) => seed.wrapping_add(salt),
            None => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                    .unwrap_or(1);
                now ^ salt
            }
        }
    }
}
