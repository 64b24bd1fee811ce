use std::{
    pin::Pin,
    sync::{Arc, Weak}
};

use dashmap::DashMap;
use futures::{stream, Stream, StreamExt};
use itertools::Itertools;
use thiserror::Error;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError}
};
use tracing::{debug, warn};

use crate::{messaging::config::LiveFeedConfig, model::structures::live_update::LiveRatingUpdate};

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("Live feed is disabled")]
    Disabled
}

pub type LiveStream = Pin<Box<dyn Stream<Item = LiveRatingUpdate> + Send>>;

type Channels = DashMap<i32, broadcast::Sender<LiveRatingUpdate>>;

/// Fans live rating updates out to subscribers, one broadcast channel per player.
///
/// Publishing never waits for a subscriber. A subscriber that falls more than `capacity`
/// updates behind loses the oldest ones. A player's channel is created on the first
/// subscription and dropped once its last subscriber is gone.
pub struct LiveUpdatePublisher {
    channels: Arc<Channels>,
    capacity: usize,
    enabled: bool
}

impl LiveUpdatePublisher {
    pub fn new(capacity: usize, enabled: bool) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
            enabled
        }
    }

    pub fn from_config(config: &LiveFeedConfig) -> Self {
        Self::new(config.capacity, config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Updates published after this call, for `player_id` only. Nothing is replayed.
    pub fn subscribe(&self, player_id: i32) -> Result<LiveSubscription, PublisherError> {
        if !self.enabled {
            return Err(PublisherError::Disabled);
        }

        let receiver = self
            .channels
            .entry(player_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        debug!(player_id, "Live subscriber attached");

        Ok(LiveSubscription {
            player_id,
            receiver,
            channels: Arc::downgrade(&self.channels)
        })
    }

    /// One stream carrying the updates of every player in `player_ids`.
    pub fn subscribe_many(&self, player_ids: &[i32]) -> Result<LiveStream, PublisherError> {
        let streams = player_ids
            .iter()
            .unique()
            .map(|id| self.subscribe(*id).map(LiveSubscription::into_stream))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(stream::select_all(streams).boxed())
    }

    /// Returns how many subscribers received the update.
    pub fn publish(&self, update: LiveRatingUpdate) -> Result<usize, PublisherError> {
        if !self.enabled {
            return Err(PublisherError::Disabled);
        }

        let player_id = update.player_id;
        let delivered = match self.channels.get(&player_id) {
            // Only fails when every receiver is gone
            Some(sender) => sender.send(update).unwrap_or(0),
            None => 0
        };

        if delivered == 0 {
            self.channels.remove_if(&player_id, |_, sender| sender.receiver_count() == 0);
        }

        Ok(delivered)
    }

    pub fn subscriber_count(&self, player_id: i32) -> usize {
        self.channels
            .get(&player_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Players that currently have a channel.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

/// Dropping the subscription detaches it. The round being followed is unaffected.
pub struct LiveSubscription {
    player_id: i32,
    receiver: broadcast::Receiver<LiveRatingUpdate>,
    channels: Weak<Channels>
}

impl LiveSubscription {
    pub fn player_id(&self) -> i32 {
        self.player_id
    }

    /// Waits for the next update. `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<LiveRatingUpdate> {
        loop {
            match self.receiver.recv().await {
                Ok(update) => return Some(update),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(player_id = self.player_id, skipped, "Live subscriber fell behind, oldest updates dropped")
                }
                Err(RecvError::Closed) => return None
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<LiveRatingUpdate> {
        loop {
            match self.receiver.try_recv() {
                Ok(update) => return Some(update),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(player_id = self.player_id, skipped, "Live subscriber fell behind, oldest updates dropped")
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None
            }
        }
    }

    pub fn into_stream(self) -> LiveStream {
        stream::unfold(self, |mut subscription| async move {
            subscription.recv().await.map(|update| (update, subscription))
        })
        .boxed()
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        // Our own receiver is still counted here
        if let Some(channels) = self.channels.upgrade() {
            if channels
                .remove_if(&self.player_id, |_, sender| sender.receiver_count() <= 1)
                .is_some()
            {
                debug!(player_id = self.player_id, "Last live subscriber left, channel dropped");
            }
        }
    }
}
