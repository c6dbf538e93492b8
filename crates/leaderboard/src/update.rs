use std::sync::Arc;

use chrono::TimeDelta;
use rust_decimal::Decimal;
use storage::{DisplayNameStore, ImageQueueStore, LeaderboardStore};
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::codec::{self, SNAPSHOT_SENTINEL, parse_decimal};
use crate::command::{self, CommandError, Symbol};
use crate::event::{ImageSet, MessageEvent, MessageKind};
use crate::month::MonthPolicy;
use crate::registry::{NameChange, NameRegistry, name_set_message};
use crate::traits::DistanceExtractor;

/// Title of a leaderboard created implicitly by the first distance update.
pub const DEFAULT_TITLE: &str = "===Running Challenge===";

/// How long intermediate images of a set wait for the last one.
pub const IMAGE_QUEUE_TTL_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    LeaderboardInit,
    DistanceUpdate(Symbol),
    SingleImage,
    ImagePart,
    Ignored,
}

/// Decide what kind of command a message carries, from its content alone.
pub fn classify(message: &MessageKind) -> Classification {
    match message {
        MessageKind::Text(text) => {
            let text = text.trim();
            if text.starts_with(SNAPSHOT_SENTINEL) {
                Classification::LeaderboardInit
            } else if let Some(symbol) = command::detect_symbol(text) {
                Classification::DistanceUpdate(symbol)
            } else {
                Classification::Ignored
            }
        }
        MessageKind::Image(_) => Classification::SingleImage,
        MessageKind::ImagePart { .. } => Classification::ImagePart,
        MessageKind::Unsupported => Classification::Ignored,
    }
}

/// Replies produced for one event of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReplies {
    pub reply_token: String,
    pub messages: Vec<String>,
}

/// Turns chat messages into leaderboard writes and reply texts.
///
/// Snapshot updates are read-modify-write without locking; two deliveries for
/// the same conversation processed concurrently can lose one update.
pub struct UpdateEngine {
    leaderboards: Arc<dyn LeaderboardStore>,
    image_queue: Arc<dyn ImageQueueStore>,
    registry: NameRegistry,
    extractor: Arc<dyn DistanceExtractor>,
    month_policy: MonthPolicy,
}

impl UpdateEngine {
    pub fn new<S>(store: Arc<S>, extractor: Arc<dyn DistanceExtractor>) -> Self
    where
        S: LeaderboardStore + DisplayNameStore + ImageQueueStore + 'static,
    {
        Self {
            leaderboards: store.clone(),
            image_queue: store.clone(),
            registry: NameRegistry::new(store),
            extractor,
            month_policy: MonthPolicy::default(),
        }
    }

    pub fn with_month_policy(mut self, month_policy: MonthPolicy) -> Self {
        self.month_policy = month_policy;
        self
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Handle every event in order.
    ///
    /// A failing collaborator abandons only the event it happened in. Events
    /// without replies are left out of the result.
    pub async fn process_batch(&self, events: &[MessageEvent]) -> Vec<EventReplies> {
        let mut results = Vec::new();

        for event in events {
            match self.handle_event(event).await {
                Ok(messages) if messages.is_empty() => {}
                Ok(messages) => results.push(EventReplies {
                    reply_token: event.reply_token.clone(),
                    messages,
                }),
                Err(e) => {
                    error!(
                        "Failed to process event in chat {}: {}",
                        event.source.chat_id(),
                        e
                    );
                }
            }
        }

        results
    }

    /// Replies for one event, in the order they should be sent.
    pub async fn handle_event(&self, event: &MessageEvent) -> Result<Vec<String>> {
        let chat_id = event.source.chat_id();
        let sender = event.source.sender_id();
        let classification = classify(&event.message);
        debug!("Event in chat {} classified as {:?}", chat_id, classification);

        let mut replies = Vec::new();

        match (&event.message, classification) {
            (MessageKind::Text(text), Classification::LeaderboardInit) => {
                replies.push(self.init_leaderboard(chat_id, text.trim()).await?);
            }
            (MessageKind::Text(text), Classification::DistanceUpdate(symbol)) => {
                self.update_distance(chat_id, sender, text.trim(), symbol, &mut replies)
                    .await?;
            }
            (MessageKind::Image(image), _) => {
                self.handle_single_image(chat_id, sender, image, &mut replies)
                    .await?;
            }
            (MessageKind::ImagePart { image, set }, _) => {
                self.handle_image_part(chat_id, sender, image, set, &mut replies)
                    .await?;
            }
            _ => {}
        }

        Ok(replies)
    }

    async fn init_leaderboard(&self, chat_id: &str, text: &str) -> Result<String> {
        let lines: Vec<&str> = text.split('\n').collect();
        let rendered = codec::render(&lines, None, Decimal::ZERO);

        if codec::is_snapshot(&rendered) {
            self.leaderboards.put_snapshot(chat_id, &rendered).await?;
            info!("Leaderboard initialised for chat {}", chat_id);
        }

        Ok(rendered)
    }

    async fn update_distance(
        &self,
        chat_id: &str,
        sender: Option<&str>,
        text: &str,
        symbol: Symbol,
        replies: &mut Vec<String>,
    ) -> Result<()> {
        let Some((name, rest)) = command::extract(text, symbol) else {
            replies.push(CommandError::InvalidName.to_string());
            return Ok(());
        };

        if let Some(user_id) = sender
            && self.registry.sync(user_id, &name).await? == NameChange::Registered
        {
            replies.push(name_set_message(&name));
        }

        let delta = match command::sum_delta(&rest, symbol) {
            Ok(delta) => delta,
            Err(e) => {
                replies.push(e.to_string());
                return Ok(());
            }
        };

        if delta.is_zero() {
            debug!("Zero distance from {} in chat {}, nothing to update", name, chat_id);
            return Ok(());
        }

        let lines = self.current_lines(chat_id).await?;
        let rendered = codec::render(&lines, Some(&name), delta);

        if codec::is_snapshot(&rendered) {
            self.leaderboards.put_snapshot(chat_id, &rendered).await?;
            info!("Applied {} km for {} in chat {}", delta, name, chat_id);
        }

        replies.push(rendered);
        Ok(())
    }

    /// Stored snapshot lines, reset when the month changed, or a fresh header.
    async fn current_lines(&self, chat_id: &str) -> Result<Vec<String>> {
        let Some(leaderboard) = self.leaderboards.get_snapshot(chat_id).await? else {
            return Ok(vec![
                DEFAULT_TITLE.to_string(),
                self.month_policy.current_month_label(),
            ]);
        };

        let mut lines: Vec<String> = leaderboard.stats.split('\n').map(String::from).collect();
        if self.month_policy.roll_over(&mut lines) {
            info!("Leaderboard of chat {} rolled over to {}", chat_id, lines[1]);
        }

        Ok(lines)
    }

    async fn handle_single_image(
        &self,
        chat_id: &str,
        sender: Option<&str>,
        image: &[u8],
        replies: &mut Vec<String>,
    ) -> Result<()> {
        let Some(name) = self.registered_name(sender).await? else {
            return Ok(());
        };

        let distance = self.extractor.extract_distance(image).await?;
        if distance <= Decimal::ZERO {
            debug!("No distance found in image from {}", name);
            return Ok(());
        }

        let update = format!("{} + {}", name, distance);
        replies.push(update.clone());
        self.update_distance(chat_id, sender, &update, Symbol::Plus, replies)
            .await
    }

    async fn handle_image_part(
        &self,
        chat_id: &str,
        sender: Option<&str>,
        image: &[u8],
        set: &ImageSet,
        replies: &mut Vec<String>,
    ) -> Result<()> {
        if !set.is_within_limit() {
            warn!("Ignoring image set {} of {} images", set.id, set.total);
            return Ok(());
        }

        let Some(name) = self.registered_name(sender).await? else {
            return Ok(());
        };

        let distance = self.extractor.extract_distance(image).await?;

        if !set.is_last() {
            debug!(
                "Queueing image {}/{} of set {}: {}",
                set.index, set.total, set.id, distance
            );
            self.image_queue
                .upsert_queue(
                    &set.id,
                    &set.index.to_string(),
                    &distance.to_string(),
                    TimeDelta::hours(IMAGE_QUEUE_TTL_HOURS),
                )
                .await?;
            return Ok(());
        }

        let queued = self
            .image_queue
            .get_queue(&set.id)
            .await?
            .unwrap_or_default();

        let mut distances: Vec<String> = (1..set.total)
            .map(|index| {
                queued
                    .get(&index.to_string())
                    .cloned()
                    .unwrap_or_else(|| "0".to_string())
            })
            .collect();
        distances.push(distance.to_string());

        if distances.iter().all(|d| parse_decimal(d).is_some_and(|d| d.is_zero())) {
            debug!("No distance found in any image of set {}", set.id);
            return Ok(());
        }

        let update = format!("{} + {}", name, distances.join(" + "));
        replies.push(update.clone());
        self.update_distance(chat_id, sender, &update, Symbol::Plus, replies)
            .await
    }

    async fn registered_name(&self, sender: Option<&str>) -> Result<Option<String>> {
        match sender {
            Some(user_id) => self.registry.resolve(user_id).await,
            None => Ok(None),
        }
    }
}
