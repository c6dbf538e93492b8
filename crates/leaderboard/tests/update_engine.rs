use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use leaderboard::event::MAX_IMAGE_SET_SIZE;
use leaderboard::registry::name_set_message;
use leaderboard::{
    Clock, DistanceExtractor, ImageSet, LeaderboardError, MessageEvent, MessageKind, MonthPolicy,
    Result, SourceKind, UpdateEngine,
};
use rust_decimal::Decimal;
use storage::{LeaderboardStore, MemoryStore};

const GROUP: &str = "G1";
const USER: &str = "U1";

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Reads the image bytes as the distance printed on it
struct StubExtractor;

#[async_trait]
impl DistanceExtractor for StubExtractor {
    async fn extract_distance(&self, image: &[u8]) -> Result<Decimal> {
        let text = std::str::from_utf8(image).unwrap_or_default();
        if text == "fail" {
            return Err(LeaderboardError::ExtractionError("recognizer down".to_string()));
        }
        Ok(Decimal::from_str(text).unwrap_or_default())
    }
}

fn engine_at(store: &Arc<MemoryStore>, now: DateTime<Utc>) -> UpdateEngine {
    UpdateEngine::new(store.clone(), Arc::new(StubExtractor))
        .with_month_policy(MonthPolicy::new(7, Arc::new(FixedClock(now))))
}

fn july() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
}

fn group_event(message: MessageKind) -> MessageEvent {
    MessageEvent {
        reply_token: "token".to_string(),
        source: SourceKind::Group {
            group_id: GROUP.to_string(),
            user_id: Some(USER.to_string()),
        },
        message,
    }
}

fn text(t: &str) -> MessageEvent {
    group_event(MessageKind::Text(t.to_string()))
}

fn image(distance: &str) -> MessageEvent {
    group_event(MessageKind::Image(distance.as_bytes().to_vec()))
}

fn image_part(distance: &str, index: u32, total: u32) -> MessageEvent {
    group_event(MessageKind::ImagePart {
        image: distance.as_bytes().to_vec(),
        set: ImageSet {
            id: "set-1".to_string(),
            index,
            total,
        },
    })
}

async fn registered(store: &Arc<MemoryStore>, name: &str) -> UpdateEngine {
    let engine = engine_at(store, july());
    engine.registry().register(USER, name).await.unwrap();
    engine
}

#[tokio::test]
async fn test_init_sorts_and_persists() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_at(&store, july());

    let replies = engine
        .handle_event(&text("===Title\nJuly 2024\n1 John 5 km\n2 Jane 10 km"))
        .await
        .unwrap();

    let expected = "===Title\nJuly 2024\n1 Jane 10 km\n2 John 5 km";
    assert_eq!(replies, vec![expected]);
    assert_eq!(store.snapshot(GROUP).await.as_deref(), Some(expected));
}

#[tokio::test]
async fn test_init_error_is_replied_not_persisted() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_at(&store, july());

    let replies = engine.handle_event(&text("===Title")).await.unwrap();
    assert_eq!(
        replies,
        vec!["Please set title and subtitle in the following format\n===TITLE \n SUBTITLE"]
    );

    let replies = engine
        .handle_event(&text("===Title\nJuly 2024\n1 John five km"))
        .await
        .unwrap();
    assert_eq!(replies, vec!["Parse distance error, distance format is incorrect."]);

    assert_eq!(store.snapshot(GROUP).await, None);
}

#[tokio::test]
async fn test_first_update_creates_board_and_registers_name() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_at(&store, july());

    let replies = engine.handle_event(&text("John+5")).await.unwrap();
    let board = "===Running Challenge===\nJuly 2024\n1 John 5 km";
    assert_eq!(replies, vec![name_set_message("John"), board.to_string()]);
    assert_eq!(store.snapshot(GROUP).await.as_deref(), Some(board));

    let replies = engine.handle_event(&text("John + 1 + 1.5")).await.unwrap();
    assert_eq!(
        replies,
        vec!["===Running Challenge===\nJuly 2024\n1 John 7.5 km"]
    );
}

#[tokio::test]
async fn test_minus_update() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_snapshot(GROUP, "===T\nJuly 2024\n1 Jane 10 km\n2 John 5 km")
        .await
        .unwrap();
    let engine = registered(&store, "Jane").await;

    let replies = engine.handle_event(&text("Jane-6")).await.unwrap();
    assert_eq!(replies, vec!["===T\nJuly 2024\n1 John 5 km\n2 Jane 4 km"]);
}

#[tokio::test]
async fn test_month_rollover_discards_entries() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_snapshot(GROUP, "===Running Challenge===\nJuly 2024\n1 Jane 10 km")
        .await
        .unwrap();

    // 18:00 UTC on the 31st is already August at UTC+7
    let engine = engine_at(&store, Utc.with_ymd_and_hms(2024, 7, 31, 18, 0, 0).unwrap());
    engine.registry().register(USER, "John").await.unwrap();

    let replies = engine.handle_event(&text("John+5")).await.unwrap();
    let board = "===Running Challenge===\nAugust 2024\n1 John 5 km";
    assert_eq!(replies, vec![board]);
    assert_eq!(store.snapshot(GROUP).await.as_deref(), Some(board));
}

#[tokio::test]
async fn test_custom_subtitle_never_rolls_over() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_snapshot(GROUP, "===Club===\nSpring league\n1 Jane 10 km")
        .await
        .unwrap();
    let engine = registered(&store, "John").await;

    let replies = engine.handle_event(&text("John+5")).await.unwrap();
    assert_eq!(replies, vec!["===Club===\nSpring league\n1 Jane 10 km\n2 John 5 km"]);
}

#[tokio::test]
async fn test_zero_delta_only_registers_name() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_at(&store, july());

    let replies = engine.handle_event(&text("Bob +0")).await.unwrap();
    assert_eq!(replies, vec![name_set_message("Bob")]);
    assert_eq!(store.snapshot(GROUP).await, None);

    let replies = engine.handle_event(&text("Bob +0")).await.unwrap();
    assert!(replies.is_empty());
}

#[tokio::test]
async fn test_zero_delta_leaves_existing_board_untouched() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_snapshot(GROUP, "===T\nJuly 2024\n1 Jane 10 km\n2 John 5 km")
        .await
        .unwrap();
    let before = store.get_snapshot(GROUP).await.unwrap().unwrap();
    let engine = registered(&store, "John").await;

    for message in ["John+0", "John+2+-2"] {
        let replies = engine.handle_event(&text(message)).await.unwrap();
        assert!(replies.is_empty(), "unexpected reply to {:?}", message);
    }

    let after = store.get_snapshot(GROUP).await.unwrap().unwrap();
    assert_eq!(after.stats, before.stats);
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn test_overflowing_update_is_rejected_per_event() {
    let store = Arc::new(MemoryStore::new());
    let max = Decimal::MAX.to_string();
    let full = format!("===T\nJuly 2024\n1 John {} km", max);
    store.put_snapshot(GROUP, &full).await.unwrap();
    let engine = registered(&store, "John").await;

    let mut huge_sum = text(&format!("John+{}+{}", max, max));
    huge_sum.reply_token = "t1".to_string();
    let mut past_max = text("John+1");
    past_max.reply_token = "t2".to_string();
    let mut lowered = text("John-1");
    lowered.reply_token = "t3".to_string();

    let results = engine.process_batch(&[huge_sum, past_max]).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].messages, vec!["Error parsing distance"]);
    assert_eq!(
        results[1].messages,
        vec!["Parse distance error, distance format is incorrect."]
    );
    assert_eq!(store.snapshot(GROUP).await.as_deref(), Some(full.as_str()));

    let results = engine.process_batch(&[lowered]).await;
    assert_eq!(results[0].reply_token, "t3");
    assert!(store.snapshot(GROUP).await.unwrap().ends_with("1 John 79228162514264337593543950334 km"));
}

#[tokio::test]
async fn test_invalid_name_reply() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_at(&store, july());

    let replies = engine
        .handle_event(&text("ThisIsTooLongLongName +5"))
        .await
        .unwrap();
    assert_eq!(replies, vec!["Name contains space or has invalid format"]);
    assert_eq!(engine.registry().resolve(USER).await.unwrap(), None);
}

#[tokio::test]
async fn test_chatter_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_at(&store, july());

    for message in ["ThisIsInvalid\nName +5", "see you - later", "hello", "a+b"] {
        let replies = engine.handle_event(&text(message)).await.unwrap();
        assert!(replies.is_empty(), "unexpected reply to {:?}", message);
    }
    assert_eq!(store.snapshot(GROUP).await, None);
}

#[tokio::test]
async fn test_distance_parse_error() {
    let store = Arc::new(MemoryStore::new());
    let engine = registered(&store, "John").await;

    let replies = engine.handle_event(&text("John+5+abc")).await.unwrap();
    assert_eq!(replies, vec!["Error parsing distance"]);
    assert_eq!(store.snapshot(GROUP).await, None);
}

#[tokio::test]
async fn test_corrupt_board_is_reported_and_kept() {
    let store = Arc::new(MemoryStore::new());
    let corrupt = "===T\nJuly 2024\n1 Jane ten km";
    store.put_snapshot(GROUP, corrupt).await.unwrap();
    let engine = registered(&store, "John").await;

    let replies = engine.handle_event(&text("John+5")).await.unwrap();
    assert_eq!(replies, vec!["Parse distance error, distance format is incorrect."]);
    assert_eq!(store.snapshot(GROUP).await.as_deref(), Some(corrupt));
}

#[tokio::test]
async fn test_single_image_update() {
    let store = Arc::new(MemoryStore::new());
    let engine = registered(&store, "John").await;

    let replies = engine.handle_event(&image("5.01")).await.unwrap();
    assert_eq!(
        replies,
        vec![
            "John + 5.01",
            "===Running Challenge===\nJuly 2024\n1 John 5.01 km"
        ]
    );
}

#[tokio::test]
async fn test_single_image_needs_name_and_distance() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_at(&store, july());

    assert!(engine.handle_event(&image("5")).await.unwrap().is_empty());

    engine.registry().register(USER, "John").await.unwrap();
    assert!(engine.handle_event(&image("0")).await.unwrap().is_empty());
    assert_eq!(store.snapshot(GROUP).await, None);
}

#[tokio::test]
async fn test_image_set_is_summed_on_last_image() {
    let store = Arc::new(MemoryStore::new());
    let engine = registered(&store, "John").await;

    assert!(engine.handle_event(&image_part("5", 1, 3)).await.unwrap().is_empty());
    assert!(engine.handle_event(&image_part("7", 2, 3)).await.unwrap().is_empty());
    assert_eq!(store.snapshot(GROUP).await, None);

    let replies = engine.handle_event(&image_part("10", 3, 3)).await.unwrap();
    assert_eq!(
        replies,
        vec![
            "John + 5 + 7 + 10",
            "===Running Challenge===\nJuly 2024\n1 John 22 km"
        ]
    );
}

#[tokio::test]
async fn test_image_set_missing_part_counts_as_zero() {
    let store = Arc::new(MemoryStore::new());
    let engine = registered(&store, "John").await;

    engine.handle_event(&image_part("5", 1, 3)).await.unwrap();
    let replies = engine.handle_event(&image_part("10", 3, 3)).await.unwrap();
    assert_eq!(
        replies,
        vec![
            "John + 5 + 0 + 10",
            "===Running Challenge===\nJuly 2024\n1 John 15 km"
        ]
    );
}

#[tokio::test]
async fn test_image_set_without_distances_is_silent() {
    let store = Arc::new(MemoryStore::new());
    let engine = registered(&store, "John").await;

    engine.handle_event(&image_part("0", 1, 2)).await.unwrap();
    let replies = engine.handle_event(&image_part("0", 2, 2)).await.unwrap();
    assert!(replies.is_empty());
    assert_eq!(store.snapshot(GROUP).await, None);
}

#[tokio::test]
async fn test_oversized_image_set_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    let engine = registered(&store, "John").await;
    let total = MAX_IMAGE_SET_SIZE + 1;

    assert!(engine.handle_event(&image_part("5", 1, total)).await.unwrap().is_empty());
    assert!(engine.handle_event(&image_part("5", total, total)).await.unwrap().is_empty());
    assert_eq!(store.snapshot(GROUP).await, None);
}

#[tokio::test]
async fn test_batch_skips_failed_events() {
    let store = Arc::new(MemoryStore::new());
    let engine = registered(&store, "John").await;

    let mut chatter = text("good morning");
    chatter.reply_token = "t1".to_string();
    let mut broken = image("fail");
    broken.reply_token = "t2".to_string();
    let mut update = text("John+3");
    update.reply_token = "t3".to_string();

    let results = engine.process_batch(&[chatter, broken, update]).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].reply_token, "t3");
    assert_eq!(
        results[0].messages,
        vec!["===Running Challenge===\nJuly 2024\n1 John 3 km"]
    );
}

#[tokio::test]
async fn test_boards_are_per_conversation() {
    let store = Arc::new(MemoryStore::new());
    let engine = registered(&store, "John").await;

    let mut elsewhere = text("John+2");
    elsewhere.source = SourceKind::Room {
        room_id: "R1".to_string(),
        user_id: Some(USER.to_string()),
    };

    engine.handle_event(&text("John+5")).await.unwrap();
    engine.handle_event(&elsewhere).await.unwrap();

    assert_eq!(
        store.snapshot(GROUP).await.as_deref(),
        Some("===Running Challenge===\nJuly 2024\n1 John 5 km")
    );
    assert_eq!(
        store.snapshot("R1").await.as_deref(),
        Some("===Running Challenge===\nJuly 2024\n1 John 2 km")
    );
}
