use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::Result;

/// Reads a run distance off a screenshot.
///
/// Returns zero when the image holds no single unambiguous `km` figure.
#[async_trait::async_trait]
pub trait DistanceExtractor: Send + Sync {
    async fn extract_distance(&self, image: &[u8]) -> Result<Decimal>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
