pub mod codec;
pub mod command;
pub mod error;
pub mod event;
pub mod month;
pub mod ocr;
pub mod registry;
pub mod traits;
pub mod update;

pub use codec::{Snapshot, render};
pub use error::{LeaderboardError, Result};
pub use event::{ImageSet, MessageEvent, MessageKind, SourceKind};
pub use month::MonthPolicy;
pub use ocr::{OcrDistanceExtractor, OllamaClient, TextRecognizer};
pub use registry::NameRegistry;
pub use traits::{Clock, DistanceExtractor, SystemClock};
pub use update::{Classification, EventReplies, UpdateEngine};
