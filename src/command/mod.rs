pub mod types;

pub use types::{PlaybackEvent, PlayerCommand, RequestId, Voice};
