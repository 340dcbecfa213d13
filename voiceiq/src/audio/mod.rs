mod blob;
mod player;

pub use blob::{Blob, BlobStore, ObjectUrl, ObjectUrlGuard};
pub use player::{AudioPlayer, PlaybackOutcome, ANSWER_MIME_TYPE};
