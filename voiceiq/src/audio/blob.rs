//! In-memory binary objects addressed by `blob:` URLs.
//!
//! A URL stays resolvable until it is revoked. [`ObjectUrlGuard`] ties a URL
//! to a scope and revokes it exactly once.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use uuid::Uuid;
use voiceiq_playback::MediaSource;

const URL_PREFIX: &str = "blob:voiceiq/";

/// Immutable bytes with a MIME type
#[derive(Debug, Clone)]
pub struct Blob {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// Handle addressing a [`Blob`] in a [`BlobStore`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live object URLs
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    entries: Arc<Mutex<HashMap<ObjectUrl, Blob>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `blob` and return a fresh URL for it
    pub fn create_object_url(&self, blob: Blob) -> ObjectUrl {
        let url = ObjectUrl(format!("{}{}", URL_PREFIX, Uuid::new_v4()));
        self.entries.lock().unwrap().insert(url.clone(), blob);
        url
    }

    /// Like [`create_object_url`](Self::create_object_url), returning a guard
    /// that revokes the URL when released or dropped.
    pub fn create_guarded_url(&self, blob: Blob) -> ObjectUrlGuard {
        let url = self.create_object_url(blob);
        ObjectUrlGuard {
            store: self.clone(),
            url,
            released: false,
        }
    }

    /// Look up the media behind `url`, if it is still live
    pub fn resolve(&self, url: &ObjectUrl) -> Option<MediaSource> {
        self.entries
            .lock()
            .unwrap()
            .get(url)
            .map(|blob| MediaSource::new(url.as_str(), blob.mime_type.clone(), blob.bytes.clone()))
    }

    /// Release `url`. Returns false if it was not live.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        self.entries.lock().unwrap().remove(url).is_some()
    }

    /// Number of live URLs
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One-shot owner of an object URL.
#[derive(Debug)]
pub struct ObjectUrlGuard {
    store: BlobStore,
    url: ObjectUrl,
    released: bool,
}

impl ObjectUrlGuard {
    pub fn url(&self) -> &ObjectUrl {
        &self.url
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Revoke the URL. Only the first call has an effect; returns whether
    /// this call performed the release.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.store.revoke(&self.url);
        log::debug!("Revoked {}", self.url);
        true
    }
}

impl Drop for ObjectUrlGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp3_blob() -> Blob {
        Blob::new(vec![0xff, 0xfb, 0x90, 0x00], "audio/mpeg")
    }

    #[test]
    fn test_create_resolve_revoke() {
        let store = BlobStore::new();
        let url = store.create_object_url(mp3_blob());

        assert!(url.as_str().starts_with("blob:voiceiq/"));
        let media = store.resolve(&url).unwrap();
        assert_eq!(media.mime_type, "audio/mpeg");
        assert_eq!(&media.bytes[..], &[0xff, 0xfb, 0x90, 0x00]);

        assert!(store.revoke(&url));
        assert!(!store.revoke(&url));
        assert!(store.resolve(&url).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_urls_are_unique() {
        let store = BlobStore::new();
        let a = store.create_object_url(mp3_blob());
        let b = store.create_object_url(mp3_blob());

        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_guard_releases_exactly_once() {
        let store = BlobStore::new();
        let mut guard = store.create_guarded_url(mp3_blob());
        assert_eq!(store.len(), 1);

        assert!(guard.release());
        assert!(!guard.release());
        assert!(guard.is_released());
        assert!(store.is_empty());

        // A URL created after the release must survive the guard's drop
        let other = store.create_object_url(mp3_blob());
        drop(guard);
        assert!(store.resolve(&other).is_some());
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let store = BlobStore::new();
        {
            let _guard = store.create_guarded_url(mp3_blob());
            assert_eq!(store.len(), 1);
        }
        assert!(store.is_empty());
    }
}
