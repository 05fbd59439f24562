// crates/cropsync-engine/src/store.rs
//
// Snapshot store for the UI shell.
//
// Slots and their single writer:
//   playback       PlaybackController (via SyncFacade after every transport change)
//   crop, cropping CropRegionModel    (via SyncFacade after every geometry change)
//   preview_active PreviewRenderLoop  (via SyncFacade on start / cancel)
//
// Readers subscribe once and receive the full snapshot whenever any slot
// actually changes. Publishing an identical value is a no-op.

use uuid::Uuid;

use cropsync_core::state::{CropRegion, EngineSnapshot, PlaybackState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self { Self(Uuid::new_v4()) }
}

type Callback<T> = Box<dyn FnMut(&T)>;

/// Ordered callback list. Unsubscribing twice, or with an unknown id, is a no-op.
pub struct Subscribers<T> {
    entries: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self { Self { entries: Vec::new() } }

    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Returns whether `id` was still subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, value: &T) {
        for (_, cb) in self.entries.iter_mut() {
            cb(value);
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self { Self::new() }
}

pub struct StateStore {
    snapshot:    EngineSnapshot,
    subscribers: Subscribers<EngineSnapshot>,
}

impl StateStore {
    pub fn new(playback: PlaybackState) -> Self {
        Self { snapshot: EngineSnapshot::new(playback), subscribers: Subscribers::new() }
    }

    pub fn snapshot(&self) -> &EngineSnapshot { &self.snapshot }

    pub fn subscribe(&mut self, callback: impl FnMut(&EngineSnapshot) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn publish_playback(&mut self, playback: PlaybackState) {
        if self.snapshot.playback != playback {
            self.snapshot.playback = playback;
            self.emit();
        }
    }

    pub fn publish_crop(&mut self, crop: Option<CropRegion>) {
        let cropping = crop.is_some();
        if self.snapshot.crop != crop || self.snapshot.cropping != cropping {
            self.snapshot.crop     = crop;
            self.snapshot.cropping = cropping;
            self.emit();
        }
    }

    pub fn publish_preview(&mut self, active: bool) {
        if self.snapshot.preview_active != active {
            self.snapshot.preview_active = active;
            self.emit();
        }
    }

    fn emit(&mut self) {
        let snap = self.snapshot.clone();
        self.subscribers.notify(&snap);
    }
}
