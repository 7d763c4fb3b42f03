//! Observable watermark state.
//!
//! A [`WatermarkStore`] holds the single current [`WatermarkConfig`], the
//! current source image and a loading flag, and tells subscribed listeners
//! about every change. There is no global instance; create one per editing
//! session and pass it by reference.

use crate::config::{WatermarkConfig, WatermarkPatch};
use crate::error::Result;
use crate::export::{ExportOptions, ExportedImage, Exporter};
use crate::position::{Position, PositionTarget};
use crate::rendering::Compositor;
use crate::source::{SourceId, SourceImage};

use std::fmt;

/// Change notification sent to store listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The configuration changed; carries the new value
    ConfigChanged(WatermarkConfig),
    /// A different image (or none) was set
    ImageChanged(Option<SourceId>),
    /// The loading flag flipped
    LoadingChanged(bool),
}

/// Handle returned by [`WatermarkStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Configuration, image and loading state with change listeners.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use watermark_oxide::config::WatermarkPatch;
/// use watermark_oxide::store::{StoreEvent, WatermarkStore};
///
/// let mut store = WatermarkStore::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
///
/// store.set(&WatermarkPatch::position(73.0, 12.0));
/// assert_eq!((store.get().x, store.get().y), (73.0, 12.0));
/// assert!(matches!(seen.borrow()[0], StoreEvent::ConfigChanged(_)));
/// ```
pub struct WatermarkStore {
    config: WatermarkConfig,
    image: Option<SourceImage>,
    loading: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl WatermarkStore {
    /// Store with the default configuration and no image.
    pub fn new() -> Self {
        Self::with_config(WatermarkConfig::default())
    }

    /// Store starting from `config` (clamped).
    pub fn with_config(config: WatermarkConfig) -> Self {
        Self {
            config: config.clamped(),
            image: None,
            loading: false,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Current configuration.
    pub fn get(&self) -> &WatermarkConfig {
        &self.config
    }

    /// Merge `patch` into the configuration.
    ///
    /// Listeners are notified only when a value actually changed. Returns
    /// whether it did.
    pub fn set(&mut self, patch: &WatermarkPatch) -> bool {
        if !self.config.apply(patch) {
            return false;
        }
        let event = StoreEvent::ConfigChanged(self.config.clone());
        self.notify(&event);
        true
    }

    /// Restore the default configuration. The image is kept.
    pub fn reset(&mut self) {
        let defaults = WatermarkConfig::default();
        if self.config != defaults {
            self.config = defaults;
            let event = StoreEvent::ConfigChanged(self.config.clone());
            self.notify(&event);
        }
    }

    /// Current source image.
    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    /// Replace the source image.
    ///
    /// Setting an image with the same content id as the current one is not
    /// a change and notifies nobody.
    pub fn set_image(&mut self, image: Option<SourceImage>) {
        let before = self.image.as_ref().map(SourceImage::id);
        let after = image.as_ref().map(SourceImage::id);
        self.image = image;
        if before != after {
            if let Some(id) = after {
                log::debug!("Source image set to {}", id);
            }
            self.notify(&StoreEvent::ImageChanged(after));
        }
    }

    /// Decode `bytes` and make the result the current image.
    ///
    /// The loading flag is raised for the duration of the decode. On failure
    /// the previous image stays in place.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.load_with(|| SourceImage::decode(bytes))
    }

    /// Decode a `data:image/...;base64,` URI and make it the current image.
    pub fn load_data_uri(&mut self, uri: &str) -> Result<()> {
        self.load_with(|| SourceImage::from_data_uri(uri))
    }

    fn load_with(&mut self, decode: impl FnOnce() -> Result<SourceImage>) -> Result<()> {
        self.set_loading(true);
        let result = decode();
        self.set_loading(false);
        self.set_image(Some(result?));
        Ok(())
    }

    /// Mark a decode as pending (or finished).
    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.notify(&StoreEvent::LoadingChanged(loading));
        }
    }

    /// True while a decode is pending; rendering waits for it.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Export the current image with the current configuration.
    pub fn export(&self, compositor: &Compositor, options: &ExportOptions) -> Result<ExportedImage> {
        Exporter::new(compositor).export(self.image.as_ref(), &self.config, options)
    }

    fn notify(&mut self, event: &StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl PositionTarget for WatermarkStore {
    fn apply_position(&mut self, position: Position) {
        self.set(&position.into());
    }
}

impl Default for WatermarkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WatermarkStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatermarkStore")
            .field("config", &self.config)
            .field("image", &self.image.as_ref().map(SourceImage::id))
            .field("loading", &self.loading)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
