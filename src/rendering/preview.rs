//! Live preview rendering.
//!
//! The preview owns its own canvas and output surface. Store notifications
//! only mark it dirty; the surface is recomputed on the next [`Preview::frame`],
//! so any number of drag updates between two frames cost one render and the
//! settled result is the same as rendering after every update.

use super::canvas::Canvas;
use super::compositor::{Compositor, RenderedSurface};
use crate::config::WatermarkConfig;
use crate::error::Result;
use crate::source::SourceImage;
use crate::store::{SubscriptionId, WatermarkStore};

use std::cell::Cell;
use std::rc::Rc;

/// Coalescing preview renderer.
#[derive(Debug)]
pub struct Preview {
    canvas: Option<Canvas>,
    surface: Option<RenderedSurface>,
    dirty: Rc<Cell<bool>>,
    renders: u64,
}

impl Preview {
    /// Create a preview that renders on its first frame.
    pub fn new() -> Self {
        Self {
            canvas: None,
            surface: None,
            dirty: Rc::new(Cell::new(true)),
            renders: 0,
        }
    }

    /// Invalidate the preview whenever `store` changes.
    pub fn attach(&self, store: &mut WatermarkStore) -> SubscriptionId {
        let dirty = Rc::clone(&self.dirty);
        store.subscribe(move |_| dirty.set(true))
    }

    /// Force a re-render on the next frame.
    pub fn invalidate(&self) {
        self.dirty.set(true);
    }

    /// True when the next frame will render.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Produce the surface for this frame.
    ///
    /// Renders only when something changed since the last frame. Returns
    /// `None` while the store has no image. A failed render leaves the
    /// preview dirty, so the next frame tries again instead of showing the
    /// previous surface.
    pub fn frame(
        &mut self,
        compositor: &Compositor,
        store: &WatermarkStore,
    ) -> Result<Option<&RenderedSurface>> {
        self.frame_with(store, |canvas, image, config| compositor.render_on(canvas, image, config))
    }

    fn frame_with(
        &mut self,
        store: &WatermarkStore,
        render: impl FnOnce(&mut Canvas, &SourceImage, &WatermarkConfig) -> Result<RenderedSurface>,
    ) -> Result<Option<&RenderedSurface>> {
        if !self.dirty.get() {
            return Ok(self.surface.as_ref());
        }

        let Some(image) = store.image() else {
            self.surface = None;
            self.dirty.set(false);
            return Ok(None);
        };

        let canvas = match self.canvas.take() {
            Some(canvas) => canvas,
            None => Canvas::new(image.width(), image.height())?,
        };
        let canvas = self.canvas.insert(canvas);

        let surface = render(canvas, image, store.get())?;
        self.dirty.set(false);
        self.renders += 1;
        log::debug!("Preview frame #{} rendered", self.renders);

        Ok(Some(&*self.surface.insert(surface)))
    }

    /// Surface from the most recent render.
    pub fn surface(&self) -> Option<&RenderedSurface> {
        self.surface.as_ref()
    }

    /// Number of renders performed so far.
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}

impl Default for Preview {
    fn default() -> Self {
        Self::new()
    }
}
