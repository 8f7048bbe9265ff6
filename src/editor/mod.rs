//! # Interaction Layer
//!
//! [`Editor`] owns a document plus the view state around it (zoom, grid,
//! selection, the active pointer gesture). Pointer events arrive in canvas
//! pixels; the editor converts them to millimeters once and writes the
//! result into the document.
//!
//! ## Gestures
//!
//! ```text
//! Idle ──down on handle──▶ Resizing ──up──▶ Idle     move: apply resize rule
//! Idle ──down on body────▶ Dragging ──up──▶ Idle     move: top-left = pointer − offset
//! ```
//!
//! Only one gesture runs at a time. A `pointer_down` while a gesture is
//! active is ignored. Handles are tested before bodies, so a press can never
//! start both.
//!
//! ## Selection
//!
//! Pressing a free item selects it. The selection survives gestures and only
//! changes when another item is pressed or [`Editor::clear_selection`] is
//! called. The selected item shows its resize handle.

mod resize;

pub use resize::{Baseline, resize_anchor, resize_free};

use image::GrayImage;
use tracing::debug;

use crate::assets::Assets;
use crate::layout::{AnchorKey, EditMode, FreeItem, LabelDocument, PointMm, RectMm};
use crate::render::{self, RenderOptions, handle_rect_px};
use crate::units::{mm_to_px, px_to_mm};

/// Something the pointer can grab.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Anchor(AnchorKey),
    Free(String),
}

/// Active pointer gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        target: Target,
        /// Pointer minus the target's top-left, in pixels.
        offset_px: (f32, f32),
    },
    Resizing {
        target: Target,
        start_px: (f32, f32),
        baseline: Baseline,
    },
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub target: Target,
    pub on_handle: bool,
}

/// Designer session state.
#[derive(Debug, Clone)]
pub struct Editor {
    pub doc: LabelDocument,
    zoom: f32,
    grid_mm: Option<f32>,
    gesture: Gesture,
    selected_free_id: Option<String>,
}

impl Editor {
    pub fn new(doc: LabelDocument) -> Self {
        Self {
            doc,
            zoom: 1.0,
            grid_mm: None,
            gesture: Gesture::Idle,
            selected_free_id: None,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Non-positive zoom is ignored; anything above [`render::MAX_ZOOM`]
    /// is capped so hit testing matches what is drawn.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom > 0.0 && zoom.is_finite() {
            self.zoom = zoom.min(render::MAX_ZOOM);
        }
    }

    pub fn grid_mm(&self) -> Option<f32> {
        self.grid_mm
    }

    /// Enable snapping to a grid; `None` or a non-positive step disables it.
    pub fn set_grid(&mut self, grid_mm: Option<f32>) {
        self.grid_mm = grid_mm.filter(|g| *g > 0.0);
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn selected_free_id(&self) -> Option<&str> {
        self.selected_free_id.as_deref()
    }

    /// Select a free item. Returns `false` if no item has that id.
    pub fn select(&mut self, id: &str) -> bool {
        if self.doc.free_item(id).is_none() {
            return false;
        }
        self.selected_free_id = Some(id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_free_id = None;
    }

    /// Add a free item and select it.
    pub fn add_free_item(&mut self, item: FreeItem) -> String {
        let id = self.doc.add_free_item(item);
        self.selected_free_id = Some(id.clone());
        id
    }

    /// Remove a free item, dropping the selection and any gesture on it.
    pub fn remove_free_item(&mut self, id: &str) -> Option<FreeItem> {
        let removed = self.doc.remove_free_item(id)?;
        if self.selected_free_id.as_deref() == Some(id) {
            self.selected_free_id = None;
        }
        let target = Target::Free(id.to_string());
        if matches!(&self.gesture, Gesture::Dragging { target: t, .. } | Gesture::Resizing { target: t, .. } if *t == target)
        {
            self.gesture = Gesture::Idle;
        }
        Some(removed)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn bounds(&self, target: &Target) -> Option<RectMm> {
        match target {
            Target::Anchor(key) => Some(self.doc.anchor_bounds(*key)),
            Target::Free(id) => self.doc.free_item(id).map(FreeItem::bounds),
        }
    }

    /// Grabbable targets, topmost first.
    fn targets_top_down(&self) -> Vec<Target> {
        match self.doc.mode {
            EditMode::Standard => AnchorKey::ORDER
                .iter()
                .rev()
                .filter(|&&key| self.doc.is_anchor_present(key))
                .map(|&key| Target::Anchor(key))
                .collect(),
            EditMode::Free => self
                .doc
                .free_items_in_paint_order()
                .into_iter()
                .rev()
                .map(|item| Target::Free(item.id.clone()))
                .collect(),
        }
    }

    /// Whether a target currently exposes a resize handle.
    fn has_handle(&self, target: &Target) -> bool {
        match target {
            Target::Anchor(_) => true,
            Target::Free(id) => self.selected_free_id.as_deref() == Some(id.as_str()),
        }
    }

    /// Handles first, then bodies, each topmost first.
    pub fn hit_test(&self, x_px: f32, y_px: f32) -> Option<Hit> {
        let targets = self.targets_top_down();

        for target in &targets {
            if !self.has_handle(target) {
                continue;
            }
            let Some(bounds) = self.bounds(target) else {
                continue;
            };
            let (hx, hy, hw, hh) = handle_rect_px(bounds, self.zoom);
            if x_px >= hx && x_px <= hx + hw && y_px >= hy && y_px <= hy + hh {
                return Some(Hit {
                    target: target.clone(),
                    on_handle: true,
                });
            }
        }

        let (x_mm, y_mm) = (px_to_mm(x_px, self.zoom), px_to_mm(y_px, self.zoom));
        targets
            .into_iter()
            .find(|t| self.bounds(t).is_some_and(|b| b.contains(x_mm, y_mm)))
            .map(|target| Hit {
                target,
                on_handle: false,
            })
    }

    // ------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------

    /// Start a drag or resize. Returns what was hit, or `None` if nothing
    /// was or a gesture is already running.
    pub fn pointer_down(&mut self, x_px: f32, y_px: f32) -> Option<Hit> {
        if self.gesture != Gesture::Idle {
            return None;
        }
        let hit = self.hit_test(x_px, y_px)?;
        let bounds = self.bounds(&hit.target)?;

        if let Target::Free(id) = &hit.target {
            self.selected_free_id = Some(id.clone());
        }

        self.gesture = if hit.on_handle {
            Gesture::Resizing {
                target: hit.target.clone(),
                start_px: (x_px, y_px),
                baseline: self.baseline(&hit.target, bounds),
            }
        } else {
            Gesture::Dragging {
                target: hit.target.clone(),
                offset_px: (
                    x_px - mm_to_px(bounds.x_mm, self.zoom),
                    y_px - mm_to_px(bounds.y_mm, self.zoom),
                ),
            }
        };
        debug!(target = ?hit.target, handle = hit.on_handle, "gesture started");
        Some(hit)
    }

    /// Advance the active gesture. Returns `true` if the document changed.
    pub fn pointer_move(&mut self, x_px: f32, y_px: f32) -> bool {
        match self.gesture.clone() {
            Gesture::Idle => false,
            Gesture::Dragging { target, offset_px } => {
                let x = self.snap(px_to_mm(x_px - offset_px.0, self.zoom)).max(0.0);
                let y = self.snap(px_to_mm(y_px - offset_px.1, self.zoom)).max(0.0);
                self.move_to(&target, x, y)
            }
            Gesture::Resizing {
                target,
                start_px,
                baseline,
            } => {
                let dx = px_to_mm(x_px - start_px.0, self.zoom);
                let dy = px_to_mm(y_px - start_px.1, self.zoom);
                match &target {
                    Target::Anchor(key) => {
                        resize_anchor(&mut self.doc.styles, *key, &baseline, dx, dy);
                        true
                    }
                    Target::Free(id) => match self.doc.free_item_mut(id) {
                        Some(item) => {
                            resize_free(item, &baseline, dx, dy);
                            true
                        }
                        None => false,
                    },
                }
            }
        }
    }

    /// End the active gesture; the last position stays.
    pub fn pointer_up(&mut self) {
        if self.gesture != Gesture::Idle {
            debug!("gesture ended");
        }
        self.gesture = Gesture::Idle;
    }

    fn move_to(&mut self, target: &Target, x_mm: f32, y_mm: f32) -> bool {
        match target {
            Target::Anchor(key) => {
                self.doc.set_anchor(*key, PointMm::new(x_mm, y_mm));
                true
            }
            Target::Free(id) => match self.doc.free_item_mut(id) {
                Some(item) => {
                    item.x_mm = x_mm;
                    item.y_mm = y_mm;
                    true
                }
                None => false,
            },
        }
    }

    fn snap(&self, mm: f32) -> f32 {
        match self.grid_mm {
            Some(grid) => (mm / grid).round() * grid,
            None => mm,
        }
    }

    fn baseline(&self, target: &Target, bounds: RectMm) -> Baseline {
        let styles = &self.doc.styles;
        let (font_mm, wrap_width_mm) = match target {
            Target::Anchor(AnchorKey::Title) => (styles.title.font_mm, None),
            Target::Anchor(AnchorKey::ProductName) => (
                styles.product_name.font_mm,
                Some(styles.product_name.wrap_width_mm),
            ),
            Target::Anchor(AnchorKey::Details) => (styles.details.font_mm, None),
            Target::Anchor(AnchorKey::Barcode) => (0.0, None),
            Target::Free(id) => self
                .doc
                .free_item(id)
                .map(|item| (item.font_mm(), item.wrap_width_mm))
                .unwrap_or((0.0, None)),
        };
        Baseline {
            bounds,
            font_mm,
            wrap_width_mm,
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// View settings for the renderer: zoom, grid, selected item outline.
    pub fn render_options(&self) -> RenderOptions {
        let selection = match self.doc.mode {
            EditMode::Free => self
                .selected_free_id
                .as_deref()
                .and_then(|id| self.doc.free_item(id))
                .map(FreeItem::bounds),
            EditMode::Standard => None,
        };
        RenderOptions {
            zoom: self.zoom,
            grid_mm: self.grid_mm,
            selection,
        }
    }

    pub fn render(&self, assets: &Assets) -> GrayImage {
        render::render(&self.doc, assets, &self.render_options())
    }
}
