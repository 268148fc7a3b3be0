//! Stream Tree - WASM Module
//!
//! This module provides the interactive tree-visualization engine for the
//! Stream Tree library. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; the host owns the drawing
//! surface, the persistence layer, and the frame loop.
//!
//! # Architecture
//!
//! - `stream`: Stream records and the arena-indexed hierarchy
//! - `layout`: Display-tree construction, focus projection, base layout
//! - `view`: Manual offsets, viewport transform, animated transitions
//! - `interact`: Pointer gesture state machine
//! - `render`: Screen-space scene assembly
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `engine`: The coordinator behind this facade

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod engine;
pub mod geom;
pub mod interact;
pub mod layout;
pub mod render;
pub mod spatial;
pub mod stream;
pub mod view;

use engine::TreeViewEngine;
use geom::Vec2;
use layout::LayoutConfig;
use stream::Stream;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the tree view engine.
///
/// This struct wraps the internal TreeViewEngine and provides the public API
/// exposed to JavaScript. All pointer coordinates are screen-space, relative
/// to the container element.
#[wasm_bindgen]
pub struct StreamTreeWasm {
    engine: TreeViewEngine,
}

#[wasm_bindgen]
impl StreamTreeWasm {
    /// Create a new empty tree view engine.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: TreeViewEngine::new(),
        }
    }

    // =========================================================================
    // Data In
    // =========================================================================

    /// Replace the hierarchy with a new array of stream records.
    ///
    /// Returns false (and leaves the current tree untouched) if the records
    /// do not deserialize.
    #[wasm_bindgen(js_name = setStreams)]
    pub fn set_streams(&mut self, streams: JsValue) -> bool {
        let streams: Vec<Stream> = match serde_wasm_bindgen::from_value(streams) {
            Ok(streams) => streams,
            Err(err) => {
                web_sys::console::warn_1(
                    &format!("stream-tree: ignoring malformed stream records: {err}").into(),
                );
                return false;
            }
        };
        self.engine.set_streams(&streams);
        true
    }

    /// Override the layout configuration (sizes and spacing).
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> bool {
        let config: LayoutConfig = match serde_wasm_bindgen::from_value(config) {
            Ok(config) => config,
            Err(err) => {
                web_sys::console::warn_1(
                    &format!("stream-tree: ignoring malformed layout config: {err}").into(),
                );
                return false;
            }
        };
        self.engine.set_config(config);
        true
    }

    /// Report the container size; frames the tree on first render.
    #[wasm_bindgen(js_name = setContainerSize)]
    pub fn set_container_size(&mut self, width: f32, height: f32) {
        self.engine.set_container_size(width, height);
    }

    // =========================================================================
    // Selection / Focus
    // =========================================================================

    pub fn select(&mut self, id: &str) {
        self.engine.select(id);
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.engine.clear_selection();
    }

    #[wasm_bindgen(js_name = selectedId)]
    pub fn selected_id(&self) -> Option<String> {
        self.engine.selected_id().map(str::to_string)
    }

    /// Narrow the view to one lineage.
    #[wasm_bindgen(js_name = focusStream)]
    pub fn focus_stream(&mut self, id: &str) {
        self.engine.focus(id);
    }

    #[wasm_bindgen(js_name = exitFocus)]
    pub fn exit_focus(&mut self) {
        self.engine.exit_focus();
    }

    #[wasm_bindgen(js_name = focusedId)]
    pub fn focused_id(&self) -> Option<String> {
        self.engine.focused_id().map(str::to_string)
    }

    // =========================================================================
    // Pointer Events
    // =========================================================================

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.engine.pointer_down(Vec2::new(x, y));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.engine.pointer_move(Vec2::new(x, y));
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.engine.pointer_up(Vec2::new(x, y));
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    /// Zoom by a wheel delta, keeping the point under the cursor fixed.
    #[wasm_bindgen(js_name = wheelZoom)]
    pub fn wheel_zoom(&mut self, delta_zoom: f32, cursor_x: f32, cursor_y: f32) {
        self.engine
            .zoom_toward_cursor(delta_zoom, Vec2::new(cursor_x, cursor_y));
    }

    #[wasm_bindgen(js_name = panBy)]
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.engine.pan_by(Vec2::new(dx, dy));
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f32) {
        self.engine.set_zoom(zoom);
    }

    #[wasm_bindgen(js_name = setPan)]
    pub fn set_pan(&mut self, x: f32, y: f32) {
        self.engine.set_pan(Vec2::new(x, y));
    }

    /// Animated transition to a new pan (and optionally zoom).
    #[wasm_bindgen(js_name = animateViewTo)]
    pub fn animate_view_to(&mut self, pan_x: f32, pan_y: f32, zoom: Option<f32>, duration_ms: f64) {
        self.engine
            .animate_view_to(Vec2::new(pan_x, pan_y), zoom, duration_ms);
    }

    /// Animated zoom change keeping pan fixed.
    #[wasm_bindgen(js_name = animateZoomTo)]
    pub fn animate_zoom_to(&mut self, zoom: f32, duration_ms: f64) {
        self.engine.animate_zoom_to(zoom, duration_ms);
    }

    pub fn zoom(&self) -> f32 {
        self.engine.viewport().zoom()
    }

    #[wasm_bindgen(js_name = panX)]
    pub fn pan_x(&self) -> f32 {
        self.engine.viewport().pan().x
    }

    #[wasm_bindgen(js_name = panY)]
    pub fn pan_y(&self) -> f32 {
        self.engine.viewport().pan().y
    }

    /// Animate the viewport to frame the whole tree.
    #[wasm_bindgen(js_name = fitAll)]
    pub fn fit_all(&mut self) {
        self.engine.fit_all();
    }

    /// Advance animations; call from the frame loop with a monotonic
    /// timestamp. Returns true while a transition is running.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.engine.tick(now_ms)
    }

    // =========================================================================
    // Interaction Modes
    // =========================================================================

    #[wasm_bindgen(js_name = setPositionLock)]
    pub fn set_position_lock(&mut self, locked: bool) {
        self.engine.set_position_lock(locked);
    }

    #[wasm_bindgen(js_name = positionLock)]
    pub fn position_lock(&self) -> bool {
        self.engine.position_lock()
    }

    #[wasm_bindgen(js_name = toggleFreePan)]
    pub fn toggle_free_pan(&mut self) {
        self.engine.toggle_free_pan();
    }

    #[wasm_bindgen(js_name = freePan)]
    pub fn free_pan(&self) -> bool {
        self.engine.free_pan()
    }

    // =========================================================================
    // Data Out
    // =========================================================================

    /// Build and return the current frame's scene.
    pub fn scene(&mut self) -> JsValue {
        let scene = self.engine.scene();
        serde_wasm_bindgen::to_value(&scene).unwrap_or(JsValue::NULL)
    }

    /// Drain pending semantic events (selection, focus, persistence
    /// requests) accumulated since the last call.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> JsValue {
        let events = self.engine.drain_events();
        serde_wasm_bindgen::to_value(&events).unwrap_or(JsValue::NULL)
    }

    /// Node ids in rect-buffer order.
    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<String> {
        self.engine.node_ids()
    }

    /// Get a zero-copy view of the screen rects [x, y, w, h] per node,
    /// refreshed by the last `scene()` call.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately for drawing, do not store.
    #[wasm_bindgen(js_name = rectBufferView)]
    pub fn rect_buffer_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.rect_buffer()) }
    }

    /// Get a pointer to the rect buffer, for re-creating views after WASM
    /// memory growth.
    #[wasm_bindgen(js_name = rectBufferPtr)]
    pub fn rect_buffer_ptr(&self) -> *const f32 {
        self.engine.rect_buffer().as_ptr()
    }

    /// Length of the rect buffer in floats.
    #[wasm_bindgen(js_name = rectBufferLen)]
    pub fn rect_buffer_len(&self) -> usize {
        self.engine.rect_buffer().len()
    }

    /// Cancel in-flight animations and transient drag artifacts; call when
    /// the view unmounts.
    #[wasm_bindgen(js_name = cancelTransients)]
    pub fn cancel_transients(&mut self) {
        self.engine.cancel_transients();
    }
}

impl Default for StreamTreeWasm {
    fn default() -> Self {
        Self::new()
    }
}
