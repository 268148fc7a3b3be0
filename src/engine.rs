//! TreeViewEngine - coordinates the visualization pipeline.
//!
//! Owns the derived state (arena → focus projection → layout → spatial
//! index) and the mutable interaction state (selection, focus, offsets,
//! viewport, gesture machine). The host pushes stream records and pointer
//! events in, drains semantic events out, and asks for a scene per frame.
//!
//! Persistence is fire-and-forget: drag commits and child proposals become
//! outbound events carrying absolute positions; nothing here waits on
//! storage or rolls back on its failure.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::geom::{Rect, Vec2};
use crate::interact::{DragController, GestureEffect, PointerTarget};
use crate::layout::{
    self, FocusProjection, LayoutConfig, NodePayload, TreeLayout, build_display_tree,
};
use crate::render::{self, CONNECTION_HANDLE_RADIUS_PX, Scene, SceneParams};
use crate::spatial::{NodeRegion, SpatialIndex};
use crate::stream::{Stream, StreamArena, StreamStatus};
use crate::view::{PositionOffsetStore, ViewportController, viewport};

/// Semantic events drained by the host after each interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineEvent {
    SelectStream { id: String },
    SelectionCleared,
    FocusStream { id: String },
    ExitFocus,
    /// Commit a node's absolute position to storage.
    UpdatePosition { id: String, x: f32, y: f32 },
    /// Propose a new child at a world-space drop point.
    CreateChild { parent_id: String, x: f32, y: f32 },
}

/// The engine behind the facade; pure Rust, fully testable without JS.
pub struct TreeViewEngine {
    arena: StreamArena,
    config: LayoutConfig,

    focused_id: Option<String>,
    selected_id: Option<String>,
    hovered_handle_id: Option<String>,

    projection: FocusProjection,
    layout: TreeLayout,

    offsets: PositionOffsetStore,
    viewport: ViewportController,
    drag: DragController,
    spatial: SpatialIndex,

    container: Vec2,
    events: Vec<EngineEvent>,
    /// Active connection drag: source id + cursor screen position.
    connection_preview: Option<(String, Vec2)>,
    /// Fit-all has run for the current tree.
    framed: bool,

    /// Screen rects [x, y, w, h] per node in layout order, refreshed on each
    /// scene build; exposed as a zero-copy view for fast drawing.
    rect_buf: Vec<f32>,
}

impl Default for TreeViewEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeViewEngine {
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        let mut engine = Self {
            arena: StreamArena::build(&[]),
            config,
            focused_id: None,
            selected_id: None,
            hovered_handle_id: None,
            projection: FocusProjection {
                roots: Vec::new(),
                ancestor_chain: Vec::new(),
            },
            layout: TreeLayout::default(),
            offsets: PositionOffsetStore::new(),
            viewport: ViewportController::new(),
            drag: DragController::new(),
            spatial: SpatialIndex::new(),
            container: Vec2::ZERO,
            events: Vec::new(),
            connection_preview: None,
            framed: false,
            rect_buf: Vec::new(),
        };
        engine.recompute();
        engine
    }

    // =========================================================================
    // Data In
    // =========================================================================

    /// Replace the hierarchy with a fresh record list (push model).
    pub fn set_streams(&mut self, streams: &[Stream]) {
        let was_empty = self.arena.is_empty();
        self.arena = StreamArena::build(streams);

        // Manual positions survive by id; drop the ones whose stream is gone.
        let live_ids: HashSet<String> = self.arena.streams().map(|s| s.id.clone()).collect();
        self.offsets.retain_ids(&live_ids);

        // Focus target deleted concurrently: exit focus automatically.
        if let Some(focused) = self.focused_id.clone() {
            if !self.arena.contains(&focused) {
                self.focused_id = None;
                self.viewport.cancel_animation();
                self.events.push(EngineEvent::ExitFocus);
            }
        }

        if was_empty && !self.arena.is_empty() {
            self.framed = false;
        }

        self.recompute();
        self.maybe_frame_initial();
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
        self.recompute();
    }

    /// Report the container size; frames the tree on first opportunity.
    pub fn set_container_size(&mut self, width: f32, height: f32) {
        self.container = Vec2::new(width, height);
        self.maybe_frame_initial();
    }

    // =========================================================================
    // Selection / Focus
    // =========================================================================

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focused_id.as_deref()
    }

    /// Select a stream and nudge it into view.
    pub fn select(&mut self, id: &str) {
        let Some(node) = self.layout.node(id) else {
            return;
        };
        if node.is_collapsed_placeholder() {
            return;
        }
        if self.selected_id.as_deref() != Some(id) {
            self.viewport.cancel_animation();
        }
        let rect = self.screen_rect_of(id);
        self.selected_id = Some(id.to_string());
        self.events.push(EngineEvent::SelectStream {
            id: id.to_string(),
        });
        if let Some(rect) = rect {
            self.viewport
                .auto_pan_into_view(id, rect, self.container, viewport::AUTO_PAN_MARGIN);
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selected_id.take().is_some() {
            self.events.push(EngineEvent::SelectionCleared);
            self.viewport.reset_auto_pan_guard();
        }
    }

    /// Narrow the view to one lineage.
    pub fn focus(&mut self, id: &str) {
        if !self.arena.contains(id) {
            return;
        }
        self.focused_id = Some(id.to_string());
        self.viewport.cancel_animation();
        self.events.push(EngineEvent::FocusStream {
            id: id.to_string(),
        });
        self.recompute();
    }

    pub fn exit_focus(&mut self) {
        if self.focused_id.take().is_none() {
            return;
        }
        self.viewport.cancel_animation();
        let cancel_effects = self.drag.cancel();
        self.apply_effects(cancel_effects);
        self.events.push(EngineEvent::ExitFocus);
        self.recompute();
    }

    // =========================================================================
    // Pointer Events
    // =========================================================================

    /// Resolve what lives under a screen-space point: connection handles
    /// first (they overhang the node edge), then node bodies, else canvas.
    pub fn resolve_target(&self, screen: Vec2) -> PointerTarget {
        if let Some(id) = self.handle_at(screen) {
            return PointerTarget::ConnectionHandle(id);
        }
        let world = self.viewport.screen_to_world(screen);
        match self.spatial.hit_test(world) {
            Some(region) => PointerTarget::Node(region.id.clone()),
            None => PointerTarget::Canvas,
        }
    }

    pub fn pointer_down(&mut self, screen: Vec2) {
        let target = self.resolve_target(screen);
        let effects = self.drag.pointer_down(target, screen);
        self.apply_effects(effects);
    }

    pub fn pointer_move(&mut self, screen: Vec2) {
        let effects = self.drag.pointer_move(screen, self.viewport.zoom());
        self.apply_effects(effects);

        // Hover affordance only outside an active connection drag.
        if !self.drag.is_dragging_connection() {
            self.hovered_handle_id = self.handle_at(screen);
        }
    }

    pub fn pointer_up(&mut self, screen: Vec2) {
        let effects = self.drag.pointer_up(screen);
        self.apply_effects(effects);
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.viewport.set_zoom(zoom);
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.viewport.set_pan(pan);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
    }

    pub fn animate_view_to(&mut self, pan: Vec2, zoom: Option<f32>, duration_ms: f64) {
        self.viewport.animate_view_to(pan, zoom, duration_ms);
    }

    pub fn animate_zoom_to(&mut self, zoom: f32, duration_ms: f64) {
        self.viewport.animate_zoom_to(zoom, duration_ms);
    }

    pub fn zoom_toward_cursor(&mut self, delta_zoom: f32, cursor: Vec2) {
        self.viewport.zoom_toward_cursor(delta_zoom, cursor);
    }

    /// Frame the whole tree (animated).
    pub fn fit_all(&mut self) {
        self.viewport.fit_all_to_viewport(
            self.effective_bounds(),
            self.container,
            viewport::FIT_PADDING,
        );
    }

    /// Advance animations; true while one is running.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.viewport.tick(now_ms)
    }

    // =========================================================================
    // Interaction Modes
    // =========================================================================

    pub fn position_lock(&self) -> bool {
        self.drag.position_lock()
    }

    pub fn set_position_lock(&mut self, locked: bool) {
        self.drag.set_position_lock(locked);
    }

    pub fn free_pan(&self) -> bool {
        self.drag.free_pan()
    }

    pub fn toggle_free_pan(&mut self) {
        self.drag.toggle_free_pan();
    }

    // =========================================================================
    // Data Out
    // =========================================================================

    /// Build the current frame's scene and refresh the rect buffer.
    pub fn scene(&mut self) -> Scene {
        let scene = render::build_scene(&SceneParams {
            layout: &self.layout,
            offsets: &self.offsets,
            viewport: &self.viewport,
            config: &self.config,
            selected_id: self.selected_id.as_deref(),
            focused_id: self.focused_id.as_deref(),
            hovered_handle_id: self.hovered_handle_id.as_deref(),
            connection_preview: self
                .connection_preview
                .as_ref()
                .map(|(id, cursor)| (id.as_str(), *cursor)),
        });

        self.rect_buf.clear();
        self.rect_buf.reserve(scene.nodes.len() * 4);
        for node in &scene.nodes {
            self.rect_buf
                .extend_from_slice(&[node.x, node.y, node.width, node.height]);
        }

        scene
    }

    /// Node ids in rect-buffer order.
    pub fn node_ids(&self) -> Vec<String> {
        self.layout.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// The screen-rect buffer behind the zero-copy view.
    pub fn rect_buffer(&self) -> &[f32] {
        &self.rect_buf
    }

    /// Take all pending semantic events.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Cancel animations and transient artifacts (view unmounting).
    pub fn cancel_transients(&mut self) {
        self.viewport.cancel_animation();
        let effects = self.drag.cancel();
        self.apply_effects(effects);
        self.hovered_handle_id = None;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn recompute(&mut self) {
        let display = build_display_tree(&self.arena);
        self.projection = layout::focus::project(&display, self.focused_id.as_deref());

        self.layout = layout::tree::compute_layout(&self.projection.roots, &self.config);
        if self.projection.is_focused() {
            layout::focus::align_timeline_rows(
                &mut self.layout.nodes,
                &self.projection.ancestor_chain,
                &self.config,
            );
        }

        // Convert persisted absolute positions into offsets, once per id.
        let persisted: HashMap<String, Vec2> = self
            .arena
            .streams()
            .filter_map(|s| match (s.position_x, s.position_y) {
                (Some(x), Some(y)) => Some((s.id.clone(), Vec2::new(x, y))),
                _ => None,
            })
            .collect();
        self.offsets.seed_from_persisted(&self.layout.nodes, &persisted);

        self.rebuild_spatial();

        // Selection folded into a placeholder (or deleted): clear it.
        if let Some(selected) = self.selected_id.clone() {
            let still_real = self
                .layout
                .node(&selected)
                .is_some_and(|n| !n.is_collapsed_placeholder());
            if !still_real {
                self.selected_id = None;
                self.events.push(EngineEvent::SelectionCleared);
                self.viewport.reset_auto_pan_guard();
            }
        }
    }

    fn rebuild_spatial(&mut self) {
        let regions: Vec<NodeRegion> = self
            .layout
            .nodes
            .iter()
            .enumerate()
            .map(|(order, node)| {
                NodeRegion::new(
                    node.id.clone(),
                    render::effective_rect(node, &self.offsets),
                    order,
                )
            })
            .collect();
        self.spatial.rebuild(regions);
    }

    fn apply_effects(&mut self, effects: Vec<GestureEffect>) {
        for effect in effects {
            match effect {
                GestureEffect::Select(id) => self.select(&id),
                GestureEffect::ClearSelection => self.clear_selection(),
                GestureEffect::DragNodeBy { id, world_delta } => {
                    // Placeholders are synthetic; repositioning them would
                    // outlive the projection they came from.
                    let is_real = self
                        .layout
                        .node(&id)
                        .is_some_and(|n| !n.is_collapsed_placeholder());
                    if is_real {
                        let next = self.offsets.offset_of(&id) + world_delta;
                        self.offsets.set_offset(&id, next);
                    }
                }
                GestureEffect::CommitNodeDrag { id } => {
                    if let Some(node) = self.layout.node(&id) {
                        if !node.is_collapsed_placeholder() {
                            let absolute = self.offsets.effective_position(node);
                            self.events.push(EngineEvent::UpdatePosition {
                                id: id.clone(),
                                x: absolute.x,
                                y: absolute.y,
                            });
                        }
                    }
                    self.rebuild_spatial();
                }
                GestureEffect::PanBy(delta) => self.viewport.pan_by(delta),
                GestureEffect::ConnectionPreview { source_id, cursor } => {
                    self.connection_preview = Some((source_id, cursor));
                }
                GestureEffect::CreateChild {
                    parent_id,
                    drop_screen,
                } => {
                    let drop = self.viewport.screen_to_world(drop_screen);
                    self.events.push(EngineEvent::CreateChild {
                        parent_id,
                        x: drop.x,
                        y: drop.y,
                    });
                }
                GestureEffect::ClearPreview => {
                    self.connection_preview = None;
                }
            }
        }
    }

    /// Connection handle under a screen point, if any.
    fn handle_at(&self, screen: Vec2) -> Option<String> {
        let radius_sq = CONNECTION_HANDLE_RADIUS_PX * CONNECTION_HANDLE_RADIUS_PX;
        // Later-drawn nodes win, same as rect hit-testing.
        for node in self.layout.nodes.iter().rev() {
            let NodePayload::Stream(stream) = &node.payload else {
                continue;
            };
            if stream.status == StreamStatus::Done {
                continue;
            }
            let Some(rect) = self.screen_rect_of(&node.id) else {
                continue;
            };
            let center = render::handle_center(&rect);
            let d = screen - center;
            if d.x * d.x + d.y * d.y <= radius_sq {
                return Some(node.id.clone());
            }
        }
        None
    }

    /// Effective screen-space rect of a laid-out node.
    fn screen_rect_of(&self, id: &str) -> Option<Rect> {
        let node = self.layout.node(id)?;
        let world = render::effective_rect(node, &self.offsets);
        let top_left = self.viewport.world_to_screen(world.min());
        let zoom = self.viewport.zoom();
        Some(Rect::new(
            top_left.x,
            top_left.y,
            world.width * zoom,
            world.height * zoom,
        ))
    }

    /// Bounding box of all effective node rects, world space.
    fn effective_bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for node in &self.layout.nodes {
            let rect = render::effective_rect(node, &self.offsets);
            bounds = Some(match bounds {
                Some(b) => b.union(&rect),
                None => rect,
            });
        }
        bounds
    }

    fn maybe_frame_initial(&mut self) {
        if self.framed || self.layout.nodes.is_empty() {
            return;
        }
        if self.container.x <= 0.0 || self.container.y <= 0.0 {
            return;
        }
        self.fit_all();
        self.framed = true;
    }
}
