//! Drag gesture state machine.
//!
//! Each pointer-down starts a fresh gesture which resolves into exactly one
//! of: node click (select), node drag (reposition), canvas pan, or
//! connection drag (propose a child at the drop point). The controller is
//! pure state: it consumes pointer events and returns effects; the engine
//! applies them to offsets, viewport, and the outbound event queue.
//!
//! All positions are screen-space, relative to the container. Node-drag
//! deltas are divided by the current zoom here, since a screen-space delta
//! is not a world-space delta once zoom != 1.

use crate::geom::Vec2;

/// Max pointer travel, per axis, for a press to still count as a click.
/// Displacement at or above this is a drag.
pub const DRAG_THRESHOLD_PX: f32 = 3.0;

/// What the pointer went down on (resolved upstream by hit-testing).
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    Node(String),
    /// The connection handle of a node; upstream only reports this for
    /// nodes that may branch (not "done").
    ConnectionHandle(String),
    Canvas,
}

/// Effects a gesture asks the engine to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEffect {
    /// Sub-threshold release on a node.
    Select(String),
    /// Sub-threshold release on empty canvas.
    ClearSelection,
    /// Live node drag movement, already converted to world space.
    DragNodeBy { id: String, world_delta: Vec2 },
    /// Node drag released: finalize the offset and request persistence.
    CommitNodeDrag { id: String },
    /// Canvas pan movement (screen space).
    PanBy(Vec2),
    /// Connection drag in progress: draw the dashed preview to the cursor.
    ConnectionPreview { source_id: String, cursor: Vec2 },
    /// Connection drag released: propose a child at the drop point.
    CreateChild {
        parent_id: String,
        drop_screen: Vec2,
    },
    /// Remove preview artifacts (connection drag ended or canceled).
    ClearPreview,
}

#[derive(Debug, Clone, PartialEq)]
enum GestureState {
    Idle,
    /// Pointer is down on a node; not yet decided between click and drag.
    PendingNode {
        id: String,
        origin: Vec2,
        /// Crossed the threshold while position-locked: neither click nor
        /// drag may come out of this gesture anymore.
        dead: bool,
    },
    DraggingNode {
        id: String,
        last: Vec2,
    },
    DraggingConnection {
        source_id: String,
    },
    PanningCanvas {
        origin: Vec2,
        last: Vec2,
        moved: bool,
    },
}

/// Interprets pointer gestures against hit-test results.
pub struct DragController {
    state: GestureState,
    /// Pan-by-motion without a held button; any click exits.
    free_pan: bool,
    /// Disables node repositioning; clicks still select, canvas pan and
    /// connection drags are unaffected. Persisted across sessions by the host.
    position_lock: bool,
    last_cursor: Option<Vec2>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            free_pan: false,
            position_lock: false,
            last_cursor: None,
        }
    }

    pub fn free_pan(&self) -> bool {
        self.free_pan
    }

    pub fn toggle_free_pan(&mut self) {
        self.free_pan = !self.free_pan;
        self.last_cursor = None;
    }

    pub fn position_lock(&self) -> bool {
        self.position_lock
    }

    pub fn set_position_lock(&mut self, locked: bool) {
        self.position_lock = locked;
    }

    pub fn is_dragging_connection(&self) -> bool {
        matches!(self.state, GestureState::DraggingConnection { .. })
    }

    /// Start a gesture. A click always exits free-pan mode.
    pub fn pointer_down(&mut self, target: PointerTarget, pos: Vec2) -> Vec<GestureEffect> {
        self.free_pan = false;
        self.last_cursor = Some(pos);

        match target {
            PointerTarget::Node(id) => {
                self.state = GestureState::PendingNode {
                    id,
                    origin: pos,
                    dead: false,
                };
                Vec::new()
            }
            PointerTarget::ConnectionHandle(source_id) => {
                self.state = GestureState::DraggingConnection {
                    source_id: source_id.clone(),
                };
                vec![GestureEffect::ConnectionPreview {
                    source_id,
                    cursor: pos,
                }]
            }
            PointerTarget::Canvas => {
                self.state = GestureState::PanningCanvas {
                    origin: pos,
                    last: pos,
                    moved: false,
                };
                Vec::new()
            }
        }
    }

    /// Pointer movement; `zoom` converts screen deltas to world deltas for
    /// node drags.
    pub fn pointer_move(&mut self, pos: Vec2, zoom: f32) -> Vec<GestureEffect> {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        let previous_cursor = self.last_cursor.replace(pos);

        match &mut self.state {
            GestureState::Idle => {
                if self.free_pan {
                    if let Some(previous) = previous_cursor {
                        let delta = pos - previous;
                        if delta != Vec2::ZERO {
                            return vec![GestureEffect::PanBy(delta)];
                        }
                    }
                }
                Vec::new()
            }
            GestureState::PendingNode { id, origin, dead } => {
                let displacement = pos - *origin;
                let past_threshold = displacement.x.abs() >= DRAG_THRESHOLD_PX
                    || displacement.y.abs() >= DRAG_THRESHOLD_PX;
                if !past_threshold || *dead {
                    return Vec::new();
                }
                if self.position_lock {
                    // Drag attempt while locked: the gesture can no longer
                    // select on release either.
                    *dead = true;
                    return Vec::new();
                }
                let id = id.clone();
                let world_delta = displacement / zoom;
                self.state = GestureState::DraggingNode {
                    id: id.clone(),
                    last: pos,
                };
                vec![GestureEffect::DragNodeBy { id, world_delta }]
            }
            GestureState::DraggingNode { id, last } => {
                let delta = pos - *last;
                *last = pos;
                if delta == Vec2::ZERO {
                    return Vec::new();
                }
                vec![GestureEffect::DragNodeBy {
                    id: id.clone(),
                    world_delta: delta / zoom,
                }]
            }
            GestureState::DraggingConnection { source_id } => {
                vec![GestureEffect::ConnectionPreview {
                    source_id: source_id.clone(),
                    cursor: pos,
                }]
            }
            GestureState::PanningCanvas {
                origin,
                last,
                moved,
            } => {
                let displacement = pos - *origin;
                if displacement.x.abs() >= DRAG_THRESHOLD_PX
                    || displacement.y.abs() >= DRAG_THRESHOLD_PX
                {
                    *moved = true;
                }
                let delta = pos - *last;
                *last = pos;
                if delta == Vec2::ZERO {
                    return Vec::new();
                }
                vec![GestureEffect::PanBy(delta)]
            }
        }
    }

    /// Finish the gesture.
    pub fn pointer_up(&mut self, pos: Vec2) -> Vec<GestureEffect> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        match state {
            GestureState::Idle => Vec::new(),
            GestureState::PendingNode { id, dead, .. } => {
                if dead {
                    Vec::new()
                } else {
                    vec![GestureEffect::Select(id)]
                }
            }
            GestureState::DraggingNode { id, .. } => {
                vec![GestureEffect::CommitNodeDrag { id }]
            }
            GestureState::DraggingConnection { source_id } => vec![
                GestureEffect::ClearPreview,
                GestureEffect::CreateChild {
                    parent_id: source_id,
                    drop_screen: pos,
                },
            ],
            GestureState::PanningCanvas { moved, .. } => {
                if moved {
                    Vec::new()
                } else {
                    vec![GestureEffect::ClearSelection]
                }
            }
        }
    }

    /// Abort any in-progress gesture (unmount, focus exit).
    pub fn cancel(&mut self) -> Vec<GestureEffect> {
        let was_connection = self.is_dragging_connection();
        self.state = GestureState::Idle;
        self.last_cursor = None;
        if was_connection {
            vec![GestureEffect::ClearPreview]
        } else {
            Vec::new()
        }
    }
}
