//! Viewport controller - zoom, pan, and animated transitions.
//!
//! Screen coordinates are `pan + world * zoom`. Zoom is clamped to
//! [MIN_ZOOM, MAX_ZOOM] everywhere it can change. At most one transition is
//! in flight; direct setters and new transitions cancel it.

use crate::geom::{Rect, Vec2};

use super::animation::{Lerp, Tween};

pub const MIN_ZOOM: f32 = 0.2;
pub const MAX_ZOOM: f32 = 3.0;

/// Screen padding used when framing the whole tree.
pub const FIT_PADDING: f32 = 60.0;
/// Screen margin a node must stay inside before auto-pan kicks in.
pub const AUTO_PAN_MARGIN: f32 = 40.0;

const FIT_DURATION_MS: f64 = 400.0;
const AUTO_PAN_DURATION_MS: f64 = 300.0;

/// Pan and zoom interpolated together during a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Lerp for ViewTransform {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        ViewTransform {
            pan: self.pan.lerp(other.pan, t),
            zoom: self.zoom.lerp(other.zoom, t),
        }
    }
}

/// Owns the session-local viewport state.
pub struct ViewportController {
    pan: Vec2,
    zoom: f32,
    animation: Option<Tween<ViewTransform>>,
    /// Guard against auto-pan re-triggering on every re-render; motion only
    /// resumes when the target node id changes.
    last_auto_pan_id: Option<String>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            animation: None,
            last_auto_pan_id: None,
        }
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Direct setter for continuous gestures; cancels any transition.
    pub fn set_pan(&mut self, pan: Vec2) {
        self.animation = None;
        self.pan = pan;
    }

    /// Shift the pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.animation = None;
        self.pan = self.pan + delta;
    }

    /// Direct zoom setter; clamped, cancels any transition.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.animation = None;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.zoom
    }

    /// Start an animated transition to a new pan (and optionally zoom).
    /// Replaces any in-flight transition.
    pub fn animate_view_to(&mut self, target_pan: Vec2, target_zoom: Option<f32>, duration_ms: f64) {
        let from = ViewTransform {
            pan: self.pan,
            zoom: self.zoom,
        };
        let to = ViewTransform {
            pan: target_pan,
            zoom: target_zoom
                .map(|z| z.clamp(MIN_ZOOM, MAX_ZOOM))
                .unwrap_or(self.zoom),
        };
        self.animation = Some(Tween::new(from, to, duration_ms));
    }

    /// Animated zoom change keeping pan fixed.
    pub fn animate_zoom_to(&mut self, target_zoom: f32, duration_ms: f64) {
        self.animate_view_to(self.pan, Some(target_zoom), duration_ms);
    }

    /// Advance the in-flight transition. Returns true while one is active so
    /// the host knows to keep its frame loop running.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let (value, finished) = animation.sample(now_ms);
        self.pan = value.pan;
        self.zoom = value.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if finished {
            self.animation = None;
        }
        self.animation.is_some()
    }

    pub fn cancel_animation(&mut self) {
        self.animation = None;
    }

    /// Zoom by a delta while keeping the world point under the cursor fixed
    /// on screen. Immediate (wheel gesture), no animation.
    pub fn zoom_toward_cursor(&mut self, delta_zoom: f32, cursor: Vec2) {
        self.animation = None;
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom + delta_zoom).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == old_zoom {
            return;
        }
        // Solve pan so cursor maps to the same world point at the new zoom.
        self.pan = cursor - (cursor - self.pan) * (new_zoom / old_zoom);
        self.zoom = new_zoom;
    }

    /// Frame the bounding box of all effective node rects inside the
    /// container. No nodes or a degenerate container is a no-op.
    pub fn fit_all_to_viewport(&mut self, bounds: Option<Rect>, container: Vec2, padding: f32) {
        let Some(bounds) = bounds else {
            return;
        };
        if container.x <= 0.0 || container.y <= 0.0 {
            return;
        }
        let avail_w = container.x - 2.0 * padding;
        let avail_h = container.y - 2.0 * padding;
        if avail_w <= 0.0 || avail_h <= 0.0 || bounds.width <= 0.0 || bounds.height <= 0.0 {
            return;
        }

        // min(ratio_w, ratio_h, 3) then floor at 0.2.
        let zoom = (avail_w / bounds.width)
            .min(avail_h / bounds.height)
            .min(MAX_ZOOM)
            .max(MIN_ZOOM);

        let pan = Vec2::new(
            (container.x - bounds.width * zoom) / 2.0 - bounds.x * zoom,
            (container.y - bounds.height * zoom) / 2.0 - bounds.y * zoom,
        );
        self.animate_view_to(pan, Some(zoom), FIT_DURATION_MS);
    }

    /// Pan just enough that a node's screen rect sits inside the container
    /// margins. Re-renders with the same target id do not re-trigger motion.
    pub fn auto_pan_into_view(
        &mut self,
        node_id: &str,
        screen_rect: Rect,
        container: Vec2,
        margin: f32,
    ) {
        if self.last_auto_pan_id.as_deref() == Some(node_id) {
            return;
        }
        self.last_auto_pan_id = Some(node_id.to_string());

        if container.x <= 0.0 || container.y <= 0.0 {
            return;
        }

        let delta = Vec2::new(
            pan_correction(screen_rect.x, screen_rect.x + screen_rect.width, container.x, margin),
            pan_correction(screen_rect.y, screen_rect.y + screen_rect.height, container.y, margin),
        );
        if delta == Vec2::ZERO {
            return;
        }
        self.animate_view_to(self.pan + delta, None, AUTO_PAN_DURATION_MS);
    }

    /// Forget the auto-pan guard, e.g. when selection is cleared.
    pub fn reset_auto_pan_guard(&mut self) {
        self.last_auto_pan_id = None;
    }
}

/// Minimal shift that brings [lo, hi] inside [margin, extent - margin].
/// Zero when the interval already fits (or is larger than the window).
fn pan_correction(lo: f32, hi: f32, extent: f32, margin: f32) -> f32 {
    if lo < margin {
        margin - lo
    } else if hi > extent - margin {
        (extent - margin - hi).min(0.0).max(margin - lo)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_clamped_under_any_sequence() {
        let mut vp = ViewportController::new();
        vp.set_zoom(10.0);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        vp.set_zoom(-1.0);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        vp.zoom_toward_cursor(100.0, Vec2::ZERO);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        vp.zoom_toward_cursor(-100.0, Vec2::ZERO);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        vp.animate_zoom_to(50.0, 0.0);
        vp.tick(0.0);
        assert_eq!(vp.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_zoom_toward_cursor_keeps_point_fixed() {
        let mut vp = ViewportController::new();
        vp.set_pan(Vec2::new(30.0, -10.0));
        vp.set_zoom(1.0);

        let cursor = Vec2::new(200.0, 150.0);
        let world_before = vp.screen_to_world(cursor);
        vp.zoom_toward_cursor(0.5, cursor);
        let world_after = vp.screen_to_world(cursor);

        assert!((world_before.x - world_after.x).abs() < 1e-3);
        assert!((world_before.y - world_after.y).abs() < 1e-3);
    }

    #[test]
    fn test_screen_world_round_trip() {
        let mut vp = ViewportController::new();
        vp.set_pan(Vec2::new(17.0, 23.0));
        vp.set_zoom(1.7);
        let world = Vec2::new(123.0, -456.0);
        let back = vp.screen_to_world(vp.world_to_screen(world));
        assert!((back.x - world.x).abs() < 1e-3);
        assert!((back.y - world.y).abs() < 1e-3);
    }

    #[test]
    fn test_fit_all_scenario() {
        // Single 320x100 node at origin, 800x600 container, padding 60:
        // min(680/320, 480/100, 3) = 2.125.
        let mut vp = ViewportController::new();
        vp.fit_all_to_viewport(
            Some(Rect::new(0.0, 0.0, 320.0, 100.0)),
            Vec2::new(800.0, 600.0),
            FIT_PADDING,
        );
        // Run the transition to completion.
        vp.tick(0.0);
        assert!(!vp.tick(10_000.0));
        assert!((vp.zoom() - 2.125).abs() < 1e-4, "zoom = {}", vp.zoom());

        // Content is centered.
        let center = vp.world_to_screen(Vec2::new(160.0, 50.0));
        assert!((center.x - 400.0).abs() < 0.5);
        assert!((center.y - 300.0).abs() < 0.5);
    }

    #[test]
    fn test_fit_all_caps_at_max_zoom() {
        let mut vp = ViewportController::new();
        // Tiny content: ratio would exceed 3, hard cap wins.
        vp.fit_all_to_viewport(
            Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            Vec2::new(800.0, 600.0),
            FIT_PADDING,
        );
        vp.tick(0.0);
        vp.tick(10_000.0);
        assert_eq!(vp.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_fit_all_noop_without_nodes_or_container() {
        let mut vp = ViewportController::new();
        let before = (vp.pan(), vp.zoom());
        vp.fit_all_to_viewport(None, Vec2::new(800.0, 600.0), FIT_PADDING);
        vp.fit_all_to_viewport(
            Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
            Vec2::ZERO,
            FIT_PADDING,
        );
        assert!(!vp.is_animating());
        assert_eq!((vp.pan(), vp.zoom()), before);
    }

    #[test]
    fn test_new_animation_replaces_old() {
        let mut vp = ViewportController::new();
        vp.animate_view_to(Vec2::new(100.0, 0.0), None, 1000.0);
        vp.tick(0.0);
        vp.tick(100.0);
        // Retarget mid-flight; the old target must never be reached.
        vp.animate_view_to(Vec2::new(-500.0, 0.0), None, 100.0);
        vp.tick(200.0);
        vp.tick(10_000.0);
        assert_eq!(vp.pan(), Vec2::new(-500.0, 0.0));
    }

    #[test]
    fn test_direct_setters_cancel_animation() {
        let mut vp = ViewportController::new();
        vp.animate_view_to(Vec2::new(100.0, 100.0), Some(2.0), 1000.0);
        assert!(vp.is_animating());
        vp.set_pan(Vec2::ZERO);
        assert!(!vp.is_animating());
    }

    #[test]
    fn test_auto_pan_only_when_outside_margins() {
        let mut vp = ViewportController::new();
        // Fully inside the margins: records the id but no motion.
        vp.auto_pan_into_view(
            "a",
            Rect::new(100.0, 100.0, 200.0, 100.0),
            Vec2::new(800.0, 600.0),
            AUTO_PAN_MARGIN,
        );
        assert!(!vp.is_animating());

        // A different node hanging off the left edge triggers a pan.
        vp.auto_pan_into_view(
            "b",
            Rect::new(-50.0, 100.0, 200.0, 100.0),
            Vec2::new(800.0, 600.0),
            AUTO_PAN_MARGIN,
        );
        assert!(vp.is_animating());
        vp.tick(0.0);
        vp.tick(10_000.0);
        assert_eq!(vp.pan(), Vec2::new(90.0, 0.0));
    }

    #[test]
    fn test_auto_pan_does_not_retrigger_for_same_id() {
        let mut vp = ViewportController::new();
        let off_screen = Rect::new(-50.0, 100.0, 200.0, 100.0);
        let container = Vec2::new(800.0, 600.0);

        vp.auto_pan_into_view("a", off_screen, container, AUTO_PAN_MARGIN);
        assert!(vp.is_animating());
        vp.tick(0.0);
        vp.tick(10_000.0);
        let settled = vp.pan();

        // Same id on re-render: no new motion even though the rect is stale.
        vp.auto_pan_into_view("a", off_screen, container, AUTO_PAN_MARGIN);
        assert!(!vp.is_animating());
        assert_eq!(vp.pan(), settled);

        // Until the guard resets.
        vp.reset_auto_pan_guard();
        vp.auto_pan_into_view("a", off_screen, container, AUTO_PAN_MARGIN);
        assert!(vp.is_animating());
    }

    #[test]
    fn test_tick_reports_active_transition() {
        let mut vp = ViewportController::new();
        assert!(!vp.tick(0.0));
        vp.animate_view_to(Vec2::new(10.0, 10.0), None, 100.0);
        assert!(vp.tick(0.0));
        assert!(!vp.tick(1_000.0));
        assert_eq!(vp.pan(), Vec2::new(10.0, 10.0));
    }
}
