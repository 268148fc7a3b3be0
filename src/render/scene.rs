//! Screen-space scene assembly.
//!
//! Consumes the resolved node/link list, the viewport transform, and the
//! transient interaction state, and produces draw-ready primitives: node
//! rects with badge data, links from parent right-center to child
//! left-center, the connection-drag preview, and ancestor-chain emphasis
//! (everything off the root→selected path dims).

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::geom::{Rect, Vec2};
use crate::layout::{LayoutConfig, NodePayload, TreeLayout};
use crate::stream::{SourceType, StreamStatus};
use crate::view::{PositionOffsetStore, ViewportController};

/// Opacity for nodes and links off the selected ancestor path.
pub const DIMMED_OPACITY: f32 = 0.35;

/// Screen-space radius of the connection handle circle. Fixed in screen
/// pixels so the handle stays clickable at low zoom.
pub const CONNECTION_HANDLE_RADIUS_PX: f32 = 10.0;

/// A node ready to draw, in screen coordinates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: String,
    pub title: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub status: Option<StreamStatus>,
    pub source_type: Option<SourceType>,
    pub is_collapsed_placeholder: bool,
    /// Fold size badge for placeholders.
    pub collapsed_count: Option<usize>,
    /// Dependency badge for real streams.
    pub dependency_count: usize,
    pub selected: bool,
    pub focused: bool,
    pub opacity: f32,
    /// Connection handle, present on branchable (non-done, real) nodes.
    pub handle: Option<SceneHandle>,
}

/// The connection handle circle at a node's right edge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneHandle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub hovered: bool,
}

/// A link to draw, parent right-center → child left-center, screen space.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneLink {
    pub source_id: String,
    pub target_id: String,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub opacity: f32,
}

/// Dashed preview link and drop box shown during a connection drag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePreview {
    pub source_id: String,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub box_x: f32,
    pub box_y: f32,
    pub box_width: f32,
    pub box_height: f32,
}

/// Everything the drawing layer needs for one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
    pub preview: Option<ScenePreview>,
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

/// Inputs to scene assembly.
pub struct SceneParams<'a> {
    pub layout: &'a TreeLayout,
    pub offsets: &'a PositionOffsetStore,
    pub viewport: &'a ViewportController,
    pub config: &'a LayoutConfig,
    pub selected_id: Option<&'a str>,
    pub focused_id: Option<&'a str>,
    pub hovered_handle_id: Option<&'a str>,
    /// Active connection drag: source node id and cursor screen position.
    pub connection_preview: Option<(&'a str, Vec2)>,
}

/// Effective world-space rect of a laid-out node.
pub fn effective_rect(
    node: &crate::layout::TreeNode,
    offsets: &PositionOffsetStore,
) -> Rect {
    let position = offsets.effective_position(node);
    Rect::new(position.x, position.y, node.width, node.height)
}

/// Screen-space center of a node's connection handle.
pub fn handle_center(screen_rect: &Rect) -> Vec2 {
    Vec2::new(
        screen_rect.x + screen_rect.width,
        screen_rect.y + screen_rect.height / 2.0,
    )
}

/// Assemble the scene for one frame.
pub fn build_scene(params: &SceneParams<'_>) -> Scene {
    let viewport = params.viewport;
    let zoom = viewport.zoom();

    // Root→selected path for emphasis, walked via parent pointers.
    let emphasized = ancestor_path_set(params.layout, params.selected_id);

    let mut screen_rects: HashMap<&str, Rect> = HashMap::with_capacity(params.layout.nodes.len());
    let mut nodes: Vec<SceneNode> = Vec::with_capacity(params.layout.nodes.len());

    for node in &params.layout.nodes {
        let world = effective_rect(node, params.offsets);
        let top_left = viewport.world_to_screen(world.min());
        let screen = Rect::new(top_left.x, top_left.y, world.width * zoom, world.height * zoom);
        screen_rects.insert(node.id.as_str(), screen);

        let dimmed = params.selected_id.is_some() && !emphasized.contains(node.id.as_str());
        let (status, source_type, dependency_count, collapsed_count, title) = match &node.payload {
            NodePayload::Stream(stream) => (
                Some(stream.status),
                Some(stream.source_type),
                stream.dependencies.len(),
                None,
                stream.title.clone(),
            ),
            NodePayload::Collapsed { count, .. } => {
                let title = if *count == 1 {
                    "1 stream".to_string()
                } else {
                    format!("{count} streams")
                };
                (None, None, 0, Some(*count), title)
            }
        };

        let handle = if status.is_some_and(|s| s != StreamStatus::Done) {
            let center = handle_center(&screen);
            Some(SceneHandle {
                x: center.x,
                y: center.y,
                radius: CONNECTION_HANDLE_RADIUS_PX,
                hovered: params.hovered_handle_id == Some(node.id.as_str()),
            })
        } else {
            None
        };

        nodes.push(SceneNode {
            id: node.id.clone(),
            title,
            x: screen.x,
            y: screen.y,
            width: screen.width,
            height: screen.height,
            status,
            source_type,
            is_collapsed_placeholder: node.is_collapsed_placeholder(),
            collapsed_count,
            dependency_count,
            selected: params.selected_id == Some(node.id.as_str()),
            focused: params.focused_id == Some(node.id.as_str()),
            opacity: if dimmed { DIMMED_OPACITY } else { 1.0 },
            handle,
        });
    }

    let mut links: Vec<SceneLink> = Vec::with_capacity(params.layout.links.len());
    for link in &params.layout.links {
        let (Some(source), Some(target)) = (
            screen_rects.get(link.source_id.as_str()),
            screen_rects.get(link.target_id.as_str()),
        ) else {
            continue;
        };
        let on_path = emphasized.contains(link.source_id.as_str())
            && emphasized.contains(link.target_id.as_str());
        let dimmed = params.selected_id.is_some() && !on_path;
        links.push(SceneLink {
            source_id: link.source_id.clone(),
            target_id: link.target_id.clone(),
            x1: source.x + source.width,
            y1: source.y + source.height / 2.0,
            x2: target.x,
            y2: target.y + target.height / 2.0,
            opacity: if dimmed { DIMMED_OPACITY } else { 1.0 },
        });
    }

    let preview = params.connection_preview.and_then(|(source_id, cursor)| {
        let source = screen_rects.get(source_id)?;
        let from = handle_center(source);
        let box_width = params.config.node_width * zoom;
        let box_height = params.config.node_height * zoom;
        Some(ScenePreview {
            source_id: source_id.to_string(),
            x1: from.x,
            y1: from.y,
            x2: cursor.x,
            y2: cursor.y,
            box_x: cursor.x,
            box_y: cursor.y - box_height / 2.0,
            box_width,
            box_height,
        })
    });

    let pan = viewport.pan();
    Scene {
        nodes,
        links,
        preview,
        zoom,
        pan_x: pan.x,
        pan_y: pan.y,
    }
}

/// Ids on the root→selected path, empty set when nothing is selected.
fn ancestor_path_set<'a>(
    layout: &'a TreeLayout,
    selected_id: Option<&str>,
) -> HashSet<&'a str> {
    let mut path: HashSet<&'a str> = HashSet::new();
    let Some(selected_id) = selected_id else {
        return path;
    };

    let by_id: HashMap<&str, &crate::layout::TreeNode> = layout
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n))
        .collect();

    let mut current = by_id.get(selected_id).copied();
    while let Some(node) = current {
        if !path.insert(node.id.as_str()) {
            break;
        }
        current = node
            .parent_id
            .as_deref()
            .and_then(|pid| by_id.get(pid).copied());
    }
    path
}
