//! Mapping between preview geometry and nodes
//!
//! The preview renders tagged source (see [`EditorState::preview_source`])
//! and answers two questions: which tag is under a point, and where the
//! elements carrying a tag are. Everything else happens here in terms of
//! nodes.
//!
//! [`EditorState::preview_source`]: crate::EditorState::preview_source

use reshaper_editor::{Node, Workspace};
use reshaper_syntax::parse_tag;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// A rendered preview
pub trait PreviewSurface {
    /// Tag of the innermost tagged element at a point
    fn element_at_point(&self, x: f64, y: f64) -> Option<String>;

    /// Boxes of every rendered element carrying `tag`
    fn bounding_boxes_for_tag(&self, tag: &str) -> Vec<Rect>;
}

/// Result of a hit test
#[derive(Debug, Clone)]
pub struct Located<'w> {
    /// `None` when the file is open but the element has no node
    pub node: Option<Node<'w>>,
    pub file_path: String,
    pub index: usize,
}

pub struct Viewport<'a, P: ?Sized> {
    surface: &'a P,
    workspace: &'a Workspace,
}

impl<'a, P: PreviewSurface + ?Sized> Viewport<'a, P> {
    pub fn new(surface: &'a P, workspace: &'a Workspace) -> Self {
        Self { surface, workspace }
    }

    pub fn locate_node(&self, x: f64, y: f64) -> Option<Located<'a>> {
        let tag = self.surface.element_at_point(x, y)?;
        let (file_path, index) = parse_tag(&tag)?;
        Some(Located {
            node: self.workspace.node_for_location(file_path, index).ok(),
            file_path: file_path.to_string(),
            index,
        })
    }

    pub fn bounding_boxes(&self, node: &Node<'_>) -> Vec<Rect> {
        self.workspace
            .tag_for_node(node)
            .map(|tag| self.surface.bounding_boxes_for_tag(&tag))
            .unwrap_or_default()
    }

    pub fn selected_bounding_boxes(&self) -> Vec<Rect> {
        self.workspace
            .selected_nodes()
            .iter()
            .flat_map(|node| self.bounding_boxes(node))
            .collect()
    }

    pub fn hovered_bounding_boxes(&self) -> Vec<Rect> {
        self.workspace
            .hovered()
            .map(|node| self.bounding_boxes(&node))
            .unwrap_or_default()
    }

    /// Select the node under a point and expand its ancestors
    pub fn reveal_point(&self, x: f64, y: f64) -> Option<Node<'a>> {
        let node = self.locate_node(x, y)?.node?;
        self.workspace.clear_selection();
        node.select();
        node.expand_all_ancestors();
        Some(node)
    }
}
