//! Context-menu target resolution.
//!
//! Templates stack decorative layers and overlays on top of content, so the
//! element the browser reports as the event target is often not the one the
//! user means. Resolution therefore works on the full stack of elements under
//! the cursor, front to back.

use serde::{Deserialize, Serialize};

use crate::editor::document::{EditableDocument, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// A painted element box. Boxes are listed in paint order; among boxes with
/// the same `z_index`, a later one is painted on top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub node: NodeId,
    pub rect: Rect,
    pub z_index: i32,
}

/// Every element whose box contains a point, top-most first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStack(Vec<NodeId>);

impl HitStack {
    /// Wraps a stack that is already ordered front to back, e.g. the result
    /// of the frame's `elementsFromPoint`.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        HitStack(nodes)
    }

    /// Computes the stack from painted boxes.
    pub fn from_boxes(boxes: &[LayoutBox], point: Point) -> Self {
        let mut hits: Vec<(usize, &LayoutBox)> = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.rect.contains(point))
            .collect();
        hits.sort_by(|(ia, a), (ib, b)| b.z_index.cmp(&a.z_index).then(ib.cmp(ia)));
        HitStack(hits.into_iter().map(|(_, b)| b.node).collect())
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuAction {
    EditLink,
    ChangeImage,
    Delete,
}

impl MenuAction {
    /// Value of the `data-pe-action` attribute on the matching menu item.
    pub fn as_attr(&self) -> &'static str {
        match self {
            MenuAction::EditLink => "edit-link",
            MenuAction::ChangeImage => "change-image",
            MenuAction::Delete => "delete",
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "edit-link" => Some(MenuAction::EditLink),
            "change-image" => Some(MenuAction::ChangeImage),
            "delete" => Some(MenuAction::Delete),
            _ => None,
        }
    }

    pub const ALL: [MenuAction; 3] = [MenuAction::EditLink, MenuAction::ChangeImage, MenuAction::Delete];
}

/// A resolved context menu: where to show it and what each action targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMenu {
    pub position: Point,
    /// Top-most element under the cursor; `None` when that element is the
    /// page root or content wrapper.
    pub delete_target: Option<NodeId>,
    /// First image anywhere in the stack, even beneath an overlay.
    pub image: Option<NodeId>,
    /// Nearest enclosing anchor of the top-most element, otherwise of any
    /// element in the stack.
    pub link: Option<NodeId>,
}

impl ContextMenu {
    pub fn actions(&self) -> Vec<MenuAction> {
        let mut actions = Vec::new();
        if self.link.is_some() {
            actions.push(MenuAction::EditLink);
        }
        if self.image.is_some() {
            actions.push(MenuAction::ChangeImage);
        }
        if self.delete_target.is_some() {
            actions.push(MenuAction::Delete);
        }
        actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions().is_empty()
    }

    pub fn target_of(&self, action: MenuAction) -> Option<NodeId> {
        match action {
            MenuAction::EditLink => self.link,
            MenuAction::ChangeImage => self.image,
            MenuAction::Delete => self.delete_target,
        }
    }
}

/// Resolves the context menu for a right-click at `position`. Editor-owned
/// and detached elements in the stack are ignored.
pub fn resolve_context_menu(doc: &EditableDocument, stack: &HitStack, position: Point) -> ContextMenu {
    let candidates: Vec<NodeId> = stack
        .nodes()
        .iter()
        .copied()
        .filter(|id| doc.is_attached(*id) && !doc.is_editor_owned(*id))
        .collect();

    let top = candidates.first().copied();
    let image = candidates
        .iter()
        .copied()
        .find(|id| doc.tag(*id) == Some("img"));
    let link = top
        .and_then(|t| doc.closest(t, "a"))
        .or_else(|| candidates.iter().find_map(|id| doc.closest(*id, "a")));
    let delete_target = top.filter(|t| !doc.is_structural(*t));

    ContextMenu {
        position,
        delete_target,
        image,
        link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html><html><head></head><body>
<a href="/work"><figure><img src="/w.jpg"></figure></a>
<div class="overlay"></div>
<p>Text</p>
</body></html>"#;

    fn by_tag(doc: &EditableDocument, tag: &str) -> NodeId {
        doc.elements()
            .into_iter()
            .find(|id| doc.tag(*id) == Some(tag))
            .unwrap()
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect {
            x,
            y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn stack_orders_by_z_then_paint_order() {
        let boxes = [
            LayoutBox { node: NodeId(1), rect: rect(0.0, 0.0, 100.0, 100.0), z_index: 0 },
            LayoutBox { node: NodeId(2), rect: rect(10.0, 10.0, 50.0, 50.0), z_index: 0 },
            LayoutBox { node: NodeId(3), rect: rect(0.0, 0.0, 20.0, 20.0), z_index: 5 },
            LayoutBox { node: NodeId(4), rect: rect(80.0, 80.0, 10.0, 10.0), z_index: 9 },
        ];
        let stack = HitStack::from_boxes(&boxes, Point::new(15.0, 15.0));
        assert_eq!(stack.nodes(), &[NodeId(3), NodeId(2), NodeId(1)]);
    }

    #[test]
    fn image_under_overlay_is_found() {
        let doc = EditableDocument::parse(PAGE);
        let overlay = by_tag(&doc, "div");
        let img = by_tag(&doc, "img");
        let figure = by_tag(&doc, "figure");
        let a = by_tag(&doc, "a");
        let stack = HitStack::new(vec![overlay, img, figure, a, doc.body().unwrap(), doc.root().unwrap()]);

        let menu = resolve_context_menu(&doc, &stack, Point::new(5.0, 5.0));
        assert_eq!(menu.delete_target, Some(overlay));
        assert_eq!(menu.image, Some(img));
        // overlay has no anchor ancestor, the stack does
        assert_eq!(menu.link, Some(a));
        assert_eq!(
            menu.actions(),
            vec![MenuAction::EditLink, MenuAction::ChangeImage, MenuAction::Delete]
        );
    }

    #[test]
    fn plain_paragraph_offers_delete_only() {
        let doc = EditableDocument::parse(PAGE);
        let p = by_tag(&doc, "p");
        let stack = HitStack::new(vec![p, doc.body().unwrap(), doc.root().unwrap()]);
        let menu = resolve_context_menu(&doc, &stack, Point::default());
        assert_eq!(menu.actions(), vec![MenuAction::Delete]);
        assert_eq!(menu.target_of(MenuAction::Delete), Some(p));
    }

    #[test]
    fn body_is_never_a_delete_target() {
        let doc = EditableDocument::parse(PAGE);
        let stack = HitStack::new(vec![doc.body().unwrap(), doc.root().unwrap()]);
        let menu = resolve_context_menu(&doc, &stack, Point::default());
        assert_eq!(menu.delete_target, None);
        assert!(menu.is_empty());
    }

    #[test]
    fn action_attribute_names_round_trip() {
        for action in MenuAction::ALL {
            assert_eq!(MenuAction::from_attr(action.as_attr()), Some(action));
        }
    }
}
