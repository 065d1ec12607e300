//! Bridge between the sandbox frame's live DOM and the editor session.
//!
//! Listeners are attached in the capture phase on the frame's `<body>` once
//! its `load` event fires. They never edit the frame themselves: each one
//! maps the event target back to a document node through its `data-pe-node`
//! attribute and forwards a `Msg` to the component. Changes made by the
//! session come back as `DomPatch`es and are mirrored here.
//!
//! Text typing is the exception: the browser has already changed the
//! editable element, so the session only records it. Only elements the
//! injector marked `contenteditable="true"` report typing, and they report
//! their rendered text (`innerText`), so line breaks survive as `\n`.
//!
//! `dragover` and `drop` are cancelled everywhere in the frame: a file
//! dropped outside an image would otherwise navigate the frame away from
//! the editor.

use common::editor::command::DomPatch;
use common::editor::document::{EDITABLE_ATTR, NODE_ATTR};
use common::editor::hit_test::{ContextMenu, MenuAction, Point};
use common::editor::image::select_dropped_image;
use common::editor::injector::{ACTION_ATTR, CONTEXT_MENU_CLASS};
use common::editor::NodeId;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DragEvent, Element, Event, EventTarget, HtmlElement, MouseEvent};
use yew::html::Scope;

use super::messages::Msg;
use super::state::EditorComponent;

type Listener<E> = Closure<dyn FnMut(E)>;

/// Listeners registered on one mounted frame document. Dropping the value
/// unregisters them.
pub struct FrameListeners {
    target: EventTarget,
    click: Listener<MouseEvent>,
    context_menu: Listener<MouseEvent>,
    drag_over: Listener<DragEvent>,
    drop: Listener<DragEvent>,
    input: Listener<Event>,
}

impl FrameListeners {
    pub fn attach(document: &Document, link: Scope<EditorComponent>) -> Option<Self> {
        let body = document.body()?;
        let listeners = FrameListeners {
            target: body.into(),
            click: on_click(link.clone()),
            context_menu: on_context_menu(document.clone(), link.clone()),
            drag_over: Closure::new(|e: DragEvent| e.prevent_default()),
            drop: on_drop(link.clone()),
            input: on_input(link),
        };
        for (event, callback) in listeners.callbacks() {
            if let Err(e) = listeners.target.add_event_listener_with_callback_and_bool(
                event,
                callback.unchecked_ref(),
                true,
            ) {
                gloo_console::error!(format!("could not listen for {event}"), e);
            }
        }
        Some(listeners)
    }

    fn callbacks(&self) -> [(&'static str, &JsValue); 5] {
        [
            ("click", self.click.as_ref()),
            ("contextmenu", self.context_menu.as_ref()),
            ("dragover", self.drag_over.as_ref()),
            ("drop", self.drop.as_ref()),
            ("input", self.input.as_ref()),
        ]
    }
}

impl Drop for FrameListeners {
    fn drop(&mut self) {
        for (event, callback) in self.callbacks() {
            let _ = self.target.remove_event_listener_with_callback_and_bool(
                event,
                callback.unchecked_ref(),
                true,
            );
        }
    }
}

fn on_click(link: Scope<EditorComponent>) -> Listener<MouseEvent> {
    Closure::new(move |e: MouseEvent| {
        let Some(target) = event_element(&e) else {
            return;
        };

        let item_selector = format!(".{CONTEXT_MENU_CLASS} [{ACTION_ATTR}]");
        if let Ok(Some(item)) = target.closest(&item_selector) {
            e.prevent_default();
            e.stop_propagation();
            if let Some(action) = item.get_attribute(ACTION_ATTR).as_deref().and_then(MenuAction::from_attr) {
                link.send_message(Msg::MenuChosen(action));
            }
            return;
        }

        link.send_message(Msg::DismissMenu);

        if is_image(&target) {
            if let Some(id) = node_id_of(&target) {
                e.prevent_default();
                e.stop_propagation();
                link.send_message(Msg::ImageClicked(id));
            }
            return;
        }

        if let Ok(Some(anchor)) = target.closest("a") {
            // links never navigate inside the editor
            e.prevent_default();
            e.stop_propagation();
            if let Some(id) = node_id_of(&anchor) {
                link.send_message(Msg::LinkClicked(id));
            }
        }
    })
}

fn on_context_menu(document: Document, link: Scope<EditorComponent>) -> Listener<MouseEvent> {
    Closure::new(move |e: MouseEvent| {
        e.prevent_default();
        e.stop_propagation();
        let stack = hit_stack(&document, e.client_x() as f32, e.client_y() as f32);
        link.send_message(Msg::ContextMenu {
            stack,
            position: Point::new(f64::from(e.page_x()), f64::from(e.page_y())),
        });
    })
}

fn on_drop(link: Scope<EditorComponent>) -> Listener<DragEvent> {
    Closure::new(move |e: DragEvent| {
        e.prevent_default();
        e.stop_propagation();
        let Some(id) = event_element(&e).filter(is_image).and_then(|img| node_id_of(&img)) else {
            gloo_console::log!("ignored drop outside an image");
            return;
        };
        let files = dropped_files(&e);
        match select_dropped_image(&files, |f| f.type_()) {
            Some(file) => link.send_message(Msg::ImageDropped {
                target: id,
                file: file.clone(),
            }),
            None => gloo_console::log!("ignored drop without a single image file"),
        }
    })
}

fn on_input(link: Scope<EditorComponent>) -> Listener<Event> {
    Closure::new(move |e: Event| {
        let Some(target) = event_element(&e) else {
            return;
        };
        let Some(editable) = target
            .closest(&format!("[{EDITABLE_ATTR}=\"true\"]"))
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        if let Some(id) = node_id_of(&editable) {
            link.send_message(Msg::TextEdited {
                target: id,
                text: editable.inner_text(),
            });
        }
    })
}

fn event_element(e: &Event) -> Option<Element> {
    e.target()?.dyn_into::<Element>().ok()
}

fn is_image(element: &Element) -> bool {
    element.tag_name().eq_ignore_ascii_case("img")
}

fn node_id_of(element: &Element) -> Option<NodeId> {
    element.get_attribute(NODE_ATTR)?.parse().ok()
}

fn dropped_files(e: &DragEvent) -> Vec<web_sys::File> {
    e.data_transfer()
        .and_then(|dt| dt.files())
        .map(|list| (0..list.length()).filter_map(|i| list.get(i)).collect())
        .unwrap_or_default()
}

/// Document nodes under a point, front to back.
fn hit_stack(document: &Document, x: f32, y: f32) -> Vec<NodeId> {
    document
        .elements_from_point(x, y)
        .iter()
        .filter_map(|value| value.dyn_into::<Element>().ok())
        .filter_map(|element| node_id_of(&element))
        .collect()
}

fn find_element(document: &Document, node: NodeId) -> Option<Element> {
    document
        .query_selector(&format!("[{NODE_ATTR}=\"{}\"]", node.0))
        .ok()
        .flatten()
}

/// Mirrors session changes onto the live frame.
pub fn apply_patches(document: &Document, patches: &[DomPatch]) {
    for patch in patches {
        let node = match patch {
            DomPatch::SetAttribute { node, .. }
            | DomPatch::RemoveAttribute { node, .. }
            | DomPatch::Remove { node }
            | DomPatch::SetText { node, .. } => *node,
        };
        let Some(element) = find_element(document, node) else {
            gloo_console::warn!(format!("node {node} is not in the frame"));
            continue;
        };
        let result = match patch {
            DomPatch::SetAttribute { name, value, .. } => element.set_attribute(name, value),
            DomPatch::RemoveAttribute { name, .. } => element.remove_attribute(name),
            DomPatch::Remove { .. } => {
                element.remove();
                Ok(())
            }
            DomPatch::SetText { text, .. } => {
                match element.dyn_ref::<HtmlElement>() {
                    Some(html) => html.set_inner_text(text),
                    None => element.set_text_content(Some(text)),
                }
                Ok(())
            }
        };
        if let Err(e) = result {
            gloo_console::error!(format!("patch on {node} failed"), e);
        }
    }
}

fn menu_element(document: &Document) -> Option<HtmlElement> {
    document
        .query_selector(&format!(".{CONTEXT_MENU_CLASS}"))
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Shows the injected context menu with only the items `menu` allows.
pub fn show_menu(document: &Document, menu: &ContextMenu) {
    let Some(element) = menu_element(document) else {
        return;
    };
    let actions = menu.actions();
    if let Ok(items) = element.query_selector_all(&format!("[{ACTION_ATTR}]")) {
        for i in 0..items.length() {
            let Some(item) = items.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let shown = item
                .get_attribute(ACTION_ATTR)
                .as_deref()
                .and_then(MenuAction::from_attr)
                .is_some_and(|action| actions.contains(&action));
            item.style()
                .set_property("display", if shown { "block" } else { "none" })
                .ok();
        }
    }
    let style = element.style();
    style.set_property("left", &format!("{}px", menu.position.x)).ok();
    style.set_property("top", &format!("{}px", menu.position.y)).ok();
    style.set_property("display", "block").ok();
}

pub fn hide_menu(document: &Document) {
    if let Some(element) = menu_element(document) {
        element.style().set_property("display", "none").ok();
    }
}
