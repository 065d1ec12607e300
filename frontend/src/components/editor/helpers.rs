//! Browser-side utilities for the editor component.
//!
//! - **User feedback**: temporary toast notifications.
//! - **Unsaved changes**: the `app_dirty` window flag read by the
//!   `beforeunload` guard.
//! - **Identity**: the owner id sent with every portfolio request.
//! - **Navigation and sharing**: rewriting the address bar after a first save
//!   and copying the share link.

use common::requests::{ApiError, ANONYMOUS_OWNER};
use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::BeforeUnloadEvent;

const DIRTY_FLAG: &str = "app_dirty";
const OWNER_KEY: &str = "portfolio_builder_owner";
const TOAST_ID: &str = "editor-toast";
/// How long a toast stays on screen.
pub const TOAST_MILLIS: u32 = 3000;

/// How a toast is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn class(self) -> &'static str {
        match self {
            ToastKind::Success => "editor-toast",
            ToastKind::Error => "editor-toast error",
        }
    }
}

/// Shows a notification above the editor hint, replacing any toast still on
/// screen.
///
/// The editor reports every outcome the user did not see happen in the frame
/// (saves, image swaps, rejected commands) this way. Only one toast exists at
/// a time, so a quick succession of edits never stacks messages over the
/// canvas. The element is styled by the `.editor-toast` rules of
/// `index.html` and removes itself after [`TOAST_MILLIS`].
///
/// # Arguments
/// * `message` - Text shown to the user; inserted as text, never as markup.
/// * `kind` - Whether the toast reports a success or an error.
pub fn show_toast(message: &str, kind: ToastKind) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(previous) = document.get_element_by_id(TOAST_ID) {
        previous.remove();
    }
    let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) else {
        return;
    };
    toast.set_id(TOAST_ID);
    toast.set_class_name(kind.class());
    toast.set_attribute("role", if kind == ToastKind::Error { "alert" } else { "status" }).ok();
    toast.set_text_content(Some(message));
    if body.append_child(&toast).is_err() {
        return;
    }
    wasm_bindgen_futures::spawn_local(async move {
        gloo_timers::future::TimeoutFuture::new(TOAST_MILLIS).await;
        // a newer toast may already have replaced this one
        toast.remove();
    });
}

/// Shorthand for a success toast.
pub fn notify(message: &str) {
    show_toast(message, ToastKind::Success);
}

/// Shorthand for an error toast.
pub fn notify_error(message: &str) {
    show_toast(message, ToastKind::Error);
}

/// Sets the global `app_dirty` flag read by [`UnloadGuard`].
///
/// The flag lives on `window` rather than in the component so the
/// `beforeunload` handler, which runs outside yew, can read it.
///
/// # Arguments
/// * `dirty` - Whether the session has edits newer than its last save.
pub fn set_window_dirty_flag(dirty: bool) {
    if let Some(window) = web_sys::window() {
        let _ = Reflect::set(
            &window,
            &JsValue::from_str(DIRTY_FLAG),
            &JsValue::from_bool(dirty),
        );
    }
}

/// Asks for confirmation before leaving the page while `app_dirty` is set.
/// Dropping the guard removes the handler.
pub struct UnloadGuard(Closure<dyn FnMut(BeforeUnloadEvent)>);

impl UnloadGuard {
    pub fn install() -> Option<Self> {
        let window = web_sys::window()?;
        let handler = Closure::<dyn FnMut(BeforeUnloadEvent)>::new(|e: BeforeUnloadEvent| {
            let dirty = web_sys::window()
                .and_then(|w| Reflect::get(&w, &JsValue::from_str(DIRTY_FLAG)).ok())
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if dirty {
                e.prevent_default();
                e.set_return_value("You have unsaved changes.");
            }
        });
        window
            .add_event_listener_with_callback("beforeunload", handler.as_ref().unchecked_ref())
            .ok()?;
        Some(UnloadGuard(handler))
    }
}

impl Drop for UnloadGuard {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback("beforeunload", self.0.as_ref().unchecked_ref());
        }
    }
}

/// Owner id for portfolio requests: a random id kept in local storage, so a
/// browser keeps seeing its own portfolios.
pub fn owner_id() -> String {
    let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
        return ANONYMOUS_OWNER.to_string();
    };
    if let Ok(Some(id)) = storage.get_item(OWNER_KEY) {
        return id;
    }
    let id = uuid::Uuid::new_v4().simple().to_string();
    match storage.set_item(OWNER_KEY, &id) {
        Ok(()) => id,
        Err(_) => ANONYMOUS_OWNER.to_string(),
    }
}

/// Points the address bar at `path` without reloading the editor.
///
/// Called after the first save, so a reload reopens the stored portfolio
/// instead of a fresh copy of the template.
///
/// # Arguments
/// * `path` - Site-absolute path, e.g. `/editor/portfolio/{id}`.
pub fn replace_path(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        history
            .replace_state_with_url(&JsValue::NULL, "", Some(path))
            .ok();
    }
}

/// Writes `text` to the clipboard.
///
/// # Returns
/// `false` when the browser refused (no permission or an insecure context);
/// the caller then shows the text instead.
pub async fn copy_to_clipboard(text: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let promise = window.navigator().clipboard().write_text(text);
    wasm_bindgen_futures::JsFuture::from(promise).await.is_ok()
}

/// Turns an error response body into a message for the user.
///
/// # Arguments
/// * `status` - HTTP status of the failed response.
/// * `body` - Response body; an `ApiError` JSON body when the backend
///   produced it, anything else when a proxy did.
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => err.message,
        Err(_) if body.trim().is_empty() => format!("request failed with status {status}"),
        Err(_) => body.trim().to_string(),
    }
}
