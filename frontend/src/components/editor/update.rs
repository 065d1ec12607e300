//! Message handling for the template editor.
//!
//! Every edit goes through the `EditorSession`; the frame is then brought in
//! line with the `FrameUpdate` the session returns, either by patching the
//! live DOM or by remounting the frame from the session's document. Failures
//! are reported with a toast and leave the session usable.

use common::editor::hit_test::{HitStack, MenuAction};
use common::editor::image::{to_data_uri, ImageFile};
use common::editor::link::{normalize_href, prompt_for};
use common::editor::session::{FrameUpdate, PendingSave, SaveAction};
use common::editor::{Command, EditorError, EditorSession, NodeId};
use common::model::portfolio::{PortfolioUpdate, SavedPortfolio};
use common::requests::OWNER_HEADER;
use gloo_file::futures::read_as_bytes;
use gloo_file::Blob;
use gloo_net::http::{Request, RequestBuilder};
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

use super::frame::{apply_patches, hide_menu, show_menu, FrameListeners};
use super::helpers::{
    copy_to_clipboard, error_message, notify, notify_error, owner_id, replace_path,
    set_window_dirty_flag,
};
use super::messages::Msg;
use super::state::EditorComponent;

const CONFLICT_MESSAGE: &str =
    "This portfolio was changed in another window. Your edits are kept here; reload to see the saved version.";

pub fn update(component: &mut EditorComponent, ctx: &Context<EditorComponent>, msg: Msg) -> bool {
    match msg {
        Msg::TemplateFetched { template, document } => {
            match EditorSession::open_loaded(&template, document) {
                Ok(session) => start_session(component, session),
                Err(e) => load_failed(component, e.to_string()),
            }
            true
        }
        Msg::PortfolioFetched(portfolio) => {
            component.share_link = Some(portfolio.share_link.clone());
            match EditorSession::resume(&portfolio) {
                Ok(session) => start_session(component, session),
                Err(e) => load_failed(component, e.to_string()),
            }
            true
        }
        Msg::LoadFailed(message) => {
            load_failed(component, message);
            true
        }
        Msg::FrameLoaded => {
            // listeners of the previous document go first
            component.listeners = None;
            if let Some(document) = component.frame_document() {
                component.listeners = FrameListeners::attach(&document, ctx.link().clone());
            }
            false
        }

        Msg::TextEdited { target, text } => {
            // the frame already shows the typed text; only the session is updated
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            if let Err(e) = session.apply(Command::EditText { target, text }) {
                // the frame now shows text the session refused; bring it back
                gloo_console::warn!(format!("text edit on {target} dropped: {e}"));
                remount(component);
                return true;
            }
            refresh_dirty_flag(component);
            true
        }
        Msg::ImageClicked(target) => {
            open_image_picker(component, target);
            false
        }
        Msg::LinkClicked(target) => retarget_link(component, target),
        Msg::ImageDropped { target, file } => {
            read_image(ctx, target, file);
            false
        }
        Msg::ContextMenu { stack, position } => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            let menu = session.context_menu(&HitStack::new(stack), position).cloned();
            if let Some(document) = component.frame_document() {
                match &menu {
                    Some(menu) => show_menu(&document, menu),
                    None => hide_menu(&document),
                }
            }
            false
        }
        Msg::MenuChosen(action) => {
            let target = component
                .session
                .as_ref()
                .and_then(|s| s.open_menu())
                .and_then(|menu| menu.target_of(action));
            dismiss_menu(component);
            let Some(target) = target else {
                return false;
            };
            match action {
                MenuAction::EditLink => retarget_link(component, target),
                MenuAction::ChangeImage => {
                    open_image_picker(component, target);
                    false
                }
                MenuAction::Delete => {
                    let deleted = apply(component, Command::DeleteElement { target });
                    if deleted {
                        notify("Element deleted");
                    }
                    deleted
                }
            }
        }
        Msg::DismissMenu => {
            if component.session.as_ref().is_some_and(|s| s.open_menu().is_some()) {
                dismiss_menu(component);
            }
            false
        }

        Msg::ImageFileChosen(file) => {
            if let Some(target) = component.pending_image.take() {
                read_image(ctx, target, file);
            }
            false
        }
        Msg::ImageRead { target, file } => match to_data_uri(&file) {
            Ok(src) => {
                let replaced = apply(component, Command::ReplaceImage { target, src });
                if replaced {
                    notify("Image updated!");
                }
                replaced
            }
            Err(e) => {
                notify_error(&e.to_string());
                false
            }
        },
        Msg::ImageReadFailed { name, reason } => {
            notify_error(&EditorError::FileRead { name, reason }.to_string());
            false
        }

        Msg::Undo => {
            step_history(component, HistoryStep::Undo);
            true
        }
        Msg::Redo => {
            step_history(component, HistoryStep::Redo);
            true
        }
        Msg::ToggleViewMode => {
            component.view_mode = component.view_mode.toggled();
            remount(component);
            true
        }
        Msg::SetName(name) => {
            if let Some(session) = component.session.as_mut() {
                session.set_name(name);
            }
            true
        }
        Msg::Save => save(component, ctx),
        Msg::SaveSucceeded {
            saved,
            created,
            snapshot_md5,
        } => {
            component.saving = false;
            component.share_link = Some(saved.share_link.clone());
            if let Some(session) = component.session.as_mut() {
                session.mark_saved(&saved, &snapshot_md5);
            }
            refresh_dirty_flag(component);
            if created {
                replace_path(&format!("/editor/portfolio/{}", saved.id));
                notify("Portfolio saved successfully!");
            } else {
                notify("Portfolio updated successfully!");
            }
            true
        }
        Msg::SaveFailed(message) => {
            component.saving = false;
            notify_error(&message);
            true
        }
        Msg::TogglePublish => toggle_publish(component, ctx),
        Msg::VisibilityChanged(saved) => {
            component.saving = false;
            component.share_link = Some(saved.share_link.clone());
            if let Some(session) = component.session.as_mut() {
                session.record_stored(&saved);
            }
            if saved.is_public {
                notify("Portfolio published. Anyone with the share link can view it.");
            } else {
                notify("Portfolio unpublished.");
            }
            true
        }
        Msg::Share => {
            let Some(share_link) = component.share_link.clone() else {
                notify_error("Please save your portfolio first.");
                return false;
            };
            let published = component.session.as_ref().is_some_and(|s| s.is_public());
            spawn_local(async move {
                let copied = copy_to_clipboard(&share_link).await;
                match (copied, published) {
                    (true, true) => notify("Share link copied to clipboard!"),
                    (true, false) => notify("Share link copied. Publish the portfolio so visitors can open it."),
                    (false, _) => notify(&format!("Share link: {share_link}")),
                }
            });
            false
        }
    }
}

fn start_session(component: &mut EditorComponent, session: EditorSession) {
    component.session = Some(session);
    component.load_error = None;
    remount(component);
    refresh_dirty_flag(component);
}

fn load_failed(component: &mut EditorComponent, message: String) {
    gloo_console::error!(message.clone());
    notify_error("Failed to load editor resources");
    component.load_error = Some(message);
}

/// Applies a command and mirrors it onto the frame. Returns whether the
/// document changed.
fn apply(component: &mut EditorComponent, command: Command) -> bool {
    let result = match component.session.as_mut() {
        Some(session) => session.apply(command),
        None => return false,
    };
    match result {
        Ok(update) => {
            sync_frame(component, update);
            refresh_dirty_flag(component);
            true
        }
        Err(e) => {
            notify_error(&e.to_string());
            false
        }
    }
}

enum HistoryStep {
    Undo,
    Redo,
}

fn step_history(component: &mut EditorComponent, step: HistoryStep) {
    let result = match (component.session.as_mut(), step) {
        (Some(session), HistoryStep::Undo) => session.undo(),
        (Some(session), HistoryStep::Redo) => session.redo(),
        (None, _) => return,
    };
    match result {
        Ok(update) => {
            sync_frame(component, update);
            refresh_dirty_flag(component);
        }
        Err(e) => notify_error(&e.to_string()),
    }
}

fn sync_frame(component: &mut EditorComponent, update: FrameUpdate) {
    match update {
        FrameUpdate::Patch(patches) => match component.frame_document() {
            Some(document) => apply_patches(&document, &patches),
            None => remount(component),
        },
        FrameUpdate::Remount => remount(component),
    }
}

/// Reloads the frame from the session's current document.
fn remount(component: &mut EditorComponent) {
    let Some(session) = component.session.as_mut() else {
        return;
    };
    match session.render_sandbox_html() {
        Ok(html) => {
            component.listeners = None;
            component.srcdoc = html;
            component.frame_generation += 1;
        }
        Err(e) => notify_error(&e.to_string()),
    }
}

fn dismiss_menu(component: &mut EditorComponent) {
    if let Some(session) = component.session.as_mut() {
        session.dismiss_menu();
    }
    if let Some(document) = component.frame_document() {
        hide_menu(&document);
    }
}

fn refresh_dirty_flag(component: &mut EditorComponent) {
    set_window_dirty_flag(component.refresh_dirty());
}

/// Asks for a new destination for the link at or around `target`. A cancelled
/// or blank answer leaves the link unchanged.
fn retarget_link(component: &mut EditorComponent, target: NodeId) -> bool {
    let Some(session) = component.session.as_ref() else {
        return false;
    };
    let document = session.document();
    let anchor = document.closest(target, "a").unwrap_or(target);
    let prompt = prompt_for(
        &document.text_content(anchor),
        document.attr(anchor, "href").as_deref(),
    );
    let answer = web_sys::window()
        .and_then(|w| w.prompt_with_message_and_default(prompt.message, &prompt.default).ok())
        .flatten();
    let Some(href) = answer.as_deref().and_then(normalize_href) else {
        return false;
    };
    let updated = apply(component, Command::RetargetLink { target: anchor, href });
    if updated {
        notify("Link updated!");
    }
    updated
}

fn open_image_picker(component: &mut EditorComponent, target: NodeId) {
    let Some(input) = component.file_input_ref.cast::<HtmlInputElement>() else {
        return;
    };
    component.pending_image = Some(target);
    // the same file may be picked twice in a row
    input.set_value("");
    input.click();
}

fn read_image(ctx: &Context<EditorComponent>, target: NodeId, file: web_sys::File) {
    let link = ctx.link().clone();
    let name = file.name();
    let mime = file.type_();
    spawn_local(async move {
        let blob = Blob::from(file);
        let msg = match read_as_bytes(&blob).await {
            Ok(bytes) => Msg::ImageRead {
                target,
                file: ImageFile { name, mime, bytes },
            },
            Err(e) => Msg::ImageReadFailed {
                name,
                reason: e.to_string(),
            },
        };
        link.send_message(msg);
    });
}

fn save(component: &mut EditorComponent, ctx: &Context<EditorComponent>) -> bool {
    if component.saving {
        return false;
    }
    let Some(session) = component.session.as_ref() else {
        return false;
    };
    let pending = match session.save_action() {
        Ok(pending) => pending,
        Err(e) => {
            notify_error(&e.to_string());
            return false;
        }
    };
    component.saving = true;
    let link = ctx.link().clone();
    spawn_local(async move {
        link.send_message(send_save(pending).await);
    });
    true
}

async fn send_save(pending: PendingSave) -> Msg {
    let PendingSave {
        action,
        snapshot_md5,
    } = pending;
    let owner = owner_id();
    let (request, created) = match &action {
        SaveAction::Create(new) => (
            Request::post("/api/portfolios")
                .header(OWNER_HEADER, &owner)
                .json(new),
            true,
        ),
        SaveAction::Update { id, update } => (put_portfolio(id, &owner).json(update), false),
    };
    let request = match request {
        Ok(request) => request,
        Err(e) => return Msg::SaveFailed(format!("Failed to save portfolio: {e}")),
    };
    match send_portfolio(request).await {
        Ok(saved) => Msg::SaveSucceeded {
            saved,
            created,
            snapshot_md5,
        },
        Err(message) => Msg::SaveFailed(format!("Failed to save portfolio: {message}")),
    }
}

/// Publishes an unpublished portfolio and the other way round. Only the
/// visibility is sent; unsaved edits stay unsaved.
fn toggle_publish(component: &mut EditorComponent, ctx: &Context<EditorComponent>) -> bool {
    if component.saving {
        return false;
    }
    let Some(session) = component.session.as_ref() else {
        return false;
    };
    let Some((id, update)) = session.visibility_update(!session.is_public()) else {
        notify_error("Please save your portfolio first.");
        return false;
    };
    component.saving = true;
    let link = ctx.link().clone();
    spawn_local(async move {
        link.send_message(send_visibility(id, update).await);
    });
    true
}

async fn send_visibility(id: String, update: PortfolioUpdate) -> Msg {
    let request = match put_portfolio(&id, &owner_id()).json(&update) {
        Ok(request) => request,
        Err(e) => return Msg::SaveFailed(format!("Failed to change visibility: {e}")),
    };
    match send_portfolio(request).await {
        Ok(saved) => Msg::VisibilityChanged(saved),
        Err(message) => Msg::SaveFailed(format!("Failed to change visibility: {message}")),
    }
}

fn put_portfolio(id: &str, owner: &str) -> RequestBuilder {
    Request::put(&format!("/api/portfolios/{id}")).header(OWNER_HEADER, owner)
}

/// Sends a portfolio write and reads back the stored record.
async fn send_portfolio(request: Request) -> Result<SavedPortfolio, String> {
    match request.send().await {
        Ok(resp) if resp.ok() => resp.json::<SavedPortfolio>().await.map_err(|e| e.to_string()),
        Ok(resp) if resp.status() == 409 => Err(CONFLICT_MESSAGE.to_string()),
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(error_message(status, &body))
        }
        Err(e) => Err(e.to_string()),
    }
}
