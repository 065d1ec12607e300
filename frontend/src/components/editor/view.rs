//! View rendering for the template editor.
//!
//! A toolbar (back, portfolio name, undo/redo, viewport toggle, publish,
//! share, save)
//! sits above the canvas holding the sandbox frame. The frame is keyed by
//! `frame_generation` so a remount always recreates it, and its `load` event
//! is what attaches the editing listeners.

use common::editor::image::IMAGE_ACCEPT;
use common::editor::sandbox::{ViewMode, EDITOR_SANDBOX};
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::prelude::*;

use super::messages::Msg;
use super::state::EditorComponent;

pub fn view(component: &EditorComponent, ctx: &Context<EditorComponent>) -> Html {
    let link = ctx.link();

    if let Some(error) = &component.load_error {
        return html! {
            <div class="editor-message">
                <p>{ error.clone() }</p>
                <a href="/">{"Back to templates"}</a>
            </div>
        };
    }
    if component.session.is_none() {
        return html! {
            <div class="editor-message">
                <i class="material-icons spin">{"autorenew"}</i>
                <span>{"Loading Template..."}</span>
            </div>
        };
    }

    html! {
        <div class="editor-root">
            { build_toolbar(component, link) }
            { build_canvas(component, link) }
            { build_file_input(component, link) }
        </div>
    }
}

fn build_toolbar(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let Some(session) = component.session.as_ref() else {
        return html! {};
    };
    let on_name = link.callback(|e: InputEvent| {
        let value = e
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default();
        Msg::SetName(value)
    });
    let next_mode = component.view_mode.toggled();
    let view_icon = match next_mode {
        ViewMode::Desktop => "desktop_windows",
        ViewMode::Mobile => "smartphone",
    };

    html! {
        <div class="editor-toolbar">
            <div class="editor-title">
                <a class="icon-btn" href="/" title="Back to templates">
                    <i class="material-icons">{"arrow_back"}</i>
                </a>
                <div class="editor-name">
                    <input
                        value={session.name().to_string()}
                        oninput={on_name}
                        placeholder="Portfolio Name"
                    />
                    <span class="editor-subtitle">{ format!("Editing: {}", session.template_name()) }</span>
                </div>
            </div>
            <div class="icon-toolbar">
                { icon_button("undo", "Undo", link.callback(|_| Msg::Undo), !session.can_undo()) }
                { icon_button("redo", "Redo", link.callback(|_| Msg::Redo), !session.can_redo()) }
                { icon_button(view_icon, next_mode.label(), link.callback(|_| Msg::ToggleViewMode), false) }
                { publish_button(component, link) }
                { icon_button("share", "Share", link.callback(|_| Msg::Share), false) }
                <button class="icon-btn save-btn" onclick={link.callback(|_| Msg::Save)} disabled={component.saving}>
                    <i class="material-icons">{"save"}</i>
                    <span class="icon-label">{ if component.saving { "Saving..." } else { "Save Changes" } }</span>
                    {
                        if component.is_dirty() {
                            html! { <span class="dirty-dot" title="Unsaved changes" /> }
                        } else {
                            html! {}
                        }
                    }
                </button>
            </div>
        </div>
    }
}

/// Publish toggle; a portfolio that was never saved has nothing to publish.
fn publish_button(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let Some(session) = component.session.as_ref() else {
        return html! {};
    };
    let published = session.is_public();
    let (icon_name, label) = if published {
        ("public", "Published")
    } else {
        ("public_off", "Publish")
    };
    html! {
        <button
            class={classes!("icon-btn", "publish-btn", published.then_some("published"))}
            onclick={link.callback(|_| Msg::TogglePublish)}
            disabled={component.saving || session.portfolio_id().is_none()}
            title={if published { "Click to unpublish" } else { "Make the share link public" }}
        >
            <i class="material-icons">{ icon_name }</i>
            <span class="icon-label">{ label }</span>
        </button>
    }
}

fn build_canvas(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    html! {
        <div class="editor-canvas">
            <div class={classes!("frame-shell", matches!(component.view_mode, ViewMode::Mobile).then_some("mobile"))}>
                <iframe
                    key={component.frame_generation.to_string()}
                    ref={component.frame_ref.clone()}
                    title="Template Editor"
                    style={component.view_mode.frame_style()}
                    sandbox={EDITOR_SANDBOX}
                    srcdoc={component.srcdoc.clone()}
                    onload={link.callback(|_: Event| Msg::FrameLoaded)}
                />
            </div>
            <div class="editor-hint">{"Click text to edit • Drag & Drop images to replace • Right-click for more"}</div>
        </div>
    }
}

/// Hidden picker used by image clicks and the "Change Image" menu item.
fn build_file_input(component: &EditorComponent, link: &Scope<EditorComponent>) -> Html {
    let on_change = link.batch_callback(|e: Event| {
        e.target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0))
            .map(Msg::ImageFileChosen)
    });
    html! {
        <input
            type="file"
            accept={IMAGE_ACCEPT}
            style="display: none;"
            ref={component.file_input_ref.clone()}
            onchange={on_change}
        />
    }
}

fn icon_button(icon_name: &str, label: &str, on_click: Callback<MouseEvent>, disabled: bool) -> Html {
    html! {
        <button class="icon-btn" onclick={on_click} disabled={disabled}>
            <i class="material-icons">{ icon_name.to_string() }</i>
            <span class="icon-label">{ label.to_string() }</span>
        </button>
    }
}
