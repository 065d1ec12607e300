//! Types and editing logic shared by the portfolio builder's backend and
//! frontend.
//!
//! - `model`: catalog templates, saved portfolios and the activity history.
//! - `catalog`: the compiled-in template catalog.
//! - `requests`: JSON payloads exchanged between frontend and backend.
//! - `editor`: the template editor core (loader, document, injector,
//!   commands, hit resolution, serializer and the editing session).

pub mod catalog;
pub mod editor;
pub mod model;
pub mod requests;
