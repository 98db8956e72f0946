//! Board model and controller for the scrapbook.
//!
//! This crate owns everything that lives on the scrapbook board: the
//! serializable document, the pure reducer that mutates it, drag and stacking
//! rules, whole-document persistence, and the camera-to-photo capture path.
//! It has no UI or network code; front ends (the CLI, a browser host, tests)
//! drive it through [`controller::BoardController`] or call
//! [`action::reduce`] directly.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Placed objects, palettes and the [`doc::BoardDocument`] |
//! | [`action`] | [`action::Action`] and the pure [`action::reduce`] transition |
//! | [`layer`] | Drag state machine and per-kind z-order |
//! | [`store`] | Key/value stores and fail-soft load/save |
//! | [`capture`] | Camera capability and still-frame encoding |
//! | [`controller`] | Stateful owner tying the above together |
//! | [`notice`] | One-shot user notifications |
//! | [`consts`] | Storage key, defaults and spawn constants |

pub mod action;
pub mod capture;
pub mod consts;
pub mod controller;
pub mod doc;
pub mod layer;
pub mod notice;
pub mod store;

pub use action::{Action, BoardError, reduce};
pub use controller::BoardController;
pub use doc::{BoardDocument, ObjectId, ObjectKind, Point};
