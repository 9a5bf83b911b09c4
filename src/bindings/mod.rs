//! Headless counterparts of the router's UI components.
//!
//! # Data Flow
//! ```text
//! root.rs:  History ──→ RootRouter ──→ RouterEngine::set
//! route.rs: RouteDeclaration ──mount──→ RouterEngine::subscribe
//!           notifications ──→ RouteView ──did_render──→ RenderDone::settle
//! link.rs:  RouteLink ──click──→ History::push ──→ (root.rs)
//! ```
//!
//! # Design Decisions
//! - No rendering here: hosts read view state and report renders back
//! - Routes and links match strictly; the root route always matches

pub mod link;
pub mod root;
pub mod route;

pub use link::RouteLink;
pub use root::{strip_root, RootRouter};
pub use route::{MountedRoute, RenderEffect, RouteDeclaration, RouteView, ScrollTarget};
