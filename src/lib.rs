//! Active Router Library
//!
//! A client-side route-matching and dispatch engine: routes subscribe with a
//! pattern, the engine tracks the current location, and every state change
//! notifies exactly the routes whose match changed, honouring mutually
//! exclusive route groups.

pub mod bindings;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod router;
pub mod routing;
pub mod state;

pub use bindings::{RootRouter, RouteDeclaration, RouteLink};
pub use config::RouterConfig;
pub use router::{
    DispatchError, DispatchHandle, Listener, RouterEngine, RouterError, SubscriptionDescriptor,
    Unsubscribe,
};
pub use routing::{match_path, MatchOptions, MatchResult, PathSpec};
pub use state::{Location, StateUpdate};
