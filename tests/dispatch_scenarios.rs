//! End-to-end dispatch behaviour of the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use active_router::router::{rendezvous, DispatchError, Listener, ListenerError, SubscriptionDescriptor};
use active_router::routing::{MatchOptions, RouteMatcher};
use active_router::state::{FixedLocation, Location, StateUpdate};
use active_router::RouterEngine;

mod common;
use common::{engine_at, seen, Gate, Recorder};

fn route(pattern: &str, exact: bool) -> Arc<dyn RouteMatcher> {
    Arc::new(
        MatchOptions::new(pattern)
            .exact(exact)
            .strict(true)
            .compile()
            .unwrap(),
    )
}

fn navigate(engine: &RouterEngine, path: &str) -> active_router::DispatchHandle {
    engine.set(StateUpdate::new().location(Location::new(path)))
}

#[tokio::test]
async fn test_two_routes_swap_on_navigation() {
    let (engine, _) = engine_at("/a");
    let log = Recorder::new();

    engine
        .subscribe(SubscriptionDescriptor::new(route("/a", true), log.immediate("a")))
        .unwrap();
    engine
        .subscribe(SubscriptionDescriptor::new(route("/b", true), log.immediate("b")))
        .unwrap();
    assert_eq!(log.take(), vec![seen("a", Some("/a")), seen("b", None)]);

    navigate(&engine, "/b").finished().await.unwrap();
    assert_eq!(log.take(), vec![seen("a", None), seen("b", Some("/b"))]);
}

#[tokio::test]
async fn test_same_location_twice_notifies_once() {
    let (engine, _) = engine_at("/");
    let log = Recorder::new();
    engine
        .subscribe(SubscriptionDescriptor::new(route("/docs", false), log.immediate("docs")))
        .unwrap();
    log.take();

    navigate(&engine, "/docs/intro").finished().await.unwrap();
    navigate(&engine, "/docs/intro").finished().await.unwrap();
    assert_eq!(log.take(), vec![seen("docs", Some("/docs"))]);

    // Same match for a different pathname is not a change either.
    navigate(&engine, "/docs/api").finished().await.unwrap();
    assert!(log.take().is_empty());
}

#[tokio::test]
async fn test_first_group_member_wins() {
    let (engine, _) = engine_at("/");
    let log = Recorder::new();
    engine
        .subscribe(
            SubscriptionDescriptor::new(route("/", false), log.settled("catch-all"))
                .in_group("main", Some(1)),
        )
        .unwrap();
    engine
        .subscribe(
            SubscriptionDescriptor::new(route("/home", false), log.settled("home"))
                .in_group("main", Some(0)),
        )
        .unwrap();
    log.take();

    navigate(&engine, "/home").finished().await.unwrap();
    assert_eq!(
        log.take(),
        vec![seen("home", Some("/home")), seen("catch-all", None)]
    );

    let home = engine.subscription_order()[0];
    assert!(engine.last_match(home).is_some());
    let catch_all = engine.subscription_order()[1];
    assert!(engine.last_match(catch_all).is_none());
}

#[tokio::test]
async fn test_group_activation_gates_the_rest_of_the_pass() {
    let (engine, _) = engine_at("/");
    let log = Recorder::new();
    let gate = Gate::new();

    engine
        .subscribe(SubscriptionDescriptor::new(route("/", false), log.immediate("layout")))
        .unwrap();
    engine
        .subscribe(
            SubscriptionDescriptor::new(route("/a", false), log.gated("tab-a", &gate))
                .in_group("tabs", Some(0)),
        )
        .unwrap();
    engine
        .subscribe(
            SubscriptionDescriptor::new(route("/b", false), log.gated("tab-b", &gate))
                .in_group("tabs", Some(1)),
        )
        .unwrap();
    log.take();
    gate.release();

    let handle = navigate(&engine, "/a");
    assert!(!handle.is_finished());
    assert_eq!(log.order(), vec!["tab-a"]);

    gate.release();
    handle.finished().await.unwrap();
    assert_eq!(log.take(), vec![seen("layout", Some("/"))]);

    let handle = navigate(&engine, "/b");
    assert_eq!(log.order(), vec!["tab-b"]);
    gate.release();
    handle.finished().await.unwrap();
    assert_eq!(log.take(), vec![seen("tab-a", None)]);
    gate.release();
}

#[tokio::test]
async fn test_unsubscribed_route_still_gets_queued_notification() {
    let (engine, _) = engine_at("/");
    let log = Recorder::new();
    let gate = Gate::new();

    engine
        .subscribe(
            SubscriptionDescriptor::new(route("/a", false), log.gated("group", &gate))
                .in_group("main", Some(0)),
        )
        .unwrap();
    let plain = engine
        .subscribe(SubscriptionDescriptor::new(route("/a", false), log.immediate("plain")))
        .unwrap();
    log.take();
    gate.release();

    let handle = navigate(&engine, "/a");
    assert_eq!(log.order(), vec!["group"]);

    plain.unsubscribe();
    assert_eq!(engine.subscription_count(), 1);

    gate.release();
    handle.finished().await.unwrap();
    assert_eq!(log.take(), vec![seen("plain", Some("/a"))]);

    // Gone from the next pass.
    navigate(&engine, "/").finished().await.unwrap();
    assert_eq!(log.order(), vec!["group"]);
    gate.release();
}

#[tokio::test]
async fn test_dropped_render_reports_abandoned() {
    let (engine, _) = engine_at("/");
    let unsubscribe = engine
        .subscribe(
            SubscriptionDescriptor::new(
                route("/a", false),
                Listener::deferred(|_| {
                    let (_done, signal) = rendezvous();
                    Ok(signal)
                }),
            )
            .in_group("tabs", Some(0)),
        )
        .unwrap();

    let err = navigate(&engine, "/a").finished().await.unwrap_err();
    assert!(matches!(err, DispatchError::Abandoned(id) if id == unsubscribe.id()));
}

#[tokio::test]
async fn test_listener_failure_stops_the_pass() {
    let (engine, _) = engine_at("/");
    let log = Recorder::new();
    let armed = AtomicBool::new(false);
    engine
        .subscribe(SubscriptionDescriptor::new(
            route("/a", false),
            Listener::immediate(move |_| {
                if armed.swap(true, Ordering::SeqCst) {
                    return Err(ListenerError::new("render failed"));
                }
                Ok(())
            }),
        ))
        .unwrap();
    engine
        .subscribe(SubscriptionDescriptor::new(route("/a", false), log.immediate("after")))
        .unwrap();
    log.take();

    let err = navigate(&engine, "/a").finished().await.unwrap_err();
    assert!(matches!(err, DispatchError::Listener { .. }));
    assert!(log.take().is_empty());
}

#[tokio::test]
async fn test_unsubscribe_is_idempotent_and_silences_route() {
    let (engine, _) = engine_at("/");
    let log = Recorder::new();
    let keep = engine
        .subscribe(SubscriptionDescriptor::new(route("/x", true), log.immediate("keep")))
        .unwrap();
    let gone = engine
        .subscribe(SubscriptionDescriptor::new(route("/x", true), log.immediate("gone")))
        .unwrap();
    log.take();

    gone.unsubscribe();
    gone.unsubscribe();
    assert!(keep.is_active());
    assert_eq!(engine.subscription_order(), vec![keep.id()]);

    navigate(&engine, "/x").finished().await.unwrap();
    assert_eq!(log.order(), vec!["keep"]);
}

#[tokio::test]
async fn test_unwritten_state_tracks_environment() {
    let engine = RouterEngine::new(Arc::new(FixedLocation(Location::new("/env"))));
    let state = engine.state();
    assert_eq!(state.location.as_ref().map(|l| l.pathname.as_str()), Some("/env"));
    assert!(state.root.is_none());
    assert_eq!(engine.location().pathname, "/env");

    let _ = engine.set(StateUpdate::new().title_suffix(" - Docs"));
    assert_eq!(engine.location().pathname, "/env");
    assert_eq!(engine.title_suffix().as_deref(), Some(" - Docs"));
}

#[tokio::test]
async fn test_listener_may_navigate_again() {
    let (engine, _) = engine_at("/");
    let log = Recorder::new();
    let redirect = engine.clone();
    engine
        .subscribe(SubscriptionDescriptor::new(
            route("/old", true),
            Listener::immediate(move |m| {
                if m.is_some() {
                    let _ = redirect.set(StateUpdate::new().location(Location::new("/new")));
                }
                Ok(())
            }),
        ))
        .unwrap();
    engine
        .subscribe(SubscriptionDescriptor::new(route("/new", true), log.immediate("new")))
        .unwrap();
    log.take();

    navigate(&engine, "/old").finished().await.unwrap();
    assert_eq!(engine.location().pathname, "/new");
    assert_eq!(log.take(), vec![seen("new", Some("/new"))]);
}

#[tokio::test]
async fn test_repeated_dispatch_without_set_is_silent() {
    let (engine, _) = engine_at("/tabs");
    let log = Recorder::new();
    for (name, index) in [("t0", 0), ("t1", 1), ("t2", 2)] {
        engine
            .subscribe(
                SubscriptionDescriptor::new(route("/tabs", false), log.settled(name))
                    .in_group("tabs", Some(index)),
            )
            .unwrap();
    }
    // Every member matched alone at registration; the first pass settles the group.
    log.take();
    engine.dispatch().await.unwrap();
    assert_eq!(log.take(), vec![seen("t1", None), seen("t2", None)]);

    engine.dispatch().await.unwrap();
    assert!(log.take().is_empty());
}
