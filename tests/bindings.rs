//! Root, route and link bindings working together.

use std::sync::Arc;

use active_router::bindings::{RootRouter, RouteDeclaration, RouteLink};
use active_router::config::{parse_config, RouterSection};
use active_router::state::{History, MemoryHistory};
use active_router::RouterEngine;

mod common;

fn section(root: &str) -> RouterSection {
    RouterSection {
        root: root.to_string(),
        ..RouterSection::default()
    }
}

#[tokio::test]
async fn test_readiness_waits_for_root_router() {
    let history = Arc::new(MemoryHistory::new("/app/start"));
    let engine = RouterEngine::new(history.clone());

    let waiter = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.wait_ready().await })
    };
    common::settle_tasks().await;
    assert!(!waiter.is_finished());

    let _router = RootRouter::initialize(&engine, &section("/app"), history.clone())
        .await
        .unwrap();
    assert_eq!(waiter.await.unwrap().pathname, "/start");
}

#[tokio::test]
async fn test_grouped_routes_switch_through_history() {
    let history = Arc::new(MemoryHistory::new("/"));
    let engine = RouterEngine::new(history.clone());
    let router = RootRouter::initialize(&engine, &section("/"), history.clone())
        .await
        .unwrap();

    let home = RouteDeclaration::new("/")
        .exact(true)
        .group("pages", Some(0))
        .mount(&engine)
        .unwrap();
    let about = RouteDeclaration::new("/about")
        .group("pages", Some(1))
        .scroll_top_offset(0.0)
        .mount(&engine)
        .unwrap();
    home.did_render();
    about.did_render();
    assert!(home.is_visible());
    assert!(!about.is_visible());

    history.push("/about");
    // The pass waits on the newly active route before telling `home`.
    assert!(about.matched().is_some());
    assert!(home.matched().is_some());

    about.did_render();
    router.flush().await.unwrap();
    assert!(home.matched().is_none());
    home.did_render();

    assert!(about.is_visible());
    assert!(!home.is_visible());
    let scroll = about.did_render().unwrap();
    assert_eq!((scroll.x, scroll.y), (0.0, 0.0));
}

#[tokio::test]
async fn test_link_navigation_under_root() {
    let history = Arc::new(MemoryHistory::new("/app"));
    let engine = RouterEngine::new(history.clone());
    let _router = RootRouter::initialize(&engine, &section("/app/"), history.clone())
        .await
        .unwrap();

    let docs = RouteDeclaration::new("/docs").mount(&engine).unwrap();
    assert!(docs.matched().is_none());

    let link = RouteLink::new("/docs");
    assert!(!link.is_active(&engine.location()).unwrap());
    assert_eq!(link.click(&engine, false).as_deref(), Some("/app/docs"));

    assert_eq!(engine.location().pathname, "/docs");
    assert!(link.is_active(&engine.location()).unwrap());
    assert_eq!(docs.matched().unwrap().url, "/docs");
}

#[tokio::test]
async fn test_unmounted_route_stops_listening() {
    let history = Arc::new(MemoryHistory::new("/"));
    let engine = RouterEngine::new(history.clone());
    let _router = RootRouter::initialize(&engine, &section("/"), history.clone())
        .await
        .unwrap();

    let route = RouteDeclaration::new("/x").mount(&engine).unwrap();
    assert_eq!(engine.subscription_count(), 2);
    route.unmount();
    assert_eq!(engine.subscription_count(), 1);
}

#[tokio::test]
async fn test_config_route_table_mounts() {
    let config = parse_config(
        r#"
        [[routes]]
        name = "home"
        url = "/"
        exact = true
        group = "main"
        group_index = 0

        [[routes]]
        name = "docs"
        url = ["/docs", "/guide"]
        group = "main"
        group_index = 1
        "#,
    )
    .unwrap();

    let history = Arc::new(MemoryHistory::new("/guide/setup"));
    let engine = RouterEngine::with_config(history.clone(), config.matching.clone());
    let mounted: Vec<_> = config
        .routes
        .iter()
        .map(|r| RouteDeclaration::from_config(r, config.matching.sensitive).mount(&engine).unwrap())
        .collect();

    assert!(mounted[0].matched().is_none());
    assert_eq!(mounted[1].matched().unwrap().path, "/guide");
    assert_eq!(history.len(), 1);
}
