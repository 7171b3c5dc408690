//! Path resolution through the fixture application.

use std::sync::Arc;

use mvc_dispatch::resolve::{Resolution, RouteNotFound};
use mvc_dispatch::Dispatcher;

mod common;

fn resolution(module: Option<&str>, controller: &str, action: &str, args: &[&str]) -> Resolution {
    Resolution {
        module: module.map(str::to_string),
        controller: controller.to_string(),
        action: action.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
    }
}

#[test]
fn test_fixture_config_builds_dispatcher() {
    let fixture = common::fixture();
    let config = common::config();
    let dispatcher = Dispatcher::from_config(&config, fixture.registry).unwrap();
    assert_eq!(dispatcher.defaults().controller, "home");
    assert_eq!(dispatcher.defaults().action, "index");
}

#[test]
fn test_empty_path_uses_defaults() {
    let (dispatcher, _) = common::dispatcher();
    assert_eq!(dispatcher.resolve("").unwrap(), resolution(None, "home", "index", &[]));
}

#[test]
fn test_module_controller_default_action_with_argument() {
    let (dispatcher, _) = common::dispatcher();
    assert_eq!(
        dispatcher.resolve("blog/post/42").unwrap(),
        resolution(Some("blog"), "post", "index", &["42"])
    );
}

#[test]
fn test_rewrite_before_resolution() {
    let (dispatcher, _) = common::dispatcher();
    assert_eq!(dispatcher.routes().rewrite("old/7"), "new/7");
    assert_eq!(dispatcher.resolve("old/7").unwrap(), resolution(None, "new", "index", &["7"]));
    assert_eq!(dispatcher.resolve("about-us").unwrap(), resolution(None, "home", "about", &[]));
}

#[test]
fn test_explicit_action() {
    let (dispatcher, _) = common::dispatcher();
    assert_eq!(dispatcher.resolve("home/about").unwrap(), resolution(None, "home", "about", &[]));
    assert_eq!(
        dispatcher.resolve("blog/post/edit/3/draft").unwrap(),
        resolution(Some("blog"), "post", "edit", &["3", "draft"])
    );
}

#[test]
fn test_default_controller_action_from_first_segment() {
    let (dispatcher, _) = common::dispatcher();
    assert_eq!(dispatcher.resolve("about").unwrap(), resolution(None, "home", "about", &[]));
    assert_eq!(dispatcher.resolve("greet/ada").unwrap(), resolution(None, "home", "greet", &["ada"]));
}

#[test]
fn test_module_default_controller() {
    let (dispatcher, _) = common::dispatcher();
    assert_eq!(dispatcher.resolve("blog").unwrap(), resolution(Some("blog"), "home", "index", &[]));
}

#[test]
fn test_unknown_first_segment_is_not_found() {
    let (dispatcher, _) = common::dispatcher();
    let err = dispatcher.resolve("nowhere").unwrap_err();
    assert_eq!(
        err,
        RouteNotFound {
            path: "nowhere".to_string(),
            attempted_module: None,
        }
    );
}

#[test]
fn test_private_methods_are_not_dispatchable() {
    let (dispatcher, _) = common::dispatcher();
    assert!(dispatcher.resolve("home/secret").is_err());
    assert!(dispatcher.resolve("secret").is_err());
}

// Arity is strict equality: extra or missing segments never match.
#[test]
fn test_strict_arity() {
    let (dispatcher, _) = common::dispatcher();
    assert!(dispatcher.resolve("home/greet").is_err());
    assert!(dispatcher.resolve("home/greet/ada/lovelace").is_err());
    assert!(dispatcher.resolve("blog/post").is_err());
    assert!(dispatcher.resolve("new/1/2").is_err());
}

#[test]
fn test_not_found_keeps_attempted_module() {
    let (dispatcher, _) = common::dispatcher();
    let err = dispatcher.resolve("blog/post/1/2").unwrap_err();
    assert_eq!(err.attempted_module.as_deref(), Some("blog"));

    let err = dispatcher.resolve("shop/cart").unwrap_err();
    assert_eq!(err.attempted_module.as_deref(), Some("shop"));
}

#[test]
fn test_names_are_case_insensitive() {
    let (dispatcher, _) = common::dispatcher();
    let found = dispatcher.resolve("Blog/POST/42").unwrap();
    assert_eq!(found.class_name(), "Module\\Blog\\Controller\\Post");
    assert_eq!(found.args, vec!["42"]);
}

#[test]
fn test_modules_disabled() {
    let fixture = common::fixture();
    let mut config = common::config();
    config.dispatch.modules = false;
    let dispatcher = Dispatcher::from_config(&config, fixture.registry).unwrap();

    assert!(dispatcher.resolve("blog/post/42").is_err());
    assert_eq!(dispatcher.resolve("").unwrap(), resolution(None, "home", "index", &[]));
}

#[test]
fn test_default_module_fallback() {
    let fixture = common::fixture();
    let mut config = common::config();
    config.dispatch.module = "blog".to_string();
    let dispatcher = Dispatcher::from_config(&config, Arc::clone(&fixture.registry)).unwrap();

    assert_eq!(
        dispatcher.resolve("post/42").unwrap(),
        resolution(Some("blog"), "post", "index", &["42"])
    );
    let err = dispatcher.resolve("nowhere").unwrap_err();
    assert_eq!(err.attempted_module.as_deref(), Some("blog"));
}

#[test]
fn test_missing_default_controller_fails_fast() {
    let fixture = common::fixture();
    let mut config = common::config();
    config.dispatch.controller = "start".to_string();
    assert!(Dispatcher::from_config(&config, fixture.registry).is_err());
}
