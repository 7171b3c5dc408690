//! Shared fixture application for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;

use mvc_dispatch::config::{AppConfig, RouteConfig};
use mvc_dispatch::events::{POST_DISPATCH, PRE_DISPATCH};
use mvc_dispatch::{ControllerDef, Dispatcher, HttpServer, Registry, Shutdown};

#[derive(Default)]
pub struct Home;

#[derive(Default)]
pub struct Post;

#[derive(Default)]
pub struct Missing;

/// Controller counting its own actions, built by a factory.
pub struct Counter {
    pub start: usize,
}

/// The fixture registry and the number of times the blog bootstrap ran.
pub struct Fixture {
    pub registry: Arc<Registry>,
    pub bootstraps: Arc<AtomicUsize>,
}

/// Build the fixture application.
///
/// Root controllers: `home` (index, about, greet/1, layout, moved, private secret),
/// `new` (index/1), `broken` (index fails), `locked` (factory fails).
/// Module `blog`: `post` (index/1, edit/2), `home` (index), `notfound` (index/1).
/// Module `shop`: declared, no controllers.
pub fn fixture() -> Fixture {
    let bootstraps = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();

    registry
        .register(
            ControllerDef::<Home>::new("home")
                .action("index", 0, |_, ctx, _| {
                    ctx.response.write("home:index");
                    Ok(())
                })
                .action("about", 0, |_, ctx, _| {
                    ctx.response.write("home:about");
                    Ok(())
                })
                .action("greet", 1, |_, ctx, args| {
                    ctx.response.write(&format!("hello {}", args[0]));
                    Ok(())
                })
                .action("layout", 0, |_, ctx, _| {
                    ctx.response.write("content");
                    ctx.events.register(
                        POST_DISPATCH,
                        |ctx, args| {
                            let label = args[0].as_str().unwrap_or_default().to_string();
                            ctx.response.write(&format!("|{}", label));
                        },
                        vec![serde_json::json!("layout")],
                    );
                    Ok(())
                })
                .action("moved", 0, |_, ctx, _| {
                    ctx.redirect("home/about");
                    Ok(())
                })
                .private_action("secret", 0),
        )
        .register(ControllerDef::<Home>::new("new").action("index", 1, |_, ctx, args| {
            ctx.response.write(&format!("new:{}", args[0]));
            Ok(())
        }))
        .register(
            ControllerDef::<Home>::new("broken").action("index", 0, |_, _, _| Err("boom".into())),
        )
        .register(
            ControllerDef::<Home>::with_factory("locked", |_| Err("no database".into()))
                .action("index", 0, |_, _, _| Ok(())),
        )
        .register(
            ControllerDef::with_factory("counter", |_| Ok(Counter { start: 10 })).action(
                "index",
                0,
                |counter: &mut Counter, ctx, _| {
                    counter.start += 1;
                    ctx.response.write(&counter.start.to_string());
                    Ok(())
                },
            ),
        )
        .register(
            ControllerDef::<Post>::new("post")
                .module("blog")
                .action("index", 1, |_, ctx, args| {
                    ctx.response.write(&format!("post:{}", args[0]));
                    Ok(())
                })
                .action("edit", 2, |_, ctx, args| {
                    ctx.response.write(&format!("edit:{}:{}", args[0], args[1]));
                    Ok(())
                }),
        )
        .register(ControllerDef::<Home>::new("home").module("blog").action("index", 0, |_, ctx, _| {
            ctx.response.write("blog:home");
            Ok(())
        }))
        .register(
            ControllerDef::<Missing>::new("notfound")
                .module("blog")
                .action("index", 1, |_, ctx, args| {
                    ctx.response.write(&format!("blog missing {}", args[0]));
                    Ok(())
                }),
        )
        .module("shop");

    let counter = Arc::clone(&bootstraps);
    registry.bootstrap("blog", move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    registry.hook(PRE_DISPATCH, |ctx, args| {
        let controller = args[0]["resolution"]["controller"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        ctx.response.set_header("x-dispatched", controller);
    });

    Fixture {
        registry: Arc::new(registry),
        bootstraps,
    }
}

/// Fixture configuration: defaults home/index and the `old/N` rewrite.
pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.dispatch.controller = "home".to_string();
    config.dispatch.action = "index".to_string();
    config.routes.push(RouteConfig {
        pattern: r"old/(\d+)".to_string(),
        destination: "new/$1".to_string(),
    });
    config.routes.push(RouteConfig {
        pattern: "about-us".to_string(),
        destination: "home/about".to_string(),
    });
    config
}

pub fn dispatcher() -> (Dispatcher, Arc<AtomicUsize>) {
    let fixture = fixture();
    let dispatcher = Dispatcher::from_config(&config(), fixture.registry).unwrap();
    (dispatcher, fixture.bootstraps)
}

/// Start the HTTP front end on an ephemeral port.
pub async fn start_server(config: AppConfig, registry: Arc<Registry>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config, registry).unwrap();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        server.run(listener, None, signal).await.unwrap();
    });

    (addr, shutdown)
}
