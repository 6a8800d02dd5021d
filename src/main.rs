//! pathwalk demo server.
//!
//! Serves a small match tree over HTTP so the routing core can be poked at
//! with curl:
//!
//! ```text
//! GET  /                      → welcome page
//! GET  /users/{id}            → user page
//! POST /session               → set a session cookie, redirect home
//! DELETE /session             → clear it
//! *    /admin/...             → nested dispatcher (run)
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use pathwalk::config::load_config;
use pathwalk::observability::logging;
use pathwalk::routing::ConfiguredDeck;
use pathwalk::{capture, CookieOptions, Dispatcher, HttpServer, Inbox, ServerConfig, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "pathwalk", version, about = "Serve the pathwalk demo match tree")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,
}

fn admin_app() -> Dispatcher {
    Dispatcher::new(|c| {
        c.get(|c| {
            let by = c.param("user").unwrap_or("anonymous").to_string();
            c.res.write(format!("admin home (entered by {})", by));
            Ok(())
        })?;
        c.on("stats", |c| {
            c.get(|c| {
                let body = serde_json::json!({
                    "script_name": c.req().script_name(),
                    "path_info": c.req().path_info(),
                });
                c.res.json(&body)?;
                Ok(())
            })
        })
    })
}

fn demo_app(config: &ServerConfig) -> Dispatcher {
    let admin = admin_app();

    Dispatcher::with_deck(ConfiguredDeck::from_config(&config.response), move |c| {
        c.get(|c| {
            let who = c.req().cookie("session").unwrap_or_else(|| "stranger".into());
            c.res.write(format!("<h1>Hello, {}</h1>", who));
            Ok(())
        })?;

        c.on("users", |c| {
            c.on(capture("id"), |c| {
                c.get(|c| {
                    let id = c.param("id").unwrap_or_default().to_string();
                    c.res.write(format!("<p>User {}</p>", id));
                    Ok(())
                })
            })
        })?;

        c.on("session", |c| {
            c.post(|c| {
                let user = c.req().param("user").unwrap_or_else(|| "guest".into());
                c.res
                    .set_cookie("session", CookieOptions::new(user).path("/").http_only());
                c.res.redirect("/");
                Ok(())
            })?;
            c.delete(|c| {
                c.res.delete_cookie_with("session", CookieOptions::default().path("/"));
                c.res.redirect("/");
                Ok(())
            })
        })?;

        c.on("admin", |c| {
            let user = c.req().cookie("session").unwrap_or_else(|| "anonymous".into());
            let inbox: Inbox = [("user", user)].into_iter().collect();
            c.run(&admin, inbox)
        })
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;
    tracing::info!("pathwalk v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_bytes = config.limits.max_body_bytes,
        default_headers = config.response.default_headers.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let app = Arc::new(demo_app(&config));
    let server = HttpServer::new(config, app);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
