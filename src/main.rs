//! Scoped router demo server.
//!
//! # Layout
//!
//! ```text
//!   root (access log, request id, metrics, optional gzip)
//!   ├── GET  /                      plain text
//!   ├── GET  /public                + log middleware (per-route)
//!   ├── GET  /compressed            large body, gzip when accepted
//!   ├── GET  /users                 + auth
//!   ├── GET  /dashboard             + auth (derived scope)
//!   ├── PUT  /api/profile           route builder + auth
//!   ├── GET  /api/admin             route builder + auth + admin role
//!   └── /api/v1
//!       ├── GET  /health
//!       ├── GET  /status            + log middleware (derived scope)
//!       ├── GET  /echo, POST /echo  JSON echo
//!       └── /users (+ auth)
//!           └── GET /profile
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{header, HeaderValue, StatusCode};
use clap::Parser;
use serde_json::json;

use scoped_router::config::{load_config, ServerConfig};
use scoped_router::http::{response, Handler, HttpServer, Middleware};
use scoped_router::lifecycle::{trigger_on_ctrl_c, Shutdown};
use scoped_router::middleware::{
    access_logging, compression, request_id, request_metrics, AccessLogConfig,
};
use scoped_router::observability::{logging, metrics};
use scoped_router::Router;

#[derive(Parser)]
#[command(name = "scoped-router")]
#[command(about = "Demo server for the scoped HTTP router", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_filter)?;
    tracing::info!("scoped-router v0.1.0 starting");

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let router = build_router(&config);
    router.print_routes();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    trigger_on_ctrl_c(shutdown);

    let server = HttpServer::new(&router, config.clone());
    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            server.run_tls(addr, tls, receiver).await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(&config.listener.bind_address).await?;
            server.run(listener, receiver).await?;
        }
    }

    Ok(())
}

fn build_router(config: &ServerConfig) -> Router {
    let mut root_middleware = vec![request_id(), request_metrics()];
    if config.compression.enabled {
        root_middleware.push(compression());
    }
    if config.access_log.enabled {
        root_middleware.push(access_logging(AccessLogConfig::stdout(
            config.access_log.format,
        )));
    }
    let root = Router::new().use_middleware(root_middleware);

    root.get("/", |_req, w| {
        let _ = w.write(b"Hello from the scoped router!");
    });

    root.get_with(
        "/public",
        |_req, w| {
            let _ = w.write(b"Public endpoint with access logging + custom middleware");
        },
        [log_middleware()],
    );

    let large_content =
        "This is test content that will be compressed when the client supports gzip. "
            .repeat(50);
    let compressed = if config.compression.enabled {
        root.clone()
    } else {
        root.with([compression()])
    };
    compressed.get("/compressed", move |_req, w| {
        w.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let _ = w.write(large_content.as_bytes());
    });

    root.with([auth_middleware()]).get("/users", |_req, w| {
        let _ = w.write(b"Get all users");
    });

    let protected = root.use_middleware([auth_middleware()]);
    protected.get("/dashboard", |_req, w| {
        let _ = w.write(b"User dashboard");
    });

    root.route("/api/admin")
        .use_middleware([auth_middleware(), admin_middleware()])
        .get(|_req, w| {
            let _ = w.write(b"Admin API endpoint");
        });

    root.route("/api/profile")
        .use_middleware([auth_middleware()])
        .put(|_req, w| {
            let _ = w.write(b"Update profile");
        });

    let api = root.group("/api/v1");
    api.get("/health", |_req, w| {
        let _ = w.write(b"API is healthy");
    });
    api.with([log_middleware()]).get("/status", |_req, w| {
        let _ = w.write(b"API status: running");
    });

    let echo = api.route("/echo");
    echo.get(|req, w| write_json(w, &json!({ "query": req.uri().query() })));
    echo.post(|req, w| {
        let body = String::from_utf8_lossy(req.body());
        write_json(w, &json!({ "received": body }));
    });

    let users = api.with([auth_middleware()]).group("/users");
    users.get("/profile", |_req, w| {
        let _ = w.write(b"User profile");
    });

    root
}

fn write_json(w: &mut dyn scoped_router::ResponseWriter, value: &serde_json::Value) {
    w.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    let _ = w.write(value.to_string().as_bytes());
}

fn log_middleware() -> Middleware {
    Middleware::new(|next: Handler| {
        Handler::new(move |req, w| {
            tracing::info!(method = %req.method(), path = %req.uri().path(), "Custom log middleware");
            next.call(req, w);
        })
    })
}

fn auth_middleware() -> Middleware {
    Middleware::new(|next: Handler| {
        Handler::new(move |req, w| {
            let authorized = req
                .headers()
                .get(header::AUTHORIZATION)
                .is_some_and(|v| v == "Bearer valid-token");
            if !authorized {
                response::error(w, "Unauthorized", StatusCode::UNAUTHORIZED);
                return;
            }
            tracing::info!(path = %req.uri().path(), "User authenticated");
            next.call(req, w);
        })
    })
}

fn admin_middleware() -> Middleware {
    Middleware::new(|next: Handler| {
        Handler::new(move |req, w| {
            let is_admin = req
                .headers()
                .get("x-user-role")
                .is_some_and(|v| v == "admin");
            if !is_admin {
                response::error(w, "Forbidden: Admin access required", StatusCode::FORBIDDEN);
                return;
            }
            tracing::info!(path = %req.uri().path(), "Admin access granted");
            next.call(req, w);
        })
    })
}
