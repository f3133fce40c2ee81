//! Application builder.
//!
//! Explicit route and middleware registration plus startup/shutdown
//! hooks, with no hidden global registry. A typical setup:
//!
//! ```rust,no_run
//! use microframe::app::App;
//! use microframe::dispatcher::{HandlerRequest, HandlerResponse};
//! use http::Method;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut app = App::new();
//! app.route("/hello_world/{name}", Method::GET, |req: HandlerRequest| {
//!     let name = req.get_path_param("name").unwrap_or("world");
//!     Ok(HandlerResponse::json(200, json!({ "msg": format!("Hello {name}") })))
//! })?;
//! app.run("127.0.0.1", 8080)?;
//! # Ok(())
//! # }
//! ```

use http::Method;
use std::io;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use tracing::info;

use crate::dispatcher::{Dispatcher, Handler};
use crate::middleware::Middleware;
use crate::router::{PatternError, Router};
use crate::runtime_config::RuntimeConfig;
use crate::server::{HttpServer, ServerHandle};

type LifecycleHook = Box<dyn FnOnce() + Send>;

/// Builder wiring routes, middleware and lifecycle hooks into a running
/// server.
#[derive(Default)]
pub struct App {
    router: Router,
    middlewares: Vec<Arc<dyn Middleware>>,
    on_startup: Vec<LifecycleHook>,
    on_shutdown: Vec<LifecycleHook>,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `(path, method)`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the path template does not compile.
    pub fn route(
        &mut self,
        path: &str,
        method: Method,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self, PatternError> {
        self.router.register(path, method, Arc::new(handler))?;
        Ok(self)
    }

    /// Shorthand for [`App::route`] with `GET`.
    pub fn get(
        &mut self,
        path: &str,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self, PatternError> {
        self.route(path, Method::GET, handler)
    }

    /// Shorthand for [`App::route`] with `POST`.
    pub fn post(
        &mut self,
        path: &str,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self, PatternError> {
        self.route(path, Method::POST, handler)
    }

    /// Shorthand for [`App::route`] with `PUT`.
    pub fn put(
        &mut self,
        path: &str,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self, PatternError> {
        self.route(path, Method::PUT, handler)
    }

    /// Print the registered routes to stdout.
    pub fn dump_routes(&self) {
        self.router.dump_routes();
    }

    /// Append a middleware to the chain.
    pub fn middleware(&mut self, mw: impl Middleware + 'static) -> &mut Self {
        self.middlewares.push(Arc::new(mw));
        self
    }

    /// Register a hook invoked once, before the listener binds.
    pub fn on_startup(&mut self, hook: impl FnOnce() + Send + 'static) -> &mut Self {
        self.on_startup.push(Box::new(hook));
        self
    }

    /// Register a hook invoked once, on shutdown. Only [`App::run`]
    /// drives shutdown hooks; with [`App::start`] the lifecycle is the
    /// caller's.
    pub fn on_shutdown(&mut self, hook: impl FnOnce() + Send + 'static) -> &mut Self {
        self.on_shutdown.push(Box::new(hook));
        self
    }

    /// Run startup hooks and start serving, returning the handle.
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be bound.
    pub fn start<A: ToSocketAddrs>(mut self, addr: A) -> io::Result<ServerHandle> {
        for hook in self.on_startup.drain(..) {
            hook();
        }
        let mut dispatcher = Dispatcher::new(Arc::new(self.router));
        for mw in self.middlewares.drain(..) {
            dispatcher.add_middleware(mw);
        }
        HttpServer::new(Arc::new(dispatcher)).start(addr)
    }

    /// Run the application until a shutdown signal arrives.
    ///
    /// Applies [`RuntimeConfig`] from the environment, runs startup
    /// hooks, serves on `host:port`, and on SIGTERM/SIGINT runs the
    /// shutdown hooks and stops the server.
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be bound or signal
    /// handling cannot be installed.
    pub fn run(mut self, host: &str, port: u16) -> anyhow::Result<()> {
        RuntimeConfig::from_env().apply();

        let shutdown_hooks = std::mem::take(&mut self.on_shutdown);
        let handle = self.start((host, port))?;
        info!(host = %host, port = port, "Server started");

        wait_for_shutdown_signal()?;

        info!("Shutdown process");
        for hook in shutdown_hooks {
            hook();
        }
        handle.stop();
        Ok(())
    }
}

#[cfg(unix)]
fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    if let Some(signal) = signals.forever().next() {
        info!(signal = signal, "Shutdown signal received");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    // No signal support; park until the process is killed.
    loop {
        std::thread::park();
    }
}
