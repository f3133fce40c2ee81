//! # microframe
//!
//! A minimal coroutine-powered HTTP/1.1 micro-framework: path-template
//! routing, an abort-on-failure middleware chain, and a dispatcher that
//! maps every failure to exactly one response per connection.
//!
//! ## Architecture
//!
//! - **[`router`]** - path-template compilation (`/book/{name}`) and
//!   first-match-wins route resolution
//! - **[`dispatcher`]** - request/response models, the `Handler` trait and
//!   the per-request pipeline with its error mapper
//! - **[`middleware`]** - ordered pre-handler hooks with abort-on-failure
//!   semantics
//! - **[`server`]** - incremental request parsing over `httparse`,
//!   response serialization and the coroutine-per-connection TCP server
//! - **[`app`]** - explicit builder tying routes, middleware and
//!   startup/shutdown hooks together
//! - **[`routes`]** - demo handlers (hello-world, JWT login) used by the
//!   `microframe` binary
//!
//! ## Request Flow
//!
//! 1. The accept loop hands each connection to its own `may` coroutine.
//! 2. The connection's `RequestParser` buffers inbound bytes until the
//!    parser reports message-complete, then yields one `ParsedRequest`.
//! 3. The dispatcher runs the middleware chain, resolves the route,
//!    invokes the handler and maps any failure (middleware abort, no
//!    match, handler error or panic) to a 404/500 response.
//! 4. The response is serialized once, written, and the connection is
//!    closed. No keep-alive, one request per connection.
//!
//! ## Example
//!
//! ```rust,no_run
//! use microframe::app::App;
//! use microframe::dispatcher::{HandlerRequest, HandlerResponse};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut app = App::new();
//! app.get("/hello_world", |_req: HandlerRequest| {
//!     Ok(HandlerResponse::json(200, json!({ "hello": "world" })))
//! })?;
//! app.run("127.0.0.1", 8080)?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod dispatcher;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod runtime_config;
pub mod server;

pub use app::App;
pub use dispatcher::{DispatchError, Dispatcher, Handler, HandlerRequest, HandlerResponse};
pub use middleware::{Middleware, MiddlewareError};
pub use router::{PathPattern, PatternError, RouteMatch, Router};
pub use server::{HttpServer, ServerHandle};
