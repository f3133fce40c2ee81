//! Hello-world demo routes.

use serde_json::json;

use crate::app::App;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::router::PatternError;

/// Register the hello-world routes on `app`.
///
/// # Errors
///
/// Propagates [`PatternError`] from route registration.
pub fn register(app: &mut App) -> Result<(), PatternError> {
    app.get("/hello_world", hello_world)?;
    app.post("/hello_world", echo_back)?;
    app.get("/hello_world/{name}", greet)?;
    Ok(())
}

fn hello_world(_req: HandlerRequest) -> anyhow::Result<HandlerResponse> {
    Ok(HandlerResponse::json(200, json!({ "hello": "world" })))
}

/// Echo the JSON body back, merged with `{"hello": "back"}`.
fn echo_back(req: HandlerRequest) -> anyhow::Result<HandlerResponse> {
    let mut body = req.body.unwrap_or_else(|| json!({}));
    let obj = body
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("expected a JSON object body"))?;
    obj.insert("hello".to_string(), json!("back"));
    Ok(HandlerResponse::json(200, body))
}

fn greet(req: HandlerRequest) -> anyhow::Result<HandlerResponse> {
    let name = req
        .get_path_param("name")
        .ok_or_else(|| anyhow::anyhow!("missing 'name' path parameter"))?;
    Ok(HandlerResponse::json(200, json!({ "msg": format!("Hello {name}") })))
}
