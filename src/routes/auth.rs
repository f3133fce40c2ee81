//! JWT demo routes: login issuance and token introspection.
//!
//! The signing secret and algorithm are carried in an explicit
//! [`JwtConfig`] handed to the route constructors at registration time,
//! not in module-level globals.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::App;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::router::PatternError;

/// Token signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
}

impl JwtConfig {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
        }
    }
}

/// Register the login and user-info routes on `app`.
///
/// # Errors
///
/// Propagates [`PatternError`] from route registration.
pub fn register(app: &mut App, config: JwtConfig) -> Result<(), PatternError> {
    let config = Arc::new(config);
    let cfg = Arc::clone(&config);
    app.post("/login", move |req: HandlerRequest| login(&cfg, req))?;
    app.get("/user/me", move |req: HandlerRequest| read_me(&config, req))?;
    Ok(())
}

/// Issue a token for the demo credentials.
///
/// Credential problems are regular 400 responses; only infrastructure
/// failures (signing) surface as handler faults.
fn login(config: &JwtConfig, req: HandlerRequest) -> anyhow::Result<HandlerResponse> {
    let Some(body) = req.body else {
        return Ok(HandlerResponse::json(400, json!({ "message": "Missing body" })));
    };

    let login = body.get("login").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    let (Some(login), Some(password)) = (login, password) else {
        return Ok(HandlerResponse::json(
            400,
            json!({ "message": "Login and password must be provided." }),
        ));
    };

    if login != "admin" || password != "password" {
        return Ok(HandlerResponse::json(
            400,
            json!({ "message": "Login or password is incorrect." }),
        ));
    }

    let mut claims = body.clone();
    if let Some(obj) = claims.as_object_mut() {
        obj.insert("role".to_string(), json!("admin"));
    }
    let token = jsonwebtoken::encode(
        &Header::new(config.algorithm),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(HandlerResponse::json(200, json!({ "token": token })))
}

/// Decode the `Authorization` header token and return its claims.
///
/// Any failure (missing header, bad signature) is a handler fault and
/// renders as a generic 500.
fn read_me(config: &JwtConfig, req: HandlerRequest) -> anyhow::Result<HandlerResponse> {
    let token = req
        .get_header("authorization")
        .ok_or_else(|| anyhow::anyhow!("missing authorization header"))?;

    let mut validation = Validation::new(config.algorithm);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    let data = jsonwebtoken::decode::<Value>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(HandlerResponse::json(200, data.claims))
}
