//! Response serialization to the HTTP/1.1 wire format.
//!
//! Fixed header order: status line, `Content-Type`, `Content-Length`,
//! `Connection: close`, then any headers the handler or error mapper set,
//! a blank line and the JSON body. A body-less response omits both the
//! body and its preceding blank line.

use crate::dispatcher::HandlerResponse;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Serialize a response into the bytes written to the socket.
///
/// Serialization happens exactly once per response; the connection is
/// closed immediately after the write.
#[must_use]
pub fn serialize_response(resp: &HandlerResponse) -> Vec<u8> {
    let body = resp
        .body
        .as_ref()
        .map(|b| serde_json::to_string(b).unwrap_or_else(|_| "null".to_string()));
    let content_length = body.as_ref().map_or(0, String::len);

    let mut out = String::with_capacity(128 + content_length);
    out.push_str(&format!(
        "HTTP/1.1 {} {}\r\n",
        resp.status,
        status_reason(resp.status)
    ));
    out.push_str("Content-Type: application/json\r\n");
    out.push_str(&format!("Content-Length: {content_length}\r\n"));
    out.push_str("Connection: close\r\n");
    for (name, value) in &resp.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    if let Some(body) = body {
        out.push_str("\r\n");
        out.push_str(&body);
    }

    out.into_bytes()
}
