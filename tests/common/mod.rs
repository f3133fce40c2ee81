use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Once;

/// Ensures the may coroutine config is applied only once per test binary.
static MAY_INIT: Once = Once::new();

pub fn setup_may_runtime() {
    MAY_INIT.call_once(|| {
        may::config().set_stack_size(0x20000);
    });
}

/// Send raw request bytes and read the full response.
///
/// `read_to_string` returning proves the server closed the connection
/// after its single response.
pub fn send_raw(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect to test server");
    stream.write_all(raw.as_bytes()).expect("write request");
    let mut out = String::new();
    stream.read_to_string(&mut out).expect("read response");
    out
}

pub fn status_line(resp: &str) -> &str {
    resp.lines().next().unwrap_or("")
}

pub fn body_of(resp: &str) -> &str {
    resp.split("\r\n\r\n").nth(1).unwrap_or("")
}
