//! Environment-based runtime tuning.
//!
//! `MICROFRAME_STACK_SIZE` sets the coroutine stack size, in decimal
//! (`65536`) or hex (`0x10000`). Larger stacks tolerate deeper handler
//! call chains; smaller ones keep memory down under many concurrent
//! connections.

/// Runtime settings applied to the `may` scheduler before the server
/// starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Coroutine stack size in bytes.
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: Self::DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// 64 KiB default, enough for the dispatch pipeline plus typical
    /// handler logic.
    pub const DEFAULT_STACK_SIZE: usize = 0x10000;

    /// Read settings from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = std::env::var("MICROFRAME_STACK_SIZE")
            .ok()
            .and_then(|s| parse_size(&s))
            .unwrap_or(Self::DEFAULT_STACK_SIZE);
        Self { stack_size }
    }

    /// Apply the settings to the global coroutine config.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

fn parse_size(s: &str) -> Option<usize> {
    if let Some(hex) = s.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_decimal_and_hex() {
        assert_eq!(parse_size("65536"), Some(65536));
        assert_eq!(parse_size("0x10000"), Some(65536));
        assert_eq!(parse_size("bogus"), None);
    }

    #[test]
    fn test_default_stack_size() {
        assert_eq!(RuntimeConfig::default().stack_size, 0x10000);
    }
}
