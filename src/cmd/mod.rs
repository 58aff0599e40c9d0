pub mod classify;
pub mod output;
pub mod probe;
pub mod select;

/// Desktop browser identity used when `--user-agent` is not given.
pub const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
