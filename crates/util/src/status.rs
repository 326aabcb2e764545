//! HTTP status marker protocol.
//!
//! Execution-mode commands carry a `-w` format ending in a sentinel line so
//! the last HTTP status code can be recovered from captured stdout without
//! re-parsing response headers. The sentinel must be stripped from any
//! stdout shown to a user.

/// Prefix of the sentinel line injected into captured stdout.
pub const STATUS_MARKER: &str = "__LAZYCURL_HTTP_STATUS__";

/// Write-out fragment appended to the user's `-w` format (or used alone).
///
/// The `\n` sequences are literal backslash-n in the argument; curl itself
/// expands them when it prints the format.
pub const STATUS_WRITE_OUT: &str = "\\n__LAZYCURL_HTTP_STATUS__%{http_code}\\n";

/// Recovers the last HTTP status code reported via the marker, if any.
pub fn extract_http_status(stdout: &str) -> Option<u16> {
    stdout
        .lines()
        .filter_map(parse_marker_line)
        .last()
}

/// Removes every marker line from `stdout`, preserving all other content
/// byte for byte.
pub fn strip_status_marker(stdout: &str) -> String {
    stdout
        .split_inclusive('\n')
        .filter(|line| parse_marker_line(line).is_none())
        .collect()
}

/// Parses one line as a marker line: the sentinel prefix immediately
/// followed by digits.
fn parse_marker_line(line: &str) -> Option<u16> {
    let rest = line.strip_prefix(STATUS_MARKER)?;
    let digits = rest.trim_end_matches(['\r', '\n']);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
