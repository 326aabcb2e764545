//! Shell quoting for rendered command strings.
//!
//! The rendered command doubles as copy-into-your-shell text, so every
//! argument that a POSIX shell would mangle gets single-quoted.

/// Characters (beyond whitespace) that force an argument into quotes.
const SHELL_SPECIAL: &[u8] = br#""'\|&;()<>$`*?[]{}!#~"#;

/// Reports whether `arg` must be quoted to survive a shell round trip.
///
/// Arguments beginning with `http://`, `https://` or `ftp://` are never
/// quoted, whatever they contain: URLs read better bare in the preview and
/// are assumed shell-safe enough. The empty string needs quoting (`''`) to
/// stay visible as an argument at all.
pub fn needs_quoting(arg: &str) -> bool {
    if arg.starts_with("http://") || arg.starts_with("https://") || arg.starts_with("ftp://") {
        return false;
    }
    if arg.is_empty() {
        return true;
    }
    arg.bytes()
        .any(|byte| byte.is_ascii_whitespace() || SHELL_SPECIAL.contains(&byte))
}

/// Wraps `arg` in single quotes.
///
/// A literal single quote cannot appear inside a single-quoted string, so
/// each one is replaced with `'"'"'`: close the quote, emit a double-quoted
/// quote, reopen.
pub fn quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r#"'"'"'"#))
}

/// Quotes `arg` when [`needs_quoting`] says so and the argument is not
/// already wrapped in quotes.
pub fn quote_if_needed(arg: &str) -> String {
    if already_quoted(arg) || !needs_quoting(arg) {
        return arg.to_string();
    }
    quote(arg)
}

fn already_quoted(arg: &str) -> bool {
    arg.len() >= 2
        && ((arg.starts_with('\'') && arg.ends_with('\'')) || (arg.starts_with('"') && arg.ends_with('"')))
}
