//! Shell-like command splitting.
//!
//! Turns a rendered command string back into argv, honoring single and
//! double quotes and backslash escapes so that arguments quoted by the
//! builder (header values, write-out formats) survive the round trip intact.

/// Splits `input` into unquoted argv tokens.
///
/// Quote characters delimit but do not appear in the produced tokens;
/// backslash escapes outside single quotes yield the escaped character
/// literally. Unterminated quotes consume the rest of the input.
///
/// # Example
/// ```
/// use lazycurl_util::shell_lexing::split_command;
///
/// let argv = split_command("curl -H 'Accept: application/json' https://example.com");
/// assert_eq!(argv, vec!["curl", "-H", "Accept: application/json", "https://example.com"]);
/// ```
pub fn split_command(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_single_quotes = false;
    let mut in_double_quotes = false;

    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' && !in_single_quotes {
            if let Some(escaped) = chars.next() {
                current.push(escaped);
                in_token = true;
            }
            continue;
        }

        if ch == '\'' && !in_double_quotes {
            in_single_quotes = !in_single_quotes;
            in_token = true;
            continue;
        }

        if ch == '"' && !in_single_quotes {
            in_double_quotes = !in_double_quotes;
            in_token = true;
            continue;
        }

        if ch.is_whitespace() && !in_single_quotes && !in_double_quotes {
            if in_token {
                tokens.push(std::mem::take(&mut current));
                in_token = false;
            }
            continue;
        }

        current.push(ch);
        in_token = true;
    }

    if in_token {
        tokens.push(current);
    }

    tokens
}
