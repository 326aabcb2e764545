//! Environment variable substitution for request strings.
//!
//! Any user-editable string may carry `{{name}}` or `{{name:default}}`
//! tokens which are resolved against the active [`Environment`] at render
//! time.

use lazycurl_types::Environment;

/// Resolves every `{{name}}` / `{{name:default}}` token in `input` against
/// `env`.
///
/// Tokens are scanned left to right and resolved independently; replacement
/// values are copied through verbatim and never re-scanned. A token whose
/// name is unknown and which carries no default is left in place unchanged.
///
/// The part before the first `:` is the variable name; everything after it
/// (including further colons) is the literal default.
///
/// # Example
/// ```
/// use lazycurl_types::Environment;
/// use lazycurl_util::interpolation::substitute;
///
/// let mut env = Environment::default();
/// env.set("host", "api.example.com");
///
/// assert_eq!(substitute("https://{{host}}/v1", &env), "https://api.example.com/v1");
/// assert_eq!(substitute("{{port:8080}}", &env), "8080");
/// assert_eq!(substitute("{{missing}}", &env), "{{missing}}");
/// ```
pub fn substitute(input: &str, env: &Environment) -> String {
    let mut output = String::with_capacity(input.len());
    let mut remainder = input;

    while let Some(start) = remainder.find("{{") {
        let after_open = &remainder[start + 2..];
        let Some(end) = after_open.find("}}") else {
            // Unterminated token; the rest of the string is literal.
            break;
        };

        output.push_str(&remainder[..start]);
        let token = &after_open[..end];
        let (name, default) = match token.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (token, None),
        };

        match (env.get(name), default) {
            (Some(value), _) => output.push_str(value),
            (None, Some(default)) => output.push_str(default),
            (None, None) => {
                output.push_str("{{");
                output.push_str(token);
                output.push_str("}}");
            }
        }

        remainder = &after_open[end + 2..];
    }

    output.push_str(remainder);
    output
}
