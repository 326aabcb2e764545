//! Builds curl invocations from the request model.
//!
//! The builder produces structured argv (for the execution job) and a
//! single quoted string (for on-screen preview and copy-paste). Rendering is
//! pure and deterministic: the same request, environment and mode always
//! yield the same output, and nothing is spawned here.

use lazycurl_types::{Environment, Method, Request, RequestBody};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

use crate::interpolation::substitute;
use crate::quoting::quote_if_needed;
use crate::status::STATUS_WRITE_OUT;

/// The one executable this tool drives.
pub const CURL_BIN: &str = "curl";

/// Everything except unreserved characters (`A-Za-z0-9 - _ . ~`) gets
/// percent-encoded in query parameter values.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plain rendering for display.
    Preview,
    /// Adds `-i` and the status write-out marker unless the user already
    /// supplied them.
    Execution,
}

/// Renders `request` against `env` as structured argv.
///
/// The first element is always `curl`. Arguments are unquoted; use
/// [`render_command`] (or [`build`]) for the shell-string form.
///
/// Emission order: user flags, execution instrumentation, `-X` for
/// non-default methods, headers, body, then the URL with appended query
/// parameters as the final argument. Disabled rows never render.
pub fn build_args(request: &Request, env: &Environment, mode: Mode) -> Vec<String> {
    let mut args = vec![CURL_BIN.to_string()];
    let mut include_requested = false;
    let mut write_out_supplied = false;

    for option in request.flags.iter().filter(|option| option.enabled) {
        let flag = option.flag.as_str();

        if mode == Mode::Execution && is_write_out_flag(flag) {
            write_out_supplied = true;
            if has_inline_value(flag) {
                // Inline form (`-wFMT`, `--write-out=FMT`): extend the
                // embedded format rather than adding a second -w.
                args.push(format!("{flag}{STATUS_WRITE_OUT}"));
            } else {
                args.push(flag.to_string());
                let user_format = option.value.as_deref().map(|value| substitute(value, env)).unwrap_or_default();
                args.push(format!("{user_format}{STATUS_WRITE_OUT}"));
            }
            continue;
        }

        if mode == Mode::Execution && (flag == "-i" || flag == "--include") {
            include_requested = true;
        }

        args.push(flag.to_string());
        if let Some(value) = &option.value {
            args.push(substitute(value, env));
        }
    }

    if mode == Mode::Execution {
        if !include_requested {
            args.push("-i".to_string());
        }
        if !write_out_supplied {
            args.push("-w".to_string());
            args.push(STATUS_WRITE_OUT.to_string());
        }
    }

    if let Some(method) = request.method
        && method != Method::Get
    {
        args.push("-X".to_string());
        args.push(method.to_string());
    }

    for header in request.headers.iter().filter(|header| header.enabled) {
        args.push("-H".to_string());
        args.push(format!("{}: {}", header.key, substitute(&header.value, env)));
    }

    match &request.body {
        RequestBody::None => {}
        RequestBody::Raw(text) => {
            if !text.trim().is_empty() {
                args.push("-d".to_string());
                args.push(substitute(text, env));
            }
        }
        RequestBody::FormData(fields) => {
            for field in fields.iter().filter(|field| field.enabled) {
                args.push("-F".to_string());
                args.push(format!("{}={}", field.key, substitute(&field.value, env)));
            }
        }
        RequestBody::Binary(path) => {
            args.push("--data-binary".to_string());
            args.push(format!("@{}", path.display()));
        }
    }

    let mut url = substitute(&request.url, env);
    let query = render_query(request, env);
    if !query.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query);
    }
    args.push(url);

    debug!(mode = ?mode, arg_count = args.len(), "rendered curl invocation");
    args
}

/// Renders `request` as one quoted shell string.
pub fn build(request: &Request, env: &Environment, mode: Mode) -> String {
    render_command(&build_args(request, env, mode))
}

/// Joins argv into a shell string, quoting each argument that needs it.
pub fn render_command(args: &[String]) -> String {
    args.iter()
        .map(|arg| quote_if_needed(arg))
        .collect::<Vec<String>>()
        .join(" ")
}

/// Percent-encodes one query component; unreserved bytes pass through,
/// everything else becomes `%XX` with uppercase hex.
pub fn percent_encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT_ENCODE_SET).to_string()
}

fn render_query(request: &Request, env: &Environment) -> String {
    request
        .query_params
        .iter()
        .filter(|param| param.enabled)
        .map(|param| format!("{}={}", param.key, percent_encode_component(&substitute(&param.value, env))))
        .collect::<Vec<String>>()
        .join("&")
}

fn is_write_out_flag(flag: &str) -> bool {
    flag == "-w" || flag == "--write-out" || has_inline_value(flag)
}

fn has_inline_value(flag: &str) -> bool {
    (flag.starts_with("-w") && !flag.starts_with("--") && flag.len() > 2) || flag.starts_with("--write-out=")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazycurl_types::{CurlFlag, KeyValueEntry, Request, RequestBody};
    use std::path::PathBuf;

    fn env() -> Environment {
        Environment::default()
    }

    #[test]
    fn bare_get_previews_as_plain_curl() {
        let request = Request::new("https://example.com");
        assert_eq!(build(&request, &env(), Mode::Preview), "curl https://example.com");
    }

    #[test]
    fn non_default_method_adds_explicit_flag() {
        let request = Request::new("https://example.com").with_method(Method::Post);
        assert_eq!(build(&request, &env(), Mode::Preview), "curl -X POST https://example.com");
    }

    #[test]
    fn explicit_get_is_still_the_default() {
        let request = Request::new("https://example.com").with_method(Method::Get);
        assert_eq!(build(&request, &env(), Mode::Preview), "curl https://example.com");
    }

    #[test]
    fn headers_render_quoted() {
        let request = Request::new("https://example.com").with_header("Content-Type", "application/json");
        assert_eq!(
            build(&request, &env(), Mode::Preview),
            "curl -H 'Content-Type: application/json' https://example.com"
        );
    }

    #[test]
    fn url_tokens_resolve_against_defaults() {
        let request = Request::new("{{api_url:https://default.example.com}}/users");
        assert_eq!(
            build(&request, &env(), Mode::Preview),
            "curl https://default.example.com/users"
        );
    }

    #[test]
    fn query_parameters_are_percent_encoded() {
        let request = Request::new("https://example.com").with_query_param("q", "test query");
        assert_eq!(
            build(&request, &env(), Mode::Preview),
            "curl https://example.com?q=test%20query"
        );
    }

    #[test]
    fn execution_mode_injects_include_and_write_out() {
        let request = Request::new("https://example.com");
        assert_eq!(
            build(&request, &env(), Mode::Execution),
            "curl -i -w '\\n__LAZYCURL_HTTP_STATUS__%{http_code}\\n' https://example.com"
        );
    }

    #[test]
    fn user_write_out_gains_marker_instead_of_second_flag() {
        let request = Request::new("https://example.com").with_flag(CurlFlag::with_value("-w", "%{time_total}"));
        let args = build_args(&request, &env(), Mode::Execution);

        let write_out_count = args.iter().filter(|arg| arg.as_str() == "-w").count();
        assert_eq!(write_out_count, 1);
        assert_eq!(args[2], format!("%{{time_total}}{STATUS_WRITE_OUT}"));
    }

    #[test]
    fn inline_write_out_is_extended_in_place() {
        let request = Request::new("https://example.com").with_flag(CurlFlag::new("--write-out=%{time_total}"));
        let args = build_args(&request, &env(), Mode::Execution);

        assert_eq!(args[1], format!("--write-out=%{{time_total}}{STATUS_WRITE_OUT}"));
        assert!(!args.contains(&"-w".to_string()));
    }

    #[test]
    fn user_include_flag_is_not_duplicated() {
        let request = Request::new("https://example.com").with_flag(CurlFlag::new("-i"));
        let args = build_args(&request, &env(), Mode::Execution);

        assert_eq!(args.iter().filter(|arg| arg.as_str() == "-i").count(), 1);
    }

    #[test]
    fn disabled_rows_never_render() {
        let mut request = Request::new("https://example.com")
            .with_header("Accept", "application/json")
            .with_query_param("page", "2");
        request.headers.push(KeyValueEntry::disabled("X-Debug", "1"));
        request.query_params.push(KeyValueEntry::disabled("trace", "on"));
        request.flags.push(CurlFlag {
            enabled: false,
            ..CurlFlag::new("-L")
        });

        assert_eq!(
            build(&request, &env(), Mode::Preview),
            "curl -H 'Accept: application/json' https://example.com?page=2"
        );
    }

    #[test]
    fn query_appends_with_ampersand_when_url_has_one() {
        let request = Request::new("https://example.com/search?lang=en").with_query_param("q", "rust");
        assert_eq!(
            build(&request, &env(), Mode::Preview),
            "curl https://example.com/search?lang=en&q=rust"
        );
    }

    #[test]
    fn raw_body_is_skipped_when_blank() {
        let request = Request::new("https://example.com").with_body(RequestBody::Raw("  \n ".into()));
        assert_eq!(build(&request, &env(), Mode::Preview), "curl https://example.com");
    }

    #[test]
    fn raw_body_renders_with_data_flag() {
        let request = Request::new("https://example.com").with_body(RequestBody::Raw(r#"{"name":"demo"}"#.into()));
        assert_eq!(
            build(&request, &env(), Mode::Preview),
            r#"curl -d '{"name":"demo"}' https://example.com"#
        );
    }

    #[test]
    fn form_body_emits_one_flag_per_enabled_field() {
        let request = Request::new("https://example.com").with_body(RequestBody::FormData(vec![
            KeyValueEntry::new("name", "demo"),
            KeyValueEntry::disabled("debug", "1"),
            KeyValueEntry::new("file", "report"),
        ]));
        assert_eq!(
            build(&request, &env(), Mode::Preview),
            "curl -F name=demo -F file=report https://example.com"
        );
    }

    #[test]
    fn binary_body_uses_at_path() {
        let request = Request::new("https://example.com").with_body(RequestBody::Binary(PathBuf::from("/tmp/payload.bin")));
        assert_eq!(
            build(&request, &env(), Mode::Preview),
            "curl --data-binary @/tmp/payload.bin https://example.com"
        );
    }

    #[test]
    fn flag_values_are_substituted() {
        let mut environment = Environment::default();
        environment.set("timeout", "30");
        let request = Request::new("https://example.com").with_flag(CurlFlag::with_value("--max-time", "{{timeout}}"));
        assert_eq!(
            build(&request, &environment, Mode::Preview),
            "curl --max-time 30 https://example.com"
        );
    }

    #[test]
    fn header_values_are_substituted() {
        let mut environment = Environment::default();
        environment.set("token", "abc123");
        let request = Request::new("https://example.com").with_header("Authorization", "Bearer {{token}}");
        assert_eq!(
            build(&request, &environment, Mode::Preview),
            "curl -H 'Authorization: Bearer abc123' https://example.com"
        );
    }

    #[test]
    fn percent_encoding_leaves_unreserved_untouched() {
        assert_eq!(
            percent_encode_component("AZaz09-_.~"),
            "AZaz09-_.~"
        );
        assert_eq!(percent_encode_component("a b&c=d/é"), "a%20b%26c%3Dd%2F%C3%A9");
    }

    #[test]
    fn build_is_deterministic() {
        let mut environment = Environment::default();
        environment.set("host", "https://api.example.com");
        let request = Request::new("{{host}}/v1")
            .with_method(Method::Put)
            .with_header("Accept", "application/json")
            .with_query_param("limit", "10");

        let first = build(&request, &environment, Mode::Execution);
        let second = build(&request, &environment, Mode::Execution);
        assert_eq!(first, second);
    }

    #[test]
    fn argv_and_string_forms_agree() {
        let request = Request::new("https://example.com").with_header("Accept", "text/plain");
        let args = build_args(&request, &env(), Mode::Preview);
        assert_eq!(render_command(&args), build(&request, &env(), Mode::Preview));
        assert_eq!(args[0], "curl");
        assert_eq!(args.last().map(String::as_str), Some("https://example.com"));
    }
}
