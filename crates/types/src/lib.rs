use std::{error::Error, fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// HTTP method for a request.
///
/// `GET` is the default and is the one method the command builder never
/// renders explicitly (`-X` is only emitted for non-default methods).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
}

impl Method {
    /// Canonical uppercase name as curl expects it after `-X`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "CONNECT" => Ok(Self::Connect),
            _ => Err(ParseMethodError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseMethodError;

impl fmt::Display for ParseMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid HTTP method; expected one of GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS, TRACE, CONNECT")
    }
}

impl Error for ParseMethodError {}

fn default_enabled() -> bool {
    true
}

/// A single key/value row as used for headers, query parameters and
/// form-data fields.
///
/// Rows keep their position in the owning list; that order is significant in
/// the rendered command. Disabled rows persist in the model but contribute
/// nothing to rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueEntry {
    pub key: String,
    pub value: String,
    /// Whether this row participates in rendering.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl KeyValueEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }
}

/// An arbitrary curl flag attached to a request (e.g. `-L`, `--max-time 5`).
///
/// The flag token is passed through verbatim; only the value side is subject
/// to environment substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurlFlag {
    pub flag: String,
    /// Optional value emitted as the token following the flag.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl CurlFlag {
    pub fn new(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: None,
            enabled: true,
        }
    }

    pub fn with_value(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(flag)
        }
    }
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestBody {
    /// No body is sent.
    #[default]
    None,
    /// Raw text payload, rendered via `-d`. Skipped entirely when it trims
    /// to the empty string.
    Raw(String),
    /// Multipart form fields, one `-F key=value` per enabled row.
    FormData(Vec<KeyValueEntry>),
    /// File upload, rendered via `--data-binary @path`.
    Binary(PathBuf),
}

/// The structured, mutable description of one HTTP request.
///
/// This is the unit the command builder consumes. List order is preserved
/// and meaningful: entries render first-defined-first-emitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Request {
    pub url: String,
    /// `None` means the default (GET).
    #[serde(default)]
    pub method: Option<Method>,
    #[serde(default)]
    pub headers: Vec<KeyValueEntry>,
    #[serde(default)]
    pub query_params: Vec<KeyValueEntry>,
    #[serde(default)]
    pub body: RequestBody,
    /// Extra curl flags, rendered ahead of everything but the binary name.
    #[serde(default)]
    pub flags: Vec<CurlFlag>,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Effective method after applying the GET default.
    pub fn method_or_default(&self) -> Method {
        self.method.unwrap_or_default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(KeyValueEntry::new(key, value));
        self
    }

    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push(KeyValueEntry::new(key, value));
        self
    }

    pub fn with_flag(mut self, flag: CurlFlag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// One substitution variable inside an [`Environment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub key: String,
    pub value: String,
    /// Secret values are masked in UIs; substitution treats them like any
    /// other variable.
    #[serde(default)]
    pub secret: bool,
}

impl EnvVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            secret: false,
        }
    }
}

/// A named set of key/value substitution variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub variables: Vec<EnvVariable>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            variables: Vec::new(),
        }
    }
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
        }
    }

    /// Looks up a variable by key. The first definition wins when the list
    /// carries duplicates.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|variable| variable.key == key)
            .map(|variable| variable.value.as_str())
    }

    /// Updates an existing variable in place or appends a new one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.variables.iter_mut().find(|variable| variable.key == key) {
            Some(variable) => variable.value = value,
            None => self.variables.push(EnvVariable::new(key, value)),
        }
    }
}

/// Immutable snapshot of one completed execution.
///
/// Produced exactly once per job; process-level failure (non-zero exit,
/// signal) is data here, never an error of the job API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The exact rendered command string that was executed.
    pub command: String,
    /// Exit code on normal termination; `None` when the process was killed
    /// or stopped by a signal.
    pub exit_code: Option<u8>,
    pub stdout: String,
    pub stderr: String,
    /// Wall-clock time from spawn to observed termination.
    pub duration: Duration,
    /// Human-readable diagnosis for anything other than a clean exit 0.
    pub error_message: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
