//! Connection parameters for the GridFS provider.
//!
//! Parameters can be built in code, parsed from loosely typed JSON, or read
//! from environment variables under a caller-chosen prefix. All three paths
//! end in the same validation step, so a value that reaches [`crate::make_uri`]
//! always has a non-empty database and fully typed credentials.
//!
//! ```rust
//! use dog_gridfs::ConnectionParameters;
//!
//! let params = ConnectionParameters::new("files")
//!     .with_server("db1:27017")
//!     .with_auth("alice", "secret")
//!     .with_option("replicaSet", "rs0");
//!
//! assert!(params.ensure_valid().is_ok());
//! ```

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::{StorageError, StorageResult};

/// Credentials embedded into the connection URI.
///
/// Both fields default to the empty string, so an absent `auth` object and an
/// empty one are the same value.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub user: String,
    pub password: String,
}

impl Auth {
    pub fn new<U: Into<String>, P: Into<String>>(user: U, password: P) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

/// Driver options: `auth` plus an open map of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct ConnectionOptions {
    #[serde(default)]
    pub auth: Auth,

    /// Every other key, appended to the URI query string.
    #[serde(flatten)]
    #[validate(custom(function = "scalar_query_values"))]
    pub query: IndexMap<String, Value>,
}

impl ConnectionOptions {
    /// Query pairs in insertion order, with the `auth` key excluded.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.query
            .iter()
            .filter(|(key, _)| key.as_str() != "auth")
            .filter_map(|(key, value)| render_scalar(value).map(|v| (key.as_str(), v)))
    }
}

/// Structured input for the connection URI.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct ConnectionParameters {
    #[validate(length(min = 1, message = "database must not be empty"))]
    pub database: String,

    #[serde(default)]
    pub servers: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub options: ConnectionOptions,
}

impl ConnectionParameters {
    /// Start from a database name with no servers, no credentials and no options
    pub fn new<S: Into<String>>(database: S) -> Self {
        Self {
            database: database.into(),
            servers: Vec::new(),
            options: ConnectionOptions::default(),
        }
    }

    /// Append one `host:port` entry
    pub fn with_server<S: Into<String>>(mut self, server: S) -> Self {
        self.servers.push(server.into());
        self
    }

    /// Append several `host:port` entries, keeping their order
    pub fn with_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servers.extend(servers.into_iter().map(Into::into));
        self
    }

    /// Set the credentials
    pub fn with_auth<U: Into<String>, P: Into<String>>(mut self, user: U, password: P) -> Self {
        self.options.auth = Auth::new(user, password);
        self
    }

    /// Add a query option (e.g. `replicaSet`, `authSource`)
    pub fn with_option<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.options.query.insert(key.into(), value.into());
        self
    }

    /// Parse loosely typed input, then validate it.
    pub fn from_value(value: Value) -> StorageResult<Self> {
        let params: Self =
            serde_json::from_value(value).map_err(|e| StorageError::validation(e.to_string()))?;
        params.ensure_valid()?;
        Ok(params)
    }

    /// Read parameters from the process environment.
    ///
    /// With prefix `APP` the recognised variables are `APP__DATABASE`,
    /// `APP__SERVERS` (comma separated), `APP__AUTH__USER`,
    /// `APP__AUTH__PASSWORD` and `APP__OPTIONS__<name>`.
    pub fn from_env(prefix: &str) -> StorageResult<Self> {
        Self::from_vars(prefix, std::env::vars())
    }

    /// Same as [`ConnectionParameters::from_env`] over an explicit variable list.
    pub fn from_vars<I>(prefix: &str, vars: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut database = None;
        let mut servers = Vec::new();
        let mut options = ConnectionOptions::default();

        for (key, value) in vars {
            let Some(name) = key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix("__"))
            else {
                continue;
            };

            match name {
                "DATABASE" => database = Some(value),
                "SERVERS" => {
                    servers = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "AUTH__USER" => options.auth.user = value,
                "AUTH__PASSWORD" => options.auth.password = value,
                other => {
                    if let Some(option) = other.strip_prefix("OPTIONS__") {
                        options.query.insert(option.to_string(), Value::String(value));
                    }
                }
            }
        }

        let database = database
            .ok_or_else(|| StorageError::validation(format!("{prefix}__DATABASE is required")))?;

        let params = Self {
            database,
            servers,
            options,
        };
        params.ensure_valid()?;
        Ok(params)
    }

    /// Check the validation rules, reporting every violated field.
    pub fn ensure_valid(&self) -> StorageResult<()> {
        Validate::validate(self).map_err(|errs| {
            let mut messages = Vec::new();
            push_validation_errors(&mut messages, "", &errs);
            StorageError::validation(messages.join("; "))
        })
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn scalar_query_values(query: &IndexMap<String, Value>) -> Result<(), validator::ValidationError> {
    for (key, value) in query {
        if key != "auth" && render_scalar(value).is_none() {
            return Err(validator::ValidationError::new("scalar").with_message(Cow::Owned(
                format!("option '{key}' must be a string, number or boolean"),
            )));
        }
    }
    Ok(())
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn push_validation_errors(out: &mut Vec<String>, prefix: &str, errs: &validator::ValidationErrors) {
    for (field, kind) in errs.errors() {
        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    out.push(format!("{key}: {msg}"));
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errs) => {
                let next = join_path(prefix, field);
                push_validation_errors(out, &next, struct_errs.as_ref());
            }
            validator::ValidationErrorsKind::List(list_errs) => {
                let base = join_path(prefix, field);
                for (idx, nested) in list_errs {
                    let next = format!("{base}[{idx}]");
                    push_validation_errors(out, &next, nested.as_ref());
                }
            }
        }
    }
}
