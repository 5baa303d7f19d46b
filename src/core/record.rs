//! Record structure and key/value normalization

use super::caller::Caller;
use super::level::Level;
use super::value::Value;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Key used for inline error markers.
pub const ERROR_KEY: &str = "error";

const ODD_ARGUMENTS_MESSAGE: &str = "Normalized odd number of arguments by adding nil";

/// Literal key names used when rendering the built-in record fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyNames {
    pub time: String,
    pub level: String,
    pub msg: String,
    pub caller: String,
    pub request_id: String,
}

impl Default for KeyNames {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            level: "level".to_string(),
            msg: "msg".to_string(),
            caller: "location".to_string(),
            request_id: "request_id".to_string(),
        }
    }
}

/// Ambient request data threaded through the `*_ctx` emit variants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    request_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// The correlation id, if one is set and non-empty.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A single log event, what a logger hands to its handler
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<Local>,
    pub level: Level,
    pub msg: String,
    /// Flattened key/value pairs, logger context first
    pub kv: Vec<Value>,
    pub ctx: Option<RequestContext>,
    pub call: Caller,
    /// Overrides `call` when rendering the caller field
    pub custom_caller: Option<String>,
    pub key_names: KeyNames,
}

impl Record {
    #[track_caller]
    pub fn new(level: Level, msg: impl Into<String>, kv: Vec<Value>) -> Self {
        Self {
            time: Local::now(),
            level,
            msg: msg.into(),
            kv: normalize(kv),
            ctx: None,
            call: Caller::capture(),
            custom_caller: None,
            key_names: KeyNames::default(),
        }
    }

    pub fn with_time(mut self, time: DateTime<Local>) -> Self {
        self.time = time;
        self
    }

    pub fn with_context(mut self, ctx: RequestContext) -> Self {
        self.ctx = Some(ctx);
        self
    }

    pub fn with_key_names(mut self, key_names: KeyNames) -> Self {
        self.key_names = key_names;
        self
    }

    /// Append one key/value pair.
    pub fn push(&mut self, key: impl Into<Value>, value: impl Into<Value>) {
        self.kv.push(key.into());
        self.kv.push(value.into());
    }

    /// Iterate over `(key, value)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.kv.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Value of the first pair whose key is `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.pairs()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Caller field as rendered by the formatters.
    pub fn caller_string(&self) -> String {
        match &self.custom_caller {
            Some(custom) => custom.clone(),
            None => self.call.to_string(),
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.ctx.as_ref().and_then(RequestContext::request_id)
    }
}

/// Make a call-site argument list a well-formed key/value sequence.
///
/// A single string-keyed map is expanded into pairs (in map iteration order).
/// An odd-length list is completed with `nil` followed by an error marker
/// pair, so the problem shows up in the log line itself.
pub fn normalize(mut kv: Vec<Value>) -> Vec<Value> {
    if kv.len() == 1 && matches!(kv[0], Value::Map(_)) {
        if let Some(Value::Map(entries)) = kv.pop() {
            kv = entries
                .into_iter()
                .flat_map(|(k, v)| [Value::Str(k), v])
                .collect();
        }
    }

    if kv.len() % 2 != 0 {
        kv.push(Value::Nil);
        kv.push(Value::from(ERROR_KEY));
        kv.push(Value::from(ODD_ARGUMENTS_MESSAGE));
    }

    kv
}

/// `prefix ++ normalize(suffix)` as a fresh vector.
pub fn merge_fields(prefix: &[Value], suffix: Vec<Value>) -> Vec<Value> {
    let suffix = normalize(suffix);
    let mut merged = Vec::with_capacity(prefix.len() + suffix.len());
    merged.extend_from_slice(prefix);
    merged.extend(suffix);
    merged
}
