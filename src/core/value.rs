//! Values carried in a record's key/value sequence
//!
//! This module provides:
//! - `Value`: the tagged value type for keys and values
//! - `Lazy` / `Resolve`: values computed only when a handler asks for them

use super::error::{LoggerError, Result};
use super::level::Level;
use chrono::{DateTime, Local, Utc};
use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Value type for key/value pairs
///
/// Keys are values too: a well-formed key is a `Value::Str`, anything else is
/// rendered as an inline error marker by the formatters.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Time(DateTime<Local>),
    Error(Arc<dyn StdError + Send + Sync>),
    Display(Arc<dyn fmt::Display + Send + Sync>),
    Debug(Arc<dyn fmt::Debug + Send + Sync>),
    /// String-keyed map; expanded into pairs when passed as the only argument
    Map(Vec<(String, Value)>),
    Lazy(Lazy),
}

impl Value {
    /// Wrap an error; rendered as its message.
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Value::Error(Arc::new(err))
    }

    /// Wrap anything that can describe itself as a string.
    pub fn display<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Value::Display(Arc::new(value))
    }

    /// Wrap an arbitrary structure; rendered through its `Debug` output.
    pub fn debug<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Value::Debug(Arc::new(value))
    }

    pub fn lazy<F, V>(f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Value::Lazy(Lazy::new(f))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Shared coercion applied before any format-specific rendering.
    ///
    /// Errors become their message, displayable values their description and
    /// lazy values are resolved (a failed resolution yields the failure text).
    /// Every other variant is returned unchanged.
    pub fn coerce(&self) -> Value {
        match self {
            Value::Error(err) => Value::Str(err.to_string()),
            Value::Display(d) => Value::Str(d.to_string()),
            Value::Lazy(lazy) => match lazy.resolve() {
                Ok(v) => v.coerce(),
                Err(e) => Value::Str(e.to_string()),
            },
            other => other.clone(),
        }
    }

    /// Structural text used for non-scalar values and error descriptions.
    pub fn describe(&self) -> String {
        match self.coerce() {
            Value::Nil => "nil".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Uint(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s,
            Value::Time(t) => t.to_rfc3339(),
            Value::Debug(d) => format!("{:?}", d),
            Value::Map(entries) => {
                let inner = entries
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k, v.describe()))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("map[{}]", inner)
            }
            // coerce never returns these
            Value::Error(_) | Value::Display(_) | Value::Lazy(_) => String::new(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Uint(u) => write!(f, "Uint({})", u),
            Value::Float(fl) => write!(f, "Float({})", fl),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Time(t) => write!(f, "Time({})", t.to_rfc3339()),
            Value::Error(e) => write!(f, "Error({})", e),
            Value::Display(d) => write!(f, "Display({})", d),
            Value::Debug(d) => write!(f, "Debug({:?})", d),
            Value::Map(m) => f.debug_map().entries(m.iter().map(|(k, v)| (k, v))).finish(),
            Value::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Uint(a), Uint(b)) => a == b,
            (Int(a), Uint(b)) | (Uint(b), Int(a)) => u64::try_from(*a).is_ok_and(|a| a == *b),
            (Float(a), Float(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Lazy(_), _) | (_, Lazy(_)) => false,
            (Error(_) | Display(_) | Debug(_), _) | (_, Error(_) | Display(_) | Debug(_)) => {
                self.describe() == other.describe()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Uint(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<DateTime<Local>> for Value {
    fn from(v: DateTime<Local>) -> Self {
        Value::Time(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v.with_timezone(&Local))
    }
}

impl From<Level> for Value {
    fn from(v: Level) -> Self {
        Value::Str(v.as_str().to_string())
    }
}

impl From<Lazy> for Value {
    fn from(v: Lazy) -> Self {
        Value::Lazy(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Nil,
        }
    }
}

impl<V: Into<Value>> From<HashMap<String, V>> for Value {
    fn from(map: HashMap<String, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Something that produces a value on demand
pub trait Resolve: Send + Sync {
    fn resolve(&self) -> Result<Value>;
}

struct InfallibleFn<F>(F);

impl<F, V> Resolve for InfallibleFn<F>
where
    F: Fn() -> V + Send + Sync,
    V: Into<Value>,
{
    fn resolve(&self) -> Result<Value> {
        Ok((self.0)().into())
    }
}

struct FallibleFn<F>(F);

impl<F, V, E> Resolve for FallibleFn<F>
where
    F: Fn() -> std::result::Result<V, E> + Send + Sync,
    V: Into<Value>,
    E: fmt::Display,
{
    fn resolve(&self) -> Result<Value> {
        (self.0)()
            .map(Into::into)
            .map_err(|e| LoggerError::lazy(e.to_string()))
    }
}

/// A deferred value, evaluated by the handler chain rather than the caller
///
/// # Example
///
/// ```
/// use kvlog::{Lazy, Value};
///
/// let lazy = Lazy::new(|| 40 + 2);
/// assert_eq!(lazy.resolve().unwrap(), Value::Int(42));
/// ```
#[derive(Clone)]
pub struct Lazy {
    inner: Arc<dyn Resolve>,
}

impl Lazy {
    pub fn new<F, V>(f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            inner: Arc::new(InfallibleFn(f)),
        }
    }

    /// Closure whose error text ends up in the record.
    pub fn fallible<F, V, E>(f: F) -> Self
    where
        F: Fn() -> std::result::Result<V, E> + Send + Sync + 'static,
        V: Into<Value>,
        E: fmt::Display,
    {
        Self {
            inner: Arc::new(FallibleFn(f)),
        }
    }

    pub fn from_resolver(resolver: Arc<dyn Resolve>) -> Self {
        Self { inner: resolver }
    }

    /// Evaluate the deferred computation once.
    ///
    /// A computation that yields another lazy value is rejected.
    pub fn resolve(&self) -> Result<Value> {
        match self.inner.resolve()? {
            Value::Lazy(_) => Err(LoggerError::lazy(
                "lazy value resolved to another lazy value",
            )),
            v => Ok(v),
        }
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lazy(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[derive(Debug)]
    struct Point {
        #[allow(dead_code)]
        x: i32,
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(5i32), Value::Int(5));
        assert_eq!(Value::from(5u8), Value::Uint(5));
        assert_eq!(Value::from("a"), Value::Str("a".to_string()));
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Level::Warn), Value::Str("warn".to_string()));
    }

    #[test]
    fn test_int_uint_compare_numerically() {
        assert_eq!(Value::Int(3), Value::Uint(3));
        assert_ne!(Value::Int(-1), Value::Uint(u64::MAX));
    }

    #[test]
    fn test_coerce_error_and_display() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "bad fd");
        assert_eq!(Value::error(io).coerce(), Value::Str("bad fd".to_string()));
        assert_eq!(
            Value::display(std::net::Ipv4Addr::LOCALHOST).coerce(),
            Value::Str("127.0.0.1".to_string())
        );
        assert_eq!(Value::Nil.coerce(), Value::Nil);
    }

    #[test]
    fn test_debug_value_describes_structure() {
        let v = Value::debug(Point { x: 1 });
        assert_eq!(v.describe(), "Point { x: 1 }");
    }

    #[test]
    fn test_lazy_evaluates_each_time() {
        let counter = Arc::new(AtomicI64::new(1));
        let c = Arc::clone(&counter);
        let lazy = Lazy::new(move || c.load(Ordering::SeqCst));

        assert_eq!(lazy.resolve().unwrap(), Value::Int(1));
        counter.store(2, Ordering::SeqCst);
        assert_eq!(lazy.resolve().unwrap(), Value::Int(2));
    }

    #[test]
    fn test_lazy_failures() {
        let failing = Lazy::fallible(|| Err::<i32, _>("db unavailable"));
        assert_eq!(failing.resolve().unwrap_err().to_string(), "db unavailable");

        let nested = Lazy::new(|| Value::lazy(|| 1));
        assert!(nested.resolve().is_err());
        assert_eq!(
            Value::Lazy(nested).coerce(),
            Value::Str("lazy value resolved to another lazy value".to_string())
        );
    }

    #[test]
    fn test_map_from_hashmap() {
        let mut map = HashMap::new();
        map.insert("x".to_string(), 1);
        map.insert("y".to_string(), 2);
        match Value::from(map) {
            Value::Map(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected map, got {:?}", other),
        }
    }
}
