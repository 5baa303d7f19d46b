//! Deferred value resolution

use crate::core::{Handler, Record, Result, Value, ERROR_KEY};

const BAD_LAZY_MESSAGE: &str = "bad lazy";

/// Resolve every [`Lazy`](crate::Lazy) value before delegating
///
/// A value that fails to resolve is replaced by the failure text and a single
/// `error="bad lazy"` pair is appended, however many values failed. Records
/// without lazy values are passed through untouched.
pub struct LazyHandler<H> {
    inner: H,
}

impl<H: Handler> LazyHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

fn has_lazy(record: &Record) -> bool {
    record.pairs().any(|(_, v)| matches!(v, Value::Lazy(_)))
}

impl<H: Handler> Handler for LazyHandler<H> {
    fn log(&self, record: &Record) -> Result<()> {
        if !has_lazy(record) {
            return self.inner.log(record);
        }

        let mut resolved = record.clone();
        let mut failed = false;
        for value in resolved.kv.iter_mut().skip(1).step_by(2) {
            let outcome = match value {
                Value::Lazy(lazy) => lazy.resolve(),
                _ => continue,
            };
            *value = outcome.unwrap_or_else(|e| {
                failed = true;
                Value::Str(e.to_string())
            });
        }
        if failed {
            resolved.push(ERROR_KEY, BAD_LAZY_MESSAGE);
        }

        self.inner.log(&resolved)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FuncHandler, Level, Lazy};
    use crate::kv;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn capturing() -> (impl Handler, Arc<Mutex<Option<Record>>>) {
        let slot = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        let handler = FuncHandler::new(move |r: &Record| {
            *sink.lock() = Some(r.clone());
            Ok(())
        });
        (handler, slot)
    }

    #[test]
    fn test_resolves_in_place() {
        let (inner, slot) = capturing();
        let handler = LazyHandler::new(inner);
        let record = Record::new(Level::Info, "x", kv!["answer", Lazy::new(|| 42), "b", 1]);
        handler.log(&record).unwrap();

        let seen = slot.lock().take().unwrap();
        assert_eq!(seen.kv, kv!["answer", 42, "b", 1]);
    }

    #[test]
    fn test_failure_appends_single_marker() {
        let (inner, slot) = capturing();
        let handler = LazyHandler::new(inner);
        let record = Record::new(
            Level::Info,
            "x",
            kv![
                "a",
                Lazy::fallible(|| Err::<i32, _>("no db")),
                "b",
                Lazy::new(|| Lazy::new(|| 1)),
            ],
        );
        handler.log(&record).unwrap();

        let seen = slot.lock().take().unwrap();
        assert_eq!(seen.kv.len(), 6);
        assert_eq!(seen.get("a"), Some(&Value::from("no db")));
        assert_eq!(
            seen.get("b"),
            Some(&Value::from("lazy value resolved to another lazy value"))
        );
        assert_eq!(seen.get(ERROR_KEY), Some(&Value::from("bad lazy")));
    }

    #[test]
    fn test_lazy_keys_are_left_alone() {
        let (inner, slot) = capturing();
        let handler = LazyHandler::new(inner);
        let record = Record::new(Level::Info, "x", kv![Lazy::new(|| "k"), 1]);
        handler.log(&record).unwrap();

        let seen = slot.lock().take().unwrap();
        assert!(matches!(seen.kv[0], Value::Lazy(_)));
        assert_eq!(seen.kv.len(), 2);
    }
}
