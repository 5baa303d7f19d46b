//! Handler trait for record sinks
//!
//! Every sink and every decorator implements the same single capability;
//! behaviors are composed by wrapping one handler in another.

use super::{error::Result, record::Record};
use arc_swap::ArcSwap;
use std::sync::Arc;

pub trait Handler: Send + Sync {
    fn log(&self, record: &Record) -> Result<()>;

    /// Push buffered output to its destination.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Shared handler reference, the unit of composition
pub type HandlerRef = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn log(&self, record: &Record) -> Result<()> {
        (**self).log(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn log(&self, record: &Record) -> Result<()> {
        (**self).log(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Handler backed by a closure
pub struct FuncHandler<F> {
    f: F,
}

impl<F> FuncHandler<F>
where
    F: Fn(&Record) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Handler for FuncHandler<F>
where
    F: Fn(&Record) -> Result<()> + Send + Sync,
{
    fn log(&self, record: &Record) -> Result<()> {
        (self.f)(record)
    }
}

/// Accepts every record and does nothing with it
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardHandler;

impl Handler for DiscardHandler {
    fn log(&self, _record: &Record) -> Result<()> {
        Ok(())
    }
}

/// Atomically replaceable handler slot
///
/// Loggers log through a `SwapHandler`, so the active handler can be changed
/// while other threads are logging. A reference obtained with `get` stays
/// valid after a swap.
pub struct SwapHandler {
    current: ArcSwap<HandlerRef>,
}

impl SwapHandler {
    pub fn new(handler: HandlerRef) -> Self {
        Self {
            current: ArcSwap::from_pointee(handler),
        }
    }

    /// Install `handler`, returning the one it replaced.
    pub fn swap(&self, handler: HandlerRef) -> HandlerRef {
        let previous = self.current.swap(Arc::new(handler));
        HandlerRef::clone(&previous)
    }

    pub fn get(&self) -> HandlerRef {
        HandlerRef::clone(&self.current.load())
    }
}

impl Default for SwapHandler {
    fn default() -> Self {
        Self::new(Arc::new(DiscardHandler))
    }
}

impl Handler for SwapHandler {
    fn log(&self, record: &Record) -> Result<()> {
        self.current.load().log(record)
    }

    fn flush(&self) -> Result<()> {
        self.current.load().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, LoggerError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (HandlerRef, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let handler: HandlerRef = Arc::new(FuncHandler::new(move |_r: &Record| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        (handler, count)
    }

    #[test]
    fn test_func_handler_propagates_error() {
        let handler = FuncHandler::new(|_r: &Record| Err(LoggerError::writer("full")));
        let record = Record::new(Level::Info, "x", Vec::new());
        assert!(handler.log(&record).is_err());
    }

    #[test]
    fn test_swap_replaces_active_handler() {
        let (first, first_count) = counting();
        let (second, second_count) = counting();
        let swap = SwapHandler::new(first);
        let record = Record::new(Level::Info, "x", Vec::new());

        swap.log(&record).unwrap();
        let previous = swap.swap(second);
        swap.log(&record).unwrap();

        // the replaced handler is still usable on its own
        previous.log(&record).unwrap();

        assert_eq!(first_count.load(Ordering::SeqCst), 2);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_swap_and_log() {
        let (a, a_count) = counting();
        let (b, b_count) = counting();
        let swap = Arc::new(SwapHandler::new(a.clone()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let swap = Arc::clone(&swap);
                let (a, b) = (a.clone(), b.clone());
                std::thread::spawn(move || {
                    let record = Record::new(Level::Info, "x", Vec::new());
                    for j in 0..1000 {
                        if i == 0 && j % 10 == 0 {
                            swap.swap(if j % 20 == 0 { b.clone() } else { a.clone() });
                        }
                        swap.log(&record).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let total = a_count.load(Ordering::SeqCst) + b_count.load(Ordering::SeqCst);
        assert_eq!(total, 4000);
    }
}
