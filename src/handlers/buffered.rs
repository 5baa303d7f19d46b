//! Buffered handler with a background worker
//!
//! Records are queued on a bounded channel and handed to the wrapped handler
//! by a single worker thread, one at a time and in enqueue order. `log`
//! blocks only while the queue is full; a capacity of zero is a rendezvous
//! hand-off with the worker.
//!
//! Shutdown drains: dropping the handler (or calling [`BufferedHandler::close`])
//! closes the queue and waits for the worker to deliver everything already
//! queued, bounded by a timeout.

use crate::core::{Handler, LoggerError, Record, Result, DEFAULT_SHUTDOWN_TIMEOUT};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

enum Message {
    Record(Record),
    Flush(Sender<Result<()>>),
}

pub struct BufferedHandler {
    sender: RwLock<Option<Sender<Message>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl BufferedHandler {
    pub fn new<H: Handler + 'static>(capacity: usize, inner: H) -> Self {
        let (sender, receiver) = bounded(capacity);
        let worker = thread::spawn(move || Self::run(receiver, inner));

        Self {
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    fn run<H: Handler>(receiver: Receiver<Message>, inner: H) {
        for message in receiver.iter() {
            match message {
                Message::Record(record) => {
                    if let Err(e) = inner.log(&record) {
                        eprintln!("[LOGGER ERROR] buffered handler failed: {}", e);
                    }
                }
                Message::Flush(ack) => {
                    let _ = ack.send(inner.flush());
                }
            }
        }

        // channel closed, everything queued has been delivered
        if let Err(e) = inner.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }

    fn send(&self, message: Message) -> Result<()> {
        let sender = self.sender.read();
        match sender.as_ref() {
            Some(sender) => sender.send(message).map_err(|_| LoggerError::HandlerClosed),
            None => Err(LoggerError::HandlerClosed),
        }
    }

    /// Close the queue and wait up to `timeout` for queued records to drain.
    ///
    /// Returns `true` if the worker finished within the timeout. Records
    /// logged after closing are rejected with [`LoggerError::HandlerClosed`].
    pub fn close(&self, timeout: Duration) -> bool {
        drop(self.sender.write().take());

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Buffered worker panicked during shutdown: {:?}", e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Buffered worker did not finish within {:?} timeout. \
                     Some records may be lost.",
                    timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }
}

impl Handler for BufferedHandler {
    fn log(&self, record: &Record) -> Result<()> {
        self.send(Message::Record(record.clone()))
    }

    /// Wait until everything queued so far has reached the wrapped handler,
    /// then flush it.
    fn flush(&self) -> Result<()> {
        let (ack, done) = bounded(1);
        self.send(Message::Flush(ack))?;
        match done.recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT) {
            Ok(result) => result,
            Err(_) => Err(LoggerError::other("timed out waiting for buffered handler flush")),
        }
    }
}

impl Drop for BufferedHandler {
    fn drop(&mut self) {
        self.close(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FuncHandler, Level};
    use crate::kv;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn collecting() -> (impl Handler, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = FuncHandler::new(move |r: &Record| {
            sink.lock().push(r.msg.clone());
            Ok(())
        });
        (handler, seen)
    }

    #[test]
    fn test_delivers_in_order() {
        let (inner, seen) = collecting();
        let handler = BufferedHandler::new(10, inner);
        for i in 0..100 {
            handler.log(&Record::new(Level::Info, format!("m{}", i), kv![])).unwrap();
        }
        handler.flush().unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 100);
        assert_eq!(seen[0], "m0");
        assert_eq!(seen[99], "m99");
    }

    #[test]
    fn test_rendezvous_capacity() {
        let (inner, seen) = collecting();
        let handler = BufferedHandler::new(0, inner);
        handler.log(&Record::new(Level::Info, "handoff", kv![])).unwrap();
        assert!(handler.close(DEFAULT_SHUTDOWN_TIMEOUT));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_drop_drains_queue() {
        let (inner, seen) = collecting();
        {
            let handler = BufferedHandler::new(1000, inner);
            for i in 0..500 {
                handler.log(&Record::new(Level::Debug, format!("{}", i), kv![])).unwrap();
            }
        }
        assert_eq!(seen.lock().len(), 500);
    }

    #[test]
    fn test_log_after_close_is_rejected() {
        let (inner, _seen) = collecting();
        let handler = BufferedHandler::new(1, inner);
        assert!(handler.close(DEFAULT_SHUTDOWN_TIMEOUT));
        assert!(handler.is_closed());
        let err = handler.log(&Record::new(Level::Info, "late", kv![])).unwrap_err();
        assert!(matches!(err, LoggerError::HandlerClosed));
    }

    #[test]
    fn test_worker_never_runs_concurrently() {
        let busy = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let (b, o) = (Arc::clone(&busy), Arc::clone(&overlaps));
        let inner = FuncHandler::new(move |_r: &Record| {
            if b.swap(true, Ordering::SeqCst) {
                o.fetch_add(1, Ordering::SeqCst);
            }
            thread::yield_now();
            b.store(false, Ordering::SeqCst);
            Ok(())
        });

        let handler = Arc::new(BufferedHandler::new(16, inner));
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    for _ in 0..250 {
                        handler.log(&Record::new(Level::Info, "p", kv![])).unwrap();
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }
        handler.flush().unwrap();
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_inner_errors_do_not_stop_worker() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let inner = FuncHandler::new(move |r: &Record| {
            c.fetch_add(1, Ordering::SeqCst);
            if r.msg == "bad" {
                Err(LoggerError::writer("rejected"))
            } else {
                Ok(())
            }
        });
        let handler = BufferedHandler::new(4, inner);
        handler.log(&Record::new(Level::Info, "bad", kv![])).unwrap();
        handler.log(&Record::new(Level::Info, "good", kv![])).unwrap();
        handler.flush().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
