use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Append-only list of status lines written by the workers and
/// re-rendered by the round. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MessageLog {
    pub fn new() -> MessageLog {
        MessageLog::default()
    }

    pub fn push(&self, message: impl Into<String>) {
        self.lock().push(message.into());
    }

    /// Copy of everything pushed so far, in push order. The log is left intact.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // a writer that panicked mid-push cannot leave a half-written String behind
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn snapshot_keeps_push_order_and_contents() {
        let log = MessageLog::new();
        log.push("first");
        log.push(String::from("second"));
        assert_eq!(log.snapshot(), vec!["first", "second"]);
        assert_eq!(log.snapshot().len(), 2);
        assert!(!log.is_empty());
    }

    #[test]
    fn concurrent_writers_never_lose_or_duplicate() {
        const WRITERS: usize = 8;
        const PER_WRITER: usize = 500;

        let log = MessageLog::new();
        let handles: Vec<_> = (0..WRITERS)
            .map(|writer| {
                let log = log.clone();
                thread::spawn(move || {
                    for i in 0..PER_WRITER {
                        log.push(format!("{writer}:{i}"));
                    }
                })
            })
            .collect();

        // snapshots taken while writers run must always be well formed
        for _ in 0..50 {
            for message in log.snapshot() {
                assert!(message.contains(':'));
            }
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut messages = log.snapshot();
        assert_eq!(messages.len(), WRITERS * PER_WRITER);
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), WRITERS * PER_WRITER);
    }
}
