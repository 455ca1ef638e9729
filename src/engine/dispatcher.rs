//! Round-robin hand-off of accepted sockets to workers
//!
//! Each worker owns the receiving end of one unbounded channel. The
//! acceptor picks the next worker with an atomic counter and sends; the
//! worker wakes up, drains its channel and adopts the sockets.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

/// Distributes items across workers in arrival order
#[derive(Debug)]
pub struct Dispatcher<T> {
    workers: Vec<UnboundedSender<T>>,
    /// Next position in the rotation
    next: AtomicUsize,
}

impl<T> Dispatcher<T> {
    #[must_use]
    pub fn new(workers: Vec<UnboundedSender<T>>) -> Self {
        Self {
            workers,
            next: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Send `item` to the next worker
    ///
    /// Returns the worker index, or the item back if there are no workers
    /// or the chosen worker has exited.
    pub fn dispatch(&self, item: T) -> Result<usize, T> {
        if self.workers.is_empty() {
            return Err(item);
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        trace!("Round-robin selected worker {}", index);
        self.workers[index]
            .send(item)
            .map(|()| index)
            .map_err(|e| e.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_round_robin_order() {
        let (tx0, mut rx0) = unbounded_channel();
        let (tx1, mut rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        let dispatcher = Dispatcher::new(vec![tx0, tx1, tx2]);

        let picks: Vec<usize> = (0..6).map(|i| dispatcher.dispatch(i).unwrap()).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);

        assert_eq!(rx0.try_recv().unwrap(), 0);
        assert_eq!(rx0.try_recv().unwrap(), 3);
        assert_eq!(rx1.try_recv().unwrap(), 1);
        assert_eq!(rx1.try_recv().unwrap(), 4);
        assert_eq!(rx2.try_recv().unwrap(), 2);
        assert_eq!(rx2.try_recv().unwrap(), 5);
    }

    #[test]
    fn test_no_workers() {
        let dispatcher: Dispatcher<u8> = Dispatcher::new(Vec::new());
        assert!(dispatcher.is_empty());
        assert_eq!(dispatcher.dispatch(7), Err(7));
    }

    #[test]
    fn test_closed_worker_returns_item() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let dispatcher = Dispatcher::new(vec![tx]);
        assert_eq!(dispatcher.dispatch("sock"), Err("sock"));
    }
}
