use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use crossbeam::channel::{bounded, select, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use crate::memory::block::DataBlock;

/// Bounded block-recycling channel between one reader and one indexer.
///
/// The queue owns exactly `queue_size` blocks. Each one is either in the
/// empty pool, in the full pool, or held by the single thread that popped it
/// (`outstanding`). Blocks are never allocated or freed after construction.
///
/// A lane whose peer died is closed with [`close`](Self::close): blocked and
/// future pops return `None` so the surviving worker can exit.
#[derive(Debug)]
pub struct DualQueue {
    empty_tx: Sender<DataBlock>,
    empty_rx: Receiver<DataBlock>,
    full_tx: Sender<DataBlock>,
    full_rx: Receiver<DataBlock>,
    outstanding: AtomicUsize,
    closed: AtomicBool,
    // Dropped on close; disconnecting wakes every blocked pop
    close_tx: Mutex<Option<Sender<()>>>,
    close_rx: Receiver<()>,
    queue_size: usize,
    block_capacity: usize,
}

impl DualQueue {
    pub fn new(queue_size: usize, block_capacity: usize) -> Self {
        assert!(queue_size > 0, "queue_size must be > 0");

        // Each pool can hold every block, so pushes never block in practice
        let (empty_tx, empty_rx) = bounded(queue_size);
        let (full_tx, full_rx) = bounded(queue_size);
        let (close_tx, close_rx) = bounded(0);

        for _ in 0..queue_size {
            if empty_tx.try_send(DataBlock::new(block_capacity)).is_err() {
                panic!("dual queue invariant violated: empty pool rejected its initial block");
            }
        }

        DualQueue {
            empty_tx,
            empty_rx,
            full_tx,
            full_rx,
            outstanding: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            close_tx: Mutex::new(Some(close_tx)),
            close_rx,
            queue_size,
            block_capacity,
        }
    }

    /// Block until a filled block is available. `None` once the queue is closed.
    pub fn pop_full(&self) -> Option<DataBlock> {
        self.pop(&self.full_rx, "full pool disconnected")
    }

    pub fn push_full(&self, block: DataBlock) {
        self.checked_in(&block);
        if self.full_tx.send(block).is_err() {
            self.invariant_violated("full pool disconnected");
        }
    }

    /// Block until a recycled block is available. `None` once the queue is closed.
    pub fn pop_empty(&self) -> Option<DataBlock> {
        self.pop(&self.empty_rx, "empty pool disconnected")
    }

    pub fn push_empty(&self, block: DataBlock) {
        self.checked_in(&block);
        if self.empty_tx.send(block).is_err() {
            self.invariant_violated("empty pool disconnected");
        }
    }

    /// Wake every blocked pop and refuse further ones. Idempotent.
    ///
    /// Pushes still succeed, so a worker may hand back the block it holds.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("dual queue closed");
        }
        self.close_tx.lock().take();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn try_pop_full(&self) -> Option<DataBlock> {
        match self.full_rx.try_recv() {
            Ok(block) => Some(self.checked_out(block)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => self.invariant_violated("full pool disconnected"),
        }
    }

    pub fn try_pop_empty(&self) -> Option<DataBlock> {
        match self.empty_rx.try_recv() {
            Ok(block) => Some(self.checked_out(block)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => self.invariant_violated("empty pool disconnected"),
        }
    }

    pub fn empty_len(&self) -> usize {
        self.empty_rx.len()
    }

    pub fn full_len(&self) -> usize {
        self.full_rx.len()
    }

    /// Blocks currently sitting in either pool.
    pub fn pooled(&self) -> usize {
        self.empty_len() + self.full_len()
    }

    /// Blocks popped by a worker and not yet pushed back.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    fn pop(&self, pool: &Receiver<DataBlock>, disconnected: &str) -> Option<DataBlock> {
        if self.is_closed() {
            return None;
        }
        select! {
            recv(pool) -> block => match block {
                Ok(block) => Some(self.checked_out(block)),
                Err(_) => self.invariant_violated(disconnected),
            },
            recv(self.close_rx) -> _ => None,
        }
    }

    fn checked_out(&self, block: DataBlock) -> DataBlock {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        block
    }

    fn checked_in(&self, block: &DataBlock) {
        if block.capacity() != self.block_capacity {
            self.invariant_violated("pushed a block that does not belong to this queue");
        }
        let released = self.outstanding.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            n.checked_sub(1)
        });
        if released.is_err() {
            self.invariant_violated("pushed more blocks than were popped");
        }
    }

    /// Close the lane so its peer unblocks, then panic.
    fn invariant_violated(&self, what: &str) -> ! {
        tracing::error!("dual queue invariant violated: {}", what);
        self.close();
        panic!("dual queue invariant violated: {}", what);
    }
}

/// Closes a lane's queue if the owning worker unwinds.
pub struct CloseOnPanic<'q>(pub &'q DualQueue);

impl Drop for CloseOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::error!("lane worker panicked, closing its queue");
            self.0.close();
        }
    }
}
