use mutex::{raw_impls::cs::CriticalSectionRawMutex, BlockingMutex, ConstInit, ScopedRawMutex};

/// A lock-protected cell holding the latest value written to it.
///
/// Unlike a channel, a [`Watch`] never queues: every [`Watch::send`]
/// overwrites the previous value.
pub struct Watch<T, M: ScopedRawMutex = CriticalSectionRawMutex> {
    value: BlockingMutex<M, T>,
}

impl<T: Clone, M: ScopedRawMutex> Watch<T, M> {
    /// Create a watch holding `initial` until the first write.
    pub const fn new(initial: T) -> Self
    where
        M: ConstInit,
    {
        Self {
            value: BlockingMutex::new(initial),
        }
    }

    pub fn get(&self) -> T {
        self.value.with_lock(|value| value.clone())
    }

    pub fn send(&self, value: T) {
        self.value.with_lock(|current| *current = value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_initial_value_until_written() {
        let watch: Watch<f64> = Watch::new(1.5);

        assert_eq!(watch.get(), 1.5);

        watch.send(2.5);

        assert_eq!(watch.get(), 2.5);
    }

    #[test]
    fn last_write_wins() {
        let watch: Watch<bool> = Watch::new(false);

        watch.send(true);
        watch.send(false);
        watch.send(true);

        assert!(watch.get());
    }

    #[test]
    fn writes_from_other_threads_are_visible() {
        static WATCH: Watch<u32> = Watch::new(0);

        let handles: Vec<_> = (1..=4)
            .map(|n| std::thread::spawn(move || WATCH.send(n)))
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!((1..=4).contains(&WATCH.get()));
    }
}
