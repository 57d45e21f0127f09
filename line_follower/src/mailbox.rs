//! Single value mailbox between a periodic producer and a polling consumer.
//!
//! A timer task publishes the latest sensor reading, the main loop polls
//! it whenever it is ready. Publishing never blocks and overwrites a value
//! that was not read yet, polling takes the value and clears the slot.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

/// Holds at most one value.
///
/// `M` is the raw mutex that guards the slot, use
/// `CriticalSectionRawMutex` when the producer runs in an interrupt
/// and `ThreadModeRawMutex` when both sides are tasks of the same executor.
pub struct Mailbox<M: RawMutex, T: Send> {
    slot: Signal<M, T>,
}

impl<M: RawMutex, T: Send> Mailbox<M, T> {
    pub const fn new() -> Self {
        Mailbox {
            slot: Signal::new(),
        }
    }

    /// Stores `value`, replacing the previous one if it was not taken.
    pub fn publish(&self, value: T) {
        self.slot.signal(value);
    }

    /// Takes the value if there is one.
    pub fn poll(&self) -> Option<T> {
        self.slot.try_take()
    }

    /// Verifies if a value is waiting, without taking it.
    pub fn is_pending(&self) -> bool {
        self.slot.signaled()
    }

    /// Waits for a value and takes it.
    pub async fn wait(&self) -> T {
        self.slot.wait().await
    }

    /// Drops a value that was not taken yet.
    pub fn clear(&self) {
        self.slot.reset();
    }
}

impl<M: RawMutex, T: Send> Default for Mailbox<M, T> {
    fn default() -> Self {
        Mailbox::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    #[test]
    fn starts_empty() {
        let mailbox: Mailbox<CriticalSectionRawMutex, u8> = Mailbox::new();
        assert!(!mailbox.is_pending());
        assert_eq!(mailbox.poll(), None);
    }

    #[test]
    fn poll_takes_the_value() {
        let mailbox: Mailbox<CriticalSectionRawMutex, u8> = Mailbox::new();
        mailbox.publish(0x18);
        assert!(mailbox.is_pending());
        assert_eq!(mailbox.poll(), Some(0x18));
        assert_eq!(mailbox.poll(), None);
    }

    #[test]
    fn keeps_only_the_latest_value() {
        let mailbox: Mailbox<CriticalSectionRawMutex, u8> = Mailbox::new();
        mailbox.publish(1);
        mailbox.publish(2);
        mailbox.publish(3);
        assert_eq!(mailbox.poll(), Some(3));
        assert_eq!(mailbox.poll(), None);
    }

    #[test]
    fn clear_drops_the_value() {
        let mailbox: Mailbox<CriticalSectionRawMutex, u8> = Mailbox::new();
        mailbox.publish(1);
        mailbox.clear();
        assert!(!mailbox.is_pending());
    }

    #[test]
    fn wait_returns_a_published_value() {
        static MAILBOX: Mailbox<CriticalSectionRawMutex, u8> = Mailbox::new();
        std::thread::scope(|scope| {
            scope.spawn(|| MAILBOX.publish(0xc0));
            assert_eq!(block_on(MAILBOX.wait()), 0xc0);
        });
        assert_eq!(MAILBOX.poll(), None);
    }
}
