//! Bookkeeping for one optimistically edited field (selection or order).

/// Persist requests issued for a field and the value the server last accepted.
///
/// Rollback restores [`confirmed`](Self::confirmed), never the state from just
/// before the failing edit: when several saves overlap and all fail, every one
/// of their edits is undone.
#[derive(Debug)]
pub(super) struct SyncLedger<T> {
    confirmed: T,
    /// Request whose success produced `confirmed` (0 when seeded from a read).
    confirmed_request: u64,
    latest_request: u64,
    /// The latest request failed and no edit has followed it.
    latest_failed: bool,
}

impl<T> SyncLedger<T> {
    pub(super) fn new(confirmed: T) -> Self {
        Self {
            confirmed,
            confirmed_request: 0,
            latest_request: 0,
            latest_failed: false,
        }
    }

    pub(super) fn confirmed(&self) -> &T {
        &self.confirmed
    }

    pub(super) fn confirmed_mut(&mut self) -> &mut T {
        &mut self.confirmed
    }

    /// Replace the confirmed value with one just read from the server.
    pub(super) fn reseed(&mut self, value: T) {
        self.confirmed = value;
    }

    /// Number a new persist request.
    pub(super) fn begin(&mut self) -> u64 {
        self.latest_request = self.latest_request.wrapping_add(1);
        self.latest_failed = false;
        self.latest_request
    }

    pub(super) fn is_latest(&self, request: u64) -> bool {
        request == self.latest_request
    }

    pub(super) fn latest_failed(&self) -> bool {
        self.latest_failed
    }

    /// Record a successful persist of `value`.
    ///
    /// Returns false (and keeps the current value) when a newer request was
    /// already confirmed.
    pub(super) fn confirm(&mut self, request: u64, value: T) -> bool {
        if request < self.confirmed_request {
            return false;
        }
        self.confirmed = value;
        self.confirmed_request = request;
        true
    }

    /// Record a failed persist. Returns true if it was the latest request.
    pub(super) fn fail(&mut self, request: u64) -> bool {
        let latest = self.is_latest(request);
        if latest {
            self.latest_failed = true;
        }
        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_are_numbered_from_one() {
        let mut ledger = SyncLedger::new(Vec::<i64>::new());
        assert_eq!(ledger.begin(), 1);
        assert_eq!(ledger.begin(), 2);
        assert!(ledger.is_latest(2));
        assert!(!ledger.is_latest(1));
    }

    #[test]
    fn test_only_latest_failure_is_reported() {
        let mut ledger = SyncLedger::new(vec![1]);
        let first = ledger.begin();
        let second = ledger.begin();

        assert!(!ledger.fail(first));
        assert!(!ledger.latest_failed());
        assert!(ledger.fail(second));
        assert!(ledger.latest_failed());
        assert_eq!(ledger.confirmed(), &vec![1]);

        ledger.begin();
        assert!(!ledger.latest_failed());
    }

    #[test]
    fn test_late_success_does_not_overwrite_newer_confirmation() {
        let mut ledger = SyncLedger::new(vec![]);
        let first = ledger.begin();
        let second = ledger.begin();

        assert!(ledger.confirm(second, vec![7, 8]));
        assert!(!ledger.confirm(first, vec![7]));
        assert_eq!(ledger.confirmed(), &vec![7, 8]);
    }

    #[test]
    fn test_reseed_and_extend() {
        let mut ledger = SyncLedger::new(vec![]);
        ledger.reseed(vec![1, 2, 3]);
        ledger.confirmed_mut().push(4);
        assert_eq!(ledger.confirmed(), &vec![1, 2, 3, 4]);
    }
}
