// URL ↔ state ↔ network synchronisation as an explicit state machine
// Each fetch gets a monotonically increasing request id; only the response to
// the latest request is accepted, anything older is dropped as stale.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    SyncingFromUrl,
    ApplyingFilter,
    Fetching { request_id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// The route (query string) changed underneath the page.
    UrlChanged,
    /// The user changed search, sort, page or a filter.
    FilterChanged,
    /// State is settled; load data for it.
    FetchRequested,
    /// A response (or failure) for `request_id` arrived.
    FetchSettled { request_id: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Moved(SyncPhase),
    /// A settled request that is no longer the latest; its data must be dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncError {
    pub phase: SyncPhase,
    pub event: SyncEvent,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event {:?} not allowed while {:?}", self.event, self.phase)
    }
}

impl std::error::Error for SyncError {}

/// Ticket for one fetch; hand it back through [`SyncMachine::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct SyncMachine {
    phase: SyncPhase,
    last_issued: u64,
}

impl Default for SyncMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMachine {
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::Idle,
            last_issued: 0,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, SyncPhase::Fetching { .. })
    }

    fn next_request(&mut self) -> SyncPhase {
        self.last_issued += 1;
        SyncPhase::Fetching {
            request_id: self.last_issued,
        }
    }

    /// Transition table. A user change while the URL is being applied is
    /// rejected; a new fetch while one is in flight replaces it.
    pub fn handle(&mut self, event: SyncEvent) -> Result<Outcome, SyncError> {
        use SyncEvent::*;
        use SyncPhase::*;

        let next = match (self.phase, event) {
            (Idle, UrlChanged) | (SyncingFromUrl, UrlChanged) | (Fetching { .. }, UrlChanged) => {
                SyncingFromUrl
            }
            (ApplyingFilter, UrlChanged) => SyncingFromUrl,

            (Idle, FilterChanged) | (ApplyingFilter, FilterChanged) | (Fetching { .. }, FilterChanged) => {
                ApplyingFilter
            }
            (SyncingFromUrl, FilterChanged) => return Err(SyncError { phase: self.phase, event }),

            (Idle, FetchRequested)
            | (SyncingFromUrl, FetchRequested)
            | (ApplyingFilter, FetchRequested)
            | (Fetching { .. }, FetchRequested) => self.next_request(),

            (Fetching { request_id }, FetchSettled { request_id: settled }) if request_id == settled => Idle,
            (_, FetchSettled { .. }) => return Ok(Outcome::Stale),
        };

        self.phase = next;
        Ok(Outcome::Moved(next))
    }

    /// Start a fetch for the current state.
    pub fn begin_fetch(&mut self) -> RequestTicket {
        // FetchRequested is accepted from every phase.
        let _ = self.handle(SyncEvent::FetchRequested);
        RequestTicket(self.last_issued)
    }

    /// Report a fetch as finished. `true` when its result should be applied.
    pub fn settle(&mut self, ticket: RequestTicket) -> bool {
        matches!(
            self.handle(SyncEvent::FetchSettled { request_id: ticket.0 }),
            Ok(Outcome::Moved(SyncPhase::Idle))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut sync = SyncMachine::new();
        assert_eq!(sync.handle(SyncEvent::UrlChanged), Ok(Outcome::Moved(SyncPhase::SyncingFromUrl)));
        let ticket = sync.begin_fetch();
        assert_eq!(sync.phase(), SyncPhase::Fetching { request_id: 1 });
        assert!(sync.settle(ticket));
        assert_eq!(sync.phase(), SyncPhase::Idle);
    }

    #[test]
    fn test_replaced_fetch_is_stale() {
        let mut sync = SyncMachine::new();
        let first = sync.begin_fetch();
        let second = sync.begin_fetch();
        assert_ne!(first, second);
        assert!(!sync.settle(first));
        assert!(sync.is_fetching());
        assert!(sync.settle(second));
    }

    #[test]
    fn test_filter_change_during_fetch_invalidates_response() {
        let mut sync = SyncMachine::new();
        let ticket = sync.begin_fetch();
        sync.handle(SyncEvent::FilterChanged).unwrap();
        assert!(!sync.settle(ticket));
        assert_eq!(sync.phase(), SyncPhase::ApplyingFilter);
    }

    #[test]
    fn test_filter_change_while_syncing_from_url_is_rejected() {
        let mut sync = SyncMachine::new();
        sync.handle(SyncEvent::UrlChanged).unwrap();
        let err = sync.handle(SyncEvent::FilterChanged).unwrap_err();
        assert_eq!(err.phase, SyncPhase::SyncingFromUrl);
        assert_eq!(sync.phase(), SyncPhase::SyncingFromUrl);
    }

    #[test]
    fn test_settle_while_idle_is_stale() {
        let mut sync = SyncMachine::new();
        assert_eq!(
            sync.handle(SyncEvent::FetchSettled { request_id: 7 }),
            Ok(Outcome::Stale)
        );
    }
}
