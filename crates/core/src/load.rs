//! Per-page asynchronous load state.

use std::fmt::Display;

use serde::Serialize;

/// Exactly one of these at a time; `Loading` precedes exactly one of the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Identifies one load request. Completions carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Plain number for hosts that hand the ticket back later.
    pub fn id(self) -> u64 {
        self.0
    }

    pub fn from_id(id: u64) -> Self {
        Self(id)
    }
}

/// Drives a page's [`LoadState`] and guards against late completions.
///
/// Requests are never aborted. A completion is applied only if it carries the
/// most recent ticket and the page is still mounted.
#[derive(Debug)]
pub struct PageLoader<T> {
    state: LoadState<T>,
    generation: u64,
    mounted: bool,
}

impl<T> Default for PageLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageLoader<T> {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            generation: 0,
            mounted: true,
        }
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Start a request. Any earlier in-flight request becomes stale.
    ///
    /// An unmounted loader stays as it is; its completions are dropped
    /// until [`Self::mount`] is called.
    pub fn begin(&mut self) -> LoadTicket {
        if !self.mounted {
            tracing::debug!(generation = self.generation, "load requested while unmounted, ignored");
            return LoadTicket(self.generation);
        }
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket(self.generation)
    }

    /// Show the page again. Requests started before this are stale.
    pub fn mount(&mut self) {
        self.generation += 1;
        self.mounted = true;
        self.state = LoadState::Loading;
    }

    /// Apply a completion. Returns whether the state changed.
    ///
    /// Errors are kept as their display text, unchanged.
    pub fn complete<E: Display>(&mut self, ticket: LoadTicket, result: Result<T, E>) -> bool {
        if !self.mounted {
            tracing::debug!(ticket = ticket.0, "load finished after unmount, ignored");
            return false;
        }
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "stale load ignored");
            return false;
        }
        self.state = match result {
            Ok(value) => LoadState::Ready(value),
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(%message, "page load failed");
                LoadState::Failed(message)
            }
        };
        true
    }

    /// The page went away; later completions are dropped.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_surfaces_message_verbatim() {
        let mut loader: PageLoader<u32> = PageLoader::new();
        let ticket = loader.begin();
        assert!(loader.state().is_loading());
        assert!(loader.complete(ticket, Err("HTTP 404: data.csv not found")));
        assert!(!loader.state().is_loading());
        assert_eq!(loader.state().error(), Some("HTTP 404: data.csv not found"));
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut loader: PageLoader<u32> = PageLoader::new();
        let first = loader.begin();
        let second = loader.begin();
        assert!(!loader.complete(first, Ok::<_, String>(1)));
        assert!(loader.state().is_loading());
        assert!(loader.complete(second, Ok::<_, String>(2)));
        assert_eq!(loader.state().ready(), Some(&2));
    }

    #[test]
    fn completion_after_unmount_is_dropped() {
        let mut loader: PageLoader<u32> = PageLoader::new();
        let ticket = loader.begin();
        loader.unmount();
        assert!(!loader.complete(ticket, Ok::<_, String>(7)));
        assert!(loader.state().is_loading());
    }

    #[test]
    fn begin_after_unmount_does_not_revive() {
        let mut loader: PageLoader<u32> = PageLoader::new();
        let ready = loader.begin();
        assert!(loader.complete(ready, Ok::<_, String>(3)));
        loader.unmount();

        let ticket = loader.begin();
        assert!(!loader.is_mounted());
        assert!(!loader.complete(ticket, Err("HTTP 500")));
        assert_eq!(loader.state().ready(), Some(&3));
    }

    #[test]
    fn remount_makes_earlier_tickets_stale() {
        let mut loader: PageLoader<u32> = PageLoader::new();
        let before = loader.begin();
        loader.unmount();
        loader.mount();
        assert!(loader.state().is_loading());
        assert!(!loader.complete(before, Ok::<_, String>(1)));

        let after = loader.begin();
        assert!(loader.complete(after, Ok::<_, String>(2)));
        assert_eq!(loader.state().ready(), Some(&2));
    }

    #[test]
    fn ticket_ids_round_trip_through_hosts() {
        let mut loader: PageLoader<u32> = PageLoader::new();
        let ticket = loader.begin();
        let echoed = LoadTicket::from_id(ticket.id());
        assert!(loader.complete(echoed, Ok::<_, String>(5)));
    }

    #[test]
    fn serializes_as_tagged_union() {
        let json = serde_json::to_string(&LoadState::<u8>::Failed("boom".into())).unwrap();
        assert_eq!(json, r#"{"state":"failed","value":"boom"}"#);
    }
}
