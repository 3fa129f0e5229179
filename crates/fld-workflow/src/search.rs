//! Debounced, cancelable candidate lookup.
//!
//! One [`SearchIndexClient`] backs one logical search box. Keystrokes go
//! through [`SearchIndexClient::submit`]: a burst inside the quiet window
//! collapses to a single remote call with the latest text, and each new
//! submission aborts whatever the previous one still has in flight.
//!
//! ```text
//!   submit("SN0")     -> short: publish default listing, no network
//!   submit("SN000")   -> gen 2, sleep(debounce) ......... aborted
//!   submit("SN0004")  -> gen 3, sleep(debounce) ... aborted
//!   submit("SN00045") -> gen 4, sleep(debounce) -> fetch -> publish if gen == 4
//! ```
//!
//! Results are published on a `watch` channel stamped with the generation
//! that produced them. A response is only published while its generation is
//! still the latest issued and newer than what is already on the channel, so
//! the displayed results always belong to the most recently *issued* query.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fld_client::types::SerialCandidate;
use fld_client::{ClientError, FieldService};
use fld_config::SearchConfig;
use fld_core::entities::Customer;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::WorkflowError;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// One page as returned by a [`CandidateSource`].
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    /// Total matches across all pages, when the source reports it.
    pub total: Option<usize>,
}

impl<T> Fetched<T> {
    #[must_use]
    pub const fn unbounded(items: Vec<T>) -> Self {
        Self { items, total: None }
    }
}

/// A remote list that can be searched by free text.
#[async_trait]
pub trait CandidateSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Short label used in logs and error messages.
    const NAME: &'static str;

    /// Fetch one page of matches. An empty `text` yields the default listing.
    async fn fetch(
        &self,
        text: &str,
        page: usize,
        limit: usize,
    ) -> Result<Fetched<Self::Item>, ClientError>;

    /// Whether [`SearchIndexClient::next_page`] has anything to fetch.
    fn is_paginated(&self) -> bool {
        false
    }
}

/// Pending equipment serials within the technician's identity scope.
pub struct SerialLookup {
    service: Arc<dyn FieldService>,
    scope: String,
}

impl SerialLookup {
    pub fn new(service: Arc<dyn FieldService>, scope: impl Into<String>) -> Self {
        Self {
            service,
            scope: scope.into(),
        }
    }
}

#[async_trait]
impl CandidateSource for SerialLookup {
    type Item = SerialCandidate;

    const NAME: &'static str = "serial";

    async fn fetch(
        &self,
        text: &str,
        _page: usize,
        limit: usize,
    ) -> Result<Fetched<SerialCandidate>, ClientError> {
        let items = self.service.lookup_serials(text, &self.scope, limit).await?;
        Ok(Fetched::unbounded(items))
    }
}

/// Paginated customer search.
pub struct CustomerLookup {
    service: Arc<dyn FieldService>,
}

impl CustomerLookup {
    pub fn new(service: Arc<dyn FieldService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CandidateSource for CustomerLookup {
    type Item = Customer;

    const NAME: &'static str = "customer";

    async fn fetch(
        &self,
        text: &str,
        page: usize,
        limit: usize,
    ) -> Result<Fetched<Customer>, ClientError> {
        let page = self.service.search_customers(text, page, limit).await?;
        Ok(Fetched {
            items: page.items,
            total: Some(page.total),
        })
    }

    fn is_paginated(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_len: usize,
    pub limit: usize,
}

impl SearchSettings {
    #[must_use]
    pub const fn serials(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            limit: config.default_limit,
        }
    }

    #[must_use]
    pub const fn customers(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            limit: config.customer_page_size,
        }
    }
}

/// One published result set.
#[derive(Debug, Clone)]
pub struct SearchResults<T> {
    /// Generation of the submission that produced these results.
    pub generation: u64,
    pub query: String,
    /// 1-based page number.
    pub page: usize,
    pub items: Vec<T>,
    /// Total matches across all pages, when the source reports it.
    pub total: Option<usize>,
    /// Set when the lookup failed; `items` is then empty.
    pub error: Option<WorkflowError>,
}

impl<T> SearchResults<T> {
    const fn empty() -> Self {
        Self {
            generation: 0,
            query: String::new(),
            page: 1,
            items: Vec::new(),
            total: None,
            error: None,
        }
    }

    /// Whether a following page can hold anything.
    #[must_use]
    pub fn has_more(&self, limit: usize) -> bool {
        if self.items.len() < limit {
            return false;
        }
        self.total
            .is_none_or(|total| self.page.saturating_mul(limit) < total)
    }

    fn resolve(
        generation: u64,
        query: String,
        page: usize,
        outcome: Result<Fetched<T>, ClientError>,
        source: &str,
    ) -> Self {
        match outcome {
            Ok(Fetched { items, total }) => Self {
                generation,
                query,
                page,
                items,
                total,
                error: None,
            },
            Err(error) => {
                tracing::warn!(source, query = %query, page, %error, "candidate lookup failed");
                Self {
                    generation,
                    query,
                    page,
                    items: Vec::new(),
                    total: None,
                    error: Some(WorkflowError::Search(format!("{source} lookup: {error}"))),
                }
            }
        }
    }
}

/// Publish `results` only if its generation is still the latest issued and
/// newer than what the channel currently holds.
fn publish<T>(
    tx: &watch::Sender<SearchResults<T>>,
    latest: &AtomicU64,
    results: SearchResults<T>,
) -> bool {
    tx.send_if_modified(|current| {
        if latest.load(Ordering::SeqCst) != results.generation
            || current.generation > results.generation
        {
            return false;
        }
        *current = results;
        true
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Debounced lookup over one [`CandidateSource`].
pub struct SearchIndexClient<S: CandidateSource> {
    source: Arc<S>,
    settings: SearchSettings,
    default_listing: Vec<S::Item>,
    generation: Arc<AtomicU64>,
    inflight: Option<JoinHandle<()>>,
    results: Arc<watch::Sender<SearchResults<S::Item>>>,
}

impl<S: CandidateSource> SearchIndexClient<S> {
    pub fn new(source: S, settings: SearchSettings) -> Self {
        let (tx, _rx) = watch::channel(SearchResults::empty());
        Self {
            source: Arc::new(source),
            settings,
            default_listing: Vec::new(),
            generation: Arc::new(AtomicU64::new(0)),
            inflight: None,
            results: Arc::new(tx),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Fetch and retain the default top-N listing (empty query).
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Search`] if the listing cannot be fetched; an
    /// empty result set carrying the same error is published.
    pub async fn prime(&mut self) -> Result<(), WorkflowError> {
        let generation = self.issue();
        let outcome = self.source.fetch("", 1, self.settings.limit).await;
        if let Ok(fetched) = &outcome {
            self.default_listing.clone_from(&fetched.items);
        }
        let results = SearchResults::resolve(generation, String::new(), 1, outcome, S::NAME);
        let error = results.error.clone();
        publish(&self.results, &self.generation, results);
        error.map_or(Ok(()), Err)
    }

    /// Debounced submission for keystroke input. Returns immediately; the
    /// outcome arrives on [`Self::subscribe`] / [`Self::latest`].
    pub fn submit(&mut self, query: &str) {
        let generation = self.issue();
        let query = query.trim().to_string();

        if self.is_short(&query) {
            let listing = self.listing(generation, query);
            publish(&self.results, &self.generation, listing);
            return;
        }

        let source = Arc::clone(&self.source);
        let latest = Arc::clone(&self.generation);
        let tx = Arc::clone(&self.results);
        let SearchSettings {
            debounce, limit, ..
        } = self.settings;

        self.inflight = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }
            tracing::debug!(source = S::NAME, query = %query, generation, "issuing lookup");
            let outcome = source.fetch(&query, 1, limit).await;
            let results = SearchResults::resolve(generation, query, 1, outcome, S::NAME);
            if !publish(&tx, &latest, results) {
                tracing::debug!(source = S::NAME, generation, "dropped superseded lookup result");
            }
        }));
    }

    /// Undebounced lookup. Supersedes any pending submission.
    pub async fn search(&mut self, query: &str) -> SearchResults<S::Item> {
        let generation = self.issue();
        let query = query.trim().to_string();

        let results = if self.is_short(&query) {
            self.listing(generation, query)
        } else {
            let outcome = self.source.fetch(&query, 1, self.settings.limit).await;
            SearchResults::resolve(generation, query, 1, outcome, S::NAME)
        };
        publish(&self.results, &self.generation, results.clone());
        results
    }

    /// Re-issue the displayed query for the following page.
    ///
    /// A no-op for unpaginated sources, for the default listing, past the
    /// last page, and while a newer submission is still pending.
    pub async fn next_page(&mut self) -> SearchResults<S::Item> {
        let current = self.latest();
        if !self.source.is_paginated()
            || self.is_pending()
            || self.is_short(&current.query)
            || current.error.is_some()
            || !current.has_more(self.settings.limit)
        {
            return current;
        }

        let generation = self.issue();
        let page = current.page + 1;
        let outcome = self
            .source
            .fetch(&current.query, page, self.settings.limit)
            .await;
        let results = SearchResults::resolve(generation, current.query, page, outcome, S::NAME);
        publish(&self.results, &self.generation, results.clone());
        results
    }

    /// Wait for the pending submission, if any, then return the latest results.
    pub async fn settled(&mut self) -> SearchResults<S::Item> {
        if let Some(handle) = self.inflight.take() {
            // An aborted task reports a JoinError; the channel already holds
            // whatever superseded it.
            let _ = handle.await;
        }
        self.latest()
    }

    /// Drop any pending submission without publishing.
    pub fn cancel(&mut self) {
        self.issue();
    }

    #[must_use]
    pub fn latest(&self) -> SearchResults<S::Item> {
        self.results.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchResults<S::Item>> {
        self.results.subscribe()
    }

    /// Bump the generation and abort the in-flight submission.
    fn issue(&mut self) -> u64 {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// A submission was issued whose results have not been published yet.
    fn is_pending(&self) -> bool {
        self.inflight.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn is_short(&self, query: &str) -> bool {
        query.chars().count() < self.settings.min_query_len
    }

    fn listing(&self, generation: u64, query: String) -> SearchResults<S::Item> {
        SearchResults {
            generation,
            query,
            page: 1,
            items: self.default_listing.clone(),
            total: None,
            error: None,
        }
    }
}

impl<S: CandidateSource> Drop for SearchIndexClient<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeFieldService, customer};
    use pretty_assertions::assert_eq;

    const SETTINGS: SearchSettings = SearchSettings {
        debounce: Duration::from_millis(300),
        min_query_len: 5,
        limit: 20,
    };

    fn serials(fake: &Arc<FakeFieldService>) -> SearchIndexClient<SerialLookup> {
        let service: Arc<dyn FieldService> = fake.clone();
        SearchIndexClient::new(SerialLookup::new(service, "branch-north"), SETTINGS)
    }

    fn lookups(fake: &FakeFieldService) -> Vec<String> {
        fake.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Lookup(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_within_window_issues_one_call_with_final_query() {
        let fake = Arc::new(FakeFieldService::seeded());
        let mut client = serials(&fake);

        for query in ["SN000", "SN0004", "SN00045"] {
            client.submit(query);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let results = client.settled().await;

        assert_eq!(lookups(&fake), vec!["SN00045".to_string()]);
        assert_eq!(results.query, "SN00045");
        assert_eq!(results.items.len(), 1);
        assert_eq!(results.items[0].serial_number, "SN00045");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_earlier_response_never_overwrites_later_query() {
        let mut fake = FakeFieldService::seeded();
        fake.lookup_delays
            .insert("SN0004".into(), Duration::from_millis(1_000));
        let fake = Arc::new(fake);
        let mut client = serials(&fake);
        let mut rx = client.subscribe();

        client.submit("SN0004");
        // Past the debounce window: the slow call is now outstanding.
        tokio::time::sleep(Duration::from_millis(400)).await;
        client.submit("SN00045");
        let results = client.settled().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(lookups(&fake), vec!["SN0004".to_string(), "SN00045".to_string()]);
        assert_eq!(results.query, "SN00045");
        assert_eq!(client.latest().query, "SN00045");
        assert_eq!(rx.borrow_and_update().query, "SN00045");
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_serves_default_listing_without_network() {
        let fake = Arc::new(FakeFieldService::seeded());
        let mut client = serials(&fake);
        client.prime().await.unwrap();

        client.submit("SN0");
        let results = client.settled().await;

        assert_eq!(lookups(&fake), vec![String::new()]);
        assert_eq!(results.query, "SN0");
        assert_eq!(results.items.len(), 7);
    }

    #[tokio::test]
    async fn short_query_before_prime_is_empty() {
        let fake = Arc::new(FakeFieldService::seeded());
        let mut client = serials(&fake);

        let results = client.search("SN").await;
        assert!(results.items.is_empty());
        assert!(results.error.is_none());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_yields_empty_set_and_search_error() {
        let mut fake = FakeFieldService::seeded();
        fake.lookup_down = true;
        let fake = Arc::new(fake);
        let mut client = serials(&fake);

        let results = client.search("SN00045").await;
        assert!(results.items.is_empty());
        assert!(matches!(results.error, Some(WorkflowError::Search(_))));

        let err = client.prime().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_submission() {
        let fake = Arc::new(FakeFieldService::seeded());
        let mut client = serials(&fake);

        client.submit("SN00045");
        client.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(lookups(&fake).is_empty());
        assert_eq!(client.latest().generation, 0);
    }

    #[tokio::test]
    async fn customer_search_pages_forward() {
        let fake = harbor_sites(25);
        let mut client = customers(&fake);

        let first = client.search("Harbor").await;
        assert_eq!(first.items.len(), 20);

        let second = client.next_page().await;
        assert_eq!(second.page, 2);
        assert_eq!(second.items.len(), 5);
        assert!(fake.calls().contains(&Call::Customers("Harbor".into(), 2)));
    }

    fn harbor_sites(count: usize) -> Arc<FakeFieldService> {
        let mut fake = FakeFieldService::seeded();
        fake.customers = (1..=count)
            .map(|n| customer(&format!("C-{n:04}"), &format!("Harbor Site {n}")))
            .collect();
        Arc::new(fake)
    }

    fn customers(fake: &Arc<FakeFieldService>) -> SearchIndexClient<CustomerLookup> {
        let service: Arc<dyn FieldService> = fake.clone();
        SearchIndexClient::new(CustomerLookup::new(service), SETTINGS)
    }

    #[tokio::test(start_paused = true)]
    async fn paging_waits_for_pending_submission() {
        let fake = harbor_sites(25);
        let mut client = customers(&fake);

        client.search("Harbor").await;
        client.submit("Harbor Site 2");
        let shown = client.next_page().await;
        assert_eq!(shown.query, "Harbor");
        assert_eq!(shown.page, 1);

        let settled = client.settled().await;
        assert_eq!(settled.query, "Harbor Site 2");
        assert_eq!(
            fake.calls(),
            vec![
                Call::Customers("Harbor".into(), 1),
                Call::Customers("Harbor Site 2".into(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn paging_stops_at_last_page() {
        let fake = harbor_sites(40);
        let mut client = customers(&fake);

        client.search("Harbor").await;
        let second = client.next_page().await;
        assert_eq!(second.page, 2);
        assert_eq!(second.items.len(), 20);
        assert_eq!(second.total, Some(40));

        let again = client.next_page().await;
        assert_eq!(again.page, 2);
        assert_eq!(fake.count(|c| matches!(c, Call::Customers(..))), 2);
    }

    #[tokio::test]
    async fn serial_lookup_has_no_next_page() {
        let fake = Arc::new(FakeFieldService::seeded());
        let mut client = serials(&fake);

        client.search("SN00045").await;
        let again = client.next_page().await;
        assert_eq!(again.page, 1);
        assert_eq!(lookups(&fake).len(), 1);
    }
}
