//! Integration tests for the windowed data source.
//!
//! Most tests drive a gated endpoint: every fetch is parked until the test
//! answers it, so response ordering is fully under test control.

use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use datagrid_lib::endpoint::Endpoint;
use datagrid_lib::endpoint::MemoryEndpoint;
use datagrid_lib::endpoint::endpoint_fn;
use datagrid_lib::error::EndpointError;
use datagrid_lib::error::Error;
use datagrid_lib::model::Record;
use datagrid_lib::query::FilterClause;
use datagrid_lib::query::Page;
use datagrid_lib::query::RowRange;
use datagrid_lib::query::SortClause;
use datagrid_lib::scroll::FixedRowScrollStrategy;
use datagrid_lib::scroll::ScrollBehavior;
use datagrid_lib::scroll::ScrollConfig;
use datagrid_lib::scroll::Viewport;
use datagrid_lib::source::DataSourceConfig;
use datagrid_lib::source::FetchKind;
use datagrid_lib::source::Phase;
use datagrid_lib::source::Window;
use datagrid_lib::source::WindowedDataSource;
use futures::StreamExt;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;

// =============================================================================
// Helpers
// =============================================================================

struct Call {
    range: RowRange,
    sorts: Vec<SortClause>,
    filters: Vec<FilterClause>,
    reply: oneshot::Sender<Result<Page<usize>, EndpointError>>,
}

impl Call {
    /// Answers with rows `start..start + n` of a store holding `total` rows.
    fn rows(self, total: usize) {
        let end = self.range.end().min(total);
        let rows: Vec<usize> = (self.range.start_row_index.min(end)..end).collect();
        let page = Page::new(self.range.start_row_index, rows).with_totals(total, total);
        let _ = self.reply.send(Ok(page));
    }

    fn sizes(self, total: usize, filtered: usize) {
        let _ = self.reply.send(Ok(Page::sizes_only(total, filtered)));
    }

    fn fail(self, message: &str) {
        let _ = self.reply.send(Err(EndpointError::failed(message)));
    }
}

struct GatedEndpoint {
    calls: mpsc::UnboundedSender<Call>,
}

#[async_trait]
impl Endpoint<usize> for GatedEndpoint {
    async fn fetch(
        &self,
        range: RowRange,
        sorts: &[SortClause],
        filters: &[FilterClause],
    ) -> Result<Page<usize>, EndpointError> {
        let (reply, answer) = oneshot::channel();
        self.calls
            .send(Call {
                range,
                sorts: sorts.to_vec(),
                filters: filters.to_vec(),
                reply,
            })
            .map_err(|_| EndpointError::failed("test finished"))?;
        answer
            .await
            .map_err(|_| EndpointError::failed("call dropped"))?
    }
}

fn gated(config: DataSourceConfig) -> (WindowedDataSource<usize>, mpsc::UnboundedReceiver<Call>) {
    let (calls, pending) = mpsc::unbounded_channel();
    let source = WindowedDataSource::builder()
        .endpoint(GatedEndpoint { calls })
        .config(config)
        .build();
    (source, pending)
}

fn users() -> MemoryEndpoint<Record> {
    MemoryEndpoint::new(
        (0..80)
            .map(|i| Record::new().set("id", i).set("name", format!("User{i:04}")))
            .collect(),
    )
}

fn names(window: &Window<Record>) -> Vec<String> {
    window
        .loaded_rows()
        .filter_map(|row| row.get_string("name").ok().flatten().map(str::to_string))
        .collect()
}

async fn settled(loading: &mut watch::Receiver<bool>) {
    loading.wait_for(|busy| !*busy).await.unwrap();
}

async fn yield_many() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Range requests
// =============================================================================

#[tokio::test]
async fn test_newest_range_wins_when_stale_arrives_last() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    let render = source.connect().unwrap();
    let mut loading = source.loading();

    source.request_range(RowRange::new(0, 5)).unwrap();
    source.request_range(RowRange::new(40, 5)).unwrap();
    let first = calls.recv().await.unwrap();
    let second = calls.recv().await.unwrap();
    assert_eq!(second.range, RowRange::new(40, 5));

    second.rows(80);
    settled(&mut loading).await;
    first.rows(80);
    yield_many().await;

    let window = render.borrow().clone();
    assert!(!window.preliminary);
    assert_eq!(window.range, RowRange::new(40, 5));
    assert_eq!(window.loaded_rows().copied().collect::<Vec<_>>(), vec![40, 41, 42, 43, 44]);
}

#[tokio::test]
async fn test_newest_range_wins_when_stale_arrives_first() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    let render = source.connect().unwrap();
    let mut loading = source.loading();

    source.request_range(RowRange::new(0, 5)).unwrap();
    source.request_range(RowRange::new(40, 5)).unwrap();
    let first = calls.recv().await.unwrap();
    let second = calls.recv().await.unwrap();

    first.rows(80);
    yield_many().await;
    assert!(*loading.borrow());
    assert!(render.borrow().preliminary);
    assert_eq!(render.borrow().range, RowRange::new(40, 5));

    second.rows(80);
    settled(&mut loading).await;
    assert_eq!(render.borrow().loaded_rows().next(), Some(&40));
    assert_eq!(source.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_placeholder_reuses_loaded_rows() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    let render = source.connect().unwrap();
    let mut loading = source.loading();

    source.request_range(RowRange::new(0, 10)).unwrap();
    calls.recv().await.unwrap().rows(80);
    settled(&mut loading).await;

    source.request_range(RowRange::new(5, 10)).unwrap();
    let placeholder = render.borrow().clone();
    assert!(placeholder.preliminary);
    assert_eq!(placeholder.len(), 10);
    assert_eq!(placeholder.loaded_rows().copied().collect::<Vec<_>>(), vec![5, 6, 7, 8, 9]);
    assert!(placeholder.rows[5..].iter().all(|slot| slot.is_pending()));
}

#[tokio::test]
async fn test_sizes_published_only_on_change() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    source.connect().unwrap();
    let mut loading = source.loading();
    let mut sizes = source.sizes();
    assert_eq!(*sizes.borrow_and_update(), None);

    source.request_range(RowRange::new(0, 5)).unwrap();
    calls.recv().await.unwrap().rows(80);
    settled(&mut loading).await;
    assert!(sizes.has_changed().unwrap());
    assert_eq!(sizes.borrow_and_update().map(|s| s.total_elements), Some(80));

    source.request_range(RowRange::new(5, 5)).unwrap();
    calls.recv().await.unwrap().rows(80);
    settled(&mut loading).await;
    assert!(!sizes.has_changed().unwrap());

    source.request_range(RowRange::new(10, 5)).unwrap();
    calls.recv().await.unwrap().rows(81);
    settled(&mut loading).await;
    assert!(sizes.has_changed().unwrap());
    assert_eq!(source.filtered_size(), 81);
}

#[tokio::test]
async fn test_failure_resets_loading_and_keeps_source_usable() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    let render = source.connect().unwrap();
    let mut loading = source.loading();
    let mut failures = source.failures();

    source.request_range(RowRange::new(0, 3)).unwrap();
    calls.recv().await.unwrap().rows(80);
    settled(&mut loading).await;

    source.request_range(RowRange::new(3, 3)).unwrap();
    calls.recv().await.unwrap().fail("backend down");
    settled(&mut loading).await;

    let failure = failures.recv().await.unwrap();
    assert_eq!(failure.request, FetchKind::Rows(RowRange::new(3, 3)));
    assert!(failure.error.to_string().contains("backend down"));

    // The placeholder computed from the last good page is still usable.
    source.request_range(RowRange::new(1, 3)).unwrap();
    assert_eq!(render.borrow().loaded_rows().copied().collect::<Vec<_>>(), vec![1, 2]);

    calls.recv().await.unwrap().rows(80);
    settled(&mut loading).await;
    assert!(!render.borrow().preliminary);
    assert_eq!(render.borrow().loaded_rows().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_invalid_page_is_a_failure() {
    let endpoint = endpoint_fn(|range: RowRange, _, _| async move {
        let rows: Vec<usize> = (0..range.number_of_rows + 1).collect();
        Ok(Page::new(range.start_row_index, rows))
    });
    let source = WindowedDataSource::builder().endpoint(endpoint).build();
    source.connect().unwrap();
    let mut failures = source.failures();

    source.request_range(RowRange::new(0, 2)).unwrap();
    let failure = failures.recv().await.unwrap();
    assert!(matches!(failure.error, EndpointError::InvalidPage(_)));
    assert!(!*source.loading().borrow());
}

#[tokio::test]
async fn test_request_timeout() {
    let endpoint = endpoint_fn(|_, _, _| futures::future::pending::<Result<Page<usize>, EndpointError>>());
    let source = WindowedDataSource::builder()
        .endpoint(endpoint)
        .config(DataSourceConfig::default().with_request_timeout(Duration::from_millis(20)))
        .build();
    source.connect().unwrap();
    let mut loading = source.loading();
    let mut failures = source.failures();

    source.request_range(RowRange::new(0, 5)).unwrap();
    assert!(*loading.borrow());
    settled(&mut loading).await;

    let failure = failures.recv().await.unwrap();
    assert!(matches!(failure.error, EndpointError::Timeout(_)));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_disconnect_cancels_and_completes_loading() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    let render = source.connect().unwrap();
    let mut loading = source.loading();

    source.request_range(RowRange::new(0, 5)).unwrap();
    let pending = calls.recv().await.unwrap();
    assert!(*loading.borrow());

    source.disconnect();
    settled(&mut loading).await;
    assert!(loading.changed().await.is_err());
    assert!(source.loading().changed().await.is_err());
    assert_eq!(source.phase(), Phase::Idle);

    pending.rows(80);
    yield_many().await;
    assert!(render.borrow().preliminary);
    assert!(matches!(
        source.request_range(RowRange::new(0, 5)),
        Err(Error::Config(_))
    ));
}

#[tokio::test]
async fn test_disconnect_interrupts_size_probe() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    source.connect().unwrap();

    let probe = tokio::spawn({
        let source = source.clone();
        async move { source.reload_size_of_store().await }
    });
    let _pending = calls.recv().await.unwrap();

    source.disconnect();
    assert!(matches!(probe.await.unwrap(), Err(Error::Disconnected)));
}

#[tokio::test]
async fn test_new_scroller_replaces_previous() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    source.connect().unwrap();

    let (first_tx, first_rx) = futures::channel::mpsc::unbounded();
    source.attach_scroller(first_rx).unwrap();
    first_tx.unbounded_send(RowRange::new(0, 5)).unwrap();
    assert_eq!(calls.recv().await.unwrap().range, RowRange::new(0, 5));

    let (second_tx, second_rx) = futures::channel::mpsc::unbounded();
    source.attach_scroller(second_rx).unwrap();
    let _ = first_tx.unbounded_send(RowRange::new(10, 5));
    second_tx.unbounded_send(RowRange::new(20, 5)).unwrap();

    assert_eq!(calls.recv().await.unwrap().range, RowRange::new(20, 5));
    yield_many().await;
    assert!(calls.try_recv().is_err());
}

// =============================================================================
// Sorting, filtering and sizes
// =============================================================================

#[tokio::test]
async fn test_set_sorts_probes_store_size() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    source.connect().unwrap();

    let change = tokio::spawn({
        let source = source.clone();
        async move { source.set_sorts(vec![SortClause::desc("id")]).await }
    });

    let probe = calls.recv().await.unwrap();
    assert!(probe.range.is_probe());
    assert_eq!(probe.sorts, vec![SortClause::desc("id")]);
    probe.sizes(80, 80);

    let sizes = change.await.unwrap().unwrap();
    assert_eq!(sizes.total_elements, 80);
    assert_eq!(source.sorts(), vec![SortClause::desc("id")]);
    assert_eq!(*source.sizes().borrow(), Some(sizes));
    yield_many().await;
    assert!(calls.try_recv().is_err());
}

#[tokio::test]
async fn test_refetch_on_change_requests_last_range() {
    let (source, mut calls) =
        gated(DataSourceConfig::default().with_refetch_on_change(true));
    source.connect().unwrap();
    let mut loading = source.loading();

    source.request_range(RowRange::new(20, 3)).unwrap();
    calls.recv().await.unwrap().rows(80);
    settled(&mut loading).await;

    let filters = vec![FilterClause::range("name", "User0003", "User0030")];
    let change = tokio::spawn({
        let source = source.clone();
        let filters = filters.clone();
        async move { source.set_filters(filters).await }
    });

    let mut pending = vec![calls.recv().await.unwrap(), calls.recv().await.unwrap()];
    pending.sort_by_key(|call| call.range.is_probe());
    assert!(pending.iter().all(|call| call.filters == filters));
    let probe = pending.pop().unwrap();
    let rows = pending.pop().unwrap();
    assert_eq!(rows.range, RowRange::new(20, 3));

    probe.sizes(80, 28);
    rows.rows(80);
    assert_eq!(change.await.unwrap().unwrap().total_filtered_elements, 28);
}

#[tokio::test]
async fn test_newest_size_probe_wins() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    source.connect().unwrap();

    let older = tokio::spawn({
        let source = source.clone();
        async move { source.reload_size_of_store().await }
    });
    let older_call = calls.recv().await.unwrap();
    let newer = tokio::spawn({
        let source = source.clone();
        async move { source.reload_size_of_store().await }
    });
    let newer_call = calls.recv().await.unwrap();
    assert_eq!(source.phase(), Phase::AwaitingSizeProbe);

    newer_call.sizes(80, 10);
    newer.await.unwrap().unwrap();
    older_call.sizes(80, 70);
    assert_eq!(older.await.unwrap().unwrap().total_filtered_elements, 70);

    assert_eq!(source.filtered_size(), 10);
    assert_eq!(source.sizes().borrow().map(|s| s.total_filtered_elements), Some(10));
    assert_eq!(source.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_failed_probe_is_reported() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    source.connect().unwrap();
    let mut failures = source.failures();

    let probe = tokio::spawn({
        let source = source.clone();
        async move { source.reload_size_of_store().await }
    });
    calls.recv().await.unwrap().fail("count failed");

    assert!(matches!(probe.await.unwrap(), Err(Error::Endpoint(_))));
    assert_eq!(failures.recv().await.unwrap().request, FetchKind::SizeProbe);
    assert_eq!(source.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_superseded_probe_failure_is_not_reported() {
    let (source, mut calls) = gated(DataSourceConfig::default());
    source.connect().unwrap();
    let mut failures = source.failures();

    let older = tokio::spawn({
        let source = source.clone();
        async move { source.reload_size_of_store().await }
    });
    let older_call = calls.recv().await.unwrap();
    let newer = tokio::spawn({
        let source = source.clone();
        async move { source.reload_size_of_store().await }
    });
    let newer_call = calls.recv().await.unwrap();

    older_call.fail("count failed");
    assert!(matches!(older.await.unwrap(), Err(Error::Endpoint(_))));
    assert!(matches!(failures.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(source.phase(), Phase::AwaitingSizeProbe);

    newer_call.fail("count failed again");
    assert!(matches!(newer.await.unwrap(), Err(Error::Endpoint(_))));
    assert_eq!(failures.recv().await.unwrap().request, FetchKind::SizeProbe);
    assert!(matches!(failures.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(source.phase(), Phase::Idle);
}

// =============================================================================
// Scenarios over an in-memory store
// =============================================================================

#[tokio::test]
async fn test_single_row_lookup() {
    let source = WindowedDataSource::builder().endpoint(users()).build();
    let mut render = source.connect().unwrap();

    source.request_range(RowRange::new(55, 1)).unwrap();
    let window = render
        .wait_for(|w| !w.preliminary && w.range == RowRange::new(55, 1))
        .await
        .unwrap()
        .clone();
    assert_eq!(names(&window), ["User0055"]);
    assert_eq!(source.filtered_size(), 80);
}

#[tokio::test]
async fn test_filtered_window() {
    let source = WindowedDataSource::builder().endpoint(users()).build();
    let mut render = source.connect().unwrap();

    let sizes = source
        .set_filters(vec![FilterClause::range("name", "User0003", "User0030")])
        .await
        .unwrap();
    assert_eq!(sizes.total_filtered_elements, 28);
    assert_eq!(sizes.total_elements, 80);

    source.request_range(RowRange::new(20, 3)).unwrap();
    let window = render
        .wait_for(|w| !w.preliminary && w.range == RowRange::new(20, 3))
        .await
        .unwrap()
        .clone();
    assert_eq!(names(&window), ["User0023", "User0024", "User0025"]);
}

#[tokio::test]
async fn test_tail_window_is_short() {
    let source = WindowedDataSource::builder().endpoint(users()).build();
    let mut render = source.connect().unwrap();

    source.request_range(RowRange::new(75, 10)).unwrap();
    let window = render
        .wait_for(|w| !w.preliminary && w.range == RowRange::new(75, 10))
        .await
        .unwrap()
        .clone();
    assert_eq!(window.len(), 5);
    assert_eq!(names(&window).last().map(String::as_str), Some("User0079"));
}

#[tokio::test]
async fn test_index_of_row_under_sorts_and_filters() {
    let source = WindowedDataSource::builder()
        .endpoint(users())
        .track_by(|_, row: &Record| row.get("id").cloned().unwrap_or_default())
        .build();
    source.connect().unwrap();

    let target = Record::new().set("id", 55).set("name", "User0055");
    assert_eq!(source.index_of_row(&target, None, None).await.unwrap(), Some(55));

    let by_id_desc = Some(vec![SortClause::desc("id")]);
    assert_eq!(
        source.index_of_row(&target, by_id_desc, None).await.unwrap(),
        Some(24)
    );

    let narrow = Some(vec![FilterClause::range("name", "User0003", "User0030")]);
    assert_eq!(source.index_of_row(&target, None, narrow).await.unwrap(), None);
    let target = Record::new().set("id", 23);
    let narrow = Some(vec![FilterClause::range("name", "User0003", "User0030")]);
    assert_eq!(source.index_of_row(&target, None, narrow).await.unwrap(), Some(20));

    // Hypothetical clauses leave the source's own clauses alone.
    assert!(source.sorts().is_empty());
    assert!(source.filters().is_empty());
}

// =============================================================================
// Scroll strategy wired to the source
// =============================================================================

#[derive(Debug, Default)]
struct FixedViewport {
    offset: f64,
    size: f64,
    range: Range<usize>,
}

impl Viewport for FixedViewport {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport_size(&self) -> f64 {
        self.size
    }

    fn set_total_content_size(&mut self, _size: f64) {}

    fn set_rendered_range(&mut self, range: Range<usize>) {
        self.range = range;
    }

    fn set_rendered_content_offset(&mut self, _offset: f64) {}

    fn scroll_to_offset(&mut self, offset: f64, _behavior: ScrollBehavior) {
        self.offset = offset;
    }
}

#[tokio::test]
async fn test_scroll_strategy_drives_source() {
    let config = ScrollConfig::new()
        .with_row_height(20.0)
        .with_header_height(0.0)
        .with_footer_height(0.0)
        .with_buffer_multiplier(0.0);
    let mut strategy = FixedRowScrollStrategy::new(config).unwrap();
    strategy.set_data_length(80);
    strategy.attach(FixedViewport {
        size: 200.0,
        ..Default::default()
    });

    let source = WindowedDataSource::builder().endpoint(users()).build();
    let mut render = source.connect().unwrap();
    source.attach_scroller(strategy.row_ranges()).unwrap();

    let window = render
        .wait_for(|w| !w.preliminary && w.range == RowRange::new(0, 10))
        .await
        .unwrap()
        .clone();
    assert_eq!(names(&window).first().map(String::as_str), Some("User0000"));

    strategy.scroll_to_index(41, ScrollBehavior::Instant).unwrap();
    assert_eq!(strategy.rendered_range(), 40..50);

    let window = render
        .wait_for(|w| !w.preliminary && w.range == RowRange::new(40, 10))
        .await
        .unwrap()
        .clone();
    assert_eq!(names(&window).first().map(String::as_str), Some("User0040"));

    let mut ranges = Box::pin(strategy.row_ranges());
    assert_eq!(ranges.next().await, Some(RowRange::new(40, 10)));
}
