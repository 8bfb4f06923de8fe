mod config;
mod paths;
mod users;
mod viewport;

use std::fs::File;

use datagrid_lib::endpoint::MemoryEndpoint;
use datagrid_lib::model::Record;
use datagrid_lib::multisort::MultiSort;
use datagrid_lib::multisort::SortableColumn;
use datagrid_lib::query::Direction;
use datagrid_lib::query::FilterClause;
use datagrid_lib::query::RowRange;
use datagrid_lib::scroll::FixedRowScrollStrategy;
use datagrid_lib::scroll::ScrollBehavior;
use datagrid_lib::selection::RowSelection;
use datagrid_lib::selection::SelectionMode;
use datagrid_lib::source::Window;
use datagrid_lib::source::WindowedDataSource;
use simplelog::Config;
use simplelog::WriteLogger;
use thiserror::Error;
use tokio::sync::watch;

use crate::config::DemoConfig;
use crate::viewport::ScriptedViewport;

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Grid(#[from] datagrid_lib::error::Error),
    #[error(transparent)]
    Geometry(#[from] datagrid_lib::error::ConfigError),
    #[error(transparent)]
    Sort(#[from] datagrid_lib::error::SortError),
    #[error(transparent)]
    Selection(#[from] datagrid_lib::error::SelectionError),
    #[error("data source closed before the window loaded")]
    RenderClosed,
}

type Strategy = FixedRowScrollStrategy<ScriptedViewport>;

#[tokio::main]
async fn main() {
    let config = match DemoConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    paths::rotate_logs();
    if let Some(path) = paths::log_file() {
        match (config.level(), File::create(&path)) {
            (Ok(level), Ok(file)) => {
                let _ = WriteLogger::init(level, Config::default(), file);
            }
            (_, Err(e)) => eprintln!("Logging disabled, cannot create {}: {e}", path.display()),
            (Err(e), _) => eprintln!("Logging disabled: {e}"),
        }
    }

    if let Err(e) = run(config).await {
        log::error!("Demo failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: DemoConfig) -> Result<(), DemoError> {
    let endpoint = MemoryEndpoint::new(users::generate(config.rows)).with_latency(config.latency());
    let source = WindowedDataSource::builder()
        .endpoint(endpoint)
        .config(config.data_source())
        .track_by(users::id)
        .build();

    let mut render = source.connect()?;
    let sizes = source.reload_size_of_store().await?;
    log::info!("Store holds {} rows", sizes.total_elements);

    let mut strategy = Strategy::new(config.scroll)?;
    strategy.set_data_length(sizes.total_filtered_elements);
    strategy.attach(ScriptedViewport::new(config.viewport_height));
    source.attach_scroller(strategy.row_ranges())?;
    show("Initial window", &loaded(&mut render, &strategy).await?);

    if let Some(viewport) = strategy.viewport_mut() {
        viewport.scroll_by(config.scroll.row_height * 12.5);
    }
    strategy.on_content_scrolled();
    show("Scrolled 12.5 rows", &loaded(&mut render, &strategy).await?);

    strategy.scroll_to_index(40, ScrollBehavior::Smooth)?;
    show("Scrolled to row 40", &loaded(&mut render, &strategy).await?);

    let mut sort = MultiSort::new();
    sort.register(SortableColumn::new("team"))?;
    sort.register(SortableColumn::new("id").with_start(Direction::Desc))?;
    sort.toggle("team");
    sort.toggle("id");
    source.set_sorts(sort.clauses().to_vec()).await?;
    show("Sorted by team, then id descending", &loaded(&mut render, &strategy).await?);

    let sizes = source
        .set_filters(vec![FilterClause::range("name", "User0003", "User0030")])
        .await?;
    strategy.set_data_length(sizes.total_filtered_elements);
    show(
        &format!("Filtered to {} rows", sizes.total_filtered_elements),
        &loaded(&mut render, &strategy).await?,
    );

    let target = Record::new().set("id", 23);
    match source.index_of_row(&target, None, None).await? {
        Some(index) => {
            strategy.scroll_to_index(index, ScrollBehavior::Instant)?;
            show(
                &format!("User0023 is row {index}"),
                &loaded(&mut render, &strategy).await?,
            );
        }
        None => println!("User0023 is filtered out"),
    }

    let mut selection = RowSelection::new(SelectionMode::Multi);
    let window = render.borrow().clone();
    selection.set_selected(window.loaded_rows().take(3).map(|row| users::id(0, row)))?;
    println!("Selected ids: {:?}", selection.selected());

    source.disconnect();
    log::info!("Demo finished");
    Ok(())
}

/// Waits for the authoritative window matching the strategy's rendered range.
async fn loaded(
    render: &mut watch::Receiver<Window<Record>>,
    strategy: &Strategy,
) -> Result<Window<Record>, DemoError> {
    let expected = RowRange::from(strategy.rendered_range());
    if let Some(viewport) = strategy.viewport() {
        log::debug!("[demo] Waiting for {expected:?}, {}", viewport.summary());
    }
    let window = render
        .wait_for(|window| !window.preliminary && window.range == expected)
        .await
        .map_err(|_| DemoError::RenderClosed)?;
    Ok(window.clone())
}

fn show(title: &str, window: &Window<Record>) {
    println!("== {title} (rows {}..{})", window.range.start_row_index, window.range.end());
    for row in window.loaded_rows() {
        println!("   {}", users::describe(row));
    }
}
