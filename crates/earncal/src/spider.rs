use crate::cli::Cli;
use earncal_spider::calendar::{self, Aggregator, HttpFetcher};
use earncal_spider::store::{self, StoreOutcome};
use earncal_spider::{FailurePolicy, SpiderConfig};
use tracing::{debug, info, trace};

/// Run the calendar pipeline: date window, fetch & extract per date, store.
pub(crate) async fn run(cli: &Cli, tui: bool) -> anyhow::Result<()> {
    let time = std::time::Instant::now();

    let mut config = SpiderConfig::from_env();
    config.policy = match cli.strict {
        true => FailurePolicy::Abort,
        false => FailurePolicy::Skip,
    };
    config.dedup = cli.dedup;
    config.tui = tui;
    trace!("spider config: {config:?}");

    // open the sink first, so a bad store location fails before any fetching
    let sink = store::open(&cli.db)?;

    let dates = calendar::date_strings(cli.from, cli.to);
    debug!("{} dates in window [{}, {})", dates.len(), cli.from, cli.to);

    let aggregator = Aggregator::new(HttpFetcher::new(&config)?, &config);
    let collection = aggregator.collect_window(&dates).await?;
    let skipped = collection.skipped.len();

    match sink.store(collection.batch).await? {
        StoreOutcome::Nothing => {
            if tui {
                println!("no earnings dates found ({skipped} of {} dates skipped)", dates.len());
            }
        }
        StoreOutcome::Inserted(n) => {
            if tui {
                println!(
                    "{n} earnings dates stored in {} ({skipped} of {} dates skipped)",
                    cli.db,
                    dates.len()
                );
            }
        }
    }

    info!(
        "spider finished collecting earnings dates, time elapsed: {:?}",
        time.elapsed()
    );

    Ok(())
}
