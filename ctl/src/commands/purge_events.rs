use std::io::Write;

use anyhow::bail;
use clap::Parser;
use eventhub_db::storage::EventStore;

#[derive(Clone, Parser)]
pub struct PurgeEventsParams {
    /// Confirm deleting every event.
    #[clap(long)]
    pub yes: bool,
}

pub async fn purge_events(
    stg: &impl EventStore,
    PurgeEventsParams { yes }: PurgeEventsParams,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if !yes {
        bail!("Refusing to delete every event without --yes");
    }

    let deleted = EventStore::delete_all(stg).await?;
    writeln!(out, "Deleted {deleted} events")?;

    Ok(())
}
