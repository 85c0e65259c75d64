//! Collection statistics for `scout stats`.

use anyhow::Result;
use std::io::Write;

use issue_scout_core::store::Store;

use crate::config::Config;

/// Print the configured collection and how many documents it holds.
pub async fn run_stats<W: Write>(store: &dyn Store, config: &Config, out: &mut W) -> Result<()> {
    let count = store.count_documents(&config.store.collection).await?;

    writeln!(out, "Issue Scout Store Stats")?;
    writeln!(out, "=======================")?;
    writeln!(out)?;
    writeln!(out, "  Collection:  {}", config.store.collection)?;
    writeln!(out, "  Documents:   {}", count)?;
    writeln!(
        out,
        "  Source:      {}/{}",
        config.github.owner, config.github.repo
    )?;
    writeln!(out, "  Embeddings:  {} ({})", config.embedding.model, config.embedding.provider)?;
    Ok(())
}
