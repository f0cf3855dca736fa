use std::io::Write;

use anyhow::Result;
use tracing::debug;

use crate::{
    error::Error,
    types::{Forge, PullRequestSummary},
};

/// Fetches every page of results for `query` and returns them in arrival
/// order.
///
/// All pages are buffered before returning, so memory grows with the size
/// of the result set.
pub async fn list_pull_requests<F>(query: &str, forge: &F) -> Result<Vec<PullRequestSummary>>
where
    F: Forge + Sync,
{
    let mut all_prs = Vec::new();
    let mut after_cursor: Option<String> = None;
    let mut page_count = 0usize;

    loop {
        page_count += 1;
        let page = forge
            .search_pull_requests(query, after_cursor.as_deref())
            .await?;

        debug!(
            page = page_count,
            results = page.results.len(),
            has_next_page = page.has_next_page,
            "received search page"
        );
        all_prs.extend(page.results);

        if !page.has_next_page {
            break;
        }

        // A page that promises more without a cursor would loop forever.
        after_cursor = page.end_cursor;
        if after_cursor.is_none() {
            debug!("search reported more pages but returned no cursor, stopping");
            break;
        }
    }

    debug!(pages = page_count, total = all_prs.len(), "search complete");
    Ok(all_prs)
}

/// Writes the summaries as a JSON array followed by a newline.
pub fn write_json<W: Write>(prs: &[PullRequestSummary], pretty: bool, writer: &mut W) -> Result<()> {
    let serialized = if pretty {
        serde_json::to_writer_pretty(&mut *writer, prs)
    } else {
        serde_json::to_writer(&mut *writer, prs)
    };
    serialized.map_err(|e| Error::Output(e.to_string()))?;

    writeln!(writer).map_err(|e| Error::Output(e.to_string()))?;
    writer.flush().map_err(|e| Error::Output(e.to_string()))?;
    Ok(())
}
