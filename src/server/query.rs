use std::fmt::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use crate::analysis::tokenizer::{BlockTokenizer, TokenScratch};
use crate::core::error::Result;
use crate::index::view::IndexView;
use crate::parallel::orchestrator::Pipeline;

/// Reply sent for a query with no terms.
pub const EMPTY_QUERY_REPLY: &str = "Success!";

/// Serve queries against a finished pipeline until the listener fails.
pub async fn serve(listener: TcpListener, pipeline: Arc<Pipeline>) -> Result<()> {
    let max_query_bytes = pipeline.config().max_query_bytes;
    tracing::info!(addr = %listener.local_addr()?, "query server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let pipeline = Arc::clone(&pipeline);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &pipeline, max_query_bytes).await {
                tracing::warn!(%peer, "query connection failed: {}", e);
            }
        });
    }
}

/// Read one query (at most `max_query_bytes`), answer it, and close.
pub async fn handle_connection(
    mut stream: TcpStream,
    pipeline: &Pipeline,
    max_query_bytes: usize,
) -> Result<()> {
    let mut buffer = vec![0u8; max_query_bytes];
    let read = stream.read(&mut buffer).await?;
    let query = String::from_utf8_lossy(&buffer[..read]).into_owned();
    tracing::info!("[server] {}", query.trim_end());

    let reply = answer(&pipeline.view(), pipeline.tokenizer(), &query);
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// One line per query term: `<term> df=<n> files=<path,...>`.
///
/// The query is split by the same tokenizer the indexers used, after dropping
/// a trailing line ending. Unranked; files are listed by lane then file id.
pub fn answer(view: &IndexView<'_>, tokenizer: &dyn BlockTokenizer, query: &str) -> String {
    let query = query.trim_end_matches(['\r', '\n']).as_bytes();
    let mut scratch = TokenScratch::for_block_size(query.len());
    tokenizer.tokenize(query, &mut scratch);
    let mut reply = String::new();

    for term in scratch.tokens(query) {
        let lookup = view.lookup(&String::from_utf8_lossy(term));
        let files: Vec<String> = lookup
            .hits
            .iter()
            .map(|hit| match &hit.path {
                Some(path) => path.display().to_string(),
                None => format!("{}#{}", hit.lane, hit.file_idx.0),
            })
            .collect();
        let _ = writeln!(reply, "{} df={} files={}", lookup.term, lookup.doc_freq, files.join(","));
    }

    if reply.is_empty() {
        reply.push_str(EMPTY_QUERY_REPLY);
    }
    reply
}

/// Client side: send `query` to `addr` and return the reply.
pub async fn send_query(addr: &str, query: &str) -> Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(query.as_bytes()).await?;
    stream.shutdown().await?;

    let mut reply = String::new();
    stream.read_to_string(&mut reply).await?;
    Ok(reply)
}
