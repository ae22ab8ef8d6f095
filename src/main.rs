use anyhow::Context;
use clap::Parser;
use doxysearch::cli::{Cli, Commands};
use doxysearch::tools::{SearchDefaults, render_results};
use doxysearch::{
    DirectorySource, IndexServer, SearchConfig, SearchIndex, SearchOutcome, SearchSession,
};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = SearchConfig::load(cli.config.as_deref())?;

    // Logs go to stderr so they never interleave with MCP frames on stdout
    doxysearch::tracing::init(config.log_json);

    match cli.command {
        Commands::Serve { index } => serve(&config, index).await,
        Commands::Query {
            query,
            index,
            sections,
            limit,
        } => {
            let index = open_index(&config, index).await?;
            let defaults = defaults(&config, sections, &index)?;
            let sections = defaults.resolve_sections(&index);
            let results = index.search(&query, &sections).await;
            print!(
                "{}",
                render_results(&query, &sections, &results, limit.unwrap_or(defaults.limit))
            );
            Ok(())
        }
        Commands::Interactive { index, sections } => {
            let index = Arc::new(open_index(&config, index).await?);
            let defaults = defaults(&config, sections, &index)?;
            interactive(index, defaults, &config).await
        }
    }
}

async fn open_index(config: &SearchConfig, index: Option<PathBuf>) -> anyhow::Result<SearchIndex> {
    let dir = index.unwrap_or_else(|| config.index_dir.clone());
    SearchIndex::open(DirectorySource::new(&dir), config.index_options())
        .await
        .with_context(|| format!("Failed to open search index in {}", dir.display()))
}

/// CLI sections win over configured ones; either way they must exist in the manifest.
fn defaults(
    config: &SearchConfig,
    sections: Vec<String>,
    index: &SearchIndex,
) -> anyhow::Result<SearchDefaults> {
    let sections = if sections.is_empty() {
        config.sections.clone()
    } else {
        sections
    };
    index.check_sections(&sections)?;
    Ok(SearchDefaults {
        sections,
        limit: config.limit,
    })
}

async fn serve(config: &SearchConfig, index: Option<PathBuf>) -> anyhow::Result<()> {
    tracing::info!("Starting doxysearch MCP server");

    let index = Arc::new(open_index(config, index).await?);
    let defaults = defaults(config, Vec::new(), &index)?;

    let server = IndexServer::new(index, defaults);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}

/// One query per line. Each line supersedes the one before it; only the
/// latest query's results are printed.
async fn interactive(
    index: Arc<SearchIndex>,
    defaults: SearchDefaults,
    config: &SearchConfig,
) -> anyhow::Result<()> {
    let session = Arc::new(SearchSession::new(index, config.debounce()));
    session
        .set_sections(defaults.resolve_sections(session.index()))
        .await?;

    let limit = defaults.limit;
    let mut last = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(rest) = line.strip_prefix(":sections") {
            let mut sections: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
            if sections.is_empty() {
                sections = defaults.resolve_sections(session.index());
            }
            match session.set_sections(sections).await {
                Ok(()) => eprintln!("Searching {:?}", session.sections().await),
                Err(e) => eprintln!("{}", e),
            }
            continue;
        }

        let session = Arc::clone(&session);
        last = Some(tokio::spawn(async move {
            match session.search(&line).await {
                SearchOutcome::Resolved(delivery) if !delivery.normalized.is_empty() => {
                    let sections = session.sections().await;
                    println!(
                        "{}",
                        render_results(&delivery.query, &sections, &delivery.results, limit)
                    );
                }
                SearchOutcome::Resolved(_) => {}
                SearchOutcome::Superseded { seq } => {
                    tracing::debug!("Query #{} superseded", seq);
                }
            }
        }));
    }

    // Let the last query settle before exiting
    if let Some(handle) = last {
        handle.await?;
    }
    Ok(())
}
