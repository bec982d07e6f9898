use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tallyassist::api::{ApiServer, ApiServerConfig};
use tallyassist::assistant::Assistant;
use tallyassist::knowledge::KnowledgeBase;
use tallyassist::search::{HybridSearchEngine, SearchConfig};

#[derive(Parser)]
#[command(name = "tallyassist")]
#[command(about = "Conversational FAQ assistant for TallyPrime", long_about = None)]
struct Cli {
    /// Skip loading the embedding model (keyword-only search)
    #[arg(long, global = true)]
    keyword_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Search the FAQ knowledge base
    Search {
        /// Search query
        query: String,

        /// Maximum results to return
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Ask a question and print the generated answer
    Ask {
        /// The question to answer
        question: String,
    },

    /// List all FAQ records
    Faq,

    /// Show search engine statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tallyassist=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let config = ApiServerConfig {
                host,
                port,
                semantic_search: !cli.keyword_only,
            };
            ApiServer::new(config).start().await?;
        }

        Commands::Search { ref query, limit } => {
            let engine = build_engine(cli.keyword_only).await?;
            let results = engine.search(query, limit).await;

            if results.is_empty() {
                println!("No results for \"{}\"", query);
            }
            for (i, result) in results.iter().enumerate() {
                println!(
                    "{}. {} (score: {:.2}, similarity: {:.2}, match: {:?})",
                    i + 1,
                    result.record.question,
                    result.score,
                    result.similarity,
                    result.match_type
                );
                println!("   {}", result.record.answer);
            }
        }

        Commands::Ask { ref question } => {
            let engine = build_engine(cli.keyword_only).await?;
            let hits = engine.search(question, engine.config().default_limit).await;

            let assistant = Assistant::from_env();
            let response = assistant.answer_query(question, &hits).await;

            println!("{}", response.content);
            if let Some(steps) = response.metadata.steps {
                for step in steps {
                    println!("  {}. {}", step.step, step.description);
                }
            }
        }

        Commands::Faq => {
            let knowledge = KnowledgeBase::with_builtin()?;
            for record in knowledge.load_all() {
                println!("[{}] {}", record.category, record.question);
            }
        }

        Commands::Stats => {
            let engine = build_engine(cli.keyword_only).await?;
            let stats = engine.stats();
            println!("Total records:    {}", stats.total_items);
            println!("Embedded records: {}", stats.embedded_items);
            println!("Initialized:      {}", stats.is_initialized);
        }
    }

    Ok(())
}

async fn build_engine(keyword_only: bool) -> Result<HybridSearchEngine> {
    let knowledge = KnowledgeBase::with_builtin()?;

    let mut engine = if keyword_only {
        HybridSearchEngine::new(SearchConfig::default())
    } else {
        HybridSearchEngine::with_default_model(SearchConfig::default()).await
    };
    engine.initialize(knowledge.load_all().to_vec()).await;

    Ok(engine)
}
