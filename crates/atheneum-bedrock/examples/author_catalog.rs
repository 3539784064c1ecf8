//! End-to-end catalog demo: register a few authors, search them
//! semantically, and ask a grounded question.
//!
//! Requires AWS credentials with Bedrock access (Titan embeddings + Nova):
//!
//! ```bash
//! AWS_REGION=us-east-2 cargo run --package atheneum-bedrock --example author_catalog
//! ```

use std::sync::Arc;

use atheneum::authors::AuthorFields;
use atheneum::catalog::CatalogRepository;
use atheneum::config::{Timeouts, VectorConfig};
use atheneum::embeddings::Embeddings;
use atheneum::generation::LanguageModel;
use atheneum::qa::{AskOptions, AuthorQa};
use atheneum::retrieval::{RetrievalEngine, SearchOptions};
use atheneum::retry::{with_retry, RetryPolicy};
use atheneum::vector_stores::{InMemoryVectorStore, VectorStore};
use atheneum_bedrock::{NovaTextModel, TitanEmbeddings};

#[tokio::main]
async fn main() -> atheneum::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = VectorConfig::default();
    let timeouts = Timeouts::default();

    let embeddings: Arc<dyn Embeddings> =
        Arc::new(TitanEmbeddings::from_env(&config).await);
    let model: Arc<dyn LanguageModel> = Arc::new(NovaTextModel::from_env().await);
    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new(config));

    let catalog = CatalogRepository::new(
        Arc::clone(&embeddings),
        Arc::clone(&store),
        config,
        timeouts,
    )?;
    let engine = Arc::new(RetrievalEngine::new(
        embeddings,
        store,
        config,
        timeouts,
    )?);
    let qa = AuthorQa::new(Arc::clone(&engine), model, timeouts);

    for (name, email, bio, expertise) in [
        (
            "Douglas Adams",
            "douglas.adams@example.com",
            "Comedic science fiction about improbable journeys through space.",
            "science fiction, humor",
        ),
        (
            "George Orwell",
            "george.orwell@example.com",
            "Dystopian futures where the state watches everything.",
            "dystopia, political fiction",
        ),
        (
            "Frank Herbert",
            "frank.herbert@example.com",
            "Epic sagas of power, religion, and ecology on desert worlds.",
            "science fiction, ecology",
        ),
    ] {
        let record = catalog
            .create(AuthorFields {
                name: name.to_string(),
                email: email.to_string(),
                bio: bio.to_string(),
                expertise: expertise.to_string(),
            })
            .await?;
        println!("registered {name} as {}", record.id);
    }

    let query = "dystopian surveillance states";
    let results = retry_search(&engine, query).await?;
    println!("\nsearch: {query:?}");
    for result in &results {
        println!("  {:.3}  {}", result.score, result.author.name);
    }

    let question = "Which of these authors should I read for political dystopias?";
    let answered = qa.ask(question, &AskOptions::default()).await?;
    println!("\nquestion: {question}");
    println!("answer: {}", answered.answer);
    println!("grounded in {} author(s)", answered.context.len());

    Ok(())
}

/// Search with the documented caller-side policy: bounded backoff on
/// throttling only.
async fn retry_search(
    engine: &RetrievalEngine,
    query: &str,
) -> atheneum::Result<Vec<atheneum::authors::SearchResult>> {
    let policy = RetryPolicy::exponential(3);
    let options = SearchOptions::default();
    with_retry(&policy, || engine.search(query, &options)).await
}
