//! Retrieval-grounded question answering over the author catalog.
//!
//! [`AuthorQa`] retrieves matching authors first, then asks the language
//! model to answer **from that context only**. The prompt is assembled
//! deterministically - each retrieved profile rendered in rank order inside
//! a numbered, delimited block - so any claim in the answer can be traced
//! back to the profile that produced it. When retrieval comes back empty the
//! prompt says so explicitly and generation still runs; the model is
//! instructed to report that nothing was found rather than invent authors.
//!
//! Retrieval succeeding and generation failing is a partial success: the
//! error carries the retrieved results so the caller can still surface them.

use std::sync::Arc;

use crate::authors::{AnsweredQuestion, AuthorFields, SearchResult};
use crate::config::Timeouts;
use crate::error::{Error, Result};
use crate::generation::LanguageModel;
use crate::retrieval::{RetrievalEngine, SearchOptions, DEFAULT_SCORE_THRESHOLD};
use crate::retry::with_timeout;

/// Default number of authors retrieved as context for a question.
pub const DEFAULT_ASK_K: usize = 3;

/// Upper bound on context size per question.
pub const MAX_ASK_K: usize = 20;

/// Line rendered into the prompt when retrieval found nothing.
const NO_MATCHING_AUTHORS: &str =
    "No matching authors were found in the catalog for this question.";

/// Parameters for a question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AskOptions {
    /// Number of authors to retrieve as context (1 to [`MAX_ASK_K`])
    pub k: usize,
    /// Minimum relevance a profile must reach to be used as context
    pub score_threshold: f32,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_ASK_K,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl AskOptions {
    /// Set the context size.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the minimum context relevance.
    #[must_use]
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self
    }
}

/// Answers questions about the catalog, grounded in retrieved author
/// profiles.
pub struct AuthorQa {
    engine: Arc<RetrievalEngine>,
    model: Arc<dyn LanguageModel>,
    timeouts: Timeouts,
}

impl AuthorQa {
    /// Wire a QA component from a retrieval engine and a language model.
    pub fn new(
        engine: Arc<RetrievalEngine>,
        model: Arc<dyn LanguageModel>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            engine,
            model,
            timeouts,
        }
    }

    /// Answer a question using retrieved author profiles as the only
    /// context.
    ///
    /// Returns the generated answer paired with the exact result sequence it
    /// was grounded in, in rank order, so the response is auditable.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidQuery`] on blank question text or out-of-range `k`
    /// - [`Error::Retrieval`] when retrieval itself failed
    /// - [`Error::AnswerGeneration`] when retrieval succeeded but generation
    ///   failed; carries the retrieved context
    pub async fn ask(&self, question: &str, options: &AskOptions) -> Result<AnsweredQuestion> {
        if question.trim().is_empty() {
            return Err(Error::invalid_query("question text must not be empty"));
        }
        if options.k < 1 || options.k > MAX_ASK_K {
            return Err(Error::invalid_query(format!(
                "top_k must be between 1 and {MAX_ASK_K}, got {}",
                options.k
            )));
        }

        let search = SearchOptions {
            k: options.k,
            score_threshold: options.score_threshold,
        };
        let context = self.engine.search(question, &search).await?;

        let prompt = build_qa_prompt(question, &context);
        match with_timeout(self.timeouts.generate, self.model.generate(&prompt)).await {
            Ok(answer) => {
                tracing::debug!(
                    model = self.model.model_id(),
                    context_len = context.len(),
                    "question answered"
                );
                Ok(AnsweredQuestion {
                    question: question.to_string(),
                    answer,
                    context,
                })
            }
            Err(err) => Err(Error::AnswerGeneration {
                source: Box::new(err),
                context,
            }),
        }
    }

    /// Generate a short profile summary for an author.
    pub async fn summarize_profile(&self, fields: &AuthorFields) -> Result<String> {
        let prompt = build_summary_prompt(fields);
        with_timeout(self.timeouts.generate, self.model.generate(&prompt))
            .await
            .map_err(|err| Error::AnswerGeneration {
                source: Box::new(err),
                context: Vec::new(),
            })
    }
}

/// Assemble the QA prompt: instructions, the retrieved profiles in rank
/// order (or an explicit no-matches line), then the question.
fn build_qa_prompt(question: &str, context: &[SearchResult]) -> String {
    let mut prompt = String::from(
        "You are answering questions about a catalog of authors. \
         Answer using only the author profiles listed below. \
         If the profiles do not contain the information needed, say that \
         you don't know. Never invent authors or facts.\n\nAuthor profiles:\n",
    );

    if context.is_empty() {
        prompt.push_str(NO_MATCHING_AUTHORS);
        prompt.push('\n');
    } else {
        for (rank, result) in context.iter().enumerate() {
            prompt.push_str(&format!(
                "[{}] Name: {}\nEmail: {}\nBio: {}\nExpertise: {}\n\n",
                rank + 1,
                result.author.name,
                result.author.email,
                result.author.bio,
                result.author.expertise,
            ));
        }
    }

    prompt.push_str(&format!("\nQuestion: {question}\nAnswer:"));
    prompt
}

/// Assemble the profile-summary prompt.
fn build_summary_prompt(fields: &AuthorFields) -> String {
    format!(
        "Review the following author profile and write a concise summary.\n\n\
         Name: {}\nBio: {}\nExpertise: {}\n\n\
         Write a 2-3 sentence summary highlighting this author's main \
         characteristics and contributions.",
        fields.name, fields.bio, fields.expertise
    )
}
