//! Photo lookup with name translation and fallback queries

use std::sync::Arc;

use eyre::Result;
use tracing::{debug, warn};

use super::{PhotoError, PhotoSearch};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts::PromptLoader;

const TRANSLATE_MAX_TOKENS: u32 = 100;

/// Translates attraction names to their English form via the LLM
pub struct NameTranslator {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl NameTranslator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: &PromptLoader) -> Result<Self> {
        debug!("NameTranslator::new: called");
        Ok(Self {
            llm,
            system_prompt: prompts.load("translate")?,
        })
    }

    /// Translate `name`, falling back to the input on any failure
    pub async fn translate(&self, name: &str) -> String {
        debug!(%name, "translate: called");
        let query = format!("Translate this Chinese attraction name to English: {}", name);
        let request = CompletionRequest::single(self.system_prompt.clone(), query, TRANSLATE_MAX_TOKENS);

        match self.llm.complete(request).await {
            Ok(response) => {
                let translated = response.text_or_empty().trim();
                if translated.is_empty() {
                    debug!("translate: empty translation, keeping original");
                    name.to_string()
                } else {
                    translated.to_string()
                }
            }
            Err(e) => {
                warn!(%name, error = %e, "translate: translation failed, keeping original");
                name.to_string()
            }
        }
    }
}

/// Finds photos for an attraction
///
/// Query order: `"<name> China Landmark"`, then `"<city> Architecture"`, then
/// the bare name. The first non-empty answer wins.
pub struct PhotoFinder {
    search: Arc<dyn PhotoSearch>,
    translator: Option<NameTranslator>,
}

impl PhotoFinder {
    pub fn new(search: Arc<dyn PhotoSearch>, translator: Option<NameTranslator>) -> Self {
        debug!(translate = translator.is_some(), "PhotoFinder::new: called");
        Self { search, translator }
    }

    pub async fn find(&self, name: &str, city: &str, count: usize) -> Result<Vec<String>, PhotoError> {
        debug!(%name, %city, count, "find: called");
        let translated = match self.translator {
            Some(ref t) => t.translate(name).await,
            None => name.to_string(),
        };

        let results = self
            .search
            .search(&format!("{} China Landmark", translated), count)
            .await?;
        if !results.is_empty() {
            return Ok(results);
        }

        if !city.is_empty() {
            debug!(%city, "find: falling back to city architecture");
            let results = self.search.search(&format!("{} Architecture", city), count).await?;
            if !results.is_empty() {
                return Ok(results);
            }
        }

        debug!(%translated, "find: falling back to bare name");
        self.search.search(&translated, count).await
    }
}
