// src/services/analysis.rs
use std::sync::Arc;

use tracing::{error, info};

use crate::checklist::ChecklistItem;
use crate::error::Result;
use crate::llm::{ChatMessage, PromptTemplate, TextGenerator};

/// Turns checklist items into a compliance analysis via the text generator.
pub struct AnalysisService {
    generator: Arc<dyn TextGenerator>,
    template: PromptTemplate,
}

impl AnalysisService {
    pub fn new(generator: Arc<dyn TextGenerator>, template: PromptTemplate) -> Self {
        Self {
            generator,
            template,
        }
    }

    /// The error is logged here; callers only decide whether to skip.
    pub async fn analyze(&self, items: &[ChecklistItem]) -> Result<String> {
        let prompt = self.template.render(items);

        match self.generator.generate(vec![ChatMessage::user(prompt)]).await {
            Ok(text) => {
                info!(
                    provider = self.generator.name(),
                    "Analysis received ({} chars)",
                    text.chars().count()
                );
                Ok(text)
            }
            Err(e) => {
                error!(provider = self.generator.name(), "Analysis failed: {}", e);
                Err(e)
            }
        }
    }
}
