use anyhow::{anyhow, Result};

use crate::infra::ai::GenerativeClient;

#[derive(Clone)]
pub struct AssistantService {
    ai: GenerativeClient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImprovementMode {
    Enhance,
    Expand,
    Simplify,
}

impl ImprovementMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enhance" => Some(Self::Enhance),
            "expand" => Some(Self::Expand),
            "simplify" => Some(Self::Simplify),
            _ => None,
        }
    }
}

impl AssistantService {
    pub fn new(ai: GenerativeClient) -> Self {
        Self { ai }
    }

    /// Draft a post body from its title and optional category/tags.
    pub async fn generate_content(
        &self,
        title: &str,
        category: Option<&str>,
        tags: &[String],
    ) -> Result<String> {
        if title.trim().is_empty() {
            return Err(anyhow!("title is required to generate content"));
        }

        let category_line = category
            .filter(|c| !c.is_empty())
            .map(|c| format!("Category: {}\n", c))
            .unwrap_or_default();
        let tags_line = if tags.is_empty() {
            String::new()
        } else {
            format!("Tags: {}\n", tags.join(", "))
        };

        let prompt = format!(
            "Write a comprehensive blog post with the title: \"{title}\"\n\
             \n\
             {category_line}{tags_line}\
             \n\
             Requirements:\n\
             - Write engaging, informative content that matches the title\n\
             - Use proper HTML formatting with headers (h2, h3), paragraphs, lists, and emphasis\n\
             - Include 3-5 main sections with clear subheadings\n\
             - Write in a conversational yet professional tone\n\
             - Make it approximately 800-1200 words\n\
             - Include practical insights, examples, or actionable advice where relevant\n\
             - Use <h2> for main sections and <h3> for subsections\n\
             - Use <p> tags for paragraphs\n\
             - Use <ul> and <li> for bullet points when appropriate\n\
             - Use <strong> and <em> for emphasis\n\
             - Ensure the content is original and valuable to readers\n\
             \n\
             Do not include the title in the content as it will be added separately.\n\
             Start directly with the introduction paragraph.\n"
        );

        let content = self.ai.generate(&prompt).await?;
        if content.len() < 100 {
            return Err(anyhow!("generated content is too short or empty"));
        }
        Ok(content)
    }

    /// Rework an existing post body in one of three directions.
    pub async fn improve_content(&self, content: &str, mode: ImprovementMode) -> Result<String> {
        if content.trim().is_empty() {
            return Err(anyhow!("content is required for improvement"));
        }

        let prompt = match mode {
            ImprovementMode::Expand => format!(
                "Take this blog content and expand it with more details, examples, and insights:\n\
                 \n\
                 {content}\n\
                 \n\
                 Requirements:\n\
                 - Keep the existing structure and main points\n\
                 - Add more depth and detail to each section\n\
                 - Include practical examples and insights\n\
                 - Maintain the original tone and style\n\
                 - Return the improved content in the same HTML format\n"
            ),
            ImprovementMode::Simplify => format!(
                "Take this blog content and make it more concise and easier to read:\n\
                 \n\
                 {content}\n\
                 \n\
                 Requirements:\n\
                 - Keep all main points but make them clearer\n\
                 - Remove unnecessary complexity\n\
                 - Use simpler language where possible\n\
                 - Maintain the HTML formatting\n\
                 - Keep the essential information\n"
            ),
            ImprovementMode::Enhance => format!(
                "Improve this blog content by making it more engaging and well-structured:\n\
                 \n\
                 {content}\n\
                 \n\
                 Requirements:\n\
                 - Improve the flow and readability\n\
                 - Add engaging transitions between sections\n\
                 - Enhance with better examples or explanations\n\
                 - Maintain the original HTML structure\n\
                 - Keep the same length approximately\n\
                 - Make it more compelling to read\n"
            ),
        };

        let improved = self.ai.generate(&prompt).await?;
        if improved.len() < 50 {
            return Err(anyhow!("improved content is empty or too short"));
        }
        Ok(improved)
    }
}
