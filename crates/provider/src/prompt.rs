//! Prompt templates and the single-call completion helper
//!
//! Templates use `{{$name}}` placeholders. Rendering is one pass of plain
//! text substitution: values are inserted verbatim, placeholders inside
//! inserted values are not expanded again, and names without a value
//! render as an empty string.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use crate::{ChatParams, Message, Provider, ProviderError, Result};

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\$([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("valid placeholder regex")
    })
}

/// Prompt text with named `{{$name}}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in placeholder_re().captures_iter(&self.text) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Substitute every placeholder from `params`
    pub fn render(&self, params: &HashMap<String, String>) -> String {
        placeholder_re()
            .replace_all(&self.text, |caps: &Captures| {
                params.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned()
    }
}

/// Per-call completion settings
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo".to_string(),
            temperature: 0.2,
            max_tokens: 1500,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Render `template` and run one completion, bounded by `options.timeout`
pub async fn complete(
    provider: &dyn Provider,
    template: &PromptTemplate,
    params: &HashMap<String, String>,
    options: &CompletionOptions,
) -> Result<String> {
    let prompt = template.render(params);
    debug!("◆ Prompt rendered ({} chars)", prompt.len());

    let chat = ChatParams {
        model: options.model.clone(),
        messages: vec![Message::user(prompt)],
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    };

    match tokio::time::timeout(options.timeout, provider.chat(chat)).await {
        Ok(response) => Ok(response?.into_text()),
        Err(_) => Err(ProviderError::Timeout(options.timeout.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_all_occurrences() {
        let template = PromptTemplate::new("{{$a}} and {{$b}} then {{$a}}");
        let out = template.render(&params(&[("a", "x"), ("b", "y")]));
        assert_eq!(out, "x and y then x");
    }

    #[test]
    fn test_render_missing_value_is_empty() {
        let template = PromptTemplate::new("Tool results: {{$toolResults}}|");
        assert_eq!(template.render(&HashMap::new()), "Tool results: |");
    }

    #[test]
    fn test_render_does_not_expand_inserted_values() {
        let template = PromptTemplate::new("User: {{$userInput}}");
        let out = template.render(&params(&[
            ("userInput", "{{$secret}}"),
            ("secret", "leaked"),
        ]));
        assert_eq!(out, "User: {{$secret}}");
    }

    #[test]
    fn test_render_leaves_json_braces_alone() {
        let template = PromptTemplate::new(r#"respond with {"action": "diagnose"} for {{$x}}"#);
        let out = template.render(&params(&[("x", "you")]));
        assert_eq!(out, r#"respond with {"action": "diagnose"} for you"#);
    }

    #[test]
    fn test_placeholders_in_order_without_duplicates() {
        let template = PromptTemplate::new("{{$b}} {{$a}} {{$b}} {{ $notone }}");
        assert_eq!(template.placeholders(), vec!["b", "a"]);
    }

    #[test]
    fn test_completion_options_default() {
        let options = CompletionOptions::default();
        assert_eq!(options.model, "gpt-4-turbo");
        assert_eq!(options.temperature, 0.2);
        assert_eq!(options.max_tokens, 1500);
        assert_eq!(options.timeout, Duration::from_secs(60));
    }
}
