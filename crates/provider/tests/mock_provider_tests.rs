//! Mock Provider Tests
//!
//! Exercises `complete()` against a mockall `Provider`.

use async_trait::async_trait;
use mockall::mock;
use sreagent_provider::{
    complete, ChatParams, ChatResponse, CompletionOptions, PromptTemplate, Provider, ProviderError,
};
use std::collections::HashMap;
use std::time::Duration;

mock! {
    pub Provider {}

    #[async_trait]
    impl Provider for Provider {
        async fn chat(&self, params: ChatParams) -> Result<ChatResponse, ProviderError>;
        fn default_model(&self) -> String;
        fn is_configured(&self) -> bool;
    }
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_complete_sends_rendered_prompt_with_options() {
    let mut mock = MockProvider::new();

    mock.expect_chat()
        .times(1)
        .withf(|params| {
            params.model == "gpt-4-turbo"
                && params.temperature == 0.2
                && params.max_tokens == 1500
                && params.messages.len() == 1
                && params.messages[0].role == "user"
                && params.messages[0].content == "User query: app is down"
        })
        .returning(|_| Ok(ChatResponse::text("Which region?")));

    let template = PromptTemplate::new("User query: {{$userInput}}");
    let text = complete(
        &mock,
        &template,
        &params(&[("userInput", "app is down")]),
        &CompletionOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(text, "Which region?");
}

#[tokio::test]
async fn test_complete_propagates_provider_error() {
    let mut mock = MockProvider::new();
    mock.expect_chat()
        .times(1)
        .returning(|_| Err(ProviderError::RateLimited));

    let result = complete(
        &mock,
        &PromptTemplate::new("x"),
        &HashMap::new(),
        &CompletionOptions::default(),
    )
    .await;

    assert!(matches!(result, Err(ProviderError::RateLimited)));
}

#[tokio::test]
async fn test_complete_empty_content_is_empty_text() {
    let mut mock = MockProvider::new();
    mock.expect_chat().times(1).returning(|_| {
        Ok(ChatResponse {
            content: None,
            finish_reason: "stop".to_string(),
            usage: Default::default(),
        })
    });

    let text = complete(
        &mock,
        &PromptTemplate::new("x"),
        &HashMap::new(),
        &CompletionOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(text, "");
}

struct SlowProvider;

#[async_trait]
impl Provider for SlowProvider {
    async fn chat(&self, _params: ChatParams) -> Result<ChatResponse, ProviderError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(ChatResponse::text("too late"))
    }

    fn default_model(&self) -> String {
        "slow".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn test_complete_times_out() {
    let options = CompletionOptions {
        timeout: Duration::from_millis(20),
        ..Default::default()
    };

    let result = complete(
        &SlowProvider,
        &PromptTemplate::new("x"),
        &HashMap::new(),
        &options,
    )
    .await;

    assert!(matches!(result, Err(ProviderError::Timeout(_))));
}

#[test]
fn test_mock_provider_is_configured() {
    let mut mock = MockProvider::new();
    mock.expect_is_configured().times(1).returning(|| true);
    assert!(mock.is_configured());
}
