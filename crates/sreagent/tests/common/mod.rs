//! Common test utilities for sreagent integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Env vars that would leak real credentials into a test run
const CREDENTIAL_VARS: &[&str] = &[
    "SREAGENT_API_KEY",
    "AZURE_OPENAI_API_KEY",
    "AZURE_SUBSCRIPTION_ID",
    "AZURE_ACCESS_TOKEN",
];

/// Isolated home directory holding `.sreagent/`
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let config_dir = temp_dir.path().join(".sreagent");

        std::fs::create_dir_all(&config_dir)?;

        Ok(Self {
            temp_dir,
            config_dir,
        })
    }

    /// Path to a file in the config directory
    pub fn config_file(&self, name: &str) -> PathBuf {
        self.config_dir.join(name)
    }

    /// Command with HOME pointed at the test environment and credentials cleared
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sreagent"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("RUST_LOG");
        for var in CREDENTIAL_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write `config.json` with the given content
    pub fn write_config(&self, content: &str) -> anyhow::Result<()> {
        std::fs::write(self.config_file("config.json"), content)?;
        Ok(())
    }

    /// Config pointing the completion client at `api_base`
    pub fn create_config(&self, api_base: &str) -> anyhow::Result<()> {
        let config = format!(
            r#"{{
  "completion": {{ "kind": "openai", "api_key": "test-api-key", "api_base": "{}" }},
  "agent": {{ "model": "test-model", "completion_timeout_secs": 5, "tool_timeout_secs": 5 }}
}}"#,
            api_base
        );
        self.write_config(&config)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}

/// OpenAI-style chat completion body carrying `content`
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
