//! Per-guild bot settings, stored together in a single file

use crate::{
    error::{PersistenceError, SettingsError},
    persistent_state::{read_json, write_json},
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

const SETTINGS_FILE_NAME: &str = "server_setting.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GuildSetting {
    /// Base URL of the inference server, e.g. `http://localhost:11434`
    #[serde(rename = "ollama_url", default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    /// Models the server reported when `endpoint_url` was last set
    #[serde(default)]
    pub available_models: Vec<String>,
    #[serde(rename = "model", default, skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl GuildSetting {
    /// The system prompt, if one is set and non-empty
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref().filter(|prompt| !prompt.is_empty())
    }
}

/// Guild id to settings
pub struct SettingsStore {
    path: PathBuf,
    settings: BTreeMap<String, GuildSetting>,
}

impl SettingsStore {
    pub async fn load(data_dir: &Path) -> Result<Self, PersistenceError> {
        let path = data_dir.join(SETTINGS_FILE_NAME);
        let settings = read_json(&path).await?.unwrap_or_default();
        Ok(Self { path, settings })
    }

    pub async fn save(&self) -> Result<(), PersistenceError> {
        write_json(&self.path, &self.settings).await
    }

    pub fn get(&self, guild_id: &str) -> Option<&GuildSetting> {
        self.settings.get(guild_id)
    }

    /// Store the endpoint along with the models it reported.  An empty list still saves the
    /// endpoint.
    ///
    /// See `PersistentState::set_endpoint` for querying the server first.
    pub async fn set_endpoint(
        &mut self,
        guild_id: &str,
        url: &str,
        available_models: Vec<String>,
    ) -> Result<&[String], PersistenceError> {
        let setting = self.settings.entry(guild_id.to_owned()).or_default();
        setting.endpoint_url = Some(url.to_owned());
        setting.available_models = available_models;
        self.save().await?;

        Ok(&self.settings[guild_id].available_models)
    }

    pub async fn set_model(&mut self, guild_id: &str, model: &str) -> Result<(), SettingsError> {
        let setting = self
            .settings
            .get_mut(guild_id)
            .ok_or(SettingsError::NotConfigured)?;

        if !setting.available_models.iter().any(|m| m == model) {
            return Err(SettingsError::UnknownModel {
                model: model.to_owned(),
                available: setting.available_models.clone(),
            });
        }

        setting.selected_model = Some(model.to_owned());
        self.save().await?;
        Ok(())
    }

    pub async fn set_system_prompt(
        &mut self,
        guild_id: &str,
        prompt: &str,
    ) -> Result<(), PersistenceError> {
        self.settings
            .entry(guild_id.to_owned())
            .or_default()
            .system_prompt = Some(prompt.to_owned());
        self.save().await
    }

    pub fn system_prompt(&self, guild_id: &str) -> Option<&str> {
        self.get(guild_id).and_then(GuildSetting::system_prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(dir.path()).await.unwrap();
        assert!(store.get("1").is_none());
        assert!(store.system_prompt("1").is_none());
    }

    #[tokio::test]
    async fn set_endpoint_stores_models() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path()).await.unwrap();

        let found = store
            .set_endpoint("1", "http://localhost:11434", models(&["llama3", "qwen2"]))
            .await
            .unwrap();
        assert_eq!(found, ["llama3", "qwen2"]);

        let reloaded = SettingsStore::load(dir.path()).await.unwrap();
        let setting = reloaded.get("1").unwrap();
        assert_eq!(
            setting.endpoint_url.as_deref(),
            Some("http://localhost:11434")
        );
        assert_eq!(setting.available_models, ["llama3", "qwen2"]);
    }

    #[tokio::test]
    async fn set_endpoint_keeps_url_when_no_models_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path()).await.unwrap();

        store
            .set_endpoint("1", "http://localhost:11434", models(&["llama3"]))
            .await
            .unwrap();
        let found = store
            .set_endpoint("1", "http://unreachable", Vec::new())
            .await
            .unwrap();
        assert!(found.is_empty());

        let reloaded = SettingsStore::load(dir.path()).await.unwrap();
        let setting = reloaded.get("1").unwrap();
        assert_eq!(setting.endpoint_url.as_deref(), Some("http://unreachable"));
        assert!(setting.available_models.is_empty());
    }

    #[tokio::test]
    async fn set_model_requires_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path()).await.unwrap();

        let err = store.set_model("1", "llama3").await.unwrap_err();
        assert!(matches!(err, SettingsError::NotConfigured));
    }

    #[tokio::test]
    async fn set_model_validates_against_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path()).await.unwrap();
        store
            .set_endpoint("1", "http://x", models(&["llama3", "qwen2"]))
            .await
            .unwrap();

        match store.set_model("1", "mistral").await.unwrap_err() {
            SettingsError::UnknownModel { model, available } => {
                assert_eq!(model, "mistral");
                assert_eq!(available, ["llama3", "qwen2"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.get("1").unwrap().selected_model.is_none());

        store.set_model("1", "qwen2").await.unwrap();
        let reloaded = SettingsStore::load(dir.path()).await.unwrap();
        assert_eq!(
            reloaded.get("1").unwrap().selected_model.as_deref(),
            Some("qwen2")
        );
    }

    #[tokio::test]
    async fn prompt_only_guild_has_no_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path()).await.unwrap();

        store.set_system_prompt("1", "You are terse.").await.unwrap();
        assert_eq!(store.system_prompt("1"), Some("You are terse."));

        // A guild entry now exists, but without models nothing can be selected.
        let err = store.set_model("1", "llama3").await.unwrap_err();
        assert!(matches!(err, SettingsError::UnknownModel { .. }));
    }

    #[tokio::test]
    async fn empty_prompt_reads_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path()).await.unwrap();

        store.set_system_prompt("1", "").await.unwrap();
        assert!(store.system_prompt("1").is_none());
    }

    #[tokio::test]
    async fn file_layout_matches_bot_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::load(dir.path()).await.unwrap();
        store
            .set_endpoint("42", "http://x", models(&["llama3"]))
            .await
            .unwrap();
        store.set_model("42", "llama3").await.unwrap();
        store.set_system_prompt("42", "친절하게 답하세요").await.unwrap();
        store.set_system_prompt("7", "only a prompt").await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join(SETTINGS_FILE_NAME)).unwrap();
        assert!(contents.contains("친절하게 답하세요"));
        assert!(contents.contains("\n  \"42\": {\n    \"ollama_url\": \"http://x\","));

        let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "42": {
                    "ollama_url": "http://x",
                    "available_models": ["llama3"],
                    "model": "llama3",
                    "system_prompt": "친절하게 답하세요",
                },
                "7": {
                    "available_models": [],
                    "system_prompt": "only a prompt",
                },
            })
        );
    }

    #[tokio::test]
    async fn reads_settings_missing_optional_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            r#"{"5": {"system_prompt": "hi"}, "6": {"ollama_url": "http://y", "available_models": ["a"], "model": "a"}}"#,
        )
        .unwrap();

        let store = SettingsStore::load(dir.path()).await.unwrap();
        assert_eq!(store.system_prompt("5"), Some("hi"));
        assert!(store.get("5").unwrap().available_models.is_empty());
        assert_eq!(store.get("6").unwrap().selected_model.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn malformed_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE_NAME), "[1, 2").unwrap();

        let result = SettingsStore::load(dir.path()).await;
        assert!(matches!(result, Err(PersistenceError::Malformed { .. })));
    }
}
