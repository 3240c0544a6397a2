use crate::{
    error::PersistenceError, history::HistoryStore, llm::ModelClient, settings::SettingsStore,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::sync::RwLock;

/// State which persists across sessions
pub struct PersistentState {
    pub settings: RwLock<SettingsStore>,
    pub history: HistoryStore,
}

impl PersistentState {
    pub async fn load(data_dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let data_dir = data_dir.into();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|source| PersistenceError::Write {
                path: data_dir.clone(),
                source,
            })?;

        Ok(Self {
            settings: RwLock::new(SettingsStore::load(&data_dir).await?),
            history: HistoryStore::new(data_dir),
        })
    }

    /// Point a guild at an inference server and refresh its model list from it.
    ///
    /// The server is queried before the settings are locked, so a slow server only holds up
    /// this command.  Returns the models found, which is empty if the server could not be
    /// queried.  The endpoint is saved either way.
    pub async fn set_endpoint(
        &self,
        guild_id: &str,
        url: &str,
        llm: &dyn ModelClient,
    ) -> Result<Vec<String>, PersistenceError> {
        let available_models = llm.list_models(url).await;

        self.settings
            .write()
            .await
            .set_endpoint(guild_id, url, available_models)
            .await
            .map(<[String]>::to_vec)
    }
}

/// Read and parse a JSON file.  Ok(None) if the file does not exist.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Read {
                path: path.to_owned(),
                source,
            })
        }
    };

    serde_json::from_slice(&contents)
        .map(Some)
        .map_err(|source| PersistenceError::Malformed {
            path: path.to_owned(),
            source,
        })
}

/// Overwrite a file with pretty-printed JSON.
///
/// serde_json leaves non-ASCII characters as-is and indents with two spaces, so the files stay
/// human readable.
pub async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), PersistenceError> {
    let contents = serde_json::to_string_pretty(value).map_err(PersistenceError::Serialize)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PersistenceError::Write {
                path: parent.to_owned(),
                source,
            })?;
    }

    // Create a temporary file in the same directory.
    let tmp_path = path.with_extension("json.new");

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|source| PersistenceError::Write {
            path: tmp_path.clone(),
            source,
        })?;

    // Atomically rename the temporary file over the target file.
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|source| PersistenceError::Write {
            path: path.to_owned(),
            source,
        })
}
