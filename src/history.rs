//! Per-guild conversation history, one file per guild

use crate::{
    error::PersistenceError,
    llm::ChatMessageRole,
    persistent_state::{read_json, write_json},
};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Timestamp format for stored turns, in local time
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One message of a guild's conversation
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatTurn {
    #[serde(rename = "time")]
    pub timestamp: String,
    pub role: ChatMessageRole,
    /// Author display name, or the model name for assistant turns
    pub username: String,
    pub content: String,
}

impl ChatTurn {
    /// A turn stamped with the current local time
    pub fn now(role: ChatMessageRole, username: &str, content: &str) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIME_FORMAT).to_string(),
            role,
            username: username.to_owned(),
            content: content.to_owned(),
        }
    }
}

/// Guild id to conversation history.
///
/// Each guild's history is behind its own lock.  Whoever holds it owns the guild's history file
/// until they release it, so turns are appended and written in the order they are handled.
pub struct HistoryStore {
    data_dir: PathBuf,
    guilds: Mutex<HashMap<String, Arc<Mutex<GuildHistory>>>>,
}

impl HistoryStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            guilds: Mutex::new(HashMap::new()),
        }
    }

    fn path(&self, guild_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", guild_id))
    }

    /// The guild's history.  Lock it for as long as the history must not change underneath you.
    pub async fn guild(&self, guild_id: &str) -> Arc<Mutex<GuildHistory>> {
        self.guilds
            .lock()
            .await
            .entry(guild_id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(GuildHistory::new(self.path(guild_id)))))
            .clone()
    }

    /// Read a guild's history file directly.  Empty if there is none yet.
    pub async fn load(&self, guild_id: &str) -> Result<Vec<ChatTurn>, PersistenceError> {
        Ok(read_json(&self.path(guild_id)).await?.unwrap_or_default())
    }

    /// Overwrite a guild's history file directly.
    pub async fn save(&self, guild_id: &str, turns: &[ChatTurn]) -> Result<(), PersistenceError> {
        write_json(&self.path(guild_id), turns).await
    }
}

/// A single guild's history, read from disk on first use
pub struct GuildHistory {
    path: PathBuf,
    turns: Option<Vec<ChatTurn>>,
}

impl GuildHistory {
    fn new(path: PathBuf) -> Self {
        Self { path, turns: None }
    }

    async fn loaded(&mut self) -> Result<&mut Vec<ChatTurn>, PersistenceError> {
        if self.turns.is_none() {
            self.turns = Some(read_json(&self.path).await?.unwrap_or_default());
        }
        Ok(self.turns.get_or_insert_with(Vec::new))
    }

    pub async fn turns(&mut self) -> Result<&[ChatTurn], PersistenceError> {
        let turns = self.loaded().await?;
        Ok(turns.as_slice())
    }

    /// Rewrite the whole history file.
    pub async fn save(&mut self) -> Result<(), PersistenceError> {
        self.loaded().await?;
        write_json(&self.path, self.turns.as_deref().unwrap_or_default()).await
    }

    /// Add a turn and rewrite the file.  If the file cannot be written the turn is dropped
    /// again, so memory never holds turns the file is missing.
    pub async fn append(&mut self, turn: ChatTurn) -> Result<(), PersistenceError> {
        self.loaded().await?.push(turn);
        if let Err(e) = self.save().await {
            if let Some(turns) = &mut self.turns {
                turns.pop();
            }
            return Err(e);
        }
        Ok(())
    }

    pub async fn reset(&mut self) -> Result<(), PersistenceError> {
        self.turns = Some(Vec::new());
        self.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: ChatMessageRole, username: &str, content: &str) -> ChatTurn {
        ChatTurn {
            timestamp: "2024-05-01 12:30:00".to_string(),
            role,
            username: username.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn missing_history_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());

        assert!(store.load("1").await.unwrap().is_empty());
        assert!(store.guild("1").await.lock().await.turns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_keeps_turns_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        let turns = vec![
            turn(ChatMessageRole::user, "alice", "first"),
            turn(ChatMessageRole::assistant, "llama3", "second"),
            turn(ChatMessageRole::user, "bob", "세 번째 🎉"),
        ];

        store.save("1", &turns).await.unwrap();
        assert_eq!(store.load("1").await.unwrap(), turns);

        let reloaded = store.load("1").await.unwrap();
        store.save("1", &reloaded).await.unwrap();
        assert_eq!(store.load("1").await.unwrap(), turns);
    }

    #[tokio::test]
    async fn file_layout_matches_bot_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());

        store
            .save("9", &[turn(ChatMessageRole::user, "alice", "hi")])
            .await
            .unwrap();

        let contents = std::fs::read_to_string(dir.path().join("9.json")).unwrap();
        assert_eq!(
            contents,
            "[\n  {\n    \"time\": \"2024-05-01 12:30:00\",\n    \"role\": \"user\",\n    \"username\": \"alice\",\n    \"content\": \"hi\"\n  }\n]"
        );
    }

    #[tokio::test]
    async fn append_persists_after_existing_turns() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        store
            .save("1", &[turn(ChatMessageRole::user, "alice", "earlier")])
            .await
            .unwrap();

        let guild = store.guild("1").await;
        guild
            .lock()
            .await
            .append(turn(ChatMessageRole::assistant, "llama3", "later"))
            .await
            .unwrap();

        let contents: Vec<String> = store
            .load("1")
            .await
            .unwrap()
            .into_iter()
            .map(|turn| turn.content)
            .collect();
        assert_eq!(contents, ["earlier", "later"]);
    }

    #[tokio::test]
    async fn failed_append_is_not_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        let guild = store.guild("1").await;
        let mut guild = guild.lock().await;
        assert!(guild.turns().await.unwrap().is_empty());

        // A directory where the temporary file goes makes the write fail.
        let blocker = dir.path().join("1.json.new");
        std::fs::create_dir(&blocker).unwrap();
        let result = guild
            .append(turn(ChatMessageRole::user, "alice", "failed"))
            .await;
        assert!(matches!(result, Err(PersistenceError::Write { .. })));
        assert!(guild.turns().await.unwrap().is_empty());

        std::fs::remove_dir(&blocker).unwrap();
        guild
            .append(turn(ChatMessageRole::user, "alice", "second"))
            .await
            .unwrap();

        let contents: Vec<String> = store
            .load("1")
            .await
            .unwrap()
            .into_iter()
            .map(|turn| turn.content)
            .collect();
        assert_eq!(contents, ["second"]);
        assert_eq!(guild.turns().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reset_empties_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());

        let guild = store.guild("1").await;
        let mut guild = guild.lock().await;
        guild
            .append(turn(ChatMessageRole::user, "alice", "hi"))
            .await
            .unwrap();
        guild.reset().await.unwrap();

        assert!(guild.turns().await.unwrap().is_empty());
        assert!(store.load("1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        store
            .save("1", &[turn(ChatMessageRole::user, "alice", "hi")])
            .await
            .unwrap();

        let guild = store.guild("1").await;
        let mut guild = guild.lock().await;
        assert_eq!(guild.turns().await.unwrap().len(), 1);

        // Changes on disk after the first load are not picked up.
        std::fs::remove_file(dir.path().join("1.json")).unwrap();
        assert_eq!(guild.turns().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn guilds_share_one_history_per_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());

        assert!(Arc::ptr_eq(&store.guild("1").await, &store.guild("1").await));
        assert!(!Arc::ptr_eq(&store.guild("1").await, &store.guild("2").await));
    }

    #[tokio::test]
    async fn malformed_history_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.json"), r#"[{"role": "user"}]"#).unwrap();
        let store = HistoryStore::new(dir.path());

        assert!(matches!(
            store.load("1").await,
            Err(PersistenceError::Malformed { .. })
        ));
        assert!(matches!(
            store.guild("1").await.lock().await.turns().await,
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn timestamps_use_local_format() {
        let turn = ChatTurn::now(ChatMessageRole::user, "alice", "hi");
        assert!(chrono::NaiveDateTime::parse_from_str(&turn.timestamp, TIME_FORMAT).is_ok());
        assert_eq!(turn.timestamp.len(), "2024-05-01 12:30:00".len());
    }
}
