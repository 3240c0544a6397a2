use crate::{
    history::ChatTurn,
    llm::{ChatMessage, ChatMessageRole},
};

/// Build the messages for a chat request from a guild's stored history.
///
/// An optional leading system message carries the prompt, followed by every stored turn in
/// order.  Timestamps and usernames are only kept on disk; the model sees role and content.  The
/// whole history is sent every time, without trimming it to any context size.
pub fn assemble(history: &[ChatTurn], system_prompt: Option<&str>) -> Vec<ChatMessage> {
    let system = system_prompt
        .filter(|prompt| !prompt.is_empty())
        .map(|prompt| ChatMessage {
            role: ChatMessageRole::system,
            content: prompt.to_owned(),
        });

    system
        .into_iter()
        .chain(history.iter().map(|turn| ChatMessage {
            role: turn.role,
            content: turn.content.clone(),
        }))
        .collect()
}
