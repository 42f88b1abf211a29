//! Reply rendering for chat commands.

use super::command::ChatCommand;
use crate::engine::{EngineError, KnowledgeEngine};

/// Reply to `/start`.
pub const WELCOME_TEXT: &str = "👋 नमस्ते! मैं Priyanka हूँ ❤️

तुम्हारी Hindi-English AI दोस्त 🤖
मैं बातें कर सकती हूँ, याद रख सकती हूँ, और सीख सकती हूँ!

Commands:
/start - यह message दिखाएं
/learn question|answer - मुझे कुछ सिखाओ
/knowledge - मैं क्या-क्या जानती हूँ
/forget question - कुछ भूल जाओ
/help - सभी commands

अब बताओ, कैसे हो? 😊";

/// Reply to `/help`.
pub const HELP_TEXT: &str = "🤖 Priyanka Bot Help

Basic Commands:
/start - Welcome message
/help - This help message

Learning Commands:
/learn question|answer - Teach me something
/forget question - Make me forget something
/knowledge - Show what I know

Examples:
/learn What is 2+2?|2+2 equals 4! 😊
/learn तुम कौन हो?|मैं Priyanka हूँ! ❤️
/forget What is 2+2?

Just chat normally! मैं हिंदी और English दोनों समझती हूँ 💕";

const LEARN_FAILED: &str = "❌ कुछ error आया। फिर try करो।";
const FORGET_MISSED: &str = "❌ वो question मिला नहीं";

/// Turns chat text into engine calls and reply text.
#[derive(Debug, Clone)]
pub struct ChatBot {
    engine: KnowledgeEngine,
}

impl ChatBot {
    #[must_use]
    pub fn new(engine: KnowledgeEngine) -> Self {
        Self { engine }
    }

    /// Handle one incoming message from `actor_id` and produce the reply.
    ///
    /// Malformed commands produce a usage reply, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine's storage fails.
    pub async fn handle(&self, text: &str, actor_id: &str) -> Result<String, EngineError> {
        let command = match ChatCommand::parse(text) {
            Ok(command) => command,
            Err(usage) => return Ok(usage.to_string()),
        };

        match command {
            ChatCommand::Start => Ok(WELCOME_TEXT.to_string()),
            ChatCommand::Help => Ok(HELP_TEXT.to_string()),
            ChatCommand::Learn { question, answer } => {
                let outcome = self.engine.learn_new_response(&question, &answer).await?;
                if outcome.success {
                    Ok(format!("✅ सीख लिया!\n\nQ: {question}\nA: {answer}"))
                } else {
                    Ok(LEARN_FAILED.to_string())
                }
            }
            ChatCommand::Forget(question) => {
                if self.engine.forget(&question).await? {
                    Ok(format!("✅ भूल गई: {question}"))
                } else {
                    Ok(FORGET_MISSED.to_string())
                }
            }
            ChatCommand::Knowledge => {
                let stats = self.engine.statistics().await?;
                Ok(format!(
                    "📊 My Knowledge Base:\n\n\
                     • Total Responses: {}\n\
                     • Conversations: {}\n\
                     • Last Updated: {}\n\n\
                     Use /learn to teach me more! 💖",
                    stats.knowledge_count,
                    stats.conversation_count,
                    stats.last_updated_display()
                ))
            }
            ChatCommand::Message(message) => {
                tracing::info!(actor_id, message = %message, "Incoming chat message");
                let reply = self.engine.respond(&message, Some(actor_id)).await?;
                tracing::info!(actor_id, reply = %reply, "Chat reply");
                Ok(reply)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponderConfig;

    async fn bot() -> ChatBot {
        let engine = KnowledgeEngine::open_in_memory(&ResponderConfig::default())
            .await
            .unwrap();
        ChatBot::new(engine)
    }

    #[tokio::test]
    async fn test_start_and_help() {
        let bot = bot().await;
        assert_eq!(bot.handle("/start", "1").await.unwrap(), WELCOME_TEXT);
        assert_eq!(bot.handle("/help", "1").await.unwrap(), HELP_TEXT);
    }

    #[tokio::test]
    async fn test_learn_then_chat() {
        let bot = bot().await;

        let reply = bot
            .handle("/learn What is your name?|My name is Priyanka! ❤️", "1")
            .await
            .unwrap();
        assert!(reply.starts_with("✅ सीख लिया!"));
        assert!(reply.contains("Q: What is your name?"));

        let reply = bot.handle("what is your name", "1").await.unwrap();
        assert_eq!(reply, "My name is Priyanka! ❤️");
    }

    #[tokio::test]
    async fn test_learn_usage_reply() {
        let bot = bot().await;
        let reply = bot.handle("/learn no separator", "1").await.unwrap();
        assert_eq!(reply, "Please use format: /learn question|answer");
    }

    #[tokio::test]
    async fn test_learn_rejected_by_engine() {
        let bot = bot().await;
        // Survives command parsing but normalizes to empty.
        let reply = bot.handle("/learn ???|answer", "1").await.unwrap();
        assert_eq!(reply, LEARN_FAILED);
    }

    #[tokio::test]
    async fn test_forget_hit_and_miss() {
        let bot = bot().await;
        bot.handle("/learn What is 2+2?|4", "1").await.unwrap();

        assert_eq!(
            bot.handle("/forget What is 2+2?", "1").await.unwrap(),
            "✅ भूल गई: What is 2+2?"
        );
        assert_eq!(
            bot.handle("/forget What is 2+2?", "1").await.unwrap(),
            FORGET_MISSED
        );
    }

    #[tokio::test]
    async fn test_knowledge_stats() {
        let bot = bot().await;
        let reply = bot.handle("/knowledge", "1").await.unwrap();
        assert!(reply.contains("Total Responses: 0"));
        assert!(reply.contains("Last Updated: never"));

        bot.handle("/learn hi|hello", "1").await.unwrap();
        bot.handle("hi", "1").await.unwrap();
        let reply = bot.handle("/knowledge", "1").await.unwrap();
        assert!(reply.contains("Total Responses: 1"));
        assert!(reply.contains("Conversations: 1"));
    }

    #[tokio::test]
    async fn test_commands_are_not_logged_as_turns() {
        let bot = bot().await;
        bot.handle("/help", "1").await.unwrap();
        bot.handle("/learn a|b", "1").await.unwrap();
        bot.handle("/dance", "1").await.unwrap();

        let turns = bot.engine.recent_turns(Some("1"), 10).await.unwrap();
        assert!(turns.is_empty());
    }
}
