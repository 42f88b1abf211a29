//! Slash-command parsing for chat messages.

/// A parsed chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// `/learn question|answer`
    Learn { question: String, answer: String },
    /// `/forget question`
    Forget(String),
    /// `/knowledge`
    Knowledge,
    /// Anything that is not a command.
    Message(String),
}

/// A malformed command. The display text is the reply sent back to the user.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: /learn question|answer\nExample: /learn What is your name?|My name is Priyanka! ❤️")]
    LearnUsage,

    #[error("Please use format: /learn question|answer")]
    LearnFormat,

    #[error("Question and answer both are required")]
    LearnMissingField,

    #[error("Usage: /forget question\nExample: /forget What is your name?")]
    ForgetUsage,

    #[error("Unknown command /{0}. Use /help to see all commands.")]
    Unknown(String),
}

impl ChatCommand {
    /// Parse one incoming message.
    ///
    /// Command arguments are whitespace-collapsed; a `@botname` suffix on the
    /// command word is ignored.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for a known command with bad arguments or an
    /// unknown command.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Ok(Self::Message(trimmed.to_string()));
        };

        let (word, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let name = word.split('@').next().unwrap_or(word).to_lowercase();
        let args = args.split_whitespace().collect::<Vec<_>>().join(" ");

        match name.as_str() {
            "start" => Ok(Self::Start),
            "help" => Ok(Self::Help),
            "knowledge" => Ok(Self::Knowledge),
            "learn" => parse_learn(&args),
            "forget" if args.is_empty() => Err(CommandError::ForgetUsage),
            "forget" => Ok(Self::Forget(args)),
            _ => Err(CommandError::Unknown(name)),
        }
    }
}

fn parse_learn(args: &str) -> Result<ChatCommand, CommandError> {
    if args.is_empty() {
        return Err(CommandError::LearnUsage);
    }
    let (question, answer) = args.split_once('|').ok_or(CommandError::LearnFormat)?;
    let (question, answer) = (question.trim(), answer.trim());
    if question.is_empty() || answer.is_empty() {
        return Err(CommandError::LearnMissingField);
    }
    Ok(ChatCommand::Learn {
        question: question.to_string(),
        answer: answer.to_string(),
    })
}
