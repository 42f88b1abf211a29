//! Colored terminal output for the CLI front end.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::engine::Statistics;
use crate::store::KnowledgeEntry;

/// Maximum characters of an answer shown in listings.
const LIST_ANSWER_LEN: usize = 60;

/// Truncate to `max_chars` characters, adding an ellipsis if truncated.
///
/// Counts characters, not bytes, so Devanagari text is never split mid-codepoint.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return "...".to_string();
    }
    let head: String = s.chars().take(max_chars - 3).collect();
    format!("{head}...")
}

/// Print the REPL input prompt.
pub fn print_prompt() {
    print!("{} ", "you>".green().bold());
    let _ = io::stdout().flush();
}

/// Print a bot reply.
pub fn print_reply(reply: &str) {
    println!("{} {}", "bot>".magenta().bold(), reply);
    let _ = io::stdout().flush();
}

/// Print one entry as a listing line.
pub fn print_entry(entry: &KnowledgeEntry) {
    println!(
        "{} {} {} {}",
        format!("[{}]", entry.category).cyan(),
        entry.question.bold(),
        "->".dimmed(),
        truncate(&entry.answer, LIST_ANSWER_LEN)
    );
}

/// Print knowledge and conversation totals.
pub fn print_statistics(stats: &Statistics) {
    println!("{} {}", "Total Knowledge:".bold(), stats.knowledge_count);
    println!("{} {}", "Total Conversations:".bold(), stats.conversation_count);
    println!(
        "{} {}",
        "Last Updated:".bold(),
        stats.last_updated_display().dimmed()
    );
    let _ = io::stdout().flush();
}

/// Print a success confirmation.
pub fn print_ok(message: &str) {
    println!("{} {}", "[OK]".green().bold(), message);
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message.red());
}
