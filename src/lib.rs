//! Knowledge Responder - a bilingual Hindi/English bot that learns
//! question/answer pairs and answers by lexical similarity.

pub mod api;
pub mod chat;
pub mod config;
pub mod display;
pub mod engine;
pub mod matcher;
pub mod normalize;
pub mod store;
