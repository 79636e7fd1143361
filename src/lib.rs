//! GoalGazer: localized match recap content service and translation pipeline.

pub mod api;
pub mod config;
pub mod content;
pub mod db;
pub mod digest;
pub mod i18n;
pub mod llm;
pub mod retry;
pub mod security;
pub mod translation;
