//! Localized content resolution.
//!
//! Generated articles live under a content root in one of several historical
//! layouts (see [`layout`]). [`ContentStore`] locates an article for an exact
//! `(id, language)` pair, falls back to the canonical language and then to
//! legacy discovery, and builds localized listings from the index.
//!
//! Absence is never an error here: a missing article is `Ok(None)`. Only an
//! existing file that cannot be read or parsed surfaces as [`ContentError`].

pub mod layout;
pub mod model;

mod index;
mod league;
mod store;

pub use league::LeagueOverview;
pub use model::{
    Claim, Figure, FigureKind, Frontmatter, MatchArticle, MatchIndexEntry, MatchInfo,
    PlayerNote, Score, Section, TeamRef,
};
pub use store::{ContentStore, Resolved};

use std::path::PathBuf;

/// Failures reading content that exists on disk.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The file exists but is not a valid document. The pipeline wrote
    /// something corrupt; this is never treated as "not found".
    #[error("malformed content file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
