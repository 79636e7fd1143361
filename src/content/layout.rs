//! Physical storage layouts for generated content.
//!
//! Content moved through several on-disk layouts over time. Each layout is a
//! pure function from `(root, id, lang)` to a candidate path; resolution walks
//! the tables below in order. A layout returns `None` when it cannot hold
//! that language (pre-localization files only ever held the canonical one).

use crate::i18n::Language;
use crate::security::is_safe_segment;
use std::path::{Path, PathBuf};

pub const MATCHES_DIR: &str = "matches";
pub const LEAGUES_DIR: &str = "leagues";
pub const INDEX_FILE: &str = "index.json";

/// A named candidate-path function.
#[derive(Clone, Copy)]
pub struct Layout {
    pub name: &'static str,
    pub path: fn(&Path, &str, Language) -> Option<PathBuf>,
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout").field("name", &self.name).finish()
    }
}

/// Match article layouts, highest priority first.
pub const MATCH_LAYOUTS: [Layout; 4] = [
    Layout {
        name: "nested-index",
        path: nested_index_path,
    },
    Layout {
        name: "flat-lang",
        path: flat_lang_path,
    },
    Layout {
        name: "nested-lang",
        path: nested_lang_path,
    },
    Layout {
        name: "legacy-flat",
        path: legacy_flat_path,
    },
];

/// League overview layouts, highest priority first.
pub const LEAGUE_LAYOUTS: [Layout; 3] = [
    Layout {
        name: "league-flat-lang",
        path: league_flat_lang_path,
    },
    Layout {
        name: "league-nested-lang",
        path: league_nested_lang_path,
    },
    Layout {
        name: "league-legacy",
        path: league_legacy_path,
    },
];

/// `matches/<id>/index.<lang>.json`
pub fn nested_index_path(root: &Path, id: &str, lang: Language) -> Option<PathBuf> {
    Some(
        root.join(MATCHES_DIR)
            .join(id)
            .join(format!("index.{}.json", lang.code())),
    )
}

/// `matches/<id>.<lang>.json`
pub fn flat_lang_path(root: &Path, id: &str, lang: Language) -> Option<PathBuf> {
    Some(
        root.join(MATCHES_DIR)
            .join(format!("{}.{}.json", id, lang.code())),
    )
}

/// `matches/<id>/<lang>.json`
pub fn nested_lang_path(root: &Path, id: &str, lang: Language) -> Option<PathBuf> {
    Some(
        root.join(MATCHES_DIR)
            .join(id)
            .join(format!("{}.json", lang.code())),
    )
}

/// `matches/<id>.json`, canonical language only.
pub fn legacy_flat_path(root: &Path, id: &str, lang: Language) -> Option<PathBuf> {
    lang.is_canonical()
        .then(|| root.join(MATCHES_DIR).join(format!("{}.json", id)))
}

/// `leagues/<league>.<lang>.json`
pub fn league_flat_lang_path(root: &Path, league: &str, lang: Language) -> Option<PathBuf> {
    Some(
        root.join(LEAGUES_DIR)
            .join(format!("{}.{}.json", league, lang.code())),
    )
}

/// `leagues/<league>/<lang>.json`
pub fn league_nested_lang_path(root: &Path, league: &str, lang: Language) -> Option<PathBuf> {
    Some(
        root.join(LEAGUES_DIR)
            .join(league)
            .join(format!("{}.json", lang.code())),
    )
}

/// `leagues/<league>.json`, canonical language only.
pub fn league_legacy_path(root: &Path, league: &str, lang: Language) -> Option<PathBuf> {
    lang.is_canonical()
        .then(|| root.join(LEAGUES_DIR).join(format!("{}.json", league)))
}

/// Whether `file_name` is a legacy `<anything>_<id>.json` file for `id`.
pub fn is_legacy_suffix_match(file_name: &str, id: &str) -> bool {
    file_name
        .strip_suffix(".json")
        .and_then(|stem| stem.strip_suffix(id))
        .map(|prefix| prefix.len() > 1 && prefix.ends_with('_'))
        .unwrap_or(false)
}

/// Derive a match id from an entry name inside `matches/`.
///
/// Directories are named after the id. `<id>.<lang>.json` files give the id
/// as written; bare legacy `<prefix>_<id>.json` files drop everything up to
/// the last `_`.
pub fn match_id_from_entry(name: &str, is_dir: bool) -> Option<String> {
    if name.starts_with('.') {
        return None;
    }
    if is_dir {
        return is_safe_segment(name).then(|| name.to_string());
    }

    let stem = name.strip_suffix(".json")?;
    let id = match stem.rsplit_once('.') {
        // `<id>.<lang>.json` names the id exactly
        Some((base, suffix)) if Language::from_code(suffix).is_ok() => base,
        _ => stem.rsplit_once('_').map(|(_, id)| id).unwrap_or(stem),
    };

    (is_safe_segment(id) && !id.contains('.')).then(|| id.to_string())
}
