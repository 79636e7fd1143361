use crate::content::layout::{
    is_legacy_suffix_match, nested_index_path, Layout, MATCHES_DIR, MATCH_LAYOUTS,
};
use crate::content::{ContentError, MatchArticle};
use crate::i18n::{Language, ResolutionOutcome, ResolverMetrics};
use crate::security::is_safe_segment;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Outcome of a language-aware lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved<T> {
    pub article: Option<T>,
    pub resolved_lang: Language,
    /// True when the caller did not get the language it asked for
    pub fallback: bool,
}

impl<T> Resolved<T> {
    pub fn is_found(&self) -> bool {
        self.article.is_some()
    }
}

/// Read-only view over a content root. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: Arc<PathBuf>,
    metrics: Arc<ResolverMetrics>,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
            metrics: Arc::new(ResolverMetrics::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metrics(&self) -> &ResolverMetrics {
        &self.metrics
    }

    /// Find the article for exactly `(id, lang)`.
    ///
    /// Tries each match layout in priority order and returns the first file
    /// that exists. `Ok(None)` when no layout has it.
    pub async fn locate_match(
        &self,
        id: &str,
        lang: Language,
    ) -> Result<Option<MatchArticle>, ContentError> {
        self.locate(id, lang, &MATCH_LAYOUTS).await
    }

    /// Same as [`locate_match`](Self::locate_match) but keeps the raw JSON,
    /// for parity checks that must see the file exactly as written.
    pub async fn locate_match_raw(
        &self,
        id: &str,
        lang: Language,
    ) -> Result<Option<Value>, ContentError> {
        self.locate(id, lang, &MATCH_LAYOUTS).await
    }

    /// Resolve a match for a reader, falling back through languages.
    ///
    /// 1. the requested language;
    /// 2. the canonical language;
    /// 3. legacy `*_<id>.json` discovery.
    ///
    /// A match that exists nowhere comes back with `article: None`.
    pub async fn resolve_match(
        &self,
        id: &str,
        requested: Language,
    ) -> Result<Resolved<MatchArticle>, ContentError> {
        if let Some(article) = self.locate_match(id, requested).await? {
            self.metrics.record(ResolutionOutcome::Direct);
            return Ok(Resolved {
                article: Some(article),
                resolved_lang: requested,
                fallback: false,
            });
        }

        let canonical = Language::canonical();
        if requested != canonical {
            if let Some(article) = self.locate_match(id, canonical).await? {
                debug!(
                    match_id = id,
                    requested = requested.code(),
                    "serving canonical article"
                );
                self.metrics.record(ResolutionOutcome::CanonicalFallback);
                return Ok(Resolved {
                    article: Some(article),
                    resolved_lang: canonical,
                    fallback: true,
                });
            }
        }

        let article = self.discover_legacy(id).await?;
        if article.is_some() {
            debug!(match_id = id, "serving legacy article");
            self.metrics.record(ResolutionOutcome::Legacy);
        } else {
            debug!(match_id = id, requested = requested.code(), "match not found");
            self.metrics.record(ResolutionOutcome::Miss);
        }

        Ok(Resolved {
            article,
            resolved_lang: canonical,
            fallback: true,
        })
    }

    /// Last resort for pre-localization content: any `matches/*_<id>.json`.
    /// When several files match, the lexicographically first one wins.
    pub async fn discover_legacy(&self, id: &str) -> Result<Option<MatchArticle>, ContentError> {
        if !is_safe_segment(id) {
            return Ok(None);
        }

        let dir = self.root.join(MATCHES_DIR);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ContentError::Io { path: dir, source }),
        };

        let mut candidates = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => return Err(ContentError::Io { path: dir, source }),
            };
            if let Some(name) = entry.file_name().to_str() {
                if is_legacy_suffix_match(name, id) {
                    candidates.push(entry.path());
                }
            }
        }
        candidates.sort();

        match candidates.first() {
            Some(path) => read_json(path).await,
            None => Ok(None),
        }
    }

    /// Languages that have their own file for this match.
    pub async fn available_languages(&self, id: &str) -> Result<Vec<Language>, ContentError> {
        let mut languages = Vec::new();
        if !is_safe_segment(id) {
            return Ok(languages);
        }

        for lang in Language::all_enabled() {
            if self.existing_path(id, lang, &MATCH_LAYOUTS).await?.is_some() {
                languages.push(lang);
            }
        }
        Ok(languages)
    }

    /// Write an accepted article to the preferred layout
    /// (`matches/<id>/index.<lang>.json`), creating directories as needed.
    pub async fn write_match(
        &self,
        id: &str,
        lang: Language,
        article: &Value,
    ) -> Result<PathBuf, ContentError> {
        let path = match nested_index_path(&self.root, id, lang) {
            Some(path) if is_safe_segment(id) => path,
            _ => {
                return Err(ContentError::Io {
                    path: self.root.join(MATCHES_DIR),
                    source: std::io::Error::new(
                        ErrorKind::InvalidInput,
                        format!("refusing to write unsafe match id '{}'", id),
                    ),
                })
            }
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ContentError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut body = serde_json::to_vec_pretty(article).map_err(|source| {
            ContentError::Malformed {
                path: path.clone(),
                source,
            }
        })?;
        body.push(b'\n');

        tokio::fs::write(&path, body)
            .await
            .map_err(|source| ContentError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }

    pub(crate) async fn locate<T: DeserializeOwned>(
        &self,
        key: &str,
        lang: Language,
        layouts: &[Layout],
    ) -> Result<Option<T>, ContentError> {
        if !is_safe_segment(key) {
            return Ok(None);
        }

        for layout in layouts {
            let Some(path) = (layout.path)(&self.root, key, lang) else {
                continue;
            };
            if let Some(value) = read_json(&path).await? {
                debug!(
                    key,
                    lang = lang.code(),
                    layout = layout.name,
                    "content located"
                );
                return Ok(Some(value));
            }
        }

        Ok(None)
    }

    async fn existing_path(
        &self,
        key: &str,
        lang: Language,
        layouts: &[Layout],
    ) -> Result<Option<PathBuf>, ContentError> {
        for layout in layouts {
            let Some(path) = (layout.path)(&self.root, key, lang) else {
                continue;
            };
            match tokio::fs::try_exists(&path).await {
                Ok(true) => return Ok(Some(path)),
                Ok(false) => {}
                Err(source) => return Err(ContentError::Io { path, source }),
            }
        }
        Ok(None)
    }
}

/// Read and parse a JSON file; a missing file is `Ok(None)`.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ContentError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ContentError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| ContentError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}
