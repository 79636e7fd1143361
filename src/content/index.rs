use crate::content::layout::{match_id_from_entry, INDEX_FILE, MATCHES_DIR};
use crate::content::store::read_json;
use crate::content::{ContentError, ContentStore, MatchIndexEntry, Resolved};
use crate::i18n::Language;
use futures::stream::{self, Stream, StreamExt};
use std::collections::{BTreeSet, HashSet};
use std::io::ErrorKind;
use tracing::{debug, warn};

impl ContentStore {
    /// Every known match id, de-duplicated.
    ///
    /// Uses `index.json` when it exists and lists at least one entry,
    /// otherwise scans `matches/`.
    pub async fn list_match_ids(&self) -> Result<BTreeSet<String>, ContentError> {
        if let Some(entries) = self.read_index_file().await? {
            if !entries.is_empty() {
                return Ok(entries.into_iter().map(|entry| entry.match_id).collect());
            }
        }
        self.scan_match_ids().await
    }

    /// Raw listing entries in index order.
    ///
    /// Without an index file every scanned id becomes a skeleton entry that
    /// only carries its id; localization fills in the rest.
    pub async fn read_match_index(&self) -> Result<Vec<MatchIndexEntry>, ContentError> {
        if let Some(entries) = self.read_index_file().await? {
            if !entries.is_empty() {
                let mut seen = HashSet::new();
                return Ok(entries
                    .into_iter()
                    .filter(|entry| seen.insert(entry.match_id.clone()))
                    .collect());
            }
        }

        debug!("no usable index file, deriving listing from directory scan");
        Ok(self
            .scan_match_ids()
            .await?
            .into_iter()
            .map(MatchIndexEntry::skeleton)
            .collect())
    }

    /// Listing entries with display fields taken from the article in `lang`
    /// (or whatever language the fallback chain serves).
    ///
    /// The stream is lazy and recomputed on every call. An entry whose
    /// article is corrupt keeps its raw fields; an entry with neither an
    /// article nor a title is dropped.
    pub async fn read_match_index_localized(
        &self,
        lang: Language,
    ) -> Result<impl Stream<Item = MatchIndexEntry> + '_, ContentError> {
        let entries = self.read_match_index().await?;

        Ok(stream::iter(entries).filter_map(move |mut entry| async move {
            match self.resolve_match(&entry.match_id, lang).await {
                Ok(Resolved {
                    article: Some(article),
                    ..
                }) => {
                    entry.localize_from(&article);
                    Some(entry)
                }
                Ok(_) => (!entry.title.is_empty()).then_some(entry),
                Err(e) => {
                    warn!(match_id = %entry.match_id, "keeping raw index entry: {}", e);
                    (!entry.title.is_empty()).then_some(entry)
                }
            }
        }))
    }

    async fn read_index_file(&self) -> Result<Option<Vec<MatchIndexEntry>>, ContentError> {
        read_json(&self.root().join(INDEX_FILE)).await
    }

    async fn scan_match_ids(&self) -> Result<BTreeSet<String>, ContentError> {
        let dir = self.root().join(MATCHES_DIR);
        let mut ids = BTreeSet::new();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ids),
            Err(source) => return Err(ContentError::Io { path: dir, source }),
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => return Err(ContentError::Io { path: dir, source }),
            };
            let is_dir = match entry.file_type().await {
                Ok(file_type) => file_type.is_dir(),
                Err(source) => {
                    return Err(ContentError::Io {
                        path: entry.path(),
                        source,
                    })
                }
            };
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| match_id_from_entry(name, is_dir))
            {
                ids.insert(id);
            }
        }

        Ok(ids)
    }
}
