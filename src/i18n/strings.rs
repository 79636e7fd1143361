//! Localized strings surfaced by the API and `llms.txt`.
//!
//! Strings are stored raw. Placeholders use `{name}` and are filled with
//! [`LanguageStrings::fallback_notice_for`] or plain `str::replace`.

/// All localized user-facing strings for a language
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    /// Shown when the requested language is unavailable and another is served.
    /// Placeholders: {language}
    pub fallback_notice: &'static str,

    /// Body of the 404 payload for a missing match
    pub match_not_found: &'static str,

    /// Body of the 404 payload for a missing daily digest
    pub digest_not_found: &'static str,

    /// One-line description of the site used in `llms.txt`
    pub site_description: &'static str,

    /// Heading above the latest matches list
    pub latest_matches_heading: &'static str,

    /// Heading above the daily digest
    pub daily_digest_heading: &'static str,
}

impl LanguageStrings {
    pub const fn english() -> Self {
        Self {
            fallback_notice: "This article is not yet available in your language. Showing the {language} version.",
            match_not_found: "Match not found",
            digest_not_found: "Daily digest not found",
            site_description: "Data-driven football match recaps and daily digests with cited evidence.",
            latest_matches_heading: "Latest matches",
            daily_digest_heading: "Daily digest",
        }
    }

    pub const fn japanese() -> Self {
        Self {
            fallback_notice: "この記事はまだお使いの言語で公開されていません。{language}版を表示しています。",
            match_not_found: "試合が見つかりません",
            digest_not_found: "デイリーダイジェストが見つかりません",
            site_description: "根拠データ付きのサッカー試合レビューとデイリーダイジェスト。",
            latest_matches_heading: "最新の試合",
            daily_digest_heading: "デイリーダイジェスト",
        }
    }

    pub const fn chinese() -> Self {
        Self {
            fallback_notice: "本文暂未提供您所选语言的版本，当前显示{language}版本。",
            match_not_found: "未找到该比赛",
            digest_not_found: "未找到每日摘要",
            site_description: "基于数据与证据的足球比赛复盘和每日摘要。",
            latest_matches_heading: "最新比赛",
            daily_digest_heading: "每日摘要",
        }
    }

    /// Fill the fallback notice with the name of the language actually served.
    pub fn fallback_notice_for(&self, served_language_name: &str) -> String {
        self.fallback_notice
            .replace("{language}", served_language_name)
    }
}
