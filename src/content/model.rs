//! Article and index shapes produced by the generation pipeline.
//!
//! Every struct keeps unknown keys in a flattened `extra` map so reading and
//! re-writing a file never drops fields this crate does not model
//! (`timeline`, `team_stats`, `players`, call-to-action blocks, ...).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A generated match recap in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArticle {
    pub frontmatter: Frontmatter,

    #[serde(rename = "match")]
    pub fixture: MatchInfo,

    #[serde(default)]
    pub sections: Vec<Section>,

    #[serde(default)]
    pub player_notes: Vec<PlayerNote>,

    #[serde(default)]
    pub data_limitations: Vec<String>,

    #[serde(default)]
    pub data_citations: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_provenance: Option<Value>,

    #[serde(default)]
    pub figures: Vec<Figure>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    pub title: String,
    pub description: String,
    pub date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub match_id: String,
    pub league: String,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Structured fixture facts. Never translated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    /// Either a start year or a label such as "2024/25"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team: Option<TeamRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team: Option<TeamRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A team given either as a bare name or as `{id, name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamRef {
    Name(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        name: String,
    },
}

impl TeamRef {
    pub fn name(&self) -> &str {
        match self {
            TeamRef::Name(name) => name,
            TeamRef::Detailed { name, .. } => name,
        }
    }
}

/// A score given either as `{home, away}` or as a display string ("2-1").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Goals {
        home: Option<u32>,
        away: Option<u32>,
    },
    Display(String),
}

impl Score {
    /// Human readable score, `None` when the structured form is incomplete.
    pub fn display(&self) -> Option<String> {
        match self {
            Score::Goals {
                home: Some(home),
                away: Some(away),
            } => Some(format!("{}-{}", home, away)),
            Score::Goals { .. } => None,
            Score::Display(text) if text.trim().is_empty() => None,
            Score::Display(text) => Some(text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullets: Option<Vec<String>>,
    /// Figure ids (or inline descriptors in older files)
    #[serde(default)]
    pub figures: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Vec<Claim>>,
}

impl Section {
    /// Ids of the figures this section points at.
    pub fn figure_ids(&self) -> impl Iterator<Item = &str> {
        self.figures.iter().filter_map(|figure| match figure {
            Value::String(id) => Some(id.as_str()),
            Value::Object(map) => map.get("id").and_then(Value::as_str),
            _ => None,
        })
    }

    pub fn claims(&self) -> &[Claim] {
        self.claims.as_deref().unwrap_or_default()
    }
}

/// A qualitative statement backed by verbatim data points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerNote {
    pub player: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub id: String,
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: String,
    pub width: u32,
    pub height: u32,
    pub kind: FigureKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureKind {
    Chart,
    Image,
    Heatmap,
    ShotMap,
    Table,
    /// Any kind this crate does not know; served as-is, rejected by validation
    #[serde(other)]
    Other,
}

impl MatchArticle {
    /// List every invariant violation in this article.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (s, section) in self.sections.iter().enumerate() {
            for (c, claim) in section.claims().iter().enumerate() {
                if claim.evidence.is_empty() {
                    problems.push(format!("sections[{}].claims[{}] has no evidence", s, c));
                }
            }
        }

        problems.extend(self.check_structure());
        problems
    }

    /// Numeric ranges, figure kinds and figure references. Evidence presence
    /// is left to [`check_invariants`](Self::check_invariants) so translation
    /// parity can report dropped evidence as its own failure.
    pub fn check_structure(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (s, section) in self.sections.iter().enumerate() {
            for (c, claim) in section.claims().iter().enumerate() {
                if !(0.0..=1.0).contains(&claim.confidence) {
                    problems.push(format!(
                        "sections[{}].claims[{}] confidence {} outside [0, 1]",
                        s, c, claim.confidence
                    ));
                }
            }
            for id in section.figure_ids() {
                if !self.figures.iter().any(|figure| figure.id == id) {
                    problems.push(format!(
                        "sections[{}] references unknown figure '{}'",
                        s, id
                    ));
                }
            }
        }

        for (p, note) in self.player_notes.iter().enumerate() {
            if let Some(rating) = note.rating {
                if !(0.0..=10.0).contains(&rating) {
                    problems.push(format!(
                        "player_notes[{}] rating {} outside [0, 10]",
                        p, rating
                    ));
                }
            }
        }

        for (f, figure) in self.figures.iter().enumerate() {
            if figure.width == 0 || figure.height == 0 {
                problems.push(format!("figures[{}] has a zero dimension", f));
            }
            if figure.kind == FigureKind::Other {
                problems.push(format!("figures[{}] has an unknown kind", f));
            }
        }

        problems
    }
}

/// Lightweight listing record from `content/index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchIndexEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub match_id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub league: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl MatchIndexEntry {
    /// Entry known only by id, used when no index file exists.
    pub fn skeleton(match_id: impl Into<String>) -> Self {
        let match_id = match_id.into();
        Self {
            title: String::new(),
            description: String::new(),
            date: String::new(),
            slug: match_id.clone(),
            match_id,
            teams: Vec::new(),
            league: String::new(),
            image: None,
        }
    }

    /// Overwrite display fields with those of a (possibly localized) article.
    pub fn localize_from(&mut self, article: &MatchArticle) {
        let fm = &article.frontmatter;
        self.title = fm.title.clone();
        self.description = fm.description.clone();
        self.date = fm.date.clone();
        self.league = fm.league.clone();
        self.teams = fm.teams.clone();
        if let Some(slug) = &fm.slug {
            self.slug = slug.clone();
        }
        if fm.hero_image.is_some() {
            self.image = fm.hero_image.clone();
        }
    }

    /// Case-insensitive keyword match over title, description, teams and league.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.league.to_lowercase().contains(&needle)
            || self
                .teams
                .iter()
                .any(|team| team.to_lowercase().contains(&needle))
    }
}

/// Older pipeline runs wrote numeric match ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
