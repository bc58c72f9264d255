//! ============================================================================
//! Note Types - Serializable note records for redb storage
//! ============================================================================

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Maximum tags on a single note
pub const MAX_TAGS: usize = 5;

/// A note owned by one wallet identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Owner's wallet address
    pub author: String,
    /// Unix millis
    pub created_at: i64,
    pub updated_at: i64,
    pub tags: Vec<String>,
}

impl Note {
    /// Case-insensitive match against title, content and tags
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// User input for creating or editing a note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Trim fields, drop blank and duplicate tags, and enforce limits
    pub fn normalized(self) -> Result<Self> {
        let title = self.title.trim().to_string();
        let content = self.content.trim().to_string();
        if title.is_empty() || content.is_empty() {
            bail!("Please provide both a title and content for your note");
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        if tags.len() > MAX_TAGS {
            bail!("A note can have at most {} tags, got {}", MAX_TAGS, tags.len());
        }

        Ok(Self {
            title,
            content,
            tags,
        })
    }
}

/// List ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteSort {
    #[default]
    Newest,
    Oldest,
    Updated,
    TitleAsc,
    TitleDesc,
}

impl NoteSort {
    pub fn label(&self) -> &'static str {
        match self {
            NoteSort::Newest => "Newest First",
            NoteSort::Oldest => "Oldest First",
            NoteSort::Updated => "Recently Updated",
            NoteSort::TitleAsc => "Title A-Z",
            NoteSort::TitleDesc => "Title Z-A",
        }
    }

    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        match self {
            NoteSort::Newest => b.created_at.cmp(&a.created_at),
            NoteSort::Oldest => a.created_at.cmp(&b.created_at),
            NoteSort::Updated => b.updated_at.cmp(&a.updated_at),
            NoteSort::TitleAsc => compare_titles(a, b),
            NoteSort::TitleDesc => compare_titles(b, a),
        }
    }
}

fn compare_titles(a: &Note, b: &Note) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

impl FromStr for NoteSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(NoteSort::Newest),
            "oldest" => Ok(NoteSort::Oldest),
            "updated" => Ok(NoteSort::Updated),
            "title-asc" | "title_asc" => Ok(NoteSort::TitleAsc),
            "title-desc" | "title_desc" => Ok(NoteSort::TitleDesc),
            _ => bail!(
                "Unknown sort '{}'. Valid values: newest, oldest, updated, title-asc, title-desc",
                s
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str, created_at: i64, updated_at: i64) -> Note {
        Note {
            id: title.to_string(),
            title: title.to_string(),
            content: "body".to_string(),
            author: "0x0".to_string(),
            created_at,
            updated_at,
            tags: vec!["Work".to_string()],
        }
    }

    #[test]
    fn test_draft_normalization() {
        let draft = NoteDraft::new("  Title ", "\n content \n")
            .with_tags(["a", " a ", "", "b", "  "])
            .normalized()
            .unwrap();
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.content, "content");
        assert_eq!(draft.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_draft_requires_title_and_content() {
        assert!(NoteDraft::new("  ", "content").normalized().is_err());
        assert!(NoteDraft::new("title", "").normalized().is_err());
    }

    #[test]
    fn test_draft_tag_limit() {
        let five = NoteDraft::new("t", "c").with_tags(["1", "2", "3", "4", "5"]);
        assert!(five.normalized().is_ok());
        let six = NoteDraft::new("t", "c").with_tags(["1", "2", "3", "4", "5", "6"]);
        assert!(six.normalized().is_err());
    }

    #[test]
    fn test_matches() {
        let n = note("Shopping List", 1, 1);
        assert!(n.matches("shopping"));
        assert!(n.matches("BODY"));
        assert!(n.matches("work"));
        assert!(n.matches(""));
        assert!(!n.matches("travel"));
    }

    #[test]
    fn test_sort_orders() {
        let mut notes = vec![note("b", 2, 9), note("A", 1, 5), note("c", 3, 7)];

        notes.sort_by(|a, b| NoteSort::Newest.compare(a, b));
        assert_eq!(notes.iter().map(|n| n.created_at).collect::<Vec<_>>(), vec![3, 2, 1]);

        notes.sort_by(|a, b| NoteSort::Oldest.compare(a, b));
        assert_eq!(notes.iter().map(|n| n.created_at).collect::<Vec<_>>(), vec![1, 2, 3]);

        notes.sort_by(|a, b| NoteSort::Updated.compare(a, b));
        assert_eq!(notes.iter().map(|n| n.updated_at).collect::<Vec<_>>(), vec![9, 7, 5]);

        notes.sort_by(|a, b| NoteSort::TitleAsc.compare(a, b));
        assert_eq!(notes.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(), vec!["A", "b", "c"]);

        notes.sort_by(|a, b| NoteSort::TitleDesc.compare(a, b));
        assert_eq!(notes.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(), vec!["c", "b", "A"]);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("title-asc".parse::<NoteSort>().unwrap(), NoteSort::TitleAsc);
        assert_eq!("Newest".parse::<NoteSort>().unwrap(), NoteSort::Newest);
        assert!("random".parse::<NoteSort>().is_err());
        assert_eq!(NoteSort::Updated.label(), "Recently Updated");
    }
}
