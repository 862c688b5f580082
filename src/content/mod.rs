use chrono::{NaiveDate, NaiveDateTime};

use crate::text_utils::{parse_date, parse_publish_date};

pub mod content_file;
pub mod front_matter;
pub mod markdown_renderer;
pub mod repository;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentKind {
    Post,
    Page,
}

/// Public visibility of a record, decided once when the file is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visibility {
    Published,
    Draft,
    Scheduled(NaiveDateTime),
}

impl Visibility {
    /// `now` is UTC wall-clock time. An unparseable publish date never hides a post.
    pub fn derive(kind: ContentKind, draft: bool, publish_date: &str, now: NaiveDateTime) -> Visibility {
        if draft {
            return Visibility::Draft;
        }
        if kind == ContentKind::Page {
            return Visibility::Published;
        }

        match parse_publish_date(publish_date) {
            Some(at) if at > now => Visibility::Scheduled(at),
            _ => Visibility::Published,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Published)
    }
}

/// One parsed content file. Pages leave `tags`, `publish_date` and `featured` empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub slug: String,
    pub title: String,
    pub tags: Vec<String>,
    pub date: String,
    pub publish_date: String,
    pub visibility: Visibility,
    pub featured: bool,
    pub body_html: String,
    pub plain_text: String,
}

impl ContentRecord {
    pub fn published_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub title: String,
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_visibility() {
        assert_eq!(Visibility::derive(ContentKind::Post, false, "", now()), Visibility::Published);
        assert_eq!(Visibility::derive(ContentKind::Post, true, "", now()), Visibility::Draft);
        assert_eq!(Visibility::derive(ContentKind::Post, false, "2024-01-01 10:00", now()), Visibility::Published);
        assert_eq!(Visibility::derive(ContentKind::Post, false, "not a date", now()), Visibility::Published);

        let future = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap().and_hms_opt(12, 1, 0).unwrap();
        assert_eq!(Visibility::derive(ContentKind::Post, false, "2025-03-10 12:01", now()), Visibility::Scheduled(future));
        assert_eq!(Visibility::derive(ContentKind::Post, false, "2025-03-10 12:00", now()), Visibility::Published);
    }

    #[test]
    fn test_draft_wins_over_schedule() {
        assert_eq!(Visibility::derive(ContentKind::Post, true, "2099-01-01 00:00", now()), Visibility::Draft);
    }

    #[test]
    fn test_pages_are_never_scheduled() {
        assert_eq!(Visibility::derive(ContentKind::Page, false, "2099-01-01 00:00", now()), Visibility::Published);
        assert_eq!(Visibility::derive(ContentKind::Page, true, "", now()), Visibility::Draft);
    }

    #[test]
    fn test_has_tag_ignores_case() {
        let record = ContentRecord {
            slug: "s".to_string(),
            title: "t".to_string(),
            tags: vec!["Rust".to_string(), "web".to_string()],
            date: "2024-01-01".to_string(),
            publish_date: String::new(),
            visibility: Visibility::Published,
            featured: false,
            body_html: String::new(),
            plain_text: String::new(),
        };
        assert!(record.has_tag("rust"));
        assert!(record.has_tag("WEB"));
        assert!(!record.has_tag("go"));
        assert_eq!(record.published_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
    }
}
