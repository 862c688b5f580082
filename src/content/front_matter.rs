//! Leading `Key: value` metadata lines of a content file.
//!
//! ```text
//! Tags: rust, web
//! Date: 2024-06-01
//! PublishDate: 2024-06-02 08:00
//! Featured: true
//! Draft: false
//!
//! # The title
//! Body starts here
//! ```

/// Metadata scanning never looks past this many lines, heading or not.
pub const MAX_HEADER_LINES: usize = 22;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub tags: Vec<String>,
    pub date: String,
    pub publish_date: String,
    pub draft: bool,
    pub featured: bool,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum HeaderKey {
    Tags,
    Date,
    PublishDate,
    Featured,
    Draft,
}

impl HeaderKey {
    fn from_name(name: &str) -> Option<HeaderKey> {
        match name.to_ascii_lowercase().as_str() {
            "tags" => Some(HeaderKey::Tags),
            "date" => Some(HeaderKey::Date),
            "publishdate" | "publish_date" => Some(HeaderKey::PublishDate),
            "featured" => Some(HeaderKey::Featured),
            "draft" => Some(HeaderKey::Draft),
            _ => None,
        }
    }
}

/// Splits raw file text into metadata, title and the markdown body.
///
/// `slug` is used as the title when the file has no level-1 heading. Parsing
/// never fails: unknown or malformed values fall back to empty/false.
pub fn parse_front_matter(slug: &str, raw: &str) -> FrontMatter {
    let lines: Vec<&str> = raw.split('\n').collect();

    let mut front_matter = FrontMatter {
        title: slug.to_string(),
        ..Default::default()
    };
    let mut title_line: Option<usize> = None;
    let mut last_header_line: Option<usize> = None;

    for (i, line) in lines.iter().enumerate().take(MAX_HEADER_LINES) {
        if let Some(title) = line.strip_prefix("# ") {
            front_matter.title = title.trim_end_matches('\r').to_string();
            title_line = Some(i);
            break;
        }

        let Some((key, value)) = extract_header_key_val(line) else {
            continue;
        };

        match key {
            HeaderKey::Tags => front_matter.tags.extend(extract_tags(value)),
            HeaderKey::Date => front_matter.date = value.to_string(),
            HeaderKey::PublishDate => front_matter.publish_date = value.to_string(),
            HeaderKey::Featured => front_matter.featured = parse_flag(value),
            HeaderKey::Draft => front_matter.draft = parse_flag(value),
        }
        last_header_line = Some(i);
    }

    let body_start = match (title_line, last_header_line) {
        (Some(i), _) => i + 1,
        (None, Some(i)) => i + 1,
        (None, None) => 0,
    };

    front_matter.body = if body_start < lines.len() {
        lines[body_start..].join("\n")
    } else {
        String::new()
    };

    front_matter
}

fn extract_header_key_val(line: &str) -> Option<(HeaderKey, &str)> {
    let (name, value) = line.split_once(':')?;
    let key = HeaderKey::from_name(name)?;
    Some((key, value.trim()))
}

fn extract_tags(tags_str: &str) -> Vec<String> {
    tags_str.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    value.trim().to_lowercase() == "true"
}

#[cfg(test)]
mod tests {
    use crate::test_data::{POST_PLAIN, POST_WITH_HEADER};

    use super::*;

    #[test]
    fn test_full_header() {
        let fm = parse_front_matter("blog-from-files", POST_WITH_HEADER);
        assert_eq!(fm.title, "Running a blog from a folder of text files");
        assert_eq!(fm.tags, ["self-hosting", "markdown", "notes"]);
        assert_eq!(fm.date, "2022-04-02");
        assert_eq!(fm.publish_date, "2022-04-02 12:05");
        assert!(fm.featured);
        assert!(!fm.draft);
        assert!(fm.body.starts_with("Why keep a blog in plain files?"));
        assert!(!fm.body.contains("# Running a blog"));
    }

    #[test]
    fn test_no_header_defaults() {
        let fm = parse_front_matter("plain-notes", POST_PLAIN);
        assert_eq!(fm.title, "plain-notes");
        assert!(fm.tags.is_empty());
        assert!(fm.date.is_empty());
        assert!(fm.publish_date.is_empty());
        assert!(!fm.featured);
        assert!(!fm.draft);
        assert_eq!(fm.body, POST_PLAIN);
    }

    #[test]
    fn test_repeated_tags_accumulate() {
        let fm = parse_front_matter("a", "Tags: rust, web\nTags: notes\n# T\n");
        assert_eq!(fm.tags, ["rust", "web", "notes"]);
    }

    #[test]
    fn test_heading_only() {
        let fm = parse_front_matter("slug", "# Hello\nworld\n");
        assert_eq!(fm.title, "Hello");
        assert_eq!(fm.body, "world\n");
    }

    #[test]
    fn test_keys_are_case_insensitive_and_order_free() {
        let a = parse_front_matter("a", "draft: TRUE\nTAGS: x\npublish_date: 2030-01-01 10:00\n# T\n");
        let b = parse_front_matter("a", "publishdate: 2030-01-01 10:00\nTags:x\nDraft:true\n# T\n");
        assert_eq!(a.tags, ["x"]);
        assert!(a.draft);
        assert_eq!(a.publish_date, "2030-01-01 10:00");
        assert_eq!(a.tags, b.tags);
        assert_eq!(a.draft, b.draft);
        assert_eq!(a.publish_date, b.publish_date);
    }

    #[test]
    fn test_stops_at_heading() {
        let fm = parse_front_matter("s", "Tags: a\n# Title\nDraft: true\nFeatured: true\n");
        assert_eq!(fm.title, "Title");
        assert!(!fm.draft);
        assert!(!fm.featured);
        assert_eq!(fm.body, "Draft: true\nFeatured: true\n");
    }

    #[test]
    fn test_body_after_last_header_without_heading() {
        let fm = parse_front_matter("s", "Date: 2024-01-01\nTags: a, b\nSome text\nMore text");
        assert_eq!(fm.title, "s");
        assert_eq!(fm.date, "2024-01-01");
        assert_eq!(fm.body, "Some text\nMore text");
    }

    #[test]
    fn test_scan_is_bounded() {
        let mut raw = String::new();
        for _ in 0..30 {
            raw.push_str("filler\n");
        }
        raw.push_str("Draft: true\n# Late title\n");
        let fm = parse_front_matter("bounded", &raw);
        assert_eq!(fm.title, "bounded");
        assert!(!fm.draft);
        assert_eq!(fm.body, raw);
    }

    #[test]
    fn test_extract_tags() {
        assert_eq!(extract_tags(" one, two ,,three ,  "), ["one", "two", "three"]);
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn test_flags() {
        assert!(parse_flag(" True "));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_unrelated_colon_lines_are_body() {
        let fm = parse_front_matter("s", "Note: this is not metadata\n# T\n");
        assert_eq!(fm.title, "T");
        assert_eq!(fm.body, "");
    }

    #[test]
    fn test_crlf_title() {
        let fm = parse_front_matter("s", "Tags: a\r\n# Windows\r\nbody\r\n");
        assert_eq!(fm.title, "Windows");
        assert_eq!(fm.tags, ["a"]);
    }
}
