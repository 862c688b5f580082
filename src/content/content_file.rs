use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::content::{ContentKind, ContentRecord, Visibility};
use crate::content::front_matter::parse_front_matter;
use crate::content::markdown_renderer::MarkdownRenderer;

pub const CONTENT_EXTENSION: &str = "md";

pub struct ContentFile {
    pub slug: String,
    pub file_path: PathBuf,
    pub raw_content: String,
}

impl ContentFile {
    pub fn from_file(file_path: PathBuf) -> io::Result<ContentFile> {
        let slug = match Self::slug_of(&file_path) {
            None => return Err(io::Error::new(ErrorKind::Unsupported, format!("Not a content file: {}", file_path.display()))),
            Some(slug) => slug,
        };

        let raw_content = fs::read_to_string(&file_path)?;

        Ok(ContentFile {
            slug,
            file_path,
            raw_content,
        })
    }

    /// File stem of a `.md` file, `None` for anything else.
    pub fn slug_of(file_path: &Path) -> Option<String> {
        if file_path.extension()?.to_str()? != CONTENT_EXTENSION {
            return None;
        }
        file_path.file_stem()?.to_str().map(str::to_string)
    }

    /// Parses front matter, renders the body and decides visibility.
    pub fn into_record(self, kind: ContentKind, now: NaiveDateTime) -> io::Result<ContentRecord> {
        let front_matter = parse_front_matter(&self.slug, &self.raw_content);
        let rendered = MarkdownRenderer::render(&front_matter.body)?;
        let visibility = Visibility::derive(kind, front_matter.draft, &front_matter.publish_date, now);

        let record = match kind {
            ContentKind::Post => ContentRecord {
                slug: self.slug,
                title: front_matter.title,
                tags: front_matter.tags,
                date: front_matter.date,
                publish_date: front_matter.publish_date,
                visibility,
                featured: front_matter.featured,
                body_html: rendered.html,
                plain_text: rendered.plain_text,
            },
            ContentKind::Page => ContentRecord {
                slug: self.slug,
                title: front_matter.title,
                tags: vec![],
                date: front_matter.date,
                publish_date: String::new(),
                visibility,
                featured: false,
                body_html: rendered.html,
                plain_text: rendered.plain_text,
            },
        };

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::test_data::POST_WITH_HEADER;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_slug_of() {
        assert_eq!(ContentFile::slug_of(Path::new("posts/hello-world.md")), Some("hello-world".to_string()));
        assert_eq!(ContentFile::slug_of(Path::new("posts/notes.txt")), None);
        assert_eq!(ContentFile::slug_of(Path::new("posts/README")), None);
    }

    #[test]
    fn test_post_record() {
        let file = ContentFile {
            slug: "blog-from-files".to_string(),
            file_path: PathBuf::from("blog-from-files.md"),
            raw_content: POST_WITH_HEADER.to_string(),
        };
        let record = file.into_record(ContentKind::Post, now()).unwrap();
        assert_eq!(record.slug, "blog-from-files");
        assert_eq!(record.title, "Running a blog from a folder of text files");
        assert_eq!(record.tags, ["self-hosting", "markdown", "notes"]);
        assert!(record.featured);
        assert_eq!(record.visibility, Visibility::Published);
        assert!(record.body_html.contains("<h2>The setup</h2>"));
    }

    #[test]
    fn test_page_record_drops_post_fields() {
        let file = ContentFile {
            slug: "about".to_string(),
            file_path: PathBuf::from("about.md"),
            raw_content: POST_WITH_HEADER.to_string(),
        };
        let record = file.into_record(ContentKind::Page, now()).unwrap();
        assert!(record.tags.is_empty());
        assert!(!record.featured);
        assert!(record.publish_date.is_empty());
        assert_eq!(record.visibility, Visibility::Published);
    }

    #[test]
    fn test_missing_file() {
        let err = ContentFile::from_file(PathBuf::from("/no/such/dir/post.md")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
