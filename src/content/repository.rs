use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use spdlog::{debug, warn};

use crate::content::{ContentKind, ContentRecord, PageLink};
use crate::content::content_file::ContentFile;

/// A folder of markdown files, re-read on every call.
pub struct ContentRepository {
    pub root_dir: PathBuf,
    pub kind: ContentKind,
}

impl ContentRepository {
    pub fn posts(root_dir: &Path) -> Self {
        ContentRepository {
            root_dir: root_dir.to_path_buf(),
            kind: ContentKind::Post,
        }
    }

    pub fn pages(root_dir: &Path) -> Self {
        ContentRepository {
            root_dir: root_dir.to_path_buf(),
            kind: ContentKind::Page,
        }
    }

    /// `.md` files directly under the root folder.
    pub fn list_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = vec![];
        let entries = fs::read_dir(self.root_dir.as_path())?;
        for entry in entries.flatten() {
            if let Ok(file_type) = entry.file_type() {
                if !file_type.is_file() {
                    continue;
                }
                let path = entry.path();
                if ContentFile::slug_of(&path).is_some() {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Loads a single record regardless of its visibility.
    pub fn load(&self, slug: &str, now: NaiveDateTime) -> io::Result<ContentRecord> {
        if slug.is_empty() || slug.contains('/') || slug.contains('\\') || slug.contains("..") {
            return Err(io::Error::new(ErrorKind::NotFound, format!("Invalid slug {}", slug)));
        }

        let file_path = self.root_dir.join(format!("{}.md", slug));
        ContentFile::from_file(file_path)?.into_record(self.kind, now)
    }

    /// Every visible record in the folder. Files that fail to load are skipped.
    pub fn scan(&self, now: NaiveDateTime) -> Vec<ContentRecord> {
        let files = match self.list_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not list content in {}: {}", self.root_dir.display(), e);
                return vec![];
            }
        };

        let mut records = vec![];
        for file_path in files {
            let record = ContentFile::from_file(file_path.clone())
                .and_then(|file| file.into_record(self.kind, now));

            match record {
                Ok(record) if record.visibility.is_visible() => records.push(record),
                Ok(record) => debug!("Skipping {} ({:?})", record.slug, record.visibility),
                Err(e) => warn!("Skipping {}: {}", file_path.display(), e),
            }
        }

        records
    }

    /// Direct lookup used by the slug routes: drafts and scheduled posts are `NotFound`.
    ///
    /// Visibility is evaluated against `now` when the file is read, so a request
    /// racing the publish instant may see either outcome.
    pub fn find_visible(&self, slug: &str, now: NaiveDateTime) -> io::Result<ContentRecord> {
        let record = self.load(slug, now)?;
        if !record.visibility.is_visible() {
            return Err(io::Error::new(ErrorKind::NotFound, format!("{} is not published", slug)));
        }
        Ok(record)
    }

    /// Title and slug of each visible record, ordered by title.
    pub fn page_links(&self, now: NaiveDateTime) -> Vec<PageLink> {
        let mut links: Vec<PageLink> = self.scan(now)
            .into_iter()
            .map(|record| PageLink {
                title: record.title,
                slug: record.slug,
            })
            .collect();
        links.sort_by(|a, b| a.title.cmp(&b.title));
        links
    }
}
