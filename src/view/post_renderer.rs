use std::io;

use ramhorns::Template;

use crate::content::ContentRecord;
use crate::text_utils::reading_time;
use crate::view::{parse_template, view_tags, ViewTag};

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    title: &'a str,
    slug: &'a str,
    tags: Vec<ViewTag<'a>>,
    has_tags: bool,
    date: &'a str,
    publish_date: &'a str,
    reading_time: String,
    featured: bool,
    content: &'a str,
}

#[derive(ramhorns::Content)]
struct ErrorItem<'a> {
    error: &'a str,
}

/// Renders a single post or static page.
pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = parse_template(view_tpl_src, "post view")?;
        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, record: &ContentRecord) -> String {
        self.template.render(&ViewItem {
            title: record.title.as_str(),
            slug: record.slug.as_str(),
            tags: view_tags(&record.tags),
            has_tags: !record.tags.is_empty(),
            date: record.date.as_str(),
            publish_date: record.publish_date.as_str(),
            reading_time: reading_time(&record.plain_text),
            featured: record.featured,
            content: record.body_html.as_str(),
        })
    }
}

pub struct ErrorRenderer<'a> {
    pub template: Template<'a>,
}

impl ErrorRenderer<'_> {
    pub fn new(error_tpl_src: &str) -> io::Result<ErrorRenderer> {
        let template = parse_template(error_tpl_src, "error")?;
        Ok(ErrorRenderer {
            template,
        })
    }

    pub fn render(&self, error: &str) -> String {
        self.template.render(&ErrorItem { error })
    }
}
