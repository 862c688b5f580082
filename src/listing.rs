use std::cmp::Ordering;

use crate::content::ContentRecord;
use crate::text_utils::{generate_excerpt, reading_time};

/// What listing pages and feeds show for a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub title: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub date: String,
    pub excerpt: String,
    pub reading_time: String,
    pub featured: bool,
}

impl PostSummary {
    pub fn from_record(record: &ContentRecord, excerpt_length: usize) -> Self {
        PostSummary {
            title: record.title.clone(),
            slug: record.slug.clone(),
            tags: record.tags.clone(),
            date: record.date.clone(),
            excerpt: generate_excerpt(&record.plain_text, excerpt_length),
            reading_time: reading_time(&record.plain_text),
            featured: record.featured,
        }
    }
}

/// Featured records first, then the rest. Each block is newest first and
/// records without a valid date go last.
pub fn sort_records(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| {
        b.featured.cmp(&a.featured)
            .then_with(|| compare_dates(a, b))
    });
}

fn compare_dates(a: &ContentRecord, b: &ContentRecord) -> Ordering {
    match (a.published_date(), b.published_date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn filter_by_tag(records: Vec<ContentRecord>, tag: &str) -> Vec<ContentRecord> {
    records.into_iter()
        .filter(|record| record.has_tag(tag))
        .collect()
}

pub fn summarize(records: &[ContentRecord], excerpt_length: usize) -> Vec<PostSummary> {
    records.iter()
        .map(|record| PostSummary::from_record(record, excerpt_length))
        .collect()
}
