use std::{fs, io};
use std::io::ErrorKind;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use ramhorns::Template;

pub mod layout;
pub mod list_renderer;
pub mod post_renderer;
pub mod rss_renderer;
pub mod sitemap_renderer;

/// Read failures map to `Other`; `NotFound` is reserved for missing content.
pub fn read_template(tpl_dir: &Path, file_name: &str) -> io::Result<String> {
    let full_path = tpl_dir.join(file_name);
    match fs::read_to_string(&full_path) {
        Ok(src) => Ok(src),
        Err(e) => Err(io::Error::new(ErrorKind::Other, format!("Error loading template {}: {}", full_path.display(), e))),
    }
}

pub(crate) fn parse_template<'a>(src: &'a str, name: &str) -> io::Result<Template<'a>> {
    match Template::new(src) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", name, e))),
    }
}

/// RFC 3986 unreserved characters stay as they are.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes `segment` for use as a single URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// `tag` for display, `tag_path` for `/tags/{{tag_path}}` links.
#[derive(ramhorns::Content)]
pub(crate) struct ViewTag<'a> {
    tag: &'a str,
    tag_path: String,
}

pub(crate) fn view_tags(tags: &[String]) -> Vec<ViewTag> {
    tags.iter()
        .map(|t| ViewTag { tag: t.as_str(), tag_path: encode_path_segment(t) })
        .collect()
}
