use std::io::Cursor;

use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::content::{ContentRecord, PageLink};
use crate::text_utils::format_date;
use crate::view::rss_renderer::push_text;

#[derive(Debug, Clone, Copy, PartialEq)]
enum EntryKind {
    Home,
    Listing,
    Post,
    Page,
    Feed,
}

impl EntryKind {
    fn change_freq(&self) -> &'static str {
        match self {
            EntryKind::Home | EntryKind::Listing | EntryKind::Feed => "daily",
            EntryKind::Post | EntryKind::Page => "monthly",
        }
    }

    fn priority(&self) -> &'static str {
        match self {
            EntryKind::Home => "1.0",
            EntryKind::Listing => "0.9",
            EntryKind::Post => "0.8",
            EntryKind::Page => "0.7",
            EntryKind::Feed => "0.5",
        }
    }
}

pub struct Sitemap<'a> {
    pub site_url: &'a str,
}

impl<'a> Sitemap<'a> {
    /// Home, post listing, every post, every static page and the feed, in that order.
    pub fn render(&self, posts: &[ContentRecord], pages: &[PageLink], today: NaiveDate) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let today = format_date(&today);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut urlset = BytesStart::new("urlset");
        urlset.push_attribute(("xmlns", "http://www.sitemaps.org/schemas/sitemap/0.9"));
        writer.write_event(Event::Start(urlset))?;

        push_url(&mut writer, self.site_url, &today, EntryKind::Home)?;
        push_url(&mut writer, &format!("{}/posts", self.site_url), &today, EntryKind::Listing)?;

        for post in posts {
            let last_mod = match post.published_date() {
                Some(date) => format_date(&date),
                None => today.clone(),
            };
            push_url(&mut writer, &format!("{}/posts/{}", self.site_url, post.slug), &last_mod, EntryKind::Post)?;
        }

        for page in pages {
            push_url(&mut writer, &format!("{}/page/{}", self.site_url, page.slug), &today, EntryKind::Page)?;
        }

        push_url(&mut writer, &format!("{}/feed.xml", self.site_url), &today, EntryKind::Feed)?;

        writer.write_event(Event::End(BytesEnd::new("urlset")))?;
        Ok(writer.into_inner().into_inner())
    }
}

fn push_url(writer: &mut Writer<Cursor<Vec<u8>>>, loc: &str, last_mod: &str, kind: EntryKind) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("url")))?;
    push_text(writer, "loc", loc)?;
    push_text(writer, "lastmod", last_mod)?;
    push_text(writer, "changefreq", kind.change_freq())?;
    push_text(writer, "priority", kind.priority())?;
    writer.write_event(Event::End(BytesEnd::new("url")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str;

    use crate::content::Visibility;

    use super::*;

    fn post(slug: &str, date: &str) -> ContentRecord {
        ContentRecord {
            slug: slug.to_string(),
            title: slug.to_string(),
            tags: vec![],
            date: date.to_string(),
            publish_date: String::new(),
            visibility: Visibility::Published,
            featured: false,
            body_html: String::new(),
            plain_text: String::new(),
        }
    }

    #[test]
    fn render_sitemap() {
        let posts = vec![post("dated", "2024-02-03"), post("undated", "")];
        let pages = vec![PageLink { title: "About".to_string(), slug: "about".to_string() }];
        let today = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();

        let xml = Sitemap { site_url: "https://example.com" }.render(&posts, &pages, today).unwrap();
        let xml = str::from_utf8(&xml).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.contains("<url><loc>https://example.com</loc><lastmod>2025-05-06</lastmod><changefreq>daily</changefreq><priority>1.0</priority></url>"));
        assert!(xml.contains("<url><loc>https://example.com/posts</loc><lastmod>2025-05-06</lastmod><changefreq>daily</changefreq><priority>0.9</priority></url>"));
        assert!(xml.contains("<url><loc>https://example.com/posts/dated</loc><lastmod>2024-02-03</lastmod><changefreq>monthly</changefreq><priority>0.8</priority></url>"));
        assert!(xml.contains("<url><loc>https://example.com/posts/undated</loc><lastmod>2025-05-06</lastmod><changefreq>monthly</changefreq><priority>0.8</priority></url>"));
        assert!(xml.contains("<url><loc>https://example.com/page/about</loc><lastmod>2025-05-06</lastmod><changefreq>monthly</changefreq><priority>0.7</priority></url>"));
        assert!(xml.ends_with("<url><loc>https://example.com/feed.xml</loc><lastmod>2025-05-06</lastmod><changefreq>daily</changefreq><priority>0.5</priority></url></urlset>"));
        assert_eq!(xml.matches("<url>").count(), 6);
    }

    #[test]
    fn render_sitemap_escapes_locations() {
        let pages = vec![PageLink { title: "Q&A".to_string(), slug: "q&a".to_string() }];
        let today = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();

        let xml = Sitemap { site_url: "https://example.com" }.render(&[], &pages, today).unwrap();
        let xml = str::from_utf8(&xml).unwrap();

        assert!(xml.contains("<loc>https://example.com/page/q&amp;a</loc>"));
        assert_eq!(xml.matches("<url>").count(), 4);
    }
}
