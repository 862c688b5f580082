use std::io::Cursor;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::content::ContentRecord;
use crate::text_utils::{format_rfc1123z, truncate_chars};

const DESCRIPTION_CHARS: usize = 200;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
<channel>
  <title>My blog</title>
  <link>https://example.com</link>
  <description>Things I write</description>
  <language>en-us</language>
  <lastBuildDate>Sat, 01 Jun 2024 00:00:00 +0000</lastBuildDate>
  <atom:link href="https://example.com/feed.xml" rel="self" type="application/rss+xml"/>
  <item>
    <title>Hello</title>
    <link>https://example.com/posts/hello</link>
    <guid>https://example.com/posts/hello</guid>
    <pubDate>Sat, 01 Jun 2024 00:00:00 +0000</pubDate>
    <description>First 200 characters of the text...</description>
    <category>rust</category>
  </item>
</channel>
</rss>
*/

pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    pub ch_link: &'a str,
    pub ch_desc: &'a str,
}

impl<'a> RssChannel<'a> {
    /// `records` must already be sorted and limited to the feed size.
    pub fn render(&self, records: &[ContentRecord], now: DateTime<Utc>) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        rss.push_attribute(("xmlns:atom", "http://www.w3.org/2005/Atom"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.ch_title)?;
        push_text(&mut writer, "link", self.ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;
        push_text(&mut writer, "language", "en-us")?;
        push_text(&mut writer, "lastBuildDate", &last_build_date(records, now))?;

        let self_link = format!("{}/feed.xml", self.ch_link);
        let mut atom_link = BytesStart::new("atom:link");
        atom_link.push_attribute(("href", self_link.as_str()));
        atom_link.push_attribute(("rel", "self"));
        atom_link.push_attribute(("type", "application/rss+xml"));
        writer.write_event(Event::Empty(atom_link))?;

        for record in records {
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            let link = format!("{}/posts/{}", self.ch_link, record.slug);
            push_text(&mut writer, "title", &record.title)?;
            push_text(&mut writer, "link", &link)?;
            push_text(&mut writer, "guid", &link)?;

            if let Some(date) = record.published_date() {
                push_text(&mut writer, "pubDate", &rfc1123z_of(date))?;
            }

            let description = truncate_chars(&record.plain_text, DESCRIPTION_CHARS);
            push_text(&mut writer, "description", &description)?;

            for tag in record.tags.iter() {
                push_text(&mut writer, "category", tag)?;
            }

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

/// Date of the newest item, or `now` when the feed is empty or that date is invalid.
fn last_build_date(records: &[ContentRecord], now: DateTime<Utc>) -> String {
    match records.first().and_then(ContentRecord::published_date) {
        Some(date) => rfc1123z_of(date),
        None => format_rfc1123z(&now),
    }
}

fn rfc1123z_of(date: NaiveDate) -> String {
    format_rfc1123z(&date.and_time(NaiveTime::default()).and_utc())
}

/// Entity-escapes `& < > " '`. Control characters are passed through untouched.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub(crate) fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str;

    use chrono::TimeZone;

    use crate::content::Visibility;

    use super::*;

    fn create_record(id: &str, date: &str, plain_text: &str) -> ContentRecord {
        ContentRecord {
            slug: format!("post-{}", id),
            title: format!("title-of-post-{}", id),
            tags: vec![format!("first-tag-{}", id), format!("second-tag-{}", id)],
            date: date.to_string(),
            publish_date: String::new(),
            visibility: Visibility::Published,
            featured: false,
            body_html: String::new(),
            plain_text: plain_text.to_string(),
        }
    }

    fn channel() -> RssChannel<'static> {
        RssChannel {
            ch_title: "my feed",
            ch_link: "https://example.com",
            ch_desc: "My blog feed",
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 10, 20, 30).unwrap()
    }

    #[test]
    fn render_xml() {
        let records = vec![
            create_record("1", "2024-01-02", "summary-of-post-1"),
            create_record("2", "2023-12-31", "summary-of-post-2"),
        ];
        let xml = channel().render(&records, now()).unwrap();
        assert_eq!(str::from_utf8(&xml).unwrap(), EXPECTED);
    }

    const EXPECTED: &str = r##"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom"><channel><title>my feed</title><link>https://example.com</link><description>My blog feed</description><language>en-us</language><lastBuildDate>Tue, 02 Jan 2024 00:00:00 +0000</lastBuildDate><atom:link href="https://example.com/feed.xml" rel="self" type="application/rss+xml"/><item><title>title-of-post-1</title><link>https://example.com/posts/post-1</link><guid>https://example.com/posts/post-1</guid><pubDate>Tue, 02 Jan 2024 00:00:00 +0000</pubDate><description>summary-of-post-1</description><category>first-tag-1</category><category>second-tag-1</category></item><item><title>title-of-post-2</title><link>https://example.com/posts/post-2</link><guid>https://example.com/posts/post-2</guid><pubDate>Sun, 31 Dec 2023 00:00:00 +0000</pubDate><description>summary-of-post-2</description><category>first-tag-2</category><category>second-tag-2</category></item></channel></rss>"##;

    #[test]
    fn render_escapes_and_truncates() {
        let long_text = "x".repeat(500);
        let mut record = create_record("3", "not-a-date", &long_text);
        record.title = "Fish & <Chips> \"quoted\" it's".to_string();

        let xml = channel().render(&[record], now()).unwrap();
        let xml = str::from_utf8(&xml).unwrap();

        assert!(xml.contains("<title>Fish &amp; &lt;Chips&gt; &quot;quoted&quot; it&#39;s</title>"));
        assert!(xml.contains(&format!("<description>{}...</description>", "x".repeat(200))));
        assert!(!xml.contains("<pubDate>"));
        assert!(xml.contains("<lastBuildDate>Tue, 04 Mar 2025 10:20:30 +0000</lastBuildDate>"));
    }

    #[test]
    fn render_empty_feed() {
        let xml = channel().render(&[], now()).unwrap();
        let xml = str::from_utf8(&xml).unwrap();
        assert!(xml.contains("<lastBuildDate>Tue, 04 Mar 2025 10:20:30 +0000</lastBuildDate>"));
        assert!(!xml.contains("<item>"));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a&b<c>d\"e'f"), "a&amp;b&lt;c&gt;d&quot;e&#39;f");
        assert_eq!(escape_text("plain"), "plain");
    }
}
