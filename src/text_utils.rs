use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

const WORDS_PER_MINUTE: usize = 225;
/// How far back from the cut point an excerpt may move to end on a word boundary.
const WORD_BREAK_WINDOW: usize = 50;

pub fn parse_date(buf: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(buf.trim(), "%Y-%m-%d").ok()
}

/// Scheduled publication instants are written as `YYYY-MM-DD HH:MM` and read as UTC.
pub fn parse_publish_date(buf: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(buf.trim(), "%Y-%m-%d %H:%M").ok()
}

/// RFC 1123 with a numeric zone, e.g. `Tue, 02 Jan 2024 05:06:07 +0000`.
pub fn format_rfc1123z<Tz: TimeZone>(date_time: &DateTime<Tz>) -> String
    where Tz::Offset: std::fmt::Display {
    date_time.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Collapses whitespace and truncates to `max_length` characters, preferring to
/// cut at a space close to the limit.
pub fn generate_excerpt(text: &str, max_length: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text;
    }

    let mut excerpt = &chars[..max_length];
    if let Some(last_space) = excerpt.iter().rposition(|c| *c == ' ') {
        if last_space + WORD_BREAK_WINDOW > max_length {
            excerpt = &excerpt[..last_space];
        }
    }

    let mut excerpt: String = excerpt.iter().collect();
    excerpt.push_str("...");
    excerpt
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn reading_time(text: &str) -> String {
    match word_count(text) / WORDS_PER_MINUTE {
        0 => "< 1 min read".to_string(),
        1 => "1 min read".to_string(),
        minutes => format!("{} min read", minutes),
    }
}

/// First `max_chars` characters, with `...` appended when something was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveTime, Utc};

    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-06-01"), NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(parse_date(" 2024-06-01 "), NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(parse_date("invalid"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_publish_date() {
        let expected = NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        );
        assert_eq!(parse_publish_date("2030-01-02 08:30"), Some(expected));
        assert_eq!(parse_publish_date("2030-01-02"), None);
        assert_eq!(parse_publish_date("soon"), None);
    }

    #[test]
    fn test_format_rfc1123z() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(5, 6, 7).unwrap();
        assert_eq!(format_rfc1123z(&Utc.from_utc_datetime(&dt)), "Tue, 02 Jan 2024 05:06:07 +0000");

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_rfc1123z(&offset.from_utc_datetime(&dt)), "Tue, 02 Jan 2024 07:06:07 +0200");
    }

    #[test]
    fn test_excerpt_short_text() {
        assert_eq!(generate_excerpt("  short \n\n text  ", 100), "short text");
    }

    #[test]
    fn test_excerpt_breaks_on_word() {
        // 60 words of 4 chars + separators = 299 characters
        let text = words(60);
        let excerpt = generate_excerpt(&text, 100);
        assert!(excerpt.ends_with("..."));
        let body = excerpt.trim_end_matches("...");
        assert!(body.chars().count() <= 100);
        assert!(body.ends_with("word"));
        assert_eq!(body, words(20));
    }

    #[test]
    fn test_excerpt_without_near_space_cuts_hard() {
        let text = format!("a {}", "x".repeat(299));
        let excerpt = generate_excerpt(&text, 100);
        assert_eq!(excerpt.chars().count(), 103);
        assert!(excerpt.starts_with("a xxx"));
    }

    #[test]
    fn test_excerpt_multibyte() {
        let text = "é".repeat(150);
        let excerpt = generate_excerpt(&text, 100);
        assert_eq!(excerpt, format!("{}...", "é".repeat(100)));
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), "< 1 min read");
        assert_eq!(reading_time(&words(224)), "< 1 min read");
        assert_eq!(reading_time(&words(225)), "1 min read");
        assert_eq!(reading_time(&words(449)), "1 min read");
        assert_eq!(reading_time(&words(450)), "2 min read");
        assert_eq!(reading_time(&words(2250)), "10 min read");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcde", 5), "abcde");
        assert_eq!(truncate_chars("abcdef", 5), "abcde...");
        assert_eq!(truncate_chars(&"ü".repeat(300), 200).chars().count(), 203);
    }
}
