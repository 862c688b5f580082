use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};

use crate::{PostArgs, PostOutput};

fn parse_tags(tags: Option<&str>) -> Vec<String> {
    tags.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn render_header(title: &str, tags: &[String], date: &NaiveDate, featured: bool) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "Tags: {}", tags.join(", "));
    let _ = writeln!(&mut buf, "Date: {}", date.format("%Y-%m-%d"));
    let _ = writeln!(&mut buf, "Draft: true");
    if featured {
        let _ = writeln!(&mut buf, "Featured: true");
    }
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "# {}", title);
    let _ = writeln!(&mut buf);
    buf
}

fn render_body() -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "Remove `Draft: true` above when the post is ready to be published.");

    buf
}

/// Lower-case ASCII slug, words joined by single hyphens.
fn slug_from_title(title: &str) -> String {
    let ascii = unidecode::unidecode(title);

    let mut slug = String::new();
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.trim_end_matches('-').to_string()
}

pub fn post_cmd(args: PostArgs) -> Result<()> {
    let title = args.title.trim();
    if title.is_empty() {
        bail!("Post title cannot be empty");
    }

    let tags = parse_tags(args.tags.as_deref());
    let header = render_header(title, &tags, &Utc::now().date_naive(), args.featured);
    let body = render_body();

    match args.output {
        PostOutput::Stdout => {
            print!("{}", header);
            print!("{}", body);
        }
        PostOutput::File => {
            let slug = slug_from_title(title);
            if slug.is_empty() {
                bail!("Could not derive a file name from title: {}", title);
            }
            let file_name = PathBuf::from(format!("{}.md", slug));
            if file_name.exists() {
                bail!("File {} already exists", file_name.display());
            }
            println!("Creating file {}", file_name.display());
            fs::write(&file_name, format!("{}{}", header, body))?;
        }
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use podium::content::front_matter::parse_front_matter;

    use crate::test_data::POST_DATA;

    use super::*;

    #[test]
    fn test_happy_case() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let tags = parse_tags(Some("rust, web,,"));
        let header = render_header("This is a title", &tags, &date, true);

        assert_eq!(header, POST_DATA);
    }

    #[test]
    fn test_header_parses_back() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let text = format!("{}{}", render_header("Hello", &[], &date, false), render_body());
        let front_matter = parse_front_matter("hello", &text);
        assert_eq!(front_matter.title, "Hello");
        assert_eq!(front_matter.date, "2024-02-27");
        assert!(front_matter.draft);
        assert!(!front_matter.featured);
        assert!(front_matter.tags.is_empty());
    }

    #[test]
    fn test_slug_from_title() {
        assert_eq!(slug_from_title("Post title of mine Ábaco - dir2"), "post-title-of-mine-abaco-dir2");
        assert_eq!(slug_from_title("  Hello, World!  "), "hello-world");
        assert_eq!(slug_from_title("???"), "");
    }
}
