use std::io;
use std::io::ErrorKind;

use lazy_static::lazy_static;
use markdown::{CompileOptions, Options};
use quick_xml::escape::resolve_html5_entity;
use regex::Regex;

const LAZY_ATTR: &str = r#"loading="lazy""#;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBody {
    pub html: String,
    pub plain_text: String,
}

pub struct MarkdownRenderer {}

impl MarkdownRenderer {
    /// Renders the markdown body to HTML and derives its plain-text projection.
    pub fn render(body: &str) -> io::Result<RenderedBody> {
        let html = Self::render_markdown(body)?;
        let html = add_lazy_loading(&html);
        let plain_text = strip_html(&html);

        Ok(RenderedBody {
            html,
            plain_text,
        })
    }

    fn render_markdown(md_text: &str) -> io::Result<String> {
        // Content is operator-owned, raw HTML blocks are kept as written
        let options = Options {
            compile: CompileOptions {
                allow_dangerous_html: true,
                ..CompileOptions::gfm()
            },
            ..Options::gfm()
        };

        match markdown::to_html_with_options(md_text, &options) {
            Ok(x) => Ok(x),
            Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason)),
        }
    }
}

/// Adds `loading="lazy"` to every `<img>` tag that does not declare a loading mode.
pub fn add_lazy_loading(html: &str) -> String {
    lazy_static! {
        static ref IMG_REGEX: Regex = Regex::new(r"<img\s[^>]*>").unwrap();
        static ref LOADING_ATTR_REGEX: Regex = Regex::new(r"(?i)\sloading\s*=").unwrap();
    }

    let result = IMG_REGEX.replace_all(html, |captures: &regex::Captures| {
        let tag = captures.get(0).map_or("", |m| m.as_str());
        if LOADING_ATTR_REGEX.is_match(tag) {
            tag.to_string()
        } else {
            format!("<img {}{}", LAZY_ATTR, &tag[4..])
        }
    });

    result.to_string()
}

/// Drops every `<...>` span, decodes character entities and trims the result.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    decode_entities(&text).trim().to_string()
}

/// Decodes named and numeric character references one by one. Anything that is
/// not a known reference, such as a bare `&`, is kept as written.
pub fn decode_entities(text: &str) -> String {
    lazy_static! {
        static ref ENTITY_REGEX: Regex = Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap();
    }

    let result = ENTITY_REGEX.replace_all(text, |captures: &regex::Captures| {
        let whole = captures.get(0).map_or("", |m| m.as_str());
        let name = captures.get(1).map_or("", |m| m.as_str());
        match resolve_entity(name) {
            Some(decoded) => decoded,
            None => whole.to_string(),
        }
    });

    result.to_string()
}

fn resolve_entity(name: &str) -> Option<String> {
    let Some(number) = name.strip_prefix('#') else {
        return resolve_html5_entity(name).map(str::to_string);
    };

    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse::<u32>().ok()?,
    };
    char::from_u32(code).map(String::from)
}
