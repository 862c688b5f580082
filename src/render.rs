use std::io;
use std::io::ErrorKind;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use crate::config::SiteConfig;
use crate::content::{ContentRecord, PageLink};
use crate::content::repository::ContentRepository;
use crate::listing::{filter_by_tag, sort_records, summarize};
use crate::paginator::Paginator;
use crate::view::layout::{LayoutRenderer, SiteFrame};
use crate::view::list_renderer::{IndexRenderer, ListRenderer};
use crate::view::post_renderer::{ErrorRenderer, PostRenderer};
use crate::view::read_template;
use crate::view::rss_renderer::RssChannel;
use crate::view::sitemap_renderer::Sitemap;

/// State shared by everything rendered for one request: a configuration
/// snapshot, the static page navigation and the request time.
pub struct RenderContext {
    pub config: Arc<SiteConfig>,
    pub pages: Vec<PageLink>,
    pub now: DateTime<Utc>,
}

impl RenderContext {
    pub fn new(config: Arc<SiteConfig>, now: DateTime<Utc>) -> Self {
        let pages = ContentRepository::pages(&config.paths.pages_dir).page_links(now.naive_utc());
        RenderContext {
            config,
            pages,
            now,
        }
    }

    fn posts(&self) -> ContentRepository {
        ContentRepository::posts(&self.config.paths.posts_dir)
    }

    /// Visible posts in listing order.
    pub fn sorted_posts(&self) -> Vec<ContentRecord> {
        let mut records = self.posts().scan(self.now.naive_utc());
        sort_records(&mut records);
        records
    }

    fn template(&self, file_name: &str) -> io::Result<String> {
        read_template(&self.config.paths.template_dir, file_name)
    }

    fn in_layout(&self, page_title: &str, content: &str) -> io::Result<String> {
        let layout_src = self.template("layout.tpl")?;
        let layout = LayoutRenderer::new(&layout_src)?;
        let frame = SiteFrame {
            config: &self.config,
            pages: &self.pages,
            current_year: self.now.year(),
        };
        Ok(layout.render(&frame, page_title, content))
    }

    pub fn render_index(&self) -> io::Result<String> {
        let src = self.template("index.tpl")?;
        let content = IndexRenderer::new(&src)?.render(&self.config.site, &self.pages);
        self.in_layout(&self.config.site.title, &content)
    }

    /// Post listing, optionally narrowed to one tag (matched case-insensitively).
    pub fn render_post_list(&self, page: i64, tag: Option<&str>) -> io::Result<String> {
        let mut records = self.sorted_posts();
        if let Some(tag) = tag {
            records = filter_by_tag(records, tag);
        }

        let defaults = &self.config.defaults;
        let summaries = summarize(&records, defaults.excerpt_length);
        let paginator = Paginator::from(&summaries, defaults.posts_per_page);

        let src = self.template("posts.tpl")?;
        let content = ListRenderer::new(&src)?.render(&paginator.get_page(page), tag);

        let title = match tag {
            Some(tag) => format!("Tag: {}", tag),
            None => "Posts".to_string(),
        };
        self.in_layout(&title, &content)
    }

    /// `NotFound` for missing, draft and scheduled posts.
    pub fn render_post(&self, slug: &str) -> io::Result<String> {
        let record = self.posts().find_visible(slug, self.now.naive_utc())?;
        let src = self.template("post.tpl")?;
        let content = PostRenderer::new(&src)?.render(&record);
        self.in_layout(&record.title, &content)
    }

    pub fn render_page(&self, slug: &str) -> io::Result<String> {
        let record = ContentRepository::pages(&self.config.paths.pages_dir)
            .find_visible(slug, self.now.naive_utc())?;
        let src = self.template("page.tpl")?;
        let content = PostRenderer::new(&src)?.render(&record);
        self.in_layout(&record.title, &content)
    }

    pub fn render_error(&self, message: &str) -> io::Result<String> {
        let src = self.template("error.tpl")?;
        let content = ErrorRenderer::new(&src)?.render(message);
        self.in_layout(message, &content)
    }

    pub fn render_feed(&self) -> io::Result<Vec<u8>> {
        let mut records = self.sorted_posts();
        records.truncate(self.config.defaults.feed_items);

        let site = &self.config.site;
        let channel = RssChannel {
            ch_title: &site.title,
            ch_link: &site.url,
            ch_desc: &site.description,
        };
        channel.render(&records, self.now)
            .map_err(|e| io::Error::new(ErrorKind::Other, format!("Error writing feed: {}", e)))
    }

    pub fn render_sitemap(&self) -> io::Result<Vec<u8>> {
        let records = self.sorted_posts();
        let sitemap = Sitemap { site_url: &self.config.site.url };
        sitemap.render(&records, &self.pages, self.now.date_naive())
            .map_err(|e| io::Error::new(ErrorKind::Other, format!("Error writing sitemap: {}", e)))
    }
}

pub fn robots_txt(site_url: &str) -> String {
    format!("# robots.txt for Podium\n# https://www.robotstxt.org/\n\nUser-agent: *\nAllow: /\n\n# Sitemaps\nSitemap: {}/sitemap.xml\n", site_url)
}
