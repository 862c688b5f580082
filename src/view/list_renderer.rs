use std::io;

use ramhorns::Template;

use crate::config::Site;
use crate::content::PageLink;
use crate::listing::PostSummary;
use crate::paginator::Page;
use crate::view::{parse_template, view_tags, ViewTag};

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    post_list: Vec<PostItem<'a>>,
    has_posts: bool,
    tag: &'a str,
    has_tag: bool,
    current_page: usize,
    total_pages: usize,
    has_prev: bool,
    has_next: bool,
    prev_page: usize,
    next_page: usize,
    show_pagination: bool,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    title: &'a str,
    slug: &'a str,
    date: &'a str,
    excerpt: &'a str,
    reading_time: &'a str,
    featured: bool,
    tags: Vec<ViewTag<'a>>,
}

#[derive(ramhorns::Content)]
struct IndexPage<'a> {
    site_title: &'a str,
    site_description: &'a str,
    home_intro: &'a str,
    show_quick_links: bool,
    pages: Vec<QuickLink<'a>>,
}

#[derive(ramhorns::Content)]
struct QuickLink<'a> {
    title: &'a str,
    slug: &'a str,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<ListRenderer> {
        let template = parse_template(list_tpl_src, "list")?;
        Ok(ListRenderer {
            template,
        })
    }

    /// Renders one page of summaries. `tag` is set on the tag listing route.
    pub fn render(&self, page: &Page<PostSummary>, tag: Option<&str>) -> String {
        let post_list: Vec<PostItem> = page.items.iter()
            .map(|post| PostItem {
                title: post.title.as_str(),
                slug: post.slug.as_str(),
                date: post.date.as_str(),
                excerpt: post.excerpt.as_str(),
                reading_time: post.reading_time.as_str(),
                featured: post.featured,
                tags: view_tags(&post.tags),
            })
            .collect();

        self.template.render(&ListPage {
            has_posts: !post_list.is_empty(),
            post_list,
            tag: tag.unwrap_or(""),
            has_tag: tag.is_some(),
            current_page: page.current_page,
            total_pages: page.total_pages,
            has_prev: page.has_prev,
            has_next: page.has_next,
            prev_page: page.prev_page,
            next_page: page.next_page,
            show_pagination: page.total_pages > 1,
        })
    }
}

pub struct IndexRenderer<'a> {
    pub template: Template<'a>,
}

impl IndexRenderer<'_> {
    pub fn new(index_tpl_src: &str) -> io::Result<IndexRenderer> {
        let template = parse_template(index_tpl_src, "index")?;
        Ok(IndexRenderer {
            template,
        })
    }

    pub fn render(&self, site: &Site, pages: &[PageLink]) -> String {
        self.template.render(&IndexPage {
            site_title: site.title.as_str(),
            site_description: site.description.as_str(),
            home_intro: site.home_intro.as_str(),
            show_quick_links: site.show_quick_links,
            pages: pages.iter()
                .map(|p| QuickLink { title: p.title.as_str(), slug: p.slug.as_str() })
                .collect(),
        })
    }
}
