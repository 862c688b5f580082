use std::io;

use ramhorns::Template;

use crate::config::SiteConfig;
use crate::content::PageLink;
use crate::view::parse_template;

#[derive(ramhorns::Content)]
struct NavLink<'a> {
    title: &'a str,
    slug: &'a str,
}

#[derive(ramhorns::Content)]
struct SocialLink<'a> {
    name: &'a str,
    url: &'a str,
}

#[derive(ramhorns::Content)]
struct LayoutView<'a> {
    page_title: &'a str,
    site_title: &'a str,
    site_description: &'a str,
    site_author: &'a str,
    site_author_url: &'a str,
    current_year: i32,
    pages: Vec<NavLink<'a>>,
    show_social_links: bool,
    social_links: Vec<SocialLink<'a>>,
    umami_script_url: &'a str,
    umami_website_id: &'a str,
    has_analytics: bool,
    content: &'a str,
}

/// Everything the shared page frame needs besides the page itself.
pub struct SiteFrame<'a> {
    pub config: &'a SiteConfig,
    pub pages: &'a [PageLink],
    pub current_year: i32,
}

impl SiteFrame<'_> {
    fn social_links(&self) -> Vec<SocialLink> {
        let social = &self.config.social;
        [
            ("Twitter", &social.twitter),
            ("Bluesky", &social.bluesky),
            ("LinkedIn", &social.linkedin),
            ("GitHub", &social.github),
            ("Reddit", &social.reddit),
            ("Facebook", &social.facebook),
        ]
            .into_iter()
            .filter(|(_, url)| !url.is_empty())
            .map(|(name, url)| SocialLink { name, url: url.as_str() })
            .collect()
    }
}

pub struct LayoutRenderer<'a> {
    pub template: Template<'a>,
}

impl LayoutRenderer<'_> {
    pub fn new(layout_tpl_src: &str) -> io::Result<LayoutRenderer> {
        let template = parse_template(layout_tpl_src, "layout")?;
        Ok(LayoutRenderer {
            template,
        })
    }

    /// Wraps already rendered page markup into the site layout.
    pub fn render(&self, frame: &SiteFrame, page_title: &str, content: &str) -> String {
        let site = &frame.config.site;
        let analytics = &frame.config.analytics;
        let pages = frame.pages.iter()
            .map(|p| NavLink { title: p.title.as_str(), slug: p.slug.as_str() })
            .collect();

        self.template.render(&LayoutView {
            page_title,
            site_title: site.title.as_str(),
            site_description: site.description.as_str(),
            site_author: site.author.as_str(),
            site_author_url: site.author_url.as_str(),
            current_year: frame.current_year,
            pages,
            show_social_links: frame.config.social.show_links,
            social_links: frame.social_links(),
            umami_script_url: analytics.umami_script_url.as_str(),
            umami_website_id: analytics.umami_website_id.as_str(),
            has_analytics: !analytics.umami_script_url.is_empty() && !analytics.umami_website_id.is_empty(),
            content,
        })
    }
}
