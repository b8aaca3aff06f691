use crate::config::SiteSettings;
use crate::domain::types::Theme;
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, PageMetaView, ThemeToggleView, canonical_url,
};

const BRAND_TITLE: &str = "Dev";
const BRAND_ACCENT: &str = "Scribe";
const OG_LOCALE: &str = "en_US";

/// Builds the layout shared by every public page from site settings.
#[derive(Clone)]
pub struct ChromeService {
    site: SiteSettings,
}

impl ChromeService {
    pub fn new(site: SiteSettings) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &SiteSettings {
        &self.site
    }

    /// Chrome for `path` rendered in `theme`. `path` may carry a query string;
    /// it becomes the return target of the theme toggle.
    pub fn load(&self, theme: Theme, path: &str) -> LayoutChrome {
        let next = theme.toggled();
        let canonical_path = path.split(['?', '#']).next().unwrap_or("/");

        LayoutChrome {
            brand: BrandView {
                title: BRAND_TITLE.to_string(),
                accent: BRAND_ACCENT.to_string(),
                href: "/".to_string(),
            },
            theme: ThemeToggleView {
                current: theme.as_str().to_string(),
                next: next.as_str().to_string(),
                label: format!("Switch to {} mode", next.as_str()),
                href: theme_toggle_href(next, path),
            },
            footer: FooterView {
                copy: format!("© {}", self.site.site_name),
            },
            meta: PageMetaView {
                title: self.site.title.clone(),
                description: self.site.description.clone(),
                og_title: self.site.title.clone(),
                og_description: self.site.description.clone(),
                og_type: "website",
                og_locale: OG_LOCALE,
                site_name: self.site.site_name.clone(),
                canonical: canonical_url(&self.site.public_url, canonical_path),
            },
        }
    }
}

fn theme_toggle_href(next: Theme, path: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("/theme/{}?next={encoded}", next.as_str())
}
