//! Which in-tooltip links are followed in place
//!
//! Only description pages are viewable inside a tooltip. Everything else is
//! left to normal browser navigation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

static VIEWABLE_PAGE: OnceLock<Regex> = OnceLock::new();

fn viewable_page() -> &'static Regex {
    VIEWABLE_PAGE.get_or_init(|| {
        Regex::new(r"^desc_(skill|effect|familiar|item)\.php$").expect("Viewable page pattern is valid")
    })
}

/// Kind of description page a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Skill,
    Effect,
    Familiar,
    Item,
}

impl PageKind {
    /// Classify a resolved URL by its page name (last path segment)
    pub fn of(url: &Url) -> Option<Self> {
        let page = url.path_segments()?.next_back()?;
        let caps = viewable_page().captures(page)?;
        match caps.get(1)?.as_str() {
            "skill" => Some(PageKind::Skill),
            "effect" => Some(PageKind::Effect),
            "familiar" => Some(PageKind::Familiar),
            "item" => Some(PageKind::Item),
            _ => None,
        }
    }
}

/// Whether a link to `url` should open inside the tooltip
pub fn is_viewable(url: &Url) -> bool {
    PageKind::of(url).is_some()
}

/// Resolve `href` against `source` and keep it only if it is viewable.
/// In-page anchors (`#...`) never count.
pub fn viewable_target(source: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = source.join(href).ok()?;
    is_viewable(&url).then_some(url)
}
