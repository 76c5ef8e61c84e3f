use crate::error::{Result, TooltipError};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

static ANCHOR_SELECTOR: OnceLock<Selector> = OnceLock::new();

fn anchor_selector() -> &'static Selector {
    ANCHOR_SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("Anchor selector is valid"))
}

/// Detached markup taken from a description container
///
/// The fragment keeps the serialized children rather than nodes of the
/// source document, so it can outlive the parse and be handed to any
/// surface without pulling the rest of the page along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Serialized element children, in document order
    html: String,

    /// Number of element children
    len: usize,

    /// Page the fragment was extracted from
    source: Url,
}

/// An anchor inside a fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentLink {
    /// Raw `href` attribute
    pub href: String,

    /// `href` resolved against the fragment's source page
    pub url: Url,

    /// Link text, whitespace-normalized
    pub text: String,
}

impl Fragment {
    /// Serialized markup of the fragment
    pub fn as_html(&self) -> &str {
        &self.html
    }

    /// Page this fragment was extracted from
    pub fn source(&self) -> &Url {
        &self.source
    }

    /// Number of top-level elements
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All anchors with an `href`, resolved against the source page.
    /// Anchors whose `href` cannot be resolved are skipped.
    pub fn links(&self) -> Vec<FragmentLink> {
        let doc = Html::parse_fragment(&self.html);
        doc.select(anchor_selector())
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                let url = self.source.join(href).ok()?;
                Some(FragmentLink {
                    href: href.to_string(),
                    url,
                    text: normalize_ws(&anchor.text().collect::<String>()),
                })
            })
            .collect()
    }

    /// Visible text of the fragment, whitespace-normalized
    pub fn text(&self) -> String {
        let doc = Html::parse_fragment(&self.html);
        normalize_ws(&doc.root_element().text().collect::<Vec<_>>().join(" "))
    }

    /// Render the fragment as markdown for terminal output
    pub fn to_markdown(&self) -> String {
        html2md::parse_html(&self.html).trim().to_string()
    }
}

/// Extract the element children of the element with id `container_id`.
///
/// `source` is the URL the HTML was fetched from; links in the fragment
/// resolve against it. The first element carrying the id wins.
pub fn extract_fragment(html: &str, container_id: &str, source: &Url) -> Result<Fragment> {
    let document = Html::parse_document(html);

    let container = document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(container_id))
        .ok_or_else(|| TooltipError::MissingContainer(container_id.to_string()))?;

    let children: Vec<String> = container
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| child.html())
        .collect();

    log::debug!(
        "Extracted {} element(s) from #{} of {}",
        children.len(),
        container_id,
        source
    );

    Ok(Fragment {
        len: children.len(),
        html: children.concat(),
        source: source.clone(),
    })
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
