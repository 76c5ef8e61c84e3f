use crate::config::{DESC_URL_ATTR, SKILL_ID_ATTR};
use crate::error::{Result, TooltipError};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Page that skill ids resolve to
const SKILL_PAGE: &str = "desc_skill.php";

/// Identity of a target: its position among the targets of the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub usize);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a target's description lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// A description page URL, absolute or relative to the base URL
    Url(String),
    /// A skill id, expanded through the skill description template
    SkillId(String),
}

impl Locator {
    /// Interpret a command-line argument: all digits is a skill id,
    /// anything else a URL
    pub fn from_arg(arg: &str) -> Self {
        let arg = arg.trim();
        if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
            Locator::SkillId(arg.to_string())
        } else {
            Locator::Url(arg.to_string())
        }
    }

    /// Resolve to an absolute URL against `base`
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        match self {
            Locator::Url(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err(TooltipError::InvalidLocator {
                        locator: raw.to_string(),
                        reason: "empty URL".to_string(),
                    });
                }
                base.join(raw).map_err(|e| TooltipError::InvalidLocator {
                    locator: raw.to_string(),
                    reason: e.to_string(),
                })
            }
            Locator::SkillId(id) => {
                let id = id.trim();
                if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
                    return Err(TooltipError::InvalidLocator {
                        locator: id.to_string(),
                        reason: "skill id must be numeric".to_string(),
                    });
                }
                let mut url = base.join(SKILL_PAGE).map_err(|e| TooltipError::InvalidLocator {
                    locator: id.to_string(),
                    reason: e.to_string(),
                })?;
                url.query_pairs_mut()
                    .append_pair("whichskill", id)
                    .append_pair("self", "true");
                Ok(url)
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Url(url) => write!(f, "{}", url),
            Locator::SkillId(id) => write!(f, "skill {}", id),
        }
    }
}

/// A host-page element that gets a tooltip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipTarget {
    pub id: TargetId,
    pub locator: Locator,
    /// Element text, e.g. the skill name
    pub label: String,
}

impl TooltipTarget {
    pub fn new(id: TargetId, locator: Locator, label: impl Into<String>) -> Self {
        Self {
            id,
            locator,
            label: label.into(),
        }
    }
}

/// Scan a host page for elements carrying `target_class` and read their
/// locators. Elements with the class but no locator attribute are skipped.
pub fn discover_targets(host_html: &str, target_class: &str) -> Vec<TooltipTarget> {
    let document = Html::parse_document(host_html);
    let mut targets = Vec::new();

    for element in document.tree.root().descendants().filter_map(ElementRef::wrap) {
        let value = element.value();
        if !value.classes().any(|c| c == target_class) {
            continue;
        }

        let locator = match (value.attr(DESC_URL_ATTR), value.attr(SKILL_ID_ATTR)) {
            (Some(url), _) => Locator::Url(url.to_string()),
            (None, Some(id)) => Locator::SkillId(id.to_string()),
            (None, None) => {
                log::warn!(
                    "Skipping <{}> with class '{}': neither {} nor {} is set",
                    value.name(),
                    target_class,
                    DESC_URL_ATTR,
                    SKILL_ID_ATTR
                );
                continue;
            }
        };

        let label = element.text().collect::<Vec<_>>().join(" ");
        let label = label.split_whitespace().collect::<Vec<_>>().join(" ");
        targets.push(TooltipTarget::new(TargetId(targets.len()), locator, label));
    }

    log::debug!("Discovered {} tooltip target(s)", targets.len());
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:60080/").unwrap()
    }

    #[test]
    fn test_skill_id_template() {
        let url = Locator::SkillId("7".to_string()).resolve(&base()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:60080/desc_skill.php?whichskill=7&self=true"
        );
    }

    #[test]
    fn test_non_numeric_skill_id() {
        let err = Locator::SkillId("7; drop".to_string()).resolve(&base()).unwrap_err();
        assert!(matches!(err, TooltipError::InvalidLocator { .. }));
    }

    #[test]
    fn test_relative_and_absolute_urls() {
        let relative = Locator::Url("desc_effect.php?whicheffect=3".to_string());
        assert_eq!(
            relative.resolve(&base()).unwrap().as_str(),
            "http://127.0.0.1:60080/desc_effect.php?whicheffect=3"
        );

        let absolute = Locator::Url("https://www.kingdomofloathing.com/desc_item.php?whichitem=1".to_string());
        assert_eq!(
            absolute.resolve(&base()).unwrap().host_str(),
            Some("www.kingdomofloathing.com")
        );

        let empty = Locator::Url("   ".to_string());
        assert!(empty.resolve(&base()).is_err());
    }

    #[test]
    fn test_from_arg() {
        assert_eq!(Locator::from_arg("42"), Locator::SkillId("42".to_string()));
        assert_eq!(
            Locator::from_arg("desc_skill.php?whichskill=42"),
            Locator::Url("desc_skill.php?whichskill=42".to_string())
        );
    }

    #[test]
    fn test_discover_targets() {
        let html = r#"
            <table>
              <tr><td class="skill better-trainer-skill-tooltip" data-better-trainer-desc-url="desc_skill.php?whichskill=1&amp;self=true">Seal Clubbing Frenzy</td></tr>
              <tr><td class="better-trainer-skill-tooltip" data-better-trainer-skill-id="7">Cannelloni  Cocoon</td></tr>
              <tr><td class="better-trainer-skill-tooltip">No locator</td></tr>
              <tr><td class="unrelated" data-better-trainer-skill-id="9">Ignored</td></tr>
            </table>"#;

        let targets = discover_targets(html, "better-trainer-skill-tooltip");

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].id, TargetId(0));
        assert_eq!(
            targets[0].locator,
            Locator::Url("desc_skill.php?whichskill=1&self=true".to_string())
        );
        assert_eq!(targets[0].label, "Seal Clubbing Frenzy");
        assert_eq!(targets[1].id, TargetId(1));
        assert_eq!(targets[1].locator, Locator::SkillId("7".to_string()));
        assert_eq!(targets[1].label, "Cannelloni Cocoon");
    }

    #[test]
    fn test_url_attribute_wins() {
        let html = r#"<span class="better-trainer-skill-tooltip" data-better-trainer-skill-id="5" data-better-trainer-desc-url="desc_skill.php?whichskill=6">x</span>"#;
        let targets = discover_targets(html, "better-trainer-skill-tooltip");

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].locator, Locator::Url("desc_skill.php?whichskill=6".to_string()));
    }

    #[test]
    fn test_target_id_display() {
        assert_eq!(TargetId(3).to_string(), "#3");
    }
}
