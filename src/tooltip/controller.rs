use crate::config::LoaderOptions;
use crate::dom::{Fragment, TargetId, TooltipTarget, extract_fragment};
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::links;
use crate::tooltip::{TooltipContent, TooltipSurface};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// Which page a state belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The target's own description page
    Primary,
    /// A page reached by clicking a link inside the tooltip
    Secondary,
}

/// State of a tooltip controller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TooltipState {
    /// Primary page not loaded yet
    Loading,
    /// A fragment is displayed
    Loaded { origin: Origin, fragment: Fragment },
    /// A followed link is being fetched; the previous fragment stays visible
    NavigatingSecondary { url: Url },
    /// The last load failed and the failure message is displayed
    Failed {
        origin: Origin,
        /// URL (or locator, if it never became a URL) that failed
        location: String,
        reason: String,
    },
}

impl TooltipState {
    /// Short name used in reports and logs
    pub fn name(&self) -> &'static str {
        match self {
            TooltipState::Loading => "loading",
            TooltipState::Loaded { .. } => "loaded",
            TooltipState::NavigatingSecondary { .. } => "navigating_secondary",
            TooltipState::Failed { .. } => "failed",
        }
    }

    /// Whether this state comes from following a link
    pub fn is_secondary(&self) -> bool {
        match self {
            TooltipState::Loading => false,
            TooltipState::Loaded { origin, .. } | TooltipState::Failed { origin, .. } => {
                *origin == Origin::Secondary
            }
            TooltipState::NavigatingSecondary { .. } => true,
        }
    }

    /// Content this state puts on the surface. Navigation keeps whatever
    /// was there, so it has none of its own.
    fn content(&self) -> Option<TooltipContent> {
        match self {
            TooltipState::Loading => Some(TooltipContent::loading()),
            TooltipState::Loaded { fragment, .. } => Some(TooltipContent::Fragment(fragment.clone())),
            TooltipState::NavigatingSecondary { .. } => None,
            TooltipState::Failed { .. } => Some(TooltipContent::failed()),
        }
    }
}

/// Outcome of a click inside the tooltip
#[derive(Debug)]
pub enum ClickDisposition {
    /// The link is a description page: suppress default navigation and run
    /// the returned navigation
    Intercepted(SecondaryNavigation),
    /// Not ours; let the browser navigate
    PassThrough,
}

impl ClickDisposition {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, ClickDisposition::Intercepted(_))
    }
}

/// A pending fetch of a followed link.
///
/// Owns a handle to its controller, so it can be awaited in place or
/// spawned onto an executor.
#[derive(Debug)]
pub struct SecondaryNavigation {
    controller: TooltipController,
    url: Url,
    generation: u64,
}

impl SecondaryNavigation {
    /// URL being fetched
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch and display the linked page.
    ///
    /// Returns `false` when the result was dropped because the tooltip was
    /// hidden or another link was clicked in the meantime.
    pub async fn run(self) -> bool {
        let result = self.controller.load_page(&self.url).await;

        if let Err(e) = &result {
            log::error!("Failed to fetch link: {}\nReason: {}", self.url, e);
        }

        let mut inner = self.controller.lock();
        if inner.generation != self.generation {
            log::debug!(
                "Dropping result for {} on target {}: superseded",
                self.url,
                self.controller.target.id
            );
            return false;
        }

        inner.state = match result {
            Ok(fragment) => TooltipState::Loaded {
                origin: Origin::Secondary,
                fragment,
            },
            Err(e) => TooltipState::Failed {
                origin: Origin::Secondary,
                location: self.url.to_string(),
                reason: e.to_string(),
            },
        };
        let content = inner.take_content();
        self.controller.publish(inner, content);
        true
    }
}

/// Serializable summary of one controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetReport {
    pub id: TargetId,
    pub label: String,
    pub locator: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct Inner {
    /// Outcome of the primary load; what `hidden` returns to
    primary: TooltipState,
    state: TooltipState,
    displayed: TooltipContent,
    /// Bumped by every click and hide; navigations from older generations
    /// are discarded
    generation: u64,
}

impl Inner {
    /// Record the content of the current state as displayed and return it
    /// for the surface
    fn take_content(&mut self) -> Option<TooltipContent> {
        let content = self.state.content()?;
        self.displayed = content.clone();
        Some(content)
    }
}

/// Per-target tooltip state machine.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct TooltipController {
    target: Arc<TooltipTarget>,
    options: Arc<LoaderOptions>,
    fetcher: Arc<dyn PageFetcher>,
    inner: Arc<Mutex<Inner>>,
    /// Locked separately so `show` runs without the state lock held
    surface: Arc<Mutex<Box<dyn TooltipSurface>>>,
}

impl fmt::Debug for TooltipController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipController")
            .field("target", &self.target)
            .field("state", &self.state().name())
            .finish()
    }
}

impl TooltipController {
    /// Attach a controller to `target`. The surface immediately shows the
    /// loading placeholder; call [`load_primary`](Self::load_primary) to fetch.
    pub fn new(
        target: TooltipTarget,
        options: Arc<LoaderOptions>,
        fetcher: Arc<dyn PageFetcher>,
        mut surface: Box<dyn TooltipSurface>,
    ) -> Self {
        let displayed = TooltipContent::loading();
        surface.show(&displayed);

        Self {
            target: Arc::new(target),
            options,
            fetcher,
            inner: Arc::new(Mutex::new(Inner {
                primary: TooltipState::Loading,
                state: TooltipState::Loading,
                displayed,
                generation: 0,
            })),
            surface: Arc::new(Mutex::new(surface)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand `content` to the surface. The surface lock is taken before the
    /// state lock is released, so surfaces see updates in state order, but
    /// `show` itself runs with only the surface lock held.
    fn publish(&self, inner: MutexGuard<'_, Inner>, content: Option<TooltipContent>) {
        let Some(content) = content else {
            return;
        };
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        drop(inner);
        surface.show(&content);
    }

    pub fn target(&self) -> &TooltipTarget {
        &self.target
    }

    /// Current state
    pub fn state(&self) -> TooltipState {
        self.lock().state.clone()
    }

    /// Outcome of the primary load
    pub fn primary_state(&self) -> TooltipState {
        self.lock().primary.clone()
    }

    /// Content currently on the surface
    pub fn displayed(&self) -> TooltipContent {
        self.lock().displayed.clone()
    }

    /// Fetch a page and extract its description fragment
    async fn load_page(&self, url: &Url) -> Result<Fragment> {
        let html = self.fetcher.fetch(url).await?;
        extract_fragment(&html, &self.options.container_id, url)
    }

    /// Load the target's own description page
    pub async fn load_primary(&self) -> TooltipState {
        let (location, result) = match self.target.locator.resolve(&self.options.base_url) {
            Ok(url) => {
                let result = self.load_page(&url).await;
                (url.to_string(), result)
            }
            Err(e) => (self.target.locator.to_string(), Err(e)),
        };

        let state = match result {
            Ok(fragment) => {
                log::debug!("Loaded description for target {} from {}", self.target.id, location);
                TooltipState::Loaded {
                    origin: Origin::Primary,
                    fragment,
                }
            }
            Err(e) => {
                log::error!("Failed to load page: {}\nReason: {}", location, e);
                TooltipState::Failed {
                    origin: Origin::Primary,
                    location,
                    reason: e.to_string(),
                }
            }
        };

        let mut inner = self.lock();
        inner.primary = state.clone();
        // Secondary content, if any, stays until the tooltip hides
        if !inner.state.is_secondary() {
            inner.state = state.clone();
            let content = inner.take_content();
            self.publish(inner, content);
        }
        state
    }

    /// Re-run a failed primary load. Does nothing unless the primary load
    /// failed.
    pub async fn retry_primary(&self) -> TooltipState {
        {
            let mut inner = self.lock();
            if !matches!(inner.primary, TooltipState::Failed { .. }) {
                return inner.state.clone();
            }
            inner.generation += 1;
            inner.primary = TooltipState::Loading;
            inner.state = TooltipState::Loading;
            let content = inner.take_content();
            self.publish(inner, content);
        }
        log::info!("Retrying description for target {}", self.target.id);
        self.load_primary().await
    }

    /// Handle a click on a link with `href` inside the displayed fragment
    pub fn click(&self, href: &str) -> ClickDisposition {
        let mut inner = self.lock();

        let Some(source) = inner.displayed.fragment().map(|f| f.source().clone()) else {
            return ClickDisposition::PassThrough;
        };
        let Some(url) = links::viewable_target(&source, href) else {
            log::debug!("Not intercepting link '{}' on target {}", href, self.target.id);
            return ClickDisposition::PassThrough;
        };

        inner.generation += 1;
        let generation = inner.generation;
        inner.state = TooltipState::NavigatingSecondary { url: url.clone() };
        drop(inner);

        log::debug!("Following {} inside target {}", url, self.target.id);
        ClickDisposition::Intercepted(SecondaryNavigation {
            controller: self.clone(),
            url,
            generation,
        })
    }

    /// The surface was hidden: go back to the primary content
    pub fn hidden(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = inner.primary.clone();
        let content = inner.take_content();
        self.publish(inner, content);
    }

    /// Summarize the current state
    pub fn report(&self) -> TargetReport {
        let state = self.state();
        let (url, text, error) = match &state {
            TooltipState::Loading => (None, None, None),
            TooltipState::Loaded { fragment, .. } => {
                (Some(fragment.source().to_string()), Some(fragment.text()), None)
            }
            TooltipState::NavigatingSecondary { url } => (Some(url.to_string()), None, None),
            TooltipState::Failed { location, reason, .. } => {
                (Some(location.clone()), None, Some(reason.clone()))
            }
        };

        TargetReport {
            id: self.target.id,
            label: self.target.label.clone(),
            locator: self.target.locator.to_string(),
            state: state.name().to_string(),
            url,
            text,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Locator;
    use crate::error::TooltipError;
    use crate::tooltip::MemorySurface;
    use async_trait::async_trait;

    /// Serves one fixed body for every URL and counts calls
    struct FixedFetcher {
        body: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageFetcher for FixedFetcher {
        async fn fetch(&self, url: &Url) -> Result<String> {
            self.calls.lock().unwrap().push(url.to_string());
            self.body.clone().ok_or_else(|| TooltipError::HttpStatus {
                url: url.to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            })
        }
    }

    fn controller(body: Option<&str>) -> (TooltipController, MemorySurface, Arc<FixedFetcher>) {
        let fetcher = Arc::new(FixedFetcher {
            body: body.map(str::to_string),
            calls: Mutex::new(Vec::new()),
        });
        let surface = MemorySurface::new();
        let target = TooltipTarget::new(TargetId(0), Locator::SkillId("7".to_string()), "Cannelloni Cocoon");
        let controller = TooltipController::new(
            target,
            Arc::new(LoaderOptions::default()),
            fetcher.clone(),
            Box::new(surface.clone()),
        );
        (controller, surface, fetcher)
    }

    #[test]
    fn test_starts_loading() {
        let (controller, surface, fetcher) = controller(None);

        assert_eq!(controller.state(), TooltipState::Loading);
        assert_eq!(surface.history(), vec![TooltipContent::loading()]);
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_click_before_load_passes_through() {
        let (controller, _, _) = controller(None);
        assert!(!controller.click("desc_effect.php?whicheffect=1").is_intercepted());
    }

    #[tokio::test]
    async fn test_primary_failure_and_retry() {
        let (controller, surface, fetcher) = controller(None);

        let state = controller.load_primary().await;
        assert_eq!(state.name(), "failed");
        assert_eq!(surface.current(), Some(TooltipContent::failed()));

        controller.retry_primary().await;
        assert_eq!(fetcher.calls.lock().unwrap().len(), 2);
        assert_eq!(
            surface.history(),
            vec![
                TooltipContent::loading(),
                TooltipContent::failed(),
                TooltipContent::loading(),
                TooltipContent::failed(),
            ]
        );
    }

    #[tokio::test]
    async fn test_retry_is_noop_after_success() {
        let (controller, _, fetcher) = controller(Some(r#"<div id="description"><p>ok</p></div>"#));

        controller.load_primary().await;
        let state = controller.retry_primary().await;

        assert_eq!(state.name(), "loaded");
        assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_locator_fails_without_fetch() {
        let fetcher = Arc::new(FixedFetcher {
            body: None,
            calls: Mutex::new(Vec::new()),
        });
        let surface = MemorySurface::new();
        let target = TooltipTarget::new(TargetId(2), Locator::SkillId("abc".to_string()), "Broken");
        let controller = TooltipController::new(
            target,
            Arc::new(LoaderOptions::default()),
            fetcher.clone(),
            Box::new(surface.clone()),
        );

        let state = controller.load_primary().await;

        assert!(matches!(state, TooltipState::Failed { origin: Origin::Primary, .. }));
        assert!(fetcher.calls.lock().unwrap().is_empty());
        assert_eq!(surface.current(), Some(TooltipContent::failed()));
    }

    #[tokio::test]
    async fn test_stale_navigation_is_dropped() {
        let (controller, surface, _) = controller(Some(
            r#"<div id="description"><a href="desc_effect.php?whicheffect=1">Buff</a></div>"#,
        ));
        controller.load_primary().await;
        let primary = controller.displayed();

        let ClickDisposition::Intercepted(nav) = controller.click("desc_effect.php?whicheffect=1") else {
            panic!("Expected interception");
        };
        controller.hidden();

        assert!(!nav.run().await);
        assert_eq!(controller.displayed(), primary);
        assert_eq!(surface.current(), Some(primary));
        assert_eq!(controller.state().name(), "loaded");
    }

    #[tokio::test]
    async fn test_newer_click_supersedes_older_navigation() {
        let (controller, surface, _) = controller(Some(
            r#"<div id="description"><a href="desc_effect.php?whicheffect=1">One</a><a href="desc_effect.php?whicheffect=2">Two</a></div>"#,
        ));
        controller.load_primary().await;

        let ClickDisposition::Intercepted(first) = controller.click("desc_effect.php?whicheffect=1") else {
            panic!("Expected interception");
        };
        let ClickDisposition::Intercepted(second) = controller.click("desc_effect.php?whicheffect=2") else {
            panic!("Expected interception");
        };

        // The newer page lands first; the older one arrives late
        assert!(second.run().await);
        assert!(!first.run().await);

        let displayed = controller.displayed();
        let fragment = displayed.fragment().expect("Expected a fragment");
        assert_eq!(
            fragment.source().as_str(),
            "http://127.0.0.1:60080/desc_effect.php?whicheffect=2"
        );
        assert_eq!(surface.current(), Some(displayed.clone()));
        assert!(matches!(controller.state(), TooltipState::Loaded { origin: Origin::Secondary, .. }));
    }

    /// Reads the controller back from inside `show`
    struct ReadingSurface {
        controller: Arc<std::sync::OnceLock<TooltipController>>,
        seen: Arc<Mutex<Vec<TooltipContent>>>,
    }

    impl TooltipSurface for ReadingSurface {
        fn show(&mut self, _content: &TooltipContent) {
            if let Some(controller) = self.controller.get() {
                self.seen.lock().unwrap().push(controller.displayed());
            }
        }
    }

    #[tokio::test]
    async fn test_surface_can_read_controller_from_show() {
        let fetcher = Arc::new(FixedFetcher {
            body: Some(r#"<div id="description"><p>Heals 10 HP</p></div>"#.to_string()),
            calls: Mutex::new(Vec::new()),
        });
        let handle = Arc::new(std::sync::OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let surface = ReadingSurface {
            controller: handle.clone(),
            seen: seen.clone(),
        };
        let target = TooltipTarget::new(TargetId(0), Locator::SkillId("7".to_string()), "Cannelloni Cocoon");
        let controller = TooltipController::new(target, Arc::new(LoaderOptions::default()), fetcher, Box::new(surface));
        handle.set(controller.clone()).unwrap();

        controller.load_primary().await;
        controller.hidden();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|c| c.fragment().map(|f| f.as_html()) == Some("<p>Heals 10 HP</p>")));
    }

    #[tokio::test]
    async fn test_report() {
        let (controller, _, _) = controller(Some(r#"<div id="description"><p>Heals 10 HP</p></div>"#));
        controller.load_primary().await;

        let report = controller.report();
        assert_eq!(report.state, "loaded");
        assert_eq!(report.label, "Cannelloni Cocoon");
        assert_eq!(report.locator, "skill 7");
        assert_eq!(report.text.as_deref(), Some("Heals 10 HP"));
        assert_eq!(
            report.url.as_deref(),
            Some("http://127.0.0.1:60080/desc_skill.php?whichskill=7&self=true")
        );
        assert!(report.error.is_none());
    }
}
