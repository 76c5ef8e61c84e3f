//! The initialization pass: one controller per target on the host page

use crate::config::LoaderOptions;
use crate::dom::{TargetId, TooltipTarget, discover_targets};
use crate::fetch::PageFetcher;
use crate::tooltip::{TargetReport, TooltipController, TooltipState, TooltipSurface};
use futures::future::join_all;
use indexmap::IndexMap;
use std::sync::Arc;

/// Owns every tooltip controller of a host page, in document order
pub struct DescriptionLoader {
    options: Arc<LoaderOptions>,
    controllers: IndexMap<TargetId, TooltipController>,
}

impl DescriptionLoader {
    /// Scan `host_html` for targets and attach a controller to each.
    ///
    /// `surface_for` creates the surface for a target. Nothing is fetched
    /// until [`load_all`](Self::load_all).
    pub fn initialize<F>(
        host_html: &str,
        options: LoaderOptions,
        fetcher: Arc<dyn PageFetcher>,
        surface_for: F,
    ) -> Self
    where
        F: FnMut(&TooltipTarget) -> Box<dyn TooltipSurface>,
    {
        let targets = discover_targets(host_html, &options.target_class);
        Self::from_targets(targets, options, fetcher, surface_for)
    }

    /// Attach a controller to each of `targets`
    pub fn from_targets<F>(
        targets: Vec<TooltipTarget>,
        options: LoaderOptions,
        fetcher: Arc<dyn PageFetcher>,
        mut surface_for: F,
    ) -> Self
    where
        F: FnMut(&TooltipTarget) -> Box<dyn TooltipSurface>,
    {
        let options = Arc::new(options);
        let mut controllers = IndexMap::with_capacity(targets.len());

        for target in targets {
            let surface = surface_for(&target);
            let id = target.id;
            let controller = TooltipController::new(target, options.clone(), fetcher.clone(), surface);
            if controllers.insert(id, controller).is_some() {
                log::warn!("Duplicate target id {}; keeping the last one", id);
            }
        }

        Self { options, controllers }
    }

    /// Run every primary load concurrently and wait for all of them.
    /// A failing target never affects the others.
    pub async fn load_all(&self) -> Vec<TooltipState> {
        log::info!("Loading {} description(s)", self.controllers.len());
        join_all(self.controllers.values().map(|c| c.load_primary())).await
    }

    /// Retry every target whose primary load failed
    pub async fn retry_failed(&self) -> Vec<TooltipState> {
        let failed: Vec<&TooltipController> = self
            .controllers
            .values()
            .filter(|c| matches!(c.primary_state(), TooltipState::Failed { .. }))
            .collect();
        join_all(failed.into_iter().map(|c| c.retry_primary())).await
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn get(&self, id: TargetId) -> Option<&TooltipController> {
        self.controllers.get(&id)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &TooltipController> {
        self.controllers.values()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Reports for all targets, in document order
    pub fn reports(&self) -> Vec<TargetReport> {
        self.controllers.values().map(|c| c.report()).collect()
    }
}
