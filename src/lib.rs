//! # better-trainer
//!
//! Hover descriptions for a game's skill trainer page.
//!
//! The trainer page marks each skill with a class and a data attribute that
//! points at the skill's description page. This crate fetches those pages,
//! pulls out the `description` container and drives a tooltip surface with
//! it. Links inside a tooltip that point at other description pages (skills,
//! effects, familiars, items) are followed in place; hiding the tooltip
//! returns it to the skill's own description.
//!
//! ## Features
//!
//! - **Fragment extraction**: the children of `#description`, detached from the fetched page
//! - **Tooltip controllers**: one state machine per target, `Loading` → `Loaded` | `Failed`
//! - **In-tooltip navigation**: viewable links are intercepted, everything else passes through
//! - **Concurrent loading**: every target's page is fetched at once, failures stay local
//!
//! ## CLI
//!
//! ```bash
//! # Show the description of skill 7 through the local relay browser
//! cargo run -- describe 7
//!
//! # Follow the first viewable link inside it
//! cargo run -- describe 7 --follow 0
//!
//! # Load every tooltip of a saved trainer page
//! cargo run -- scan --file guild.html --json
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use better_trainer::{DescriptionLoader, HttpFetcher, LoaderOptions, MemorySurface};
//! use std::sync::Arc;
//!
//! # async fn run(host_html: &str) -> better_trainer::Result<()> {
//! let options = LoaderOptions::default();
//! let fetcher = Arc::new(HttpFetcher::new(&options)?);
//!
//! let loader = DescriptionLoader::initialize(host_html, options, fetcher, |_| {
//!     Box::new(MemorySurface::new())
//! });
//! loader.load_all().await;
//!
//! for report in loader.reports() {
//!     println!("{} {}: {}", report.id, report.label, report.state);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Following a link
//!
//! ```rust,no_run
//! # use better_trainer::{ClickDisposition, TooltipController};
//! # async fn run(controller: &TooltipController) {
//! if let ClickDisposition::Intercepted(navigation) = controller.click("desc_effect.php?whicheffect=12") {
//!     navigation.run().await;
//! }
//! // Hiding the tooltip drops the secondary page again
//! controller.hidden();
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: Loader options and fixed constants
//! - [`dom`]: Fragment extraction and host-page target discovery
//! - [`fetch`]: The page fetcher trait and its HTTP implementation
//! - [`links`]: Which in-tooltip links are followed
//! - [`tooltip`]: Controllers, content and surfaces
//! - [`loader`]: One controller per target, loaded concurrently
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod links;
pub mod loader;
pub mod tooltip;

pub use config::LoaderOptions;
pub use dom::{Fragment, FragmentLink, Locator, TargetId, TooltipTarget, extract_fragment};
pub use error::{Result, TooltipError};
pub use fetch::{HttpFetcher, PageFetcher};
pub use links::PageKind;
pub use loader::DescriptionLoader;
pub use tooltip::{
    ClickDisposition, MemorySurface, Origin, SecondaryNavigation, TargetReport, TooltipContent,
    TooltipController, TooltipState, TooltipSurface,
};
