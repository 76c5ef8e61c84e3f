//! HTML handling for description pages and the host page
//!
//! This module provides:
//! - Fragment: detached markup taken from a page's description container
//! - extract_fragment: the extractor that produces it
//! - TooltipTarget / Locator: host-page elements that get tooltips and where
//!   their descriptions live

pub mod fragment;
pub mod target;

pub use fragment::{Fragment, FragmentLink, extract_fragment};
pub use target::{Locator, TargetId, TooltipTarget, discover_targets};
