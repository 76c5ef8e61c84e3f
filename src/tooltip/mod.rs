//! Tooltip controllers and the surfaces they drive
//!
//! - TooltipContent: what a surface displays (placeholder or fragment)
//! - TooltipSurface: the rendering widget, seen from the controller
//! - TooltipController: per-target state machine
//!   (`Loading` → `Loaded` | `Failed`, link clicks → `NavigatingSecondary`,
//!   hide → back to the primary content)

pub mod content;
pub mod controller;
pub mod surface;

pub use content::TooltipContent;
pub use controller::{ClickDisposition, Origin, SecondaryNavigation, TargetReport, TooltipController, TooltipState};
pub use surface::{MemorySurface, TooltipSurface};
