use crate::tooltip::TooltipContent;
use std::sync::{Arc, Mutex, PoisonError};

/// The widget that renders a tooltip.
///
/// The controller calls [`show`](TooltipSurface::show) whenever the content
/// changes. The host is expected to call
/// [`TooltipController::hidden`](crate::tooltip::TooltipController::hidden)
/// when the widget hides.
///
/// `show` runs without the controller's state lock, so it may read the
/// controller (`state`, `displayed`, `report`). It must not call `hidden`
/// or `click` synchronously: those publish to this same surface and would
/// deadlock. Defer them to the host's event loop instead.
pub trait TooltipSurface: Send {
    /// Replace whatever is displayed with `content`
    fn show(&mut self, content: &TooltipContent);
}

/// Surface that records everything it was asked to show.
///
/// Clones share the same history, so a caller can keep one handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    shown: Arc<Mutex<Vec<TooltipContent>>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything shown so far, oldest first
    pub fn history(&self) -> Vec<TooltipContent> {
        self.shown.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The content currently displayed
    pub fn current(&self) -> Option<TooltipContent> {
        self.shown.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

impl TooltipSurface for MemorySurface {
    fn show(&mut self, content: &TooltipContent) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(content.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_history() {
        let handle = MemorySurface::new();
        let mut owned = handle.clone();

        assert!(handle.current().is_none());
        owned.show(&TooltipContent::loading());
        owned.show(&TooltipContent::failed());

        assert_eq!(handle.history().len(), 2);
        assert_eq!(handle.current(), Some(TooltipContent::failed()));
    }
}
