//! Branch state for nested IF/NOTIF blocks

/// One boolean per open IF/NOTIF frame. A false entry anywhere in the
/// stack marks the current position as a dead branch.
#[derive(Debug, Clone, Default)]
pub struct ConditionalStack {
    branches: Vec<bool>,
}

impl ConditionalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new frame with the taken/not-taken state of its IF.
    pub fn open(&mut self, value: bool) {
        self.branches.push(value);
    }

    /// Flip the innermost frame (ELSE). No effect when no frame is open;
    /// callers reject that case via [`is_closed`](Self::is_closed).
    pub fn toggle_top(&mut self) {
        if let Some(top) = self.branches.last_mut() {
            *top = !*top;
        }
    }

    /// Discard the innermost frame (ENDIF).
    pub fn close(&mut self) {
        self.branches.pop();
    }

    /// True when no frame is open. Must hold before and after a full
    /// script run.
    pub fn is_closed(&self) -> bool {
        self.branches.is_empty()
    }

    /// True when any open frame chose the branch not taken.
    pub fn has_failed_branches(&self) -> bool {
        self.branches.iter().any(|taken| !taken)
    }

    pub fn clear(&mut self) {
        self.branches.clear();
    }
}
