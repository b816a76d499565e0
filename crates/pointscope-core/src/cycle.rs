//! Sequential navigation over the registry's cycle order.

/// Position in the cycle order. Starts before the first element.
#[derive(Debug, Default)]
pub struct CycleNavigator {
    index: Option<usize>,
}

impl CycleNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Back to "before the first element".
    pub fn reset(&mut self) {
        self.index = None;
    }

    /// Advance with wrap-around and return the id now under the cursor.
    /// An empty order is a no-op.
    pub fn next(&mut self, order: &[String]) -> Option<String> {
        let len = order.len();
        if len == 0 {
            return None;
        }

        let index = match self.index {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.index = Some(index);
        order.get(index).cloned()
    }

    /// Step backward with wrap-around; from the start this lands on the last id.
    pub fn previous(&mut self, order: &[String]) -> Option<String> {
        let len = order.len();
        if len == 0 {
            return None;
        }

        let index = match self.index {
            Some(i) if i > 0 => (i - 1).min(len - 1),
            _ => len - 1,
        };
        self.index = Some(index);
        order.get(index).cloned()
    }
}
