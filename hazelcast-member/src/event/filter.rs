/// Subscription filter for collection item events.
///
/// Only decides whether the item travels with the event; every event on
/// the subscribed collection passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CollectionEventFilter {
    include_value: bool,
}

impl CollectionEventFilter {
    /// Creates a filter.
    pub fn new(include_value: bool) -> Self {
        Self { include_value }
    }

    /// Whether the changed item is delivered with the event.
    pub fn include_value(&self) -> bool {
        self.include_value
    }
}
