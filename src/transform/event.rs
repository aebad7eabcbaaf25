use uuid::Uuid;

/// Membership change published by the processor and layer stacks.
///
/// Each carries the id of the processor or layer concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackEvent {
    /// About to be added.
    WillAdd(Uuid),
    /// Added.
    DidAdd(Uuid),
    /// About to be removed, explicitly or by its own removal flag.
    WillRemove(Uuid),
    /// Removed.
    DidRemove(Uuid),
}

impl StackEvent {
    /// Id of the entry the event is about.
    pub fn id(self) -> Uuid {
        match self {
            Self::WillAdd(id) | Self::DidAdd(id) | Self::WillRemove(id) | Self::DidRemove(id) => id,
        }
    }
}
