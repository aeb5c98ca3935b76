pub mod aggregator;
pub mod content;
pub mod dispatcher;
pub mod session;

pub use aggregator::{FinalizedGroup, MediaGroupAggregator, DEFAULT_GROUP_DEBOUNCE};
pub use content::{group_caption, ButtonKind, MediaItem, MediaKind, PostButton, PostContent};
pub use dispatcher::{BroadcastDispatcher, DeliveryReport};
pub use session::{ComposedPost, LabelOutcome, MailingPhase, MailingSessions, SessionError};
