//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database writes and notification delivery.

mod follow;
mod member;
mod notification;
mod post;
mod reaction;

pub use follow::FollowService;
pub use member::{MemberService, ProfileChanges, Registration};
pub use notification::{NotificationPage, NotificationService};
pub use post::PostService;
pub use reaction::ReactionService;
