//! Application services - orchestrate ports to implement the use cases.

mod engagement;
mod media;
mod notifications;
mod posts;
mod profile;

pub use engagement::{CommentRemoval, EngagementService, LikeOutcome, ViewOutcome};
pub use media::MediaPipeline;
pub use notifications::{ContactMessage, MailSettings, NotificationError, NotificationService};
pub use posts::{PostInput, PostService};
pub use profile::ProfileSummary;
