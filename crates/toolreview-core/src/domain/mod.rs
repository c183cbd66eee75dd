//! Domain entities - the core business objects.

mod actor;
pub mod email;
mod newsletter;
mod post;
mod section;
mod user;

pub use actor::Actor;
pub use newsletter::{ConfirmOutcome, NewsletterSignup};
pub use post::{AuthoredComment, Comment, LikeState, Post, PostContent, parse_tag_list};
pub use section::{Section, SectionBody, SectionError, SectionKind, ToolReview};
pub use user::{Role, User};
