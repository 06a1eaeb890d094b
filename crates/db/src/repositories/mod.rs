//! Repositories wrapping `SeaORM` queries.

mod comment;
mod grouped;
mod subscription;
mod user;
mod video;
mod video_like;
mod view;

pub use comment::CommentRepository;
pub use grouped::{CountMap, count_grouped};
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
pub use video::VideoRepository;
pub use video_like::VideoLikeRepository;
pub use view::ViewRepository;
