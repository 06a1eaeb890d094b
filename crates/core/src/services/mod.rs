//! Business logic services.

#![allow(missing_docs)]

pub mod aggregate;
pub mod channel;
pub mod comment;
pub mod subscription;
pub mod user;
pub mod video;
pub mod video_like;
pub mod view;

pub use aggregate::{CountLookup, IdSet};
pub use channel::{ChannelService, ChannelSummary, Profile, ProfileVideo, SubscribedChannel};
pub use comment::{AddCommentInput, CommentService};
pub use subscription::{SubscriptionService, SubscriptionState};
pub use user::{EditProfileInput, LoginInput, SignupInput, UserService};
pub use video::{
    CommentWithAuthor, CreateVideoInput, VideoDetail, VideoRelation, VideoService, VideoSummary,
};
pub use video_like::{LikeState, Reaction, VideoLikeService};
pub use view::ViewService;
