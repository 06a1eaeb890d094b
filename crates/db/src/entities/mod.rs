//! `SeaORM` entity definitions.

#![allow(missing_docs)]

pub mod comment;
pub mod subscription;
pub mod user;
pub mod video;
pub mod video_like;
pub mod view;

pub use comment::Entity as Comment;
pub use subscription::Entity as Subscription;
pub use user::Entity as User;
pub use video::Entity as Video;
pub use video_like::Entity as VideoLike;
pub use view::Entity as View;
