//! Channel listings and profile pages.
//!
//! Every user doubles as a channel. The listings here attach subscriber and
//! video counts with grouped queries and mark which channels the viewer already
//! subscribes to.

use futures::try_join;
use vidtube_common::{AppError, AppResult};
use vidtube_db::{
    entities::{user, video},
    repositories::{SubscriptionRepository, UserRepository, VideoRepository, ViewRepository},
};

use crate::services::aggregate::{CountLookup, IdSet, index_by_id};

/// Number of channels suggested to a viewer.
pub const RECOMMENDED_CHANNELS: u64 = 10;

/// A channel as seen by the viewer in search results and suggestions.
#[derive(Debug, Clone)]
pub struct ChannelSummary {
    pub user: user::Model,
    pub subscribers_count: u64,
    pub videos_count: u64,
    pub is_subscribed: bool,
    pub is_me: bool,
}

/// A channel the profile owner subscribes to.
#[derive(Debug, Clone)]
pub struct SubscribedChannel {
    pub user: user::Model,
    pub subscribers_count: u64,
}

/// One of the profile owner's uploads.
#[derive(Debug, Clone)]
pub struct ProfileVideo {
    pub video: video::Model,
    pub views: u64,
}

/// A user's channel page.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: user::Model,
    pub subscribers_count: u64,
    pub is_me: bool,
    pub is_subscribed: bool,
    pub channels: Vec<SubscribedChannel>,
    pub videos: Vec<ProfileVideo>,
}

/// Channel service for business logic.
#[derive(Clone)]
pub struct ChannelService {
    user_repo: UserRepository,
    subscription_repo: SubscriptionRepository,
    video_repo: VideoRepository,
    view_repo: ViewRepository,
}

impl ChannelService {
    /// Create a new channel service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        subscription_repo: SubscriptionRepository,
        video_repo: VideoRepository,
        view_repo: ViewRepository,
    ) -> Self {
        Self {
            user_repo,
            subscription_repo,
            video_repo,
            view_repo,
        }
    }

    /// Users whose username contains `term`.
    pub async fn search(&self, viewer_id: &str, term: Option<&str>) -> AppResult<Vec<ChannelSummary>> {
        let term = term.map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter your search term".to_string(),
            ));
        }

        let users = self.user_repo.search_by_username(term).await?;
        self.summarize(viewer_id, users).await
    }

    /// Newest channels other than the viewer's own.
    pub async fn recommended(&self, viewer_id: &str) -> AppResult<Vec<ChannelSummary>> {
        let users = self
            .user_repo
            .find_recommended(viewer_id, RECOMMENDED_CHANNELS)
            .await?;
        self.summarize(viewer_id, users).await
    }

    /// Load the channel page of `profile_id` as seen by `viewer_id`.
    pub async fn profile(&self, viewer_id: &str, profile_id: &str) -> AppResult<Profile> {
        let user = self.user_repo.get_by_id(profile_id).await?;

        let (subscribers_count, is_subscribed, channel_ids, videos) = try_join!(
            self.subscription_repo.count_subscribers(profile_id),
            self.subscription_repo.is_subscribed(viewer_id, profile_id),
            self.subscription_repo.find_channel_ids(profile_id),
            self.video_repo.find_by_user(profile_id),
        )?;

        let video_ids: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();
        let (channels, channel_counts, views) = try_join!(
            self.user_repo.find_by_ids(&channel_ids),
            self.subscription_repo.count_by_channels(&channel_ids),
            self.view_repo.count_by_videos(&video_ids),
        )?;

        let mut channels = index_by_id(channels, |u| &u.id);
        let channels = channel_ids
            .iter()
            .filter_map(|id| channels.remove(id))
            .map(|user| SubscribedChannel {
                subscribers_count: channel_counts.count_of(&user.id),
                user,
            })
            .collect();

        let videos = videos
            .into_iter()
            .map(|video| ProfileVideo {
                views: views.count_of(&video.id),
                video,
            })
            .collect();

        Ok(Profile {
            user,
            subscribers_count,
            is_me: viewer_id == profile_id,
            is_subscribed,
            channels,
            videos,
        })
    }

    /// Attach counts and viewer flags, keeping the input order.
    async fn summarize(
        &self,
        viewer_id: &str,
        users: Vec<user::Model>,
    ) -> AppResult<Vec<ChannelSummary>> {
        if users.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = users.iter().map(|u| u.id.clone()).collect();
        let (subscribers, videos, subscribed) = try_join!(
            self.subscription_repo.count_by_channels(&ids),
            self.video_repo.count_by_users(&ids),
            self.subscription_repo.find_subscribed_among(viewer_id, &ids),
        )?;
        let subscribed: IdSet = subscribed.into_iter().collect();

        Ok(users
            .into_iter()
            .map(|user| ChannelSummary {
                subscribers_count: subscribers.count_of(&user.id),
                videos_count: videos.count_of(&user.id),
                is_subscribed: subscribed.contains(&user.id),
                is_me: user.id == viewer_id,
                user,
            })
            .collect())
    }
}
