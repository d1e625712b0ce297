use serde::Serialize;
use uuid::Uuid;

use crate::domain::Post;

/// An author's dashboard: their posts split by status, plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub active: Vec<Post>,
    pub drafts: Vec<Post>,
    pub total_views: i64,
    pub total_likes: i64,
    pub published: usize,
    /// Highest-scoring active post.
    pub best_post_id: Option<Uuid>,
}

impl ProfileSummary {
    /// Build from an owner's posts, given newest first.
    pub fn from_posts(posts: Vec<Post>) -> Self {
        let total_views = posts.iter().map(|p| p.views).sum();
        let total_likes = posts.iter().map(|p| p.like_count).sum();

        let (active, drafts): (Vec<Post>, Vec<Post>) = posts.into_iter().partition(Post::is_active);

        // Ties go to the newer post.
        let best_post_id = active
            .iter()
            .fold(None::<&Post>, |best, post| match best {
                Some(b) if b.trending_score >= post.trending_score => Some(b),
                _ => Some(post),
            })
            .map(|p| p.id);

        Self {
            published: active.len(),
            active,
            drafts,
            total_views,
            total_likes,
            best_post_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostStatus;

    fn post(status: PostStatus, views: i64, likes: i64, score: i64) -> Post {
        let mut post = Post::new(
            Uuid::nil(),
            "t".into(),
            "b".into(),
            &Uuid::new_v4().to_string(),
            status,
            "u".into(),
        );
        post.views = views;
        post.like_count = likes;
        post.trending_score = score;
        post
    }

    #[test]
    fn test_summary_totals_include_drafts() {
        let posts = vec![
            post(PostStatus::Active, 10, 1, 15),
            post(PostStatus::Draft, 5, 2, 15),
            post(PostStatus::Active, 1, 0, 1),
        ];
        let summary = ProfileSummary::from_posts(posts);

        assert_eq!(summary.total_views, 16);
        assert_eq!(summary.total_likes, 3);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.drafts.len(), 1);
    }

    #[test]
    fn test_best_post_ignores_drafts_and_prefers_newest_on_tie() {
        let first = post(PostStatus::Active, 0, 0, 20);
        let second = post(PostStatus::Active, 0, 0, 20);
        let draft = post(PostStatus::Draft, 0, 0, 99);
        let first_id = first.id;

        let summary = ProfileSummary::from_posts(vec![first, draft, second]);
        assert_eq!(summary.best_post_id, Some(first_id));
    }

    #[test]
    fn test_empty_profile() {
        let summary = ProfileSummary::from_posts(Vec::new());
        assert_eq!(summary.best_post_id, None);
        assert_eq!(summary.published, 0);
    }
}
