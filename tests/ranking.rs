//! Ranking core tests.
//!
//! These exercise the pure scoring functions directly, with no database.

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use quill::domain::post::{Post, PostStatus};
use quill::domain::ranking::{
    self, ActivityEvent, ActivityKind, PostDigest, SuggestionCandidate,
};
use quill::domain::user::AuthorSummary;

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn post(title: &str, views: i64, likes: i64, published_at: OffsetDateTime) -> Post {
    Post {
        id: Uuid::new_v4(),
        author_id: Uuid::new_v4(),
        title: title.to_string(),
        content: String::new(),
        status: PostStatus::Published,
        tags: vec![],
        category: None,
        featured_image: None,
        created_at: published_at,
        updated_at: published_at,
        published_at: Some(published_at),
        scheduled_for: None,
        view_count: views,
        like_count: likes,
    }
}

fn author(name: &str) -> AuthorSummary {
    AuthorSummary {
        id: Uuid::new_v4(),
        name: name.to_string(),
        username: Some(name.to_string()),
        avatar_url: None,
    }
}

fn digest(views: i64, likes: i64, published_at: Option<OffsetDateTime>) -> PostDigest {
    PostDigest {
        id: Uuid::new_v4(),
        title: "post".to_string(),
        view_count: views,
        like_count: likes,
        published_at,
    }
}

// ===========================================================================
// Trending
// ===========================================================================

#[test]
fn trending_score_weights_likes_triple() {
    assert_eq!(ranking::trending_score(100, 5), 115);
    assert_eq!(ranking::trending_score(50, 1), 53);
    assert_eq!(ranking::trending_score(10, 0), 10);
    assert_eq!(ranking::trending_score(0, 0), 0);
}

#[test]
fn rank_trending_orders_by_score_desc() {
    let t = now();
    let posts = vec![
        post("low", 10, 0, t),
        post("high", 100, 5, t),
        post("mid", 50, 1, t),
    ];

    let ranked = ranking::rank_trending(posts, 10);
    let titles: Vec<&str> = ranked.iter().map(|s| s.item.title.as_str()).collect();
    let scores: Vec<i64> = ranked.iter().map(|s| s.trending_score).collect();

    assert_eq!(titles, vec!["high", "mid", "low"]);
    assert_eq!(scores, vec![115, 53, 10]);
}

#[test]
fn rank_trending_truncates_to_limit() {
    let t = now();
    let posts = (0..25).map(|i| post(&format!("p{}", i), i, 0, t)).collect();

    let ranked = ranking::rank_trending(posts, 10);
    assert_eq!(ranked.len(), 10);
    assert_eq!(ranked[0].trending_score, 24);
    assert_eq!(ranked[9].trending_score, 15);
}

#[test]
fn rank_trending_ties_keep_scan_order() {
    let t = now();
    let posts = vec![
        post("first", 10, 0, t),
        post("second", 4, 2, t),
        post("third", 10, 0, t),
    ];

    let ranked = ranking::rank_trending(posts, 10);
    let titles: Vec<&str> = ranked.iter().map(|s| s.item.title.as_str()).collect();
    // All three score 10; stable sort preserves input order.
    assert_eq!(titles, vec!["first", "second", "third"]);
}

#[test]
fn rank_trending_empty_input() {
    let ranked = ranking::rank_trending(vec![], 10);
    assert!(ranked.is_empty());
}

// ===========================================================================
// Suggested users
// ===========================================================================

#[test]
fn engagement_score_weights() {
    let candidate = SuggestionCandidate {
        author: author("alice"),
        follower_count: 3,
        posts: vec![digest(100, 2, Some(now())), digest(20, 4, Some(now()))],
    };
    // 120 views + 6 likes * 5 + 3 followers * 10
    assert_eq!(candidate.engagement_score(), 120 + 30 + 30);
}

#[test]
fn suggestions_exclude_candidates_without_posts() {
    let suggestions = ranking::rank_suggestions(
        vec![SuggestionCandidate {
            author: author("silent"),
            follower_count: 1000,
            posts: vec![],
        }],
        now(),
        10,
    );
    assert!(suggestions.is_empty());
}

#[test]
fn recent_posters_rank_before_higher_scoring_stale_ones() {
    let t = now();
    let stale = SuggestionCandidate {
        author: author("stale"),
        follower_count: 100,
        posts: vec![digest(10_000, 500, Some(t - Duration::days(30)))],
    };
    let fresh = SuggestionCandidate {
        author: author("fresh"),
        follower_count: 0,
        posts: vec![digest(1, 0, Some(t - Duration::days(1)))],
    };

    let suggestions = ranking::rank_suggestions(vec![stale, fresh], t, 10);
    let names: Vec<&str> = suggestions.iter().map(|s| s.author.name.as_str()).collect();
    assert_eq!(names, vec!["fresh", "stale"]);
}

#[test]
fn suggestions_sort_by_score_within_bucket() {
    let t = now();
    let recent = t - Duration::days(2);
    let a = SuggestionCandidate {
        author: author("a"),
        follower_count: 0,
        posts: vec![digest(10, 0, Some(recent))],
    };
    let b = SuggestionCandidate {
        author: author("b"),
        follower_count: 0,
        posts: vec![digest(50, 0, Some(recent))],
    };

    let suggestions = ranking::rank_suggestions(vec![a, b], t, 10);
    let names: Vec<&str> = suggestions.iter().map(|s| s.author.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn suggestions_carry_at_most_two_recent_posts() {
    let t = now();
    let candidate = SuggestionCandidate {
        author: author("prolific"),
        follower_count: 0,
        posts: (0..5).map(|_| digest(1, 0, Some(t))).collect(),
    };

    let suggestions = ranking::rank_suggestions(vec![candidate], t, 10);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].post_count, 5);
    assert_eq!(suggestions[0].recent_posts.len(), 2);
}

#[test]
fn suggestions_truncate_to_limit() {
    let t = now();
    let candidates = (0..8)
        .map(|i| SuggestionCandidate {
            author: author(&format!("u{}", i)),
            follower_count: i,
            posts: vec![digest(0, 0, Some(t))],
        })
        .collect();

    let suggestions = ranking::rank_suggestions(candidates, t, 3);
    assert_eq!(suggestions.len(), 3);
}

// ===========================================================================
// Creator analytics
// ===========================================================================

#[test]
fn growth_percent_rounds_to_one_decimal() {
    assert_eq!(ranking::growth_percent(1, 3), 33.3);
    assert_eq!(ranking::growth_percent(2, 3), 66.7);
    assert_eq!(ranking::growth_percent(5, 5), 100.0);
}

#[test]
fn growth_percent_zero_when_no_volume() {
    assert_eq!(ranking::growth_percent(0, 0), 0.0);
    assert_eq!(ranking::growth_percent(10, 0), 0.0);
}

#[test]
fn analytics_totals_include_drafts() {
    let t = now();
    let mut draft = post("draft", 7, 2, t);
    draft.status = PostStatus::Draft;
    draft.published_at = None;
    let posts = vec![post("old", 93, 8, t - Duration::days(90)), draft];

    let analytics = ranking::compute_analytics(&posts, 4, 2, t);
    assert_eq!(analytics.total_views, 100);
    assert_eq!(analytics.total_likes, 10);
    assert_eq!(analytics.total_comments, 4);
    assert_eq!(analytics.total_followers, 2);
    // Only the draft was created within the last 30 days.
    assert_eq!(analytics.views_growth, 7.0);
    assert_eq!(analytics.likes_growth, 20.0);
}

#[test]
fn analytics_presence_markers() {
    let t = now();
    let with = ranking::compute_analytics(&[], 1, 1, t);
    assert_eq!(with.comments_growth, 15.0);
    assert_eq!(with.followers_growth, 12.0);

    let without = ranking::compute_analytics(&[], 0, 0, t);
    assert_eq!(without.total_views, 0);
    assert_eq!(without.total_followers, 0);
    assert_eq!(without.views_growth, 0.0);
    assert_eq!(without.comments_growth, 0.0);
    assert_eq!(without.followers_growth, 0.0);
}

// ===========================================================================
// Activity timeline
// ===========================================================================

fn event(kind: ActivityKind, user: &str, at: OffsetDateTime) -> ActivityEvent {
    ActivityEvent {
        kind,
        user: user.to_string(),
        post: None,
        at,
    }
}

#[test]
fn activity_merges_newest_first_across_sources() {
    let t = now();
    let events = vec![
        event(ActivityKind::Like, "a", t - Duration::minutes(5)),
        event(ActivityKind::Follow, "b", t - Duration::minutes(1)),
        event(ActivityKind::Comment, "c", t - Duration::minutes(3)),
    ];

    let merged = ranking::merge_recent(events, 10);
    let users: Vec<&str> = merged.iter().map(|e| e.user.as_str()).collect();
    assert_eq!(users, vec!["b", "c", "a"]);
}

#[test]
fn activity_truncates_to_limit() {
    let t = now();
    let events = (0..20)
        .map(|i| event(ActivityKind::Like, "u", t - Duration::minutes(i)))
        .collect();

    let merged = ranking::merge_recent(events, 10);
    assert_eq!(merged.len(), 10);
    assert_eq!(merged[0].at, t);
    assert_eq!(merged[9].at, t - Duration::minutes(9));
}

// ===========================================================================
// Pagination
// ===========================================================================

#[test]
fn trim_page_drops_overflow_row() {
    let (rows, has_more) = ranking::trim_page(vec![1, 2, 3, 4], 3);
    assert_eq!(rows, vec![1, 2, 3]);
    assert!(has_more);
}

#[test]
fn trim_page_exact_fit_has_no_more() {
    let (rows, has_more) = ranking::trim_page(vec![1, 2, 3], 3);
    assert_eq!(rows, vec![1, 2, 3]);
    assert!(!has_more);
}

#[test]
fn trim_page_short_page() {
    let (rows, has_more) = ranking::trim_page(vec![1], 3);
    assert_eq!(rows, vec![1]);
    assert!(!has_more);

    let (rows, has_more) = ranking::trim_page(Vec::<i32>::new(), 3);
    assert!(rows.is_empty());
    assert!(!has_more);
}
