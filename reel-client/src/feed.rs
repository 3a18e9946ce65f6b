//! Feed navigation
//!
//! Steps through the ordered catalog one video at a time, wrapping at both
//! ends. An id that is not in the feed navigates as if it were the first
//! entry.

use reel_common::{VideoId, VideoRecord};

/// Ordered catalog snapshot used for next/previous navigation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    videos: Vec<VideoRecord>,
}

impl Feed {
    pub fn new(videos: Vec<VideoRecord>) -> Self {
        Self { videos }
    }

    pub fn videos(&self) -> &[VideoRecord] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Index of `id` in the feed, or 0 when absent or malformed
    pub fn position(&self, id: &str) -> usize {
        VideoId::parse(id)
            .ok()
            .and_then(|id| self.videos.iter().position(|v| v.id == id))
            .unwrap_or(0)
    }

    /// Video after `current`, wrapping to the first
    pub fn next(&self, current: &str) -> Option<&VideoRecord> {
        self.step(current, 1)
    }

    /// Video before `current`, wrapping to the last
    pub fn previous(&self, current: &str) -> Option<&VideoRecord> {
        self.step(current, self.len().saturating_sub(1))
    }

    fn step(&self, current: &str, offset: usize) -> Option<&VideoRecord> {
        let len = self.len();
        if len <= 1 {
            return None;
        }
        self.videos.get((self.position(current) + offset) % len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn video(title: &str) -> VideoRecord {
        let now = Utc::now();
        VideoRecord {
            id: VideoId::generate(),
            title: title.to_string(),
            description: String::new(),
            video_url: format!("https://cdn.example/{title}.mp4"),
            thumbnail_url: "https://cdn.example/t.jpg".to_string(),
            controls: true,
            transformation: None,
            likes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn feed(titles: &[&str]) -> Feed {
        Feed::new(titles.iter().map(|t| video(t)).collect())
    }

    fn id_of(feed: &Feed, index: usize) -> String {
        feed.videos()[index].id.to_string()
    }

    #[test]
    fn test_next_and_previous_wrap_around() {
        let feed = feed(&["a", "b", "c"]);

        assert_eq!(feed.next(&id_of(&feed, 0)).unwrap().title, "b");
        assert_eq!(feed.next(&id_of(&feed, 2)).unwrap().title, "a");
        assert_eq!(feed.previous(&id_of(&feed, 0)).unwrap().title, "c");
        assert_eq!(feed.previous(&id_of(&feed, 1)).unwrap().title, "a");
    }

    #[test]
    fn test_short_feeds_have_no_neighbors() {
        let empty = Feed::default();
        assert!(empty.next("507f1f77bcf86cd799439011").is_none());
        assert!(empty.previous("507f1f77bcf86cd799439011").is_none());

        let single = feed(&["only"]);
        let id = id_of(&single, 0);
        assert!(single.next(&id).is_none());
        assert!(single.previous(&id).is_none());
    }

    #[test]
    fn test_unknown_id_navigates_from_first_entry() {
        let feed = feed(&["a", "b", "c"]);

        assert_eq!(feed.position("507f1f77bcf86cd799439011"), 0);
        assert_eq!(feed.position("not-an-id"), 0);
        assert_eq!(feed.next("not-an-id").unwrap().title, "b");
        assert_eq!(feed.previous("507f1f77bcf86cd799439011").unwrap().title, "c");
    }

    #[test]
    fn test_two_entry_feed_alternates() {
        let feed = feed(&["a", "b"]);
        let first = id_of(&feed, 0);
        let second = id_of(&feed, 1);

        assert_eq!(feed.next(&first).unwrap().id.to_string(), second);
        assert_eq!(feed.previous(&first).unwrap().id.to_string(), second);
        assert_eq!(feed.next(&second).unwrap().id.to_string(), first);
    }
}
