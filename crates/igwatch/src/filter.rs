//! Pure predicates deciding whether an item qualifies for notification.

use instagram::StoryItem;

/// Max caption characters carried into a notification.
const EXCERPT_MAX_CHARS: usize = 100;

/// Case-insensitive substring match of any configured keyword against a
/// caption. Keywords are expected pre-lowercased (done at config load).
#[must_use]
pub fn keyword_match(caption: &str, keywords: &[String]) -> bool {
    let caption = caption.to_lowercase();
    keywords.iter().any(|keyword| caption.contains(keyword))
}

/// Caption excerpt capped at 100 characters, respecting UTF-8 character
/// boundaries.
#[must_use]
pub fn caption_excerpt(caption: &str) -> String {
    if caption.chars().count() <= EXCERPT_MAX_CHARS {
        caption.to_string()
    } else {
        let truncated: String = caption.chars().take(EXCERPT_MAX_CHARS).collect();
        format!("{truncated}...")
    }
}

/// The outbound link of a story, if it has one. Link stickers take
/// priority over call-to-action URIs.
#[must_use]
pub fn story_link(item: &StoryItem) -> Option<&str> {
    item.link_sticker_url
        .as_deref()
        .or(item.cta_url.as_deref())
}

/// Permalink for a feed post shortcode.
#[must_use]
pub fn permalink(code: &str) -> String {
    format!("https://www.instagram.com/p/{code}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(sticker: Option<&str>, cta: Option<&str>) -> StoryItem {
        StoryItem {
            id: "s1".to_string(),
            author_id: "100".to_string(),
            link_sticker_url: sticker.map(String::from),
            cta_url: cta.map(String::from),
        }
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let keywords = vec!["sale".to_string()];
        assert!(keyword_match("Big SALE today", &keywords));
        assert!(keyword_match("resale value", &keywords));
        assert!(!keyword_match("nothing here", &keywords));
    }

    #[test]
    fn empty_keyword_list_matches_nothing() {
        assert!(!keyword_match("Big SALE today", &[]));
    }

    #[test]
    fn short_captions_pass_through_untruncated() {
        assert_eq!(caption_excerpt("Flash SALE now"), "Flash SALE now");
    }

    #[test]
    fn long_captions_are_capped_at_100_chars() {
        let long: String = "x".repeat(250);
        let excerpt = caption_excerpt(&long);
        assert_eq!(excerpt.chars().count(), 103); // 100 + "..."
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn excerpt_respects_multibyte_boundaries() {
        let long: String = "é".repeat(150);
        let excerpt = caption_excerpt(&long);
        assert!(excerpt.starts_with('é'));
        assert_eq!(excerpt.chars().count(), 103);
    }

    #[test]
    fn sticker_link_wins_over_cta() {
        let item = story(Some("http://sticker"), Some("http://cta"));
        assert_eq!(story_link(&item), Some("http://sticker"));
    }

    #[test]
    fn cta_is_the_fallback() {
        let item = story(None, Some("http://x"));
        assert_eq!(story_link(&item), Some("http://x"));
    }

    #[test]
    fn no_carrier_means_no_link() {
        assert_eq!(story_link(&story(None, None)), None);
    }

    #[test]
    fn permalink_embeds_the_code() {
        assert_eq!(permalink("abc123"), "https://www.instagram.com/p/abc123/");
    }
}
