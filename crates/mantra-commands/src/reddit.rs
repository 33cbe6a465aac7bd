//! Serves cached subreddit posts.

use crate::framework::{Context, Error};
use chrono::{DateTime, Utc};
use mantra_common::{format_duration, truncate_string, Topic};
use mantra_content::{CacheEntry, ContentItem, RefreshError};
use poise::serenity_prelude as serenity;

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];
const EMBED_TITLE_LIMIT: usize = 256;

/// Shows the newest cached post of a subreddit.
#[poise::command(prefix_command, slash_command, aliases("meme"))]
pub async fn reddit(
    ctx: Context<'_>,
    #[description = "Subreddit, for example r/cats"] topic: Option<String>,
) -> Result<(), Error> {
    let topic = topic
        .map(Topic::new)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| ctx.data().default_topic.clone());
    if let Some(message) = untracked(&topic, &ctx.data().tracked_topics) {
        ctx.say(message).await?;
        return Ok(());
    }
    let entry = ctx.data().cache.get(&topic);

    match render(&topic, &entry, Utc::now()) {
        Rendered::Nothing(message) => {
            ctx.say(message).await?;
        }
        Rendered::Post { item, note } => {
            let mut reply = poise::CreateReply::default().embed(post_embed(&item));
            if let Some(note) = note {
                reply = reply.content(note);
            }
            ctx.send(reply).await?;
        }
    }
    Ok(())
}

/// What the command answers with, decided from a cache snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rendered {
    Nothing(String),
    Post {
        item: ContentItem,
        note: Option<String>,
    },
}

/// The reply for a topic that ingestion never fills, if `topic` is one.
fn untracked(topic: &Topic, tracked: &[Topic]) -> Option<String> {
    if tracked.contains(topic) {
        return None;
    }
    let names: Vec<String> = tracked.iter().map(|t| format!("r/{t}")).collect();
    let mut message = if topic.is_valid_name() {
        format!("r/{topic} isn't tracked here.")
    } else {
        format!("`{}` isn't a subreddit name.", truncate_string(topic.as_str(), 32))
    };
    if !names.is_empty() {
        message.push_str(&format!(" Try one of: {}.", names.join(", ")));
    }
    Some(message)
}

/// Picks the newest post that is safe for any channel. A failing refresh
/// does not hide what is already cached; it only adds a staleness note.
fn render(topic: &Topic, entry: &CacheEntry, now: DateTime<Utc>) -> Rendered {
    let Some(item) = entry.items.iter().find(|item| !item.payload.nsfw) else {
        let mut message = format!("Nothing cached for r/{topic} yet.");
        if let Some(error) = &entry.last_refresh_error {
            message.push_str(&format!(" {}", failure_note(error, now)));
        }
        return Rendered::Nothing(message);
    };

    let note = entry.last_refresh_error.as_ref().map(|error| {
        let age = entry
            .last_refresh_at
            .map_or_else(|| "a while".to_string(), |at| format_duration(now - at));
        format!("Showing posts from {age} ago. {}", failure_note(error, now))
    });

    Rendered::Post {
        item: item.clone(),
        note,
    }
}

fn failure_note(error: &RefreshError, now: DateTime<Utc>) -> String {
    format!(
        "Refreshing has failed {} time(s), last {} ago.",
        error.consecutive_failures,
        format_duration(now - error.at)
    )
}

fn post_embed(item: &ContentItem) -> serenity::CreateEmbed {
    let payload = &item.payload;
    let mut embed = serenity::CreateEmbed::new()
        .title(truncate_string(&payload.title, EMBED_TITLE_LIMIT))
        .url(&payload.permalink)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "r/{} | u/{} | {} points",
            item.topic, payload.author, payload.score
        )))
        .timestamp(serenity::Timestamp::from(item.fetched_at));

    if is_image(&payload.url) {
        embed = embed.image(&payload.url);
    }
    embed
}

fn is_image(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantra_common::test_utils::at_second;
    use mantra_content::{ContentPayload, RefreshErrorKind};

    fn item(id: &str, nsfw: bool) -> ContentItem {
        ContentItem::new(
            id,
            Topic::new("cats"),
            ContentPayload {
                title: format!("post {id}"),
                nsfw,
                ..ContentPayload::default()
            },
            at_second(0),
        )
    }

    fn failure(at: i64, count: u32) -> RefreshError {
        RefreshError {
            kind: RefreshErrorKind::Transient,
            message: "503".into(),
            at: at_second(at),
            consecutive_failures: count,
        }
    }

    #[test]
    fn test_untracked_topic_is_named() {
        let tracked = [Topic::new("cats"), Topic::new("memes")];

        assert_eq!(untracked(&Topic::new("r/Cats"), &tracked), None);
        assert_eq!(
            untracked(&Topic::new("dogs"), &tracked),
            Some("r/dogs isn't tracked here. Try one of: r/cats, r/memes.".into())
        );
        assert_eq!(
            untracked(&Topic::new("dogs"), &[]),
            Some("r/dogs isn't tracked here.".into())
        );
    }

    #[test]
    fn test_malformed_topic_is_not_a_subreddit() {
        let message = untracked(&Topic::new("cats?limit=1"), &[Topic::new("cats")]).unwrap();
        assert!(message.starts_with("`cats?limit=1` isn't a subreddit name."));
    }

    #[test]
    fn test_empty_entry() {
        let rendered = render(&Topic::new("cats"), &CacheEntry::default(), at_second(0));
        assert_eq!(
            rendered,
            Rendered::Nothing("Nothing cached for r/cats yet.".into())
        );
    }

    #[test]
    fn test_empty_entry_explains_failures() {
        let entry = CacheEntry {
            last_refresh_error: Some(failure(10, 3)),
            ..CacheEntry::default()
        };
        let Rendered::Nothing(message) = render(&Topic::new("cats"), &entry, at_second(70)) else {
            panic!("expected no post");
        };
        assert!(message.contains("failed 3 time(s), last 1m 0s ago"));
    }

    #[test]
    fn test_fresh_entry_has_no_note() {
        let entry = CacheEntry {
            items: vec![item("b", false), item("a", false)],
            last_refresh_at: Some(at_second(0)),
            last_refresh_error: None,
        };
        let rendered = render(&Topic::new("cats"), &entry, at_second(5));
        assert_eq!(
            rendered,
            Rendered::Post {
                item: item("b", false),
                note: None
            }
        );
    }

    #[test]
    fn test_stale_entry_still_serves_post() {
        let entry = CacheEntry {
            items: vec![item("a", false)],
            last_refresh_at: Some(at_second(0)),
            last_refresh_error: Some(failure(100, 2)),
        };
        let Rendered::Post { item: picked, note } =
            render(&Topic::new("cats"), &entry, at_second(130))
        else {
            panic!("expected a post");
        };
        assert_eq!(picked.id, "a");
        let note = note.unwrap();
        assert!(note.starts_with("Showing posts from 2m 10s ago."));
        assert!(note.contains("failed 2 time(s)"));
    }

    #[test]
    fn test_nsfw_posts_are_skipped() {
        let entry = CacheEntry {
            items: vec![item("spicy", true), item("tame", false)],
            last_refresh_at: Some(at_second(0)),
            last_refresh_error: None,
        };
        let Rendered::Post { item: picked, .. } = render(&Topic::new("cats"), &entry, at_second(0))
        else {
            panic!("expected a post");
        };
        assert_eq!(picked.id, "tame");

        let only_nsfw = CacheEntry {
            items: vec![item("spicy", true)],
            ..entry
        };
        assert!(matches!(
            render(&Topic::new("cats"), &only_nsfw, at_second(0)),
            Rendered::Nothing(_)
        ));
    }

    #[test]
    fn test_image_detection() {
        assert!(is_image("https://i.redd.it/loaf.JPG"));
        assert!(is_image("https://i.imgur.com/x.png?width=640"));
        assert!(!is_image("https://v.redd.it/clip"));
        assert!(!is_image("https://www.reddit.com/r/cats/comments/a/"));
    }
}
