use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use crate::utils::time_utils::short_date;
use super::{
  dedup_by_title,
  extract_image_url,
  fix_html_content_urls,
  ScrapedEvent,
  ScrapedEventKind,
  ScrapedNews,
  DEFAULT_AUTHOR
};

const MAX_FORUM_ITEMS: usize = 10;
const MIN_EVENT_TITLE_CHARS: usize = 3;
const MIN_NEWS_TITLE_CHARS: usize = 5;

lazy_static! {
  static ref EVENT_CONTAINER: Selector =
    Selector::parse(r#".event-card, .event-item, [class*="event"]"#).unwrap();
  static ref EVENT_TITLE: Selector =
    Selector::parse(r#"h3, h2, .event-title, [class*="title"]"#).unwrap();
  static ref EVENT_DESCRIPTION: Selector =
    Selector::parse(r#"p, .event-description, [class*="description"]"#).unwrap();
  static ref EVENT_DATE: Selector =
    Selector::parse(r#".event-date, [class*="date"], h4"#).unwrap();

  static ref DISCUSSION_CONTAINER: Selector =
    Selector::parse(r#"article, .discussion, [class*="Discussion"]"#).unwrap();
  static ref DISCUSSION_TITLE: Selector =
    Selector::parse(r#"h1, h2, h3, .discussion-title, [class*="Title"]"#).unwrap();
  static ref DISCUSSION_CONTENT: Selector =
    Selector::parse(r#"p, .discussion-content, [class*="Message"]"#).unwrap();
  static ref DISCUSSION_AUTHOR: Selector =
    Selector::parse(r#".author, [class*="Author"], [class*="GM"]"#).unwrap();
  static ref DISCUSSION_DATE: Selector =
    Selector::parse(r#"time, .date, [class*="Date"]"#).unwrap();

  static ref PAGE_TITLE: Selector = Selector::parse("h1").unwrap();
  static ref PAGE_BODY: Selector =
    Selector::parse(r#"article, .Message, [class*="Message"]"#).unwrap();
  static ref PAGE_AUTHOR: Selector =
    Selector::parse(r#".author, [class*="Author"]"#).unwrap();
  static ref PAGE_DATE: Selector = Selector::parse("time").unwrap();

  static ref GM_TAG: Regex = Regex::new(r"(?i)\[GM\]").unwrap();
}

fn text_of(element: ElementRef) -> String {
  element.text().collect::<String>().trim().to_string()
}

// Text of the first descendant matching, "" if none.
fn first_text(element: &ElementRef, selector: &Selector) -> String {
  element.select(selector).next()
    .map(text_of)
    .unwrap_or_default()
}

fn clean_author(raw: &str) -> String {
  let author = GM_TAG.replace_all(raw, "");
  let author = author.trim();
  if author.is_empty() {
    DEFAULT_AUTHOR.to_string()
  } else {
    author.to_string()
  }
}

// The forum doesn't always give us a date, today will do.
fn date_or_today(date: String) -> String {
  if date.is_empty() {
    short_date(Utc::now())
  } else {
    date
  }
}

/**
 * Events page of the game website. Any element with
 * "event" in its class is a candidate, the ones without
 * a decent title are dropped.
 */
pub fn parse_events(html: &str, image_base: &str) -> Vec<ScrapedEvent> {
  let document = Html::parse_document(html);
  let events = document.select(&EVENT_CONTAINER)
    .filter_map(|container| {
      let title = first_text(&container, &EVENT_TITLE);
      if title.chars().count() <= MIN_EVENT_TITLE_CHARS {
        return None;
      }
      let description = first_text(&container, &EVENT_DESCRIPTION);
      let date = first_text(&container, &EVENT_DATE);
      let kind = if date.to_lowercase().contains("ongoing") {
        ScrapedEventKind::Ongoing
      } else {
        ScrapedEventKind::Upcoming
      };
      Some(ScrapedEvent {
        description: if description.is_empty() { title.clone() } else { description },
        title,
        date: if date.is_empty() { String::from("Ongoing") } else { date },
        kind,
        image: extract_image_url(container, image_base)
      })
    })
    .collect();
  dedup_by_title(events)
}

/**
 * Listing of a forum category, one item per discussion.
 * Only the first few are kept, older ones are probably
 * already imported.
 *
 * Links inside the content point to the forum, the cover
 * image is served by the image CDN.
 */
pub fn parse_forum_listing(html: &str, forum_base: &str, image_base: &str) -> Vec<ScrapedNews> {
  let document = Html::parse_document(html);
  let news = document.select(&DISCUSSION_CONTAINER)
    .filter_map(|container| {
      let title = first_text(&container, &DISCUSSION_TITLE);
      if title.chars().count() <= MIN_NEWS_TITLE_CHARS {
        return None;
      }
      let (content, html_content) = match container.select(&DISCUSSION_CONTENT).next() {
        Some(body) => (text_of(body), fix_html_content_urls(&body.inner_html(), forum_base)),
        None => (String::new(), String::new())
      };
      Some(ScrapedNews {
        date_range: date_or_today(first_text(&container, &DISCUSSION_DATE)),
        image: extract_image_url(container, image_base),
        category: String::from("Announcements"),
        content: if content.is_empty() { title.clone() } else { content },
        html_content,
        author: clean_author(&first_text(&container, &DISCUSSION_AUTHOR)),
        title
      })
    })
    .collect();
  let mut news = dedup_by_title(news);
  news.truncate(MAX_FORUM_ITEMS);
  news
}

// A single discussion page. None when there isn't even a
// title to work with.
pub fn parse_discussion(html: &str, forum_base: &str, image_base: &str) -> Option<ScrapedNews> {
  let document = Html::parse_document(html);
  let root = document.root_element();
  let title = first_text(&root, &PAGE_TITLE);
  if title.is_empty() {
    return None;
  }
  let body = root.select(&PAGE_BODY).next();
  let content = body.map(text_of).unwrap_or_default();
  let html_content = body
    .map(|b| fix_html_content_urls(&b.inner_html(), forum_base))
    .unwrap_or_default();
  Some(ScrapedNews {
    date_range: date_or_today(first_text(&root, &PAGE_DATE)),
    image: body.map(|b| extract_image_url(b, image_base)).unwrap_or_default(),
    category: String::from("News"),
    content: if content.is_empty() { title.clone() } else { content },
    html_content,
    author: clean_author(&first_text(&root, &PAGE_AUTHOR)),
    title
  })
}
