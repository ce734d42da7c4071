use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::db::entities::{EventType, NewEvent, NewNews};
mod images;
mod parsers;
pub use images::{extract_image_url, fix_html_content_urls};
pub use parsers::{parse_events, parse_forum_listing, parse_discussion};

// Everything in here works on HTML strings and never
// touches the network, fetching is the app's business.

pub const DEFAULT_AUTHOR: &str = "GM Xenon";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapedEventKind {
  Ongoing,
  Upcoming,
  Trending
}

// These also come back from the dashboard as "selectedItems"
// after a preview, hence Deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedEvent {
  pub title: String,
  pub description: String,
  pub date: String,
  #[serde(rename = "type")]
  pub kind: ScrapedEventKind,
  #[serde(default)]
  pub image: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedNews {
  pub title: String,
  pub date_range: String,
  #[serde(default)]
  pub image: String,
  pub category: String,
  pub content: String,
  #[serde(default)]
  pub html_content: String,
  pub author: String
}

pub trait Titled {
  fn title(&self) -> &str;
}

impl Titled for ScrapedEvent {
  fn title(&self) -> &str {
    &self.title
  }
}

impl Titled for ScrapedNews {
  fn title(&self) -> &str {
    &self.title
  }
}

// Exact title match, the first one wins.
pub fn dedup_by_title<T: Titled>(items: Vec<T>) -> Vec<T> {
  let mut seen = HashSet::new();
  items.into_iter()
    .filter(|item| seen.insert(item.title().to_string()))
    .collect()
}

// Nobody translated anything yet, the Arabic fields get
// the original text so the pages aren't empty.
impl From<ScrapedEvent> for NewEvent {
  fn from(scraped: ScrapedEvent) -> Self {
    let event_type = match scraped.kind {
      ScrapedEventKind::Upcoming => EventType::Upcoming,
      ScrapedEventKind::Ongoing | ScrapedEventKind::Trending => EventType::Trending
    };
    NewEvent {
      title_ar: scraped.title.clone(),
      title: scraped.title,
      description_ar: scraped.description.clone(),
      description: scraped.description,
      date: scraped.date,
      event_type,
      image: scraped.image
    }
  }
}

impl From<ScrapedNews> for NewNews {
  fn from(scraped: ScrapedNews) -> Self {
    let html_content = if scraped.html_content.is_empty() {
      scraped.content.clone()
    } else {
      scraped.html_content
    };
    NewNews {
      title_ar: scraped.title.clone(),
      title: scraped.title,
      date_range: scraped.date_range,
      image: scraped.image,
      category: scraped.category,
      content_ar: scraped.content.clone(),
      content: scraped.content,
      html_content,
      author: scraped.author,
      featured: false
    }
  }
}
