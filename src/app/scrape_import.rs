use std::collections::HashSet;
use std::sync::atomic::{self, AtomicBool};
use log::{info, warn};
use crate::config::ScraperSettings;
use crate::db::entities::{Event, News};
use crate::db::Store;
use crate::scraping::{
  parse_discussion,
  parse_events,
  parse_forum_listing,
  ScrapedEvent,
  ScrapedNews
};
use super::error::{Error, map_db_error};

/**
 * Fetches pages from the game website and its forum, and
 * turns what the scraping heuristics find into events and
 * news. Only one import can run at a time, there is an
 * atomic bool in here acting as the lock.
 *
 * A page that can't be fetched is not an error, we log it
 * and act as if it had nothing in it.
 */
pub struct ScrapeService {
  client: reqwest::Client,
  settings: ScraperSettings,
  is_import_locked: AtomicBool
}

// Releases the import lock when dropped, so an early
// return with ? can't leave it locked forever.
pub struct ImportLock<'a> {
  flag: &'a AtomicBool
}

impl Drop for ImportLock<'_> {
  fn drop(&mut self) {
    self.flag.store(false, atomic::Ordering::SeqCst);
  }
}

#[derive(Debug)]
pub struct ImportResult<T> {
  pub created: Vec<T>,
  pub skipped: usize
}

impl ScrapeService {

  pub fn new(client: reqwest::Client, settings: ScraperSettings) -> Self {
    Self {
      client,
      settings,
      is_import_locked: AtomicBool::new(false)
    }
  }

  // compare_exchange only updates the bool if it was still
  // false, Err means someone else holds the lock.
  pub fn lock(&self) -> Result<ImportLock<'_>, Error> {
    match self.is_import_locked.compare_exchange(
      false,
      true,
      atomic::Ordering::SeqCst,
      atomic::Ordering::Acquire
    ) {
      Ok(_) => Ok(ImportLock { flag: &self.is_import_locked }),
      Err(_) => {
        warn!("A scrape import was attempted while another one is running");
        Err(Error::Conflict(String::from("An import is already in progress")))
      }
    }
  }

  async fn fetch_html(&self, url: &str) -> Option<String> {
    let response = match self.client.get(url).send().await {
      Ok(r) => r,
      Err(e) => {
        warn!("Could not fetch {} - {}", url, e);
        return None;
      }
    };
    if !response.status().is_success() {
      warn!("Fetching {} gave HTTP status {}", url, response.status());
      return None;
    }
    match response.text().await {
      Ok(body) => Some(body),
      Err(e) => {
        warn!("Could not read the body of {} - {}", url, e);
        None
      }
    }
  }

  pub async fn scrape_events(&self) -> Vec<ScrapedEvent> {
    let events = match self.fetch_html(&self.settings.events_url).await {
      Some(html) => parse_events(&html, &self.settings.image_base),
      None => Vec::new()
    };
    info!("Scraped {} events from {}", events.len(), self.settings.events_url);
    events
  }

  // With a URL we scrape that one discussion, otherwise the
  // latest items of the announcements forum.
  pub async fn scrape_news(&self, url: Option<&str>) -> Vec<ScrapedNews> {
    let news = match url {
      Some(url) => self.fetch_html(url).await
        .and_then(|html| parse_discussion(&html, &self.settings.forum_base, &self.settings.image_base))
        .into_iter()
        .collect(),
      None => match self.fetch_html(&self.settings.forum_url).await {
        Some(html) => parse_forum_listing(&html, &self.settings.forum_base, &self.settings.image_base),
        None => Vec::new()
      }
    };
    info!(
      "Scraped {} news items from {}",
      news.len(),
      url.unwrap_or(&self.settings.forum_url)
    );
    news
  }

}

fn lowercase_titles<'a, I: Iterator<Item = &'a str>>(titles: I) -> HashSet<String> {
  titles.map(|t| t.trim().to_lowercase()).collect()
}

// Titles are compared case-insensitively with what's
// already stored and with what this batch created.
pub fn import_events(
  store: &dyn Store,
  items: Vec<ScrapedEvent>
) -> Result<ImportResult<Event>, Error> {
  let existing = store.all_events().map_err(map_db_error)?;
  let mut seen = lowercase_titles(existing.iter().map(|e| e.title.as_str()));
  let mut result = ImportResult { created: Vec::new(), skipped: 0 };
  for item in items {
    if !seen.insert(item.title.trim().to_lowercase()) {
      result.skipped += 1;
      continue;
    }
    let event = store.insert_event(item.into()).map_err(map_db_error)?;
    result.created.push(event);
  }
  info!("Imported {} events, skipped {}", result.created.len(), result.skipped);
  Ok(result)
}

pub fn import_news(
  store: &dyn Store,
  items: Vec<ScrapedNews>
) -> Result<ImportResult<News>, Error> {
  let existing = store.all_news().map_err(map_db_error)?;
  let mut seen = lowercase_titles(existing.iter().map(|n| n.title.as_str()));
  let mut result = ImportResult { created: Vec::new(), skipped: 0 };
  for item in items {
    if !seen.insert(item.title.trim().to_lowercase()) {
      result.skipped += 1;
      continue;
    }
    let news = store.insert_news(item.into()).map_err(map_db_error)?;
    result.created.push(news);
  }
  info!("Imported {} news items, skipped {}", result.created.len(), result.skipped);
  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::entities::{EventType, NewNews};
  use crate::db::MemoryStore;
  use crate::scraping::ScrapedEventKind;

  fn settings() -> ScraperSettings {
    ScraperSettings {
      events_url: String::from("http://127.0.0.1:9/events"),
      forum_url: String::from("http://127.0.0.1:9/forum"),
      forum_base: String::from("http://127.0.0.1:9"),
      image_base: String::from("http://127.0.0.1:9")
    }
  }

  fn scraped_news(title: &str) -> ScrapedNews {
    ScrapedNews {
      title: title.to_string(),
      date_range: String::from("10/1/2026"),
      image: String::new(),
      category: String::from("Announcements"),
      content: String::from("Body"),
      html_content: String::new(),
      author: String::from("GM Xenon")
    }
  }

  fn scraped_event(title: &str, kind: ScrapedEventKind) -> ScrapedEvent {
    ScrapedEvent {
      title: title.to_string(),
      description: String::from("Description"),
      date: String::from("Ongoing"),
      kind,
      image: String::new()
    }
  }

  #[test]
  fn only_one_import_at_a_time() {
    let service = ScrapeService::new(reqwest::Client::new(), settings());
    let lock = service.lock().unwrap();
    assert!(matches!(service.lock(), Err(Error::Conflict(_))));
    drop(lock);
    assert!(service.lock().is_ok());
  }

  #[test]
  fn news_titles_are_deduplicated_case_insensitively() {
    let store = MemoryStore::new();
    store.insert_news(NewNews::from(scraped_news("Foo"))).unwrap();
    let result = import_news(
      &store,
      vec![scraped_news("FOO"), scraped_news("Bar"), scraped_news("bar ")]
    ).unwrap();
    assert_eq!(1, result.created.len());
    assert_eq!(2, result.skipped);
    assert_eq!("Bar", result.created[0].title);
    assert_eq!(2, store.all_news().unwrap().len());
  }

  #[test]
  fn imported_events_are_converted() {
    let store = MemoryStore::new();
    let result = import_events(
      &store,
      vec![
        scraped_event("Double XP", ScrapedEventKind::Ongoing),
        scraped_event("Zombie Night", ScrapedEventKind::Upcoming)
      ]
    ).unwrap();
    assert_eq!(2, result.created.len());
    assert_eq!(0, result.skipped);
    assert_eq!(EventType::Trending, result.created[0].event_type);
    assert_eq!(EventType::Upcoming, result.created[1].event_type);
    assert_eq!("Double XP", result.created[0].title_ar);
    // Running it again imports nothing.
    let result = import_events(
      &store,
      vec![scraped_event("double xp", ScrapedEventKind::Ongoing)]
    ).unwrap();
    assert!(result.created.is_empty());
    assert_eq!(1, result.skipped);
  }

  #[actix_web::test]
  async fn unreachable_pages_give_empty_results() {
    let client = super::super::helpers::build_http_client(1).unwrap();
    let service = ScrapeService::new(client, settings());
    assert!(service.scrape_events().await.is_empty());
    assert!(service.scrape_news(None).await.is_empty());
    assert!(service.scrape_news(Some("http://127.0.0.1:9/d/1")).await.is_empty());
  }
}
