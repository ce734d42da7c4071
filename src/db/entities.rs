use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Entities are what the stores hand out. They serialize
// straight to the JSON the dashboard expects (camelCase),
// the few responses that need extra fields wrap them in
// DTOs.

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
  #[display(fmt = "News")]
  News,
  #[display(fmt = "Reviews")]
  Reviews,
  #[display(fmt = "Tutorials")]
  Tutorials,
  #[display(fmt = "Events")]
  Events
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
  #[display(fmt = "upcoming")]
  Upcoming,
  #[display(fmt = "trending")]
  Trending
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
  #[display(fmt = "open")]
  Open,
  #[display(fmt = "in-progress")]
  InProgress,
  #[display(fmt = "resolved")]
  Resolved,
  #[display(fmt = "closed")]
  Closed
}

impl Default for TicketStatus {
  fn default() -> Self {
    TicketStatus::Open
  }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
  #[display(fmt = "admin")]
  Admin,
  #[display(fmt = "super_admin")]
  SuperAdmin
}

impl Default for AdminRole {
  fn default() -> Self {
    AdminRole::Admin
  }
}

// The stores write these enums as their Display value,
// this reads them back.
#[derive(Debug, Display)]
#[display(fmt = "Unknown value: {}", _0)]
pub struct UnknownVariant(pub String);

impl std::error::Error for UnknownVariant {}

macro_rules! from_str_via_display {
  ($t:ty, [$($variant:expr),+]) => {
    impl FromStr for $t {
      type Err = UnknownVariant;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        $(
          if $variant.to_string() == s {
            return Ok($variant);
          }
        )+
        Err(UnknownVariant(s.to_string()))
      }
    }
  };
}

from_str_via_display!(Category, [
  Category::News, Category::Reviews, Category::Tutorials, Category::Events
]);
from_str_via_display!(EventType, [EventType::Upcoming, EventType::Trending]);
from_str_via_display!(TicketStatus, [
  TicketStatus::Open, TicketStatus::InProgress, TicketStatus::Resolved, TicketStatus::Closed
]);
from_str_via_display!(AdminRole, [AdminRole::Admin, AdminRole::SuperAdmin]);

/* --- Posts --- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id: String,
  pub title: String,
  pub content: String,
  pub summary: String,
  pub image: String,
  pub category: Category,
  pub tags: Vec<String>,
  pub author: String,
  pub views: i64,
  pub reading_time: u32,
  pub featured: bool,
  pub created_at: DateTime<Utc>
}

// Summary and reading time are already resolved by the
// time a NewPost reaches a store.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub title: String,
  pub content: String,
  pub summary: String,
  pub image: String,
  pub category: Category,
  pub tags: Vec<String>,
  pub author: String,
  pub reading_time: u32,
  pub featured: bool
}

// "Update only what's in the request body".
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
  pub title: Option<String>,
  pub content: Option<String>,
  pub summary: Option<String>,
  pub image: Option<String>,
  pub category: Option<Category>,
  pub tags: Option<Vec<String>>,
  pub author: Option<String>,
  pub reading_time: Option<u32>,
  pub featured: Option<bool>
}

impl NewPost {
  pub fn into_post(self, id: String, created_at: DateTime<Utc>) -> Post {
    Post {
      id,
      title: self.title,
      content: self.content,
      summary: self.summary,
      image: self.image,
      category: self.category,
      tags: self.tags,
      author: self.author,
      views: 0,
      reading_time: self.reading_time,
      featured: self.featured,
      created_at
    }
  }
}

impl PostUpdate {
  pub fn apply_to(self, post: &mut Post) {
    if let Some(title) = self.title { post.title = title; }
    if let Some(content) = self.content { post.content = content; }
    if let Some(summary) = self.summary { post.summary = summary; }
    if let Some(image) = self.image { post.image = image; }
    if let Some(category) = self.category { post.category = category; }
    if let Some(tags) = self.tags { post.tags = tags; }
    if let Some(author) = self.author { post.author = author; }
    if let Some(reading_time) = self.reading_time { post.reading_time = reading_time; }
    if let Some(featured) = self.featured { post.featured = featured; }
  }
}

/* --- Comments --- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id: String,
  pub post_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent_comment_id: Option<String>,
  pub name: String,
  pub content: String,
  pub created_at: DateTime<Utc>
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub post_id: String,
  pub parent_comment_id: Option<String>,
  pub name: String,
  pub content: String
}

impl NewComment {
  pub fn into_comment(self, id: String, created_at: DateTime<Utc>) -> Comment {
    Comment {
      id,
      post_id: self.post_id,
      parent_comment_id: self.parent_comment_id,
      name: self.name,
      content: self.content,
      created_at
    }
  }
}

/* --- Events --- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id: String,
  pub title: String,
  pub title_ar: String,
  pub description: String,
  pub description_ar: String,
  // Free text, the forum writes things like "Oct 1 - 31".
  pub date: String,
  #[serde(rename = "type")]
  pub event_type: EventType,
  pub image: String
}

#[derive(Debug, Clone)]
pub struct NewEvent {
  pub title: String,
  pub title_ar: String,
  pub description: String,
  pub description_ar: String,
  pub date: String,
  pub event_type: EventType,
  pub image: String
}

#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
  pub title: Option<String>,
  pub title_ar: Option<String>,
  pub description: Option<String>,
  pub description_ar: Option<String>,
  pub date: Option<String>,
  pub event_type: Option<EventType>,
  pub image: Option<String>
}

impl NewEvent {
  pub fn into_event(self, id: String) -> Event {
    Event {
      id,
      title: self.title,
      title_ar: self.title_ar,
      description: self.description,
      description_ar: self.description_ar,
      date: self.date,
      event_type: self.event_type,
      image: self.image
    }
  }
}

impl EventUpdate {
  pub fn apply_to(self, event: &mut Event) {
    if let Some(title) = self.title { event.title = title; }
    if let Some(title_ar) = self.title_ar { event.title_ar = title_ar; }
    if let Some(description) = self.description { event.description = description; }
    if let Some(description_ar) = self.description_ar { event.description_ar = description_ar; }
    if let Some(date) = self.date { event.date = date; }
    if let Some(event_type) = self.event_type { event.event_type = event_type; }
    if let Some(image) = self.image { event.image = image; }
  }
}

/* --- News --- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
  pub id: String,
  pub title: String,
  pub title_ar: String,
  pub date_range: String,
  pub image: String,
  pub category: String,
  pub content: String,
  pub content_ar: String,
  pub html_content: String,
  pub author: String,
  pub featured: bool,
  pub created_at: DateTime<Utc>
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNews {
  pub title: String,
  pub title_ar: String,
  pub date_range: String,
  pub image: String,
  pub category: String,
  pub content: String,
  pub content_ar: String,
  pub html_content: String,
  pub author: String,
  pub featured: bool
}

#[derive(Debug, Clone, Default)]
pub struct NewsUpdate {
  pub title: Option<String>,
  pub title_ar: Option<String>,
  pub date_range: Option<String>,
  pub image: Option<String>,
  pub category: Option<String>,
  pub content: Option<String>,
  pub content_ar: Option<String>,
  pub html_content: Option<String>,
  pub author: Option<String>,
  pub featured: Option<bool>
}

impl NewNews {
  pub fn into_news(self, id: String, created_at: DateTime<Utc>) -> News {
    News {
      id,
      title: self.title,
      title_ar: self.title_ar,
      date_range: self.date_range,
      image: self.image,
      category: self.category,
      content: self.content,
      content_ar: self.content_ar,
      html_content: self.html_content,
      author: self.author,
      featured: self.featured,
      created_at
    }
  }
}

impl NewsUpdate {
  pub fn apply_to(self, news: &mut News) {
    if let Some(title) = self.title { news.title = title; }
    if let Some(title_ar) = self.title_ar { news.title_ar = title_ar; }
    if let Some(date_range) = self.date_range { news.date_range = date_range; }
    if let Some(image) = self.image { news.image = image; }
    if let Some(category) = self.category { news.category = category; }
    if let Some(content) = self.content { news.content = content; }
    if let Some(content_ar) = self.content_ar { news.content_ar = content_ar; }
    if let Some(html_content) = self.html_content { news.html_content = html_content; }
    if let Some(author) = self.author { news.author = author; }
    if let Some(featured) = self.featured { news.featured = featured; }
  }
}

/* --- Tickets --- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
  pub id: String,
  pub title: String,
  pub description: String,
  pub user_name: String,
  pub user_email: String,
  pub status: TicketStatus,
  pub priority: String,
  pub category: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>
}

pub const DEFAULT_TICKET_PRIORITY: &str = "normal";

#[derive(Debug, Clone)]
pub struct NewTicket {
  pub title: String,
  pub description: String,
  pub user_name: String,
  pub user_email: String,
  pub status: TicketStatus,
  pub priority: String,
  pub category: String
}

#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
  pub title: Option<String>,
  pub description: Option<String>,
  pub user_name: Option<String>,
  pub user_email: Option<String>,
  pub status: Option<TicketStatus>,
  pub priority: Option<String>,
  pub category: Option<String>
}

impl NewTicket {
  pub fn into_ticket(self, id: String, created_at: DateTime<Utc>) -> Ticket {
    Ticket {
      id,
      title: self.title,
      description: self.description,
      user_name: self.user_name,
      user_email: self.user_email,
      status: self.status,
      priority: self.priority,
      category: self.category,
      created_at,
      updated_at: created_at
    }
  }
}

impl TicketUpdate {
  // Touching updated_at is the caller's business since
  // it's the store that owns the clock.
  pub fn apply_to(self, ticket: &mut Ticket) {
    if let Some(title) = self.title { ticket.title = title; }
    if let Some(description) = self.description { ticket.description = description; }
    if let Some(user_name) = self.user_name { ticket.user_name = user_name; }
    if let Some(user_email) = self.user_email { ticket.user_email = user_email; }
    if let Some(status) = self.status { ticket.status = status; }
    if let Some(priority) = self.priority { ticket.priority = priority; }
    if let Some(category) = self.category { ticket.category = category; }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReply {
  pub id: String,
  pub ticket_id: String,
  pub author_name: String,
  pub content: String,
  pub is_admin: bool,
  pub created_at: DateTime<Utc>
}

#[derive(Debug, Clone)]
pub struct NewTicketReply {
  pub ticket_id: String,
  pub author_name: String,
  pub content: String,
  pub is_admin: bool
}

impl NewTicketReply {
  pub fn into_reply(self, id: String, created_at: DateTime<Utc>) -> TicketReply {
    TicketReply {
      id,
      ticket_id: self.ticket_id,
      author_name: self.author_name,
      content: self.content,
      is_admin: self.is_admin,
      created_at
    }
  }
}

/* --- Admins --- */

// The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
  pub id: String,
  pub username: String,
  #[serde(skip_serializing)]
  pub password: String,
  pub role: AdminRole,
  pub created_at: DateTime<Utc>
}

// password is already hashed at this point.
#[derive(Debug, Clone)]
pub struct NewAdmin {
  pub username: String,
  pub password: String,
  pub role: AdminRole
}

#[derive(Debug, Clone, Default)]
pub struct AdminUpdate {
  pub username: Option<String>,
  pub password: Option<String>,
  pub role: Option<AdminRole>
}

impl NewAdmin {
  pub fn into_admin(self, id: String, created_at: DateTime<Utc>) -> Admin {
    Admin {
      id,
      username: self.username,
      password: self.password,
      role: self.role,
      created_at
    }
  }
}

impl AdminUpdate {
  pub fn apply_to(self, admin: &mut Admin) {
    if let Some(username) = self.username { admin.username = username; }
    if let Some(password) = self.password { admin.password = password; }
    if let Some(role) = self.role { admin.role = role; }
  }
}

/* --- Newsletter --- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
  pub id: String,
  pub email: String,
  pub created_at: DateTime<Utc>
}

/* --- Mercenaries --- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mercenary {
  pub id: &'static str,
  pub name: &'static str,
  pub image: &'static str,
  pub role: &'static str
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enums_read_back_their_display_value() {
    for status in &[
      TicketStatus::Open,
      TicketStatus::InProgress,
      TicketStatus::Resolved,
      TicketStatus::Closed
    ] {
      assert_eq!(*status, status.to_string().parse::<TicketStatus>().unwrap());
    }
    assert_eq!(AdminRole::SuperAdmin, "super_admin".parse::<AdminRole>().unwrap());
    assert!("Gossip".parse::<Category>().is_err());
  }

  #[test]
  fn enums_serialize_like_display() {
    assert_eq!("\"in-progress\"", serde_json::to_string(&TicketStatus::InProgress).unwrap());
    assert_eq!("\"super_admin\"", serde_json::to_string(&AdminRole::SuperAdmin).unwrap());
    assert_eq!("\"trending\"", serde_json::to_string(&EventType::Trending).unwrap());
    assert_eq!("\"Reviews\"", serde_json::to_string(&Category::Reviews).unwrap());
  }

  #[test]
  fn admin_password_is_not_serialized() {
    let admin = NewAdmin {
      username: "xenon".to_string(),
      password: "$argon2id$secret".to_string(),
      role: AdminRole::Admin
    }.into_admin("1".to_string(), Utc::now());
    let json = serde_json::to_value(&admin).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!("xenon", json["username"]);
  }

  #[test]
  fn post_update_only_touches_given_fields() {
    let mut post = NewPost {
      title: "Title".to_string(),
      content: "Content".to_string(),
      summary: "Summary".to_string(),
      image: "/img.png".to_string(),
      category: Category::News,
      tags: vec!["crossfire".to_string()],
      author: "Xenon".to_string(),
      reading_time: 1,
      featured: false
    }.into_post("p1".to_string(), Utc::now());
    PostUpdate {
      title: Some("New title".to_string()),
      featured: Some(true),
      ..Default::default()
    }.apply_to(&mut post);
    assert_eq!("New title", post.title);
    assert!(post.featured);
    assert_eq!("Content", post.content);
    assert_eq!(vec!["crossfire".to_string()], post.tags);
  }
}
