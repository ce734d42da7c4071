use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::db::entities::*;
use crate::scraping::{ScrapedEvent, ScrapedNews};
use crate::utils::{serde_utils, time_utils};

// I'm going to use the From trait to convert
// entites to DTOs and request bodies to what the
// stores take.

/* --- Response objects --- */

// Posts and comments get a human readable "date" on
// top of their regular fields, computed when the
// response is built.
#[derive(Debug, Serialize)]
pub struct PostDto {
  #[serde(flatten)]
  pub post: Post,
  pub date: String
}

impl From<Post> for PostDto {
  fn from(post: Post) -> Self {
    Self {
      date: time_utils::format_date_now(post.created_at),
      post
    }
  }
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
  #[serde(flatten)]
  pub comment: Comment,
  pub date: String
}

impl From<Comment> for CommentDto {
  fn from(comment: Comment) -> Self {
    Self {
      date: time_utils::format_date_now(comment.created_at),
      comment
    }
  }
}

// Tickets always go out with formatted dates. The email
// is left out of the dashboard list unless the admin is
// a super admin, the other routes always carry it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
  pub id: String,
  pub title: String,
  pub description: String,
  pub user_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_email: Option<String>,
  pub status: TicketStatus,
  pub priority: String,
  pub category: String,
  pub created_at: String,
  pub updated_at: String
}

impl TicketDto {
  pub fn new(ticket: Ticket, show_email: bool) -> Self {
    Self {
      id: ticket.id,
      title: ticket.title,
      description: ticket.description,
      user_name: ticket.user_name,
      user_email: if show_email { Some(ticket.user_email) } else { None },
      status: ticket.status,
      priority: ticket.priority,
      category: ticket.category,
      created_at: time_utils::format_date_now(ticket.created_at),
      updated_at: time_utils::format_date_now(ticket.updated_at)
    }
  }
}

impl From<Ticket> for TicketDto {
  fn from(ticket: Ticket) -> Self {
    Self::new(ticket, true)
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDto {
  pub id: String,
  pub ticket_id: String,
  pub author_name: String,
  pub content: String,
  pub is_admin: bool,
  pub created_at: String
}

impl From<TicketReply> for ReplyDto {
  fn from(reply: TicketReply) -> Self {
    Self {
      id: reply.id,
      ticket_id: reply.ticket_id,
      author_name: reply.author_name,
      content: reply.content,
      is_admin: reply.is_admin,
      created_at: time_utils::format_date_now(reply.created_at)
    }
  }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AdminInfo {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  pub role: AdminRole
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
  pub token: String,
  pub admin: AdminInfo
}

#[derive(Debug, Serialize)]
pub struct SuccessDto {
  pub success: bool
}

impl SuccessDto {
  pub fn ok() -> Self {
    Self { success: true }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
  pub total_posts: usize,
  pub total_comments: usize,
  pub total_views: i64,
  pub recent_posts: Vec<PostDto>
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadDto {
  pub url: String
}

#[derive(Debug, Serialize)]
pub struct ScrapeEventsDto {
  pub success: bool,
  pub count: usize,
  pub skipped: usize,
  pub events: Vec<Event>
}

#[derive(Debug, Serialize)]
pub struct ScrapeNewsDto {
  pub success: bool,
  pub count: usize,
  pub skipped: usize,
  pub news: Vec<News>
}

#[derive(Debug, Serialize)]
pub struct EventsPreviewDto {
  pub count: usize,
  pub events: Vec<ScrapedEvent>
}

#[derive(Debug, Serialize)]
pub struct NewsPreviewDto {
  pub count: usize,
  pub news: Vec<ScrapedNews>
}

/* --- Request body or query objects --- */

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: Option<String>,
  pub password: Option<String>
}

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
  pub category: Option<String>,
  pub search: Option<String>,
  pub featured: Option<String>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostBody {
  pub title: String,
  pub content: String,
  pub summary: Option<String>,
  #[serde(default)]
  pub image: String,
  pub category: Category,
  #[serde(default)]
  pub tags: Vec<String>,
  pub author: String,
  pub reading_time: Option<u32>,
  #[serde(default)]
  pub featured: bool
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdateBody {
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

impl From<PostUpdateBody> for PostUpdate {
  fn from(body: PostUpdateBody) -> Self {
    Self {
      title: body.title,
      content: body.content,
      summary: serde_utils::empty_string_to_none(body.summary),
      image: body.image,
      category: body.category,
      tags: body.tags,
      author: body.author,
      reading_time: body.reading_time.filter(|r| *r > 0),
      featured: body.featured
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
  pub author: String,
  pub content: String,
  pub parent_comment_id: Option<String>
}

// The bilingual fields are optional, "" when missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventBody {
  pub title: String,
  #[serde(default)]
  pub title_ar: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub description_ar: String,
  pub date: String,
  #[serde(rename = "type")]
  pub event_type: EventType,
  #[serde(default)]
  pub image: String
}

impl From<NewEventBody> for NewEvent {
  fn from(body: NewEventBody) -> Self {
    Self {
      title: body.title,
      title_ar: body.title_ar,
      description: body.description,
      description_ar: body.description_ar,
      date: body.date,
      event_type: body.event_type,
      image: body.image
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdateBody {
  pub title: Option<String>,
  pub title_ar: Option<String>,
  pub description: Option<String>,
  pub description_ar: Option<String>,
  pub date: Option<String>,
  #[serde(rename = "type")]
  pub event_type: Option<EventType>,
  pub image: Option<String>
}

impl From<EventUpdateBody> for EventUpdate {
  fn from(body: EventUpdateBody) -> Self {
    Self {
      title: body.title,
      title_ar: body.title_ar,
      description: body.description,
      description_ar: body.description_ar,
      date: body.date,
      event_type: body.event_type,
      image: body.image
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNewsBody {
  pub title: String,
  #[serde(default)]
  pub title_ar: String,
  #[serde(default)]
  pub date_range: String,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub category: String,
  pub content: String,
  #[serde(default)]
  pub content_ar: String,
  #[serde(default)]
  pub html_content: String,
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub featured: bool
}

impl From<NewNewsBody> for NewNews {
  fn from(body: NewNewsBody) -> Self {
    Self {
      title: body.title,
      title_ar: body.title_ar,
      date_range: body.date_range,
      image: body.image,
      category: body.category,
      content: body.content,
      content_ar: body.content_ar,
      html_content: body.html_content,
      author: body.author,
      featured: body.featured
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsUpdateBody {
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

impl From<NewsUpdateBody> for NewsUpdate {
  fn from(body: NewsUpdateBody) -> Self {
    Self {
      title: body.title,
      title_ar: body.title_ar,
      date_range: body.date_range,
      image: body.image,
      category: body.category,
      content: body.content,
      content_ar: body.content_ar,
      html_content: body.html_content,
      author: body.author,
      featured: body.featured
    }
  }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTicketBody {
  #[validate(length(min = 1, max = 200))]
  pub title: String,
  #[validate(length(min = 1, max = 5000))]
  pub description: String,
  #[validate(length(min = 1, max = 100))]
  pub user_name: String,
  #[validate(email)]
  pub user_email: String,
  pub priority: Option<String>,
  #[serde(default = "default_ticket_category")]
  pub category: String
}

fn default_ticket_category() -> String {
  String::from("general")
}

// New tickets are always open whatever the client says.
impl From<NewTicketBody> for NewTicket {
  fn from(body: NewTicketBody) -> Self {
    Self {
      title: body.title,
      description: body.description,
      user_name: body.user_name,
      user_email: body.user_email,
      status: TicketStatus::default(),
      priority: serde_utils::empty_string_to_none(body.priority)
        .unwrap_or_else(|| DEFAULT_TICKET_PRIORITY.to_string()),
      category: body.category
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdateBody {
  pub title: Option<String>,
  pub description: Option<String>,
  pub user_name: Option<String>,
  pub user_email: Option<String>,
  pub status: Option<TicketStatus>,
  pub priority: Option<String>,
  pub category: Option<String>
}

impl From<TicketUpdateBody> for TicketUpdate {
  fn from(body: TicketUpdateBody) -> Self {
    Self {
      title: body.title,
      description: body.description,
      user_name: body.user_name,
      user_email: body.user_email,
      status: body.status,
      priority: body.priority,
      category: body.category
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBody {
  pub author_name: String,
  pub content: String,
  #[serde(default)]
  pub is_admin: bool
}

#[derive(Debug, Deserialize)]
pub struct NewAdminBody {
  pub username: String,
  pub password: String,
  pub role: Option<AdminRole>
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdateBody {
  pub username: Option<String>,
  pub password: Option<String>,
  pub role: Option<AdminRole>
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeBody {
  #[validate(email)]
  pub email: String
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeEventsBody {
  pub selected_items: Option<Vec<ScrapedEvent>>
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeNewsBody {
  pub url: Option<String>,
  pub selected_items: Option<Vec<ScrapedNews>>
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewNewsQuery {
  pub url: Option<String>
}

/* --- End request body or query objects --- */

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, Utc};

  fn ticket() -> Ticket {
    NewTicket {
      title: "Can't log in".to_string(),
      description: "Since the patch".to_string(),
      user_name: "Player".to_string(),
      user_email: "player@example.com".to_string(),
      status: TicketStatus::Open,
      priority: DEFAULT_TICKET_PRIORITY.to_string(),
      category: "account".to_string()
    }.into_ticket("t1".to_string(), Utc::now() - Duration::hours(2))
  }

  #[test]
  fn post_dto_is_flat_with_a_date() {
    let post = NewPost {
      title: "Title".to_string(),
      content: "Content".to_string(),
      summary: "Summary".to_string(),
      image: String::new(),
      category: Category::Tutorials,
      tags: vec![],
      author: "Xenon".to_string(),
      reading_time: 1,
      featured: true
    }.into_post("p1".to_string(), Utc::now() - Duration::days(2));
    let json = serde_json::to_value(PostDto::from(post)).unwrap();
    assert_eq!("p1", json["id"]);
    assert_eq!("Tutorials", json["category"]);
    assert_eq!(0, json["views"]);
    assert_eq!(1, json["readingTime"]);
    assert_eq!("2 days ago", json["date"]);
  }

  #[test]
  fn ticket_email_is_only_shown_when_asked() {
    let json = serde_json::to_value(TicketDto::new(ticket(), false)).unwrap();
    assert!(json.get("userEmail").is_none());
    assert_eq!("2 hours ago", json["createdAt"]);
    let json = serde_json::to_value(TicketDto::new(ticket(), true)).unwrap();
    assert_eq!("player@example.com", json["userEmail"]);
  }

  #[test]
  fn reply_dates_are_formatted() {
    let reply = TicketReply {
      id: "r1".to_string(),
      ticket_id: "t1".to_string(),
      author_name: "Support".to_string(),
      content: "Try again now".to_string(),
      is_admin: true,
      created_at: Utc::now() - Duration::minutes(5)
    };
    let json = serde_json::to_value(ReplyDto::from(reply)).unwrap();
    assert_eq!("t1", json["ticketId"]);
    assert_eq!(true, json["isAdmin"]);
    assert_eq!("5 minutes ago", json["createdAt"]);
  }

  #[test]
  fn new_ticket_defaults() {
    let body: NewTicketBody = serde_json::from_str(
      r#"{"title":"t","description":"d","userName":"u","userEmail":"u@example.com","priority":""}"#
    ).unwrap();
    assert!(body.validate().is_ok());
    let new_ticket: NewTicket = body.into();
    assert_eq!(TicketStatus::Open, new_ticket.status);
    assert_eq!(DEFAULT_TICKET_PRIORITY, new_ticket.priority);
    assert_eq!("general", new_ticket.category);
  }

  #[test]
  fn bad_emails_do_not_validate() {
    let body = SubscribeBody { email: "not-an-email".to_string() };
    assert!(body.validate().is_err());
  }

  #[test]
  fn empty_summary_in_update_means_regenerate() {
    let update: PostUpdate = PostUpdateBody {
      summary: Some(String::new()),
      reading_time: Some(0),
      ..Default::default()
    }.into();
    assert!(update.summary.is_none());
    assert!(update.reading_time.is_none());
  }
}
