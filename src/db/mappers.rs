use super::entities::*;
use super::helpers::{from_millis, tags_from_json};
use rusqlite::types::Type;
use rusqlite::{Row, Error};
use std::str::FromStr;

// Enums are stored as their Display value, a value we can't
// parse back is reported as a conversion error on that column.
fn parse_column<T>(row: &Row, idx: usize) -> Result<T, Error>
  where T: FromStr<Err = UnknownVariant>
{
  let raw: String = row.get(idx)?;
  raw.parse::<T>()
    .map_err(|e| Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub const POST_COLUMNS: &str = "id, title, content, summary, image, category, \
  tags, author, views, reading_time, featured, created_at";

pub fn map_post(row: &Row) -> Result<Post, Error> {
  let tags: String = row.get(6)?;
  Ok(Post {
    id: row.get(0)?,
    title: row.get(1)?,
    content: row.get(2)?,
    summary: row.get(3)?,
    image: row.get(4)?,
    category: parse_column(row, 5)?,
    tags: tags_from_json(&tags),
    author: row.get(7)?,
    views: row.get(8)?,
    reading_time: row.get(9)?,
    featured: row.get::<_, i32>(10)? != 0,
    created_at: from_millis(row.get(11)?)
  })
}

pub const COMMENT_COLUMNS: &str = "id, post_id, parent_comment_id, name, content, created_at";

pub fn map_comment(row: &Row) -> Result<Comment, Error> {
  Ok(Comment {
    id: row.get(0)?,
    post_id: row.get(1)?,
    parent_comment_id: row.get(2)?,
    name: row.get(3)?,
    content: row.get(4)?,
    created_at: from_millis(row.get(5)?)
  })
}

pub const EVENT_COLUMNS: &str = "id, title, title_ar, description, description_ar, \
  date, event_type, image";

pub fn map_event(row: &Row) -> Result<Event, Error> {
  Ok(Event {
    id: row.get(0)?,
    title: row.get(1)?,
    title_ar: row.get(2)?,
    description: row.get(3)?,
    description_ar: row.get(4)?,
    date: row.get(5)?,
    event_type: parse_column(row, 6)?,
    image: row.get(7)?
  })
}

pub const NEWS_COLUMNS: &str = "id, title, title_ar, date_range, image, category, \
  content, content_ar, html_content, author, featured, created_at";

pub fn map_news(row: &Row) -> Result<News, Error> {
  Ok(News {
    id: row.get(0)?,
    title: row.get(1)?,
    title_ar: row.get(2)?,
    date_range: row.get(3)?,
    image: row.get(4)?,
    category: row.get(5)?,
    content: row.get(6)?,
    content_ar: row.get(7)?,
    html_content: row.get(8)?,
    author: row.get(9)?,
    featured: row.get::<_, i32>(10)? != 0,
    created_at: from_millis(row.get(11)?)
  })
}

pub const TICKET_COLUMNS: &str = "id, title, description, user_name, user_email, \
  status, priority, category, created_at, updated_at";

pub fn map_ticket(row: &Row) -> Result<Ticket, Error> {
  Ok(Ticket {
    id: row.get(0)?,
    title: row.get(1)?,
    description: row.get(2)?,
    user_name: row.get(3)?,
    user_email: row.get(4)?,
    status: parse_column(row, 5)?,
    priority: row.get(6)?,
    category: row.get(7)?,
    created_at: from_millis(row.get(8)?),
    updated_at: from_millis(row.get(9)?)
  })
}

pub const REPLY_COLUMNS: &str = "id, ticket_id, author_name, content, is_admin, created_at";

pub fn map_reply(row: &Row) -> Result<TicketReply, Error> {
  Ok(TicketReply {
    id: row.get(0)?,
    ticket_id: row.get(1)?,
    author_name: row.get(2)?,
    content: row.get(3)?,
    is_admin: row.get::<_, i32>(4)? != 0,
    created_at: from_millis(row.get(5)?)
  })
}

pub const ADMIN_COLUMNS: &str = "id, username, password, role, created_at";

pub fn map_admin(row: &Row) -> Result<Admin, Error> {
  Ok(Admin {
    id: row.get(0)?,
    username: row.get(1)?,
    password: row.get(2)?,
    role: parse_column(row, 3)?,
    created_at: from_millis(row.get(4)?)
  })
}

pub const SUBSCRIBER_COLUMNS: &str = "id, email, created_at";

pub fn map_subscriber(row: &Row) -> Result<NewsletterSubscriber, Error> {
  Ok(NewsletterSubscriber {
    id: row.get(0)?,
    email: row.get(1)?,
    created_at: from_millis(row.get(2)?)
  })
}
