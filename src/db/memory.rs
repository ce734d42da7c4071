use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use chrono::{DateTime, Utc};
use color_eyre::Result;
use eyre::eyre;
use super::entities::*;
use super::helpers::{new_id, now};
use super::Store;

// Vecs and not maps: we need insertion order for events
// and as a tie breaker when two things share a created_at.
#[derive(Default)]
struct Tables {
  posts: Vec<Post>,
  comments: Vec<Comment>,
  events: Vec<Event>,
  news: Vec<News>,
  tickets: Vec<Ticket>,
  replies: Vec<TicketReply>,
  admins: Vec<Admin>,
  subscribers: Vec<NewsletterSubscriber>
}

/**
 * Process-scoped store, everything is gone on restart.
 * Useful for tests and for running the dashboard locally
 * without a database file around.
 * A single lock guards all the tables, which makes the
 * view counter increments safe.
 */
pub struct MemoryStore {
  tables: RwLock<Tables>
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

// Newest first, most recently inserted wins on ties.
fn newest_first<T: Clone>(items: &[T], created_at: fn(&T) -> DateTime<Utc>) -> Vec<T> {
  let mut sorted: Vec<T> = items.iter().rev().cloned().collect();
  sorted.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
  sorted
}

fn find<T: Clone>(items: &[T], pred: impl Fn(&T) -> bool) -> Option<T> {
  items.iter().find(|i| pred(i)).cloned()
}

fn remove<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
  let before = items.len();
  items.retain(|i| !pred(i));
  items.len() != before
}

impl MemoryStore {

  pub fn new() -> Self {
    Self {
      tables: RwLock::new(Tables::default())
    }
  }

  // A poisoned lock means some thread panicked while
  // writing, let's not pretend the data is fine.
  fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
    self.tables.read()
      .map_err(|e| eyre!("Memory store lock is poisoned - {}", e))
  }

  fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
    self.tables.write()
      .map_err(|e| eyre!("Memory store lock is poisoned - {}", e))
  }

}

impl Store for MemoryStore {

  fn all_posts(&self) -> Result<Vec<Post>> {
    Ok(newest_first(&self.read()?.posts, |p| p.created_at))
  }

  fn post_by_id(&self, id: &str) -> Result<Option<Post>> {
    Ok(find(&self.read()?.posts, |p| p.id == id))
  }

  fn insert_post(&self, post: NewPost) -> Result<Post> {
    let post = post.into_post(new_id(), now());
    self.write()?.posts.push(post.clone());
    Ok(post)
  }

  fn update_post(&self, id: &str, update: PostUpdate) -> Result<Option<Post>> {
    let mut tables = self.write()?;
    Ok(tables.posts.iter_mut().find(|p| p.id == id).map(|post| {
      update.apply_to(post);
      post.clone()
    }))
  }

  fn delete_post(&self, id: &str) -> Result<bool> {
    let mut tables = self.write()?;
    let deleted = remove(&mut tables.posts, |p| p.id == id);
    if deleted {
      remove(&mut tables.comments, |c| c.post_id == id);
    }
    Ok(deleted)
  }

  fn increment_post_views(&self, id: &str) -> Result<()> {
    let mut tables = self.write()?;
    if let Some(post) = tables.posts.iter_mut().find(|p| p.id == id) {
      post.views += 1;
    }
    Ok(())
  }

  fn comments_by_post(&self, post_id: &str) -> Result<Vec<Comment>> {
    let tables = self.read()?;
    let comments: Vec<Comment> = tables.comments.iter()
      .filter(|c| c.post_id == post_id)
      .cloned()
      .collect();
    Ok(newest_first(&comments, |c| c.created_at))
  }

  fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
    let comment = comment.into_comment(new_id(), now());
    self.write()?.comments.push(comment.clone());
    Ok(comment)
  }

  fn all_events(&self) -> Result<Vec<Event>> {
    Ok(self.read()?.events.clone())
  }

  fn event_by_id(&self, id: &str) -> Result<Option<Event>> {
    Ok(find(&self.read()?.events, |e| e.id == id))
  }

  fn insert_event(&self, event: NewEvent) -> Result<Event> {
    let event = event.into_event(new_id());
    self.write()?.events.push(event.clone());
    Ok(event)
  }

  fn update_event(&self, id: &str, update: EventUpdate) -> Result<Option<Event>> {
    let mut tables = self.write()?;
    Ok(tables.events.iter_mut().find(|e| e.id == id).map(|event| {
      update.apply_to(event);
      event.clone()
    }))
  }

  fn delete_event(&self, id: &str) -> Result<bool> {
    Ok(remove(&mut self.write()?.events, |e| e.id == id))
  }

  fn all_news(&self) -> Result<Vec<News>> {
    Ok(newest_first(&self.read()?.news, |n| n.created_at))
  }

  fn news_by_id(&self, id: &str) -> Result<Option<News>> {
    Ok(find(&self.read()?.news, |n| n.id == id))
  }

  fn insert_news(&self, news: NewNews) -> Result<News> {
    let news = news.into_news(new_id(), now());
    self.write()?.news.push(news.clone());
    Ok(news)
  }

  fn update_news(&self, id: &str, update: NewsUpdate) -> Result<Option<News>> {
    let mut tables = self.write()?;
    Ok(tables.news.iter_mut().find(|n| n.id == id).map(|news| {
      update.apply_to(news);
      news.clone()
    }))
  }

  fn delete_news(&self, id: &str) -> Result<bool> {
    Ok(remove(&mut self.write()?.news, |n| n.id == id))
  }

  fn all_tickets(&self) -> Result<Vec<Ticket>> {
    Ok(newest_first(&self.read()?.tickets, |t| t.created_at))
  }

  fn ticket_by_id(&self, id: &str) -> Result<Option<Ticket>> {
    Ok(find(&self.read()?.tickets, |t| t.id == id))
  }

  fn tickets_by_email(&self, email: &str) -> Result<Vec<Ticket>> {
    let tables = self.read()?;
    let tickets: Vec<Ticket> = tables.tickets.iter()
      .filter(|t| t.user_email == email)
      .cloned()
      .collect();
    Ok(newest_first(&tickets, |t| t.created_at))
  }

  fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
    let ticket = ticket.into_ticket(new_id(), now());
    self.write()?.tickets.push(ticket.clone());
    Ok(ticket)
  }

  fn update_ticket(&self, id: &str, update: TicketUpdate) -> Result<Option<Ticket>> {
    let mut tables = self.write()?;
    Ok(tables.tickets.iter_mut().find(|t| t.id == id).map(|ticket| {
      update.apply_to(ticket);
      ticket.updated_at = now();
      ticket.clone()
    }))
  }

  fn delete_ticket(&self, id: &str) -> Result<bool> {
    let mut tables = self.write()?;
    let deleted = remove(&mut tables.tickets, |t| t.id == id);
    if deleted {
      remove(&mut tables.replies, |r| r.ticket_id == id);
    }
    Ok(deleted)
  }

  fn replies_by_ticket(&self, ticket_id: &str) -> Result<Vec<TicketReply>> {
    let tables = self.read()?;
    let mut replies: Vec<TicketReply> = tables.replies.iter()
      .filter(|r| r.ticket_id == ticket_id)
      .cloned()
      .collect();
    // Stable sort, insertion order breaks ties.
    replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(replies)
  }

  fn insert_reply(&self, reply: NewTicketReply) -> Result<TicketReply> {
    let reply = reply.into_reply(new_id(), now());
    self.write()?.replies.push(reply.clone());
    Ok(reply)
  }

  fn all_admins(&self) -> Result<Vec<Admin>> {
    Ok(newest_first(&self.read()?.admins, |a| a.created_at))
  }

  fn admin_by_id(&self, id: &str) -> Result<Option<Admin>> {
    Ok(find(&self.read()?.admins, |a| a.id == id))
  }

  fn admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
    Ok(find(&self.read()?.admins, |a| a.username == username))
  }

  // Uniqueness is enforced here too so that the memory store
  // doesn't accept what SQLite would refuse.
  fn insert_admin(&self, admin: NewAdmin) -> Result<Admin> {
    let mut tables = self.write()?;
    if tables.admins.iter().any(|a| a.username == admin.username) {
      return Err(eyre!("Username {} already exists", admin.username));
    }
    let admin = admin.into_admin(new_id(), now());
    tables.admins.push(admin.clone());
    Ok(admin)
  }

  fn update_admin(&self, id: &str, update: AdminUpdate) -> Result<Option<Admin>> {
    let mut tables = self.write()?;
    if let Some(username) = &update.username {
      if tables.admins.iter().any(|a| &a.username == username && a.id != id) {
        return Err(eyre!("Username {} already exists", username));
      }
    }
    Ok(tables.admins.iter_mut().find(|a| a.id == id).map(|admin| {
      update.apply_to(admin);
      admin.clone()
    }))
  }

  fn delete_admin(&self, id: &str) -> Result<bool> {
    Ok(remove(&mut self.write()?.admins, |a| a.id == id))
  }

  fn all_subscribers(&self) -> Result<Vec<NewsletterSubscriber>> {
    Ok(newest_first(&self.read()?.subscribers, |s| s.created_at))
  }

  fn subscriber_by_email(&self, email: &str) -> Result<Option<NewsletterSubscriber>> {
    Ok(find(&self.read()?.subscribers, |s| s.email == email))
  }

  fn insert_subscriber(&self, email: &str) -> Result<NewsletterSubscriber> {
    let mut tables = self.write()?;
    if tables.subscribers.iter().any(|s| s.email == email) {
      return Err(eyre!("Email {} is already subscribed", email));
    }
    let subscriber = NewsletterSubscriber {
      id: new_id(),
      email: email.to_string(),
      created_at: now()
    };
    tables.subscribers.push(subscriber.clone());
    Ok(subscriber)
  }

  fn delete_subscriber(&self, id: &str) -> Result<bool> {
    Ok(remove(&mut self.write()?.subscribers, |s| s.id == id))
  }

}
