use color_eyre::Result;
use eyre::eyre;
use log::info;
pub mod entities;
pub mod helpers;
mod mappers;
mod memory;
mod mercenaries;
mod sqlite;
use entities::*;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

/**
 * Everything the app persists goes through this trait,
 * whatever backend is behind it. Lookups give Ok(None)
 * when there is nothing, deletes give Ok(false), Err is
 * for the backend actually failing.
 *
 * Lists come back newest first unless said otherwise.
 *
 * Deleting a post removes its comments and deleting a
 * ticket removes its replies, in every backend.
 */
pub trait Store: Send + Sync {
  // Posts
  fn all_posts(&self) -> Result<Vec<Post>>;
  fn post_by_id(&self, id: &str) -> Result<Option<Post>>;
  fn insert_post(&self, post: NewPost) -> Result<Post>;
  fn update_post(&self, id: &str, update: PostUpdate) -> Result<Option<Post>>;
  fn delete_post(&self, id: &str) -> Result<bool>;
  fn increment_post_views(&self, id: &str) -> Result<()>;

  // Comments
  fn comments_by_post(&self, post_id: &str) -> Result<Vec<Comment>>;
  fn insert_comment(&self, comment: NewComment) -> Result<Comment>;

  // Events, in insertion order since they have no date
  // we can sort on.
  fn all_events(&self) -> Result<Vec<Event>>;
  fn event_by_id(&self, id: &str) -> Result<Option<Event>>;
  fn insert_event(&self, event: NewEvent) -> Result<Event>;
  fn update_event(&self, id: &str, update: EventUpdate) -> Result<Option<Event>>;
  fn delete_event(&self, id: &str) -> Result<bool>;

  // News
  fn all_news(&self) -> Result<Vec<News>>;
  fn news_by_id(&self, id: &str) -> Result<Option<News>>;
  fn insert_news(&self, news: NewNews) -> Result<News>;
  fn update_news(&self, id: &str, update: NewsUpdate) -> Result<Option<News>>;
  fn delete_news(&self, id: &str) -> Result<bool>;

  // Tickets. Updating one always touches updated_at.
  fn all_tickets(&self) -> Result<Vec<Ticket>>;
  fn ticket_by_id(&self, id: &str) -> Result<Option<Ticket>>;
  fn tickets_by_email(&self, email: &str) -> Result<Vec<Ticket>>;
  fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket>;
  fn update_ticket(&self, id: &str, update: TicketUpdate) -> Result<Option<Ticket>>;
  fn delete_ticket(&self, id: &str) -> Result<bool>;

  // Ticket replies, oldest first (it's a conversation).
  fn replies_by_ticket(&self, ticket_id: &str) -> Result<Vec<TicketReply>>;
  fn insert_reply(&self, reply: NewTicketReply) -> Result<TicketReply>;

  // Admins
  fn all_admins(&self) -> Result<Vec<Admin>>;
  fn admin_by_id(&self, id: &str) -> Result<Option<Admin>>;
  fn admin_by_username(&self, username: &str) -> Result<Option<Admin>>;
  fn insert_admin(&self, admin: NewAdmin) -> Result<Admin>;
  fn update_admin(&self, id: &str, update: AdminUpdate) -> Result<Option<Admin>>;
  fn delete_admin(&self, id: &str) -> Result<bool>;

  // Newsletter
  fn all_subscribers(&self) -> Result<Vec<NewsletterSubscriber>>;
  fn subscriber_by_email(&self, email: &str) -> Result<Option<NewsletterSubscriber>>;
  fn insert_subscriber(&self, email: &str) -> Result<NewsletterSubscriber>;
  fn delete_subscriber(&self, id: &str) -> Result<bool>;

  // Same static table for everyone.
  fn all_mercenaries(&self) -> Result<Vec<Mercenary>> {
    Ok(mercenaries::all())
  }
}

pub enum StorageBackend {
  Memory,
  Sqlite(String)
}

impl StorageBackend {
  pub fn from_config(name: &str, db_path: &str) -> Result<Self> {
    match name.to_lowercase().as_str() {
      "memory" => Ok(StorageBackend::Memory),
      "sqlite" => Ok(StorageBackend::Sqlite(db_path.to_string())),
      other => Err(eyre!("Unknown storage backend: {}", other))
    }
  }
}

pub fn open_store(backend: StorageBackend) -> Result<Box<dyn Store>> {
  match backend {
    StorageBackend::Memory => {
      info!("Using the in-memory store, nothing will survive a restart");
      Ok(Box::new(MemoryStore::new()))
    },
    StorageBackend::Sqlite(path) => {
      info!("Using the SQLite store at {}", path);
      Ok(Box::new(SqliteStore::open(&path)?))
    }
  }
}
