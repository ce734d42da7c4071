use rusqlite::{params, Params, Row, OptionalExtension, Connection, TransactionBehavior};
use std::time::Duration;
use r2d2_sqlite::SqliteConnectionManager;
use eyre::WrapErr;
use color_eyre::Result;
use super::entities::*;
use super::helpers::*;
use super::mappers::*;
use super::{Pool, Store};

const BUSY_TIMEOUT_MS: u64 = 5000;

const SCHEMA: &str = "
  CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    summary TEXT NOT NULL,
    image TEXT NOT NULL,
    category TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    author TEXT NOT NULL,
    views INTEGER NOT NULL DEFAULT 0,
    reading_time INTEGER NOT NULL,
    featured INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
  );
  CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL,
    parent_comment_id TEXT,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL
  );
  CREATE INDEX IF NOT EXISTS comments_post_id ON comments (post_id);
  CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    title_ar TEXT NOT NULL,
    description TEXT NOT NULL,
    description_ar TEXT NOT NULL,
    date TEXT NOT NULL,
    event_type TEXT NOT NULL,
    image TEXT NOT NULL
  );
  CREATE TABLE IF NOT EXISTS news (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    title_ar TEXT NOT NULL,
    date_range TEXT NOT NULL,
    image TEXT NOT NULL,
    category TEXT NOT NULL,
    content TEXT NOT NULL,
    content_ar TEXT NOT NULL,
    html_content TEXT NOT NULL,
    author TEXT NOT NULL,
    featured INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
  );
  CREATE TABLE IF NOT EXISTS tickets (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    user_name TEXT NOT NULL,
    user_email TEXT NOT NULL,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    category TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
  );
  CREATE INDEX IF NOT EXISTS tickets_user_email ON tickets (user_email);
  CREATE TABLE IF NOT EXISTS ticket_replies (
    id TEXT PRIMARY KEY,
    ticket_id TEXT NOT NULL,
    author_name TEXT NOT NULL,
    content TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
  );
  CREATE INDEX IF NOT EXISTS ticket_replies_ticket_id ON ticket_replies (ticket_id);
  CREATE TABLE IF NOT EXISTS admins (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at INTEGER NOT NULL
  );
  CREATE TABLE IF NOT EXISTS newsletter_subscribers (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL
  );
";

/**
 * I'll do all the DB stuff in a non-async way, the
 * handlers just call it. The pool hands out connections.
 * The schema is created on open if it's not there.
 */
pub struct SqliteStore {
  pool: Pool
}

// Stole most of the signature from the rusqlite doc.
fn select_many<T, P, F>(
  conn: &Connection,
  query: &str,
  params: P,
  mapper: F
) -> Result<Vec<T>>
  where
    P: Params,
    F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let mut stmt = conn.prepare(query)?;
  stmt.query_map(params, mapper)
    .and_then(Iterator::collect)
    .context("Generic select_many query")
}

fn select_one<T, P, F>(
  conn: &Connection,
  query: &str,
  params: P,
  mapper: F
) -> Result<Option<T>>
  where
    P: Params,
    F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  conn.query_row(query, params, mapper)
    .optional()
    .context("Generic select_one query")
}

impl SqliteStore {

  pub fn open(path: &str) -> Result<Self> {
    // Writers from other workers wait for the lock instead
    // of failing right away.
    let manager = SqliteConnectionManager::file(path)
      .with_init(|c| c.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS)));
    let pool = Pool::new(manager)
      .context(format!("Opening the database at {}", path))?;
    Self::from_pool(pool)
  }

  // Every in-memory connection is its own database, so
  // the pool has to stick to a single one.
  #[cfg(test)]
  pub fn in_memory() -> Result<Self> {
    let pool = Pool::builder()
      .max_size(1)
      .build(SqliteConnectionManager::memory())
      .context("Creating in-memory database")?;
    Self::from_pool(pool)
  }

  pub fn from_pool(pool: Pool) -> Result<Self> {
    let conn = pool.get()?;
    conn.execute_batch(SCHEMA)
      .context("Creating the database schema")?;
    drop(conn);
    Ok(Self { pool })
  }

  fn select_many<T, P, F>(&self, query: &str, params: P, mapper: F) -> Result<Vec<T>>
    where
      P: Params,
      F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
  {
    let conn = self.pool.get()?;
    select_many(&conn, query, params, mapper)
  }

  fn select_one<T, P, F>(&self, query: &str, params: P, mapper: F) -> Result<Option<T>>
    where
      P: Params,
      F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
  {
    let conn = self.pool.get()?;
    select_one(&conn, query, params, mapper)
  }

  fn delete_by_id(&self, table: &str, id: &str) -> Result<bool> {
    let conn = self.pool.get()?;
    let count = conn.execute(
      &format!("DELETE FROM {} WHERE id = ?", table),
      params![id]
    )?;
    Ok(count > 0)
  }

}

impl Store for SqliteStore {

  fn all_posts(&self) -> Result<Vec<Post>> {
    self.select_many(
      &format!("SELECT {} FROM posts ORDER BY created_at DESC, rowid DESC", POST_COLUMNS),
      params![],
      map_post
    )
  }

  fn post_by_id(&self, id: &str) -> Result<Option<Post>> {
    self.select_one(
      &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
      params![id],
      map_post
    )
  }

  fn insert_post(&self, post: NewPost) -> Result<Post> {
    let post = post.into_post(new_id(), now());
    let conn = self.pool.get()?;
    conn.execute(
      &format!(
        "INSERT INTO posts ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        POST_COLUMNS
      ),
      params![
        post.id,
        post.title,
        post.content,
        post.summary,
        post.image,
        post.category.to_string(),
        tags_to_json(&post.tags),
        post.author,
        post.views,
        post.reading_time,
        bool_to_i32(post.featured),
        to_millis(&post.created_at)
      ]
    ).context("Inserting post")?;
    Ok(post)
  }

  // Read, patch and write back inside an immediate transaction.
  // A deferred one would have to upgrade its read lock and SQLite
  // answers BUSY to that without waiting when another writer
  // holds the reserved lock.
  fn update_post(&self, id: &str, update: PostUpdate) -> Result<Option<Post>> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let post = select_one(
      &tx,
      &format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS),
      params![id],
      map_post
    )?;
    let post = match post {
      Some(mut post) => {
        update.apply_to(&mut post);
        tx.execute(
          "UPDATE posts SET title = ?, content = ?, summary = ?, image = ?, \
          category = ?, tags = ?, author = ?, reading_time = ?, featured = ? \
          WHERE id = ?",
          params![
            post.title,
            post.content,
            post.summary,
            post.image,
            post.category.to_string(),
            tags_to_json(&post.tags),
            post.author,
            post.reading_time,
            bool_to_i32(post.featured),
            post.id
          ]
        ).context("Updating post")?;
        Some(post)
      },
      None => None
    };
    tx.commit()?;
    Ok(post)
  }

  fn delete_post(&self, id: &str) -> Result<bool> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let count = tx.execute("DELETE FROM posts WHERE id = ?", params![id])?;
    if count > 0 {
      tx.execute("DELETE FROM comments WHERE post_id = ?", params![id])?;
    }
    tx.commit()?;
    Ok(count > 0)
  }

  // Single statement, SQLite does the locking.
  fn increment_post_views(&self, id: &str) -> Result<()> {
    let conn = self.pool.get()?;
    conn.execute("UPDATE posts SET views = views + 1 WHERE id = ?", params![id])
      .context("Incrementing post views")?;
    Ok(())
  }

  fn comments_by_post(&self, post_id: &str) -> Result<Vec<Comment>> {
    self.select_many(
      &format!(
        "SELECT {} FROM comments WHERE post_id = ? ORDER BY created_at DESC, rowid DESC",
        COMMENT_COLUMNS
      ),
      params![post_id],
      map_comment
    )
  }

  fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
    let comment = comment.into_comment(new_id(), now());
    let conn = self.pool.get()?;
    conn.execute(
      &format!("INSERT INTO comments ({}) VALUES (?, ?, ?, ?, ?, ?)", COMMENT_COLUMNS),
      params![
        comment.id,
        comment.post_id,
        comment.parent_comment_id,
        comment.name,
        comment.content,
        to_millis(&comment.created_at)
      ]
    ).context("Inserting comment")?;
    Ok(comment)
  }

  fn all_events(&self) -> Result<Vec<Event>> {
    self.select_many(
      &format!("SELECT {} FROM events ORDER BY rowid ASC", EVENT_COLUMNS),
      params![],
      map_event
    )
  }

  fn event_by_id(&self, id: &str) -> Result<Option<Event>> {
    self.select_one(
      &format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS),
      params![id],
      map_event
    )
  }

  fn insert_event(&self, event: NewEvent) -> Result<Event> {
    let event = event.into_event(new_id());
    let conn = self.pool.get()?;
    conn.execute(
      &format!("INSERT INTO events ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)", EVENT_COLUMNS),
      params![
        event.id,
        event.title,
        event.title_ar,
        event.description,
        event.description_ar,
        event.date,
        event.event_type.to_string(),
        event.image
      ]
    ).context("Inserting event")?;
    Ok(event)
  }

  fn update_event(&self, id: &str, update: EventUpdate) -> Result<Option<Event>> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let event = select_one(
      &tx,
      &format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS),
      params![id],
      map_event
    )?;
    let event = match event {
      Some(mut event) => {
        update.apply_to(&mut event);
        tx.execute(
          "UPDATE events SET title = ?, title_ar = ?, description = ?, \
          description_ar = ?, date = ?, event_type = ?, image = ? WHERE id = ?",
          params![
            event.title,
            event.title_ar,
            event.description,
            event.description_ar,
            event.date,
            event.event_type.to_string(),
            event.image,
            event.id
          ]
        ).context("Updating event")?;
        Some(event)
      },
      None => None
    };
    tx.commit()?;
    Ok(event)
  }

  fn delete_event(&self, id: &str) -> Result<bool> {
    self.delete_by_id("events", id)
  }

  fn all_news(&self) -> Result<Vec<News>> {
    self.select_many(
      &format!("SELECT {} FROM news ORDER BY created_at DESC, rowid DESC", NEWS_COLUMNS),
      params![],
      map_news
    )
  }

  fn news_by_id(&self, id: &str) -> Result<Option<News>> {
    self.select_one(
      &format!("SELECT {} FROM news WHERE id = ?", NEWS_COLUMNS),
      params![id],
      map_news
    )
  }

  fn insert_news(&self, news: NewNews) -> Result<News> {
    let news = news.into_news(new_id(), now());
    let conn = self.pool.get()?;
    conn.execute(
      &format!(
        "INSERT INTO news ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        NEWS_COLUMNS
      ),
      params![
        news.id,
        news.title,
        news.title_ar,
        news.date_range,
        news.image,
        news.category,
        news.content,
        news.content_ar,
        news.html_content,
        news.author,
        bool_to_i32(news.featured),
        to_millis(&news.created_at)
      ]
    ).context("Inserting news")?;
    Ok(news)
  }

  fn update_news(&self, id: &str, update: NewsUpdate) -> Result<Option<News>> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let news = select_one(
      &tx,
      &format!("SELECT {} FROM news WHERE id = ?", NEWS_COLUMNS),
      params![id],
      map_news
    )?;
    let news = match news {
      Some(mut news) => {
        update.apply_to(&mut news);
        tx.execute(
          "UPDATE news SET title = ?, title_ar = ?, date_range = ?, image = ?, \
          category = ?, content = ?, content_ar = ?, html_content = ?, \
          author = ?, featured = ? WHERE id = ?",
          params![
            news.title,
            news.title_ar,
            news.date_range,
            news.image,
            news.category,
            news.content,
            news.content_ar,
            news.html_content,
            news.author,
            bool_to_i32(news.featured),
            news.id
          ]
        ).context("Updating news")?;
        Some(news)
      },
      None => None
    };
    tx.commit()?;
    Ok(news)
  }

  fn delete_news(&self, id: &str) -> Result<bool> {
    self.delete_by_id("news", id)
  }

  fn all_tickets(&self) -> Result<Vec<Ticket>> {
    self.select_many(
      &format!("SELECT {} FROM tickets ORDER BY created_at DESC, rowid DESC", TICKET_COLUMNS),
      params![],
      map_ticket
    )
  }

  fn ticket_by_id(&self, id: &str) -> Result<Option<Ticket>> {
    self.select_one(
      &format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS),
      params![id],
      map_ticket
    )
  }

  fn tickets_by_email(&self, email: &str) -> Result<Vec<Ticket>> {
    self.select_many(
      &format!(
        "SELECT {} FROM tickets WHERE user_email = ? ORDER BY created_at DESC, rowid DESC",
        TICKET_COLUMNS
      ),
      params![email],
      map_ticket
    )
  }

  fn insert_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
    let ticket = ticket.into_ticket(new_id(), now());
    let conn = self.pool.get()?;
    conn.execute(
      &format!(
        "INSERT INTO tickets ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        TICKET_COLUMNS
      ),
      params![
        ticket.id,
        ticket.title,
        ticket.description,
        ticket.user_name,
        ticket.user_email,
        ticket.status.to_string(),
        ticket.priority,
        ticket.category,
        to_millis(&ticket.created_at),
        to_millis(&ticket.updated_at)
      ]
    ).context("Inserting ticket")?;
    Ok(ticket)
  }

  fn update_ticket(&self, id: &str, update: TicketUpdate) -> Result<Option<Ticket>> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let ticket = select_one(
      &tx,
      &format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS),
      params![id],
      map_ticket
    )?;
    let ticket = match ticket {
      Some(mut ticket) => {
        update.apply_to(&mut ticket);
        ticket.updated_at = now();
        tx.execute(
          "UPDATE tickets SET title = ?, description = ?, user_name = ?, \
          user_email = ?, status = ?, priority = ?, category = ?, updated_at = ? \
          WHERE id = ?",
          params![
            ticket.title,
            ticket.description,
            ticket.user_name,
            ticket.user_email,
            ticket.status.to_string(),
            ticket.priority,
            ticket.category,
            to_millis(&ticket.updated_at),
            ticket.id
          ]
        ).context("Updating ticket")?;
        Some(ticket)
      },
      None => None
    };
    tx.commit()?;
    Ok(ticket)
  }

  fn delete_ticket(&self, id: &str) -> Result<bool> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let count = tx.execute("DELETE FROM tickets WHERE id = ?", params![id])?;
    if count > 0 {
      tx.execute("DELETE FROM ticket_replies WHERE ticket_id = ?", params![id])?;
    }
    tx.commit()?;
    Ok(count > 0)
  }

  fn replies_by_ticket(&self, ticket_id: &str) -> Result<Vec<TicketReply>> {
    self.select_many(
      &format!(
        "SELECT {} FROM ticket_replies WHERE ticket_id = ? ORDER BY created_at ASC, rowid ASC",
        REPLY_COLUMNS
      ),
      params![ticket_id],
      map_reply
    )
  }

  fn insert_reply(&self, reply: NewTicketReply) -> Result<TicketReply> {
    let reply = reply.into_reply(new_id(), now());
    let conn = self.pool.get()?;
    conn.execute(
      &format!("INSERT INTO ticket_replies ({}) VALUES (?, ?, ?, ?, ?, ?)", REPLY_COLUMNS),
      params![
        reply.id,
        reply.ticket_id,
        reply.author_name,
        reply.content,
        bool_to_i32(reply.is_admin),
        to_millis(&reply.created_at)
      ]
    ).context("Inserting ticket reply")?;
    Ok(reply)
  }

  fn all_admins(&self) -> Result<Vec<Admin>> {
    self.select_many(
      &format!("SELECT {} FROM admins ORDER BY created_at DESC, rowid DESC", ADMIN_COLUMNS),
      params![],
      map_admin
    )
  }

  fn admin_by_id(&self, id: &str) -> Result<Option<Admin>> {
    self.select_one(
      &format!("SELECT {} FROM admins WHERE id = ?", ADMIN_COLUMNS),
      params![id],
      map_admin
    )
  }

  fn admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
    self.select_one(
      &format!("SELECT {} FROM admins WHERE username = ?", ADMIN_COLUMNS),
      params![username],
      map_admin
    )
  }

  fn insert_admin(&self, admin: NewAdmin) -> Result<Admin> {
    let admin = admin.into_admin(new_id(), now());
    let conn = self.pool.get()?;
    conn.execute(
      &format!("INSERT INTO admins ({}) VALUES (?, ?, ?, ?, ?)", ADMIN_COLUMNS),
      params![
        admin.id,
        admin.username,
        admin.password,
        admin.role.to_string(),
        to_millis(&admin.created_at)
      ]
    ).context(format!("Inserting admin {}", admin.username))?;
    Ok(admin)
  }

  fn update_admin(&self, id: &str, update: AdminUpdate) -> Result<Option<Admin>> {
    let mut conn = self.pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let admin = select_one(
      &tx,
      &format!("SELECT {} FROM admins WHERE id = ?", ADMIN_COLUMNS),
      params![id],
      map_admin
    )?;
    let admin = match admin {
      Some(mut admin) => {
        update.apply_to(&mut admin);
        tx.execute(
          "UPDATE admins SET username = ?, password = ?, role = ? WHERE id = ?",
          params![
            admin.username,
            admin.password,
            admin.role.to_string(),
            admin.id
          ]
        ).context("Updating admin")?;
        Some(admin)
      },
      None => None
    };
    tx.commit()?;
    Ok(admin)
  }

  fn delete_admin(&self, id: &str) -> Result<bool> {
    self.delete_by_id("admins", id)
  }

  fn all_subscribers(&self) -> Result<Vec<NewsletterSubscriber>> {
    self.select_many(
      &format!(
        "SELECT {} FROM newsletter_subscribers ORDER BY created_at DESC, rowid DESC",
        SUBSCRIBER_COLUMNS
      ),
      params![],
      map_subscriber
    )
  }

  fn subscriber_by_email(&self, email: &str) -> Result<Option<NewsletterSubscriber>> {
    self.select_one(
      &format!("SELECT {} FROM newsletter_subscribers WHERE email = ?", SUBSCRIBER_COLUMNS),
      params![email],
      map_subscriber
    )
  }

  fn insert_subscriber(&self, email: &str) -> Result<NewsletterSubscriber> {
    let subscriber = NewsletterSubscriber {
      id: new_id(),
      email: email.to_string(),
      created_at: now()
    };
    let conn = self.pool.get()?;
    conn.execute(
      &format!("INSERT INTO newsletter_subscribers ({}) VALUES (?, ?, ?)", SUBSCRIBER_COLUMNS),
      params![
        subscriber.id,
        subscriber.email,
        to_millis(&subscriber.created_at)
      ]
    ).context(format!("Subscribing {}", email))?;
    Ok(subscriber)
  }

  fn delete_subscriber(&self, id: &str) -> Result<bool> {
    self.delete_by_id("newsletter_subscribers", id)
  }

}
