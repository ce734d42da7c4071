use actix_multipart::Multipart;
use actix_web::{http::{header, StatusCode}, test, web, App, HttpResponse, HttpServer};
use futures::TryStreamExt;
use serde_json::{json, Value};
use std::sync::RwLock;
use crate::config::ScraperSettings;
use crate::db::entities::*;
use crate::db::MemoryStore;
use crate::utils::password_utils::hash_password;
use super::super::auth::{issue_token, AuthSettings};
use super::super::image_host::ImageHost;
use super::super::rate_limiter::BasicRateLimiter;
use super::super::scrape_import::ScrapeService;
use super::super::{api_config, AppState};

// Nothing listens on port 9, every outbound call fails fast.
const NOWHERE: &str = "http://127.0.0.1:9";
const ADMIN_PASSWORD: &str = "let-me-in";

fn auth_settings() -> AuthSettings {
  AuthSettings {
    jwt_secret: String::from("handler-tests-secret"),
    admin_password: Some(ADMIN_PASSWORD.to_string()),
    token_ttl_days: 7
  }
}

fn build_state(auth: AuthSettings, max_requests: u32, upload_url: &str) -> web::Data<AppState> {
  let client = reqwest::Client::new();
  web::Data::new(AppState {
    store: Box::new(MemoryStore::new()),
    auth,
    login_limiter: RwLock::new(BasicRateLimiter::new(max_requests, 60, 60)),
    forms_limiter: RwLock::new(BasicRateLimiter::new(max_requests, 60, 60)),
    scrape_service: ScrapeService::new(client.clone(), ScraperSettings {
      events_url: format!("{}/events", NOWHERE),
      forum_url: format!("{}/forum", NOWHERE),
      forum_base: NOWHERE.to_string(),
      image_base: NOWHERE.to_string()
    }),
    image_host: ImageHost::new(client, upload_url)
  })
}

fn state() -> web::Data<AppState> {
  build_state(auth_settings(), 10_000, &format!("{}/upload", NOWHERE))
}

fn bearer(role: AdminRole) -> (header::HeaderName, String) {
  let token = issue_token(
    &auth_settings(),
    Some("a1".to_string()),
    Some("xenon".to_string()),
    role
  ).unwrap();
  (header::AUTHORIZATION, format!("Bearer {}", token))
}

fn seed_post(state: &AppState, title: &str, category: Category, featured: bool) -> Post {
  state.store.insert_post(NewPost {
    title: title.to_string(),
    content: format!("All about {}", title),
    summary: String::from("Summary"),
    image: String::new(),
    category,
    tags: vec![String::from("crossfire")],
    author: String::from("Xenon"),
    reading_time: 1,
    featured
  }).unwrap()
}

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data($state.clone())
        .configure(api_config)
    ).await
  };
}

#[actix_web::test]
async fn protected_routes_need_a_token() {
  let state = state();
  let app = app!(state);
  let requests = vec![
    test::TestRequest::post().uri("/api/posts")
      .set_json(json!({"title": "t", "content": "c", "category": "News", "author": "a"})),
    test::TestRequest::patch().uri("/api/events/e1").set_json(json!({"title": "x"})),
    test::TestRequest::delete().uri("/api/news/n1"),
    test::TestRequest::get().uri("/api/stats"),
    test::TestRequest::get().uri("/api/tickets"),
    test::TestRequest::post().uri("/api/scrape/events"),
    test::TestRequest::get().uri("/api/admins")
  ];
  for req in requests {
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(StatusCode::UNAUTHORIZED, resp.status());
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
  }
  let req = test::TestRequest::get().uri("/api/stats")
    .insert_header((header::AUTHORIZATION, "Bearer garbage"))
    .to_request();
  assert_eq!(StatusCode::UNAUTHORIZED, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn admin_management_needs_a_super_admin() {
  let state = state();
  let app = app!(state);
  let req = test::TestRequest::get().uri("/api/admins")
    .insert_header(bearer(AdminRole::Admin))
    .to_request();
  assert_eq!(StatusCode::FORBIDDEN, test::call_service(&app, req).await.status());
  let req = test::TestRequest::get().uri("/api/newsletter-subscribers")
    .insert_header(bearer(AdminRole::Admin))
    .to_request();
  assert_eq!(StatusCode::FORBIDDEN, test::call_service(&app, req).await.status());
  let req = test::TestRequest::get().uri("/api/admins")
    .insert_header(bearer(AdminRole::SuperAdmin))
    .to_request();
  assert_eq!(StatusCode::OK, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn created_posts_count_their_views() {
  let state = state();
  let app = app!(state);
  let req = test::TestRequest::post().uri("/api/posts")
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({
      "title": "Season 3",
      "content": "# New season\nLots of **new** maps",
      "category": "News",
      "tags": ["season", "maps"],
      "author": "Xenon",
      "summary": ""
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::CREATED, resp.status());
  let created: Value = test::read_body_json(resp).await;
  assert_eq!(0, created["views"]);
  assert_eq!(1, created["readingTime"]);
  assert_eq!("New season\nLots of new maps", created["summary"]);
  assert_eq!(json!(["season", "maps"]), created["tags"]);
  assert_eq!("0 minutes ago", created["date"]);
  let id = created["id"].as_str().unwrap().to_string();

  for expected_views in 1..=2 {
    let req = test::TestRequest::get().uri(&format!("/api/posts/{}", id)).to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(expected_views, post["views"]);
    assert_eq!("Season 3", post["title"]);
    assert_eq!("Xenon", post["author"]);
  }

  let req = test::TestRequest::get().uri("/api/posts/missing").to_request();
  assert_eq!(StatusCode::NOT_FOUND, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn posts_can_be_filtered() {
  let state = state();
  seed_post(&state, "Zombie mode returns", Category::News, false);
  seed_post(&state, "Best sniper rifles", Category::Reviews, true);
  let app = app!(state);

  let req = test::TestRequest::get().uri("/api/posts?category=news").to_request();
  let posts: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(1, posts.len());
  assert_eq!("Zombie mode returns", posts[0]["title"]);

  let req = test::TestRequest::get().uri("/api/posts?category=all").to_request();
  let posts: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(2, posts.len());
  // Newest first.
  assert_eq!("Best sniper rifles", posts[0]["title"]);

  let req = test::TestRequest::get().uri("/api/posts?search=SNIPER").to_request();
  let posts: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(1, posts.len());

  let req = test::TestRequest::get().uri("/api/posts?featured=true").to_request();
  let posts: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(1, posts.len());
  assert_eq!(true, posts[0]["featured"]);
}

#[actix_web::test]
async fn updating_content_recomputes_summary() {
  let state = state();
  let post = seed_post(&state, "Patch notes", Category::News, false);
  let app = app!(state);
  let long_content = vec!["word"; 401].join(" ");
  let req = test::TestRequest::patch().uri(&format!("/api/posts/{}", post.id))
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({"content": long_content}))
    .to_request();
  let updated: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(3, updated["readingTime"]);
  assert!(updated["summary"].as_str().unwrap().ends_with("..."));
  assert_eq!("Patch notes", updated["title"]);
}

#[actix_web::test]
async fn deleting_a_post() {
  let state = state();
  let post = seed_post(&state, "Old news", Category::News, false);
  let app = app!(state);
  let uri = format!("/api/posts/{}", post.id);
  let req = test::TestRequest::delete().uri(&uri)
    .insert_header(bearer(AdminRole::Admin))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(json!({"success": true}), body);
  let req = test::TestRequest::delete().uri(&uri)
    .insert_header(bearer(AdminRole::Admin))
    .to_request();
  assert_eq!(StatusCode::NOT_FOUND, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn comments_on_posts() {
  let state = state();
  let post = seed_post(&state, "Clan wars", Category::Events, false);
  let app = app!(state);
  let uri = format!("/api/posts/{}/comments", post.id);

  let req = test::TestRequest::post().uri("/api/posts/missing/comments")
    .set_json(json!({"author": "Player", "content": "Hi"}))
    .to_request();
  assert_eq!(StatusCode::NOT_FOUND, test::call_service(&app, req).await.status());

  let req = test::TestRequest::post().uri(&uri)
    .set_json(json!({"author": "  ", "content": "Hi"}))
    .to_request();
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, req).await.status());

  let req = test::TestRequest::post().uri(&uri)
    .set_json(json!({"author": "Player", "content": "Can't wait"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::CREATED, resp.status());
  let comment: Value = test::read_body_json(resp).await;
  assert_eq!("Player", comment["name"]);
  assert_eq!("0 minutes ago", comment["date"]);

  let req = test::TestRequest::post().uri(&uri)
    .set_json(json!({"author": "Other", "content": "Me neither", "parentCommentId": comment["id"]}))
    .to_request();
  assert_eq!(StatusCode::CREATED, test::call_service(&app, req).await.status());

  let req = test::TestRequest::post().uri(&uri)
    .set_json(json!({"author": "Other", "content": "Lost", "parentCommentId": "nope"}))
    .to_request();
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, req).await.status());

  let req = test::TestRequest::get().uri(&uri).to_request();
  let comments: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(2, comments.len());
}

#[actix_web::test]
async fn login_with_the_admin_password() {
  let state = state();
  let app = app!(state);
  let req = test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({"password": "wrong"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::UNAUTHORIZED, resp.status());
  let body: Value = test::read_body_json(resp).await;
  assert!(body.get("token").is_none());

  let req = test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({"password": ADMIN_PASSWORD}))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("super_admin", body["admin"]["role"]);
  let token = body["token"].as_str().unwrap();

  // The token we got works on super admin routes.
  let req = test::TestRequest::get().uri("/api/admins")
    .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
    .to_request();
  assert_eq!(StatusCode::OK, test::call_service(&app, req).await.status());

  let req = test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({}))
    .to_request();
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn login_with_an_admin_account() {
  let state = state();
  state.store.insert_admin(NewAdmin {
    username: String::from("moderator"),
    password: hash_password("hunter22").unwrap(),
    role: AdminRole::Admin
  }).unwrap();
  let app = app!(state);

  let req = test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({"username": "moderator", "password": "hunter2"}))
    .to_request();
  assert_eq!(StatusCode::UNAUTHORIZED, test::call_service(&app, req).await.status());

  let req = test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({"username": "nobody", "password": "hunter22"}))
    .to_request();
  assert_eq!(StatusCode::UNAUTHORIZED, test::call_service(&app, req).await.status());

  let req = test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({"username": "moderator", "password": "hunter22"}))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("moderator", body["admin"]["username"]);
  assert_eq!("admin", body["admin"]["role"]);
  assert!(body["admin"]["id"].is_string());
}

#[actix_web::test]
async fn password_only_login_is_closed_without_a_configured_password() {
  let settings = AuthSettings { admin_password: None, ..auth_settings() };
  let state = build_state(settings, 10_000, NOWHERE);
  let app = app!(state);
  let req = test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({"password": ADMIN_PASSWORD}))
    .to_request();
  assert_eq!(StatusCode::UNAUTHORIZED, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn public_forms_are_rate_limited() {
  let state = build_state(auth_settings(), 2, NOWHERE);
  let app = app!(state);
  let subscribe = |email: &str| test::TestRequest::post().uri("/api/newsletter-subscribe")
    .set_json(json!({"email": email}))
    .to_request();
  let req = subscribe("first@example.com");
  assert_eq!(StatusCode::CREATED, test::call_service(&app, req).await.status());
  let req = test::TestRequest::post().uri("/api/tickets")
    .set_json(json!({
      "title": "Spam",
      "description": "Spam",
      "userName": "Spammer",
      "userEmail": "spam@example.com"
    }))
    .to_request();
  assert_eq!(StatusCode::TOO_MANY_REQUESTS, test::call_service(&app, req).await.status());
  let req = subscribe("second@example.com");
  assert_eq!(StatusCode::TOO_MANY_REQUESTS, test::call_service(&app, req).await.status());

  // The forms being blocked doesn't keep admins from logging in.
  let req = test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({"password": ADMIN_PASSWORD}))
    .to_request();
  assert_eq!(StatusCode::OK, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn login_has_its_own_rate_limit() {
  let state = build_state(auth_settings(), 2, NOWHERE);
  let app = app!(state);
  let login = || test::TestRequest::post().uri("/api/auth/login")
    .set_json(json!({"password": "wrong"}))
    .to_request();
  assert_eq!(StatusCode::UNAUTHORIZED, test::call_service(&app, login()).await.status());
  assert_eq!(StatusCode::TOO_MANY_REQUESTS, test::call_service(&app, login()).await.status());
  let req = test::TestRequest::post().uri("/api/newsletter-subscribe")
    .set_json(json!({"email": "player@example.com"}))
    .to_request();
  assert_eq!(StatusCode::CREATED, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn tickets_and_replies() {
  let state = state();
  let app = app!(state);

  let req = test::TestRequest::post().uri("/api/tickets")
    .set_json(json!({
      "title": "Lost my items",
      "description": "After the update",
      "userName": "Player",
      "userEmail": "not an email"
    }))
    .to_request();
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, req).await.status());

  let req = test::TestRequest::post().uri("/api/tickets")
    .set_json(json!({
      "title": "Lost my items",
      "description": "After the update",
      "userName": "Player",
      "userEmail": "player@example.com",
      "status": "closed"
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::CREATED, resp.status());
  let ticket: Value = test::read_body_json(resp).await;
  assert_eq!("open", ticket["status"]);
  assert_eq!("normal", ticket["priority"]);
  let id = ticket["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::get().uri("/api/tickets")
    .insert_header(bearer(AdminRole::Admin))
    .to_request();
  let tickets: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert!(tickets[0].get("userEmail").is_none());
  assert_eq!("0 minutes ago", tickets[0]["createdAt"]);
  let req = test::TestRequest::get().uri("/api/tickets")
    .insert_header(bearer(AdminRole::SuperAdmin))
    .to_request();
  let tickets: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!("player@example.com", tickets[0]["userEmail"]);

  let req = test::TestRequest::get().uri("/api/tickets/my/player@example.com").to_request();
  let mine: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(1, mine.len());

  let replies_uri = format!("/api/tickets/{}/replies", id);
  let req = test::TestRequest::post().uri(&replies_uri)
    .set_json(json!({"authorName": "Player", "content": "Any news?", "isAdmin": true}))
    .to_request();
  let reply: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(false, reply["isAdmin"]);
  let req = test::TestRequest::post().uri(&replies_uri)
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({"authorName": "GM", "content": "On it", "isAdmin": true}))
    .to_request();
  let reply: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(true, reply["isAdmin"]);

  let req = test::TestRequest::get().uri(&replies_uri).to_request();
  let replies: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(vec!["Any news?", "On it"], replies.iter()
    .map(|r| r["content"].as_str().unwrap())
    .collect::<Vec<_>>());

  let req = test::TestRequest::patch().uri(&format!("/api/tickets/{}", id))
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({"status": "resolved"}))
    .to_request();
  let updated: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("resolved", updated["status"]);

  let req = test::TestRequest::post().uri("/api/tickets/missing/replies")
    .set_json(json!({"authorName": "Player", "content": "Hello?"}))
    .to_request();
  assert_eq!(StatusCode::NOT_FOUND, test::call_service(&app, req).await.status());
}

// Every ticket and reply route answers with the same date
// format as the dashboard list.
#[actix_web::test]
async fn ticket_dates_are_formatted_everywhere() {
  let state = state();
  let app = app!(state);

  let req = test::TestRequest::post().uri("/api/tickets")
    .set_json(json!({
      "title": "Can't connect",
      "description": "Stuck at the login screen",
      "userName": "Player",
      "userEmail": "player@example.com"
    }))
    .to_request();
  let created: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("0 minutes ago", created["createdAt"]);
  assert_eq!("0 minutes ago", created["updatedAt"]);
  assert_eq!("player@example.com", created["userEmail"]);
  let id = created["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::get().uri("/api/tickets/my/player@example.com").to_request();
  let mine: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!("0 minutes ago", mine[0]["createdAt"]);
  assert_eq!("player@example.com", mine[0]["userEmail"]);

  let req = test::TestRequest::get().uri(&format!("/api/tickets/{}", id)).to_request();
  let ticket: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("0 minutes ago", ticket["updatedAt"]);

  let req = test::TestRequest::patch().uri(&format!("/api/tickets/{}", id))
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({"priority": "high"}))
    .to_request();
  let updated: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("high", updated["priority"]);
  assert_eq!("0 minutes ago", updated["updatedAt"]);

  let replies_uri = format!("/api/tickets/{}/replies", id);
  let req = test::TestRequest::post().uri(&replies_uri)
    .set_json(json!({"authorName": "Player", "content": "Still broken"}))
    .to_request();
  let reply: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("0 minutes ago", reply["createdAt"]);
  let req = test::TestRequest::get().uri(&replies_uri).to_request();
  let replies: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!("0 minutes ago", replies[0]["createdAt"]);
  assert_eq!(id, replies[0]["ticketId"]);
}

#[actix_web::test]
async fn managing_admins() {
  let state = state();
  let app = app!(state);
  let create = |username: &str| test::TestRequest::post().uri("/api/admins")
    .insert_header(bearer(AdminRole::SuperAdmin))
    .set_json(json!({"username": username, "password": "secret-pass"}))
    .to_request();

  let resp = test::call_service(&app, create("moderator")).await;
  assert_eq!(StatusCode::CREATED, resp.status());
  let admin: Value = test::read_body_json(resp).await;
  assert_eq!("admin", admin["role"]);
  assert!(admin.get("password").is_none());
  let resp = test::call_service(&app, create("moderator")).await;
  assert_eq!(StatusCode::BAD_REQUEST, resp.status());

  let other: Value = test::call_and_read_body_json(&app, create("helper")).await;
  let req = test::TestRequest::patch().uri(&format!("/api/admins/{}", other["id"].as_str().unwrap()))
    .insert_header(bearer(AdminRole::SuperAdmin))
    .set_json(json!({"username": "moderator"}))
    .to_request();
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, req).await.status());
}

#[actix_web::test]
async fn newsletter_subscriptions_are_unique() {
  let state = state();
  let app = app!(state);
  let subscribe = |email: &str| test::TestRequest::post().uri("/api/newsletter-subscribe")
    .set_json(json!({"email": email}))
    .to_request();
  assert_eq!(StatusCode::CREATED, test::call_service(&app, subscribe("Player@Example.com")).await.status());
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, subscribe("player@example.com")).await.status());
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, subscribe("nope")).await.status());
}

#[actix_web::test]
async fn events_and_news_crud() {
  let state = state();
  let app = app!(state);
  let req = test::TestRequest::post().uri("/api/events")
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({"title": "Zombie Night", "date": "Oct 31", "type": "upcoming"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::CREATED, resp.status());
  let event: Value = test::read_body_json(resp).await;
  assert_eq!("", event["titleAr"]);
  let req = test::TestRequest::patch().uri(&format!("/api/events/{}", event["id"].as_str().unwrap()))
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({"type": "trending"}))
    .to_request();
  let event: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("trending", event["type"]);
  assert_eq!("Zombie Night", event["title"]);

  let req = test::TestRequest::post().uri("/api/news")
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({"title": "Maintenance", "content": "Servers down at 2am"}))
    .to_request();
  let news: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("", news["htmlContent"]);
  let req = test::TestRequest::get().uri(&format!("/api/news/{}", news["id"].as_str().unwrap())).to_request();
  let fetched: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!("Maintenance", fetched["title"]);

  let req = test::TestRequest::get().uri("/api/mercenaries").to_request();
  let mercenaries: Vec<Value> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(10, mercenaries.len());
}

#[actix_web::test]
async fn scraped_news_is_deduplicated_against_the_store() {
  let state = state();
  state.store.insert_news(NewNews {
    title: String::from("Foo"),
    title_ar: String::from("Foo"),
    date_range: String::new(),
    image: String::new(),
    category: String::from("News"),
    content: String::from("Already here"),
    content_ar: String::new(),
    html_content: String::new(),
    author: String::from("GM Xenon"),
    featured: false
  }).unwrap();
  let app = app!(state);
  let item = |title: &str| json!({
    "title": title,
    "dateRange": "10/1/2026",
    "category": "Announcements",
    "content": "Body",
    "author": "GM Xenon"
  });
  let req = test::TestRequest::post().uri("/api/scrape/news")
    .insert_header(bearer(AdminRole::Admin))
    .set_json(json!({"selectedItems": [item("FOO"), item("Bar")]}))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(true, body["success"]);
  assert_eq!(1, body["count"]);
  assert_eq!(1, body["skipped"]);
  assert_eq!("Bar", body["news"][0]["title"]);
  assert_eq!(2, state.store.all_news().unwrap().len());
}

#[actix_web::test]
async fn scraping_an_unreachable_site_imports_nothing() {
  let state = state();
  let app = app!(state);
  let req = test::TestRequest::post().uri("/api/scrape/events")
    .insert_header(bearer(AdminRole::Admin))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(0, body["count"]);
  let req = test::TestRequest::get().uri("/api/scrape/preview/news")
    .insert_header(bearer(AdminRole::Admin))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(0, body["count"]);
}

#[actix_web::test]
async fn stats_for_the_dashboard() {
  let state = state();
  for i in 0..6 {
    seed_post(&state, &format!("Post {}", i), Category::News, false);
  }
  let app = app!(state);
  let req = test::TestRequest::get().uri("/api/stats")
    .insert_header(bearer(AdminRole::Admin))
    .to_request();
  let stats: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(6, stats["totalPosts"]);
  assert_eq!(0, stats["totalComments"]);
  assert_eq!(0, stats["totalViews"]);
  assert_eq!(5, stats["recentPosts"].as_array().unwrap().len());
}

#[actix_web::test]
async fn bad_requests_and_unknown_routes() {
  let state = state();
  let app = app!(state);
  let req = test::TestRequest::post().uri("/api/newsletter-subscribe")
    .insert_header((header::CONTENT_TYPE, "application/json"))
    .set_payload("{not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::BAD_REQUEST, resp.status());
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

  let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::NOT_FOUND, resp.status());
  let body: Value = test::read_body_json(resp).await;
  assert_eq!("Endpoint doesn't exist", body["error"]);

  let req = test::TestRequest::post().uri("/api/upload-image")
    .insert_header(bearer(AdminRole::Admin))
    .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=xyz"))
    .set_payload("--xyz--\r\n")
    .to_request();
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, req).await.status());
}

// Stands in for the anonymous image host. "/upload" checks
// the form the way the real host expects it, "/broken"
// answers with something that isn't a URL.
async fn fake_image_host(mut payload: Multipart) -> HttpResponse {
  let mut reqtype = String::new();
  let mut file = Vec::new();
  while let Some(mut field) = payload.try_next().await.unwrap() {
    let name = field.content_disposition().get_name().unwrap_or("").to_string();
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.unwrap() {
      data.extend_from_slice(&chunk);
    }
    match name.as_str() {
      "reqtype" => reqtype = String::from_utf8(data).unwrap(),
      "fileToUpload" => file = data,
      _ => {}
    }
  }
  if reqtype == "fileupload" && file == b"PNGDATA" {
    HttpResponse::Ok().body("  https://files.example.com/abc123.png\n")
  } else {
    HttpResponse::BadRequest().finish()
  }
}

async fn start_fake_image_host() -> String {
  let server = HttpServer::new(|| {
    App::new()
      .route("/upload", web::post().to(fake_image_host))
      .route("/broken", web::post().to(|| async { HttpResponse::Ok().body("Upload failed") }))
  })
  .workers(1)
  .bind(("127.0.0.1", 0))
  .unwrap();
  let addr = server.addrs()[0];
  actix_web::rt::spawn(server.run());
  format!("http://{}", addr)
}

fn image_upload(field: &str, bytes: &[u8]) -> test::TestRequest {
  let mut body = Vec::new();
  body.extend_from_slice(format!(
    "--xyz\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"cover.png\"\r\n\
    Content-Type: image/png\r\n\r\n",
    field
  ).as_bytes());
  body.extend_from_slice(bytes);
  body.extend_from_slice(b"\r\n--xyz--\r\n");
  test::TestRequest::post().uri("/api/upload-image")
    .insert_header(bearer(AdminRole::Admin))
    .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=xyz"))
    .set_payload(body)
}

#[actix_web::test]
async fn images_are_proxied_to_the_host() {
  let host = start_fake_image_host().await;
  let state = build_state(auth_settings(), 10_000, &format!("{}/upload", host));
  let app = app!(state);

  let req = image_upload("image", b"PNGDATA").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::OK, resp.status());
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(json!({"url": "https://files.example.com/abc123.png"}), body);

  let req = image_upload("avatar", b"PNGDATA").to_request();
  assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&app, req).await.status());

  let too_big = vec![0u8; 10 * 1024 * 1024 + 1];
  let req = image_upload("image", &too_big).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::BAD_REQUEST, resp.status());
  let body: Value = test::read_body_json(resp).await;
  assert_eq!("Image is too large (10 MB max)", body["error"]);
}

#[actix_web::test]
async fn image_host_failures_are_server_errors() {
  let host = start_fake_image_host().await;
  let state = build_state(auth_settings(), 10_000, &format!("{}/broken", host));
  let app = app!(state);
  let req = image_upload("image", b"PNGDATA").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, resp.status());
  let body: Value = test::read_body_json(resp).await;
  assert_eq!("Failed to upload image", body["error"]);

  // Nothing listening at all.
  let state = build_state(auth_settings(), 10_000, &format!("{}/upload", NOWHERE));
  let app = app!(state);
  let req = image_upload("image", b"PNGDATA").to_request();
  assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, test::call_service(&app, req).await.status());
}
