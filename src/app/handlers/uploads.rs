use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Result};
use futures::{StreamExt, TryStreamExt};
use super::super::auth::AuthedAdmin;
use super::super::dtos::UploadDto;
use super::super::error::Error;
use super::super::AppState;

// 10 MiB
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;
const IMAGE_FIELD: &str = "image";

fn read_error(e: actix_multipart::MultipartError) -> Error {
  Error::BadRequest(format!("Could not read upload - {}", e))
}

// The file goes straight to the image host, we only look
// at the "image" field and drop everything else.
pub async fn upload_image(
  _admin: AuthedAdmin,
  app_state: web::Data<AppState>,
  mut payload: Multipart
) -> Result<HttpResponse, Error> {
  while let Some(mut field) = payload.try_next().await.map_err(read_error)? {
    let is_image = field.content_disposition().get_name() == Some(IMAGE_FIELD);
    if !is_image {
      while let Some(chunk) = field.next().await {
        chunk.map_err(read_error)?;
      }
      continue;
    }
    let file_name = field.content_disposition()
      .get_filename()
      .unwrap_or("image")
      .to_string();
    let content_type = field.content_type().map(|m| m.to_string());
    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = field.next().await {
      let chunk = chunk.map_err(read_error)?;
      if bytes.len() + chunk.len() > MAX_IMAGE_SIZE {
        return Err(Error::BadRequest(String::from("Image is too large (10 MB max)")));
      }
      bytes.extend_from_slice(&chunk);
    }
    if bytes.is_empty() {
      break;
    }
    let url = app_state.image_host.upload(file_name, content_type, bytes).await?;
    return Ok(HttpResponse::Ok().json(UploadDto { url }));
  }
  Err(Error::BadRequest(String::from("No image file provided")))
}
