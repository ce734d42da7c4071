use log::{error, info};
use reqwest::multipart::{Form, Part};
use super::error::Error;

// Anonymous file host the dashboard images end up on.
// We never keep the file ourselves.
pub struct ImageHost {
  client: reqwest::Client,
  upload_url: String
}

impl ImageHost {

  pub fn new(client: reqwest::Client, upload_url: &str) -> Self {
    Self {
      client,
      upload_url: upload_url.to_string()
    }
  }

  // The host answers with the URL as plain text.
  pub async fn upload(
    &self,
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>
  ) -> Result<String, Error> {
    let mut part = Part::bytes(bytes).file_name(file_name);
    if let Some(content_type) = content_type {
      part = part.mime_str(&content_type)
        .map_err(|_| Error::BadRequest(String::from("Invalid image content type")))?;
    }
    let form = Form::new()
      .text("reqtype", "fileupload")
      .part("fileToUpload", part);

    let response = self.client.post(&self.upload_url)
      .multipart(form)
      .send()
      .await
      .map_err(upload_error)?;
    if !response.status().is_success() {
      error!("Image host answered with HTTP status {}", response.status());
      return Err(Error::InternalServerError(String::from("Failed to upload image")));
    }
    let body = response.text().await.map_err(upload_error)?;
    let url = body.trim();
    if !url.starts_with("http") {
      error!("Image host gave something that isn't a URL: {}", url);
      return Err(Error::InternalServerError(String::from("Failed to upload image")));
    }
    info!("Uploaded an image to {}", url);
    Ok(url.to_string())
  }

}

fn upload_error(e: reqwest::Error) -> Error {
  error!("Image upload failed - {}", e);
  Error::InternalServerError(String::from("Failed to upload image"))
}
