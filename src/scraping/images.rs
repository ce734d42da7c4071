use lazy_static::lazy_static;
use regex::{Captures, Regex};
use scraper::{ElementRef, Selector};

lazy_static! {
  static ref IMG: Selector = Selector::parse("img").unwrap();
  static ref WITH_BACKGROUND: Selector =
    Selector::parse(r#"[style*="background-image"]"#).unwrap();
  static ref WITH_DATA_IMAGE: Selector =
    Selector::parse("[data-background], [data-bg], [data-image]").unwrap();
  static ref BACKGROUND_IMAGE: Regex =
    Regex::new(r#"(?i)background-image:\s*url\(['"]?([^'")]+)['"]?\)"#).unwrap();
  // Root-relative only, protocol-relative URLs ("//cdn...")
  // are left alone.
  static ref RELATIVE_SRC_DOUBLE: Regex =
    Regex::new(r#"(data-src|data-original|src)="(/[^/"][^"]*)""#).unwrap();
  static ref RELATIVE_SRC_SINGLE: Regex =
    Regex::new(r#"(data-src|data-original|src)='(/[^/'][^']*)'"#).unwrap();
}

// Empty attributes count as missing.
fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
  element.value().attr(name).filter(|v| !v.trim().is_empty())
}

fn background_image(element: &ElementRef) -> Option<String> {
  let style = element.value().attr("style")?;
  BACKGROUND_IMAGE.captures(style)
    .map(|c| c[1].trim().to_string())
}

fn data_image(element: &ElementRef) -> Option<String> {
  attr(element, "data-background")
    .or_else(|| attr(element, "data-bg"))
    .or_else(|| attr(element, "data-image"))
    .map(|v| v.to_string())
}

fn from_img(img: &ElementRef) -> Option<String> {
  attr(img, "src")
    .or_else(|| attr(img, "data-src"))
    .or_else(|| attr(img, "data-original"))
    .map(|v| v.to_string())
    .or_else(|| {
      // First candidate of the srcset, without its descriptor.
      attr(img, "srcset")
        .and_then(|s| s.split(',').next())
        .and_then(|c| c.split_whitespace().next())
        .map(|v| v.to_string())
    })
    .or_else(|| background_image(img))
}

/**
 * Sites hide their pictures in all sorts of places, we try
 * these in order:
 * - the first img below the element (src, lazy loading
 *   attributes, srcset, inline style)
 * - the element's own background-image
 * - a descendant with a background-image
 * - data-background, data-bg or data-image on the element
 *   or a descendant
 * Root-relative URLs get the base prepended. Empty string
 * when nothing was found.
 */
pub fn extract_image_url(element: ElementRef, base: &str) -> String {
  let url = element.select(&IMG).next()
    .and_then(|img| from_img(&img))
    .or_else(|| background_image(&element))
    .or_else(|| {
      element.select(&WITH_BACKGROUND).next()
        .and_then(|e| background_image(&e))
    })
    .or_else(|| data_image(&element))
    .or_else(|| {
      element.select(&WITH_DATA_IMAGE).next()
        .and_then(|e| data_image(&e))
    });
  match url {
    Some(url) => absolute_url(&url, base),
    None => String::new()
  }
}

fn absolute_url(url: &str, base: &str) -> String {
  if url.starts_with("http://") || url.starts_with("https://") {
    url.to_string()
  } else if url.starts_with('/') {
    format!("{}{}", base, url)
  } else {
    url.to_string()
  }
}

// Forum post bodies reference their images with root-relative
// URLs that break once the HTML is served from our site.
pub fn fix_html_content_urls(html: &str, base: &str) -> String {
  let fixed = RELATIVE_SRC_DOUBLE.replace_all(html, |c: &Captures| {
    format!("{}=\"{}{}\"", &c[1], base, &c[2])
  });
  RELATIVE_SRC_SINGLE.replace_all(&fixed, |c: &Captures| {
    format!("{}='{}{}'", &c[1], base, &c[2])
  }).into_owned()
}
