use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use domains::ports::Upload;
use mime::Mime;

use crate::error::{ApiError, ApiResult};

/// A fully buffered `multipart/form-data` body.
///
/// Parts that carry a file name are files, everything else is text. A file
/// input submitted without choosing a file (empty name, no bytes) is dropped.
#[derive(Default)]
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .and_then(|value| value.parse::<Mime>().ok())
                        .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream());
                    let data = field.bytes().await?;
                    if data.is_empty() && file_name.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        Upload {
                            data,
                            content_type,
                            file_name: Some(file_name).filter(|n| !n.is_empty()),
                        },
                    );
                }
                None => {
                    form.fields.insert(name, field.text().await?);
                }
            }
        }
        Ok(form)
    }

    /// A text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    pub fn required(&self, name: &str) -> ApiResult<String> {
        self.text(name)
            .ok_or_else(|| ApiError::bad_request(format!("Field `{name}` is required")))
    }

    pub fn number<T: FromStr>(&self, name: &str) -> ApiResult<Option<T>> {
        self.text(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| ApiError::bad_request(format!("Field `{name}` must be a number")))
            })
            .transpose()
    }

    pub fn file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "XBOUNDARYX";

    async fn form(parts: &[(&str, Option<&str>, &str)]) -> FormData {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::builder()
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await.unwrap();
        FormData::read(multipart).await.unwrap()
    }

    #[tokio::test]
    async fn splits_text_fields_from_files() {
        let mut form = form(&[
            ("title", None, "  Wall  "),
            ("latitude", None, "48.85"),
            ("image", Some("wall.png"), "not really a png"),
        ])
        .await;

        assert_eq!(form.required("title").unwrap(), "Wall");
        assert_eq!(form.number::<f64>("latitude").unwrap(), Some(48.85));
        let image = form.file("image").unwrap();
        assert_eq!(image.content_type, mime::IMAGE_PNG);
        assert_eq!(image.file_name.as_deref(), Some("wall.png"));
        assert_eq!(&image.data[..], b"not really a png");
    }

    #[tokio::test]
    async fn blank_and_malformed_fields_are_reported() {
        let mut form = form(&[
            ("title", None, "   "),
            ("longitude", None, "east"),
            ("image", Some(""), ""),
        ])
        .await;

        assert!(form.text("title").is_none());
        assert!(matches!(form.required("title"), Err(ApiError::BadRequest(_))));
        assert!(form.number::<f64>("longitude").is_err());
        assert!(form.number::<f64>("missing").unwrap().is_none());
        assert!(form.file("image").is_none());
    }
}
