use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::HttpRequest;
use futures_util::TryStreamExt;

use crate::error::{AppError, AppResult};
use crate::utils::upload::UploadedFile;

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Text fields and file parts of a `multipart/form-data` request.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl FormData {
    /// Drains the multipart stream. Requests that are not multipart at all
    /// produce an empty form so handlers can report the missing data
    /// themselves.
    pub async fn from_multipart(
        req: &HttpRequest,
        mut payload: Multipart,
        max_file_bytes: usize,
    ) -> AppResult<Self> {
        if !is_multipart(req) {
            return Ok(Self::default());
        }

        let mut form = Self::default();
        while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
            let (name, file_name) = match field.content_disposition() {
                Some(disposition) => (
                    disposition.get_name().unwrap_or_default().to_string(),
                    disposition.get_filename().map(str::to_string),
                ),
                None => (String::new(), None),
            };
            let content_type = field.content_type().map(ToString::to_string);
            let limit = if file_name.is_some() {
                max_file_bytes
            } else {
                MAX_TEXT_FIELD_BYTES
            };

            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(malformed)? {
                if bytes.len() + chunk.len() > limit {
                    return Err(AppError::bad_request(format!(
                        "{name} exceeds the {limit} byte limit"
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            match file_name {
                Some(file_name) => form.files.push(UploadedFile {
                    field_name: name,
                    file_name,
                    content_type,
                    bytes,
                }),
                None => {
                    let value = String::from_utf8(bytes)
                        .map_err(|_| AppError::bad_request(format!("{name} is not valid UTF-8")))?;
                    form.fields.entry(name).or_insert(value);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    /// The first attached file, whatever its field name.
    pub fn first_file(&self) -> Option<&UploadedFile> {
        self.files.first()
    }
}

#[cfg(test)]
impl FormData {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            files: Vec::new(),
        }
    }
}

/// Media types are case-insensitive, so `Multipart/Form-Data` counts too.
fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/"))
}

fn malformed(err: actix_multipart::MultipartError) -> AppError {
    AppError::bad_request(format!("malformed multipart body: {err}"))
}
