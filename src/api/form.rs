//! Buffers a `multipart/form-data` body into text fields and files.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl FormData {
    /// Reads every part. Files over `max_file_bytes` are rejected; file
    /// inputs left empty by the browser are dropped.
    pub async fn read(mut multipart: Multipart, max_file_bytes: usize) -> Result<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;

                    if filename.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    if bytes.len() > max_file_bytes {
                        return Err(AppError::PayloadTooLarge(format!(
                            "{} is {} bytes, over the {} byte limit",
                            filename,
                            bytes.len(),
                            max_file_bytes
                        )));
                    }

                    form.files.insert(
                        name,
                        Upload {
                            filename,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text value; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Raw value, whitespace kept. For message bodies.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn flag(&self, name: &str) -> bool {
        self.text(name)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1" || v == "on")
    }

    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name)
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{body, content_type, Part};
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    async fn read(parts: &[Part<'_>], max_file_bytes: usize) -> Result<FormData> {
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, content_type())
            .body(Body::from(body(parts)))
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await.unwrap();
        FormData::read(multipart, max_file_bytes).await
    }

    #[tokio::test]
    async fn splits_fields_and_files() {
        let mut form = read(
            &[
                Part::Text("subject", "  Hi  "),
                Part::Text("body", "Hello [Name]\n"),
                Part::Text("useOwnAccount", "true"),
                Part::File {
                    name: "csvFile",
                    filename: "list.csv",
                    content_type: "text/csv",
                    bytes: b"address\nann@x.com\n",
                },
            ],
            1024,
        )
        .await
        .unwrap();

        assert_eq!(form.text("subject"), Some("Hi"));
        assert_eq!(form.raw("body"), Some("Hello [Name]\n"));
        assert!(form.flag("useOwnAccount"));
        assert!(!form.flag("missing"));
        assert_eq!(form.text("missing"), None);

        let upload = form.take_file("csvFile").unwrap();
        assert_eq!(upload.filename, "list.csv");
        assert_eq!(upload.content_type, "text/csv");
        assert_eq!(&upload.bytes[..], b"address\nann@x.com\n");
        assert!(form.file("csvFile").is_none());
    }

    #[tokio::test]
    async fn blank_file_inputs_are_ignored() {
        let form = read(
            &[Part::File {
                name: "attachment0",
                filename: "",
                content_type: "application/octet-stream",
                bytes: b"",
            }],
            1024,
        )
        .await
        .unwrap();

        assert!(form.file("attachment0").is_none());
    }

    #[tokio::test]
    async fn oversized_files_are_rejected() {
        let err = read(
            &[Part::File {
                name: "attachment0",
                filename: "big.bin",
                content_type: "application/octet-stream",
                bytes: &[0u8; 64],
            }],
            32,
        )
        .await
        .unwrap_err();

        match err {
            AppError::PayloadTooLarge(msg) => {
                assert_eq!(msg, "big.bin is 64 bytes, over the 32 byte limit");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
