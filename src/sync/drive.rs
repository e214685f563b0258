//! Google Drive v3 `CloudStorage` over the REST API.
//!
//! Behind the `google-drive` feature flag.  Objects live in the
//! `appDataFolder` space, which only this application can see.  The
//! OAuth flow is not handled here: the caller supplies a bearer token.

use serde::Deserialize;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::cloud::{CloudObject, CloudStorage};
use crate::errors::{PassordrError, Result};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<CloudObject>,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
}

fn network(e: impl std::fmt::Display) -> PassordrError {
    PassordrError::Network(e.to_string())
}

pub struct DriveStorage {
    token: Zeroizing<String>,
}

impl DriveStorage {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.as_str())
    }

    fn user_agent() -> String {
        format!("passordr/{}", env!("CARGO_PKG_VERSION"))
    }
}

/// Build a `multipart/related` body: JSON metadata part, then the file.
fn multipart_body(boundary: &str, metadata: &str, body: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: application/json\r\n\r\n\
         {body}\r\n\
         --{boundary}--\r\n"
    )
}

impl CloudStorage for DriveStorage {
    fn upload(&self, name: &str, description: &str, body: &str) -> Result<String> {
        let metadata = serde_json::json!({
            "name": name,
            "description": description,
            "parents": ["appDataFolder"],
            "mimeType": "application/json",
        })
        .to_string();

        let boundary = format!("passordr-{}", Uuid::new_v4().simple());
        let payload = multipart_body(&boundary, &metadata, body);

        let mut resp = ureq::post(&format!("{UPLOAD_URL}?uploadType=multipart&fields=id"))
            .header("Authorization", &self.bearer())
            .header("User-Agent", &Self::user_agent())
            .header(
                "Content-Type",
                &format!("multipart/related; boundary={boundary}"),
            )
            .send(payload)
            .map_err(network)?;

        let created: CreatedFile = resp.body_mut().read_json().map_err(network)?;
        Ok(created.id)
    }

    fn download(&self, id: &str) -> Result<Vec<u8>> {
        let mut resp = ureq::get(&format!("{FILES_URL}/{id}?alt=media"))
            .header("Authorization", &self.bearer())
            .header("User-Agent", &Self::user_agent())
            .call()
            .map_err(network)?;

        resp.body_mut().read_to_vec().map_err(network)
    }

    fn list(&self) -> Result<Vec<CloudObject>> {
        let mut resp = ureq::get(&format!(
            "{FILES_URL}?spaces=appDataFolder&fields=files(id,name,description,modifiedTime)"
        ))
        .header("Authorization", &self.bearer())
        .header("User-Agent", &Self::user_agent())
        .call()
        .map_err(network)?;

        let list: FileList = resp.body_mut().read_json().map_err(network)?;
        Ok(list.files)
    }

    fn delete(&self, id: &str) -> Result<()> {
        ureq::delete(&format!("{FILES_URL}/{id}"))
            .header("Authorization", &self.bearer())
            .header("User-Agent", &Self::user_agent())
            .call()
            .map_err(network)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipart_body_has_both_parts() {
        let body = multipart_body("b", r#"{"name":"x"}"#, r#"{"password":false}"#);
        assert!(body.starts_with("--b\r\n"));
        assert!(body.contains(r#"{"name":"x"}"#));
        assert!(body.contains(r#"{"password":false}"#));
        assert!(body.ends_with("--b--\r\n"));
    }
}
