//! Request routing for the credential API.
//!
//! | Method     | Path             | Input                         | Response            |
//! |------------|------------------|-------------------------------|---------------------|
//! | `POST`     | `/wifi`          | JSON `{ssid, enc, password}`  | `OK`                |
//! | `GET`      | `/wifi?ssid=..`  | query field `ssid`            | JSON record         |
//! | `PUT`      | `/wifi`          | form fields `ssid`, `password`| `OK`                |
//! | `GET`      | `/qr/<ssid>.png` | percent-encoded path segment  | PNG image           |
//!
//! Routing is a pure function of method, URL and body.
//! [`super::HttpServer`] only moves bytes.

use super::RequestError;
use crate::provisioning::render_qr_png;
use crate::store::CredentialStore;
use crate::wifi::CredentialRecord;
use log::{debug, warn};
use percent_encoding::percent_decode_str;
use tiny_http::Method;

/// Acknowledgement body for successful writes.
pub const ACK: &[u8] = b"OK";

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_PNG: &str = "image/png";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

const QR_PREFIX: &str = "/qr/";
const QR_SUFFIX: &str = ".png";

/// A response ready to be written to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
    /// Value of the `Allow` header, for 405 responses.
    pub allow: Option<&'static str>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Reply {
    fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            allow: None,
            body,
        }
    }

    fn ack() -> Self {
        Self::ok(CONTENT_TYPE_TEXT, ACK.to_vec())
    }

    fn text(status: u16, text: &str) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            allow: None,
            body: text.as_bytes().to_vec(),
        }
    }

    fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    fn method_not_allowed(allow: &'static str) -> Self {
        Self {
            allow: Some(allow),
            ..Self::text(405, "Method Not Allowed")
        }
    }
}

impl From<RequestError> for Reply {
    fn from(err: RequestError) -> Self {
        let status = err.status_code();
        match status {
            404 => Self::not_found(),
            _ => Self::text(status, "Bad Request"),
        }
    }
}

/// Dispatch a request to its handler.
pub fn route(store: &CredentialStore, method: &Method, url: &str, body: &[u8]) -> Reply {
    let (path, query) = split_url(url);

    let result = match (method, path) {
        (Method::Post, "/wifi") => create(store, body),
        (Method::Get | Method::Head, "/wifi") => lookup(store, query),
        (Method::Put, "/wifi") => update_password(store, query, body),
        (_, "/wifi") => return Reply::method_not_allowed("GET, POST, PUT"),
        (Method::Get | Method::Head, _) if is_qr_path(path) => qr_image(store, path),
        (_, _) if is_qr_path(path) => return Reply::method_not_allowed("GET"),
        _ => return Reply::not_found(),
    };

    result.unwrap_or_else(|err| {
        match &err {
            RequestError::NotFound(_) => debug!("{} {}: {}", method, path, err),
            _ => warn!("{} {}: {}", method, path, err),
        }
        Reply::from(err)
    })
}

/// `POST /wifi`: create or replace a record from a JSON body.
fn create(store: &CredentialStore, body: &[u8]) -> Result<Reply, RequestError> {
    let record: CredentialRecord = serde_json::from_slice(body)?;
    store.upsert(record);
    Ok(Reply::ack())
}

/// `GET /wifi?ssid=..`: return the record as JSON.
fn lookup(store: &CredentialStore, query: &str) -> Result<Reply, RequestError> {
    let ssid = field(query.as_bytes(), "ssid").unwrap_or_default();
    let record = store.get(&ssid)?;
    let json = serde_json::to_vec(&record)?;
    Ok(Reply::ok(CONTENT_TYPE_JSON, json))
}

/// `PUT /wifi`: replace the password of an existing record.
fn update_password(
    store: &CredentialStore,
    query: &str,
    body: &[u8],
) -> Result<Reply, RequestError> {
    let ssid = form_value(query, body, "ssid")
        .ok_or_else(|| RequestError::Malformed("missing ssid field".to_string()))?;
    let password = form_value(query, body, "password").unwrap_or_default();
    store.update_password(&ssid, &password)?;
    Ok(Reply::ack())
}

/// `GET /qr/<ssid>.png`: render the record as a QR code.
fn qr_image(store: &CredentialStore, path: &str) -> Result<Reply, RequestError> {
    let ssid = qr_ssid(path)?;
    // The record is copied out, so the store lock is not held while rendering.
    let record = store.get(&ssid)?;
    let png = render_qr_png(&record)?;
    Ok(Reply::ok(CONTENT_TYPE_PNG, png))
}

fn split_url(url: &str) -> (&str, &str) {
    url.split_once('?').unwrap_or((url, ""))
}

fn is_qr_path(path: &str) -> bool {
    path.len() >= QR_PREFIX.len() + QR_SUFFIX.len()
        && path.starts_with(QR_PREFIX)
        && path.ends_with(QR_SUFFIX)
}

/// Extract and percent-decode the SSID from `/qr/<ssid>.png`.
fn qr_ssid(path: &str) -> Result<String, RequestError> {
    let encoded = &path[QR_PREFIX.len()..path.len() - QR_SUFFIX.len()];
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|ssid| ssid.into_owned())
        .map_err(|_| RequestError::Malformed("SSID is not valid UTF-8".to_string()))
}

/// First value of `key` in urlencoded input.
fn field(input: &[u8], key: &str) -> Option<String> {
    form_urlencoded::parse(input)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Look up a form field, preferring the urlencoded body over the query string.
fn form_value(query: &str, body: &[u8], key: &str) -> Option<String> {
    field(body, key).or_else(|| field(query.as_bytes(), key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wifi::EncryptionMode;

    fn post(store: &CredentialStore, json: &str) -> Reply {
        route(store, &Method::Post, "/wifi", json.as_bytes())
    }

    fn get(store: &CredentialStore, url: &str) -> Reply {
        route(store, &Method::Get, url, b"")
    }

    fn seeded() -> CredentialStore {
        let store = CredentialStore::new();
        store.upsert(CredentialRecord::new("Home", EncryptionMode::Wpa, "secret"));
        store
    }

    // ==================== POST /wifi ====================

    #[test]
    fn test_post_creates_record() {
        let store = CredentialStore::new();
        let reply = post(&store, r#"{"ssid":"Home","enc":"WPA2","password":"secret"}"#);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, ACK);

        let record = store.get("Home").unwrap();
        assert_eq!(record.encryption, EncryptionMode::Wpa);
        assert_eq!(record.password, "secret");
    }

    #[test]
    fn test_post_invalid_encryption() {
        let store = CredentialStore::new();
        let reply = post(&store, r#"{"ssid":"Home","enc":"WPA3","password":"x"}"#);
        assert_eq!(reply.status, 400);
        assert!(store.is_empty());
    }

    #[test]
    fn test_post_malformed_json() {
        let store = CredentialStore::new();
        assert_eq!(post(&store, "{not json").status, 400);
        assert_eq!(post(&store, "").status, 400);
        assert!(store.is_empty());
    }

    // ==================== GET /wifi ====================

    #[test]
    fn test_get_record() {
        let store = seeded();
        let reply = get(&store, "/wifi?ssid=Home");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, CONTENT_TYPE_JSON);

        let record: CredentialRecord = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(record, CredentialRecord::new("Home", EncryptionMode::Wpa, "secret"));
    }

    #[test]
    fn test_get_decodes_query() {
        let store = CredentialStore::new();
        store.upsert(CredentialRecord::open("My Net"));
        assert_eq!(get(&store, "/wifi?ssid=My+Net").status, 200);
        assert_eq!(get(&store, "/wifi?ssid=My%20Net").status, 200);
    }

    #[test]
    fn test_get_ignores_body() {
        let store = seeded();
        let reply = route(&store, &Method::Get, "/wifi", b"ssid=Home");
        assert_eq!(reply.status, 404);
        assert_eq!(route(&store, &Method::Get, "/wifi?ssid=Home", b"ssid=Other").status, 200);
    }

    #[test]
    fn test_get_unknown() {
        let store = seeded();
        assert_eq!(get(&store, "/wifi?ssid=Other").status, 404);
        assert_eq!(get(&store, "/wifi").status, 404);
    }

    #[test]
    fn test_post_then_get_round_trip() {
        let store = CredentialStore::new();
        post(&store, r#"{"ssid":"Lab","enc":"WEP","password":"12345"}"#);
        let reply = get(&store, "/wifi?ssid=Lab");
        assert_eq!(
            reply.body,
            br#"{"ssid":"Lab","enc":"WEP","password":"12345"}"#.to_vec()
        );
    }

    // ==================== PUT /wifi ====================

    #[test]
    fn test_put_updates_password() {
        let store = seeded();
        let reply = route(
            &store,
            &Method::Put,
            "/wifi",
            b"ssid=Home&password=new%20pass",
        );
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, ACK);

        let record = store.get("Home").unwrap();
        assert_eq!(record.password, "new pass");
        assert_eq!(record.encryption, EncryptionMode::Wpa);
    }

    #[test]
    fn test_put_query_fallback() {
        let store = seeded();
        let reply = route(&store, &Method::Put, "/wifi?ssid=Home&password=q", b"");
        assert_eq!(reply.status, 200);
        assert_eq!(store.get("Home").unwrap().password, "q");
    }

    #[test]
    fn test_put_unknown_ssid() {
        let store = seeded();
        let reply = route(&store, &Method::Put, "/wifi", b"ssid=Other&password=x");
        assert_eq!(reply.status, 404);
        assert!(store.get("Other").is_err());
    }

    #[test]
    fn test_put_missing_ssid() {
        let store = seeded();
        let reply = route(&store, &Method::Put, "/wifi", b"password=x");
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn test_wifi_method_not_allowed() {
        let store = seeded();
        let reply = route(&store, &Method::Delete, "/wifi", b"");
        assert_eq!(reply.status, 405);
        assert_eq!(reply.allow, Some("GET, POST, PUT"));
        assert!(store.get("Home").is_ok());
    }

    // ==================== GET /qr/<ssid>.png ====================

    #[test]
    fn test_qr_image() {
        let store = seeded();
        let reply = get(&store, "/qr/Home.png");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, CONTENT_TYPE_PNG);
        assert_eq!(&reply.body[1..4], b"PNG");
    }

    #[test]
    fn test_qr_percent_encoded_ssid() {
        let store = CredentialStore::new();
        store.upsert(CredentialRecord::open("My Net"));
        assert_eq!(get(&store, "/qr/My%20Net.png").status, 200);
    }

    #[test]
    fn test_qr_unknown_ssid() {
        let store = seeded();
        assert_eq!(get(&store, "/qr/Other.png").status, 404);
    }

    #[test]
    fn test_qr_bad_path() {
        let store = seeded();
        assert_eq!(get(&store, "/qr/Home.jpg").status, 404);
        assert_eq!(get(&store, "/qr/Home").status, 404);
        assert_eq!(get(&store, "/qr/.png").status, 404);
    }

    #[test]
    fn test_qr_oversized_record() {
        let store = CredentialStore::new();
        store.upsert(CredentialRecord::new("Big", EncryptionMode::Wpa, "p".repeat(4000)));
        assert_eq!(get(&store, "/qr/Big.png").status, 400);
    }

    #[test]
    fn test_qr_invalid_utf8() {
        let store = seeded();
        assert_eq!(get(&store, "/qr/%FF.png").status, 400);
    }

    #[test]
    fn test_unknown_path() {
        let store = seeded();
        assert_eq!(get(&store, "/").status, 404);
        assert_eq!(get(&store, "/wifi/Home").status, 404);
    }

    // ==================== Helpers ====================

    #[test]
    fn test_split_url() {
        assert_eq!(split_url("/wifi?ssid=a"), ("/wifi", "ssid=a"));
        assert_eq!(split_url("/wifi"), ("/wifi", ""));
    }

    #[test]
    fn test_form_value_prefers_body() {
        assert_eq!(
            form_value("ssid=query", b"ssid=body", "ssid"),
            Some("body".to_string())
        );
        assert_eq!(form_value("ssid=query", b"", "ssid"), Some("query".to_string()));
        assert_eq!(form_value("", b"", "ssid"), None);
    }
}
