//! Trilium ETAPI client.

use super::{container_body, NoteRepository};
use crate::error::{ImportError, Result};
use crate::types::{Label, NoteId};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for a Trilium server's ETAPI.
pub struct EtapiClient {
    base_url: String,
    token: String,
    client: Client,
    /// Known attributes per note, filled from lookups and our own writes.
    attributes: HashMap<NoteId, Vec<Attribute>>,
}

// ── ETAPI types ─────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EtapiNote {
    note_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    parent_note_ids: Vec<String>,
    #[serde(default)]
    attributes: Vec<Attribute>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<EtapiNote>,
}

#[derive(Debug, Deserialize)]
struct CreateNoteResponse {
    note: EtapiNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct Attribute {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteRequest<'a> {
    parent_note_id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    note_type: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAttributeRequest<'a> {
    note_id: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    name: &'a str,
    value: &'a str,
    is_inheritable: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Quote a string for use inside a Trilium search expression.
fn search_literal(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

// ── Client impl ─────────────────────────────────────

impl EtapiClient {
    pub fn new(server_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: format!("{}/etapi", server_url.trim_end_matches('/')),
            token: token.to_string(),
            client,
            attributes: HashMap::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`ImportError::Api`].
    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        Err(ImportError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn search(&self, query: &str, parent: Option<&NoteId>) -> Result<Vec<EtapiNote>> {
        let mut request = self
            .client
            .get(self.url("notes"))
            .header("Authorization", &self.token)
            .query(&[("search", query)]);
        if let Some(parent) = parent {
            request =
                request.query(&[("ancestorNoteId", parent.as_str()), ("ancestorDepth", "eq1")]);
        }
        let response: SearchResponse = Self::check(request.send()?)?.json()?;
        Ok(response.results)
    }

    fn lookup_child(&mut self, parent: &NoteId, title: &str) -> Result<Option<NoteId>> {
        let query = format!("note.title = {}", search_literal(title));
        let found = self.search(&query, Some(parent))?.into_iter().find(|note| {
            note.title == title
                && (note.parent_note_ids.is_empty()
                    || note.parent_note_ids.iter().any(|p| p == parent.as_str()))
        });

        Ok(found.map(|note| {
            let id = NoteId(note.note_id);
            debug!(note = %id, title, "found existing note");
            self.attributes.insert(id.clone(), note.attributes);
            id
        }))
    }

    fn create_note(&mut self, parent: &NoteId, title: &str, content: &str) -> Result<NoteId> {
        let request = CreateNoteRequest {
            parent_note_id: parent.as_str(),
            title,
            note_type: "text",
            content,
        };
        let response = self
            .client
            .post(self.url("create-note"))
            .header("Authorization", &self.token)
            .json(&request)
            .send()?;
        let created: CreateNoteResponse = Self::check(response)?.json()?;
        let id = NoteId(created.note.note_id);
        info!(note = %id, title, "created note");
        self.attributes.insert(id.clone(), Vec::new());
        Ok(id)
    }

    fn known_attributes(&mut self, note: &NoteId) -> Result<&mut Vec<Attribute>> {
        if !self.attributes.contains_key(note) {
            let response = self
                .client
                .get(self.url(&format!("notes/{}", note)))
                .header("Authorization", &self.token)
                .send()?;
            let fetched: EtapiNote = Self::check(response)?.json()?;
            self.attributes.insert(note.clone(), fetched.attributes);
        }
        Ok(self.attributes.entry(note.clone()).or_default())
    }

    fn add_attribute(&mut self, note: &NoteId, kind: &str, name: &str, value: &str) -> Result<()> {
        let attribute = Attribute {
            kind: kind.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        };
        if self.known_attributes(note)?.contains(&attribute) {
            return Ok(());
        }

        let request = CreateAttributeRequest {
            note_id: note.as_str(),
            kind,
            name,
            value,
            is_inheritable: false,
        };
        let response = self
            .client
            .post(self.url("attributes"))
            .header("Authorization", &self.token)
            .json(&request)
            .send()?;
        Self::check(response)?;
        self.known_attributes(note)?.push(attribute);
        Ok(())
    }
}

impl NoteRepository for EtapiClient {
    fn find_or_create_container(&mut self, parent: &NoteId, name: &str) -> Result<NoteId> {
        match self.lookup_child(parent, name)? {
            Some(id) => Ok(id),
            None => self.create_note(parent, name, &container_body(name)),
        }
    }

    fn find_or_create_document(
        &mut self,
        parent: &NoteId,
        name: &str,
        body: &str,
        labels: &[Label],
    ) -> Result<NoteId> {
        let id = match self.lookup_child(parent, name)? {
            Some(id) => {
                self.set_body(&id, body)?;
                id
            }
            None => self.create_note(parent, name, body)?,
        };
        for label in labels {
            self.add_label(&id, label)?;
        }
        Ok(id)
    }

    fn find_child(&mut self, parent: &NoteId, name: &str) -> Result<Option<NoteId>> {
        self.lookup_child(parent, name)
    }

    fn find_by_name(&mut self, name: &str) -> Result<Option<NoteId>> {
        let query = format!("note.title = {}", search_literal(name));
        Ok(self
            .search(&query, None)?
            .into_iter()
            .find(|note| note.title == name)
            .map(|note| NoteId(note.note_id)))
    }

    fn set_body(&mut self, note: &NoteId, body: &str) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("notes/{}/content", note)))
            .header("Authorization", &self.token)
            .header("Content-Type", "text/plain")
            .body(body.to_string())
            .send()?;
        Self::check(response)?;
        debug!(note = %note, "updated content");
        Ok(())
    }

    fn add_label(&mut self, note: &NoteId, label: &Label) -> Result<()> {
        self.add_attribute(note, "label", &label.name, label.value_or_empty())
    }

    fn add_relation(&mut self, source: &NoteId, target: &NoteId, relation: &str) -> Result<()> {
        self.add_attribute(source, "relation", relation, target.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn root() -> NoteId {
        NoteId::new("root")
    }

    #[test]
    fn test_search_literal_escapes_quotes() {
        assert_eq!(search_literal("it's"), r"'it\'s'");
        assert_eq!(search_literal(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn test_creates_container_when_missing() {
        let mut server = Server::new();
        let search = server
            .mock("GET", "/etapi/notes")
            .match_header("authorization", "secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search".into(), "note.title = 'Orphans'".into()),
                Matcher::UrlEncoded("ancestorNoteId".into(), "root".into()),
                Matcher::UrlEncoded("ancestorDepth".into(), "eq1".into()),
            ]))
            .with_body(r#"{"results":[]}"#)
            .create();
        let create = server
            .mock("POST", "/etapi/create-note")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "parentNoteId": "root",
                "title": "Orphans",
                "type": "text"
            })))
            .with_status(201)
            .with_body(r#"{"note":{"noteId":"abc123","title":"Orphans"},"branch":{}}"#)
            .create();

        let mut client = EtapiClient::new(&server.url(), "secret").unwrap();
        let id = client.find_or_create_container(&root(), "Orphans").unwrap();

        assert_eq!(id, NoteId::new("abc123"));
        search.assert();
        create.assert();
    }

    #[test]
    fn test_existing_child_is_reused() {
        let mut server = Server::new();
        server
            .mock("GET", "/etapi/notes")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"results":[
                    {"noteId":"other","title":"Folder","parentNoteIds":["elsewhere"]},
                    {"noteId":"f1","title":"Folder","parentNoteIds":["root"]}
                ]}"#,
            )
            .create();
        let create = server.mock("POST", "/etapi/create-note").expect(0).create();

        let mut client = EtapiClient::new(&server.url(), "t").unwrap();
        let id = client.find_or_create_container(&root(), "Folder").unwrap();

        assert_eq!(id, NoteId::new("f1"));
        create.assert();
    }

    #[test]
    fn test_existing_label_not_recreated() {
        let mut server = Server::new();
        server
            .mock("GET", "/etapi/notes/n1")
            .with_body(
                r#"{"noteId":"n1","title":"x","attributes":[
                    {"type":"label","name":"readOnly","value":""}
                ]}"#,
            )
            .expect(1)
            .create();
        let post = server
            .mock("POST", "/etapi/attributes")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "noteId": "n1",
                "type": "label",
                "name": "theme",
                "value": "justice"
            })))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create();

        let mut client = EtapiClient::new(&server.url(), "t").unwrap();
        let note = NoteId::new("n1");
        client.add_label(&note, &Label::flag("readOnly")).unwrap();
        client.add_label(&note, &Label::new("theme", "justice")).unwrap();
        client.add_label(&note, &Label::new("theme", "justice")).unwrap();

        post.assert();
    }

    #[test]
    fn test_relation_posts_target_id() {
        let mut server = Server::new();
        server
            .mock("GET", "/etapi/notes/src")
            .with_body(r#"{"noteId":"src","title":"a","attributes":[]}"#)
            .create();
        let post = server
            .mock("POST", "/etapi/attributes")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "noteId": "src",
                "type": "relation",
                "name": "references",
                "value": "dst",
                "isInheritable": false
            })))
            .with_status(201)
            .with_body("{}")
            .create();

        let mut client = EtapiClient::new(&server.url(), "t").unwrap();
        client
            .add_relation(&NoteId::new("src"), &NoteId::new("dst"), "references")
            .unwrap();
        post.assert();
    }

    #[test]
    fn test_set_body_puts_plain_text() {
        let mut server = Server::new();
        let put = server
            .mock("PUT", "/etapi/notes/n1/content")
            .match_header("content-type", "text/plain")
            .match_body("<p>hello</p>")
            .with_status(204)
            .create();

        let mut client = EtapiClient::new(&server.url(), "t").unwrap();
        client.set_body(&NoteId::new("n1"), "<p>hello</p>").unwrap();
        put.assert();
    }

    #[test]
    fn test_error_body_surfaces_message() {
        let mut server = Server::new();
        server
            .mock("GET", "/etapi/notes")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"status":401,"code":"NOT_AUTHENTICATED","message":"Not authenticated"}"#)
            .create();

        let mut client = EtapiClient::new(&server.url(), "bad").unwrap();
        let err = client.find_by_name("x").unwrap_err();
        match err {
            ImportError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Not authenticated");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
