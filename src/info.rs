//! Flat request metadata attached to every log record.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Serialize;

use crate::request::RequestHead;

/// A header value as it appears in [`RequestInfo`]: one value, or every
/// value when the header was sent more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderField {
    One(String),
    Many(Vec<String>),
}

impl HeaderField {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Self::One(v) => std::slice::from_ref(v),
            Self::Many(vs) => vs.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    fn push(&mut self, value: String) {
        match self {
            Self::One(first) => {
                let first = std::mem::take(first);
                *self = Self::Many(vec![first, value]);
            }
            Self::Many(vs) => vs.push(value),
        }
    }
}

/// Normalised metadata of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    /// Path and query, as received.
    pub url: String,
    pub method: String,
    /// Lowercase header name to value(s).
    pub headers: BTreeMap<String, HeaderField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<SocketAddr>,
}

impl RequestInfo {
    /// Extracts the metadata of `head`.
    ///
    /// Header values that are not visible ASCII are dropped; they could not
    /// match a classification rule and would not survive a JSON log line
    /// intact anyway.
    pub fn extract(head: &RequestHead) -> Self {
        let url = head
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| head.path().to_owned());

        let mut headers: BTreeMap<String, HeaderField> = BTreeMap::new();
        for (name, value) in head.headers() {
            let Ok(value) = value.to_str() else { continue };
            match headers.get_mut(name.as_str()) {
                Some(field) => field.push(value.to_owned()),
                None => {
                    headers.insert(name.as_str().to_owned(), HeaderField::One(value.to_owned()));
                }
            }
        }

        Self {
            url,
            method: head.method().as_str().to_owned(),
            headers,
            remote_addr: head.remote_addr(),
        }
    }

    /// All values of header `name` (expected lowercase).
    pub fn header_values(&self, name: &str) -> impl Iterator<Item = &str> {
        self.headers.get(name).into_iter().flat_map(HeaderField::values)
    }
}
