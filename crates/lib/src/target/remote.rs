//! Remote adapter: the target's authenticated JSON API.
//!
//! Each category maps to a resource path. Listing is `GET {resource}.json`,
//! creation is `POST {resource}.json` with the fields wrapped under the
//! singular key, and updates are `PUT {resource}/{id}.json`. The API key goes
//! out in the `X-Redmine-API-Key` header on every request.

use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use serde_json::Value;
use tracing::{debug, warn};

use super::TargetAdapter;
use super::types::{ActualRecord, AdapterError, Operation, RecordId};
use crate::config::RemoteConfig;
use crate::consts::API_KEY_HEADER;
use crate::desired::{Category, Fields};

/// How a category is exposed by the API.
struct Endpoint {
  resource: &'static str,
  writable: bool,
  /// Fields the listing reports.
  observed: &'static [&'static str],
}

const ENUMERATION_FIELDS: &[&str] = &["name", "is_default", "active"];

fn endpoint(category: Category) -> Option<Endpoint> {
  match category {
    Category::Trackers => Some(Endpoint {
      resource: "trackers",
      writable: true,
      observed: &["name", "description"],
    }),
    Category::IssueStatuses => Some(Endpoint {
      resource: "issue_statuses",
      writable: false,
      observed: &["name", "is_closed"],
    }),
    Category::IssuePriorities => Some(Endpoint {
      resource: "enumerations/issue_priorities",
      writable: false,
      observed: ENUMERATION_FIELDS,
    }),
    Category::TimeEntryActivities => Some(Endpoint {
      resource: "enumerations/time_entry_activities",
      writable: false,
      observed: ENUMERATION_FIELDS,
    }),
    Category::DocumentCategories => None,
  }
}

/// Target adapter over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteAdapter {
  client: Client,
  config: RemoteConfig,
}

impl RemoteAdapter {
  pub fn new(config: RemoteConfig) -> Result<Self, AdapterError> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| AdapterError::connection(format!("failed to build HTTP client: {}", e)))?;
    Ok(Self { client, config })
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let url = format!("{}/{}", self.config.base_url, path);
    self
      .client
      .request(method, url)
      .header(API_KEY_HEADER, &self.config.api_key)
      .header(header::CONTENT_TYPE, "application/json")
      .header(header::ACCEPT, "application/json")
  }

  async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, String), AdapterError> {
    let response = builder.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    debug!(url = %self.config.base_url, status = status.as_u16(), "target responded");
    Ok((status, body))
  }

  fn writable_endpoint(category: Category, operation: Operation) -> Result<Endpoint, AdapterError> {
    endpoint(category)
      .filter(|e| e.writable)
      .ok_or(AdapterError::NotSupported { category, operation })
  }

  /// Fields for a create body, with the adapter-required defaults added.
  fn creation_fields(&self, category: Category, fields: &Fields) -> Fields {
    let mut fields = fields.clone();
    if category == Category::Trackers && !fields.contains_key("default_status_id") {
      fields.insert(
        "default_status_id".to_string(),
        Value::from(self.config.tracker_default_status_id),
      );
    }
    fields
  }
}

impl TargetAdapter for RemoteAdapter {
  fn describe(&self) -> String {
    format!("remote API {}", self.config.base_url)
  }

  fn observes(&self, category: Category, field: &str) -> bool {
    endpoint(category).is_none_or(|e| e.observed.contains(&field))
  }

  fn supports(&self, category: Category, operation: Operation) -> bool {
    endpoint(category).is_some_and(|e| operation == Operation::List || e.writable)
  }

  async fn list(&self, category: Category) -> Result<Vec<ActualRecord>, AdapterError> {
    let Some(endpoint) = endpoint(category) else {
      return Err(AdapterError::NotSupported {
        category,
        operation: Operation::List,
      });
    };

    let (status, body) = self
      .send(self.request(Method::GET, &format!("{}.json", endpoint.resource)))
      .await?;

    if status == StatusCode::NOT_FOUND {
      warn!(%category, "target does not expose this category");
      return Err(AdapterError::NotSupported {
        category,
        operation: Operation::List,
      });
    }
    if !status.is_success() {
      return Err(status_error(status, body));
    }

    let parsed: Value = serde_json::from_str(&body).map_err(|e| AdapterError::Decode {
      message: e.to_string(),
    })?;
    let items = parsed
      .get(category.key())
      .and_then(Value::as_array)
      .ok_or_else(|| AdapterError::Decode {
        message: format!("response has no '{}' array", category.key()),
      })?;

    items.iter().map(|item| to_record(item, None)).collect()
  }

  async fn create(&mut self, category: Category, fields: &Fields) -> Result<ActualRecord, AdapterError> {
    let endpoint = Self::writable_endpoint(category, Operation::Create)?;
    let fields = self.creation_fields(category, fields);
    let body = wrap(category, &fields);

    let (status, response) = self
      .send(
        self
          .request(Method::POST, &format!("{}.json", endpoint.resource))
          .json(&body),
      )
      .await?;

    // 201 is usual; any 2xx means the record exists
    if !status.is_success() {
      return Err(status_error(status, response));
    }

    let parsed: Value = serde_json::from_str(&response).map_err(|e| AdapterError::Decode {
      message: e.to_string(),
    })?;
    let created = parsed.get(category.singular_key()).ok_or_else(|| AdapterError::Decode {
      message: format!("response has no '{}' object", category.singular_key()),
    })?;

    to_record(created, Some(&fields))
  }

  async fn update(&mut self, category: Category, id: RecordId, fields: &Fields) -> Result<ActualRecord, AdapterError> {
    let endpoint = Self::writable_endpoint(category, Operation::Update)?;
    let body = wrap(category, fields);

    let (status, response) = self
      .send(
        self
          .request(Method::PUT, &format!("{}/{}.json", endpoint.resource, id))
          .json(&body),
      )
      .await?;

    match status {
      s if s.is_success() => {}
      StatusCode::NOT_FOUND => return Err(AdapterError::NotFound { category, id }),
      _ => return Err(status_error(status, response)),
    }

    // Most servers answer 204; an echoed object wins over what was sent.
    let echoed = serde_json::from_str::<Value>(&response)
      .ok()
      .and_then(|v| v.get(category.singular_key()).and_then(Value::as_object).cloned());

    let mut merged = fields.clone();
    if let Some(echoed) = echoed {
      merged.extend(echoed.into_iter().filter(|(k, _)| k != "id"));
    }
    Ok(ActualRecord::new(id, merged))
  }
}

/// `{ "tracker": { ...fields } }`
fn wrap(category: Category, fields: &Fields) -> Value {
  let mut body = Fields::new();
  body.insert(category.singular_key().to_string(), Value::Object(fields.clone()));
  Value::Object(body)
}

/// Build a record from a JSON object carrying an `id`.
///
/// `sent` fills in whatever the server did not echo back.
fn to_record(item: &Value, sent: Option<&Fields>) -> Result<ActualRecord, AdapterError> {
  let object = item.as_object().ok_or_else(|| AdapterError::Decode {
    message: "record is not an object".to_string(),
  })?;
  let id = object.get("id").and_then(Value::as_u64).ok_or_else(|| AdapterError::Decode {
    message: "record has no numeric id".to_string(),
  })?;

  let mut fields = sent.cloned().unwrap_or_default();
  fields.extend(
    object
      .iter()
      .filter(|(k, _)| k.as_str() != "id")
      .map(|(k, v)| (k.clone(), v.clone())),
  );
  Ok(ActualRecord::new(RecordId(id), fields))
}

fn transport_error(e: reqwest::Error) -> AdapterError {
  if e.is_timeout() {
    AdapterError::connection(format!("request timed out: {}", e))
  } else {
    AdapterError::connection(e.to_string())
  }
}

fn status_error(status: StatusCode, body: String) -> AdapterError {
  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdapterError::Auth {
      message: format!("HTTP {}", status.as_u16()),
    },
    StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AdapterError::validation(error_messages(&body)),
    _ => AdapterError::UnexpectedStatus {
      status: status.as_u16(),
      body,
    },
  }
}

/// Messages from an `{"errors": [...]}` body, or the raw body.
fn error_messages(body: &str) -> Vec<String> {
  let listed = serde_json::from_str::<Value>(body).ok().and_then(|v| {
    v.get("errors").and_then(Value::as_array).map(|errors| {
      errors
        .iter()
        .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
        .collect::<Vec<_>>()
    })
  });

  match listed {
    Some(messages) if !messages.is_empty() => messages,
    _ if body.trim().is_empty() => vec!["request rejected".to_string()],
    _ => vec![body.trim().to_string()],
  }
}
