use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CLIENT_TYPES: &[&str] = &["individual", "organization"];

/// A client of an advocate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Client {
    pub id: Uuid,
    pub advocate_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub client_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: String,
    pub advocate_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub client_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            id: c.id.to_string(),
            advocate_id: c.advocate_id.to_string(),
            name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            client_type: c.client_type,
            notes: c.notes,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct CreateClientRequest {
    pub advocate_id: Option<Uuid>,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))
    )]
    pub name: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Email must be a valid address"))
    )]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub client_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct UpdateClientRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))
    )]
    pub name: Option<String>,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Email must be a valid address"))
    )]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub client_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub client_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
