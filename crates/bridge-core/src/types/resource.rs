//! Resource records.
//!
//! A resource belongs to exactly one namespace and is identified there by its
//! `name`. The registry assigns the opaque `id` on creation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Registry-assigned resource identifier
///
/// The registry hands out integers today, but the console treats the id as
/// opaque and accepts either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{}", n),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Number(id)
    }
}

/// A named record stored in a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub arn: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
}

impl Resource {
    /// Build a resource from its create payload and the id the registry assigned
    pub fn from_fields(id: impl Into<ResourceId>, fields: ResourceFields) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            arn: fields.arn,
            resource_type: fields.resource_type,
            value: fields.value,
        }
    }

    /// Full record with the fields an update sets replaced.
    ///
    /// The registry overwrites every field on `PUT`, so edits are merged into
    /// the cached record before they are sent.
    pub fn merged_with(&self, update: &ResourceUpdate) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            arn: update.arn.clone().unwrap_or_else(|| self.arn.clone()),
            resource_type: update
                .resource_type
                .clone()
                .unwrap_or_else(|| self.resource_type.clone()),
            value: update.value.clone().unwrap_or_else(|| self.value.clone()),
        }
    }

    /// Write payload carrying every field except the id
    pub fn to_fields(&self) -> ResourceFields {
        ResourceFields {
            name: self.name.clone(),
            arn: self.arn.clone(),
            resource_type: self.resource_type.clone(),
            value: self.value.clone(),
        }
    }
}

/// Full write payload: `POST /resource/{namespace}` and
/// `PUT /resource/{namespace}/{name}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFields {
    pub name: String,
    pub arn: String,
    pub resource_type: String,
    pub value: String,
}

impl ResourceFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = arn.into();
        self
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// Partial edit of a cached resource.
///
/// Unset fields keep their current value once merged with
/// [`Resource::merged_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceUpdate {
    pub arn: Option<String>,
    pub resource_type: Option<String>,
    pub value: Option<String>,
}

impl ResourceUpdate {
    pub fn arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = Some(arn.into());
        self
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// True when no field would be sent
    pub fn is_empty(&self) -> bool {
        self.arn.is_none() && self.resource_type.is_none() && self.value.is_none()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
