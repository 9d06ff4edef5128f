//! Bukkit-style permissions, shared by `plugin.yml` and `paper-plugin.yml`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use resource_factory_api::{NullIfEmpty, WriteOnly, WriteOnlyEncoding};

/// Who is granted a permission by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionDefault {
    True,
    False,
    Op,
    NotOp,
}

impl PermissionDefault {
    /// The spelling used in generated files.
    pub fn serialized(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Op => "op",
            Self::NotOp => "not op",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('_', " ").as_str() {
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "op" => Some(Self::Op),
            "not op" => Some(Self::NotOp),
            _ => None,
        }
    }
}

/// Accepts `OP`, `NOT_OP`, `not op` and YAML booleans.
impl<'de> Deserialize<'de> for PermissionDefault {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Ok(Self::True),
            Repr::Flag(false) => Ok(Self::False),
            Repr::Name(name) => Self::from_name(&name)
                .ok_or_else(|| D::Error::custom(format!("unknown permission default '{name}'"))),
        }
    }
}

impl WriteOnlyEncoding for PermissionDefault {
    const TYPE_NAME: &'static str = "PermissionDefault";

    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.serialized())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Permission {
    pub description: Option<String>,
    pub default: Option<PermissionDefault>,
    pub children: BTreeMap<String, bool>,
}

impl Permission {
    /// Grant every node in `nodes` as a child of this permission.
    pub fn children(&mut self, nodes: &[&str]) -> &mut Self {
        for node in nodes {
            self.children.insert((*node).to_string(), true);
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct SerializablePermission {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<WriteOnly<PermissionDefault>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<BTreeMap<String, bool>>,
}

impl From<&Permission> for SerializablePermission {
    fn from(permission: &Permission) -> Self {
        Self {
            description: permission.description.clone(),
            default: WriteOnly::from_opt(&permission.default),
            children: permission.children.null_if_empty(),
        }
    }
}

/// Project a keyed permission container, `None` when empty.
pub fn serializable_permissions(
    permissions: &BTreeMap<String, Permission>,
) -> Option<BTreeMap<String, SerializablePermission>> {
    permissions.null_if_empty().map(|permissions| {
        permissions
            .iter()
            .map(|(name, permission)| (name.clone(), SerializablePermission::from(permission)))
            .collect()
    })
}
