use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Entity collections that own uploaded files.
///
/// The lowercase name is also the directory segment under both the staging
/// root and the permanent root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityName {
    Teams,
    Users,
    Tournaments,
}

impl EntityName {
    pub const ALL: [EntityName; 3] = [EntityName::Teams, EntityName::Users, EntityName::Tournaments];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityName::Teams => "teams",
            EntityName::Users => "users",
            EntityName::Tournaments => "tournaments",
        }
    }
}

impl FromStr for EntityName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teams" => Ok(EntityName::Teams),
            "users" => Ok(EntityName::Users),
            "tournaments" => Ok(EntityName::Tournaments),
            _ => Err(anyhow::anyhow!("Unknown entity: {}", s)),
        }
    }
}

impl Display for EntityName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
