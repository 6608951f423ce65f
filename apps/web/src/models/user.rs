use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Basic,
    Premium,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Premium => "premium",
            Plan::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "premium" => Ok(Plan::Premium),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(format!("unknown plan '{other}'")),
        }
    }
}

/// A registered visitor. Lives only as long as its session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub province: String,
    pub plan: Plan,
    pub join_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_parses_case_insensitively() {
        assert_eq!("Premium".parse::<Plan>(), Ok(Plan::Premium));
        assert_eq!(" basic ".parse::<Plan>(), Ok(Plan::Basic));
        assert!("gold".parse::<Plan>().is_err());
    }

    #[test]
    fn test_plan_serializes_lowercase() {
        let json = serde_json::to_string(&Plan::Enterprise).unwrap();
        assert_eq!(json, "\"enterprise\"");
    }
}
