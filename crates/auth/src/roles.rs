use serde::{Deserialize, Serialize};

/// Account role chosen at registration.
///
/// `Both` grants the landlord capabilities while keeping tenant ones; there is
/// no administrator role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Tenant,
    Landlord,
    Both,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Tenant => "tenant",
            UserType::Landlord => "landlord",
            UserType::Both => "both",
        }
    }

    /// Whether this role may publish listings.
    pub fn can_list_properties(&self) -> bool {
        matches!(self, UserType::Landlord | UserType::Both)
    }
}

impl core::fmt::Display for UserType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tenant" => Ok(UserType::Tenant),
            "landlord" => Ok(UserType::Landlord),
            "both" => Ok(UserType::Both),
            other => Err(format!("unknown user type '{other}'")),
        }
    }
}
