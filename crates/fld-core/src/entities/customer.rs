use serde::{Deserialize, Serialize};

/// Destination customer of an installation batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Address the one-time code and the installation notification go to.
    pub contact_address: String,
    #[serde(default)]
    pub city: Option<String>,
}
