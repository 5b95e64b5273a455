//! User models

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A user who can sign for equipment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    /// Service/personal number shown next to the name in the recipient picker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        match &self.personal_number {
            Some(number) => format!("{} ({})", self.name, number),
            None => self.name.clone(),
        }
    }
}

/// Find a user by id in an injected user list
pub fn find_user<'a>(users: &'a [User], id: &UserId) -> Option<&'a User> {
    users.iter().find(|u| &u.id == id)
}
