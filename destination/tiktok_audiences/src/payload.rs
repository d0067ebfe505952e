use serde::{Deserialize, Serialize};

/// The audience membership of a single user, shared by every variant of [`AudiencePayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceMembership {
    /// The advertiser the audience belongs to
    #[serde(default)]
    pub selected_advertiser_id: Option<String>,

    /// The TikTok audience to update
    pub audience_id: String,

    #[serde(default)]
    pub email: Option<String>,

    /// The mobile advertising ID (IDFA or AAID)
    #[serde(default)]
    pub advertising_id: Option<String>,

    #[serde(default = "default_send")]
    pub send_email: bool,

    #[serde(default = "default_send")]
    pub send_advertising_id: bool,
}

fn default_send() -> bool {
    true
}

impl AudienceMembership {
    /// The email, if present and not empty.
    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    /// The advertising ID, if present and not empty.
    pub fn advertising_id(&self) -> Option<&str> {
        non_empty(&self.advertising_id)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// A user to be added to or removed from an audience.
/// The variant does not drive the update: the verb sent to TikTok is chosen by the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudiencePayload {
    Add(AudienceMembership),
    Remove(AudienceMembership),
}

impl AudiencePayload {
    pub fn membership(&self) -> &AudienceMembership {
        match self {
            AudiencePayload::Add(membership) | AudiencePayload::Remove(membership) => membership,
        }
    }
}
