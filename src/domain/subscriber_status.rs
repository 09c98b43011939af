use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberStatus {
    Validating,
    Invalid,
    Pending,
    Active,
    Inactive,
    NeedsAttention,
    #[serde(other)]
    Unknown,
}

impl SubscriberStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriberStatus::Active)
    }

    pub fn is_inactive(&self) -> bool {
        matches!(self, SubscriberStatus::Inactive)
    }
}

impl AsRef<str> for SubscriberStatus {
    fn as_ref(&self) -> &str {
        match self {
            SubscriberStatus::Validating => "validating",
            SubscriberStatus::Invalid => "invalid",
            SubscriberStatus::Pending => "pending",
            SubscriberStatus::Active => "active",
            SubscriberStatus::Inactive => "inactive",
            SubscriberStatus::NeedsAttention => "needs_attention",
            SubscriberStatus::Unknown => "unknown",
        }
    }
}
