use serde::{Deserialize, Serialize};

use crate::domain::subscriber_status::SubscriberStatus;

/// A subscription record as returned by the publication platform, flattened and annotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub email: String,
    pub status: SubscriberStatus,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub stats: SubscriberStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referring_site: Option<String>,
    #[serde(default)]
    pub days_to_unsubscribe: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriberStats {
    pub total_received: u64,
    pub open_rate: f64,
    pub click_rate: f64,
    pub total_clicked: u64,
    pub total_unique_clicked: u64,
}

impl SubscriberStats {
    pub fn has_clicked(&self) -> bool {
        self.total_unique_clicked >= 1
    }
}

/// One page of subscribers returned by the publication platform.
#[derive(Debug, Clone)]
pub struct SubscriberPage {
    pub data: Vec<Subscriber>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
