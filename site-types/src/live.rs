use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Subset of the streaming platform's channel document that we read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelResponse {
    #[serde(default)]
    pub livestream: Option<Livestream>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livestream {
    #[serde(default)]
    pub viewer_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LiveStatus {
    pub is_live: bool,
    pub viewer_count: Option<u32>,
}
