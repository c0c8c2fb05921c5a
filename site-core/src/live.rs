use site_types::{ChannelResponse, LiveStatus};

/// A channel is live exactly when the platform reports a livestream object.
pub fn live_status_from(channel: &ChannelResponse) -> LiveStatus {
    match &channel.livestream {
        Some(stream) => LiveStatus {
            is_live: true,
            viewer_count: stream.viewer_count,
        },
        None => LiveStatus {
            is_live: false,
            viewer_count: None,
        },
    }
}
