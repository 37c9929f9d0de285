//! Event request building
//!
//! Reads every classified image of a group and packs the bytes into one
//! `EventRequest`. Files that cannot be read are logged and left out.

use crate::grouping::{Group, Role, RolePatterns};
use crate::proto::{EventRequest, Image};
use crate::scan::ImageFile;
use async_trait::async_trait;
use std::future::Future;
use std::path::Path;

/// Produces the request for one group, `None` when the group has nothing to send
#[async_trait]
pub trait RequestSource: Send + Sync {
    async fn build(&self, group: &Group) -> Option<EventRequest>;
}

/// Reads classified images from disk
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    patterns: RolePatterns,
}

impl RequestBuilder {
    pub fn new(patterns: RolePatterns) -> Self {
        Self { patterns }
    }
}

#[async_trait]
impl RequestSource for RequestBuilder {
    async fn build(&self, group: &Group) -> Option<EventRequest> {
        build_event_request(&group.files, &self.patterns).await
    }
}

/// Build the request for one group, or `None` when no image made it in
pub async fn build_event_request(files: &[ImageFile], patterns: &RolePatterns) -> Option<EventRequest> {
    build_event_request_with(files, patterns, |path: &Path| tokio::fs::read(path.to_path_buf())).await
}

/// Same as [`build_event_request`] with an injectable reader
pub async fn build_event_request_with<R, F>(
    files: &[ImageFile],
    patterns: &RolePatterns,
    mut read: R,
) -> Option<EventRequest>
where
    R: FnMut(&Path) -> F,
    F: Future<Output = std::io::Result<Vec<u8>>>,
{
    let mut request = EventRequest::default();

    for file in files {
        let Some(role) = patterns.classify(&file.name) else {
            continue;
        };

        let data = match read(&file.path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    path = %file.path.display(),
                    error = %e,
                    "[RequestBuilder] Skipping unreadable image"
                );
                continue;
            }
        };

        let image = Image { data };
        match role {
            Role::Overview => request.overview_image.push(image),
            Role::Front => request.front_image.push(image),
            Role::Rear => request.rear_image.push(image),
        }
    }

    if request.image_count() == 0 {
        return None;
    }

    Some(request)
}
