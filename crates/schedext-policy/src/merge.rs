//! Policy document merge
//!
//! Folds the locally built extender template into whatever is on disk:
//! stale entries for the same managed resource are dropped, the template is
//! appended last, and every entry's URL host is pointed at this node.

use tracing::warn;

use crate::document::{ExtenderEntry, PolicyDocument};
use crate::url::rewrite_host;

/// Merge the extender `template` into `existing`, rewriting URL hosts to
/// `node_ip`.
///
/// Entries are kept in their prior relative order; the entry matching the
/// template's first managed resource name is removed and the template is
/// appended at the end. With no document on disk the result is a fresh
/// document containing only the template.
pub fn merge(
    existing: Option<PolicyDocument>,
    template: &ExtenderEntry,
    node_ip: &str,
) -> PolicyDocument {
    let mut doc = existing.unwrap_or_default();

    if let Some(name) = template.resource_name() {
        doc.extenders
            .retain(|entry| entry.resource_name() != Some(name));
    }
    doc.extenders.push(template.clone());

    for entry in &mut doc.extenders {
        match entry.url_prefix.take() {
            Some(url) => entry.url_prefix = Some(rewrite_host(&url, node_ip)),
            None => {
                warn!(
                    resource = entry.resource_name().unwrap_or("<unnamed>"),
                    "extender entry has no urlPrefix, skipping host rewrite"
                );
            }
        }
    }

    doc
}
