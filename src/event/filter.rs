use super::Event;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// NIP-01 subscription/query filter.
///
/// Pets may narrow a filter (e.g. impose a `limit`) before it reaches the
/// database; see `Totem::on_query_filter_shape`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Event ids (or prefixes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,

    /// Author pubkeys (or prefixes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<u16>>,

    /// Exclusive lower bound on `created_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<u64>,

    /// Inclusive upper bound on `created_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<u64>,

    /// Result-count ceiling; `None` means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// NIP-50 full-text query; accepted but not applied by `matches`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Tag queries keyed with the `#` prefix (`#p`, `#d`, ...)
    #[serde(flatten)]
    pub tags: BTreeMap<String, Vec<String>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authors(mut self, authors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u16>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn tag(mut self, name: &str, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let key = if name.starts_with('#') {
            name.to_string()
        } else {
            format!("#{}", name)
        };
        self.tags
            .insert(key, values.into_iter().map(Into::into).collect());
        self
    }

    /// Check whether an event satisfies every constraint of this filter.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ref ids) = self.ids {
            if !ids.iter().any(|id| event.id.starts_with(id.as_str())) {
                return false;
            }
        }

        if let Some(ref authors) = self.authors {
            if !authors.iter().any(|a| event.pubkey.starts_with(a.as_str())) {
                return false;
            }
        }

        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }

        if let Some(since) = self.since {
            if event.created_at <= since {
                return false;
            }
        }

        if let Some(until) = self.until {
            if event.created_at > until {
                return false;
            }
        }

        self.tags.iter().all(|(key, values)| match key.strip_prefix('#') {
            Some(name) => event
                .tag_values(name)
                .any(|v| values.iter().any(|wanted| wanted == v)),
            None => true,
        })
    }
}
