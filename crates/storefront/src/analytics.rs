//! Storefront analytics events.
//!
//! There is no analytics provider yet: events are emitted as structured
//! `tracing` events under the `analytics` target and recorded as Sentry
//! breadcrumbs so they show up alongside any error report. Tracking never
//! fails the caller.

use serde_json::Value;

/// Event names, following the GA4 e-commerce vocabulary.
pub mod events {
    pub const VIEW_ITEM: &str = "view_item";
    pub const ADD_TO_CART: &str = "add_to_cart";
    pub const REMOVE_FROM_CART: &str = "remove_from_cart";
    pub const BEGIN_CHECKOUT: &str = "begin_checkout";
}

/// Record an analytics event with free-form parameters.
pub fn track_event(name: &str, params: &Value) {
    tracing::info!(target: "analytics", event = name, params = %params, "analytics event");

    let data = match params {
        Value::Object(map) => map.clone().into_iter().collect(),
        Value::Null => Default::default(),
        other => std::iter::once(("value".to_string(), other.clone())).collect(),
    };

    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some("analytics".to_string()),
        message: Some(name.to_string()),
        level: sentry::Level::Info,
        data,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_event_accepts_any_params() {
        track_event(events::VIEW_ITEM, &serde_json::json!({ "handle": "classic-hoodie" }));
        track_event(events::BEGIN_CHECKOUT, &Value::Null);
        track_event("custom", &serde_json::json!(42));
    }
}
