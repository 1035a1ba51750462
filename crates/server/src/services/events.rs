//! Monthly event feed built from event products.

use chrono::NaiveDate;
use xmas_events_core::{DayType, EventDay, EventSlot, Month};

use crate::shopify::{EventProduct, EventVariant};

/// Parse the `custom.holidays` metafield: a JSON array of `YYYY-MM-DD`.
///
/// Missing or malformed values yield no holidays; entries that are not
/// dates are skipped.
#[must_use]
pub fn parse_holidays(raw: Option<&str>) -> Vec<NaiveDate> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(parse_event_date)
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed holidays metafield");
            Vec::new()
        }
    }
}

/// Parse an event date, accepting a trailing time part (`2025-12-20T...`).
fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Numeric ID from a GID like `gid://shopify/ProductVariant/123`.
fn numeric_id(gid: &str) -> Option<u64> {
    gid.rsplit('/').next()?.parse().ok()
}

fn slot(variant: &EventVariant) -> Option<EventSlot> {
    let Some(id) = numeric_id(&variant.id) else {
        tracing::warn!(gid = %variant.id, "Skipping variant with unexpected ID");
        return None;
    };
    let rem = variant.inventory_quantity.unwrap_or(0).max(0);

    Some(EventSlot {
        label: variant.title.clone(),
        id,
        rem,
        available: variant.available_for_sale && rem > 0,
    })
}

/// Build the event days of `month` from products, sorted by date then handle.
///
/// Products without a parsable `event_date`, or dated outside `month`, are
/// skipped.
#[must_use]
pub fn build_feed(products: &[EventProduct], holidays: &[NaiveDate], month: Month) -> Vec<EventDay> {
    let mut days: Vec<EventDay> = products
        .iter()
        .filter_map(|product| {
            let date = product.event_date.as_deref().and_then(parse_event_date)?;
            if !month.contains(date) {
                return None;
            }
            let slots = product.variants.iter().filter_map(slot).collect();
            Some(EventDay::new(
                date,
                product.handle.clone(),
                DayType::classify(date, holidays),
                slots,
            ))
        })
        .collect();

    days.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.handle.cmp(&b.handle)));
    days
}
