//! Encouragement aggregation: per-day clap totals.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use fit_types::{Message, MessageKind, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clock::local_date;

/// Default trailing window for clap totals.
pub const DEFAULT_CLAP_WINDOW_DAYS: u32 = 30;

/// Clap totals for one local calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClaps {
    /// Claps the viewer received.
    pub claps_received: u32,
    /// Claps the viewer sent.
    pub claps_sent: u32,
}

/// One row of [`DailyClaps::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClapsEntry {
    /// Local calendar date.
    pub date: NaiveDate,
    /// Claps the viewer received on that date.
    pub claps_received: u32,
    /// Claps the viewer sent on that date.
    pub claps_sent: u32,
}

/// Clap totals bucketed by the viewer's local calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyClaps {
    days: BTreeMap<NaiveDate, DayClaps>,
}

impl DailyClaps {
    /// Totals for `date`, if any claps landed on it.
    pub fn get(&self, date: NaiveDate) -> Option<DayClaps> {
        self.days.get(&date).copied()
    }

    /// Claps received on `date`; 0 when nothing was recorded.
    pub fn claps_for_date(&self, date: NaiveDate) -> u32 {
        self.days
            .get(&date)
            .map(|day| day.claps_received)
            .unwrap_or(0)
    }

    /// All days with at least one clap, oldest first.
    pub fn entries(&self) -> Vec<DailyClapsEntry> {
        self.days
            .iter()
            .map(|(date, day)| DailyClapsEntry {
                date: *date,
                claps_received: day.claps_received,
                claps_sent: day.claps_sent,
            })
            .collect()
    }

    /// Number of days with claps.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no claps were recorded in the window.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Received claps summed over the whole window.
    pub fn total_received(&self) -> u64 {
        self.days.values().map(|d| u64::from(d.claps_received)).sum()
    }

    /// Sent claps summed over the whole window.
    pub fn total_sent(&self) -> u64 {
        self.days.values().map(|d| u64::from(d.claps_sent)).sum()
    }
}

/// Earliest `created_at` still inside a trailing window of `window_days`.
pub fn window_start<Tz: TimeZone>(now: &DateTime<Tz>, window_days: u32) -> DateTime<Utc> {
    now.with_timezone(&Utc) - Duration::days(i64::from(window_days))
}

/// Bucket clap messages involving `viewer` by local day.
///
/// Only [`MessageKind::Clap`] messages created at or after
/// `now - window_days` count. A message whose recipient is the viewer adds
/// to `claps_received`; any other message involving the viewer adds to
/// `claps_sent`. Messages between two other users are ignored.
pub fn daily_claps<Tz: TimeZone>(
    messages: &[Message],
    viewer: &UserId,
    now: &DateTime<Tz>,
    window_days: u32,
) -> DailyClaps {
    let tz = now.timezone();
    let since = window_start(now, window_days);
    let mut days: BTreeMap<NaiveDate, DayClaps> = BTreeMap::new();

    for message in messages {
        if message.kind != MessageKind::Clap
            || message.created_at < since
            || !message.involves(viewer)
        {
            continue;
        }

        let day = days
            .entry(local_date(&message.created_at, &tz))
            .or_default();

        if &message.recipient_id == viewer {
            day.claps_received = day.claps_received.saturating_add(message.claps());
        } else {
            day.claps_sent = day.claps_sent.saturating_add(message.claps());
        }
    }

    DailyClaps { days }
}
