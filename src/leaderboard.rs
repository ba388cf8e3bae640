use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Campaign;
use crate::countdown::{utc_countdown, Countdown};
use crate::format::{display_name, format_reward, format_row_volume, format_total_volume};
use crate::upstream::{LeaderboardItem, LeaderboardPage};

pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEntry {
    pub rank: i64,
    pub name: String,
    pub volume: String,
    pub expected_reward: String,
}

/// Display payload returned to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    #[serde(rename = "prizePool")]
    pub prize_pool: String,
    #[serde(rename = "totalTraders")]
    pub total_traders: i64,
    #[serde(rename = "totalVolume")]
    pub total_volume: String,
    pub top10: Vec<TopEntry>,
    #[serde(rename = "endsAtUTC")]
    pub ends_at_utc: String,
    #[serde(rename = "countdownUTC")]
    pub countdown_utc: Countdown,
}

/// The `n` lowest-ranked items, ascending by rank. Input order is not assumed.
pub fn top_ranked(items: &[LeaderboardItem], n: usize) -> Vec<&LeaderboardItem> {
    let mut sorted: Vec<&LeaderboardItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.rank);
    sorted.truncate(n);
    sorted
}

impl From<&LeaderboardItem> for TopEntry {
    fn from(item: &LeaderboardItem) -> Self {
        Self {
            rank: item.rank,
            name: display_name(item.name.as_deref()),
            volume: format_row_volume(item.volume),
            expected_reward: format_reward(item.expected_reward),
        }
    }
}

pub fn build_payload(page: &LeaderboardPage, campaign: &Campaign, now: DateTime<Utc>) -> Payload {
    Payload {
        prize_pool: campaign.prize_pool.clone(),
        total_traders: page.total_records,
        total_volume: format_total_volume(page.total_volume),
        top10: top_ranked(&page.data, TOP_N).into_iter().map(TopEntry::from).collect(),
        ends_at_utc: campaign.ends_at_iso(),
        countdown_utc: utc_countdown(campaign.ends_at, now),
    }
}
