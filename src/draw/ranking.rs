use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::engine::DrawnWinner;
use super::store::{Ticket, WinnerRecord};
use crate::models::{BuyerView, WinnerView};

/// 买家信息缺失（或号码已删除）时的占位
pub const ANONYMOUS_BUYER: &str = "Anónimo";
pub const NO_PHONE: &str = "Sin tel.";

/// 计算名次：按 is_manual 分组，组内按 won_at 从新到旧，
/// 最新的名次为组大小，最早的为 1。同一时间戳保持传入顺序。
///
/// 返回值与 `records` 一一对应。
pub fn rank_positions(records: &[WinnerRecord]) -> Vec<u32> {
    let mut positions = vec![0u32; records.len()];
    for manual in [false, true] {
        let mut subset: Vec<usize> = (0..records.len())
            .filter(|&i| records[i].is_manual == manual)
            .collect();
        // 稳定排序
        subset.sort_by(|&a, &b| records[b].won_at.cmp(&records[a].won_at));
        let size = subset.len() as u32;
        for (idx, &i) in subset.iter().enumerate() {
            positions[i] = size - idx as u32;
        }
    }
    positions
}

/// 随机抽奖轮次：同一 won_at 为同一轮，最早一轮为 1；手动中奖无轮次
pub fn draw_rounds(records: &[WinnerRecord]) -> Vec<Option<u32>> {
    let stamps: BTreeSet<DateTime<Utc>> = records
        .iter()
        .filter(|r| !r.is_manual)
        .map(|r| r.won_at)
        .collect();
    records
        .iter()
        .map(|r| {
            if r.is_manual {
                None
            } else {
                stamps
                    .iter()
                    .position(|s| *s == r.won_at)
                    .map(|p| p as u32 + 1)
            }
        })
        .collect()
}

fn non_empty(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

/// 号码可能已被删除，此时返回占位买家信息，不报错
pub fn format_winner(
    record: &WinnerRecord,
    ticket: Option<&Ticket>,
    position: u32,
    round: Option<u32>,
) -> WinnerView {
    WinnerView {
        winner_id: record.id,
        ticket_number: ticket.map(|t| t.number),
        is_manual_winner: record.is_manual,
        won_at: record.won_at,
        position,
        round,
        ticket_deleted: ticket.is_none(),
        buyer: BuyerView {
            name: non_empty(ticket.and_then(|t| t.buyer_name.as_deref()), ANONYMOUS_BUYER),
            phone: non_empty(ticket.and_then(|t| t.buyer_phone.as_deref()), NO_PHONE),
        },
    }
}

/// 格式化完整中奖历史（store 返回的顺序：从新到旧）
pub fn format_history(history: &[(WinnerRecord, Option<Ticket>)]) -> Vec<WinnerView> {
    let records: Vec<WinnerRecord> = history.iter().map(|(r, _)| r.clone()).collect();
    let positions = rank_positions(&records);
    let rounds = draw_rounds(&records);

    history
        .iter()
        .zip(positions)
        .zip(rounds)
        .map(|(((record, ticket), position), round)| {
            format_winner(record, ticket.as_ref(), position, round)
        })
        .collect()
}

/// 只返回本次新产生的中奖者，名次与轮次基于完整历史计算
pub fn format_drawn(
    drawn: &[DrawnWinner],
    history: &[(WinnerRecord, Option<Ticket>)],
) -> Vec<WinnerView> {
    let all = format_history(history);
    drawn
        .iter()
        .map(|d| {
            all.iter()
                .find(|v| v.winner_id == d.record.id)
                .cloned()
                .unwrap_or_else(|| format_winner(&d.record, Some(&d.ticket), 1, None))
        })
        .collect()
}
