use chrono::{DateTime, Local, Utc};
use crate::constants::NETWORKS;

/// Shortens a wallet address for display: 0x1234...abcd
pub fn shorten_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        id.to_string()
    }
}

pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as u64;
    let dollars = cents / 100;

    // group thousands: 12345 -> 12,345
    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("${}.{:02}", grouped, cents % 100)
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn network_name(chain_id: u64) -> &'static str {
    NETWORKS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
        .unwrap_or("Unknown Network")
}

/// Hex form of a chain id as providers expect it, e.g. 11155111 -> 0xaa36a7
pub fn chain_id_hex(chain_id: u64) -> String {
    format!("{:#x}", chain_id)
}

pub fn parse_chain_id_hex(hex: &str) -> Option<u64> {
    let digits = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}
