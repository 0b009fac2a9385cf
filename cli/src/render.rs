//! Plain-text rendering of waves and submission outcomes.

use waveportal_core::api::WaveEntry;

pub fn address_link(explorer_base_url: &str, address: &str) -> String {
    format!("{}/address/{}", explorer_base_url.trim_end_matches('/'), address)
}

pub fn tx_link(explorer_base_url: &str, reference: &str) -> String {
    format!("{}/tx/{}", explorer_base_url.trim_end_matches('/'), reference)
}

pub fn entry(entry: &WaveEntry, explorer_base_url: &str) -> String {
    format!(
        "Address: {} ({})\nTime:    {}\nMessage: {}",
        entry.address,
        address_link(explorer_base_url, &entry.address),
        entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.message
    )
}

pub fn entries(entries: &[WaveEntry], explorer_base_url: &str) -> String {
    entries
        .iter()
        .map(|e| entry(e, explorer_base_url))
        .collect::<Vec<_>>()
        .join("\n\n")
}
