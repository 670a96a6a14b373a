//! Static price list: data packs and the flat call bundle.

use serde::Serialize;

use crate::types::Fcfa;

/// One data-pack offer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DataPack {
    pub label: &'static str,
    pub price: Fcfa,
}

/// Data packs in ascending price order. The first entry is the form default.
pub const DATA_PACKS: [DataPack; 6] = [
    DataPack { label: "220 Mo", price: 200 },
    DataPack { label: "400 Mo", price: 300 },
    DataPack { label: "340 Mo (Life TV)", price: 900 },
    DataPack { label: "2 Go", price: 2_000 },
    DataPack { label: "5 Go", price: 4_000 },
    DataPack { label: "10 Go", price: 7_000 },
];

/// Flat price of the 24h unlimited-call bundle.
pub const CALL_BUNDLE_PRICE: Fcfa = 500;

pub fn data_packs() -> &'static [DataPack] {
    &DATA_PACKS
}

pub fn default_data_pack() -> &'static DataPack {
    &DATA_PACKS[0]
}

/// Exact, case-sensitive label lookup.
pub fn find_data_pack(label: &str) -> Option<&'static DataPack> {
    DATA_PACKS.iter().find(|p| p.label == label)
}
