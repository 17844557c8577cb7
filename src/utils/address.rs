use once_cell::sync::Lazy;
use regex::Regex;

pub const SOLANA_CHAIN_ID: &str = "501";

static EVM_ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid regex"));
static BASE58_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid regex"));

pub fn is_valid_evm_address(address: &str) -> bool {
    EVM_ADDRESS.is_match(address)
}

pub fn is_valid_solana_address(address: &str) -> bool {
    BASE58_ADDRESS.is_match(address)
}

pub fn is_valid_address(chain_id: &str, address: &str) -> bool {
    if chain_id == SOLANA_CHAIN_ID {
        is_valid_solana_address(address)
    } else {
        is_valid_evm_address(address)
    }
}

/// EVM addresses are lowercased; base58 is case-sensitive and kept as is.
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.starts_with("0x") {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

pub fn same_address(a: &str, b: &str) -> bool {
    if a.starts_with("0x") && b.starts_with("0x") {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}
