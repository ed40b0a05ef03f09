use alloy::primitives::Address;

/// Parses an EIP-155 chain id given as a hex quantity (`0x507`, `0x0507`).
pub(crate) fn parse_chain_id(value: &str) -> Option<u64> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }

    u64::from_str_radix(digits, 16).ok()
}

/// `0x1234…abcd` form used in log lines.
pub(crate) fn short_address(address: &Address) -> String {
    let full = address.to_string();

    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
