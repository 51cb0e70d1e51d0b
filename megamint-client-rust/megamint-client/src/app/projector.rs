//! Pure conversion of factory records into display rows.

use std::collections::HashSet;
use std::fmt::Display;

use chrono::{Local, TimeZone};
use ethers::types::{Address, U256};

use crate::domain::token::{TokenInfo, TokenRecord};

const TOKEN_DECIMALS: usize = 18;

/// Renders an 18-decimal amount exactly, keeping at least one fractional
/// digit: `10^24` is `"1000000.0"`, `0` is `"0.0"`.
pub fn format_supply(raw: U256) -> String {
    let unit = U256::exp10(TOKEN_DECIMALS);
    let whole = raw / unit;
    let fraction = raw % unit;

    let digits = format!("{:0>width$}", fraction.to_string(), width = TOKEN_DECIMALS);
    let trimmed = digits.trim_end_matches('0');
    let fraction = if trimmed.is_empty() { "0" } else { trimmed };

    format!("{whole}.{fraction}")
}

/// `M/D/YYYY, h:mm:ss AM|PM` in the given zone.
pub fn format_timestamp_in<Tz>(secs: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Ok(secs) = i64::try_from(secs) else {
        return secs.to_string();
    };
    match tz.timestamp_opt(secs, 0).single() {
        Some(dt) => dt.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        None => secs.to_string(),
    }
}

pub fn format_timestamp(secs: u64) -> String {
    format_timestamp_in(secs, &Local)
}

pub fn project_in<Tz>(record: &TokenRecord, tz: &Tz) -> TokenInfo
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    TokenInfo {
        token_address: record.token_address,
        name: record.name.clone(),
        symbol: record.symbol.clone(),
        total_supply: format_supply(record.total_supply),
        owner: record.owner,
        created_at: format_timestamp_in(record.created_at, tz),
    }
}

pub fn project(record: &TokenRecord) -> TokenInfo {
    project_in(record, &Local)
}

pub fn project_all(records: &[TokenRecord]) -> Vec<TokenInfo> {
    records.iter().map(project).collect()
}

/// Entries of `mine` that also appear in `all` as owned by `account`,
/// in `mine`'s order.
pub fn owned_subset(mine: Vec<TokenRecord>, all: &[TokenRecord], account: Address) -> Vec<TokenRecord> {
    let owned: HashSet<Address> = all
        .iter()
        .filter(|r| r.owner == account)
        .map(|r| r.token_address)
        .collect();

    mine.into_iter()
        .filter(|r| r.owner == account && owned.contains(&r.token_address))
        .collect()
}

/// `0x1234...abcd`
pub fn short_address(address: &Address) -> String {
    let full = format!("{address:?}");
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{address, record, whole_tokens};
    use chrono::{FixedOffset, Utc};
    use proptest::prelude::*;

    #[test]
    fn test_format_supply_examples() {
        assert_eq!(format_supply(whole_tokens(1_000_000)), "1000000.0");
        assert_eq!(format_supply(U256::zero()), "0.0");
        assert_eq!(format_supply(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(format_supply(U256::exp10(17) * 15), "1.5");
    }

    #[test]
    fn test_format_supply_is_exact_for_max_value() {
        assert_eq!(
            format_supply(U256::MAX),
            "115792089237316195423570985008687907853269984665640564039457.584007913129639935"
        );
    }

    #[test]
    fn test_timestamp_format() {
        // 2023-11-14T22:13:20Z
        assert_eq!(format_timestamp_in(1_700_000_000, &Utc), "11/14/2023, 10:13:20 PM");

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(format_timestamp_in(1_700_000_000, &tokyo), "11/15/2023, 7:13:20 AM");

        assert_eq!(format_timestamp_in(0, &Utc), "1/1/1970, 12:00:00 AM");
    }

    #[test]
    fn test_project_keeps_addresses() {
        let info = project_in(&record(0x10, 1, "AAA"), &Utc);
        assert_eq!(info.token_address, address(0x10));
        assert_eq!(info.owner, address(1));
        assert_eq!(info.total_supply, "1000000.0");
        assert_eq!(info.created_at, "11/14/2023, 10:13:20 PM");
    }

    #[test]
    fn test_owned_subset_drops_foreign_and_unknown_entries() {
        let me = address(1);
        let all = vec![record(0x10, 1, "AAA"), record(0x20, 2, "BBB")];
        let mine = vec![
            record(0x10, 1, "AAA"),
            // owned by someone else
            record(0x20, 2, "BBB"),
            // claims to be mine but the factory never listed it
            record(0x30, 1, "CCC"),
        ];

        let subset = owned_subset(mine, &all, me);
        assert_eq!(subset, vec![record(0x10, 1, "AAA")]);
    }

    #[test]
    fn test_short_address() {
        let addr: Address = "0x1234567890123456789012345678901234abcdef".parse().unwrap();
        assert_eq!(short_address(&addr), "0x1234...cdef");
    }

    fn arb_record() -> impl Strategy<Value = TokenRecord> {
        (any::<u8>(), 0u8..4, any::<[u64; 4]>(), 0u64..4_102_444_800).prop_map(
            |(token, owner, limbs, created_at)| TokenRecord {
                token_address: address(token),
                name: format!("Token {token}"),
                symbol: format!("T{token}"),
                total_supply: U256(limbs),
                owner: address(owner),
                created_at,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_projection_is_idempotent(records in prop::collection::vec(arb_record(), 0..8)) {
            let first: Vec<_> = records.iter().map(|r| project_in(r, &Utc)).collect();
            let second: Vec<_> = records.iter().map(|r| project_in(r, &Utc)).collect();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_whole_amounts_render_with_one_zero(n in any::<u64>()) {
            prop_assert_eq!(format_supply(U256::from(n) * U256::exp10(18)), format!("{n}.0"));
        }

        #[test]
        fn prop_format_supply_round_trips(limbs in any::<[u64; 4]>()) {
            let raw = U256(limbs);
            let rendered = format_supply(raw);
            let (whole, fraction) = rendered.split_once('.').unwrap();
            prop_assert!(!fraction.is_empty());
            prop_assert!(fraction.len() == 1 || !fraction.ends_with('0'));

            let padded = format!("{fraction:0<18}");
            let rebuilt = U256::from_dec_str(whole).unwrap() * U256::exp10(18)
                + U256::from_dec_str(&padded).unwrap();
            prop_assert_eq!(rebuilt, raw);
        }

        #[test]
        fn prop_owned_subset_is_subset_of_owned_all(
            mine in prop::collection::vec(arb_record(), 0..8),
            all in prop::collection::vec(arb_record(), 0..8),
            account in 0u8..4,
        ) {
            let account = address(account);
            let subset = owned_subset(mine, &all, account);
            for token in &subset {
                prop_assert_eq!(token.owner, account);
                prop_assert!(all
                    .iter()
                    .any(|r| r.token_address == token.token_address && r.owner == account));
            }
        }
    }
}
