//! DNSSEC delegation check.
//!
//! A zone counts as signed when its parent publishes DS records for it.

use hickory_resolver::{
    TokioResolver,
    proto::{
        dnssec::rdata::DNSSECRData,
        rr::{RecordType, record_data::RData},
    },
};

use super::resolver::{Lookup, answers};
use crate::types::RecordCheck;

/// Render a DS record as `"<key_tag> <algorithm> <digest_type> <hex digest>"`.
fn format_ds(key_tag: u16, algorithm: u8, digest_type: u8, digest: &[u8]) -> String {
    format!("{key_tag} {algorithm} {digest_type} {}", hex::encode(digest))
}

async fn ds_records(resolver: &TokioResolver, domain: &str) -> Lookup<String> {
    answers(
        resolver
            .lookup(domain, RecordType::DS)
            .await
            .map(|response| {
                response
                    .record_iter()
                    .filter_map(|record| match record.data() {
                        RData::DNSSEC(DNSSECRData::DS(ds)) => Some(format_ds(
                            ds.key_tag(),
                            ds.algorithm().into(),
                            ds.digest_type().into(),
                            ds.digest(),
                        )),
                        other => {
                            log::warn!("Unexpected RData type in DS query: {other:?}");
                            None
                        }
                    })
                    .collect()
            }),
    )
}

pub(crate) async fn dnssec_check(resolver: &TokioResolver, domain: &str) -> RecordCheck {
    evaluate_ds(domain, ds_records(resolver, domain).await)
}

pub(crate) fn evaluate_ds(domain: &str, lookup: Lookup<String>) -> RecordCheck {
    match lookup {
        Ok(records) => RecordCheck::records(!records.is_empty(), records),
        Err(failure) => failure.into_check("DNSSEC", domain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::resolver::LookupFailure;
    use crate::types::CheckValue;

    #[test]
    fn test_format_ds() {
        assert_eq!(
            format_ds(2371, 13, 2, &[0xde, 0xad, 0xbe, 0xef]),
            "2371 13 2 deadbeef"
        );
    }

    #[test]
    fn test_evaluate_ds_signed() {
        let check = evaluate_ds("example.com", Ok(vec!["370 13 2 be74".to_string()]));
        assert!(check.status);
    }

    #[test]
    fn test_evaluate_ds_unsigned() {
        let check = evaluate_ds("example.org", Err(LookupFailure::NotFound));
        assert!(!check.status);
        assert_eq!(
            check.value,
            CheckValue::Message("DNSSEC record not found: example.org".to_string())
        );
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_dnssec_check_signed_zone_real() {
        let resolver = &*super::super::resolver::DEFAULT_RESOLVER;
        let check = dnssec_check(resolver, "cloudflare.com").await;
        assert!(check.status);
    }
}
