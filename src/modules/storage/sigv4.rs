//! Minimal AWS Signature v4 signing for the S3 calls rust-s3 does not expose
//! (bucket policy).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::core::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

pub struct SigV4Signer {
    access_key: String,
    secret_key: String,
    region: String,
}

/// Headers to attach to a signed request
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub payload_hash: String,
    pub authorization: String,
}

impl SigV4Signer {
    pub fn new(access_key: &str, secret_key: &str, region: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            region: region.to_string(),
        }
    }

    /// Sign an S3 request with `host`, `x-amz-content-sha256` and `x-amz-date` headers
    pub fn sign(
        &self,
        method: &str,
        host: &str,
        canonical_uri: &str,
        canonical_query: &str,
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> Result<SignedHeaders, AppError> {
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = hex::encode(Sha256::digest(payload));

        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host, payload_hash, amz_date
        );
        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method, canonical_uri, canonical_query, canonical_headers, SIGNED_HEADERS, payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            credential_scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signature = hex::encode(hmac_sha256(
            &self.signing_key(&date_stamp)?,
            string_to_sign.as_bytes(),
        )?);

        Ok(SignedHeaders {
            authorization: format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, self.access_key, credential_scope, SIGNED_HEADERS, signature
            ),
            amz_date,
            payload_hash,
        })
    }

    fn signing_key(&self, date_stamp: &str) -> Result<Vec<u8>, AppError> {
        let k_date = hmac_sha256(
            format!("AWS4{}", self.secret_key).as_bytes(),
            date_stamp.as_bytes(),
        )?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, b"s3")?;
        hmac_sha256(&k_service, b"aws4_request")
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signed(secret: &str) -> SignedHeaders {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        SigV4Signer::new("minioadmin", secret, "us-east-1")
            .sign(
                "PUT",
                "localhost:9000",
                "/jejak-meong",
                "policy=",
                br#"{"Version":"2012-10-17"}"#,
                now,
            )
            .unwrap()
    }

    #[test]
    fn test_authorization_header_shape() {
        let headers = signed("minioadmin");
        assert_eq!(headers.amz_date, "20250301T083000Z");
        assert_eq!(headers.payload_hash.len(), 64);
        assert!(headers.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=minioadmin/20250301/us-east-1/s3/aws4_request, \
             SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature="
        ));

        let signature = headers
            .authorization
            .rsplit("Signature=")
            .next()
            .unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_depends_on_secret() {
        assert_eq!(signed("a").authorization, signed("a").authorization);
        assert_ne!(signed("a").authorization, signed("b").authorization);
    }
}
