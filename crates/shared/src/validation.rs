//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;
use validator::ValidationError;

/// Largest accepted nested group expansion depth.
pub const MAX_NESTED_GROUP_DEPTH: u32 = 8;

lazy_static! {
    /// Verified domain names such as `contoso.onmicrosoft.com`.
    static ref DOMAIN_NAME_REGEX: Regex =
        Regex::new(r"^(?i)[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)+$")
            .unwrap();
}

/// Validates a directory (tenant) identifier.
///
/// Accepts either a GUID or a verified domain name.
pub fn validate_tenant_id(tenant_id: &str) -> Result<(), ValidationError> {
    let trimmed = tenant_id.trim();
    if Uuid::parse_str(trimmed).is_ok() || DOMAIN_NAME_REGEX.is_match(trimmed) {
        Ok(())
    } else {
        let mut err = ValidationError::new("tenant_id_format");
        err.message = Some("Tenant ID must be a GUID or a domain name".into());
        Err(err)
    }
}

/// Validates an application (client) identifier, which is always a GUID.
pub fn validate_client_id(client_id: &str) -> Result<(), ValidationError> {
    if Uuid::parse_str(client_id.trim()).is_ok() {
        Ok(())
    } else {
        let mut err = ValidationError::new("client_id_format");
        err.message = Some("Client ID must be a GUID".into());
        Err(err)
    }
}

/// Validates the nested group expansion depth (1 to 8).
pub fn validate_nested_group_depth(depth: u32) -> Result<(), ValidationError> {
    if (1..=MAX_NESTED_GROUP_DEPTH).contains(&depth) {
        Ok(())
    } else {
        let mut err = ValidationError::new("nested_group_depth_range");
        err.message = Some("Nested group depth must be between 1 and 8".into());
        Err(err)
    }
}

/// Validates that a remote base URL uses HTTPS.
pub fn validate_https_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") && url.len() > "https://".len() {
        Ok(())
    } else {
        let mut err = ValidationError::new("https_url");
        err.message = Some("URL must use https".into());
        Err(err)
    }
}
