use super::ApiError;
use super::types::SearchQuery;
use crate::db::SimSearch;

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

pub fn validate_limit(limit: Option<i64>) -> Result<u64, ApiError> {
    const MIN_LIMIT: i64 = 1;

    let Some(limit) = limit else {
        return Ok(DEFAULT_PAGE_LIMIT);
    };

    match u64::try_from(limit) {
        Ok(value) if limit >= MIN_LIMIT && value <= MAX_PAGE_LIMIT => Ok(value),
        _ => Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_PAGE_LIMIT}"
        ))),
    }
}

pub fn validate_offset(offset: Option<i64>) -> Result<u64, ApiError> {
    let offset = offset.unwrap_or(0);
    u64::try_from(offset).map_err(|_| {
        ApiError::validation(format!(
            "Invalid offset: {offset}. Offset must be zero or positive"
        ))
    })
}

/// Trims identifiers and drops blank ones; at least one must remain.
pub fn validate_search_criteria(query: SearchQuery) -> Result<SimSearch, ApiError> {
    fn normalize(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    let criteria = SimSearch {
        iccid: normalize(query.iccid),
        imsi: normalize(query.imsi),
        msisdn: normalize(query.msisdn),
    };

    if criteria.is_empty() {
        return Err(ApiError::validation(
            "At least one of iccid, imsi or msisdn is required",
        ));
    }
    Ok(criteria)
}

pub fn validate_iccid(iccid: &str) -> Result<&str, ApiError> {
    let trimmed = iccid.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("iccid cannot be empty"));
    }
    Ok(trimmed)
}
