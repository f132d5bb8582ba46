use serde::Serialize;

use crate::error::CheckError;

pub(crate) fn to_pretty<T: Serialize>(value: &T) -> Result<String, CheckError> {
    Ok(serde_json::to_string_pretty(value)?)
}
