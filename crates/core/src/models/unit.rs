use serde::{Deserialize, Serialize};

use crate::errors::{SchedError, SchedResult};

pub const MAX_CODE_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub capacity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUnitRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub capacity: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUnitRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitQuery {
    /// Case-insensitive substring matched against code and name
    pub search: Option<String>,
}

/// A unit's fields after validation, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFields {
    pub code: String,
    pub name: String,
    pub capacity: i32,
}

impl CreateUnitRequest {
    pub fn validate(self) -> SchedResult<UnitFields> {
        Ok(UnitFields {
            code: validate_code(self.code)?,
            name: validate_name(self.name)?,
            capacity: validate_capacity(self.capacity)?,
        })
    }
}

impl UpdateUnitRequest {
    /// Merges the supplied fields over `current` and validates the result.
    pub fn apply(self, current: &Unit) -> SchedResult<UnitFields> {
        Ok(UnitFields {
            code: validate_code(self.code.unwrap_or_else(|| current.code.clone()))?,
            name: validate_name(self.name.unwrap_or_else(|| current.name.clone()))?,
            capacity: validate_capacity(self.capacity.unwrap_or(current.capacity.into()))?,
        })
    }
}

fn validate_code(code: String) -> SchedResult<String> {
    let code = code.trim().to_string();
    if code.is_empty() {
        return Err(SchedError::validation("code", "This field may not be blank."));
    }
    if code.chars().count() > MAX_CODE_LEN {
        return Err(SchedError::validation(
            "code",
            format!("Ensure this field has no more than {MAX_CODE_LEN} characters."),
        ));
    }
    Ok(code)
}

fn validate_name(name: String) -> SchedResult<String> {
    if name.trim().is_empty() {
        return Err(SchedError::validation("name", "This field may not be blank."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(SchedError::validation(
            "name",
            format!("Ensure this field has no more than {MAX_NAME_LEN} characters."),
        ));
    }
    Ok(name)
}

fn validate_capacity(capacity: i64) -> SchedResult<i32> {
    if capacity < 0 {
        return Err(SchedError::validation(
            "capacity",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    i32::try_from(capacity).map_err(|_| {
        SchedError::validation(
            "capacity",
            format!("Ensure this value is less than or equal to {}.", i32::MAX),
        )
    })
}
