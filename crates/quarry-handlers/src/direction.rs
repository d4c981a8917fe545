//! Sort direction shared by every orderable type.

use quarry_core::api::NamedType;
use quarry_core::emit::Emitted;
use quarry_core::{Error, FieldPath, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{Capability, TypeCapability};

pub const ORDER_DIRECTION: &str = "OrderDirection";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Backend spelling.
    pub fn as_backend(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    pub fn from_params(path: &FieldPath, params: &Value) -> Result<Self> {
        serde_json::from_value(params.clone()).map_err(|_| {
            Error::argument(
                path.dotted(),
                format!("expected ASC or DESC, got {params}"),
            )
        })
    }
}

/// `enum OrderDirection { ASC DESC }`
pub fn order_direction_type() -> NamedType {
    NamedType::enumeration(ORDER_DIRECTION, &["ASC", "DESC"])
}

/// Order-argument capability shared by all primitive handlers.
pub fn order_direction_arg() -> TypeCapability {
    Capability::Constant(Emitted::bare(order_direction_type()).include_self())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_uppercase_directions() {
        let path = FieldPath::root().child("age");
        assert_eq!(Direction::from_params(&path, &json!("DESC")).unwrap(), Direction::Desc);
        assert_eq!(Direction::from_params(&path, &json!("ASC")).unwrap().as_backend(), "asc");
        assert!(Direction::from_params(&path, &json!("down")).is_err());
        assert!(Direction::from_params(&path, &json!({"dir": "ASC"})).is_err());
    }
}
