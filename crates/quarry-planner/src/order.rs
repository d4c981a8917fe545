//! Order compiler: client order list to backend sort clauses.

use quarry_core::{FieldPath, Result};
use quarry_handlers::HandlerRegistry;
use serde_json::Value;

use crate::catalog::{Dataset, Member};
use crate::request::OrderEntry;

/// Sort clauses in list order. Within one entry, keys are compiled in the
/// order the client wrote them; unknown and unsortable keys are skipped.
pub fn compile_order(
    dataset: &Dataset,
    registry: &HandlerRegistry,
    order: &[OrderEntry],
) -> Result<Vec<Value>> {
    let mut clauses = Vec::new();
    for (name, params) in order.iter().flatten() {
        if params.is_null() {
            continue;
        }
        let Some(member) = dataset.member(name) else {
            continue;
        };
        let path = FieldPath::root().child(name);
        let compiled = match member {
            Member::Stored(field) => registry.sort(&field.ty, &path, params)?,
            Member::Computed(_, computed) => {
                computed.sort.resolve(&member.site(registry, &path), params)?
            }
        };
        clauses.extend(compiled.into_iter().flatten());
    }
    Ok(clauses)
}
