#![forbid(unsafe_code)]
//! quarry-planner: catalog → API schema + index mappings, and request
//! arguments → backend search documents.
//!
//! Design:
//! - A `Catalog` names `Dataset`s: a record schema, computed fields, and the
//!   backing index.
//! - `generate` walks every dataset through the handler registry and emits
//!   named definitions once each; `mapping` does the same for index mappings.
//! - `filter` and `order` compile client arguments into backend query and
//!   sort JSON, consulting the same registry.
//! - `dsl::yaml` reads catalogs from YAML.
//!
//! Nothing here performs I/O; `quarry-exec` sends the documents.

pub mod catalog;
pub mod dsl;
pub mod filter;
pub mod generate;
pub mod mapping;
pub mod order;
pub mod request;

use quarry_core::Result;
use quarry_handlers::HandlerRegistry;

pub use catalog::{Catalog, DataSource, Dataset, Member};
pub use dsl::yaml::{parse_yaml_catalog, CatalogConfig, ParsedCatalog};
pub use filter::{compile_filter, FilterCompiler};
pub use generate::{dataset_root_field, generate_api_schema, DatasetTypeNames};
pub use mapping::{catalog_mappings, dataset_mapping, index_body};
pub use order::compile_order;
pub use request::{DatasetArguments, FilterNode, OrderEntry, SearchRequest};

/// Compile a dataset's query arguments into a backend search body.
pub fn compile_search(
    dataset: &Dataset,
    registry: &HandlerRegistry,
    args: &DatasetArguments,
) -> Result<SearchRequest> {
    let query = compile_filter(dataset, registry, args.filter.as_ref())?;
    let sort = compile_order(dataset, registry, args.order.as_deref().unwrap_or_default())?;
    Ok(SearchRequest {
        query,
        sort: if sort.is_empty() { None } else { Some(sort) },
    })
}
