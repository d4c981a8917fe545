//! Engine: owns the catalog, handler registry and backend, and serves
//! dataset searches.
//!
//! The API schema is generated once at construction and kept with its
//! fingerprint; every request compiles against the same catalog.

use std::collections::BTreeMap;

use quarry_core::{ApiSchema, EngineConfig, Fingerprint};
use quarry_handlers::HandlerRegistry;
use quarry_planner::{
    catalog_mappings, compile_search, generate_api_schema, index_body, Catalog, Dataset,
    DatasetArguments, SearchRequest,
};
use serde_json::Value;

use crate::backend::{IndexAdmin, SearchBackend};
use crate::error::{ExecError, Result};
use crate::metrics::{record, Milestone};

pub struct Engine<B> {
    config: EngineConfig,
    catalog: Catalog,
    registry: HandlerRegistry,
    backend: B,
    api: ApiSchema,
    fingerprint: Fingerprint,
}

impl<B> Engine<B> {
    pub fn new(config: EngineConfig, catalog: Catalog, backend: B) -> Result<Self> {
        Self::with_registry(config, catalog, HandlerRegistry::standard(), backend)
    }

    pub fn with_registry(
        config: EngineConfig,
        catalog: Catalog,
        registry: HandlerRegistry,
        backend: B,
    ) -> Result<Self> {
        let api = generate_api_schema(&catalog, &registry).map_err(ExecError::Schema)?;
        let fingerprint = api.fingerprint().map_err(ExecError::Schema)?;
        catalog_mappings(&catalog, &registry, &config).map_err(ExecError::Schema)?;
        record(
            Milestone::SchemaBuilt,
            &fingerprint.short(),
            &[
                ("datasets", catalog.datasets.len().to_string()),
                ("definitions", api.definitions.len().to_string()),
            ],
        );
        Ok(Self {
            config,
            catalog,
            registry,
            backend,
            api,
            fingerprint,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn api_schema(&self) -> &ApiSchema {
        &self.api
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    fn dataset(&self, name: &str) -> Result<&Dataset> {
        self.catalog
            .get(name)
            .ok_or_else(|| ExecError::UnknownDataset(name.to_string()))
    }

    /// Compile the `Query.<dataset>` arguments (`{filter?, order?}`).
    pub fn compile(&self, dataset: &str, args: &Value) -> Result<SearchRequest> {
        let ds = self.dataset(dataset)?;
        let args = DatasetArguments::from_value(args).map_err(ExecError::Query)?;
        let request = compile_search(ds, &self.registry, &args).map_err(ExecError::Query)?;
        if self.config.log_queries {
            record(
                Milestone::QueryCompiled,
                dataset,
                &[("body", request.to_value().to_string())],
            );
        }
        Ok(request)
    }

    /// Physical index name for a dataset.
    pub fn index_name(&self, dataset: &str) -> Result<String> {
        Ok(self.config.index_name(&self.dataset(dataset)?.source.index))
    }

    /// Every dataset's mapping, keyed by physical index name.
    pub fn mappings(&self) -> Result<BTreeMap<String, Value>> {
        catalog_mappings(&self.catalog, &self.registry, &self.config).map_err(ExecError::Schema)
    }
}

impl<B: SearchBackend> Engine<B> {
    /// Compile and run a search; returns hit sources in backend order.
    pub fn search(&self, dataset: &str, args: &Value) -> Result<Vec<Value>> {
        let request = self.compile(dataset, args)?;
        let index = self.index_name(dataset)?;
        let hits = self.backend.search(&index, &request)?;
        record(
            Milestone::Search,
            dataset,
            &[("index", index), ("hits", hits.len().to_string())],
        );
        Ok(hits)
    }
}

impl<B: IndexAdmin> Engine<B> {
    /// Push every dataset mapping to the backend.
    pub fn create_indices(&self) -> Result<Vec<String>> {
        let mut created = Vec::new();
        for (index, mapping) in self.mappings()? {
            self.backend.create_index(&index, &index_body(mapping))?;
            record(Milestone::IndexCreated, &index, &[]);
            created.push(index);
        }
        Ok(created)
    }
}
