//! Server-defined fields with no stored value.
//!
//! A computed field carries the same capability slots as a handler, minus
//! selection and mapping, and exposes only the ones its author sets. The
//! `standard_*` builders borrow the type surfaces of the result type from the
//! registry.

use quarry_core::emit::Emitted;
use quarry_core::{Error, Primitive, Result, SchemaType};
use serde_json::{Map, Value};

use crate::capability::{Capability, CompileCapability, Site, TypeCapability};
use crate::direction::{order_direction_arg, Direction};
use crate::dsl;
use crate::terms::{self, BooleanFilter};

/// Client-supplied argument of a computed field.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub ty: SchemaType,
}

#[derive(Debug, Clone)]
pub struct ComputedField {
    pub result_type: SchemaType,
    pub arguments: Vec<Argument>,
    pub field: TypeCapability,
    pub filter_arg: TypeCapability,
    pub order_arg: TypeCapability,
    pub filter: CompileCapability,
    pub sort: CompileCapability,
}

/// The value half of a hook parameter once arguments have been split off.
#[derive(Debug, Clone, PartialEq)]
pub struct HookParams {
    pub arguments: Map<String, Value>,
    pub value: Value,
}

impl ComputedField {
    /// A field exposing nothing until capabilities are added.
    pub fn new(result_type: impl Into<SchemaType>) -> Self {
        Self {
            result_type: result_type.into(),
            arguments: Vec::new(),
            field: Capability::Absent,
            filter_arg: Capability::Absent,
            order_arg: Capability::Absent,
            filter: Capability::Absent,
            sort: Capability::Absent,
        }
    }

    pub fn argument(mut self, name: impl Into<String>, ty: impl Into<SchemaType>) -> Self {
        self.arguments.push(Argument {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }

    pub fn with_field(mut self, cap: TypeCapability) -> Self {
        self.field = cap;
        self
    }

    pub fn with_filter_arg(mut self, cap: TypeCapability) -> Self {
        self.filter_arg = cap;
        self
    }

    pub fn with_order_arg(mut self, cap: TypeCapability) -> Self {
        self.order_arg = cap;
        self
    }

    pub fn with_filter(mut self, cap: CompileCapability) -> Self {
        self.filter = cap;
        self
    }

    pub fn with_sort(mut self, cap: CompileCapability) -> Self {
        self.sort = cap;
        self
    }

    /// API field typed as the registry types the result type.
    pub fn standard_field(self) -> Self {
        self.with_field(Capability::computed(|site: &Site<'_>, _: &()| {
            site.registry.field_type(site.ty, site.path)
        }))
    }

    pub fn standard_filter_arg(self) -> Self {
        self.with_filter_arg(Capability::computed(|site: &Site<'_>, _: &()| {
            site.registry.filter_arg(site.ty, site.path)
        }))
    }

    pub fn standard_order_arg(self) -> Self {
        self.with_order_arg(Capability::computed(|site: &Site<'_>, _: &()| {
            site.registry.order_arg(site.ty, site.path)
        }))
    }

    /// A field evaluated by backend scripts. `filter_script` must yield a
    /// boolean and is filtered with `BooleanFilter`; `sort_script` yields the
    /// sort key. Script `params` are the client's arguments.
    pub fn scripted(
        result_type: impl Into<SchemaType>,
        arguments: Vec<Argument>,
        filter_script: Option<String>,
        sort_script: Option<String>,
    ) -> Self {
        let mut field = ComputedField::new(result_type);
        field.arguments = arguments;
        let has_arguments = field.has_arguments();

        if let Some(source) = filter_script {
            field = field
                .with_filter_arg(Capability::Constant(
                    Emitted::bare(terms::boolean_filter_type()).include_self(),
                ))
                .with_filter(Capability::computed(move |site: &Site<'_>, params: &Value| {
                    let hook = split_arguments(site, params, "filter", has_arguments)?;
                    let filter: BooleanFilter = terms::parse_params(site.path, &hook.value)?;
                    let query = dsl::script_query(dsl::script(&source, hook.arguments));
                    Ok(Some(match filter.equals {
                        Some(true) => vec![query],
                        Some(false) => vec![dsl::bool_must_not(vec![query])],
                        None => Vec::new(),
                    }))
                }));
        }

        if let Some(source) = sort_script {
            let kind = match field.result_type.primitive() {
                Some(Primitive::Int | Primitive::Float | Primitive::Long | Primitive::Double) => {
                    "number"
                }
                _ => "string",
            };
            field = field
                .with_order_arg(order_direction_arg())
                .with_sort(Capability::computed(move |site: &Site<'_>, params: &Value| {
                    let hook = split_arguments(site, params, "order", has_arguments)?;
                    let direction = Direction::from_params(site.path, &hook.value)?;
                    let script = dsl::script(&source, hook.arguments);
                    Ok(Some(vec![dsl::script_sort(kind, direction, script)]))
                }));
        }

        field
    }
}

/// Separate `{arguments, <key>}` hook parameters for a field that takes
/// arguments. Fields without arguments receive the value itself.
pub fn split_arguments(
    site: &Site<'_>,
    params: &Value,
    key: &str,
    has_arguments: bool,
) -> Result<HookParams> {
    if !has_arguments {
        return Ok(HookParams {
            arguments: Map::new(),
            value: params.clone(),
        });
    }
    let wrapper = params.as_object().ok_or_else(|| {
        Error::argument(
            site.field_name(),
            format!("expected {{arguments, {key}}}, got {params}"),
        )
    })?;
    if let Some(unknown) = wrapper.keys().find(|k| *k != "arguments" && *k != key) {
        return Err(Error::argument(
            site.field_name(),
            format!("unexpected key '{unknown}'"),
        ));
    }
    let arguments = match wrapper.get("arguments") {
        Some(Value::Object(args)) => args.clone(),
        _ => {
            return Err(Error::argument(
                site.field_name(),
                "missing 'arguments' object",
            ))
        }
    };
    Ok(HookParams {
        arguments,
        value: wrapper.get(key).cloned().unwrap_or(Value::Null),
    })
}
