use crate::error::{OperationSection, Section, SpecificationError, SpecificationSection};
use crate::loader;
use crate::operation::{Operation, ParameterSchemaOptions};
use crate::traverser::OpenApiTraverser;
use crate::types::parameter::Parameter;
use crate::types::version::OpenApiVersion;
use crate::{DEFAULT_ROOT_ID, HTTP_METHODS, PARAMETERS_FIELD, PATH_SEPARATOR, PATHS_FIELD};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Settings applied while building a [`Specification`].
#[derive(Debug, Clone)]
pub struct SpecificationOptions {
    /// Identifier the document is registered under with the schema engine.
    pub root_id: String,
    /// Overrides the `openapi` field of the document when set.
    pub version: Option<OpenApiVersion>,
    pub parameters: ParameterSchemaOptions,
}

impl Default for SpecificationOptions {
    fn default() -> Self {
        Self {
            root_id: DEFAULT_ROOT_ID.to_string(),
            version: None,
            parameters: ParameterSchemaOptions::default(),
        }
    }
}

/// The operation a request path resolved to, with the captured path values.
#[derive(Debug)]
pub struct RouteMatch {
    operation: Arc<Operation>,
    path_parameters: IndexMap<String, String>,
}

impl RouteMatch {
    pub fn operation(&self) -> &Arc<Operation> {
        &self.operation
    }

    /// Percent-decoded placeholder values in template order.
    pub fn path_parameters(&self) -> &IndexMap<String, String> {
        &self.path_parameters
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters.get(name).map(String::as_str)
    }
}

/// A node in the path routing tree.
///
/// Static children are tried before placeholder children, so the most
/// specific template wins.
#[derive(Debug, Default)]
struct PathNode {
    statics: HashMap<String, PathNode>,
    parameters: Vec<(String, PathNode)>,
    /// Operations ending at this node, keyed by uppercased method.
    operations: HashMap<String, Arc<Operation>>,
}

impl PathNode {
    fn insert(&mut self, template: &str, operation: Arc<Operation>) {
        let mut current = self;
        for segment in split_path_segments(template) {
            current = if is_parameter_segment(segment) {
                let name = extract_parameter_name(segment);
                let position = match current
                    .parameters
                    .iter()
                    .position(|(existing, _)| existing == name)
                {
                    Some(position) => position,
                    None => {
                        current
                            .parameters
                            .push((name.to_string(), PathNode::default()));
                        current.parameters.len() - 1
                    }
                };
                &mut current.parameters[position].1
            } else {
                current.statics.entry(segment.to_string()).or_default()
            };
        }
        current
            .operations
            .insert(operation.method().to_string(), operation);
    }

    fn find(
        &self,
        segments: &[&str],
        method: &str,
        captures: &mut Vec<(String, String)>,
    ) -> Option<&Arc<Operation>> {
        let Some((segment, rest)) = segments.split_first() else {
            return self.operations.get(method);
        };

        if let Some(child) = self.statics.get(*segment) {
            if let Some(found) = child.find(rest, method, captures) {
                return Some(found);
            }
        }

        if self.parameters.is_empty() {
            return None;
        }
        let value = percent_encoding::percent_decode_str(segment).decode_utf8_lossy();
        for (name, child) in &self.parameters {
            captures.push((name.clone(), value.to_string()));
            if let Some(found) = child.find(rest, method, captures) {
                return Some(found);
            }
            captures.pop();
        }
        None
    }
}

fn split_path_segments(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn is_parameter_segment(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn extract_parameter_name(segment: &str) -> &str {
    &segment[1..segment.len() - 1]
}

/// A loaded document with its operations indexed for lookup.
///
/// Built once; every lookup afterwards is read-only.
#[derive(Debug)]
pub struct Specification {
    document: Value,
    version: OpenApiVersion,
    root_id: String,
    operations: Vec<Arc<Operation>>,
    path_router: PathNode,
}

impl Specification {
    pub fn new(document: Value) -> Result<Self, SpecificationError> {
        Self::with_options(document, &SpecificationOptions::default())
    }

    /// Loads a YAML or JSON document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SpecificationError> {
        Self::new(loader::load_from_path(path)?)
    }

    /// Dereferences `document` and builds every operation it declares.
    ///
    /// Fails on an unsupported version, a broken local reference, a
    /// malformed parameter or a parameter list that cannot be folded into a
    /// single schema.
    pub fn with_options(
        mut document: Value,
        options: &SpecificationOptions,
    ) -> Result<Self, SpecificationError> {
        let version = match options.version {
            Some(version) => version,
            None => OpenApiVersion::from_document(&document)?,
        };
        loader::dereference(&mut document, &options.root_id)?;

        let paths_section =
            Section::Specification(SpecificationSection::Paths(OperationSection::Other));
        let mut operations = Vec::new();
        let mut path_router = PathNode::default();

        if let Some(paths) = document.get(PATHS_FIELD) {
            let paths = OpenApiTraverser::require_object(paths)
                .map_err(|e| SpecificationError::traversal_failed(e, paths_section.clone()))?;
            for (template, path_item) in paths {
                let methods = OpenApiTraverser::require_object(path_item)
                    .map_err(|e| SpecificationError::traversal_failed(e, paths_section.clone()))?;
                let inherited = Self::path_item_parameters(path_item)?;

                for (method, data) in methods {
                    if !HTTP_METHODS.contains(&method.to_lowercase().as_str()) {
                        continue;
                    }
                    let operation = Arc::new(Operation::with_options(
                        method,
                        template,
                        data.clone(),
                        &inherited,
                        options.parameters,
                    )?);
                    path_router.insert(template, operation.clone());
                    operations.push(operation);
                }
            }
        }

        log::debug!(
            "Indexed {} operation(s) of an OpenAPI {} document",
            operations.len(),
            version
        );
        Ok(Self {
            document,
            version,
            root_id: options.root_id.clone(),
            operations,
            path_router,
        })
    }

    fn path_item_parameters(path_item: &Value) -> Result<Vec<Parameter>, SpecificationError> {
        let section =
            Section::Specification(SpecificationSection::Paths(OperationSection::Parameters));
        let declared = OpenApiTraverser::get_optional_array(path_item, PARAMETERS_FIELD)
            .map_err(|e| SpecificationError::traversal_failed(e, section.clone()))?;
        declared
            .into_iter()
            .flatten()
            .map(|definition| {
                Parameter::from_value(definition)
                    .map_err(|e| SpecificationError::traversal_failed(e, section.clone()))
            })
            .collect()
    }

    /// The dereferenced document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn version(&self) -> OpenApiVersion {
        self.version
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Every operation in document order.
    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    /// Looks an operation up by its declared template, e.g. `("get", "/pets/{petId}")`.
    pub fn find_operation(&self, method: &str, path_template: &str) -> Option<&Arc<Operation>> {
        self.operations.iter().find(|operation| {
            operation.method().eq_ignore_ascii_case(method)
                && operation.path_template() == path_template
        })
    }

    /// Resolves a concrete request path, e.g. `("GET", "/pets/42")`.
    ///
    /// Any query string is ignored.
    pub fn find_route(&self, method: &str, path: &str) -> Option<Arc<RouteMatch>> {
        let method = method.to_uppercase();
        let path = match path.split_once('?') {
            Some((path, _)) => path,
            None => path,
        };
        let segments = split_path_segments(path);
        let mut captures = Vec::new();
        let operation = self.path_router.find(&segments, &method, &mut captures)?;
        Some(Arc::new(RouteMatch {
            operation: operation.clone(),
            path_parameters: captures.into_iter().collect(),
        }))
    }
}
