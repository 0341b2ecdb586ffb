//! Operation catalog.
//!
//! The catalog is the structured description of every API operation the
//! provider documents, produced externally by the doc scraper and loaded
//! once at start-up. Top-level keys of `doc.json` are operation names; each
//! value maps parameter names to their schema. An optional sibling
//! `enums.json` supplies enumerated allowed values per parameter, and the
//! fixed region set is injected as the allowed values of every `Region`
//! parameter, mirroring what the doc pipeline ships.

use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

/// Schema of a single operation parameter as scraped from the provider docs.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "Type")]
    pub param_type: String,
    #[serde(rename = "Desc", default)]
    pub description: String,
    #[serde(rename = "Required", default)]
    pub required: bool,
    /// Display order in the provider docs; never used for validation.
    #[serde(rename = "Order", default)]
    pub order: i64,
    #[serde(rename = "Enums", default)]
    pub enums: Option<Vec<String>>,
}

/// Parameters of one operation, keyed by parameter name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct OperationSchema {
    params: BTreeMap<String, ParameterSchema>,
}

impl OperationSchema {
    pub fn get(&self, name: &str) -> Option<&ParameterSchema> {
        self.params.get(name)
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Parameters sorted the way the provider docs list them.
    pub fn params_in_order(&self) -> Vec<(&str, &ParameterSchema)> {
        let mut params: Vec<_> = self
            .params
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
            .collect();
        params.sort_by(|a, b| (a.1.order, a.0).cmp(&(b.1.order, b.0)));
        params
    }

    /// Render the parameter table shown by `help <operation>`.
    pub fn usage(&self) -> String {
        let header = ("Param", "Type", "Required", "Description");
        let rows: Vec<(&str, &str, &str, String)> = self
            .params_in_order()
            .into_iter()
            .map(|(name, p)| {
                let mut desc = p.description.clone();
                if let Some(enums) = &p.enums {
                    if !enums.is_empty() {
                        if !desc.is_empty() {
                            desc.push(' ');
                        }
                        desc.push_str(&format!("(one of: {})", enums.join(", ")));
                    }
                }
                (
                    name,
                    p.param_type.as_str(),
                    if p.required { "Yes" } else { "No" },
                    desc,
                )
            })
            .collect();

        let name_w = rows
            .iter()
            .map(|r| r.0.len())
            .chain([header.0.len()])
            .max()
            .unwrap_or(0);
        let type_w = rows
            .iter()
            .map(|r| r.1.len())
            .chain([header.1.len()])
            .max()
            .unwrap_or(0);
        let req_w = header.2.len();

        let mut out = format!(
            "{:<name_w$}  {:<type_w$}  {:<req_w$}  {}\n",
            header.0, header.1, header.2, header.3
        );
        for (name, ty, req, desc) in rows {
            out.push_str(&format!(
                "{name:<name_w$}  {ty:<type_w$}  {req:<req_w$}  {desc}\n"
            ));
        }
        out
    }
}

/// Immutable mapping from operation name to its parameter schema.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    operations: BTreeMap<String, OperationSchema>,
}

impl Catalog {
    /// Load the catalog from `doc.json`, overlay the sibling `enums.json`
    /// when present, and inject `regions` as the allowed values of every
    /// `Region` parameter.
    pub fn load(path: &Path, regions: &[&str]) -> anyhow::Result<Catalog> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading operation catalog {}", path.display()))?;
        let mut catalog: Catalog = serde_json::from_str(&data)
            .with_context(|| format!("parsing operation catalog {}", path.display()))?;

        let enums_path = path.with_file_name("enums.json");
        if enums_path.exists() {
            let data = fs::read_to_string(&enums_path)
                .with_context(|| format!("reading {}", enums_path.display()))?;
            let overlay: BTreeMap<String, BTreeMap<String, Vec<String>>> =
                serde_json::from_str(&data)
                    .with_context(|| format!("parsing {}", enums_path.display()))?;
            catalog.apply_enums(overlay);
        }

        catalog.inject_region_enums(regions);
        Ok(catalog)
    }

    /// Default catalog location: `NIMBUS_DOC_PATH` or `<config_dir>/nimbus/doc.json`.
    pub fn default_path() -> PathBuf {
        env::var("NIMBUS_DOC_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
                p.push("nimbus/doc.json");
                p
            })
    }

    pub fn get(&self, operation: &str) -> Option<&OperationSchema> {
        self.operations.get(operation)
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn apply_enums(&mut self, overlay: BTreeMap<String, BTreeMap<String, Vec<String>>>) {
        for (operation, params) in overlay {
            if let Some(schema) = self.operations.get_mut(&operation) {
                for (name, values) in params {
                    if let Some(param) = schema.params.get_mut(&name) {
                        param.enums = Some(values);
                    }
                }
            }
        }
    }

    fn inject_region_enums(&mut self, regions: &[&str]) {
        let regions: Vec<String> = regions.iter().map(|r| r.to_string()).collect();
        for schema in self.operations.values_mut() {
            if let Some(param) = schema.params.get_mut("Region") {
                param.enums = Some(regions.clone());
            }
        }
    }
}
