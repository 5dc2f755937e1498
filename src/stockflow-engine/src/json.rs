// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! JSON form of an extracted model graph.
//!
//! This is the shape extraction providers are asked to produce: separate
//! arrays for stocks/flows/auxiliaries/connectors, every variable keyed by
//! `name`, everything else optional.
//!
//! # Example
//! ```
//! use stockflow_engine::{datamodel, json};
//!
//! let json_str = r#"{"stocks": [{"name": "Population", "eqn": "100"}]}"#;
//! let json_model: json::Model = json_str.parse()?;
//! let model: datamodel::Model = json_model.into();
//! assert_eq!(1, model.stocks.len());
//! # Ok::<(), stockflow_engine::common::Error>(())
//! ```

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::datamodel::{self, PositionHint, Scalar};
use crate::import_err;

fn deserialize_null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    T: Default + serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

fn is_empty_vec<T>(val: &[T]) -> bool {
    val.is_empty()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Stock {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,
    /// Initial value; expected to be a numeric literal.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eqn: Option<Scalar>,
    #[serde(
        skip_serializing_if = "is_empty_vec",
        default,
        deserialize_with = "deserialize_null_default"
    )]
    pub inflows: Vec<String>,
    #[serde(
        skip_serializing_if = "is_empty_vec",
        default,
        deserialize_with = "deserialize_null_default"
    )]
    pub outflows: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub x: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Flow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eqn: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub x: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Auxiliary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eqn: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub x: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Connector {
    pub src: String,
    pub tgt: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub angle: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Model {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub stocks: Vec<Stock>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub flows: Vec<Flow>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub auxiliaries: Vec<Auxiliary>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub connectors: Vec<Connector>,
}

// empty strings mean the same thing as a missing field downstream
fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn equation_text(eqn: Option<Scalar>) -> Option<String> {
    non_empty(eqn.map(|eqn| eqn.as_text().into_owned()))
}

impl From<Stock> for datamodel::Stock {
    fn from(stock: Stock) -> Self {
        datamodel::Stock {
            name: stock.name,
            documentation: non_empty(stock.description),
            units: non_empty(stock.unit),
            equation: equation_text(stock.eqn),
            inflows: stock.inflows,
            outflows: stock.outflows,
            hint: PositionHint {
                x: stock.x,
                y: stock.y,
            },
        }
    }
}

impl From<Flow> for datamodel::Flow {
    fn from(flow: Flow) -> Self {
        datamodel::Flow {
            name: flow.name,
            documentation: non_empty(flow.description),
            units: non_empty(flow.unit),
            equation: equation_text(flow.eqn),
            hint: PositionHint {
                x: flow.x,
                y: flow.y,
            },
        }
    }
}

impl From<Auxiliary> for datamodel::Aux {
    fn from(aux: Auxiliary) -> Self {
        datamodel::Aux {
            name: aux.name,
            documentation: non_empty(aux.description),
            units: non_empty(aux.unit),
            equation: equation_text(aux.eqn),
            hint: PositionHint { x: aux.x, y: aux.y },
        }
    }
}

impl From<Connector> for datamodel::Connector {
    fn from(connector: Connector) -> Self {
        datamodel::Connector {
            src: connector.src,
            tgt: connector.tgt,
            angle: connector.angle,
        }
    }
}

impl From<Model> for datamodel::Model {
    fn from(model: Model) -> Self {
        datamodel::Model {
            stocks: model.stocks.into_iter().map(|s| s.into()).collect(),
            flows: model.flows.into_iter().map(|f| f.into()).collect(),
            auxiliaries: model.auxiliaries.into_iter().map(|a| a.into()).collect(),
            connectors: model.connectors.into_iter().map(|c| c.into()).collect(),
        }
    }
}

impl std::str::FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match serde_json::from_str(s) {
            Ok(model) => Ok(model),
            Err(err) => import_err!(
                JsonDeserialization,
                format!("Failed to parse JSON model: {}", err)
            ),
        }
    }
}

impl Model {
    /// Parse a Model from a reader
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        match serde_json::from_reader(reader) {
            Ok(model) => Ok(model),
            Err(err) => import_err!(
                JsonDeserialization,
                format!("Failed to parse JSON model: {}", err)
            ),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| {
            Error::new(
                ErrorKind::Export,
                ErrorCode::Generic,
                Some(format!("Failed to serialize JSON model: {}", err)),
            )
        })
    }
}

/// Generate the JSON Schema for the Model type
#[cfg(feature = "schema")]
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(Model)
}

/// Generate the JSON Schema as a formatted JSON string
#[cfg(feature = "schema")]
pub fn generate_schema_json() -> Result<String> {
    serde_json::to_string_pretty(&generate_schema()).map_err(|err| {
        Error::new(
            ErrorKind::Export,
            ErrorCode::Generic,
            Some(format!("Failed to serialize schema: {}", err)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_model() {
        let model: Model = r#"{"stocks": [{"name": "Population"}]}"#.parse().unwrap();
        assert_eq!(1, model.stocks.len());
        assert!(model.flows.is_empty());
        assert!(model.auxiliaries.is_empty());
        assert!(model.connectors.is_empty());

        let stock = &model.stocks[0];
        assert_eq!("Population", stock.name);
        assert!(stock.eqn.is_none());
        assert!(stock.inflows.is_empty());
        assert!(stock.x.is_none());
    }

    #[test]
    fn test_deserialize_with_nulls() {
        let json_str = r#"{
            "stocks": [{"name": "Water", "inflows": null, "outflows": ["drain"], "x": null}],
            "flows": null,
            "auxiliaries": [{"name": "k", "eqn": null}],
            "connectors": null
        }"#;

        let model: Model = json_str.parse().unwrap();
        assert!(model.stocks[0].inflows.is_empty());
        assert_eq!(vec!["drain".to_owned()], model.stocks[0].outflows);
        assert!(model.stocks[0].x.is_none());
        assert!(model.flows.is_empty());
        assert!(model.auxiliaries[0].eqn.is_none());
        assert!(model.connectors.is_empty());
    }

    #[test]
    fn test_mixed_hint_types() {
        let json_str = r#"{
            "flows": [{"name": "births", "x": 250, "y": "310"}],
            "connectors": [{"src": "rate", "tgt": "births", "angle": 45.5}]
        }"#;
        let model: Model = json_str.parse().unwrap();
        let flow = &model.flows[0];
        assert_eq!(Some(Scalar::from(250)), flow.x);
        assert_eq!(Some(Scalar::from("310")), flow.y);
        assert_eq!(
            "45.5",
            model.connectors[0].angle.as_ref().unwrap().as_text()
        );
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let result: Result<Model> = r#"{"stocks": [{"eqn": "1"}]}"#.parse();
        let err = result.unwrap_err();
        assert_eq!(ErrorKind::Import, err.kind);
        assert_eq!(ErrorCode::JsonDeserialization, err.code);
    }

    #[test]
    fn test_connector_requires_endpoints() {
        let result: Result<Model> = r#"{"connectors": [{"src": "a"}]}"#.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_not_json() {
        let result: Result<Model> = "Here is the model you asked for".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_into_datamodel() {
        let json_str = r#"{
            "stocks": [{
                "name": "Population",
                "description": "",
                "unit": "people",
                "eqn": 100,
                "inflows": ["Births"],
                "x": 120,
                "y": 80
            }],
            "flows": [{"name": "Births", "eqn": "Population * Birth Rate", "unit": ""}],
            "auxiliaries": [{"name": "Birth Rate", "eqn": ""}],
            "connectors": [{"src": "Birth Rate", "tgt": "Births"}]
        }"#;
        let model: datamodel::Model = json_str.parse::<Model>().unwrap().into();

        let stock = &model.stocks[0];
        assert_eq!(None, stock.documentation);
        assert_eq!(Some("people".to_owned()), stock.units);
        assert_eq!(Some("100".to_owned()), stock.equation);
        assert_eq!(vec!["Births".to_owned()], stock.inflows);
        assert_eq!(Some(Scalar::from(120)), stock.hint.x);

        let flow = &model.flows[0];
        assert_eq!(Some("Population * Birth Rate".to_owned()), flow.equation);
        assert_eq!(None, flow.units);
        assert_eq!(PositionHint::default(), flow.hint);

        assert_eq!(None, model.auxiliaries[0].equation);
        assert_eq!(None, model.connectors[0].angle);
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let model = Model {
            stocks: vec![Stock {
                name: "Water".to_owned(),
                description: None,
                unit: None,
                eqn: Some(Scalar::from("10")),
                inflows: vec![],
                outflows: vec![],
                x: None,
                y: None,
            }],
            ..Default::default()
        };
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(
            r#"{"stocks":[{"name":"Water","eqn":"10"}],"flows":[],"auxiliaries":[],"connectors":[]}"#,
            json
        );

        let reparsed: Model = json.parse().unwrap();
        assert_eq!(model, reparsed);
    }

    #[cfg(feature = "schema")]
    #[test]
    fn test_schema_names_top_level_arrays() {
        let schema = generate_schema_json().unwrap();
        for key in ["stocks", "flows", "auxiliaries", "connectors"] {
            assert!(schema.contains(key), "schema is missing {key}");
        }
    }
}
