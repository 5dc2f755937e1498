// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The in-memory model graph a single conversion operates on.
//!
//! Names are kept exactly as they were extracted (spaces included);
//! identifier forms are derived at emission time.

use std::borrow::Cow;
use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A loosely-typed value as produced by an extraction model: position
/// hints, angles and stock initial values show up as JSON numbers or as
/// numbers-in-strings, and the textual form as received is what gets emitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(untagged)]
pub enum Scalar {
    Number(#[cfg_attr(feature = "schema", schemars(with = "f64"))] serde_json::Number),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Scalar::Number(n) => Cow::Owned(n.to_string()),
            Scalar::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Numeric interpretation, or None when the text doesn't parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(serde_json::Number::from(n))
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_owned())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// Caller-supplied coordinates, typically read off the source diagram.
/// Either axis may be missing independently of the other.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionHint {
    pub x: Option<Scalar>,
    pub y: Option<Scalar>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stock {
    pub name: String,
    pub documentation: Option<String>,
    pub units: Option<String>,
    pub equation: Option<String>,
    pub inflows: Vec<String>,
    pub outflows: Vec<String>,
    pub hint: PositionHint,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Flow {
    pub name: String,
    pub documentation: Option<String>,
    pub units: Option<String>,
    pub equation: Option<String>,
    pub hint: PositionHint,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Aux {
    pub name: String,
    pub documentation: Option<String>,
    pub units: Option<String>,
    pub equation: Option<String>,
    pub hint: PositionHint,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub src: String,
    pub tgt: String,
    pub angle: Option<Scalar>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub stocks: Vec<Stock>,
    pub flows: Vec<Flow>,
    pub auxiliaries: Vec<Aux>,
    pub connectors: Vec<Connector>,
}

impl Model {
    /// Every declared stock, flow and auxiliary name, in declaration order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.stocks
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.flows.iter().map(|f| f.name.as_str()))
            .chain(self.auxiliaries.iter().map(|a| a.name.as_str()))
            .collect()
    }
}

/// The identifier form of a display name: spaces become underscores.
pub fn to_ident(name: &str) -> String {
    name.replace(' ', "_")
}
