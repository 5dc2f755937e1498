// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use crate::datamodel;

/// Human-readable overview of an extracted model, printed before export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelSummary {
    pub stocks: Vec<String>,
    pub flows: Vec<String>,
    pub auxiliaries: Vec<String>,
    pub connector_count: usize,
}

impl From<&datamodel::Model> for ModelSummary {
    fn from(model: &datamodel::Model) -> Self {
        ModelSummary {
            stocks: model.stocks.iter().map(|s| s.name.clone()).collect(),
            flows: model.flows.iter().map(|f| f.name.clone()).collect(),
            auxiliaries: model.auxiliaries.iter().map(|a| a.name.clone()).collect(),
            connector_count: model.connectors.len(),
        }
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Model Summary:")?;
        writeln!(f, "Number of stocks: {}", self.stocks.len())?;
        writeln!(f, "Stocks: {}", self.stocks.join(", "))?;
        writeln!(f)?;
        writeln!(f, "Number of flows: {}", self.flows.len())?;
        writeln!(f, "Flows: {}", self.flows.join(", "))?;
        writeln!(f)?;
        writeln!(f, "Number of auxiliary variables: {}", self.auxiliaries.len())?;
        writeln!(f, "Auxiliaries: {}", self.auxiliaries.join(", "))?;
        writeln!(f)?;
        write!(f, "Number of connectors: {}", self.connector_count)
    }
}
