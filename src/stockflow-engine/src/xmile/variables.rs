// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::datamodel::{self, to_ident};
use crate::equation::EquationNormalizer;
use crate::xmile::{
    ToXml, XmlWriter, write_tag, write_tag_end, write_tag_start, write_tag_start_with_attrs,
};

fn write_optional_tag(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    content: &Option<String>,
) -> Result<()> {
    match content {
        Some(content) if !content.is_empty() => write_tag(writer, tag_name, content),
        _ => Ok(()),
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Stock {
    #[serde(rename = "@name")]
    pub name: String,
    pub doc: Option<String>,
    pub eqn: Option<String>,
    #[serde(rename = "inflow", default)]
    pub inflows: Vec<String>,
    #[serde(rename = "outflow", default)]
    pub outflows: Vec<String>,
    pub units: Option<String>,
}

impl ToXml<XmlWriter> for Stock {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = &[("name", self.name.as_str())];
        write_tag_start_with_attrs(writer, "stock", attrs)?;

        write_optional_tag(writer, "doc", &self.doc)?;
        write_optional_tag(writer, "eqn", &self.eqn)?;

        for inflow in self.inflows.iter() {
            write_tag(writer, "inflow", inflow)?;
        }
        for outflow in self.outflows.iter() {
            write_tag(writer, "outflow", outflow)?;
        }

        write_optional_tag(writer, "units", &self.units)?;

        write_tag_end(writer, "stock")
    }
}

impl From<&datamodel::Stock> for Stock {
    /// The initial value is written as given: stock equations are numeric
    /// literals and are not normalized.
    fn from(stock: &datamodel::Stock) -> Self {
        Stock {
            name: stock.name.clone(),
            doc: stock.documentation.clone(),
            eqn: stock.equation.clone(),
            inflows: stock.inflows.iter().map(|f| to_ident(f)).collect(),
            outflows: stock.outflows.iter().map(|f| to_ident(f)).collect(),
            units: stock.units.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Flow {
    #[serde(rename = "@name")]
    pub name: String,
    pub doc: Option<String>,
    pub eqn: Option<String>,
    pub units: Option<String>,
}

impl ToXml<XmlWriter> for Flow {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = &[("name", self.name.as_str())];
        write_tag_start_with_attrs(writer, "flow", attrs)?;

        write_optional_tag(writer, "doc", &self.doc)?;
        write_optional_tag(writer, "eqn", &self.eqn)?;
        write_optional_tag(writer, "units", &self.units)?;

        write_tag_end(writer, "flow")
    }
}

impl Flow {
    pub fn new(flow: &datamodel::Flow, normalizer: &EquationNormalizer) -> Self {
        Flow {
            name: flow.name.clone(),
            doc: flow.documentation.clone(),
            eqn: flow.equation.as_deref().map(|eqn| normalizer.normalize(eqn)),
            units: flow.units.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Aux {
    #[serde(rename = "@name")]
    pub name: String,
    pub doc: Option<String>,
    pub eqn: Option<String>,
    pub units: Option<String>,
}

impl ToXml<XmlWriter> for Aux {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = &[("name", self.name.as_str())];
        write_tag_start_with_attrs(writer, "aux", attrs)?;

        write_optional_tag(writer, "doc", &self.doc)?;
        write_optional_tag(writer, "eqn", &self.eqn)?;
        write_optional_tag(writer, "units", &self.units)?;

        write_tag_end(writer, "aux")
    }
}

impl Aux {
    pub fn new(aux: &datamodel::Aux, normalizer: &EquationNormalizer) -> Self {
        Aux {
            name: aux.name.clone(),
            doc: aux.documentation.clone(),
            eqn: aux.equation.as_deref().map(|eqn| normalizer.normalize(eqn)),
            units: aux.units.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Var {
    Stock(Stock),
    Flow(Flow),
    Aux(Aux),
}

impl Var {
    pub fn get_name(&self) -> &str {
        match self {
            Var::Stock(stock) => stock.name.as_str(),
            Var::Flow(flow) => flow.name.as_str(),
            Var::Aux(aux) => aux.name.as_str(),
        }
    }
}

impl ToXml<XmlWriter> for Var {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        match self {
            Var::Stock(stock) => stock.write_xml(writer),
            Var::Flow(flow) => flow.write_xml(writer),
            Var::Aux(aux) => aux.write_xml(writer),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Variables {
    #[serde(rename = "$value", default)]
    pub variables: Vec<Var>,
}

impl Variables {
    /// Stocks, then flows, then auxiliaries, each in declaration order.
    pub fn new(model: &datamodel::Model, normalizer: &EquationNormalizer) -> Self {
        let stocks = model.stocks.iter().map(|s| Var::Stock(Stock::from(s)));
        let flows = model
            .flows
            .iter()
            .map(|f| Var::Flow(Flow::new(f, normalizer)));
        let auxes = model
            .auxiliaries
            .iter()
            .map(|a| Var::Aux(Aux::new(a, normalizer)));

        Variables {
            variables: stocks.chain(flows).chain(auxes).collect(),
        }
    }
}

impl ToXml<XmlWriter> for Variables {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "variables")?;
        for var in self.variables.iter() {
            var.write_xml(writer)?;
        }
        write_tag_end(writer, "variables")
    }
}
