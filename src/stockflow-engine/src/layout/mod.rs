// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Default diagram layout for models that arrive without (complete)
//! coordinates.
//!
//! Layout runs as three ordered stages: stocks are placed on a fixed grid,
//! flows are placed relative to the stocks they drain and fill, and
//! auxiliaries are stacked above whatever their first outgoing connector
//! points at.  Each stage reads the positions produced by the stages
//! before it.
//!
//! A variable's own `x`/`y` hint always wins for the *emitted* coordinate,
//! but later stages route against the derived position.  For stocks this
//! means a hinted stock is drawn at its hint while its flows are still
//! placed relative to its grid cell.

pub mod config;
mod placement;

use std::collections::HashMap;

use crate::datamodel::{self, Scalar};

use self::config::LayoutConfig;
pub use self::placement::{number_connectors, place_auxiliaries, place_flows, place_stocks};

/// An integral diagram position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Position { x, y }
    }

    /// Floor midpoint on each axis.
    pub fn midpoint(&self, other: &Position) -> Position {
        Position {
            x: (self.x + other.x).div_euclid(2),
            y: (self.y + other.y).div_euclid(2),
        }
    }

    pub fn offset(&self, dx: i64, dy: i64) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Derived positions by variable name.  Later insertions of the same name
/// replace earlier ones.
#[derive(Clone, Debug, Default)]
pub struct PositionTable {
    positions: HashMap<String, Position>,
}

impl PositionTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_stocks(stocks: &[StockPlacement]) -> Self {
        let mut table = PositionTable::new();
        table.extend_stocks(stocks);
        table
    }

    pub fn extend_stocks(&mut self, stocks: &[StockPlacement]) {
        for stock in stocks.iter() {
            self.insert(&stock.name, stock.position);
        }
    }

    pub fn extend_flows(&mut self, flows: &[FlowPlacement]) {
        for flow in flows.iter() {
            self.insert(&flow.name, flow.position);
        }
    }

    pub fn insert(&mut self, name: &str, position: Position) {
        self.positions.insert(name.to_owned(), position);
    }

    pub fn get(&self, name: &str) -> Option<Position> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StockPlacement {
    pub name: String,
    /// Grid cell; what flows are routed against.
    pub position: Position,
    pub x: Scalar,
    pub y: Scalar,
}

/// One end of a flow pipe.  `y` is carried as text: it is the flow's
/// emitted y, which may be a non-numeric hint.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowPoint {
    pub x: f64,
    pub y: Scalar,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowPlacement {
    pub name: String,
    pub position: Position,
    pub x: Scalar,
    pub y: Scalar,
    /// Stock this flow drains, if any stock lists it as an outflow.
    pub source: Option<String>,
    /// Stock this flow fills, if any stock lists it as an inflow.
    pub target: Option<String>,
    pub points: [FlowPoint; 2],
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuxPlacement {
    pub name: String,
    pub position: Position,
    pub x: Scalar,
    pub y: Scalar,
    /// Target of the auxiliary's first outgoing connector.
    pub target: Option<String>,
    /// How many auxiliaries were stacked on the same target before this one.
    pub offset: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectorView {
    pub uid: i32,
    pub from: String,
    pub to: String,
    pub angle: Scalar,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    pub stocks: Vec<StockPlacement>,
    pub flows: Vec<FlowPlacement>,
    pub auxiliaries: Vec<AuxPlacement>,
    pub connectors: Vec<ConnectorView>,
}

impl Layout {
    pub fn get_stock(&self, name: &str) -> Option<&StockPlacement> {
        self.stocks.iter().find(|s| s.name == name)
    }

    pub fn get_flow(&self, name: &str) -> Option<&FlowPlacement> {
        self.flows.iter().find(|f| f.name == name)
    }

    pub fn get_aux(&self, name: &str) -> Option<&AuxPlacement> {
        self.auxiliaries.iter().find(|a| a.name == name)
    }
}

/// The coordinate to draw: the caller's hint when present, otherwise the
/// derived value.
pub(crate) fn emitted(hint: &Option<Scalar>, derived: i64) -> Scalar {
    match hint {
        Some(hint) => hint.clone(),
        None => Scalar::from(derived),
    }
}

/// Lay out every variable and connector of `model`.  Never fails: dangling
/// references and malformed hints fall back to fixed default positions.
pub fn generate_layout(model: &datamodel::Model, config: &LayoutConfig) -> Layout {
    let stocks = place_stocks(&model.stocks, config);
    let flows = place_flows(&model.flows, &model.stocks, &stocks, config);

    let mut table = PositionTable::from_stocks(&stocks);
    table.extend_flows(&flows);
    let auxiliaries = place_auxiliaries(&model.auxiliaries, &model.connectors, table, config);

    let connectors = number_connectors(&model.connectors);

    Layout {
        stocks,
        flows,
        auxiliaries,
        connectors,
    }
}
