// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use tracing::debug;

use super::config::LayoutConfig;
use super::{
    AuxPlacement, ConnectorView, FlowPlacement, FlowPoint, Position, PositionTable,
    StockPlacement, emitted,
};
use crate::datamodel::{Aux, Connector, Flow, Scalar, Stock};

/// Place stocks row-major on the grid, in declaration order.
pub fn place_stocks(stocks: &[Stock], config: &LayoutConfig) -> Vec<StockPlacement> {
    let columns = config.stock_columns.max(1);
    stocks
        .iter()
        .enumerate()
        .map(|(i, stock)| {
            let col = (i % columns) as i64;
            let row = (i / columns) as i64;
            let position = Position::new(
                config.stock_start_x + col * config.stock_spacing_x,
                config.stock_start_y + row * config.stock_spacing_y,
            );
            StockPlacement {
                name: stock.name.clone(),
                position,
                x: emitted(&stock.hint.x, position.x),
                y: emitted(&stock.hint.y, position.y),
            }
        })
        .collect()
}

/// Place each flow relative to the stock it drains and the stock it fills.
/// The first stock in declaration order listing the flow wins on each side.
pub fn place_flows(
    flows: &[Flow],
    stocks: &[Stock],
    placed_stocks: &[StockPlacement],
    config: &LayoutConfig,
) -> Vec<FlowPlacement> {
    let stock_positions = PositionTable::from_stocks(placed_stocks);

    flows
        .iter()
        .enumerate()
        .map(|(i, flow)| {
            let source = located(
                stocks.iter().find(|s| s.outflows.contains(&flow.name)),
                &stock_positions,
            );
            let target = located(
                stocks.iter().find(|s| s.inflows.contains(&flow.name)),
                &stock_positions,
            );

            let position = match (&source, &target) {
                (Some((_, from)), Some((_, to))) => from.midpoint(to),
                (None, Some((_, to))) => to.offset(-config.flow_stock_offset, 0),
                (Some((_, from)), None) => from.offset(config.flow_stock_offset, 0),
                (None, None) => {
                    debug!(flow = %flow.name, "flow is attached to no stock");
                    Position::new(
                        config.orphan_flow_start_x + i as i64 * config.orphan_flow_spacing,
                        config.orphan_flow_y,
                    )
                }
            };

            let x = emitted(&flow.hint.x, position.x);
            let y = emitted(&flow.hint.y, position.y);

            // pipe endpoints follow the emitted x; an unusable x hint
            // collapses them around zero
            let center = x.as_f64().unwrap_or_else(|| {
                debug!(flow = %flow.name, x = %x, "non-numeric x hint for flow");
                0.0
            });
            let points = [
                FlowPoint {
                    x: center - config.flow_pipe_half_length,
                    y: y.clone(),
                },
                FlowPoint {
                    x: center + config.flow_pipe_half_length,
                    y: y.clone(),
                },
            ];

            FlowPlacement {
                name: flow.name.clone(),
                position,
                x,
                y,
                source: source.map(|(name, _)| name),
                target: target.map(|(name, _)| name),
                points,
            }
        })
        .collect()
}

// stock positions are looked up by name, so with duplicate stock names the
// last one placed is the one flows attach to
fn located(stock: Option<&Stock>, positions: &PositionTable) -> Option<(String, Position)> {
    let stock = stock?;
    positions.get(&stock.name).map(|pos| (stock.name.clone(), pos))
}

/// Stack each auxiliary above the target of its first outgoing connector.
///
/// `positions` must already hold every stock and flow.  Each placed
/// auxiliary is added to it, so a later auxiliary can sit above an
/// earlier one.
pub fn place_auxiliaries(
    auxiliaries: &[Aux],
    connectors: &[Connector],
    mut positions: PositionTable,
    config: &LayoutConfig,
) -> Vec<AuxPlacement> {
    // auxiliaries without any outgoing connector share the `None` stack
    let mut stacked: HashMap<Option<&str>, i64> = HashMap::new();

    auxiliaries
        .iter()
        .enumerate()
        .map(|(i, aux)| {
            let target = connectors
                .iter()
                .find(|c| c.src == aux.name)
                .map(|c| c.tgt.as_str());

            let base = match target.and_then(|t| positions.get(t)) {
                Some(pos) => pos,
                None => {
                    debug!(aux = %aux.name, target = ?target, "auxiliary target has no position");
                    Position::new(
                        config.orphan_aux_start_x + i as i64 * config.orphan_aux_spacing,
                        config.orphan_aux_y,
                    )
                }
            };

            let count = stacked.entry(target).or_insert(0);
            let offset = *count;
            *count += 1;

            let position = base.offset(0, -config.aux_lift - config.aux_stack_spacing * offset);
            positions.insert(&aux.name, position);

            AuxPlacement {
                name: aux.name.clone(),
                position,
                x: emitted(&aux.hint.x, position.x),
                y: emitted(&aux.hint.y, position.y),
                target: target.map(str::to_owned),
                offset,
            }
        })
        .collect()
}

/// Number connectors from 1 in declaration order.  Endpoints are not
/// checked against the declared variables.
pub fn number_connectors(connectors: &[Connector]) -> Vec<ConnectorView> {
    connectors
        .iter()
        .enumerate()
        .map(|(i, c)| ConnectorView {
            uid: i as i32 + 1,
            from: c.src.clone(),
            to: c.tgt.clone(),
            angle: c.angle.clone().unwrap_or_else(|| Scalar::from("0")),
        })
        .collect()
}
