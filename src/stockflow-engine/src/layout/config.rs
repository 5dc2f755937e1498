// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

/// Constants for the heuristic grid layout.
///
/// All values are in diagram units.  Positions derived from these are
/// integral; only flow endpoint x coordinates are fractional.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
    // Stock grid
    /// Stocks per row before wrapping.
    pub stock_columns: usize,
    /// Horizontal distance between grid columns.
    pub stock_spacing_x: i64,
    /// Vertical distance between grid rows.
    pub stock_spacing_y: i64,
    /// Position of the first stock.
    pub stock_start_x: i64,
    pub stock_start_y: i64,

    // Flows
    /// Horizontal distance of a flow from its only connected stock.
    pub flow_stock_offset: i64,
    /// Fallback row for flows attached to no stock.
    pub orphan_flow_start_x: i64,
    pub orphan_flow_spacing: i64,
    pub orphan_flow_y: i64,
    /// Distance of each pipe endpoint from the flow valve.
    pub flow_pipe_half_length: f64,

    // Auxiliaries
    /// How far above its target an auxiliary is placed.
    pub aux_lift: i64,
    /// Extra lift for each additional auxiliary sharing a target.
    pub aux_stack_spacing: i64,
    /// Fallback row for auxiliaries whose target has no position.
    pub orphan_aux_start_x: i64,
    pub orphan_aux_spacing: i64,
    pub orphan_aux_y: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stock_columns: 4,
            stock_spacing_x: 300,
            stock_spacing_y: 200,
            stock_start_x: 400,
            stock_start_y: 400,
            flow_stock_offset: 100,
            orphan_flow_start_x: 100,
            orphan_flow_spacing: 150,
            orphan_flow_y: 500,
            flow_pipe_half_length: 60.0,
            aux_lift: 100,
            aux_stack_spacing: 30,
            orphan_aux_start_x: 100,
            orphan_aux_spacing: 200,
            orphan_aux_y: 700,
        }
    }
}
