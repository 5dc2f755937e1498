// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use stockflow_engine::xmile::{self, Var, ViewObject, view_element};
use stockflow_engine::{
    ErrorCode, ErrorKind, LayoutConfig, XmileOptions, convert_json, datamodel, json,
    write_xmile_file,
};

const POPULATION_MODEL: &str = r#"{
    "stocks": [
        {
            "name": "Population",
            "description": "People alive",
            "unit": "people",
            "eqn": 1000,
            "inflows": ["Birth Flow"],
            "outflows": ["Death Flow"]
        },
        {
            "name": "Cemetery",
            "eqn": "0",
            "inflows": ["Death Flow"],
            "outflows": null
        }
    ],
    "flows": [
        {"name": "Birth Flow", "eqn": "Population * Birth Rate", "unit": "people/year"},
        {"name": "Death Flow", "eqn": "Population / Average Lifetime"}
    ],
    "auxiliaries": [
        {"name": "Birth Rate", "eqn": "0.03", "description": ""},
        {"name": "Average Lifetime", "eqn": 70, "unit": "years"}
    ],
    "connectors": [
        {"src": "Birth Rate", "tgt": "Birth Flow"},
        {"src": "Population", "tgt": "Birth Flow"},
        {"src": "Average Lifetime", "tgt": "Death Flow", "angle": 135},
        {"src": "Population", "tgt": "Death Flow"}
    ]
}"#;

fn convert(json_str: &str) -> String {
    convert_json(json_str, &XmileOptions::default(), &LayoutConfig::default()).unwrap()
}

fn parse(xml: &str) -> xmile::File {
    quick_xml::de::from_str(xml).unwrap()
}

fn view_objects(file: &xmile::File) -> &[ViewObject] {
    &file.model.views.view[0].objects
}

fn view_stock<'a>(file: &'a xmile::File, name: &str) -> &'a view_element::Stock {
    view_objects(file)
        .iter()
        .find_map(|o| match o {
            ViewObject::Stock(s) if s.name == name => Some(s),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no stock view for {name}"))
}

fn view_flow<'a>(file: &'a xmile::File, name: &str) -> &'a view_element::Flow {
    view_objects(file)
        .iter()
        .find_map(|o| match o {
            ViewObject::Flow(f) if f.name == name => Some(f),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no flow view for {name}"))
}

fn view_aux<'a>(file: &'a xmile::File, name: &str) -> &'a view_element::Aux {
    view_objects(file)
        .iter()
        .find_map(|o| match o {
            ViewObject::Aux(a) if a.name == name => Some(a),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no aux view for {name}"))
}

fn links(file: &xmile::File) -> Vec<&view_element::Link> {
    view_objects(file)
        .iter()
        .filter_map(|o| match o {
            ViewObject::Link(l) => Some(l),
            _ => None,
        })
        .collect()
}

#[test]
fn population_model_document() {
    let xml = convert(POPULATION_MODEL);
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));

    let file = parse(&xml);
    assert_eq!("1.0", file.version);
    assert_eq!(
        Some("Converted System Dynamics Model".to_owned()),
        file.header.name
    );
    assert_eq!("0", file.sim_specs.start);
    assert_eq!("100", file.sim_specs.stop);
    assert_eq!("1/4", file.sim_specs.dt);

    let names: Vec<&str> = file
        .model
        .variables
        .variables
        .iter()
        .map(|v| v.get_name())
        .collect();
    assert_eq!(
        vec![
            "Population",
            "Cemetery",
            "Birth Flow",
            "Death Flow",
            "Birth Rate",
            "Average Lifetime"
        ],
        names
    );
}

#[test]
fn variables_carry_normalized_equations() {
    let file = parse(&convert(POPULATION_MODEL));
    let vars = &file.model.variables.variables;

    match &vars[0] {
        Var::Stock(stock) => {
            assert_eq!(Some("1000".to_owned()), stock.eqn);
            assert_eq!(Some("People alive".to_owned()), stock.doc);
            assert_eq!(Some("people".to_owned()), stock.units);
            assert_eq!(vec!["Birth_Flow".to_owned()], stock.inflows);
            assert_eq!(vec!["Death_Flow".to_owned()], stock.outflows);
        }
        other => panic!("expected a stock, got {other:?}"),
    }
    match &vars[1] {
        Var::Stock(stock) => {
            assert_eq!(Some("0".to_owned()), stock.eqn);
            assert!(stock.outflows.is_empty());
            assert_eq!(None, stock.units);
        }
        other => panic!("expected a stock, got {other:?}"),
    }
    match &vars[3] {
        Var::Flow(flow) => {
            assert_eq!(
                Some("Population / Average_Lifetime".to_owned()),
                flow.eqn
            );
        }
        other => panic!("expected a flow, got {other:?}"),
    }
    match &vars[2] {
        Var::Flow(flow) => {
            assert_eq!(Some("Population * Birth_Rate".to_owned()), flow.eqn);
            assert_eq!(Some("people/year".to_owned()), flow.units);
        }
        other => panic!("expected a flow, got {other:?}"),
    }
    match &vars[4] {
        Var::Aux(aux) => {
            assert_eq!(Some("0.03".to_owned()), aux.eqn);
            assert_eq!(None, aux.doc);
        }
        other => panic!("expected an aux, got {other:?}"),
    }
    match &vars[5] {
        Var::Aux(aux) => assert_eq!(Some("70".to_owned()), aux.eqn),
        other => panic!("expected an aux, got {other:?}"),
    }
}

#[test]
fn view_positions() {
    let file = parse(&convert(POPULATION_MODEL));

    let population = view_stock(&file, "Population");
    assert_eq!(("400", "400"), (population.x.as_str(), population.y.as_str()));
    let cemetery = view_stock(&file, "Cemetery");
    assert_eq!(("700", "400"), (cemetery.x.as_str(), cemetery.y.as_str()));

    // only an inflow of Population
    let births = view_flow(&file, "Birth Flow");
    assert_eq!(("300", "400"), (births.x.as_str(), births.y.as_str()));
    let pts: Vec<(&str, &str)> = births
        .points
        .points
        .iter()
        .map(|p| (p.x.as_str(), p.y.as_str()))
        .collect();
    assert_eq!(vec![("240.0", "400"), ("360.0", "400")], pts);

    // drains Population into Cemetery
    let deaths = view_flow(&file, "Death Flow");
    assert_eq!(("550", "400"), (deaths.x.as_str(), deaths.y.as_str()));
    assert_eq!("490.0", deaths.points.points[0].x);
    assert_eq!("610.0", deaths.points.points[1].x);

    let birth_rate = view_aux(&file, "Birth Rate");
    assert_eq!(("300", "300"), (birth_rate.x.as_str(), birth_rate.y.as_str()));
    let lifetime = view_aux(&file, "Average Lifetime");
    assert_eq!(("550", "300"), (lifetime.x.as_str(), lifetime.y.as_str()));
}

#[test]
fn connectors_numbered_in_order() {
    let file = parse(&convert(POPULATION_MODEL));
    let links = links(&file);

    assert_eq!(4, links.len());
    assert_eq!(vec![1, 2, 3, 4], links.iter().map(|l| l.uid).collect::<Vec<_>>());
    assert_eq!("Birth Rate", links[0].from);
    assert_eq!("Birth Flow", links[0].to);
    assert_eq!("0", links[0].angle);
    assert_eq!("135", links[2].angle);

    // connectors come before any variable in the view
    assert!(matches!(view_objects(&file)[3], ViewObject::Link(_)));
    assert!(matches!(view_objects(&file)[4], ViewObject::Stock(_)));
}

#[test]
fn connector_uids_ignore_endpoint_validity() {
    let file = parse(&convert(
        r#"{"connectors": [{"src": "A", "tgt": "B"}, {"src": "C", "tgt": "D"}]}"#,
    ));
    let links = links(&file);
    assert_eq!(2, links.len());
    assert_eq!((1, "A", "B"), (links[0].uid, links[0].from.as_str(), links[0].to.as_str()));
    assert_eq!((2, "C", "D"), (links[1].uid, links[1].from.as_str(), links[1].to.as_str()));
}

#[test]
fn five_stock_grid() {
    let stocks: Vec<String> = (0..5)
        .map(|i| format!("{{\"name\": \"Stock {i}\"}}"))
        .collect();
    let file = parse(&convert(&format!("{{\"stocks\": [{}]}}", stocks.join(","))));

    let stock0 = view_stock(&file, "Stock 0");
    assert_eq!(("400", "400"), (stock0.x.as_str(), stock0.y.as_str()));
    let stock3 = view_stock(&file, "Stock 3");
    assert_eq!(("1300", "400"), (stock3.x.as_str(), stock3.y.as_str()));
    let stock4 = view_stock(&file, "Stock 4");
    assert_eq!(("400", "600"), (stock4.x.as_str(), stock4.y.as_str()));
}

#[test]
fn orphan_flow_and_stacked_auxiliaries() {
    let file = parse(&convert(
        r#"{
            "stocks": [
                {"name": "A", "outflows": ["Transfer"]},
                {"name": "B", "inflows": ["Transfer"]}
            ],
            "flows": [
                {"name": "Transfer"},
                {"name": "Unused One"},
                {"name": "Unused Two"}
            ],
            "auxiliaries": [
                {"name": "Rate One"},
                {"name": "Rate Two"}
            ],
            "connectors": [
                {"src": "Rate One", "tgt": "Transfer"},
                {"src": "Rate Two", "tgt": "Transfer"}
            ]
        }"#,
    ));

    let orphan = view_flow(&file, "Unused Two");
    assert_eq!(("400", "500"), (orphan.x.as_str(), orphan.y.as_str()));

    let one = view_aux(&file, "Rate One");
    assert_eq!(("550", "300"), (one.x.as_str(), one.y.as_str()));
    let two = view_aux(&file, "Rate Two");
    assert_eq!(("550", "270"), (two.x.as_str(), two.y.as_str()));
}

#[test]
fn hints_override_emitted_positions() {
    let file = parse(&convert(
        r#"{
            "stocks": [
                {"name": "Tank", "x": 120, "y": "80", "outflows": ["Drain"]}
            ],
            "flows": [
                {"name": "Drain"},
                {"name": "Spill", "x": "wide", "y": 333}
            ],
            "auxiliaries": [
                {"name": "Valve", "x": 10.5}
            ],
            "connectors": [{"src": "Valve", "tgt": "Drain"}]
        }"#,
    ));

    let tank = view_stock(&file, "Tank");
    assert_eq!(("120", "80"), (tank.x.as_str(), tank.y.as_str()));

    // routed against the grid cell, not the hint
    let drain = view_flow(&file, "Drain");
    assert_eq!(("500", "400"), (drain.x.as_str(), drain.y.as_str()));

    let spill = view_flow(&file, "Spill");
    assert_eq!(("wide", "333"), (spill.x.as_str(), spill.y.as_str()));
    assert_eq!("-60.0", spill.points.points[0].x);
    assert_eq!("60.0", spill.points.points[1].x);
    assert_eq!("333", spill.points.points[1].y);

    let valve = view_aux(&file, "Valve");
    assert_eq!(("10.5", "300"), (valve.x.as_str(), valve.y.as_str()));
}

#[test]
fn stocks_only_document_is_complete() {
    let xml = convert(r#"{"stocks": [{"name": "Inventory", "eqn": "10"}]}"#);
    let file = parse(&xml);

    assert_eq!(1, file.model.variables.variables.len());
    assert_eq!(1, view_objects(&file).len());
    assert!(links(&file).is_empty());
    assert!(xml.contains("<views>"));
    assert!(xml.trim_end().ends_with("</xmile>"));
}

#[test]
fn empty_model_document_is_complete() {
    let xml = convert("{}");
    let file = parse(&xml);
    assert!(file.model.variables.variables.is_empty());
    assert_eq!(1, file.model.views.view.len());
    assert!(view_objects(&file).is_empty());
}

#[test]
fn special_characters_are_escaped() {
    let xml = convert(
        r#"{
            "auxiliaries": [
                {"name": "R&D Budget", "eqn": "Sales < 10 ? 1 : 2", "description": "\"quoted\""}
            ]
        }"#,
    );
    assert!(xml.contains("R&amp;D Budget"));
    assert!(xml.contains("Sales &lt; 10"));

    let file = parse(&xml);
    match &file.model.variables.variables[0] {
        Var::Aux(aux) => {
            assert_eq!("R&D Budget", aux.name);
            assert_eq!(Some("Sales < 10 ? 1 : 2".to_owned()), aux.eqn);
            assert_eq!(Some("\"quoted\"".to_owned()), aux.doc);
        }
        other => panic!("expected an aux, got {other:?}"),
    }
}

#[test]
fn custom_options() {
    let options = XmileOptions {
        model_name: "Bathtub".to_owned(),
        sim_specs: xmile::SimSpecs {
            start: "1".to_owned(),
            stop: "50".to_owned(),
            dt: "0.5".to_owned(),
        },
    };
    let layout_config = LayoutConfig {
        stock_columns: 1,
        ..LayoutConfig::default()
    };
    let xml = convert_json(
        r#"{"stocks": [{"name": "A"}, {"name": "B"}]}"#,
        &options,
        &layout_config,
    )
    .unwrap();
    let file = parse(&xml);

    assert_eq!(Some("Bathtub".to_owned()), file.header.name);
    assert_eq!(options.sim_specs, file.sim_specs);
    let b = view_stock(&file, "B");
    assert_eq!(("400", "600"), (b.x.as_str(), b.y.as_str()));
}

#[test]
fn malformed_json_is_an_import_error() {
    let err = convert_json(
        r#"{"stocks": [{"description": "no name"}]}"#,
        &XmileOptions::default(),
        &LayoutConfig::default(),
    )
    .unwrap_err();
    assert_eq!(ErrorKind::Import, err.kind);
    assert_eq!(ErrorCode::JsonDeserialization, err.code);

    let err = convert_json("not json", &XmileOptions::default(), &LayoutConfig::default())
        .unwrap_err();
    assert_eq!(ErrorCode::JsonDeserialization, err.code);
}

#[test]
fn write_file() {
    let model: json::Model = POPULATION_MODEL.parse().unwrap();
    let model = datamodel::Model::from(model);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Exported_SD_Model.xmile");
    write_xmile_file(&path, &model, &XmileOptions::default(), &LayoutConfig::default()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(convert(POPULATION_MODEL), contents);

    let err = write_xmile_file(
        &dir.path().join("missing").join("model.xmile"),
        &model,
        &XmileOptions::default(),
        &LayoutConfig::default(),
    )
    .unwrap_err();
    assert_eq!(ErrorKind::Io, err.kind);
    assert_eq!(ErrorCode::WriteFailed, err.code);
}
