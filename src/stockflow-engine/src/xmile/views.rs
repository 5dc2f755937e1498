// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::layout::Layout;
use crate::xmile::{ToXml, XmlWriter, write_tag_end, write_tag_start};

pub mod view_element {
    use super::*;
    use crate::layout::{AuxPlacement, ConnectorView, FlowPlacement, FlowPoint, StockPlacement};
    use crate::xmile::{
        format_float, write_tag_start_with_attrs, write_tag_text, write_tag_with_attrs,
    };

    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Stock {
        #[serde(rename = "@name")]
        pub name: String,
        #[serde(rename = "@x")]
        pub x: String,
        #[serde(rename = "@y")]
        pub y: String,
    }

    impl ToXml<XmlWriter> for Stock {
        fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
            let attrs = &[
                ("name", self.name.as_str()),
                ("x", self.x.as_str()),
                ("y", self.y.as_str()),
            ];
            write_tag_with_attrs(writer, "stock", "", attrs)
        }
    }

    impl From<&StockPlacement> for Stock {
        fn from(stock: &StockPlacement) -> Self {
            Stock {
                name: stock.name.clone(),
                x: stock.x.to_string(),
                y: stock.y.to_string(),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Point {
        #[serde(rename = "@x")]
        pub x: String,
        #[serde(rename = "@y")]
        pub y: String,
    }

    impl From<&FlowPoint> for Point {
        fn from(point: &FlowPoint) -> Self {
            Point {
                x: format_float(point.x),
                y: point.y.to_string(),
            }
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Points {
        #[serde(rename = "pt", default)]
        pub points: Vec<Point>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Flow {
        #[serde(rename = "@name")]
        pub name: String,
        #[serde(rename = "@x")]
        pub x: String,
        #[serde(rename = "@y")]
        pub y: String,
        #[serde(rename = "pts", default)]
        pub points: Points,
    }

    impl ToXml<XmlWriter> for Flow {
        fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
            let attrs = &[
                ("name", self.name.as_str()),
                ("x", self.x.as_str()),
                ("y", self.y.as_str()),
            ];
            write_tag_start_with_attrs(writer, "flow", attrs)?;

            if !self.points.points.is_empty() {
                write_tag_start(writer, "pts")?;
                for point in self.points.points.iter() {
                    let attrs = &[("x", point.x.as_str()), ("y", point.y.as_str())];
                    write_tag_with_attrs(writer, "pt", "", attrs)?;
                }
                write_tag_end(writer, "pts")?;
            }

            write_tag_end(writer, "flow")
        }
    }

    impl From<&FlowPlacement> for Flow {
        fn from(flow: &FlowPlacement) -> Self {
            Flow {
                name: flow.name.clone(),
                x: flow.x.to_string(),
                y: flow.y.to_string(),
                points: Points {
                    points: flow.points.iter().map(Point::from).collect(),
                },
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Aux {
        #[serde(rename = "@name")]
        pub name: String,
        #[serde(rename = "@x")]
        pub x: String,
        #[serde(rename = "@y")]
        pub y: String,
    }

    impl ToXml<XmlWriter> for Aux {
        fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
            let attrs = &[
                ("name", self.name.as_str()),
                ("x", self.x.as_str()),
                ("y", self.y.as_str()),
            ];
            write_tag_with_attrs(writer, "aux", "", attrs)
        }
    }

    impl From<&AuxPlacement> for Aux {
        fn from(aux: &AuxPlacement) -> Self {
            Aux {
                name: aux.name.clone(),
                x: aux.x.to_string(),
                y: aux.y.to_string(),
            }
        }
    }

    /// A causal connector.  Endpoints are variable names exactly as
    /// declared, spaces included.
    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
    pub struct Link {
        #[serde(rename = "@uid")]
        pub uid: i32,
        #[serde(rename = "@angle")]
        pub angle: String,
        pub from: String,
        pub to: String,
    }

    impl ToXml<XmlWriter> for Link {
        fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
            let uid = format!("{}", self.uid);
            let attrs = &[("uid", uid.as_str()), ("angle", self.angle.as_str())];
            write_tag_start_with_attrs(writer, "connector", attrs)?;

            write_tag_start(writer, "from")?;
            write_tag_text(writer, &self.from)?;
            write_tag_end(writer, "from")?;

            write_tag_start(writer, "to")?;
            write_tag_text(writer, &self.to)?;
            write_tag_end(writer, "to")?;

            write_tag_end(writer, "connector")
        }
    }

    impl From<&ConnectorView> for Link {
        fn from(connector: &ConnectorView) -> Self {
            Link {
                uid: connector.uid,
                angle: connector.angle.to_string(),
                from: connector.from.clone(),
                to: connector.to.clone(),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewObject {
    Stock(view_element::Stock),
    Flow(view_element::Flow),
    Aux(view_element::Aux),
    #[serde(rename = "connector")]
    Link(view_element::Link),
}

impl ToXml<XmlWriter> for ViewObject {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        match self {
            ViewObject::Stock(stock) => stock.write_xml(writer),
            ViewObject::Flow(flow) => flow.write_xml(writer),
            ViewObject::Aux(aux) => aux.write_xml(writer),
            ViewObject::Link(link) => link.write_xml(writer),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct View {
    #[serde(rename = "$value", default)]
    pub objects: Vec<ViewObject>,
}

impl ToXml<XmlWriter> for View {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "view")?;
        for object in self.objects.iter() {
            object.write_xml(writer)?;
        }
        write_tag_end(writer, "view")
    }
}

/// Connectors first, then stocks, flows and auxiliaries.
impl From<&Layout> for View {
    fn from(layout: &Layout) -> Self {
        let links = layout
            .connectors
            .iter()
            .map(|c| ViewObject::Link(c.into()));
        let stocks = layout.stocks.iter().map(|s| ViewObject::Stock(s.into()));
        let flows = layout.flows.iter().map(|f| ViewObject::Flow(f.into()));
        let auxes = layout.auxiliaries.iter().map(|a| ViewObject::Aux(a.into()));

        View {
            objects: links.chain(stocks).chain(flows).chain(auxes).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Views {
    #[serde(default)]
    pub view: Vec<View>,
}

impl ToXml<XmlWriter> for Views {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "views")?;
        for view in self.view.iter() {
            view.write_xml(writer)?;
        }
        write_tag_end(writer, "views")
    }
}

impl From<&Layout> for Views {
    fn from(layout: &Layout) -> Self {
        Views {
            view: vec![View::from(layout)],
        }
    }
}
