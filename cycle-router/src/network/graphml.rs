//! OSMnx GraphML loader.
//!
//! Reads the GraphML export of an attributed street network. Attribute
//! values arrive as strings keyed through `<key>` declarations; the ones the
//! planner needs are mapped onto [`RoadNode`] and [`RoadEdge`], the rest
//! are ignored.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use geo::LineString;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use wkt::TryFromWkt;

use crate::domain::{EdgeKey, NodeId, RoadEdge, RoadNode};

use super::error::NetworkError;
use super::graph::{RoadNetwork, RoadNetworkBuilder};

/// Load a road network from a GraphML file.
pub fn load_graphml(path: impl AsRef<Path>) -> Result<RoadNetwork, NetworkError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path).map_err(|source| NetworkError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let network = parse_graphml(&xml)?;
    tracing::info!(
        path = %path.display(),
        nodes = network.node_count(),
        edges = network.edge_count(),
        "loaded road network"
    );
    Ok(network)
}

/// Parse a road network from GraphML text.
///
/// # Errors
///
/// Returns `Xml` for malformed XML and `InvalidGraph` for nodes without a
/// position, edges without a length, or ids that are not integers.
pub fn parse_graphml(xml: &str) -> Result<RoadNetwork, NetworkError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut keys: HashMap<String, String> = HashMap::new();
    let mut builder = RoadNetwork::builder();
    let mut undirected = false;
    let mut pending: Option<Element> = None;
    let mut data: Option<(String, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            NetworkError::Xml(format!("at byte {}: {e}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"key" => declare_key(&e, &mut keys)?,
                b"graph" => undirected = is_undirected(&e)?,
                b"node" => pending = Some(Element::node(&e)?),
                b"edge" => pending = Some(Element::edge(&e)?),
                b"data" => {
                    if let Some(key) = attribute(&e, "key")? {
                        data = Some((key, String::new()));
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"key" => declare_key(&e, &mut keys)?,
                b"node" => Element::node(&e)?.finish(&mut builder, undirected)?,
                b"edge" => Element::edge(&e)?.finish(&mut builder, undirected)?,
                _ => {}
            },
            Event::Text(t) => {
                if let Some((_, text)) = data.as_mut() {
                    text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"data" => {
                    if let (Some((key, text)), Some(element)) = (data.take(), pending.as_mut()) {
                        if let Some(name) = keys.get(&key) {
                            element.attrs.insert(name.clone(), text);
                        }
                    }
                }
                b"node" | b"edge" => {
                    if let Some(element) = pending.take() {
                        element.finish(&mut builder, undirected)?;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    builder.build()
}

/// A `<node>` or `<edge>` whose `<data>` children are being collected.
#[derive(Debug)]
struct Element {
    kind: ElementKind,
    attrs: HashMap<String, String>,
}

#[derive(Debug)]
enum ElementKind {
    Node {
        id: String,
    },
    Edge {
        source: String,
        target: String,
        key: Option<String>,
    },
}

impl Element {
    fn node(e: &BytesStart<'_>) -> Result<Self, NetworkError> {
        let id = required_attribute(e, "id", "node")?;
        Ok(Self {
            kind: ElementKind::Node { id },
            attrs: HashMap::new(),
        })
    }

    fn edge(e: &BytesStart<'_>) -> Result<Self, NetworkError> {
        Ok(Self {
            kind: ElementKind::Edge {
                source: required_attribute(e, "source", "edge")?,
                target: required_attribute(e, "target", "edge")?,
                key: attribute(e, "id")?,
            },
            attrs: HashMap::new(),
        })
    }

    fn finish(
        self,
        builder: &mut RoadNetworkBuilder,
        undirected: bool,
    ) -> Result<(), NetworkError> {
        match self.kind {
            ElementKind::Node { id } => {
                let id = parse_node_id(&id)?;
                let lon = required_number(&self.attrs, "x", || format!("node {id}"))?;
                let lat = required_number(&self.attrs, "y", || format!("node {id}"))?;

                builder.add_node(RoadNode {
                    id,
                    lon,
                    lat,
                    street_count: count(&self.attrs, "street_count"),
                    safety_score: score(&self.attrs, "safety_score"),
                    comfort_score: score(&self.attrs, "comfort_score"),
                });
            }
            ElementKind::Edge {
                source,
                target,
                key,
            } => {
                let from = parse_node_id(&source)?;
                let to = parse_node_id(&target)?;
                let key = match key {
                    Some(k) => k.trim().parse().map(EdgeKey).map_err(|_| {
                        NetworkError::InvalidGraph(format!(
                            "edge {from} -> {to} has non-integer key '{k}'"
                        ))
                    })?,
                    None => EdgeKey::default(),
                };
                let length =
                    required_number(&self.attrs, "length", || format!("edge {from} -> {to}"))?;

                let edge = RoadEdge {
                    key,
                    length,
                    highway: self.attrs.get("highway").map(|h| h.trim().to_string()),
                    safety_score: score(&self.attrs, "safety_score"),
                    comfort_score: score(&self.attrs, "comfort_score"),
                    casualty_count: count(&self.attrs, "casualty_count"),
                    geometry: geometry(&self.attrs),
                };

                if undirected && from != to {
                    builder.add_edge(to, from, edge.clone());
                }
                builder.add_edge(from, to, edge);
            }
        }
        Ok(())
    }
}

fn xml_error(e: impl std::fmt::Display) -> NetworkError {
    NetworkError::Xml(e.to_string())
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, NetworkError> {
    let Some(attr) = e.try_get_attribute(name).map_err(xml_error)? else {
        return Ok(None);
    };
    let value = attr.unescape_value().map_err(xml_error)?;
    Ok(Some(value.into_owned()))
}

fn required_attribute(
    e: &BytesStart<'_>,
    name: &str,
    element: &str,
) -> Result<String, NetworkError> {
    attribute(e, name)?.ok_or_else(|| {
        NetworkError::InvalidGraph(format!("<{element}> without a '{name}' attribute"))
    })
}

/// Record a `<key id=".." attr.name="..">` declaration for nodes and edges.
fn declare_key(e: &BytesStart<'_>, keys: &mut HashMap<String, String>) -> Result<(), NetworkError> {
    let domain = attribute(e, "for")?;
    if !matches!(domain.as_deref(), Some("node") | Some("edge") | Some("all")) {
        return Ok(());
    }
    if let (Some(id), Some(name)) = (attribute(e, "id")?, attribute(e, "attr.name")?) {
        keys.insert(id, name);
    }
    Ok(())
}

fn is_undirected(e: &BytesStart<'_>) -> Result<bool, NetworkError> {
    Ok(attribute(e, "edgedefault")?.as_deref() == Some("undirected"))
}

fn parse_node_id(raw: &str) -> Result<NodeId, NetworkError> {
    raw.trim()
        .parse()
        .map(NodeId)
        .map_err(|_| NetworkError::InvalidGraph(format!("node id '{raw}' is not an integer")))
}

fn number<T: FromStr>(attrs: &HashMap<String, String>, name: &str) -> Option<T> {
    attrs.get(name).and_then(|v| v.trim().parse().ok())
}

fn required_number(
    attrs: &HashMap<String, String>,
    name: &str,
    owner: impl FnOnce() -> String,
) -> Result<f64, NetworkError> {
    number::<f64>(attrs, name)
        .filter(|v| v.is_finite())
        .ok_or_else(|| NetworkError::InvalidGraph(format!("{} has no numeric '{name}'", owner())))
}

/// Optional score; unparsable or non-finite values count as absent.
fn score(attrs: &HashMap<String, String>, name: &str) -> Option<f64> {
    number::<f64>(attrs, name).filter(|v| v.is_finite())
}

/// Optional count; accepts `"3"` as well as `"3.0"`.
fn count(attrs: &HashMap<String, String>, name: &str) -> Option<u32> {
    number::<f64>(attrs, name)
        .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v.round() as u32)
}

fn geometry(attrs: &HashMap<String, String>) -> Option<LineString<f64>> {
    let raw = attrs.get("geometry")?;
    match LineString::<f64>::try_from_wkt_str(raw) {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparsable edge geometry");
            None
        }
    }
}
