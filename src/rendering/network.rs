//! Neural network activation view
//!
//! Draws the evaluation network as columns of neurons joined by connections
//! between neighbouring layers, then recolors it from each snapshot the AI
//! service returns.
//!
//! # Snapshot handling
//!
//! - A snapshot whose shape (layer count or any layer's neuron count) differs
//!   from what is drawn triggers a full relayout first.
//! - Neuron fill follows the activation through [`activation_color`].
//! - Every connection leaving a neuron is stroked from that neuron's weight
//!   through [`weight_stroke`]; neurons without a weight keep idle strokes.
//! - Missing or malformed snapshots are ignored; nothing is redrawn.

use crate::networking::protocol::NetworkSnapshot;
use crate::rendering::color_scale::{activation_color, weight_stroke};
use crate::rendering::svg::{Attr, SvgDocument};
use crate::rendering::theme::{Rgb, UiColors};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Neuron circle radius in pixels
pub const NEURON_RADIUS: f32 = 6.0;

/// Height reserved above the neurons for layer labels
const LABEL_BAND: f32 = 20.0;

/// Height reserved below the neurons for the evaluation line
const FOOTER_BAND: f32 = 20.0;

/// One column of the drawn network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    pub neurons: usize,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>, neurons: usize) -> Self {
        Self {
            name: name.into(),
            neurons,
        }
    }
}

/// Sequence of layer sizes, input first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkTopology {
    pub layers: Vec<LayerSpec>,
}

impl Default for NetworkTopology {
    fn default() -> Self {
        Self {
            layers: vec![
                LayerSpec::new("input", 10),
                LayerSpec::new("hidden1", 10),
                LayerSpec::new("hidden2", 10),
                LayerSpec::new("output", 1),
            ],
        }
    }
}

impl NetworkTopology {
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Self {
        Self {
            layers: snapshot
                .layers
                .iter()
                .enumerate()
                .map(|(i, layer)| {
                    let name = if layer.name.is_empty() {
                        format!("layer{}", i)
                    } else {
                        layer.name.clone()
                    };
                    LayerSpec::new(name, layer.neurons.len())
                })
                .collect(),
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.neurons).collect()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

/// What [`NetworkVisualization::apply_snapshot`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// Missing or malformed snapshot, nothing changed
    Ignored,
    /// Same topology, colors updated in place
    Recolored,
    /// Topology changed: laid out again, then recolored
    Relaid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeuronNode {
    pub x: f32,
    pub y: f32,
    pub fill: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// (layer, neuron) of the source
    pub from: (usize, usize),
    /// (layer, neuron) of the target, always in layer `from.0 + 1`
    pub to: (usize, usize),
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke: Rgb,
    pub width: f32,
}

/// Layered network view keyed on the last snapshot received
#[derive(Debug, Clone)]
pub struct NetworkVisualization {
    width: f32,
    height: f32,
    default_topology: NetworkTopology,
    topology: NetworkTopology,
    neurons: Vec<Vec<NeuronNode>>,
    connections: Vec<Connection>,
    last_snapshot: Option<NetworkSnapshot>,
    evaluation: Option<f32>,
    confidence: Option<f32>,
    thinking: bool,
    layout_count: u32,
}

impl NetworkVisualization {
    pub fn new(topology: NetworkTopology, width: f32, height: f32) -> Self {
        let mut viz = Self {
            width: width.max(1.0),
            height: height.max(1.0),
            default_topology: topology.clone(),
            topology,
            neurons: Vec::new(),
            connections: Vec::new(),
            last_snapshot: None,
            evaluation: None,
            confidence: None,
            thinking: false,
            layout_count: 0,
        };
        viz.render_empty();
        viz
    }

    /// Lay out the configured default topology, uncolored
    pub fn render_empty(&mut self) {
        self.topology = self.default_topology.clone();
        self.last_snapshot = None;
        self.evaluation = None;
        self.confidence = None;
        self.layout();
    }

    /// Recolor from a snapshot, relaying out first when its shape differs
    pub fn apply_snapshot(&mut self, snapshot: &NetworkSnapshot) -> SnapshotOutcome {
        if snapshot.layers.is_empty() {
            warn!("[VIZ] Ignoring empty network snapshot");
            return SnapshotOutcome::Ignored;
        }

        let outcome = if snapshot.shape() != self.topology.shape() {
            debug!(
                "[VIZ] Topology changed {:?} -> {:?}, relaying out",
                self.topology.shape(),
                snapshot.shape()
            );
            self.topology = NetworkTopology::from_snapshot(snapshot);
            self.layout();
            SnapshotOutcome::Relaid
        } else {
            SnapshotOutcome::Recolored
        };

        self.recolor(snapshot);
        self.last_snapshot = Some(snapshot.clone());
        outcome
    }

    /// Decode and apply a raw `network_states` value
    pub fn apply_value(&mut self, value: &Value) -> SnapshotOutcome {
        match NetworkSnapshot::from_value(value) {
            Some(snapshot) => self.apply_snapshot(&snapshot),
            None => {
                warn!("[VIZ] Ignoring missing or malformed network snapshot");
                SnapshotOutcome::Ignored
            }
        }
    }

    /// Recompute the layout for new dimensions and reapply the last snapshot
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.layout();
        if let Some(snapshot) = self.last_snapshot.clone() {
            self.recolor(&snapshot);
        }
    }

    pub fn set_evaluation(&mut self, evaluation: Option<f32>) {
        self.evaluation = evaluation;
    }

    pub fn evaluation(&self) -> Option<f32> {
        self.evaluation
    }

    /// Confidence of the last AI move, shown next to the evaluation
    pub fn set_confidence(&mut self, confidence: Option<f32>) {
        self.confidence = confidence;
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn set_thinking(&mut self, thinking: bool) {
        self.thinking = thinking;
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn neuron(&self, layer: usize, index: usize) -> Option<&NeuronNode> {
        self.neurons.get(layer)?.get(index)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, from: (usize, usize), to: (usize, usize)) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.from == from && c.to == to)
    }

    pub fn last_snapshot(&self) -> Option<&NetworkSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Number of full layouts performed so far
    pub fn layout_count(&self) -> u32 {
        self.layout_count
    }

    fn layout(&mut self) {
        let layer_count = self.topology.layer_count();
        let layer_spacing = self.width / (layer_count as f32 + 1.0);
        let usable = (self.height - LABEL_BAND - FOOTER_BAND).max(1.0);

        self.neurons = self
            .topology
            .layers
            .iter()
            .enumerate()
            .map(|(l, spec)| {
                let x = (l as f32 + 1.0) * layer_spacing;
                let spacing = usable / (spec.neurons as f32 + 1.0);
                (0..spec.neurons)
                    .map(|n| NeuronNode {
                        x,
                        y: LABEL_BAND + (n as f32 + 1.0) * spacing,
                        fill: UiColors::NEURON_IDLE,
                    })
                    .collect()
            })
            .collect();

        self.connections.clear();
        for l in 0..layer_count.saturating_sub(1) {
            for (from, a) in self.neurons[l].iter().enumerate() {
                for (to, b) in self.neurons[l + 1].iter().enumerate() {
                    self.connections.push(Connection {
                        from: (l, from),
                        to: (l + 1, to),
                        x1: a.x,
                        y1: a.y,
                        x2: b.x,
                        y2: b.y,
                        stroke: UiColors::CONNECTION_IDLE,
                        width: 1.0,
                    });
                }
            }
        }

        self.layout_count += 1;
    }

    fn recolor(&mut self, snapshot: &NetworkSnapshot) {
        for (l, layer) in snapshot.layers.iter().enumerate() {
            for (n, neuron) in layer.neurons.iter().enumerate() {
                if let Some(node) = self.neurons.get_mut(l).and_then(|row| row.get_mut(n)) {
                    node.fill = activation_color(neuron.activation);
                }
            }
        }

        for connection in &mut self.connections {
            let (l, n) = connection.from;
            let weight = snapshot
                .layers
                .get(l)
                .and_then(|layer| layer.neurons.get(n))
                .and_then(|neuron| neuron.weight);
            let (stroke, width) = match weight {
                Some(w) => weight_stroke(w),
                None => (UiColors::CONNECTION_IDLE, 1.0),
            };
            connection.stroke = stroke;
            connection.width = width;
        }
    }

    /// Serialize the current view; connections are drawn behind neurons
    pub fn to_svg(&self) -> String {
        let mut doc = SvgDocument::new(self.width, self.height);

        doc.begin_group(&[("class", "connections".into())]);
        for c in &self.connections {
            doc.element(
                "line",
                &[
                    ("x1", c.x1.into()),
                    ("y1", c.y1.into()),
                    ("x2", c.x2.into()),
                    ("y2", c.y2.into()),
                    ("stroke", c.stroke.hex().into()),
                    ("stroke-opacity", Attr::Num(0.6)),
                    ("stroke-width", c.width.into()),
                ],
            );
        }
        doc.end_group();

        doc.begin_group(&[("class", "neurons".into())]);
        for (l, layer) in self.neurons.iter().enumerate() {
            for (n, node) in layer.iter().enumerate() {
                let class = format!("layer-{} neuron-{}", l, n);
                let mut attrs = vec![
                    ("cx", Attr::Num(node.x)),
                    ("cy", Attr::Num(node.y)),
                    ("r", Attr::Num(NEURON_RADIUS)),
                    ("fill", node.fill.hex().into()),
                    ("stroke", UiColors::TEXT.hex().into()),
                    ("stroke-width", Attr::Num(0.5)),
                    ("class", class.into()),
                ];
                if self.thinking {
                    attrs.push(("opacity", Attr::Num(0.8)));
                }
                doc.element("circle", &attrs);
            }
        }
        doc.end_group();

        doc.begin_group(&[
            ("class", "labels".into()),
            ("font-family", "sans-serif".into()),
            ("font-size", "12".into()),
            ("text-anchor", "middle".into()),
            ("fill", UiColors::TEXT.hex().into()),
        ]);
        for (spec, layer) in self.topology.layers.iter().zip(&self.neurons) {
            let x = layer.first().map(|node| node.x).unwrap_or(0.0);
            doc.text_element("text", &[("x", x.into()), ("y", Attr::Num(14.0))], &spec.name);
        }
        let footer = match (self.thinking, self.evaluation, self.confidence) {
            (true, _, _) => "Thinking...".to_string(),
            (false, Some(eval), Some(conf)) => {
                format!("Evaluation: {:+.2}  Confidence: {:.2}", eval, conf)
            }
            (false, Some(eval), None) => format!("Evaluation: {:+.2}", eval),
            (false, None, _) => String::new(),
        };
        if !footer.is_empty() {
            doc.text_element(
                "text",
                &[
                    ("x", Attr::Num(self.width / 2.0)),
                    ("y", Attr::Num(self.height - 6.0)),
                ],
                &footer,
            );
        }
        doc.end_group();

        doc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networking::protocol::{LayerState, NeuronState};

    fn snapshot(shape: &[usize], activation: f32, weight: Option<f32>) -> NetworkSnapshot {
        NetworkSnapshot {
            layers: shape
                .iter()
                .enumerate()
                .map(|(l, &count)| LayerState {
                    name: format!("l{}", l),
                    neurons: (0..count)
                        .map(|n| NeuronState {
                            id: n as u32,
                            activation,
                            weight,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_render_uses_default_topology() {
        let viz = NetworkVisualization::new(NetworkTopology::default(), 600.0, 400.0);
        assert_eq!(viz.topology().shape(), vec![10, 10, 10, 1]);
        assert_eq!(viz.connections().len(), 10 * 10 + 10 * 10 + 10);
        assert_eq!(viz.neuron(0, 0).unwrap().fill, UiColors::NEURON_IDLE);
        assert_eq!(viz.layout_count(), 1);
    }

    #[test]
    fn test_same_shape_recolors_without_relayout() {
        let mut viz = NetworkVisualization::new(NetworkTopology::default(), 600.0, 400.0);
        let outcome = viz.apply_snapshot(&snapshot(&[10, 10, 10, 1], 1.0, Some(0.5)));

        assert_eq!(outcome, SnapshotOutcome::Recolored);
        assert_eq!(viz.layout_count(), 1);
        assert_eq!(viz.neuron(3, 0).unwrap().fill, activation_color(1.0));
        let c = viz.connection((0, 0), (1, 9)).unwrap();
        assert_eq!((c.stroke, c.width), weight_stroke(0.5));
    }

    #[test]
    fn test_missing_weight_keeps_idle_stroke() {
        let mut viz = NetworkVisualization::new(NetworkTopology::default(), 600.0, 400.0);
        viz.apply_snapshot(&snapshot(&[10, 10, 10, 1], 0.0, None));
        let c = viz.connection((2, 3), (3, 0)).unwrap();
        assert_eq!(c.stroke, UiColors::CONNECTION_IDLE);
    }

    #[test]
    fn test_resize_keeps_colors() {
        let mut viz = NetworkVisualization::new(NetworkTopology::default(), 600.0, 400.0);
        viz.apply_snapshot(&snapshot(&[10, 10, 10, 1], -1.0, Some(-1.0)));
        viz.resize(300.0, 200.0);

        assert_eq!(viz.dimensions(), (300.0, 200.0));
        assert_eq!(viz.neuron(0, 0).unwrap().x, 60.0);
        assert_eq!(viz.neuron(1, 4).unwrap().fill, activation_color(-1.0));
    }

    #[test]
    fn test_malformed_value_is_ignored() {
        let mut viz = NetworkVisualization::new(NetworkTopology::default(), 600.0, 400.0);
        let before = viz.to_svg();
        assert_eq!(
            viz.apply_value(&serde_json::json!("garbage")),
            SnapshotOutcome::Ignored
        );
        assert_eq!(viz.to_svg(), before);
    }

    #[test]
    fn test_svg_contains_every_neuron() {
        let viz = NetworkVisualization::new(NetworkTopology::default(), 600.0, 400.0);
        let svg = viz.to_svg();
        assert_eq!(svg.matches("<circle").count(), 31);
        assert!(svg.contains(">hidden1</text>"));
    }
}
