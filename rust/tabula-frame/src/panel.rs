//! Stacked tables: three-dimensional panels and four-dimensional panels of
//! panels.

use std::{collections::BTreeMap, fmt};

use tabula_common::{Result, error::Error};

use crate::{frame::DataFrame, index::Index, label::Label};

/// Named axes of a stacked table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAxis {
    /// Outermost axis of a [`Panel4D`].
    Labels,
    /// Layer axis of a [`Panel`].
    Items,
    /// Row axis of every table.
    MajorAxis,
    /// Column axis of every table.
    MinorAxis,
}

impl PanelAxis {
    pub const SHARED: [PanelAxis; 3] = [
        PanelAxis::Items,
        PanelAxis::MajorAxis,
        PanelAxis::MinorAxis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PanelAxis::Labels => "labels",
            PanelAxis::Items => "items",
            PanelAxis::MajorAxis => "major_axis",
            PanelAxis::MinorAxis => "minor_axis",
        }
    }
}

impl fmt::Display for PanelAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A collection of equally-shaped layers keyed by an outer index.
pub trait Stacked {
    type Layer;

    /// The index along `axis`, if this container has that axis.
    fn axis(&self, axis: PanelAxis) -> Option<&Index>;

    /// Keys of the layers, in layer order.
    fn layer_keys(&self) -> &Index;

    fn layer_at(&self, pos: usize) -> &Self::Layer;

    fn layer(&self, key: &Label) -> Option<&Self::Layer> {
        self.layer_keys().position(key).map(|pos| self.layer_at(pos))
    }
}

/// Items x major x minor: one [`DataFrame`] per item, all sharing the same
/// row (major) and column (minor) indexes.
#[derive(Clone, Debug)]
pub struct Panel {
    items: Index,
    major_axis: Index,
    minor_axis: Index,
    frames: Vec<DataFrame>,
}

impl Panel {
    pub fn new(items: Index, frames: Vec<DataFrame>) -> Result<Panel> {
        if items.len() != frames.len() {
            return Err(Error::invalid_arg(
                "items",
                format!("{} items for {} frames", items.len(), frames.len()),
            ));
        }
        let (major_axis, minor_axis) = match frames.first() {
            Some(first) => (first.index().clone(), first.columns().clone()),
            None => (Index::range(0), Index::range(0)),
        };
        for (pos, frame) in frames.iter().enumerate() {
            if !frame.index().equals(&major_axis) || !frame.columns().equals(&minor_axis) {
                return Err(Error::invalid_arg(
                    "frames",
                    format!("axes of item {} differ from the first item", items.label(pos)),
                ));
            }
        }
        Ok(Panel {
            items,
            major_axis,
            minor_axis,
            frames,
        })
    }

    /// Builds a panel whose items are the map keys, in key order.
    pub fn from_frames(frames: BTreeMap<Label, DataFrame>) -> Result<Panel> {
        let items = Index::new(frames.keys().cloned().collect(), None);
        Panel::new(items, frames.into_values().collect())
    }

    pub fn items(&self) -> &Index {
        &self.items
    }

    pub fn major_axis(&self) -> &Index {
        &self.major_axis
    }

    pub fn minor_axis(&self) -> &Index {
        &self.minor_axis
    }

    /// (items, major, minor) lengths.
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.items.len(),
            self.major_axis.len(),
            self.minor_axis.len(),
        )
    }

    pub fn frames(&self) -> &[DataFrame] {
        &self.frames
    }

    /// Mutable access to the item tables. Callers must keep cell edits within
    /// the existing axes.
    pub fn frames_mut(&mut self) -> &mut [DataFrame] {
        &mut self.frames
    }

    pub fn get(&self, item: &Label) -> Option<&DataFrame> {
        self.layer(item)
    }
}

impl Stacked for Panel {
    type Layer = DataFrame;

    fn axis(&self, axis: PanelAxis) -> Option<&Index> {
        match axis {
            PanelAxis::Labels => None,
            PanelAxis::Items => Some(&self.items),
            PanelAxis::MajorAxis => Some(&self.major_axis),
            PanelAxis::MinorAxis => Some(&self.minor_axis),
        }
    }

    fn layer_keys(&self) -> &Index {
        &self.items
    }

    fn layer_at(&self, pos: usize) -> &DataFrame {
        &self.frames[pos]
    }
}

/// Labels x items x major x minor: one [`Panel`] per label, all sharing the
/// same three inner axes.
#[derive(Clone, Debug)]
pub struct Panel4D {
    labels: Index,
    panels: Vec<Panel>,
}

impl Panel4D {
    pub fn new(labels: Index, panels: Vec<Panel>) -> Result<Panel4D> {
        if labels.len() != panels.len() {
            return Err(Error::invalid_arg(
                "labels",
                format!("{} labels for {} panels", labels.len(), panels.len()),
            ));
        }
        if let Some(first) = panels.first() {
            for (pos, panel) in panels.iter().enumerate() {
                let same = PanelAxis::SHARED.iter().all(|&axis| {
                    match (panel.axis(axis), first.axis(axis)) {
                        (Some(a), Some(b)) => a.equals(b),
                        _ => false,
                    }
                });
                if !same {
                    return Err(Error::invalid_arg(
                        "panels",
                        format!("axes of label {} differ from the first label", labels.label(pos)),
                    ));
                }
            }
        }
        Ok(Panel4D { labels, panels })
    }

    /// Builds a 4D panel whose labels are the map keys, in key order.
    pub fn from_panels(panels: BTreeMap<Label, Panel>) -> Result<Panel4D> {
        let labels = Index::new(panels.keys().cloned().collect(), None);
        Panel4D::new(labels, panels.into_values().collect())
    }

    pub fn labels(&self) -> &Index {
        &self.labels
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut [Panel] {
        &mut self.panels
    }

    pub fn get(&self, label: &Label) -> Option<&Panel> {
        self.layer(label)
    }
}

impl Stacked for Panel4D {
    type Layer = Panel;

    fn axis(&self, axis: PanelAxis) -> Option<&Index> {
        match axis {
            PanelAxis::Labels => Some(&self.labels),
            inner => self.panels.first().and_then(|p| p.axis(inner)),
        }
    }

    fn layer_keys(&self) -> &Index {
        &self.labels
    }

    fn layer_at(&self, pos: usize) -> &Panel {
        &self.panels[pos]
    }
}
