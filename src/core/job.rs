use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{NodeId, Timestamp};
use crate::error::{GanttError, GanttResult};

/// How a row's temporal data is drawn on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayType {
    #[default]
    Bar,
    Line,
    /// Bar fading in on the left and out on the right.
    Gradient,
    /// Bar fading out on the right, used for open-ended work.
    GradientRight,
}

impl DisplayType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Gradient => "gradient",
            Self::GradientRight => "gradient-right",
        }
    }
}

/// Fixed y range for a line series. Without it the series is min/max normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn validate(self) -> GanttResult<Self> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(GanttError::configuration(format!(
                "value range must be finite with min < max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(self)
    }
}

fn default_fill_enabled() -> bool {
    true
}

fn default_start_opacity() -> f64 {
    0.3
}

fn default_end_opacity() -> f64 {
    0.1
}

/// Gradient fill under a line series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineFill {
    #[serde(default = "default_fill_enabled")]
    pub enabled: bool,
    #[serde(default = "default_start_opacity")]
    pub start_opacity: f64,
    #[serde(default = "default_end_opacity")]
    pub end_opacity: f64,
}

impl Default for LineFill {
    fn default() -> Self {
        Self {
            enabled: default_fill_enabled(),
            start_opacity: default_start_opacity(),
            end_opacity: default_end_opacity(),
        }
    }
}

impl LineFill {
    pub fn validate(self) -> GanttResult<Self> {
        for (name, value) in [
            ("startOpacity", self.start_opacity),
            ("endOpacity", self.end_opacity),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(GanttError::configuration(format!(
                    "fill `{name}` must be finite and in [0, 1], got {value}"
                )));
            }
        }
        Ok(self)
    }
}

/// One job in the caller-owned hierarchy.
///
/// Fields the engine does not know about are kept in `fields`, in input
/// order, so color mapping and tooltips can address them by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub display_type: DisplayType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<Timestamp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_range: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<LineFill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<JobNode>>,
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

impl JobNode {
    #[must_use]
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
            label: None,
            start: None,
            end: None,
            status: None,
            color: None,
            display_type: DisplayType::Bar,
            dates: Vec::new(),
            values: Vec::new(),
            value_range: None,
            fill: None,
            children: None,
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_display_type(mut self, display_type: DisplayType) -> Self {
        self.display_type = display_type;
        self
    }

    #[must_use]
    pub fn with_series(mut self, dates: Vec<Timestamp>, values: Vec<f64>) -> Self {
        self.display_type = DisplayType::Line;
        self.dates = dates;
        self.values = values;
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<JobNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Copy of this node with its subtree left behind.
    #[must_use]
    pub fn without_children(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            label: self.label.clone(),
            start: self.start,
            end: self.end,
            status: self.status.clone(),
            color: self.color.clone(),
            display_type: self.display_type,
            dates: self.dates.clone(),
            values: self.values.clone(),
            value_range: self.value_range,
            fill: self.fill,
            children: None,
            fields: self.fields.clone(),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[JobNode] {
        self.children.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Looks up a field by its wire name. `null` counts as absent.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => serde_json::to_value(&self.id).ok(),
            "name" => Some(Value::String(self.name.clone())),
            "icon" => self.icon.clone().map(Value::String),
            "label" => self.label.clone().map(Value::String),
            "start" => self.start.map(|t| Value::String(t.to_string())),
            "end" => self.end.map(|t| Value::String(t.to_string())),
            "status" => self.status.clone().map(Value::String),
            "color" => self.color.clone().map(Value::String),
            "displayType" => Some(Value::String(self.display_type.as_str().to_owned())),
            "dates" => (!self.dates.is_empty()).then(|| {
                Value::Array(
                    self.dates
                        .iter()
                        .map(|date| Value::String(date.to_string()))
                        .collect(),
                )
            }),
            "values" => non_empty_json(&self.values),
            "valueRange" => self.value_range.and_then(|range| serde_json::to_value(range).ok()),
            "fill" => self.fill.and_then(|fill| serde_json::to_value(fill).ok()),
            "children" => non_empty_json(self.children()),
            _ => self.fields.get(name).cloned(),
        };
        value.filter(|value| !value.is_null())
    }

    /// Field value rendered for display: strings verbatim, everything else as JSON.
    #[must_use]
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.field(name).map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }
}

fn non_empty_json<T: Serialize>(items: &[T]) -> Option<Value> {
    if items.is_empty() {
        return None;
    }
    serde_json::to_value(items).ok()
}
