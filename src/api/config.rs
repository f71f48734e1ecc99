use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{JobNode, TimeRange, TimeScale, Timestamp};
use crate::error::{GanttError, GanttResult};
use crate::resolve::{ColorMapping, TooltipFields};
use crate::state::{DEFAULT_COLUMN_WIDTH_PX, DEFAULT_LABEL_PANEL_WIDTH_PX, ExpandedRowsData};

fn default_title() -> String {
    "Jobs".to_owned()
}

fn default_column_width() -> f64 {
    DEFAULT_COLUMN_WIDTH_PX
}

fn default_max_height() -> Value {
    Value::String("80vh".to_owned())
}

fn default_color_mapping() -> Option<ColorMapping> {
    Some(ColorMapping::default())
}

fn default_min_bar_width_px() -> f64 {
    2.0
}

fn default_row_height_px() -> f64 {
    40.0
}

fn default_label_panel_width_px() -> f64 {
    DEFAULT_LABEL_PANEL_WIDTH_PX
}

/// Host-facing chart configuration, mirroring the widget props.
///
/// `maxHeight`, `styles` and `classNames` are carried through to the render
/// model untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttConfig {
    #[serde(default)]
    pub data: Vec<JobNode>,
    #[serde(default = "default_title")]
    pub title: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<Timestamp>,
    #[serde(default)]
    pub time_scale: TimeScale,
    #[serde(default = "default_column_width")]
    pub column_width: f64,
    #[serde(default = "default_max_height")]
    pub max_height: Value,
    /// `null` disables mapping; node colors and the default then apply.
    #[serde(default = "default_color_mapping")]
    pub color_mapping: Option<ColorMapping>,
    #[serde(default)]
    pub tooltip_fields: TooltipFields,
    #[serde(default)]
    pub expanded_rows_data: ExpandedRowsData,
    #[serde(default)]
    pub default_expanded: bool,
    #[serde(default = "default_min_bar_width_px")]
    pub min_bar_width_px: f64,
    #[serde(default = "default_row_height_px")]
    pub row_height_px: f64,
    #[serde(default = "default_label_panel_width_px")]
    pub label_panel_width_px: f64,
    #[serde(default)]
    pub styles: Value,
    #[serde(default, alias = "className")]
    pub class_names: Value,
}

impl GanttConfig {
    #[must_use]
    pub fn new(start_date: Timestamp, end_date: Timestamp) -> Self {
        Self {
            data: Vec::new(),
            title: default_title(),
            start_date,
            end_date,
            current_time: None,
            time_scale: TimeScale::default(),
            column_width: default_column_width(),
            max_height: default_max_height(),
            color_mapping: default_color_mapping(),
            tooltip_fields: TooltipFields::default(),
            expanded_rows_data: ExpandedRowsData::new(),
            default_expanded: false,
            min_bar_width_px: default_min_bar_width_px(),
            row_height_px: default_row_height_px(),
            label_panel_width_px: default_label_panel_width_px(),
            styles: Value::Null,
            class_names: Value::Null,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<JobNode>) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn with_time_scale(mut self, time_scale: TimeScale) -> Self {
        self.time_scale = time_scale;
        self
    }

    #[must_use]
    pub fn with_current_time(mut self, current_time: Timestamp) -> Self {
        self.current_time = Some(current_time);
        self
    }

    #[must_use]
    pub fn with_column_width(mut self, column_width: f64) -> Self {
        self.column_width = column_width;
        self
    }

    #[must_use]
    pub fn with_color_mapping(mut self, color_mapping: Option<ColorMapping>) -> Self {
        self.color_mapping = color_mapping;
        self
    }

    #[must_use]
    pub fn with_tooltip_fields(mut self, tooltip_fields: TooltipFields) -> Self {
        self.tooltip_fields = tooltip_fields;
        self
    }

    #[must_use]
    pub fn with_expanded_rows_data(mut self, rows: ExpandedRowsData) -> Self {
        self.expanded_rows_data = rows;
        self
    }

    /// Parses a props document; malformed input is a configuration error.
    pub fn from_json_str(input: &str) -> GanttResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| GanttError::configuration(format!("invalid gantt config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn time_range(&self) -> GanttResult<TimeRange> {
        TimeRange::new(self.start_date.instant(), self.end_date.instant())
    }

    pub fn validate(&self) -> GanttResult<()> {
        self.time_range()?;
        self.time_scale.validate()?;
        validate_positive("columnWidth", self.column_width)?;
        validate_positive("rowHeightPx", self.row_height_px)?;
        validate_positive("labelPanelWidthPx", self.label_panel_width_px)?;
        if !self.min_bar_width_px.is_finite() || self.min_bar_width_px < 0.0 {
            return Err(GanttError::configuration(format!(
                "minBarWidthPx must be finite and >= 0, got {}",
                self.min_bar_width_px
            )));
        }
        if self
            .color_mapping
            .as_ref()
            .is_some_and(|mapping| mapping.key.trim().is_empty())
        {
            return Err(GanttError::configuration(
                "colorMapping.key must not be empty",
            ));
        }
        Ok(())
    }
}

fn validate_positive(name: &str, value: f64) -> GanttResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GanttError::configuration(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}
