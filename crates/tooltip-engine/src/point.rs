//! Hit-tested data points as handed over by the host chart

use std::fmt;
use std::rc::Rc;

use tooltip_shared::{AxisMode, DataPointRef, HitPointDto};

/// Host callback turning an axis value into display text
pub type TickFormatter = Rc<dyn Fn(f64, &AxisInfo) -> String>;

/// What the tooltip needs to know about one axis of a series
#[derive(Clone, Default)]
pub struct AxisInfo {
    pub mode: AxisMode,
    pub tick_formatter: Option<TickFormatter>,
}

impl AxisInfo {
    pub fn linear() -> Self {
        Self::default()
    }

    pub fn time() -> Self {
        Self {
            mode: AxisMode::Time,
            tick_formatter: None,
        }
    }

    pub fn with_tick_formatter(mut self, formatter: impl Fn(f64, &AxisInfo) -> String + 'static) -> Self {
        self.tick_formatter = Some(Rc::new(formatter));
        self
    }

    pub fn is_time_mode(&self) -> bool {
        self.mode == AxisMode::Time
    }
}

impl fmt::Debug for AxisInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisInfo")
            .field("mode", &self.mode)
            .field("tick_formatter", &self.tick_formatter.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeriesInfo {
    pub label: Option<String>,
    /// Share of the whole, set by pie-style series only
    pub percent: Option<f64>,
    pub x_axis: AxisInfo,
    pub y_axis: AxisInfo,
}

/// A data point under the pointer together with its series context
#[derive(Debug, Clone)]
pub struct HitPoint {
    pub point: DataPointRef,
    pub series: SeriesInfo,
}

impl HitPoint {
    pub fn new(series_index: usize, data_index: usize, x: f64, y: f64) -> Self {
        Self {
            point: DataPointRef::new(series_index, data_index, [x, y]),
            series: SeriesInfo::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.series.label = Some(label.into());
        self
    }

    pub fn with_percent(mut self, percent: f64) -> Self {
        self.series.percent = Some(percent);
        self
    }

    pub fn with_axes(mut self, x_axis: AxisInfo, y_axis: AxisInfo) -> Self {
        self.series.x_axis = x_axis;
        self.series.y_axis = y_axis;
        self
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    pub fn to_dto(&self) -> HitPointDto {
        HitPointDto {
            series_index: self.point.series_index,
            data_index: self.point.data_index,
            datapoint: self.point.datapoint,
            label: self.series.label.clone(),
            percent: self.series.percent,
            x_axis_mode: self.series.x_axis.mode,
            y_axis_mode: self.series.y_axis.mode,
        }
    }
}

impl From<HitPointDto> for HitPoint {
    fn from(dto: HitPointDto) -> Self {
        Self {
            point: dto.point_ref(),
            series: SeriesInfo {
                label: dto.label,
                percent: dto.percent,
                x_axis: AxisInfo {
                    mode: dto.x_axis_mode,
                    tick_formatter: None,
                },
                y_axis: AxisInfo {
                    mode: dto.y_axis_mode,
                    tick_formatter: None,
                },
            },
        }
    }
}
