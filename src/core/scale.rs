use crate::error::{GanttError, GanttResult};

/// Linear mapping between a numeric domain and the unit interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> GanttResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(GanttError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    /// Unclamped position of `value` where the domain maps onto `[0, 1]`.
    #[must_use]
    pub fn domain_to_fraction(self, value: f64) -> f64 {
        (value - self.domain_start) / (self.domain_end - self.domain_start)
    }

    #[must_use]
    pub fn fraction_to_domain(self, fraction: f64) -> f64 {
        self.domain_start + fraction * (self.domain_end - self.domain_start)
    }

    pub fn domain_to_pixel(self, value: f64, width_px: f64) -> GanttResult<f64> {
        if !width_px.is_finite() || width_px <= 0.0 {
            return Err(GanttError::InvalidViewport {
                width: width_px,
                height: 0.0,
            });
        }
        if !value.is_finite() {
            return Err(GanttError::InvalidData("value must be finite".to_owned()));
        }
        Ok(self.domain_to_fraction(value) * width_px)
    }
}
