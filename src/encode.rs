use crate::aggregate::StationTraffic;

pub const DEFAULT_MAX_RADIUS: f64 = 25.0;

/// Where the radius scale takes its upper domain bound from.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusDomain {
    /// Largest total traffic among the stations being drawn.
    Observed,
    /// A configured upper bound.
    Fixed(f64),
}

impl Default for RadiusDomain {
    fn default() -> Self {
        RadiusDomain::Observed
    }
}

/// Square-root scale from `[0, domain_max]` onto `[0, range_max]`.
///
/// Output is clamped to the range. A zero domain maps everything to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    domain_max: f64,
    range_max: f64,
}

impl SqrtScale {
    pub fn new(domain_max: f64, range_max: f64) -> Self {
        Self {
            domain_max: domain_max.max(0.0),
            range_max: range_max.max(0.0),
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        if self.domain_max <= 0.0 || value <= 0.0 {
            return 0.0;
        }
        let t = (value / self.domain_max).sqrt();
        (t * self.range_max).min(self.range_max)
    }
}

/// Three-way departure/arrival balance of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum FlowLevel {
    ArrivalHeavy,
    Balanced,
    DepartureHeavy,
}

impl FlowLevel {
    /// Quantizes a departure ratio in `[0, 1]` into thirds. Values on a
    /// threshold go to the upper level; values outside the domain clamp.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio.is_nan() {
            return FlowLevel::Balanced;
        }
        if ratio < 1.0 / 3.0 {
            FlowLevel::ArrivalHeavy
        } else if ratio < 2.0 / 3.0 {
            FlowLevel::Balanced
        } else {
            FlowLevel::DepartureHeavy
        }
    }

    /// The encoded level: 0, 0.5 or 1.
    pub fn value(self) -> f64 {
        match self {
            FlowLevel::ArrivalHeavy => 0.0,
            FlowLevel::Balanced => 0.5,
            FlowLevel::DepartureHeavy => 1.0,
        }
    }
}

/// Flow level of a station. Stations without traffic are `Balanced`.
pub fn flow_level(traffic: &StationTraffic) -> FlowLevel {
    if traffic.total_traffic == 0 {
        return FlowLevel::Balanced;
    }
    FlowLevel::from_ratio(traffic.departures as f64 / traffic.total_traffic as f64)
}

/// Radius and flow encoders for one frame of station traffic.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualEncoder {
    pub max_radius: f64,
    pub domain: RadiusDomain,
}

impl Default for VisualEncoder {
    fn default() -> Self {
        Self {
            max_radius: DEFAULT_MAX_RADIUS,
            domain: RadiusDomain::Observed,
        }
    }
}

impl VisualEncoder {
    pub fn new(max_radius: f64, domain: RadiusDomain) -> Self {
        Self { max_radius, domain }
    }

    /// Resolves the radius scale against the stations of the current frame.
    pub fn radius_scale(&self, stations: &[StationTraffic]) -> SqrtScale {
        let domain_max = match self.domain {
            RadiusDomain::Fixed(max) => max,
            RadiusDomain::Observed => stations
                .iter()
                .map(|s| s.total_traffic)
                .max()
                .unwrap_or(0) as f64,
        };
        SqrtScale::new(domain_max, self.max_radius)
    }

    /// Radius for one station under a scale from [`VisualEncoder::radius_scale`].
    pub fn radius(&self, scale: &SqrtScale, traffic: &StationTraffic) -> f64 {
        scale.apply(traffic.total_traffic as f64)
    }

    /// Flow bucket for one station. See [`flow_level`].
    pub fn flow(&self, traffic: &StationTraffic) -> FlowLevel {
        flow_level(traffic)
    }
}
