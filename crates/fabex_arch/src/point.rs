//! Architecture points: one coordinate in the routing design space.
//!
//! A point is identified by a canonical label such as
//! `k4_s2_g8_wilton_topology-on-cb-off-cbsb_fcin0.3_fcout0.6`. Labels parse
//! into [`ArchPoint`] via [`FromStr`] and format back via [`Display`](fmt::Display).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ArchError;
use crate::template::TemplateVariant;

/// Number of inputs to the basic logic element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LutSize {
    /// 4-input LUTs.
    #[serde(rename = "4")]
    K4,
    /// 6-input LUTs.
    #[serde(rename = "6")]
    K6,
}

impl LutSize {
    /// Returns the LUT input count.
    pub fn inputs(self) -> u32 {
        match self {
            Self::K4 => 4,
            Self::K6 => 6,
        }
    }

    /// Converts an input count into a LUT size.
    pub fn from_inputs(k: u32) -> Result<Self, ArchError> {
        match k {
            4 => Ok(Self::K4),
            6 => Ok(Self::K6),
            other => Err(ArchError::UnsupportedLutSize(other)),
        }
    }
}

impl fmt::Display for LutSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}LUT", self.inputs())
    }
}

/// Switch-block permutation pattern applied to turning connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchblockPattern {
    /// Wilton pattern: rotating offsets between turns.
    Wilton,
    /// Universal pattern: mirrored track assignment.
    Universal,
    /// Subset (disjoint) pattern: every turn keeps its track index.
    Subset,
}

impl SwitchblockPattern {
    /// All patterns, in declaration order.
    pub const ALL: [SwitchblockPattern; 3] = [Self::Wilton, Self::Universal, Self::Subset];

    /// Returns the canonical lowercase name used in labels and file names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Wilton => "wilton",
            Self::Universal => "universal",
            Self::Subset => "subset",
        }
    }
}

impl fmt::Display for SwitchblockPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SwitchblockPattern {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ArchError::UnknownPattern(s.to_string()))
    }
}

/// How the semi-global and global wire classes are connected.
///
/// The name reads as "on-<where global wires are entered>-off-<where they are
/// left>", with `cb` for connection blocks and `sb` for switch blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireTopology {
    /// One semi-global wire class only.
    SingleWirelength,
    /// Global wires entered and left at connection blocks.
    OnCbOffCb,
    /// Global wires entered at connection blocks and left at switch blocks.
    OnCbOffSb,
    /// Global wires entered at connection blocks, left at both.
    OnCbOffCbsb,
    /// Global wires entered and left at both, through a second semi-global lane.
    OnCbsbOffCbsb,
    /// Global wires entered and left at switch blocks, through a second semi-global lane.
    OnSbOffSb,
}

impl WireTopology {
    /// All topologies, in declaration order.
    pub const ALL: [WireTopology; 6] = [
        Self::SingleWirelength,
        Self::OnCbOffCb,
        Self::OnCbOffSb,
        Self::OnCbOffCbsb,
        Self::OnCbsbOffCbsb,
        Self::OnSbOffSb,
    ];

    /// Returns the canonical name used in labels.
    pub fn name(self) -> &'static str {
        match self {
            Self::SingleWirelength => "single-wirelength",
            Self::OnCbOffCb => "on-cb-off-cb",
            Self::OnCbOffSb => "on-cb-off-sb",
            Self::OnCbOffCbsb => "on-cb-off-cbsb",
            Self::OnCbsbOffCbsb => "on-cbsb-off-cbsb",
            Self::OnSbOffSb => "on-sb-off-sb",
        }
    }

    /// Returns `true` if this topology uses a global wire class.
    pub fn has_global(self) -> bool {
        !matches!(self, Self::SingleWirelength)
    }

    /// Returns `true` if this topology adds the secondary `sprime` semi-global class.
    pub fn has_sprime(self) -> bool {
        matches!(self, Self::OnCbsbOffCbsb | Self::OnSbOffSb)
    }

    /// Selects which base template family the topology is applied to.
    pub fn template_variant(self) -> TemplateVariant {
        if self.has_sprime() {
            TemplateVariant::Prime
        } else {
            TemplateVariant::Regular
        }
    }
}

impl fmt::Display for WireTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WireTopology {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ArchError::UnknownTopology(s.to_string()))
    }
}

/// One point in the routing-architecture design space.
///
/// Points are immutable once built. [`ArchPoint::new`] enforces that a global
/// wirelength is present exactly when the topology is not `single-wirelength`,
/// that wirelengths are positive, and that both flexibilities lie in `(0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchPoint {
    lut_size: LutSize,
    s_wirelength: u32,
    g_wirelength: Option<u32>,
    pattern: SwitchblockPattern,
    topology: WireTopology,
    fc_in: f64,
    fc_out: f64,
    suffix: Option<String>,
}

impl ArchPoint {
    /// Builds and validates a point.
    pub fn new(
        lut_size: LutSize,
        s_wirelength: u32,
        g_wirelength: Option<u32>,
        pattern: SwitchblockPattern,
        topology: WireTopology,
        fc_in: f64,
        fc_out: f64,
    ) -> Result<Self, ArchError> {
        if s_wirelength == 0 {
            return Err(ArchError::InvalidWirelength {
                class: "semi-global",
            });
        }
        match (topology.has_global(), g_wirelength) {
            (true, None) => return Err(ArchError::MissingGlobalWirelength(topology)),
            (false, Some(g)) => return Err(ArchError::UnexpectedGlobalWirelength(g)),
            (true, Some(0)) => return Err(ArchError::InvalidWirelength { class: "global" }),
            _ => {}
        }
        check_flexibility("fc_in", fc_in)?;
        check_flexibility("fc_out", fc_out)?;

        Ok(Self {
            lut_size,
            s_wirelength,
            g_wirelength,
            pattern,
            topology,
            fc_in,
            fc_out,
            suffix: None,
        })
    }

    /// Attaches a free-form suffix that is carried verbatim at the end of the label.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.suffix = if suffix.is_empty() { None } else { Some(suffix) };
        self
    }

    /// Returns the LUT size.
    pub fn lut_size(&self) -> LutSize {
        self.lut_size
    }

    /// Returns the semi-global wirelength.
    pub fn s_wirelength(&self) -> u32 {
        self.s_wirelength
    }

    /// Returns the global wirelength, if the topology has a global class.
    pub fn g_wirelength(&self) -> Option<u32> {
        self.g_wirelength
    }

    /// Returns the switch-block pattern.
    pub fn pattern(&self) -> SwitchblockPattern {
        self.pattern
    }

    /// Returns the wire topology.
    pub fn topology(&self) -> WireTopology {
        self.topology
    }

    /// Returns the input connection-block flexibility.
    pub fn fc_in(&self) -> f64 {
        self.fc_in
    }

    /// Returns the output connection-block flexibility.
    pub fn fc_out(&self) -> f64 {
        self.fc_out
    }

    /// Returns the free-form label suffix, if any.
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Returns the canonical label.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

fn check_flexibility(which: &'static str, value: f64) -> Result<(), ArchError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ArchError::InvalidFlexibility { which, value })
    }
}

impl fmt::Display for ArchPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}_s{}_", self.lut_size.inputs(), self.s_wirelength)?;
        if let Some(g) = self.g_wirelength {
            write!(f, "g{g}_")?;
        }
        write!(
            f,
            "{}_topology-{}_fcin{}_fcout{}",
            self.pattern, self.topology, self.fc_in, self.fc_out
        )?;
        if let Some(suffix) = &self.suffix {
            write!(f, "_{suffix}")?;
        }
        Ok(())
    }
}

impl FromStr for ArchPoint {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let err = |reason: &str| ArchError::InvalidLabel {
            label: label.to_string(),
            reason: reason.to_string(),
        };

        let mut tokens = label.split('_').peekable();

        let k: u32 = tokens
            .next()
            .and_then(|t| t.strip_prefix('k'))
            .ok_or_else(|| err("expected 'k<lut size>'"))?
            .parse()
            .map_err(|_| err("LUT size is not a number"))?;
        let lut_size = LutSize::from_inputs(k)?;

        let s_wirelength: u32 = tokens
            .next()
            .and_then(|t| t.strip_prefix('s'))
            .ok_or_else(|| err("expected 's<semi-global wirelength>'"))?
            .parse()
            .map_err(|_| err("semi-global wirelength is not a number"))?;

        let g_wirelength = match tokens.peek().copied().and_then(|t| t.strip_prefix('g')) {
            Some(digits) => {
                let g: u32 = digits
                    .parse()
                    .map_err(|_| err("global wirelength is not a number"))?;
                tokens.next();
                Some(g)
            }
            None => None,
        };

        let pattern: SwitchblockPattern = tokens
            .next()
            .ok_or_else(|| err("missing switch block pattern"))?
            .parse()?;

        let topology: WireTopology = tokens
            .next()
            .and_then(|t| t.strip_prefix("topology-"))
            .ok_or_else(|| err("expected 'topology-<name>'"))?
            .parse()?;

        let fc_in: f64 = tokens
            .next()
            .and_then(|t| t.strip_prefix("fcin"))
            .ok_or_else(|| err("expected 'fcin<value>'"))?
            .parse()
            .map_err(|_| err("fcin is not a number"))?;

        let fc_out: f64 = tokens
            .next()
            .and_then(|t| t.strip_prefix("fcout"))
            .ok_or_else(|| err("expected 'fcout<value>'"))?
            .parse()
            .map_err(|_| err("fcout is not a number"))?;

        let suffix = tokens.collect::<Vec<_>>().join("_");

        Ok(ArchPoint::new(
            lut_size,
            s_wirelength,
            g_wirelength,
            pattern,
            topology,
            fc_in,
            fc_out,
        )?
        .with_suffix(suffix))
    }
}
