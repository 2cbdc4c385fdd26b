//! Switch-block specification types produced by the topology generator.
//!
//! A [`SwitchblockSpec`] mirrors one `<switchblock>` entry of a VPR-style
//! architecture description: a name, a spatial role, a list of switch
//! functions, and a list of wire connections.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::template::TemplateVariant;

/// Where in the grid a switch block applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchblockRole {
    /// Interior switch blocks.
    Core,
    /// Switch blocks on the device boundary.
    Perimeter,
    /// Every switch block; used for the straight-through role.
    Everywhere,
}

impl SwitchblockRole {
    /// Returns the `switchblock_location` type string.
    pub fn location_type(self) -> &'static str {
        match self {
            Self::Core => "CORE",
            Self::Perimeter => "PERIMETER",
            Self::Everywhere => "EVERYWHERE",
        }
    }
}

impl fmt::Display for SwitchblockRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.location_type())
    }
}

/// A side-to-side direction through a switch block.
///
/// The first letter is the side a track enters on, the second the side it
/// leaves on (`l`eft, `r`ight, `t`op, `b`ottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SwitchDirection {
    /// Left to top.
    #[serde(rename = "lt")]
    LeftTop,
    /// Left to bottom.
    #[serde(rename = "lb")]
    LeftBottom,
    /// Right to top.
    #[serde(rename = "rt")]
    RightTop,
    /// Bottom to right.
    #[serde(rename = "br")]
    BottomRight,
    /// Top to left.
    #[serde(rename = "tl")]
    TopLeft,
    /// Bottom to left.
    #[serde(rename = "bl")]
    BottomLeft,
    /// Top to right.
    #[serde(rename = "tr")]
    TopRight,
    /// Right to bottom.
    #[serde(rename = "rb")]
    RightBottom,
    /// Left to right.
    #[serde(rename = "lr")]
    LeftRight,
    /// Bottom to top.
    #[serde(rename = "bt")]
    BottomTop,
    /// Right to left.
    #[serde(rename = "rl")]
    RightLeft,
    /// Top to bottom.
    #[serde(rename = "tb")]
    TopBottom,
}

impl SwitchDirection {
    /// The eight turning directions, in the order they are emitted.
    pub const TURNS: [SwitchDirection; 8] = [
        Self::LeftTop,
        Self::LeftBottom,
        Self::RightTop,
        Self::BottomRight,
        Self::TopLeft,
        Self::BottomLeft,
        Self::TopRight,
        Self::RightBottom,
    ];

    /// The four straight-through directions, in the order they are emitted.
    pub const STRAIGHTS: [SwitchDirection; 4] = [
        Self::LeftRight,
        Self::BottomTop,
        Self::RightLeft,
        Self::TopBottom,
    ];

    /// Returns the two-letter code used in `<func type=...>`.
    pub fn code(self) -> &'static str {
        match self {
            Self::LeftTop => "lt",
            Self::LeftBottom => "lb",
            Self::RightTop => "rt",
            Self::BottomRight => "br",
            Self::TopLeft => "tl",
            Self::BottomLeft => "bl",
            Self::TopRight => "tr",
            Self::RightBottom => "rb",
            Self::LeftRight => "lr",
            Self::BottomTop => "bt",
            Self::RightLeft => "rl",
            Self::TopBottom => "tb",
        }
    }

    /// Returns `true` for the four straight-through directions.
    pub fn is_straight(self) -> bool {
        Self::STRAIGHTS.contains(&self)
    }
}

impl fmt::Display for SwitchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A track-permutation formula over the incoming track index `t` and channel width `W`.
///
/// Either `t + offset` or, when mirrored, `W - t + offset`. Results wrap
/// modulo `W`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackFormula {
    mirrored: bool,
    offset: i32,
}

impl TrackFormula {
    /// The identity formula `t`.
    pub const IDENTITY: TrackFormula = TrackFormula {
        mirrored: false,
        offset: 0,
    };

    /// `t + offset`.
    pub const fn shifted(offset: i32) -> Self {
        Self {
            mirrored: false,
            offset,
        }
    }

    /// `W - t + offset`.
    pub const fn mirrored(offset: i32) -> Self {
        Self {
            mirrored: true,
            offset,
        }
    }

    /// Returns `true` if the formula is exactly `t`.
    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// Evaluates the formula for track `t` in a channel of width `w`.
    ///
    /// Returns `None` when `w` is zero.
    pub fn apply(self, t: u32, w: u32) -> Option<u32> {
        if w == 0 {
            return None;
        }
        let (t, w) = (i64::from(t), i64::from(w));
        let base = if self.mirrored { w - t } else { t };
        let track = (base + i64::from(self.offset)).rem_euclid(w);
        u32::try_from(track).ok()
    }
}

impl fmt::Display for TrackFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mirrored {
            f.write_str("W-t")?;
        } else {
            f.write_str("t")?;
        }
        match self.offset {
            0 => Ok(()),
            o if o > 0 => write!(f, "+{o}"),
            o => write!(f, "{o}"),
        }
    }
}

impl Serialize for TrackFormula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One `<func>` entry: the formula used for a given direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchFunc {
    /// The direction the formula applies to.
    pub direction: SwitchDirection,
    /// The track permutation.
    pub formula: TrackFormula,
}

/// A category of routing wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireClass {
    /// Semi-global wires (`s`).
    SemiGlobal,
    /// The secondary semi-global lane (`sprime`).
    SemiGlobalPrime,
    /// Global wires (`g`).
    Global,
}

impl WireClass {
    /// Returns the suffix used in segment names.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::SemiGlobal => "s",
            Self::SemiGlobalPrime => "sprime",
            Self::Global => "g",
        }
    }
}

/// A wire class at a particular segment length, named `l<length><suffix>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireType {
    /// The wire class.
    pub class: WireClass,
    /// Segment length in tiles.
    pub length: u32,
}

impl WireType {
    /// Creates a wire type.
    pub fn new(class: WireClass, length: u32) -> Self {
        Self { class, length }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}{}", self.length, self.class.suffix())
    }
}

impl Serialize for WireType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One `<wireconn>` entry.
///
/// Connects any wire of `from` at one of `from_switchpoints` to a wire of `to`
/// at `to_switchpoint`, with fixed ordering on both sides and one connection
/// per source wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireConn {
    /// Source wire type.
    pub from: WireType,
    /// Destination wire type.
    pub to: WireType,
    /// Switchpoints along the source wire at which the connection may be made.
    pub from_switchpoints: Vec<u32>,
    /// Switchpoint along the destination wire.
    pub to_switchpoint: u32,
}

impl WireConn {
    /// Returns the comma-joined `from_switchpoint` attribute value.
    pub fn from_switchpoint_list(&self) -> String {
        self.from_switchpoints
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Returns `true` if either end of the connection is of the given class.
    pub fn touches(&self, class: WireClass) -> bool {
        self.from.class == class || self.to.class == class
    }
}

/// A complete switch-block declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchblockSpec {
    /// The switch-block name.
    pub name: String,
    /// Where the switch block applies.
    pub role: SwitchblockRole,
    /// Switch functions, in emission order.
    pub funcs: Vec<SwitchFunc>,
    /// Wire connections, in emission order.
    pub conns: Vec<WireConn>,
}

/// The three switch blocks generated for one architecture point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchblockSet {
    /// Base template family the set is meant to be applied to.
    pub variant: TemplateVariant,
    /// Turning switch block for the interior.
    pub core: SwitchblockSpec,
    /// Turning switch block for the boundary.
    pub perimeter: SwitchblockSpec,
    /// Straight-through switch block applied everywhere.
    pub straight: SwitchblockSpec,
}

impl SwitchblockSet {
    /// Returns the three switch blocks in the order they are written out.
    pub fn specs(&self) -> [&SwitchblockSpec; 3] {
        [&self.core, &self.perimeter, &self.straight]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_display() {
        assert_eq!(TrackFormula::IDENTITY.to_string(), "t");
        assert_eq!(TrackFormula::shifted(1).to_string(), "t+1");
        assert_eq!(TrackFormula::shifted(-1).to_string(), "t-1");
        assert_eq!(TrackFormula::mirrored(0).to_string(), "W-t");
        assert_eq!(TrackFormula::mirrored(-1).to_string(), "W-t-1");
        assert_eq!(TrackFormula::mirrored(-2).to_string(), "W-t-2");
    }

    #[test]
    fn formula_apply_wraps() {
        assert_eq!(TrackFormula::IDENTITY.apply(3, 10), Some(3));
        assert_eq!(TrackFormula::shifted(-1).apply(0, 10), Some(9));
        assert_eq!(TrackFormula::shifted(1).apply(9, 10), Some(0));
        assert_eq!(TrackFormula::mirrored(0).apply(0, 10), Some(0));
        assert_eq!(TrackFormula::mirrored(-1).apply(0, 10), Some(9));
        assert_eq!(TrackFormula::mirrored(-2).apply(3, 10), Some(5));
        assert_eq!(TrackFormula::IDENTITY.apply(3, 0), None);
    }

    #[test]
    fn wire_type_names() {
        assert_eq!(WireType::new(WireClass::SemiGlobal, 4).to_string(), "l4s");
        assert_eq!(WireType::new(WireClass::SemiGlobalPrime, 2).to_string(), "l2sprime");
        assert_eq!(WireType::new(WireClass::Global, 16).to_string(), "l16g");
    }

    #[test]
    fn switchpoint_list_is_comma_joined() {
        let conn = WireConn {
            from: WireType::new(WireClass::Global, 16),
            to: WireType::new(WireClass::Global, 16),
            from_switchpoints: vec![0, 4, 8, 12],
            to_switchpoint: 0,
        };
        assert_eq!(conn.from_switchpoint_list(), "0,4,8,12");
        assert!(conn.touches(WireClass::Global));
        assert!(!conn.touches(WireClass::SemiGlobal));
    }

    #[test]
    fn direction_codes() {
        let codes: Vec<_> = SwitchDirection::TURNS.iter().map(|d| d.code()).collect();
        assert_eq!(codes, ["lt", "lb", "rt", "br", "tl", "bl", "tr", "rb"]);
        assert!(SwitchDirection::STRAIGHTS.iter().all(|d| d.is_straight()));
        assert!(!SwitchDirection::LeftTop.is_straight());
    }

    #[test]
    fn wireconn_serializes_names() {
        let conn = WireConn {
            from: WireType::new(WireClass::SemiGlobal, 2),
            to: WireType::new(WireClass::SemiGlobal, 2),
            from_switchpoints: vec![0],
            to_switchpoint: 0,
        };
        let json = serde_json::to_value(&conn).unwrap();
        assert_eq!(json["from"], "l2s");
        assert_eq!(json["from_switchpoints"][0], 0);
    }
}
