//! The topology generator: architecture point to switch-block specifications.
//!
//! Generation is a pure function of the point and the global via repeat
//! stride. Switch functions depend only on the pattern; wire connections
//! depend only on the topology and wirelengths.

use crate::error::ArchError;
use crate::point::{ArchPoint, SwitchblockPattern, WireTopology};
use crate::switchblock::{
    SwitchDirection, SwitchFunc, SwitchblockRole, SwitchblockSet, SwitchblockSpec, TrackFormula,
    WireClass, WireConn, WireType,
};

/// Via repeat stride used when none is configured.
pub const DEFAULT_VIA_REPEAT: u32 = 4;

/// Generates the core, perimeter and straight switch blocks for `point`.
///
/// Global wires are tapped every `via_repeat` switchpoints.
///
/// # Errors
///
/// Returns [`ArchError::InvalidViaRepeat`] if `via_repeat` is zero, or
/// [`ArchError::MissingGlobalWirelength`] if a two-class topology has no global
/// wirelength.
pub fn generate(point: &ArchPoint, via_repeat: u32) -> Result<SwitchblockSet, ArchError> {
    if via_repeat == 0 {
        return Err(ArchError::InvalidViaRepeat);
    }
    let variant = point.topology().template_variant();
    let pattern = point.pattern();
    let lengths = Lengths::of(point)?;

    let turns = turn_funcs(pattern);
    let straights: Vec<SwitchFunc> = SwitchDirection::STRAIGHTS
        .into_iter()
        .map(|direction| SwitchFunc {
            direction,
            formula: TrackFormula::IDENTITY,
        })
        .collect();

    let block = |suffix: &str, role: SwitchblockRole, funcs: Vec<SwitchFunc>| SwitchblockSpec {
        name: format!("{pattern}_{suffix}"),
        role,
        funcs,
        conns: wire_conns(point.topology(), role, lengths, via_repeat),
    };

    Ok(SwitchblockSet {
        variant,
        core: block("turn_core", SwitchblockRole::Core, turns.clone()),
        perimeter: block("turn_perimeter", SwitchblockRole::Perimeter, turns),
        straight: block("straight", SwitchblockRole::Everywhere, straights),
    })
}

/// Returns the eight turn functions for a pattern, in emission order.
pub fn turn_funcs(pattern: SwitchblockPattern) -> Vec<SwitchFunc> {
    let formulas: [TrackFormula; 8] = match pattern {
        SwitchblockPattern::Wilton => [
            TrackFormula::mirrored(0),
            TrackFormula::shifted(-1),
            TrackFormula::shifted(-1),
            TrackFormula::mirrored(-2),
            TrackFormula::mirrored(0),
            TrackFormula::shifted(1),
            TrackFormula::shifted(1),
            TrackFormula::mirrored(-2),
        ],
        SwitchblockPattern::Universal => [
            TrackFormula::mirrored(-1),
            TrackFormula::IDENTITY,
            TrackFormula::IDENTITY,
            TrackFormula::mirrored(-1),
            TrackFormula::mirrored(-1),
            TrackFormula::IDENTITY,
            TrackFormula::IDENTITY,
            TrackFormula::mirrored(-1),
        ],
        SwitchblockPattern::Subset => [TrackFormula::IDENTITY; 8],
    };
    SwitchDirection::TURNS
        .into_iter()
        .zip(formulas)
        .map(|(direction, formula)| SwitchFunc { direction, formula })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Lengths {
    s: u32,
    g: Option<u32>,
}

impl Lengths {
    fn of(point: &ArchPoint) -> Result<Self, ArchError> {
        let g = point.g_wirelength();
        if point.topology().has_global() && g.is_none() {
            return Err(ArchError::MissingGlobalWirelength(point.topology()));
        }
        Ok(Self {
            s: point.s_wirelength(),
            g,
        })
    }
}

/// Accumulates wire connections for one role.
struct ConnBuilder {
    role: SwitchblockRole,
    conns: Vec<WireConn>,
}

impl ConnBuilder {
    fn new(role: SwitchblockRole) -> Self {
        Self {
            role,
            conns: Vec::new(),
        }
    }

    fn push(&mut self, from: WireType, to: WireType, from_switchpoints: Vec<u32>) {
        self.conns.push(WireConn {
            from,
            to,
            from_switchpoints,
            to_switchpoint: 0,
        });
    }

    /// Semi-global connection over every offset of a wire of length `len`.
    ///
    /// The straight role only needs the representative at offset 0.
    fn semi(&mut self, from: WireType, to: WireType, len: u32) {
        match self.role {
            SwitchblockRole::Core => {
                for sp in 0..len {
                    self.push(from, to, vec![sp]);
                }
            }
            SwitchblockRole::Perimeter => self.push(from, to, (0..len).collect()),
            SwitchblockRole::Everywhere => self.push(from, to, vec![0]),
        }
    }

    /// Global connection at offsets `0, stride, 2*stride, ...` below `len`.
    fn global(&mut self, from: WireType, to: WireType, len: u32, stride: u32) {
        let offsets = (0..len).step_by(stride as usize);
        match self.role {
            SwitchblockRole::Perimeter => self.push(from, to, offsets.collect()),
            SwitchblockRole::Core | SwitchblockRole::Everywhere => {
                for sp in offsets {
                    self.push(from, to, vec![sp]);
                }
            }
        }
    }

    /// A single connection at offset 0, regardless of role.
    fn single(&mut self, from: WireType, to: WireType) {
        self.push(from, to, vec![0]);
    }
}

fn wire_conns(
    topology: WireTopology,
    role: SwitchblockRole,
    lengths: Lengths,
    via_repeat: u32,
) -> Vec<WireConn> {
    let s = WireType::new(WireClass::SemiGlobal, lengths.s);
    let sprime = WireType::new(WireClass::SemiGlobalPrime, lengths.s);
    let mut b = ConnBuilder::new(role);

    let Some(g_len) = lengths.g else {
        b.semi(s, s, lengths.s);
        return b.conns;
    };
    let g = WireType::new(WireClass::Global, g_len);

    match topology {
        WireTopology::SingleWirelength => b.semi(s, s, lengths.s),
        WireTopology::OnCbOffCb => {
            b.semi(s, s, lengths.s);
            b.global(g, g, g_len, via_repeat);
        }
        WireTopology::OnCbOffSb | WireTopology::OnCbOffCbsb => {
            b.semi(s, s, lengths.s);
            b.global(g, g, g_len, via_repeat);
            b.global(g, s, g_len, via_repeat);
        }
        WireTopology::OnCbsbOffCbsb | WireTopology::OnSbOffSb => {
            b.semi(s, s, lengths.s);
            b.semi(sprime, sprime, lengths.s);
            b.single(sprime, g);
            b.global(g, g, g_len, via_repeat);
            b.global(g, sprime, g_len, via_repeat);
        }
    }
    b.conns
}

/// Returns the connection-block population bits for a global wire of length `len`.
///
/// Bit `i` is set iff `i` is a multiple of `via_repeat`.
pub fn cb_population(len: u32, via_repeat: u32) -> Vec<bool> {
    (0..len)
        .map(|i| via_repeat != 0 && i % via_repeat == 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::LutSize;
    use crate::template::TemplateVariant;

    fn point(label: &str) -> ArchPoint {
        label.parse().unwrap()
    }

    fn names(conns: &[WireConn]) -> Vec<(String, String, String)> {
        conns
            .iter()
            .map(|c| {
                (
                    c.from.to_string(),
                    c.to.to_string(),
                    c.from_switchpoint_list(),
                )
            })
            .collect()
    }

    fn triple(from: &str, to: &str, sp: &str) -> (String, String, String) {
        (from.to_string(), to.to_string(), sp.to_string())
    }

    #[test]
    fn generation_is_deterministic() {
        for label in [
            "k4_s2_g8_wilton_topology-on-sb-off-sb_fcin0.3_fcout0.6",
            "k6_s4_g16_universal_topology-on-cb-off-cbsb_fcin0.1_fcout0.1",
            "k6_s8_subset_topology-single-wirelength_fcin0.2_fcout0.4",
        ] {
            let p = point(label);
            assert_eq!(generate(&p, 4).unwrap(), generate(&p, 4).unwrap());
        }
    }

    #[test]
    fn block_names_and_roles() {
        let set = generate(
            &point("k4_s2_universal_topology-single-wirelength_fcin0.3_fcout0.6"),
            4,
        )
        .unwrap();
        assert_eq!(set.core.name, "universal_turn_core");
        assert_eq!(set.perimeter.name, "universal_turn_perimeter");
        assert_eq!(set.straight.name, "universal_straight");
        assert_eq!(set.core.role, SwitchblockRole::Core);
        assert_eq!(set.perimeter.role, SwitchblockRole::Perimeter);
        assert_eq!(set.straight.role, SwitchblockRole::Everywhere);
        assert_eq!(set.variant, TemplateVariant::Regular);
    }

    #[test]
    fn subset_turns_are_identity() {
        let set = generate(
            &point("k6_s4_g8_subset_topology-on-cb-off-cb_fcin0.3_fcout0.6"),
            4,
        )
        .unwrap();
        assert_eq!(set.core.funcs.len(), 8);
        assert!(set.core.funcs.iter().all(|f| f.formula.is_identity()));
        assert!(set.perimeter.funcs.iter().all(|f| f.formula.is_identity()));
    }

    #[test]
    fn wilton_turn_table() {
        let formulas: Vec<String> = turn_funcs(SwitchblockPattern::Wilton)
            .iter()
            .map(|f| f.formula.to_string())
            .collect();
        assert_eq!(
            formulas,
            ["W-t", "t-1", "t-1", "W-t-2", "W-t", "t+1", "t+1", "W-t-2"]
        );
    }

    #[test]
    fn universal_turn_table() {
        let formulas: Vec<String> = turn_funcs(SwitchblockPattern::Universal)
            .iter()
            .map(|f| f.formula.to_string())
            .collect();
        assert_eq!(
            formulas,
            ["W-t-1", "t", "t", "W-t-1", "W-t-1", "t", "t", "W-t-1"]
        );
    }

    #[test]
    fn straight_role_is_identity_for_every_pattern() {
        for pattern in SwitchblockPattern::ALL {
            let p = ArchPoint::new(
                LutSize::K4,
                2,
                None,
                pattern,
                WireTopology::SingleWirelength,
                0.3,
                0.3,
            )
            .unwrap();
            let set = generate(&p, 4).unwrap();
            let codes: Vec<_> = set.straight.funcs.iter().map(|f| f.direction.code()).collect();
            assert_eq!(codes, ["lr", "bt", "rl", "tb"]);
            assert!(set.straight.funcs.iter().all(|f| f.formula.is_identity()));
            assert!(set.straight.funcs.iter().all(|f| f.direction.is_straight()));
            assert!(set.core.funcs.iter().all(|f| !f.direction.is_straight()));
        }
    }

    #[test]
    fn turn_formulas_permute_tracks() {
        for pattern in SwitchblockPattern::ALL {
            for func in turn_funcs(pattern) {
                for w in [2, 7, 100] {
                    let mut hit = vec![false; w as usize];
                    for t in 0..w {
                        let to = func.formula.apply(t, w).unwrap();
                        hit[to as usize] = true;
                    }
                    assert!(
                        hit.iter().all(|&h| h),
                        "{pattern} {} {} at W={w}",
                        func.direction,
                        func.formula
                    );
                }
            }
        }
    }

    #[test]
    fn wilton_core_routes_track_zero() {
        let set = generate(
            &point("k4_s1_wilton_topology-single-wirelength_fcin0.3_fcout0.6"),
            4,
        )
        .unwrap();
        let targets: Vec<u32> = set
            .core
            .funcs
            .iter()
            .map(|f| f.formula.apply(0, 10).unwrap())
            .collect();
        // W-t, t-1, t-1, W-t-2, W-t, t+1, t+1, W-t-2 at t = 0, W = 10
        assert_eq!(targets, [0, 9, 9, 8, 0, 1, 1, 8]);
    }

    #[test]
    fn single_wirelength_never_touches_global_or_sprime() {
        for pattern in SwitchblockPattern::ALL {
            for s in [1, 2, 4, 8, 16] {
                let p = ArchPoint::new(
                    LutSize::K6,
                    s,
                    None,
                    pattern,
                    WireTopology::SingleWirelength,
                    0.1,
                    0.1,
                )
                .unwrap();
                let set = generate(&p, 4).unwrap();
                for spec in set.specs() {
                    assert!(spec.conns.iter().all(|c| !c.touches(WireClass::Global)
                        && !c.touches(WireClass::SemiGlobalPrime)));
                }
            }
        }
    }

    #[test]
    fn single_wirelength_role_shapes() {
        let set = generate(
            &point("k4_s4_wilton_topology-single-wirelength_fcin0.3_fcout0.6"),
            4,
        )
        .unwrap();
        assert_eq!(
            names(&set.core.conns),
            [
                triple("l4s", "l4s", "0"),
                triple("l4s", "l4s", "1"),
                triple("l4s", "l4s", "2"),
                triple("l4s", "l4s", "3"),
            ]
        );
        assert_eq!(names(&set.perimeter.conns), [triple("l4s", "l4s", "0,1,2,3")]);
        assert_eq!(names(&set.straight.conns), [triple("l4s", "l4s", "0")]);
        assert!(set.core.conns.iter().all(|c| c.to_switchpoint == 0));
    }

    #[test]
    fn on_cb_off_cb_strides_global_wires() {
        let set = generate(
            &point("k4_s2_g16_wilton_topology-on-cb-off-cb_fcin0.3_fcout0.6"),
            4,
        )
        .unwrap();
        assert_eq!(
            names(&set.core.conns),
            [
                triple("l2s", "l2s", "0"),
                triple("l2s", "l2s", "1"),
                triple("l16g", "l16g", "0"),
                triple("l16g", "l16g", "4"),
                triple("l16g", "l16g", "8"),
                triple("l16g", "l16g", "12"),
            ]
        );
        assert_eq!(
            names(&set.perimeter.conns),
            [
                triple("l2s", "l2s", "0,1"),
                triple("l16g", "l16g", "0,4,8,12"),
            ]
        );
        assert_eq!(
            names(&set.straight.conns),
            [
                triple("l2s", "l2s", "0"),
                triple("l16g", "l16g", "0"),
                triple("l16g", "l16g", "4"),
                triple("l16g", "l16g", "8"),
                triple("l16g", "l16g", "12"),
            ]
        );
    }

    #[test]
    fn on_cb_off_sb_adds_global_to_semi() {
        let set = generate(
            &point("k6_s4_g8_universal_topology-on-cb-off-sb_fcin0.3_fcout0.6"),
            4,
        )
        .unwrap();
        assert_eq!(
            names(&set.perimeter.conns),
            [
                triple("l4s", "l4s", "0,1,2,3"),
                triple("l8g", "l8g", "0,4"),
                triple("l8g", "l4s", "0,4"),
            ]
        );
        let core = names(&set.core.conns);
        assert_eq!(core.len(), 4 + 2 + 2);
        assert_eq!(core[6], triple("l8g", "l4s", "0"));
        assert_eq!(core[7], triple("l8g", "l4s", "4"));
    }

    #[test]
    fn sb_topologies_use_sprime_lane() {
        let set = generate(
            &point("k4_s2_g8_wilton_topology-on-sb-off-sb_fcin0.3_fcout0.6"),
            4,
        )
        .unwrap();
        assert_eq!(set.variant, TemplateVariant::Prime);
        assert_eq!(
            names(&set.core.conns),
            [
                triple("l2s", "l2s", "0"),
                triple("l2s", "l2s", "1"),
                triple("l2sprime", "l2sprime", "0"),
                triple("l2sprime", "l2sprime", "1"),
                triple("l2sprime", "l8g", "0"),
                triple("l8g", "l8g", "0"),
                triple("l8g", "l8g", "4"),
                triple("l8g", "l2sprime", "0"),
                triple("l8g", "l2sprime", "4"),
            ]
        );
        assert_eq!(
            names(&set.perimeter.conns),
            [
                triple("l2s", "l2s", "0,1"),
                triple("l2sprime", "l2sprime", "0,1"),
                triple("l2sprime", "l8g", "0"),
                triple("l8g", "l8g", "0,4"),
                triple("l8g", "l2sprime", "0,4"),
            ]
        );
        assert_eq!(
            names(&set.straight.conns),
            [
                triple("l2s", "l2s", "0"),
                triple("l2sprime", "l2sprime", "0"),
                triple("l2sprime", "l8g", "0"),
                triple("l8g", "l8g", "0"),
                triple("l8g", "l8g", "4"),
                triple("l8g", "l2sprime", "0"),
                triple("l8g", "l2sprime", "4"),
            ]
        );
    }

    #[test]
    fn via_repeat_of_one_taps_every_offset() {
        let set = generate(
            &point("k4_s2_g4_subset_topology-on-cb-off-cbsb_fcin0.3_fcout0.6"),
            1,
        )
        .unwrap();
        assert_eq!(
            names(&set.perimeter.conns)[1],
            triple("l4g", "l4g", "0,1,2,3")
        );
    }

    #[test]
    fn zero_via_repeat_is_rejected() {
        let p = point("k4_s2_g4_subset_topology-on-cb-off-cb_fcin0.3_fcout0.6");
        assert!(matches!(generate(&p, 0), Err(ArchError::InvalidViaRepeat)));
    }

    #[test]
    fn cb_population_bits() {
        assert_eq!(
            cb_population(8, 4),
            [true, false, false, false, true, false, false, false]
        );
        assert_eq!(cb_population(4, 1), [true; 4]);
        assert_eq!(cb_population(2, 4), [true, false]);
    }
}
