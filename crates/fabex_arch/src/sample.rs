//! Uniform random sampling of the design space.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::error::ArchError;
use crate::point::{ArchPoint, LutSize, SwitchblockPattern, WireTopology};

/// A semi-global / global wirelength pair. `g` is `None` for single-wirelength mixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WirelengthMix {
    /// Semi-global length.
    pub s: u32,
    /// Global length.
    pub g: Option<u32>,
}

const fn mix(s: u32, g: Option<u32>) -> WirelengthMix {
    WirelengthMix { s, g }
}

const ALL_MIXES: [WirelengthMix; 11] = [
    mix(1, None),
    mix(2, None),
    mix(4, None),
    mix(8, None),
    mix(16, None),
    mix(4, Some(4)),
    mix(4, Some(8)),
    mix(4, Some(16)),
    mix(2, Some(4)),
    mix(2, Some(8)),
    mix(2, Some(16)),
];

/// Returns the wirelength mixes that have base templates for a LUT size.
pub fn wirelength_mixes(lut_size: LutSize) -> Vec<WirelengthMix> {
    ALL_MIXES
        .into_iter()
        .filter(|m| match lut_size {
            LutSize::K4 => !(m.s == 16 || (m.s == 4 && m.g.is_some())),
            LutSize::K6 => !(m.s == 2 && m.g.is_some()),
        })
        .collect()
}

/// Returns the flexibility values sampled for a LUT size.
pub fn flexibility_values(lut_size: LutSize) -> &'static [f64] {
    match lut_size {
        LutSize::K4 => &[0.1, 0.2, 0.3, 0.4, 0.6],
        LutSize::K6 => &[0.05, 0.1, 0.2, 0.4, 0.6],
    }
}

fn topologies_for(mix: WirelengthMix) -> Vec<WireTopology> {
    WireTopology::ALL
        .into_iter()
        .filter(|t| t.has_global() == mix.g.is_some())
        .collect()
}

/// Counts the distinct points the sampler can produce for a LUT size.
pub fn design_space_size(lut_size: LutSize) -> usize {
    let fc = flexibility_values(lut_size).len();
    wirelength_mixes(lut_size)
        .into_iter()
        .map(|m| topologies_for(m).len())
        .sum::<usize>()
        * SwitchblockPattern::ALL.len()
        * fc
        * fc
}

/// Draws `count` distinct random points for a LUT size.
///
/// The wirelength mix is uniform over the mixes valid for the LUT size, the
/// topology is uniform over those compatible with the mix, and the pattern
/// and both flexibilities are uniform over their value sets.
///
/// # Errors
///
/// Returns [`ArchError::SampleSpaceExhausted`] if `count` exceeds
/// [`design_space_size`].
pub fn sample_points<R: Rng + ?Sized>(
    count: usize,
    lut_size: LutSize,
    rng: &mut R,
) -> Result<Vec<ArchPoint>, ArchError> {
    let available = design_space_size(lut_size);
    if count > available {
        return Err(ArchError::SampleSpaceExhausted {
            requested: count,
            available,
        });
    }

    let mixes = wirelength_mixes(lut_size);
    let fcs = flexibility_values(lut_size);
    let mut seen = HashSet::with_capacity(count);
    let mut points = Vec::with_capacity(count);

    while points.len() < count {
        let Some(&mix) = mixes.choose(rng) else {
            break;
        };
        let Some(&topology) = topologies_for(mix).choose(rng) else {
            continue;
        };
        let Some(&pattern) = SwitchblockPattern::ALL.choose(rng) else {
            break;
        };
        let (Some(&fc_in), Some(&fc_out)) = (fcs.choose(rng), fcs.choose(rng)) else {
            break;
        };
        let point = ArchPoint::new(lut_size, mix.s, mix.g, pattern, topology, fc_in, fc_out)?;
        if seen.insert(point.label()) {
            points.push(point);
        }
    }
    Ok(points)
}

/// Like [`sample_points`], returning canonical labels.
pub fn sample_labels<R: Rng + ?Sized>(
    count: usize,
    lut_size: LutSize,
    rng: &mut R,
) -> Result<Vec<String>, ArchError> {
    Ok(sample_points(count, lut_size, rng)?
        .iter()
        .map(ArchPoint::label)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::resolve_template;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn mixes_per_lut_size() {
        let k4: Vec<_> = wirelength_mixes(LutSize::K4)
            .iter()
            .map(|m| (m.s, m.g))
            .collect();
        assert_eq!(
            k4,
            [
                (1, None),
                (2, None),
                (4, None),
                (8, None),
                (2, Some(4)),
                (2, Some(8)),
                (2, Some(16)),
            ]
        );
        assert_eq!(wirelength_mixes(LutSize::K6).len(), 8);
    }

    #[test]
    fn space_size() {
        // 4 single mixes + 3 two-class mixes * 5 topologies, 3 patterns, 5x5 fc.
        assert_eq!(design_space_size(LutSize::K4), (4 + 15) * 3 * 25);
        assert_eq!(design_space_size(LutSize::K6), (5 + 15) * 3 * 25);
    }

    #[test]
    fn samples_are_distinct_and_instantiable() {
        let mut rng = StdRng::seed_from_u64(7);
        for lut in [LutSize::K4, LutSize::K6] {
            let points = sample_points(200, lut, &mut rng).unwrap();
            assert_eq!(points.len(), 200);
            let labels: HashSet<_> = points.iter().map(ArchPoint::label).collect();
            assert_eq!(labels.len(), 200);
            for p in &points {
                assert_eq!(p.lut_size(), lut);
                assert!(resolve_template(p).is_ok(), "no template for {p}");
                assert!(flexibility_values(lut).contains(&p.fc_in()));
            }
        }
    }

    #[test]
    fn sampling_is_reproducible() {
        let a = sample_labels(20, LutSize::K6, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = sample_labels(20, LutSize::K6, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn whole_space_can_be_drawn() {
        let n = design_space_size(LutSize::K4);
        let points = sample_points(n, LutSize::K4, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(points.len(), n);
    }

    #[test]
    fn oversized_request_fails() {
        let n = design_space_size(LutSize::K6) + 1;
        let err = sample_points(n, LutSize::K6, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, ArchError::SampleSpaceExhausted { requested, .. } if requested == n));
    }
}
