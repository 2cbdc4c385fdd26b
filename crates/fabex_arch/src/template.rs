//! Lookup of pre-authored base architecture templates.
//!
//! The design space is bounded to the templates listed in [`TEMPLATES`]; a
//! point whose wirelengths, LUT size, and variant have no entry cannot be
//! instantiated.

use serde::Serialize;
use std::fmt;

use crate::error::ArchError;
use crate::point::{ArchPoint, LutSize};

/// Base template family a switch-block specification is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateVariant {
    /// Templates with `s` and (optionally) `g` segments.
    Regular,
    /// Templates that additionally carry an `sprime` segment.
    Prime,
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Regular => "regular",
            Self::Prime => "prime",
        })
    }
}

/// Key into the base template table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    /// Semi-global wirelength.
    pub s_wirelength: u32,
    /// Global wirelength, absent for single-wirelength templates.
    pub g_wirelength: Option<u32>,
    /// LUT size.
    pub lut_size: LutSize,
    /// Template family.
    pub variant: TemplateVariant,
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(s={}, g=", self.s_wirelength)?;
        match self.g_wirelength {
            Some(g) => write!(f, "{g}")?,
            None => f.write_str("-")?,
        }
        write!(f, ", {}, {})", self.lut_size, self.variant)
    }
}

/// One row of the template table.
#[derive(Debug, Clone, Copy)]
pub struct TemplateEntry {
    /// The key the row answers.
    pub key: TemplateKey,
    /// Path of the template relative to the architecture base directory.
    pub path: &'static str,
}

const fn entry(
    s: u32,
    g: Option<u32>,
    lut_size: LutSize,
    variant: TemplateVariant,
    path: &'static str,
) -> TemplateEntry {
    TemplateEntry {
        key: TemplateKey {
            s_wirelength: s,
            g_wirelength: g,
            lut_size,
            variant,
        },
        path,
    }
}

use LutSize::{K4, K6};
use TemplateVariant::{Prime, Regular};

/// All known base templates.
pub static TEMPLATES: &[TemplateEntry] = &[
    entry(1, None, K6, Regular, "6LUT/L1/k6_N10_topology-1.0sL1_22nm.xml"),
    entry(2, None, K6, Regular, "6LUT/L2/k6_N10_topology-1.0sL2_22nm.xml"),
    entry(4, None, K6, Regular, "6LUT/L4/k6_N10_topology-1.0sL4_22nm.xml"),
    entry(8, None, K6, Regular, "6LUT/L8/k6_N10_topology-1.0sL8_22nm.xml"),
    entry(16, None, K6, Regular, "6LUT/L16/k6_N10_topology-1.0sL16_22nm.xml"),
    entry(4, Some(4), K6, Regular, "6LUT/L4-4/k6_N10_topology-0.85sL4-0.15gL4_22nm.xml"),
    entry(4, Some(8), K6, Regular, "6LUT/L4-8/k6_N10_topology-0.85sL4-0.15gL8_22nm.xml"),
    entry(4, Some(16), K6, Regular, "6LUT/L4-16/k6_N10_topology-0.85sL4-0.15gL16_22nm.xml"),
    entry(4, Some(4), K6, Prime, "6LUT/L4-4/k6_N10_topology-0.55sL4-0.3spL4-0.15gL4_22nm.xml"),
    entry(4, Some(8), K6, Prime, "6LUT/L4-8/k6_N10_topology-0.55sL4-0.3spL4-0.15gL8_22nm.xml"),
    entry(4, Some(16), K6, Prime, "6LUT/L4-16/k6_N10_topology-0.55sL4-0.3spL4-0.15gL16_22nm.xml"),
    entry(1, None, K4, Regular, "4LUT_DSP/L1/k4_N8_topology-1.0sL1_22nm.xml"),
    entry(2, None, K4, Regular, "4LUT_DSP/L2/k4_N8_topology-1.0sL2_22nm.xml"),
    entry(4, None, K4, Regular, "4LUT_DSP/L4/k4_N8_topology-1.0sL4_22nm.xml"),
    entry(8, None, K4, Regular, "4LUT_DSP/L8/k4_N8_topology-1.0sL8_22nm.xml"),
    entry(2, Some(4), K4, Regular, "4LUT_DSP/L2-4/k4_N8_topology-0.85sL2-0.15gL4_22nm.xml"),
    entry(2, Some(8), K4, Regular, "4LUT_DSP/L2-8/k4_N8_topology-0.85sL2-0.15gL8_22nm.xml"),
    entry(2, Some(16), K4, Regular, "4LUT_DSP/L2-16/k4_N8_topology-0.85sL2-0.15gL16_22nm.xml"),
    entry(2, Some(4), K4, Prime, "4LUT_DSP/L2-4/k4_N8_topology-0.65sL2-0.2spL2-0.15gL4_22nm.xml"),
    entry(2, Some(8), K4, Prime, "4LUT_DSP/L2-8/k4_N8_topology-0.65sL2-0.2spL2-0.15gL8_22nm.xml"),
    entry(2, Some(16), K4, Prime, "4LUT_DSP/L2-16/k4_N8_topology-0.65sL2-0.2spL2-0.15gL16_22nm.xml"),
];

/// Builds the template key for a point.
pub fn template_key(point: &ArchPoint) -> TemplateKey {
    TemplateKey {
        s_wirelength: point.s_wirelength(),
        g_wirelength: point.g_wirelength(),
        lut_size: point.lut_size(),
        variant: point.topology().template_variant(),
    }
}

/// Looks up the template path for a key.
///
/// # Errors
///
/// Returns [`ArchError::UnknownTemplate`] if the table has no matching row.
pub fn template_path(key: TemplateKey) -> Result<&'static str, ArchError> {
    TEMPLATES
        .iter()
        .find(|e| e.key == key)
        .map(|e| e.path)
        .ok_or(ArchError::UnknownTemplate(key))
}

/// Resolves the base template path for a point, relative to the architecture base directory.
pub fn resolve_template(point: &ArchPoint) -> Result<&'static str, ArchError> {
    template_path(template_key(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{SwitchblockPattern, WireTopology};

    fn point(lut: LutSize, s: u32, g: Option<u32>, topology: WireTopology) -> ArchPoint {
        ArchPoint::new(lut, s, g, SwitchblockPattern::Wilton, topology, 0.2, 0.2).unwrap()
    }

    #[test]
    fn single_wirelength_templates() {
        let p = point(K6, 16, None, WireTopology::SingleWirelength);
        assert_eq!(
            resolve_template(&p).unwrap(),
            "6LUT/L16/k6_N10_topology-1.0sL16_22nm.xml"
        );
        let p = point(K4, 1, None, WireTopology::SingleWirelength);
        assert_eq!(
            resolve_template(&p).unwrap(),
            "4LUT_DSP/L1/k4_N8_topology-1.0sL1_22nm.xml"
        );
    }

    #[test]
    fn prime_topologies_select_prime_template() {
        let p = point(K4, 2, Some(8), WireTopology::OnSbOffSb);
        assert_eq!(
            resolve_template(&p).unwrap(),
            "4LUT_DSP/L2-8/k4_N8_topology-0.65sL2-0.2spL2-0.15gL8_22nm.xml"
        );
        let p = point(K6, 4, Some(16), WireTopology::OnCbsbOffCbsb);
        assert_eq!(
            resolve_template(&p).unwrap(),
            "6LUT/L4-16/k6_N10_topology-0.55sL4-0.3spL4-0.15gL16_22nm.xml"
        );
    }

    #[test]
    fn regular_two_class_template() {
        let p = point(K6, 4, Some(8), WireTopology::OnCbOffSb);
        assert_eq!(
            resolve_template(&p).unwrap(),
            "6LUT/L4-8/k6_N10_topology-0.85sL4-0.15gL8_22nm.xml"
        );
    }

    #[test]
    fn four_lut_has_no_length_sixteen() {
        let p = point(K4, 16, None, WireTopology::SingleWirelength);
        let err = resolve_template(&p).unwrap_err();
        assert!(matches!(err, ArchError::UnknownTemplate(k) if k.s_wirelength == 16));
    }

    #[test]
    fn mismatched_mix_is_unknown() {
        let p = point(K6, 2, Some(4), WireTopology::OnCbOffCb);
        assert!(resolve_template(&p).is_err());
    }

    #[test]
    fn table_keys_are_unique() {
        for (i, a) in TEMPLATES.iter().enumerate() {
            for b in &TEMPLATES[i + 1..] {
                assert_ne!(a.key, b.key, "duplicate row {}", a.path);
            }
        }
    }

    #[test]
    fn key_display() {
        let key = template_key(&point(K4, 2, Some(16), WireTopology::OnSbOffSb));
        assert_eq!(key.to_string(), "(s=2, g=16, 4LUT, prime)");
    }
}
