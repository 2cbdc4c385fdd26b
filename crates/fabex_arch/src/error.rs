//! Error types for architecture point construction and topology generation.

use crate::point::WireTopology;
use crate::template::TemplateKey;

/// Errors raised while building, parsing, or generating an architecture point.
///
/// Every variant is a configuration error: it is reported before any external
/// process runs and is never silently corrected.
#[derive(Debug, thiserror::Error)]
pub enum ArchError {
    /// An architecture label could not be parsed.
    #[error("invalid architecture label '{label}': {reason}")]
    InvalidLabel {
        /// The label that failed to parse.
        label: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The LUT size is not one of the supported values.
    #[error("unsupported LUT size {0}; expected 4 or 6")]
    UnsupportedLutSize(u32),

    /// The switch-block pattern name is not recognized.
    #[error("unknown switch block pattern '{0}'")]
    UnknownPattern(String),

    /// The wire topology name is not recognized.
    #[error("unknown wire topology '{0}'")]
    UnknownTopology(String),

    /// A two-class topology was requested without a global wirelength.
    #[error("topology '{0}' requires a global wirelength")]
    MissingGlobalWirelength(WireTopology),

    /// A global wirelength was given for the single-wirelength topology.
    #[error("single-wirelength topology cannot have a global wirelength (got {0})")]
    UnexpectedGlobalWirelength(u32),

    /// A wirelength was zero.
    #[error("{class} wirelength must be positive")]
    InvalidWirelength {
        /// Which wire class the length belongs to.
        class: &'static str,
    },

    /// A connection-block flexibility was outside `(0, 1]`.
    #[error("{which} must be in (0, 1], got {value}")]
    InvalidFlexibility {
        /// `fc_in` or `fc_out`.
        which: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The global via repeat stride was zero.
    #[error("global via repeat must be at least 1")]
    InvalidViaRepeat,

    /// No pre-authored base template matches the point's parameters.
    #[error("unknown configuration: no base template for {0}")]
    UnknownTemplate(TemplateKey),

    /// More distinct random points were requested than the design space holds.
    #[error("requested {requested} distinct architectures but only {available} exist")]
    SampleSpaceExhausted {
        /// How many points were requested.
        requested: usize,
        /// How many distinct points the space contains.
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::LutSize;
    use crate::template::TemplateVariant;

    #[test]
    fn display_missing_global() {
        let err = ArchError::MissingGlobalWirelength(WireTopology::OnCbOffSb);
        assert_eq!(
            err.to_string(),
            "topology 'on-cb-off-sb' requires a global wirelength"
        );
    }

    #[test]
    fn display_unknown_template() {
        let key = TemplateKey {
            s_wirelength: 16,
            g_wirelength: None,
            lut_size: LutSize::K4,
            variant: TemplateVariant::Regular,
        };
        let msg = ArchError::UnknownTemplate(key).to_string();
        assert!(msg.starts_with("unknown configuration"));
        assert!(msg.contains("s=16"));
    }

    #[test]
    fn display_invalid_flexibility() {
        let err = ArchError::InvalidFlexibility {
            which: "fc_in",
            value: 1.5,
        };
        assert_eq!(err.to_string(), "fc_in must be in (0, 1], got 1.5");
    }
}
