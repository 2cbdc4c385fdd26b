//! Routing-architecture design points and switch-block topology generation.
//!
//! An [`ArchPoint`] names one routing architecture: LUT size, wirelengths,
//! switch-block pattern, wire topology and connection-block flexibility.
//! [`generate`] turns a point into the three switch blocks (core, perimeter,
//! straight) that are written into a base template, and
//! [`resolve_template`] picks which pre-authored template that is.
//!
//! ```
//! use fabex_arch::{generate, resolve_template, ArchPoint};
//!
//! let point: ArchPoint = "k4_s2_g8_wilton_topology-on-cb-off-sb_fcin0.3_fcout0.6"
//!     .parse()
//!     .unwrap();
//! let set = generate(&point, 4).unwrap();
//! assert_eq!(set.core.name, "wilton_turn_core");
//! assert_eq!(
//!     resolve_template(&point).unwrap(),
//!     "4LUT_DSP/L2-8/k4_N8_topology-0.85sL2-0.15gL8_22nm.xml"
//! );
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod generate;
pub mod point;
pub mod sample;
pub mod switchblock;
pub mod template;

pub use error::ArchError;
pub use generate::{cb_population, generate, turn_funcs, DEFAULT_VIA_REPEAT};
pub use point::{ArchPoint, LutSize, SwitchblockPattern, WireTopology};
pub use sample::{design_space_size, sample_labels, sample_points};
pub use switchblock::{
    SwitchDirection, SwitchFunc, SwitchblockRole, SwitchblockSet, SwitchblockSpec, TrackFormula,
    WireClass, WireConn, WireType,
};
pub use template::{resolve_template, template_key, TemplateKey, TemplateVariant};
