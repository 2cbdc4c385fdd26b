//! Materialization of architecture points into architecture description files.
//!
//! [`Instantiator::instantiate`] resolves a point's base template, copies it
//! into a private staging directory, and applies the ordered edit script from
//! [`edit_script`]: the generated switch blocks, the connection-block
//! flexibility policy, and global-wire connection-block depopulation. Edits go
//! through the [`DocumentEditor`] trait so the backend can be swapped for a
//! recorder in dry runs and tests.

#![warn(missing_docs)]

pub mod editor;
pub mod error;
pub mod materialize;

pub use editor::{DocumentEditor, EditLog, EditOp, EditorFactory, XmlStarlet, XmlStarletFactory};
pub use error::{EditError, InstantiateError};
pub use materialize::{cb_expression, edit_script, plan, Instantiator, FULLY_FLEXIBLE_TILES};
