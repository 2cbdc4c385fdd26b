//! Structural edits on architecture description documents.
//!
//! Edits are described as [`EditOp`] values and applied through the
//! [`DocumentEditor`] trait. [`XmlStarlet`] applies them in place with the
//! `xmlstarlet` command-line tool; [`EditLog`] only records them.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::EditError;

/// One structural edit, addressed by an XPath expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Delete every node matching `xpath`, with its subtree.
    Delete {
        /// Nodes to delete.
        xpath: String,
    },
    /// Append an empty element `name` as the last child of `parent`.
    InsertElement {
        /// Parent element.
        parent: String,
        /// New element name.
        name: String,
    },
    /// Add attribute `name="value"` to the element at `xpath`.
    InsertAttribute {
        /// Target element.
        xpath: String,
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// Rename the node at `xpath` to `name`.
    Rename {
        /// Node to rename.
        xpath: String,
        /// New node name.
        name: String,
    },
    /// Set the value of the node (usually an attribute) at `xpath`.
    UpdateValue {
        /// Node to update.
        xpath: String,
        /// New value.
        value: String,
    },
    /// Set the node at `xpath` to the result of an XPath expression.
    UpdateExpr {
        /// Node to update.
        xpath: String,
        /// Expression to evaluate.
        expr: String,
    },
}

impl EditOp {
    /// Returns the `xmlstarlet ed` arguments for this edit.
    pub fn xmlstarlet_args(&self) -> Vec<&str> {
        match self {
            Self::Delete { xpath } => vec!["-d", xpath.as_str()],
            Self::InsertElement { parent, name } => {
                vec!["-s", parent.as_str(), "-t", "elem", "-n", name.as_str()]
            }
            Self::InsertAttribute { xpath, name, value } => vec![
                "--insert",
                xpath.as_str(),
                "-t",
                "attr",
                "-n",
                name.as_str(),
                "-v",
                value.as_str(),
            ],
            Self::Rename { xpath, name } => vec!["-r", xpath.as_str(), "-v", name.as_str()],
            Self::UpdateValue { xpath, value } => vec!["-u", xpath.as_str(), "-v", value.as_str()],
            Self::UpdateExpr { xpath, expr } => vec!["-u", xpath.as_str(), "-x", expr.as_str()],
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete { xpath } => write!(f, "delete {xpath}"),
            Self::InsertElement { parent, name } => write!(f, "insert <{name}> under {parent}"),
            Self::InsertAttribute { xpath, name, value } => {
                write!(f, "insert @{name}=\"{value}\" at {xpath}")
            }
            Self::Rename { xpath, name } => write!(f, "rename {xpath} to {name}"),
            Self::UpdateValue { xpath, value } => write!(f, "update {xpath} = \"{value}\""),
            Self::UpdateExpr { xpath, expr } => write!(f, "update {xpath} = expr {expr}"),
        }
    }
}

/// A document that structural edits can be applied to.
///
/// Implementors provide [`apply`](Self::apply); the named operations are
/// conveniences over it.
pub trait DocumentEditor {
    /// Applies one edit. Any failure leaves the document unusable.
    fn apply(&mut self, op: &EditOp) -> Result<(), EditError>;

    /// Deletes the subtree at `xpath`.
    fn delete_subtree(&mut self, xpath: &str) -> Result<(), EditError> {
        self.apply(&EditOp::Delete {
            xpath: xpath.to_string(),
        })
    }

    /// Appends an empty element under `parent`.
    fn insert_subtree(&mut self, parent: &str, name: &str) -> Result<(), EditError> {
        self.apply(&EditOp::InsertElement {
            parent: parent.to_string(),
            name: name.to_string(),
        })
    }

    /// Adds an attribute to the element at `xpath`.
    fn insert_attribute(&mut self, xpath: &str, name: &str, value: &str) -> Result<(), EditError> {
        self.apply(&EditOp::InsertAttribute {
            xpath: xpath.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Renames the node at `xpath`.
    fn rename_node(&mut self, xpath: &str, name: &str) -> Result<(), EditError> {
        self.apply(&EditOp::Rename {
            xpath: xpath.to_string(),
            name: name.to_string(),
        })
    }

    /// Sets attribute `attr` of the element at `xpath`.
    fn update_attribute(&mut self, xpath: &str, attr: &str, value: &str) -> Result<(), EditError> {
        self.apply(&EditOp::UpdateValue {
            xpath: format!("{xpath}/@{attr}"),
            value: value.to_string(),
        })
    }

    /// Sets the node at `xpath` to the value of `expr`.
    fn update_by_expression(&mut self, xpath: &str, expr: &str) -> Result<(), EditError> {
        self.apply(&EditOp::UpdateExpr {
            xpath: xpath.to_string(),
            expr: expr.to_string(),
        })
    }

    /// Applies a sequence of edits, stopping at the first failure.
    fn apply_all(&mut self, ops: &[EditOp]) -> Result<(), EditError> {
        ops.iter().try_for_each(|op| self.apply(op))
    }
}

/// Opens [`DocumentEditor`]s on files.
///
/// Shared between workers, so implementations must be thread-safe.
pub trait EditorFactory: Send + Sync {
    /// Opens an editor on the document at `path`.
    fn open(&self, path: &Path) -> Box<dyn DocumentEditor>;
}

/// Edits a file in place with `xmlstarlet ed -L -O`, one process per edit.
#[derive(Debug, Clone)]
pub struct XmlStarlet {
    program: PathBuf,
    file: PathBuf,
}

impl XmlStarlet {
    /// Creates an editor for `file` using the `xmlstarlet` found on `PATH`.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self::with_program("xmlstarlet", file)
    }

    /// Creates an editor for `file` using a specific executable.
    pub fn with_program(program: impl Into<PathBuf>, file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            file: file.into(),
        }
    }
}

impl DocumentEditor for XmlStarlet {
    fn apply(&mut self, op: &EditOp) -> Result<(), EditError> {
        tracing::trace!(file = %self.file.display(), %op, "xmlstarlet");
        let output = Command::new(&self.program)
            .args(["ed", "-L", "-O"])
            .args(op.xmlstarlet_args())
            .arg(&self.file)
            .output()
            .map_err(|source| EditError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EditError::Failed {
                op: op.to_string(),
                file: self.file.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Opens [`XmlStarlet`] editors.
#[derive(Debug, Clone)]
pub struct XmlStarletFactory {
    program: PathBuf,
}

impl XmlStarletFactory {
    /// Uses the given `xmlstarlet` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for XmlStarletFactory {
    fn default() -> Self {
        Self::new("xmlstarlet")
    }
}

impl EditorFactory for XmlStarletFactory {
    fn open(&self, path: &Path) -> Box<dyn DocumentEditor> {
        Box::new(XmlStarlet::with_program(&self.program, path))
    }
}

/// Records edits without touching any document.
#[derive(Debug, Clone, Default)]
pub struct EditLog {
    ops: Vec<EditOp>,
}

impl EditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded edits in order.
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Consumes the log, returning the recorded edits.
    pub fn into_ops(self) -> Vec<EditOp> {
        self.ops
    }
}

impl DocumentEditor for EditLog {
    fn apply(&mut self, op: &EditOp) -> Result<(), EditError> {
        self.ops.push(op.clone());
        Ok(())
    }
}
