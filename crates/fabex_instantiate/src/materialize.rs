//! Applying generated switch blocks and flexibility overrides to a base template.

use std::fs;
use std::path::{Path, PathBuf};

use fabex_arch::{
    cb_population, generate, resolve_template, ArchPoint, SwitchblockSet, SwitchblockSpec,
    WireClass, WireTopology, WireType,
};

use crate::editor::{DocumentEditor, EditLog, EditOp, EditorFactory};
use crate::error::{EditError, InstantiateError};

const SWITCHBLOCK_LIST: &str = "/architecture/switchblocklist";
const SUB_TILE: &str = "/architecture/tiles/tile/sub_tile";

/// Sub-tiles whose flexibility is pinned to 1.0 regardless of the point.
pub const FULLY_FLEXIBLE_TILES: [&str; 3] = ["io", "mult_36", "memory"];

/// Formats a flexibility value the way the templates spell them (`1.0`, `0.3`).
fn fc_value(v: f64) -> String {
    format!("{v:?}")
}

/// Writes one switch block into the switch-block list.
///
/// New nodes are inserted under a temporary name and renamed once complete, so
/// each path addresses exactly one node.
fn write_switchblock(spec: &SwitchblockSpec, ed: &mut dyn DocumentEditor) -> Result<(), EditError> {
    let staging = format!("{SWITCHBLOCK_LIST}/switchblock_new");
    ed.insert_subtree(SWITCHBLOCK_LIST, "switchblock_new")?;
    ed.insert_attribute(&staging, "name", &spec.name)?;
    ed.insert_attribute(&staging, "type", "unidir")?;
    ed.insert_subtree(&staging, "switchblock_location")?;
    ed.insert_attribute(
        &format!("{staging}/switchblock_location"),
        "type",
        spec.role.location_type(),
    )?;
    ed.rename_node(&staging, "switchblock")?;

    let block = format!("{SWITCHBLOCK_LIST}/switchblock[@name=\"{}\"]", spec.name);
    let funcs = format!("{block}/switchfuncs");
    ed.insert_subtree(&block, "switchfuncs")?;
    for func in &spec.funcs {
        let new = format!("{funcs}/func_new");
        ed.insert_subtree(&funcs, "func_new")?;
        ed.insert_attribute(&new, "type", func.direction.code())?;
        ed.insert_attribute(&new, "formula", &func.formula.to_string())?;
        ed.rename_node(&new, "func")?;
    }

    for conn in &spec.conns {
        let new = format!("{block}/wireconn_new");
        ed.insert_subtree(&block, "wireconn_new")?;
        ed.insert_attribute(&new, "from_type", &conn.from.to_string())?;
        ed.insert_attribute(&new, "to_type", &conn.to.to_string())?;
        ed.insert_attribute(&new, "from_switchpoint", &conn.from_switchpoint_list())?;
        ed.insert_attribute(&new, "to_switchpoint", &conn.to_switchpoint.to_string())?;
        ed.insert_attribute(&new, "num_conns", "from")?;
        ed.insert_attribute(&new, "from_order", "fixed")?;
        ed.insert_attribute(&new, "to_order", "fixed")?;
        ed.rename_node(&new, "wireconn")?;
    }
    Ok(())
}

/// One flexibility pass over `tiles`.
///
/// On on-cb-off-sb every pass also rewrites the global-wire override, so the
/// last pass decides its final value.
fn write_fc(
    point: &ArchPoint,
    tiles: &[&str],
    fc_in: f64,
    fc_out: f64,
    ed: &mut dyn DocumentEditor,
) -> Result<(), EditError> {
    for tile in tiles {
        let fc = format!("{SUB_TILE}[@name=\"{tile}\"]/fc");
        ed.update_attribute(&fc, "in_val", &fc_value(fc_in))?;
        ed.update_attribute(&fc, "out_val", &fc_value(fc_out))?;
    }
    if let (WireTopology::OnCbOffSb, Some(g)) = (point.topology(), point.g_wirelength()) {
        let global = WireType::new(WireClass::Global, g);
        ed.update_attribute(
            &format!("{SUB_TILE}/fc/fc_override[@segment_name=\"{global}\"]"),
            "fc_val",
            &fc_value(fc_out),
        )?;
    }
    Ok(())
}

/// Returns the quoted connection-block population expression, e.g. `"1 0 0 0"`.
pub fn cb_expression(len: u32, via_repeat: u32) -> String {
    let bits: Vec<&str> = cb_population(len, via_repeat)
        .into_iter()
        .map(|set| if set { "1" } else { "0" })
        .collect();
    format!("\"{}\"", bits.join(" "))
}

/// Writes the complete, ordered edit sequence that turns a base template into
/// the architecture for `point`, stopping at the first failed edit.
pub fn edit_script(
    point: &ArchPoint,
    set: &SwitchblockSet,
    via_repeat: u32,
    ed: &mut dyn DocumentEditor,
) -> Result<(), EditError> {
    ed.delete_subtree(SWITCHBLOCK_LIST)?;
    ed.insert_subtree("/architecture", "switchblocklist")?;
    for spec in set.specs() {
        write_switchblock(spec, ed)?;
    }

    write_fc(point, &["clb"], point.fc_in(), point.fc_out(), ed)?;
    write_fc(point, &FULLY_FLEXIBLE_TILES, 1.0, 1.0, ed)?;

    if let Some(g) = point.g_wirelength() {
        let global = WireType::new(WireClass::Global, g);
        ed.update_by_expression(
            &format!("/architecture/segmentlist/segment[@name=\"{global}\"]/cb"),
            &cb_expression(g, via_repeat),
        )?;
    }
    Ok(())
}

/// Generates the switch blocks for `point` and returns the edits for it.
pub fn plan(point: &ArchPoint, via_repeat: u32) -> Result<Vec<EditOp>, InstantiateError> {
    let set = generate(point, via_repeat)?;
    let mut log = EditLog::new();
    edit_script(point, &set, via_repeat, &mut log)?;
    Ok(log.into_ops())
}

/// Stages base templates and applies architecture edits to the staged copies.
#[derive(Debug, Clone)]
pub struct Instantiator {
    arch_base: PathBuf,
    work_dir: PathBuf,
    via_repeat: u32,
}

impl Instantiator {
    /// Creates an instantiator reading templates from `arch_base` and staging under `work_dir`.
    pub fn new(arch_base: impl Into<PathBuf>, work_dir: impl Into<PathBuf>, via_repeat: u32) -> Self {
        Self {
            arch_base: arch_base.into(),
            work_dir: work_dir.into(),
            via_repeat,
        }
    }

    /// Returns the staging directory for a point and run index.
    pub fn staging_dir(&self, point: &ArchPoint, run: usize) -> PathBuf {
        self.work_dir.join(point.label()).join(format!("run{run}"))
    }

    /// Materializes `point` and returns the path of the staged architecture file.
    ///
    /// The base template is never modified. If any edit fails, the staged
    /// copy is removed before the error is returned.
    pub fn instantiate(
        &self,
        point: &ArchPoint,
        run: usize,
        editors: &dyn EditorFactory,
    ) -> Result<PathBuf, InstantiateError> {
        let template = resolve_template(point)?;
        let ops = plan(point, self.via_repeat)?;

        let source = self.arch_base.join(template);
        let dir = self.staging_dir(point, run);
        let staged = stage(&source, &dir)?;
        tracing::debug!(
            point = %point,
            template = %source.display(),
            staged = %staged.display(),
            edits = ops.len(),
            "materializing architecture"
        );

        let mut editor = editors.open(&staged);
        if let Err(e) = editor.apply_all(&ops) {
            if let Err(rm) = fs::remove_file(&staged) {
                tracing::warn!(path = %staged.display(), error = %rm, "could not remove staged file");
            }
            return Err(e.into());
        }
        Ok(staged)
    }
}

/// Copies `source` into `dir`, creating it, and returns the copy's path.
fn stage(source: &Path, dir: &Path) -> Result<PathBuf, InstantiateError> {
    let stage_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| InstantiateError::Stage { path, source }
    };
    fs::create_dir_all(dir).map_err(stage_err(dir))?;
    let file_name = source.file_name().ok_or_else(|| InstantiateError::Stage {
        path: source.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "template has no file name"),
    })?;
    let staged = dir.join(file_name);
    fs::copy(source, &staged).map_err(stage_err(source))?;
    Ok(staged)
}
