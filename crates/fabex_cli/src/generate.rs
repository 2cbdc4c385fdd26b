//! `fabex generate`: print the switch blocks for a label, or the document
//! edits that would write them.

use std::fmt::{self, Write as _};

use fabex_arch::{generate, resolve_template, ArchPoint, SwitchblockSet, DEFAULT_VIA_REPEAT};
use fabex_instantiate::plan;

use crate::project::try_load_project;
use crate::{GenerateArgs, GlobalArgs, ReportFormat};

/// Runs the `fabex generate` command.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let point: ArchPoint = args.label.parse()?;
    let via_repeat = match args.via_repeat {
        Some(r) => r,
        None => try_load_project(global)?
            .map(|c| c.explore.via_repeat)
            .unwrap_or(DEFAULT_VIA_REPEAT),
    };

    if args.dry_run {
        let ops = plan(&point, via_repeat)?;
        match args.format {
            ReportFormat::Text => {
                for op in &ops {
                    println!("{op}");
                }
            }
            ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&ops)?),
        }
        return Ok(0);
    }

    let set = generate(&point, via_repeat)?;
    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                match resolve_template(&point) {
                    Ok(template) => eprintln!("   Template {template}"),
                    Err(e) => eprintln!("warning: {e}"),
                }
            }
            print!("{}", render(&set)?);
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&set)?),
    }
    Ok(0)
}

/// Renders a switch-block set as indented text.
fn render(set: &SwitchblockSet) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for spec in set.specs() {
        writeln!(out, "switchblock {} ({})", spec.name, spec.role)?;
        for func in &spec.funcs {
            writeln!(out, "  func {} {}", func.direction, func.formula)?;
        }
        for conn in &spec.conns {
            writeln!(
                out,
                "  wireconn {} -> {} from [{}] to {}",
                conn.from,
                conn.to,
                conn.from_switchpoint_list(),
                conn.to_switchpoint
            )?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_single_wirelength() {
        let point: ArchPoint = "k4_s2_subset_topology-single-wirelength_fcin0.3_fcout0.6"
            .parse()
            .unwrap();
        let text = render(&generate(&point, 4).unwrap()).unwrap();
        assert!(text.starts_with("switchblock subset_turn_core (CORE)\n  func lt t\n"));
        assert!(text.contains("  wireconn l2s -> l2s from [1] to 0\n"));
        assert!(text.contains("switchblock subset_turn_perimeter (PERIMETER)"));
        assert!(text.contains("  wireconn l2s -> l2s from [0,1] to 0\n"));
        assert!(text.contains("switchblock subset_straight (EVERYWHERE)\n  func lr t\n"));
    }

    #[test]
    fn render_names_global_wires() {
        let point: ArchPoint = "k4_s2_g8_wilton_topology-on-cb-off-sb_fcin0.3_fcout0.6"
            .parse()
            .unwrap();
        let text = render(&generate(&point, 4).unwrap()).unwrap();
        assert!(text.contains("  wireconn l8g -> l2s from [4] to 0\n"));
        assert!(text.contains("  func br W-t-2\n"));
    }
}
