//! `fabex instantiate`: materialize the architecture file for one label.

use fabex_arch::ArchPoint;
use fabex_instantiate::{Instantiator, XmlStarletFactory};

use crate::project::load_project;
use crate::{GlobalArgs, InstantiateArgs};

/// Runs the `fabex instantiate` command.
pub fn run(args: &InstantiateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let point: ArchPoint = args.label.parse()?;
    let config = load_project(global)?;

    if !global.quiet {
        eprintln!("   Instantiating {point} (run {})", args.run);
    }
    let instantiator = Instantiator::new(
        &config.paths.arch_base,
        &config.paths.work_dir,
        config.explore.via_repeat,
    );
    let path = instantiator.instantiate(&point, args.run, &XmlStarletFactory::default())?;
    println!("{}", path.display());
    Ok(0)
}
