//! `fabex sample`: draw random, distinct architecture labels.

use fabex_arch::{sample_labels, LutSize};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::SampleArgs;

/// Runs the `fabex sample` command.
pub fn run(args: &SampleArgs) -> Result<i32, Box<dyn std::error::Error>> {
    for label in draw(args)? {
        println!("{label}");
    }
    Ok(0)
}

fn draw(args: &SampleArgs) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let lut_size = LutSize::from_inputs(args.lut)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(sample_labels(args.count, lut_size, &mut rng)?)
}
