//! Handler for `cpv scan`.

use miette::Result;

use cpv_ops::ops_scan;
use cpv_util::fs::relative_display;

use crate::cli::TargetArgs;

pub fn exec(target: &TargetArgs, verbose: bool) -> Result<()> {
    let options = super::root::options(target, verbose)?;
    let report = ops_scan::scan(&options)?;

    for file in &report.files {
        if file.centralized.is_empty() && file.rejected.is_empty() {
            continue;
        }
        println!("{}", relative_display(&options.root, &file.path));
        for reference in &file.centralized {
            println!("  {} {}", reference.name, reference.version);
        }
        for rejected in &file.rejected {
            println!("  {} {} (invalid: {})", rejected.name, rejected.version, rejected.reason);
        }
    }

    println!();
    println!("{}:", relative_display(&options.root, &report.manifest_path));
    print!("{}", report.manifest);

    Ok(())
}
