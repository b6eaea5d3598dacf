//! Handler for `cpv centralize`.

use miette::Result;

use cpv_ops::ops_centralize;
use cpv_util::errors::CpvError;
use cpv_util::progress::{self, plural};

use crate::cli::TargetArgs;

pub fn exec(target: &TargetArgs, keep_going: bool, verbose: bool) -> Result<()> {
    let mut options = super::root::options(target, verbose)?;
    options.keep_going = keep_going;

    let report = ops_centralize::centralize(&options)?;

    println!(
        "Centralized {} package{} from {} file{} into {}",
        report.packages,
        plural(report.packages),
        report.files.len(),
        plural(report.files.len()),
        report.manifest_path.display()
    );
    if report.rejected() > 0 {
        progress::status_warn(
            "Warning",
            &format!(
                "{} reference{} kept their version and need manual attention",
                report.rejected(),
                plural(report.rejected())
            ),
        );
    }

    if !report.failed.is_empty() {
        return Err(CpvError::Generic {
            message: format!(
                "{} project file{} could not be parsed and were left unchanged",
                report.failed.len(),
                plural(report.failed.len())
            ),
        }
        .into());
    }

    Ok(())
}
