//! Operation: preview a centralization without touching any file.

use cpv_util::errors::CpvResult;

use crate::ops_centralize::{self, CentralizeOptions, CentralizeReport, Mode};

/// Run discovery and the transform in memory only.
///
/// The returned report carries the manifest that [`ops_centralize::centralize`]
/// would write; no descriptor or manifest is modified.
pub fn scan(options: &CentralizeOptions) -> CpvResult<CentralizeReport> {
    ops_centralize::run(options, Mode::DryRun)
}
