//! Resolving the repository root and run options shared by all commands.

use dialoguer::Input;
use miette::Result;

use cpv_core::config::CpvConfig;
use cpv_ops::ops_centralize::CentralizeOptions;
use cpv_util::errors::CpvError;

use crate::cli::TargetArgs;

/// Build run options from the command line, prompting for the root if needed.
pub fn options(target: &TargetArgs, verbose: bool) -> Result<CentralizeOptions> {
    let input = match &target.path {
        Some(path) => path.clone(),
        None => prompt_root()?,
    };
    let root = cpv_ops::validate_root(&input)?;
    let config = CpvConfig::load(&root, target.config.as_deref())?;

    let mut options = CentralizeOptions::new(root, config);
    options.fresh = target.fresh;
    options.verbose = verbose;
    Ok(options)
}

fn prompt_root() -> Result<String> {
    if !atty::is(atty::Stream::Stdin) {
        return Err(CpvError::InvalidRootPath {
            path: String::new(),
            reason: "no path given and stdin is not a terminal".to_string(),
        }
        .into());
    }

    let path = Input::<String>::new()
        .with_prompt("Repository root (e.g. ./source/repos/MySolution)")
        .validate_with(|input: &String| -> std::result::Result<(), &'static str> {
            if input.trim().is_empty() {
                Err("Please provide a directory path.")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| CpvError::Prompt {
            message: e.to_string(),
        })?;
    Ok(path)
}
