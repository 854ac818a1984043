use anyhow::Result;
use clap::{Args, Command};
use clap_complete::{generate, Shell};
use log::{info, warn};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SetupShellCompletions {
    /// Shell to generate completions for.
    #[clap(long, value_parser)]
    pub shell: Shell,

    /// Install the completion script system-wide, or write it to the given path.
    #[clap(
        long,
        value_parser,
        default_missing_value = Some(""),
        value_names = &["Path including filename"],
        num_args = 0..=1
    )]
    pub install: Option<String>,
}

/// Default install location for shells with a well-known completion directory.
fn system_path(shell: Shell, app_name: &str) -> Result<Option<PathBuf>> {
    let (dir, file) = match shell {
        Shell::Bash => ("/usr/share/bash-completion/completions", app_name.to_string()),
        Shell::Zsh => ("/usr/local/share/zsh/site-functions", format!("_{}", app_name)),
        _ => return Ok(None),
    };
    let dir = PathBuf::from(dir);
    fs::create_dir_all(&dir)?;
    Ok(Some(dir.join(file)))
}

pub fn setup_shell_completions(args: &SetupShellCompletions, cmd: &mut Command) -> Result<()> {
    let shell = args.shell;
    let app_name = cmd.get_name().to_string();

    // PowerShell profiles are edited by hand, and nothing is installed on Windows.
    let install = match &args.install {
        Some(_) if shell == Shell::PowerShell || cfg!(target_os = "windows") => {
            warn!("The script cannot be installed for this shell, printing it instead.");
            None
        }
        other => other.clone(),
    };

    let Some(custom_path) = install else {
        info!("The auto-completion script is generated below:");
        generate(shell, cmd, app_name, &mut io::stdout());
        return Ok(());
    };

    let install_path = if custom_path.is_empty() {
        match system_path(shell, &app_name)? {
            Some(path) => path,
            None => {
                warn!("Could not install automatically!");
                PathBuf::from(format!("{}_completions.sh", app_name))
            }
        }
    } else {
        PathBuf::from(custom_path)
    };

    let mut file = File::create(&install_path)?;
    generate(shell, cmd, app_name, &mut file);
    info!("Completion script generated to {}", install_path.display());
    Ok(())
}
