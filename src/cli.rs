//! Command-line interface implementation.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::{Path, PathBuf};

/// Command-line arguments structure.
#[derive(Parser, Debug)]
#[command(
    name = "build-template",
    version,
    about = "Build the parameterized template directory from the source project",
    long_about = None
)]
pub struct Args {
    /// Directory containing the source project
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub source_dir: PathBuf,

    /// YAML build manifest replacing the built-in one
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the template is built into, relative to the working directory
    /// (overrides the manifest, whose path is relative to the source directory)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Fail if the built template differs from the one committed to git
    #[arg(long)]
    pub check: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Returns `--template-dir` anchored at `cwd` when given as a relative path.
    pub fn template_dir_from(&self, cwd: &Path) -> Option<PathBuf> {
        self.template_dir.as_ref().map(|dir| {
            if dir.is_absolute() {
                dir.clone()
            } else {
                cwd.join(dir)
            }
        })
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text on a missing argument value
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument | ErrorKind::InvalidValue
            ) {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
