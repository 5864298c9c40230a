//! Entry point of the `build-template` binary.
//! Parses arguments, loads the manifest and runs the build pipeline.

use template_builder::{
    builder::Builder,
    check::ensure_up_to_date,
    cli::{get_args, Args},
    config::get_manifest,
    error::{default_error_handler, BuildResult},
    logger::init_logger,
    render::MiniJinjaValidator,
};

fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Builds the template and optionally checks it against git.
fn run(args: Args) -> BuildResult<()> {
    let manifest = get_manifest(args.config.as_deref())?;
    let template_dir = args.template_dir_from(&std::env::current_dir()?);
    let validator = MiniJinjaValidator::new();
    let builder = Builder::new(&manifest, &validator, &args.source_dir, template_dir.as_deref())?;

    let report = builder.run()?;

    if args.check {
        ensure_up_to_date(builder.template_root())?;
    }

    println!(
        "Template built successfully in {} ({}).",
        builder.template_root().display(),
        report
    );
    Ok(())
}
