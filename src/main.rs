#![allow(clippy::cognitive_complexity)]
#![allow(clippy::write_with_newline)]

mod cmd;
mod ctx;
mod gen;
mod report;

use clap::{Arg, App, SubCommand};
use semver::Version;
use std::fmt::Display;
use std::path::PathBuf;

fn main() {
  // Initialize.
  let commands = cmd::init();

  // Parse the environment variables.
  let env: ctx::Env = envy::from_env()
    .check(|| "Failed to parse environment variables");

  // Parse the command line.
  let args = App::new(env!("CARGO_PKG_NAME"))
    .version(env!("CARGO_PKG_VERSION"))
    .author(env!("CARGO_PKG_AUTHORS"))
    .about(env!("CARGO_PKG_DESCRIPTION"))
    .arg(Arg::with_name("FOLDER")
         .help("Project root containing the manifest and source files")
         .default_value("."))
    .arg(Arg::with_name("build")
         .short("b")
         .long("build")
         .value_name("FOLDER")
         .help("Where to store the generated project bundle")
         .takes_value(true))
    .arg(Arg::with_name("config")
         .short("c")
         .long("config")
         .value_name("FILE")
         .help("Name of the manifest file")
         .takes_value(true))
    .arg(Arg::with_name("strict")
         .long("strict")
         .help("Fail when manifest paths are missing on disk"))
    .subcommands(commands.iter().map(|(name, cmd)| {
      cmd.init(SubCommand::with_name(name))
    }))
    .get_matches();

  let input_dir = PathBuf::from(args.value_of("FOLDER").unwrap())
    .canonicalize()
    .check(|| "Input folder not found");

  // The build folder is only anchored to an absolute path here; nothing is
  // created until `gen` actually writes into it.
  let current_dir = std::env::current_dir()
    .check(|| "Failed to resolve the working folder");

  let build_dir = match args.value_of("build") {
    Some(path) => current_dir.join(path),
    None       => current_dir
  };

  // Load the project manifest.
  let mut bytes = Vec::new();
  let manifest: ctx::Manifest = {
    use std::io::Read;
    let path = input_dir.join(args.value_of("config").unwrap_or("Pbxgen.toml"));

    let mut f = std::fs::File::open(&path)
      .check(|| format!("Failed to open manifest file ({:?})", path));

    f.read_to_end(&mut bytes)
      .check(|| format!("Failed to load manifest file ({:?})", path));

    toml::from_slice(&bytes)
      .check(|| format!("Failed to read the project manifest ({:?})", path))
  };

  is_supported(manifest.min_pbxgen_version).check(|| "Min version check failed");

  manifest.validate().check(|| "Invalid project manifest");

  // Xcode resolves source paths from the project bundle, so the descriptor
  // carries the project root relative to the build folder.
  let input_rel = pathdiff::diff_paths(&input_dir, &build_dir)
    .unwrap_or_else(|| input_dir.clone());

  // Execute the requested command.
  let ctx = ctx::Context {
    commands,
    input_dir,
    build_dir,
    input_rel,
    env:      &env,
    args:     &args,
    manifest: &manifest,
    strict:   args.is_present("strict")
  };

  let cmd_name = ctx.args.subcommand_name().unwrap_or("gen");
  ctx.commands[cmd_name].run(&ctx)
    .check(|| format!("Failed to run command ({})", cmd_name));
}

fn is_supported(min_version: &str) -> ctx::GenResult<()> {
  if !min_version.is_empty() {
    let expected = Version::parse(min_version)?;
    let current  = Version::parse(env!("CARGO_PKG_VERSION")).unwrap();
    if expected > current {
      return Err(ctx::Error::MinVersion { expected, current })
    }
  }
  Ok(())
}

trait Check {
  type R;
  fn check<F, S>(self, msg: F) -> Self::R where F: FnOnce() -> S, S: Display;
}

impl<T, E> Check for Result<T, E> where E: Display {
  type R = T;
  fn check<F, S>(self, msg: F) -> Self::R where F: FnOnce() -> S, S: Display {
    match self {
      Ok (v) => v,
      Err(e) => fatal(format!("{}: {}", msg(), e))
    }
  }
}

fn fatal<S: Display>(msg: S) -> ! {
  eprintln!("{}", msg);
  std::process::exit(1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_min_version_is_always_supported() {
    assert!(is_supported("").is_ok());
  }

  #[test]
  fn future_min_version_is_rejected() {
    match is_supported("99.0.0") {
      Err(ctx::Error::MinVersion { expected, .. }) => {
        assert_eq!(expected, Version::parse("99.0.0").unwrap());
      },
      other => panic!("expected a version gate error, got {:?}", other)
    }
  }

  #[test]
  fn malformed_min_version_is_reported() {
    match is_supported("not-a-version") {
      Err(ctx::Error::Version(_)) => {},
      other => panic!("expected a parse error, got {:?}", other)
    }
  }
}
