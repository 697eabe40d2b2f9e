use clap::App;

use crate::ctx::{Command, Context, RunResult};
use crate::report;

pub struct Check;

impl Command for Check {
  fn init<'a, 'b>(&self, cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.about("Checks the manifest's paths against the project tree")
  }

  fn run(&self, ctx: &Context) -> RunResult {
    let report = report::scan(&ctx.input_dir, ctx.manifest)?;
    report.print();

    match ctx.strict {
      true  => report.require_complete(),
      false => Ok(())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ctx::tests::demo_manifest;
  use crate::ctx::{Commands, Env};
  use std::fs;

  #[test]
  fn check_leaves_the_build_folder_alone() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("Demo")).unwrap();
    fs::write(tmp.path().join("Demo/App.swift"), b"").unwrap();

    let m     = demo_manifest(vec!("Demo/App.swift"), vec!());
    let env   = Env::default();
    let args  = App::new("t").get_matches_from(vec!("t"));
    let build = tmp.path().join("build");

    let ctx = Context {
      commands:  Commands::new(),
      input_dir: tmp.path().to_path_buf(),
      build_dir: build.clone(),
      input_rel: tmp.path().to_path_buf(),
      env:       &env,
      args:      &args,
      manifest:  &m,
      strict:    true
    };

    Check.run(&ctx).unwrap();
    assert!(!build.exists());
  }
}
