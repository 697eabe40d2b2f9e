use clap::App;
use std::fmt::Write;

use crate::ctx::{file_type, Command, Context, EntryKind, Manifest, RunResult};

pub struct Show;

impl Command for Show {
  fn init<'a, 'b>(&self, cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.about("Displays the resolved project manifest")
  }

  fn run(&self, ctx: &Context) -> RunResult {
    print!("{}", describe(ctx.manifest, ctx.bundle_id()));
    Ok(())
  }
}

fn describe(manifest: &Manifest, bundle_id: &str) -> String {
  let mut s = String::new();
  let w = &mut s;

  write!(w, "{} {}\n", manifest.name, manifest.version).unwrap();
  if !manifest.description.is_empty() {
    write!(w, "{}\n", manifest.description).unwrap();
  }

  write!(w, concat!("\n",
                    "bundle id       {id}\n",
                    "object version  {object}\n",
                    "swift           {swift}\n",
                    "macos target    {macos}\n",
                    "ios target      {ios}\n"),
         id     = bundle_id,
         object = manifest.object_version.number(),
         swift  = manifest.swift_version,
         macos  = manifest.macos_deployment_target,
         ios    = manifest.ios_deployment_target).unwrap();

  write!(w, "\nsources\n").unwrap();
  for &path in &manifest.sources {
    write!(w, "  {}  [{}]\n", path, file_type(EntryKind::Source, path)).unwrap();
  }

  if !manifest.resources.is_empty() {
    write!(w, "\nresources\n").unwrap();
    for &path in &manifest.resources {
      write!(w, "  {}  [{}]\n", path, file_type(EntryKind::Resource, path)).unwrap();
    }
  }

  write!(w, "\nframeworks\n").unwrap();
  for framework in &manifest.frameworks {
    write!(w, "  {}\n", framework).unwrap();
  }

  s
}
