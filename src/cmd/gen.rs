use clap::App;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::ctx::{Command, Context, Error, GenResult, RunResult};
use crate::gen::{assets, ids, pbx};
use crate::report;

pub struct Gen;

impl Command for Gen {
  fn init<'a, 'b>(&self, cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.about("Generates the Xcode project descriptor and asset stubs")
  }

  fn run(&self, ctx: &Context) -> RunResult {
    let manifest = ctx.manifest;

    println!("🔨 Generating {} Xcode project…\n", manifest.name);

    // Assemble and self-check the whole object graph before anything
    // touches the disk.
    let mut allocator = ids::Allocator::new();
    let plan = ids::Plan::assign(&mut allocator, manifest)?;

    let opts = pbx::RenderOptions {
      bundle_id:        ctx.bundle_id(),
      team:             ctx.team(),
      project_dir_path: ctx.input_rel.to_str().unwrap_or("")
    };

    let descriptor = pbx::assemble(manifest, &plan, &opts);
    descriptor.verify()?;

    let bundle = [manifest.name, ".xcodeproj"].join("");
    write_descriptor(&ctx.build_dir.join(&bundle), &descriptor.render())?;
    println!("  ✓ Created {}/project.pbxproj", bundle);

    for catalog in manifest.catalogs() {
      assets::scaffold(&ctx.input_dir.join(catalog))?;
      println!("  ✓ Created {}", catalog);
    }

    println!();
    let report = report::scan(&ctx.input_dir, manifest)?;
    report.print();

    if report.all_present() {
      print_next_steps(manifest.name, ctx.bundle_id());
    }

    match ctx.strict {
      true  => report.require_complete(),
      false => Ok(())
    }
  }
}

fn write_descriptor(bundle_dir: &Path, text: &str) -> GenResult<()> {
  create_dir_all(bundle_dir).map_err(|e| Error::write(bundle_dir, e))?;

  let path = bundle_dir.join("project.pbxproj");
  let file = File::create(&path).map_err(|e| Error::write(&path, e))?;

  let mut f = BufWriter::new(file);
  f.write_all(text.as_bytes()).map_err(|e| Error::write(&path, e))?;
  f.flush().map_err(|e| Error::write(&path, e))
}

fn print_next_steps(name: &str, bundle_id: &str) {
  println!(concat!("\n",
                   "🚀 Next steps:\n",
                   "   1. open {name}.xcodeproj\n",
                   "   2. Select your team in Signing & Capabilities\n",
                   "   3. Build and run!\n",
                   "\n",
                   "   Bundle ID: {id}  ← change this to your reverse domain"),
           name = name,
           id   = bundle_id);
}
