//! The descriptor is a NeXTSTEP-style property list: a `// !$*UTF8*$!`
//! header followed by one big dictionary whose `objects` entry maps 24-digit
//! hex identifiers to typed records (`isa = PBX...`). Records reference each
//! other by identifier, and Xcode tolerates them grouped into commented
//! sections, one per record type, in any order. We emit the section order
//! Xcode itself uses when saving a fresh project.
//!
//! Rather than accumulating output lines directly, `assemble` builds a small
//! typed graph (one node struct per record kind) from the manifest and the
//! identifier plan. `Descriptor::verify` walks that graph and rejects
//! duplicate definitions, references to undefined objects, and objects
//! unreachable from the project root before anything is written.
//! `Descriptor::render` then serializes the graph; for a fixed manifest and
//! plan its output is byte for byte identical across calls.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as FmtWrite;

use crate::ctx::{file_type, EntryKind, Error, GenResult, Manifest};
use super::ids::{ObjectId, Plan};

/// Settings resolved outside the manifest: the effective bundle identifier,
/// the optional signing team, and the path from the build folder back to the
/// project root.
pub struct RenderOptions<'a> {
  pub bundle_id:        &'a str,
  pub team:             Option<&'a str>,
  pub project_dir_path: &'a str
}

type Settings = Vec<(&'static str, String)>;

#[derive(Clone, Copy, PartialEq)]
pub enum Phase {
  Sources,
  Frameworks,
  Resources
}

impl Phase {
  pub fn to_str(self) -> &'static str {
    match self {
      Self::Sources    => "Sources",
      Self::Frameworks => "Frameworks",
      Self::Resources  => "Resources"
    }
  }

  fn isa(self) -> &'static str {
    match self {
      Self::Sources    => "PBXSourcesBuildPhase",
      Self::Frameworks => "PBXFrameworksBuildPhase",
      Self::Resources  => "PBXResourcesBuildPhase"
    }
  }
}

/// Membership of one file in one build phase.
pub struct BuildFile {
  pub id:       ObjectId,
  pub file_ref: ObjectId,
  pub name:     String,
  pub phase:    Phase
}

pub enum RefKind {
  /// An on-disk file, `sourceTree = "<group>"`.
  Known(&'static str),
  /// An SDK framework, `sourceTree = SDKROOT`.
  Framework,
  /// The built product, `sourceTree = BUILT_PRODUCTS_DIR`.
  Product(&'static str)
}

pub struct FileRef {
  pub id:   ObjectId,
  pub name: String,
  pub path: String,
  pub kind: RefKind
}

pub struct BuildPhase {
  pub id:    ObjectId,
  pub phase: Phase,
  pub files: Vec<(ObjectId, String)>
}

pub struct Group {
  pub id:       ObjectId,
  pub name:     Option<String>,
  pub children: Vec<(ObjectId, String)>
}

pub struct NativeTarget {
  pub id:           ObjectId,
  pub name:         String,
  pub cfg_list:     ObjectId,
  pub phases:       Vec<(ObjectId, Phase)>,
  pub product_ref:  ObjectId,
  pub product_name: String
}

pub struct ProjectObject {
  pub id:             ObjectId,
  pub name:           String,
  pub cfg_list:       ObjectId,
  pub compatibility:  &'static str,
  pub upgrade_check:  &'static str,
  pub tools_version:  &'static str,
  pub main_group:     ObjectId,
  pub products_group: ObjectId,
  pub dir_path:       String,
  pub targets:        Vec<(ObjectId, String)>
}

pub struct BuildCfg {
  pub id:       ObjectId,
  pub name:     &'static str,
  pub settings: Settings
}

pub struct CfgList {
  pub id:      ObjectId,
  pub comment: String,
  pub cfgs:    Vec<(ObjectId, &'static str)>
}

pub struct Descriptor {
  pub object_version: u8,
  pub root:           ObjectId,

  pub build_files: Vec<BuildFile>,
  pub file_refs:   Vec<FileRef>,
  pub groups:      Vec<Group>,
  pub target:      NativeTarget,
  pub project:     ProjectObject,

  pub sources_phase:    BuildPhase,
  pub frameworks_phase: BuildPhase,
  pub resources_phase:  BuildPhase,

  pub cfgs:      Vec<BuildCfg>,
  pub cfg_lists: Vec<CfgList>
}

/// Builds the descriptor graph. Pure: the only inputs are the manifest, the
/// identifier plan and the resolved options, so the same arguments produce
/// the same graph.
pub fn assemble(manifest: &Manifest, ids: &Plan, opts: &RenderOptions) -> Descriptor {
  let name         = manifest.name;
  let product_name = [name, ".app"].join("");

  let mut build_files   = Vec::new();
  let mut file_refs     = Vec::new();
  let mut sources       = Vec::new();
  let mut resources     = Vec::new();
  let mut main_children = Vec::new();

  for ((kind, path), fid) in manifest.entries().zip(&ids.files) {
    let file_name = basename(path);
    let phase = match kind {
      EntryKind::Source   => Phase::Sources,
      EntryKind::Resource => Phase::Resources
    };

    build_files.push(BuildFile {
      id:       fid.membership.clone(),
      file_ref: fid.reference.clone(),
      name:     file_name.to_string(),
      phase
    });
    file_refs.push(FileRef {
      id:   fid.reference.clone(),
      name: file_name.to_string(),
      path: path.to_string(),
      kind: RefKind::Known(file_type(kind, path))
    });
    main_children.push((fid.reference.clone(), file_name.to_string()));

    let members = match phase {
      Phase::Sources => &mut sources,
      _              => &mut resources
    };
    members.push((fid.membership.clone(), file_name.to_string()));
  }

  file_refs.push(FileRef {
    id:   ids.product_ref.clone(),
    name: product_name.clone(),
    path: product_name.clone(),
    kind: RefKind::Product("wrapper.application")
  });

  main_children.push((ids.products_group.clone(), "Products".to_string()));

  let mut framework_members = Vec::new();
  for (&fw, fid) in manifest.frameworks.iter().zip(&ids.frameworks) {
    let fw_name = [fw, ".framework"].join("");

    build_files.push(BuildFile {
      id:       fid.membership.clone(),
      file_ref: fid.reference.clone(),
      name:     fw_name.clone(),
      phase:    Phase::Frameworks
    });
    file_refs.push(FileRef {
      id:   fid.reference.clone(),
      name: fw_name.clone(),
      path: ["System/Library/Frameworks/", fw, ".framework"].join(""),
      kind: RefKind::Framework
    });
    main_children.push((fid.reference.clone(), fw_name.clone()));
    framework_members.push((fid.membership.clone(), fw_name));
  }

  let groups = vec!(
    Group {
      id:       ids.main_group.clone(),
      name:     None,
      children: main_children
    },
    Group {
      id:       ids.products_group.clone(),
      name:     Some("Products".to_string()),
      children: vec!((ids.product_ref.clone(), product_name.clone()))
    }
  );

  let target = NativeTarget {
    id:       ids.target.clone(),
    name:     name.to_string(),
    cfg_list: ids.target_cfgs.clone(),
    phases:   vec!((ids.sources_phase.clone(),    Phase::Sources),
                   (ids.resources_phase.clone(),  Phase::Resources),
                   (ids.frameworks_phase.clone(), Phase::Frameworks)),
    product_ref:  ids.product_ref.clone(),
    product_name: product_name.clone()
  };

  let version = manifest.object_version;
  let project = ProjectObject {
    id:             ids.project.clone(),
    name:           name.to_string(),
    cfg_list:       ids.project_cfgs.clone(),
    compatibility:  version.compatibility(),
    upgrade_check:  version.upgrade_check(),
    tools_version:  version.tools_version(),
    main_group:     ids.main_group.clone(),
    products_group: ids.products_group.clone(),
    dir_path:       opts.project_dir_path.to_string(),
    targets:        vec!((ids.target.clone(), name.to_string()))
  };

  let per_target = target_settings(manifest, opts);
  let cfgs = vec!(
    BuildCfg {
      id:       ids.project_debug.clone(),
      name:     "Debug",
      settings: project_settings(true)
    },
    BuildCfg {
      id:       ids.project_release.clone(),
      name:     "Release",
      settings: project_settings(false)
    },
    BuildCfg {
      id:       ids.target_debug.clone(),
      name:     "Debug",
      settings: per_target.clone()
    },
    BuildCfg {
      id:       ids.target_release.clone(),
      name:     "Release",
      settings: per_target
    }
  );

  let cfg_lists = vec!(
    CfgList {
      id:      ids.project_cfgs.clone(),
      comment: format!("Build configuration list for PBXProject \"{}\"", name),
      cfgs:    vec!((ids.project_debug.clone(),   "Debug"),
                    (ids.project_release.clone(), "Release"))
    },
    CfgList {
      id:      ids.target_cfgs.clone(),
      comment: format!("Build configuration list for PBXNativeTarget \"{}\"", name),
      cfgs:    vec!((ids.target_debug.clone(),   "Debug"),
                    (ids.target_release.clone(), "Release"))
    }
  );

  Descriptor {
    object_version: version.number(),
    root:           ids.project.clone(),
    build_files,
    file_refs,
    groups,
    target,
    project,
    sources_phase:    BuildPhase { id: ids.sources_phase.clone(),    phase: Phase::Sources,    files: sources },
    frameworks_phase: BuildPhase { id: ids.frameworks_phase.clone(), phase: Phase::Frameworks, files: framework_members },
    resources_phase:  BuildPhase { id: ids.resources_phase.clone(),  phase: Phase::Resources,  files: resources },
    cfgs,
    cfg_lists
  }
}

impl Descriptor {
  /// Checks the graph before it is rendered: every identifier is defined
  /// exactly once, every reference resolves, every object is reachable
  /// from the project root, and ownership forms no cycle.
  pub fn verify(&self) -> GenResult<()> {
    let mut defined = HashSet::new();
    for id in self.definitions() {
      if !defined.insert(id.as_str()) {
        return Err(Error::Integrity(format!("object {} is defined twice", id)));
      }
    }

    if !defined.contains(self.root.as_str()) {
      return Err(Error::Integrity(format!("root object {} is not defined", self.root)));
    }

    let edges = self.edges();
    for (from, to) in &edges {
      if !defined.contains(to.as_str()) {
        return Err(Error::Integrity(format!("{} references undefined object {}", from, to)));
      }
    }

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in &edges {
      adjacency.entry(from.as_str()).or_default().push(to.as_str());
    }

    let mut visited = HashSet::new();
    let mut pending = vec!(self.root.as_str());
    while let Some(id) = pending.pop() {
      if visited.insert(id) {
        if let Some(next) = adjacency.get(id) {
          pending.extend(next.iter().copied());
        }
      }
    }

    if let Some(id) = self.definitions().find(|d| !visited.contains(d.as_str())) {
      return Err(Error::Integrity(format!("object {} is unreachable from the project", id)));
    }

    // Ownership must form a DAG; the build-file pointer checked above is
    // the one sanctioned back edge.
    let mut indegree: HashMap<&str, usize> = HashMap::new();
    let mut owners:   HashMap<&str, Vec<&str>> = HashMap::new();
    for id in self.definitions() {
      indegree.entry(id.as_str()).or_insert(0);
    }
    for (from, to) in self.owned_edges() {
      owners.entry(from.as_str()).or_default().push(to.as_str());
      *indegree.entry(to.as_str()).or_insert(0) += 1;
    }

    let mut ready: Vec<&str> = indegree.iter()
      .filter(|&(_, &d)| d == 0)
      .map(|(&id, _)| id)
      .collect();
    let mut settled = 0;
    while let Some(id) = ready.pop() {
      settled += 1;
      if let Some(next) = owners.get(id) {
        for &n in next {
          if let Some(d) = indegree.get_mut(n) {
            *d -= 1;
            if *d == 0 {
              ready.push(n);
            }
          }
        }
      }
    }

    match settled == indegree.len() {
      true  => Ok(()),
      false => Err(Error::Integrity("ownership edges form a cycle".to_string()))
    }
  }

  fn definitions(&self) -> impl Iterator<Item = &ObjectId> {
    self.build_files.iter().map(|b| &b.id)
      .chain(self.file_refs.iter().map(|r| &r.id))
      .chain(self.groups.iter().map(|g| &g.id))
      .chain(Some(&self.target.id))
      .chain(Some(&self.project.id))
      .chain(Some(&self.sources_phase.id))
      .chain(Some(&self.frameworks_phase.id))
      .chain(Some(&self.resources_phase.id))
      .chain(self.cfgs.iter().map(|c| &c.id))
      .chain(self.cfg_lists.iter().map(|l| &l.id))
  }

  /// Every reference in the graph, including the build-file pointer that
  /// goes against the ownership direction.
  fn edges(&self) -> Vec<(&ObjectId, &ObjectId)> {
    let mut e = self.owned_edges();
    for b in &self.build_files {
      e.push((&b.id, &b.file_ref));
    }
    e
  }

  fn owned_edges(&self) -> Vec<(&ObjectId, &ObjectId)> {
    let mut e = Vec::new();

    for g in &self.groups {
      for (child, _) in &g.children {
        e.push((&g.id, child));
      }
    }

    for ph in &[&self.sources_phase, &self.frameworks_phase, &self.resources_phase] {
      for (member, _) in &ph.files {
        e.push((&ph.id, member));
      }
    }

    let t = &self.target;
    e.push((&t.id, &t.cfg_list));
    e.push((&t.id, &t.product_ref));
    for (phase, _) in &t.phases {
      e.push((&t.id, phase));
    }

    let p = &self.project;
    e.push((&p.id, &p.cfg_list));
    e.push((&p.id, &p.main_group));
    e.push((&p.id, &p.products_group));
    for (target, _) in &p.targets {
      e.push((&p.id, target));
    }

    for list in &self.cfg_lists {
      for (cfg, _) in &list.cfgs {
        e.push((&list.id, cfg));
      }
    }

    e
  }

  pub fn render(&self) -> String {
    let mut s = String::with_capacity(16 * 1024);
    let w = &mut s;

    write!(w, concat!("// !$*UTF8*$!\n",
                      "{{\n",
                      "\tarchiveVersion = 1;\n",
                      "\tclasses = {{\n",
                      "\t}};\n",
                      "\tobjectVersion = {};\n",
                      "\tobjects = {{\n\n"),
           self.object_version).unwrap();

    self.write_build_files(w);
    self.write_file_refs(w);
    self.frameworks_phase.write(w);
    self.write_groups(w);
    self.write_target(w);
    self.write_project(w);
    self.resources_phase.write(w);
    self.sources_phase.write(w);
    self.write_cfgs(w);
    self.write_cfg_lists(w);

    write!(w, concat!("\t}};\n",
                      "\trootObject = {} /* Project object */;\n",
                      "}}\n"),
           self.root).unwrap();
    s
  }

  fn write_build_files(&self, w: &mut String) {
    w.push_str("\n/* Begin PBXBuildFile section */\n");
    for b in &self.build_files {
      write!(w, concat!("\t\t{id} /* {name} in {phase} */ = {{",
                        "isa = PBXBuildFile; ",
                        "fileRef = {refid} /* {name} */; }};\n"),
             id    = b.id,
             name  = b.name,
             refid = b.file_ref,
             phase = b.phase.to_str()).unwrap();
    }
    w.push_str("/* End PBXBuildFile section */\n");
  }

  fn write_file_refs(&self, w: &mut String) {
    w.push_str("\n/* Begin PBXFileReference section */\n");
    for r in &self.file_refs {
      match r.kind {
        RefKind::Known(file_type) =>
          write!(w, concat!("\t\t{id} /* {name} */ = {{",
                            "isa = PBXFileReference; ",
                            "lastKnownFileType = {ftype}; ",
                            "name = {name_q}; ",
                            "path = {path}; ",
                            "sourceTree = \"<group>\"; }};\n"),
                 id     = r.id,
                 name   = r.name,
                 name_q = quote(&r.name),
                 ftype  = file_type,
                 path   = quote(&r.path)).unwrap(),
        RefKind::Framework =>
          write!(w, concat!("\t\t{id} /* {name} */ = {{",
                            "isa = PBXFileReference; ",
                            "lastKnownFileType = wrapper.framework; ",
                            "name = {name_q}; ",
                            "path = {path}; ",
                            "sourceTree = SDKROOT; }};\n"),
                 id     = r.id,
                 name   = r.name,
                 name_q = quote(&r.name),
                 path   = quote(&r.path)).unwrap(),
        RefKind::Product(file_type) =>
          write!(w, concat!("\t\t{id} /* {name} */ = {{",
                            "isa = PBXFileReference; ",
                            "explicitFileType = {ftype}; ",
                            "includeInIndex = 0; ",
                            "path = {path}; ",
                            "sourceTree = BUILT_PRODUCTS_DIR; }};\n"),
                 id    = r.id,
                 name  = r.name,
                 ftype = file_type,
                 path  = quote(&r.path)).unwrap()
      }
    }
    w.push_str("/* End PBXFileReference section */\n");
  }

  fn write_groups(&self, w: &mut String) {
    w.push_str("\n/* Begin PBXGroup section */\n");
    for g in &self.groups {
      match &g.name {
        None       => write!(w, "\t\t{} = {{\n",          g.id).unwrap(),
        Some(name) => write!(w, "\t\t{} /* {} */ = {{\n", g.id, name).unwrap()
      }
      w.push_str("\t\t\tisa = PBXGroup;\n\t\t\tchildren = (\n");
      for (id, name) in &g.children {
        write!(w, "\t\t\t\t{} /* {} */,\n", id, name).unwrap();
      }
      w.push_str("\t\t\t);\n");
      if let Some(name) = &g.name {
        write!(w, "\t\t\tname = {};\n", quote(name)).unwrap();
      }
      w.push_str("\t\t\tsourceTree = \"<group>\";\n\t\t};\n");
    }
    w.push_str("/* End PBXGroup section */\n");
  }

  fn write_target(&self, w: &mut String) {
    let t = &self.target;
    w.push_str("\n/* Begin PBXNativeTarget section */\n");
    write!(w, concat!("\t\t{id} /* {name} */ = {{\n",
                      "\t\t\tisa = PBXNativeTarget;\n",
                      "\t\t\tbuildConfigurationList = {cfgs} ",
                      "/* Build configuration list for PBXNativeTarget \"{name}\" */;\n",
                      "\t\t\tbuildPhases = (\n"),
           id   = t.id,
           name = t.name,
           cfgs = t.cfg_list).unwrap();
    for (id, phase) in &t.phases {
      write!(w, "\t\t\t\t{} /* {} */,\n", id, phase.to_str()).unwrap();
    }
    write!(w, concat!("\t\t\t);\n",
                      "\t\t\tbuildRules = (\n",
                      "\t\t\t);\n",
                      "\t\t\tdependencies = (\n",
                      "\t\t\t);\n",
                      "\t\t\tname = {name_q};\n",
                      "\t\t\tpackageProductDependencies = (\n",
                      "\t\t\t);\n",
                      "\t\t\tproductName = {name_q};\n",
                      "\t\t\tproductReference = {product} /* {product_name} */;\n",
                      "\t\t\tproductType = \"com.apple.product-type.application\";\n",
                      "\t\t}};\n"),
           name_q       = quote(&t.name),
           product      = t.product_ref,
           product_name = t.product_name).unwrap();
    w.push_str("/* End PBXNativeTarget section */\n");
  }

  fn write_project(&self, w: &mut String) {
    let p = &self.project;
    w.push_str("\n/* Begin PBXProject section */\n");
    write!(w, concat!("\t\t{id} /* Project object */ = {{\n",
                      "\t\t\tisa = PBXProject;\n",
                      "\t\t\tattributes = {{\n",
                      "\t\t\t\tBuildIndependentTargetsInParallel = 1;\n",
                      "\t\t\t\tLastSwiftUpdateCheck = {check};\n",
                      "\t\t\t\tLastUpgradeCheck = {check};\n",
                      "\t\t\t\tTargetAttributes = {{\n"),
           id    = p.id,
           check = p.upgrade_check).unwrap();
    for (id, _) in &p.targets {
      write!(w, concat!("\t\t\t\t\t{id} = {{\n",
                        "\t\t\t\t\t\tCreatedOnToolsVersion = {tools};\n",
                        "\t\t\t\t\t}};\n"),
             id    = id,
             tools = p.tools_version).unwrap();
    }
    write!(w, concat!("\t\t\t\t}};\n",
                      "\t\t\t}};\n",
                      "\t\t\tbuildConfigurationList = {cfgs} ",
                      "/* Build configuration list for PBXProject \"{name}\" */;\n",
                      "\t\t\tcompatibilityVersion = {compat};\n",
                      "\t\t\tdevelopmentRegion = en;\n",
                      "\t\t\thasScannedForEncodings = 0;\n",
                      "\t\t\tknownRegions = (\n",
                      "\t\t\t\ten,\n",
                      "\t\t\t\tBase,\n",
                      "\t\t\t);\n",
                      "\t\t\tmainGroup = {main};\n",
                      "\t\t\tproductRefGroup = {products} /* Products */;\n",
                      "\t\t\tprojectDirPath = {dir};\n",
                      "\t\t\tprojectRoot = \"\";\n",
                      "\t\t\ttargets = (\n"),
           cfgs     = p.cfg_list,
           name     = p.name,
           compat   = quote(p.compatibility),
           main     = p.main_group,
           products = p.products_group,
           dir      = quote(&p.dir_path)).unwrap();
    for (id, name) in &p.targets {
      write!(w, "\t\t\t\t{} /* {} */,\n", id, name).unwrap();
    }
    w.push_str("\t\t\t);\n\t\t};\n/* End PBXProject section */\n");
  }

  fn write_cfgs(&self, w: &mut String) {
    w.push_str("\n/* Begin XCBuildConfiguration section */\n");
    for cfg in &self.cfgs {
      write!(w, concat!("\t\t{} /* {} */ = {{\n",
                        "\t\t\tisa = XCBuildConfiguration;\n",
                        "\t\t\tbuildSettings = {{\n"),
             cfg.id, cfg.name).unwrap();
      for (key, value) in &cfg.settings {
        write!(w, "\t\t\t\t{} = {};\n", key, value).unwrap();
      }
      write!(w, concat!("\t\t\t}};\n",
                        "\t\t\tname = {};\n",
                        "\t\t}};\n"),
             cfg.name).unwrap();
    }
    w.push_str("/* End XCBuildConfiguration section */\n");
  }

  fn write_cfg_lists(&self, w: &mut String) {
    w.push_str("\n/* Begin XCConfigurationList section */\n");
    for list in &self.cfg_lists {
      write!(w, concat!("\t\t{} /* {} */ = {{\n",
                        "\t\t\tisa = XCConfigurationList;\n",
                        "\t\t\tbuildConfigurations = (\n"),
             list.id, list.comment).unwrap();
      for (id, name) in &list.cfgs {
        write!(w, "\t\t\t\t{} /* {} */,\n", id, name).unwrap();
      }
      w.push_str(concat!("\t\t\t);\n",
                         "\t\t\tdefaultConfigurationIsVisible = 0;\n",
                         "\t\t\tdefaultConfigurationName = Release;\n",
                         "\t\t};\n"));
    }
    w.push_str("/* End XCConfigurationList section */\n");
  }
}

impl BuildPhase {
  fn write(&self, w: &mut String) {
    write!(w, concat!("\n/* Begin {isa} section */\n",
                      "\t\t{id} /* {name} */ = {{\n",
                      "\t\t\tisa = {isa};\n",
                      "\t\t\tbuildActionMask = 2147483647;\n",
                      "\t\t\tfiles = (\n"),
           isa  = self.phase.isa(),
           id   = self.id,
           name = self.phase.to_str()).unwrap();
    for (id, name) in &self.files {
      write!(w, "\t\t\t\t{} /* {} in {} */,\n", id, name, self.phase.to_str()).unwrap();
    }
    write!(w, concat!("\t\t\t);\n",
                      "\t\t\trunOnlyForDeploymentPostprocessing = 0;\n",
                      "\t\t}};\n",
                      "/* End {isa} section */\n"),
           isa = self.phase.isa()).unwrap();
  }
}

fn project_settings(debug: bool) -> Settings {
  let mut s = Settings::with_capacity(16);
  let set = |s: &mut Settings, key, value: &str| {
    s.push((key, quote(value).into_owned()));
  };

  set(&mut s, "ALWAYS_SEARCH_USER_PATHS", "NO");
  set(&mut s, "CLANG_ENABLE_MODULES", "YES");
  set(&mut s, "COPY_PHASE_STRIP", "NO");
  set(&mut s, "DEBUG_INFORMATION_FORMAT", match debug {
    true  => "dwarf",
    false => "dwarf-with-dsym"
  });
  if !debug {
    set(&mut s, "ENABLE_NS_ASSERTIONS", "NO");
  }
  set(&mut s, "ENABLE_STRICT_OBJC_MSGSEND", "YES");
  if debug {
    set(&mut s, "ENABLE_TESTABILITY", "YES");
  }
  set(&mut s, "GCC_C_LANGUAGE_STANDARD", "gnu17");
  if debug {
    set(&mut s, "GCC_DYNAMIC_NO_PIC", "NO");
    set(&mut s, "GCC_OPTIMIZATION_LEVEL", "0");
    s.push(("GCC_PREPROCESSOR_DEFINITIONS", r#"("DEBUG=1", "$(inherited)")"#.to_string()));
  }
  set(&mut s, "MTL_ENABLE_DEBUG_INFO", match debug {
    true  => "INCLUDE_SOURCE",
    false => "NO"
  });
  set(&mut s, "MTL_FAST_MATH", "YES");
  if debug {
    set(&mut s, "ONLY_ACTIVE_ARCH", "YES");
    set(&mut s, "SWIFT_ACTIVE_COMPILATION_CONDITIONS", "DEBUG");
  }
  else {
    set(&mut s, "SWIFT_COMPILATION_MODE", "wholemodule");
  }
  set(&mut s, "SWIFT_OPTIMIZATION_LEVEL", match debug {
    true  => "-Onone",
    false => "-O"
  });
  s
}

fn target_settings(manifest: &Manifest, opts: &RenderOptions) -> Settings {
  let mut s = Settings::with_capacity(20);
  let set = |s: &mut Settings, key, value: &str| {
    s.push((key, quote(value).into_owned()));
  };

  set(&mut s, "ASSETCATALOG_COMPILER_APPICON_NAME", "AppIcon");
  set(&mut s, "ASSETCATALOG_COMPILER_GLOBAL_ACCENT_COLOR_NAME", "AccentColor");
  set(&mut s, "COMBINE_HIDPI_IMAGES", "YES");
  set(&mut s, "CURRENT_PROJECT_VERSION", "1");
  if let Some(team) = opts.team {
    set(&mut s, "DEVELOPMENT_TEAM", team);
  }
  set(&mut s, "GENERATE_INFOPLIST_FILE", "YES");
  set(&mut s, "INFOPLIST_KEY_LSApplicationCategoryType", manifest.category);
  set(&mut s, "INFOPLIST_KEY_NSHumanReadableCopyright", "");
  set(&mut s, "INFOPLIST_KEY_NSPrincipalClass", "NSApplication");
  set(&mut s, "MARKETING_VERSION", manifest.version);
  set(&mut s, "MACOS_DEPLOYMENT_TARGET", manifest.macos_deployment_target);
  set(&mut s, "IPHONEOS_DEPLOYMENT_TARGET", manifest.ios_deployment_target);
  set(&mut s, "PRODUCT_BUNDLE_IDENTIFIER", opts.bundle_id);
  set(&mut s, "PRODUCT_NAME", "$(TARGET_NAME)");
  set(&mut s, "SDKROOT", "auto");
  set(&mut s, "SUPPORTED_PLATFORMS", "macosx iphoneos iphonesimulator");
  set(&mut s, "SWIFT_EMIT_LOC_STRINGS", "YES");
  set(&mut s, "SWIFT_VERSION", manifest.swift_version);
  set(&mut s, "TARGETED_DEVICE_FAMILY", "1,2");
  s
}

fn is_plain(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.' || c == '/'
}

/// Quotes a value for the descriptor grammar. Identifier-like strings pass
/// through bare; everything else is wrapped in double quotes with backslash,
/// quote, newline and tab escaped.
pub fn quote(s: &str) -> Cow<'_, str> {
  if !s.is_empty() && s.chars().all(is_plain) {
    return Cow::Borrowed(s);
  }

  let mut q = String::with_capacity(s.len() + 2);
  q.push('"');
  for c in s.chars() {
    match c {
      '\\' => q.push_str("\\\\"),
      '"'  => q.push_str("\\\""),
      '\n' => q.push_str("\\n"),
      '\t' => q.push_str("\\t"),
      _    => q.push(c)
    }
  }
  q.push('"');
  Cow::Owned(q)
}

fn basename(path: &str) -> &str {
  path.rsplit('/').next().unwrap_or(path)
}
