use clap::{App, ArgMatches};
use semver::Version;
use serde::Deserialize;
use serde_repr::Deserialize_repr;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub trait Command {
  fn init<'a, 'b>(&self, cmd: App<'a, 'b>) -> App<'a, 'b>;

  fn run(&self, ctx: &Context) -> RunResult;
}

pub type GenResult<T> = Result<T, Error>;
pub type RunResult    = GenResult<()>;

pub type Commands = BTreeMap<&'static str, Box<dyn Command>>;

pub struct Context<'a> {
  pub commands: Commands,

  pub input_dir: PathBuf,
  pub build_dir: PathBuf,

  /// Path of the project root relative to the build folder. Equals the
  /// project root when generating in place.
  pub input_rel: PathBuf,

  pub env:      &'a Env,
  pub args:     &'a ArgMatches<'a>,
  pub manifest: &'a Manifest<'a>,

  pub strict: bool
}

impl<'a> Context<'a> {
  pub fn bundle_id(&self) -> &str {
    self.env.pbxgen_bundle_id.as_deref().unwrap_or(self.manifest.bundle_id)
  }

  pub fn team(&self) -> Option<&str> {
    self.env.pbxgen_team.as_deref()
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Env {
  pub pbxgen_bundle_id: Option<String>,
  pub pbxgen_team:      Option<String>
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest<'a> {
  #[serde(rename = "project")]
  #[serde(borrow)]
  pub info: ProjectInfo<'a>,

  #[serde(borrow)]
  pub sources: Vec<&'a str>,

  #[serde(default)]
  #[serde(borrow)]
  pub resources: Vec<&'a str>,

  #[serde(default = "default_frameworks")]
  #[serde(borrow)]
  pub frameworks: Vec<&'a str>
}

impl<'a> std::ops::Deref for Manifest<'a> {
  type Target = ProjectInfo<'a>;

  fn deref(&self) -> &ProjectInfo<'a> {
    &self.info
  }
}

impl<'a> Manifest<'a> {
  /// All file entries in manifest order, sources first. This order decides
  /// where objects land in the generated descriptor.
  pub fn entries(&self) -> impl Iterator<Item = (EntryKind, &'a str)> + '_ {
    let sources   = self.sources.iter().map(|&p| (EntryKind::Source, p));
    let resources = self.resources.iter().map(|&p| (EntryKind::Resource, p));
    sources.chain(resources)
  }

  /// Resource entries that are asset catalogs and get scaffolded on disk.
  pub fn catalogs(&self) -> impl Iterator<Item = &'a str> + '_ {
    self.resources.iter().cloned().filter(|p| p.ends_with(".xcassets"))
  }

  pub fn validate(&self) -> Result<(), ManifestError> {
    if self.sources.is_empty() {
      return Err(ManifestError::NoSources);
    }

    let mut seen = HashSet::new();
    for (kind, path) in self.entries() {
      if path.is_empty() {
        return Err(ManifestError::EmptyPath(kind));
      }

      let p = Path::new(path);
      if p.is_absolute() || p.components().any(|c| c == Component::ParentDir) {
        return Err(ManifestError::OutsideRoot(path.to_string()));
      }

      if !seen.insert(path) {
        return Err(ManifestError::DuplicatePath(path.to_string()));
      }

      if kind == EntryKind::Source && source_file_type(extension(path)).is_none() {
        return Err(ManifestError::UnsupportedFileType(path.to_string()));
      }
    }

    let mut seen = HashSet::new();
    for &name in &self.frameworks {
      if name.is_empty() {
        return Err(ManifestError::EmptyFramework);
      }
      if !seen.insert(name) {
        return Err(ManifestError::DuplicateFramework(name.to_string()));
      }
    }

    Ok(())
  }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectInfo<'a> {
  pub name:      &'a str,
  pub bundle_id: &'a str,

  #[serde(default = "default_version")]
  pub version: &'a str,

  #[serde(default)]
  pub description: &'a str,

  #[serde(default)]
  pub min_pbxgen_version: &'a str,

  #[serde(default = "default_macos_target")]
  pub macos_deployment_target: &'a str,

  #[serde(default = "default_ios_target")]
  pub ios_deployment_target: &'a str,

  #[serde(default = "default_swift_version")]
  pub swift_version: &'a str,

  #[serde(default)]
  pub object_version: ObjectVersion,

  #[serde(default = "default_category")]
  pub category: &'a str
}

fn default_version() -> &'static str {
  "1.0"
}
fn default_macos_target() -> &'static str {
  "14.0"
}
fn default_ios_target() -> &'static str {
  "17.0"
}
fn default_swift_version() -> &'static str {
  "5.10"
}
fn default_category() -> &'static str {
  "public.app-category.productivity"
}
fn default_frameworks<'a>() -> Vec<&'a str> {
  vec!("SwiftData")
}

/// The `objectVersion` of the emitted descriptor, which fixes the Xcode
/// generation the project claims compatibility with.
#[derive(Clone, Copy, Debug, Deserialize_repr, PartialEq)]
#[repr(u8)]
pub enum ObjectVersion {
  Xcode93  = 50,
  Xcode140 = 56,
  Xcode150 = 77
}

impl Default for ObjectVersion {
  fn default() -> Self { ObjectVersion::Xcode150 }
}

impl ObjectVersion {
  pub fn number(self) -> u8 {
    self as u8
  }

  pub fn compatibility(self) -> &'static str {
    match self {
      Self::Xcode93  => "Xcode 9.3",
      Self::Xcode140 => "Xcode 14.0",
      Self::Xcode150 => "Xcode 15.0"
    }
  }

  pub fn upgrade_check(self) -> &'static str {
    match self {
      Self::Xcode93  => "1100",
      Self::Xcode140 => "1400",
      Self::Xcode150 => "1500"
    }
  }

  pub fn tools_version(self) -> &'static str {
    match self {
      Self::Xcode93  => "11.0",
      Self::Xcode140 => "14.0",
      Self::Xcode150 => "15.0"
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntryKind {
  Source,
  Resource
}

impl EntryKind {
  pub fn to_str(self) -> &'static str {
    match self {
      Self::Source   => "source",
      Self::Resource => "resource"
    }
  }
}

impl fmt::Display for EntryKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.to_str())
  }
}

pub fn extension(path: &str) -> &str {
  Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// `lastKnownFileType` for entries compiled in the sources phase. Sources
/// with no compilable type are rejected when the manifest is validated.
pub fn source_file_type(ext: &str) -> Option<&'static str> {
  match ext {
    "swift"      => Some("sourcecode.swift"),
    "c"          => Some("sourcecode.c.c"),
    "m"          => Some("sourcecode.c.objc"),
    "mm"         => Some("sourcecode.cpp.objcpp"),
    "cc" | "cpp" => Some("sourcecode.cpp.cpp"),
    "metal"      => Some("sourcecode.metal"),
    _            => None
  }
}

/// `lastKnownFileType` for entries copied in the resources phase. Unknown
/// extensions fall back to the generic `file` marker; Xcode treats those as
/// opaque data.
pub fn resource_file_type(ext: &str) -> &'static str {
  match ext {
    "xcassets"        => "folder.assetcatalog",
    "plist"           => "text.plist.xml",
    "json"            => "text.json",
    "png"             => "image.png",
    "jpg" | "jpeg"    => "image.jpeg",
    "storyboard"      => "file.storyboard",
    "xib"             => "file.xib",
    "strings"         => "text.plist.strings",
    "md" | "markdown" => "net.daringfireball.markdown",
    "xml"             => "text.xml",
    "txt"             => "text",
    _                 => "file"
  }
}

pub fn file_type(kind: EntryKind, path: &str) -> &'static str {
  let ext = extension(path);
  match kind {
    EntryKind::Source   => source_file_type(ext).unwrap_or("file"),
    EntryKind::Resource => resource_file_type(ext)
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum ManifestError {
  #[error("manifest lists no source files")]
  NoSources,

  #[error("empty {0} path")]
  EmptyPath(EntryKind),

  #[error("duplicate path: {0}")]
  DuplicatePath(String),

  #[error("path outside the project root: {0}")]
  OutsideRoot(String),

  #[error("unsupported source file type: {0}")]
  UnsupportedFileType(String),

  #[error("empty framework name")]
  EmptyFramework,

  #[error("duplicate framework: {0}")]
  DuplicateFramework(String)
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid manifest: {0}")]
  Manifest(#[from] ManifestError),

  #[error("invalid version: {0}")]
  Version(#[from] semver::SemVerError),

  #[error("project requires pbxgen {expected} but this is {current}")]
  MinVersion { expected: Version, current: Version },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },

  #[error("identifier collision persisted after {0} attempts")]
  IdCollision(u32),

  #[error("descriptor integrity: {0}")]
  Integrity(String),

  #[error("{0} manifest path(s) missing")]
  MissingPaths(usize),

  #[error("invalid scan pattern: {0}")]
  Scan(#[from] glob::PatternError)
}

impl Error {
  pub fn write(path: &Path, source: std::io::Error) -> Self {
    Error::Write { path: path.to_path_buf(), source }
  }
}

#[cfg(test)]
pub mod tests {
  use super::*;

  pub fn demo_info() -> ProjectInfo<'static> {
    ProjectInfo {
      name:                    "Demo",
      bundle_id:               "com.example.demo",
      version:                 "1.0",
      description:             "",
      min_pbxgen_version:      "",
      macos_deployment_target: "14.0",
      ios_deployment_target:   "17.0",
      swift_version:           "5.10",
      object_version:          ObjectVersion::default(),
      category:                "public.app-category.productivity"
    }
  }

  pub fn demo_manifest(sources: Vec<&'static str>,
                       resources: Vec<&'static str>) -> Manifest<'static> {
    Manifest {
      info: demo_info(),
      sources,
      resources,
      frameworks: vec!("SwiftData")
    }
  }

  #[test]
  fn valid_manifest_passes() {
    let m = demo_manifest(vec!("Demo/App.swift", "Demo/Model.swift"),
                          vec!("Demo/Assets.xcassets"));
    assert!(m.validate().is_ok());
  }

  #[test]
  fn empty_sources_rejected() {
    let m = demo_manifest(vec!(), vec!("Demo/Assets.xcassets"));
    assert_eq!(m.validate(), Err(ManifestError::NoSources));
  }

  #[test]
  fn empty_path_rejected() {
    let m = demo_manifest(vec!("Demo/App.swift", ""), vec!());
    assert_eq!(m.validate(), Err(ManifestError::EmptyPath(EntryKind::Source)));
  }

  #[test]
  fn duplicate_path_rejected() {
    let m = demo_manifest(vec!("Demo/App.swift"), vec!("Demo/App.swift"));
    assert_eq!(m.validate(),
               Err(ManifestError::DuplicatePath("Demo/App.swift".to_string())));
  }

  #[test]
  fn absolute_path_rejected() {
    let m = demo_manifest(vec!("/etc/App.swift"), vec!());
    assert_eq!(m.validate(),
               Err(ManifestError::OutsideRoot("/etc/App.swift".to_string())));
  }

  #[test]
  fn parent_traversal_rejected() {
    let m = demo_manifest(vec!("Demo/App.swift"), vec!("../Other/x.png"));
    assert_eq!(m.validate(),
               Err(ManifestError::OutsideRoot("../Other/x.png".to_string())));
  }

  #[test]
  fn unknown_source_extension_rejected() {
    let m = demo_manifest(vec!("App/Widget.wgt"), vec!());
    assert_eq!(m.validate(),
               Err(ManifestError::UnsupportedFileType("App/Widget.wgt".to_string())));
  }

  #[test]
  fn empty_framework_rejected() {
    let mut m = demo_manifest(vec!("Demo/App.swift"), vec!());
    m.frameworks = vec!("");
    assert_eq!(m.validate(), Err(ManifestError::EmptyFramework));
  }

  #[test]
  fn duplicate_framework_rejected() {
    let mut m = demo_manifest(vec!("Demo/App.swift"), vec!());
    m.frameworks = vec!("SwiftData", "AVFoundation", "SwiftData");
    assert_eq!(m.validate(),
               Err(ManifestError::DuplicateFramework("SwiftData".to_string())));
  }

  #[test]
  fn unknown_resource_extension_accepted() {
    let m = demo_manifest(vec!("Demo/App.swift"), vec!("Demo/blob.weird"));
    assert!(m.validate().is_ok());
    assert_eq!(file_type(EntryKind::Resource, "Demo/blob.weird"), "file");
  }

  #[test]
  fn entries_preserve_manifest_order() {
    let m = demo_manifest(vec!("b/B.swift", "a/A.swift"), vec!("r/R.xcassets"));
    let order: Vec<(EntryKind, &str)> = m.entries().collect();
    assert_eq!(order, vec!((EntryKind::Source, "b/B.swift"),
                           (EntryKind::Source, "a/A.swift"),
                           (EntryKind::Resource, "r/R.xcassets")));
  }

  #[test]
  fn file_types() {
    assert_eq!(file_type(EntryKind::Source, "A/B.swift"), "sourcecode.swift");
    assert_eq!(file_type(EntryKind::Source, "A/B.m"), "sourcecode.c.objc");
    assert_eq!(file_type(EntryKind::Resource, "A/X.xcassets"), "folder.assetcatalog");
    assert_eq!(file_type(EntryKind::Resource, "A/I.plist"), "text.plist.xml");
  }

  #[test]
  fn manifest_toml_defaults() {
    let m: Manifest = toml::from_slice(concat!(
      "sources = [\"Demo/App.swift\"]\n",
      "\n",
      "[project]\n",
      "name = \"Demo\"\n",
      "bundle_id = \"com.example.demo\"\n"
    ).as_bytes()).unwrap();

    assert_eq!(m.name, "Demo");
    assert_eq!(m.version, "1.0");
    assert_eq!(m.macos_deployment_target, "14.0");
    assert_eq!(m.ios_deployment_target, "17.0");
    assert_eq!(m.swift_version, "5.10");
    assert_eq!(m.object_version, ObjectVersion::Xcode150);
    assert_eq!(m.frameworks, vec!("SwiftData"));
    assert!(m.resources.is_empty());
  }

  #[test]
  fn manifest_toml_object_version() {
    let m: Manifest = toml::from_slice(concat!(
      "sources = [\"Demo/App.swift\"]\n",
      "\n",
      "[project]\n",
      "name = \"Demo\"\n",
      "bundle_id = \"com.example.demo\"\n",
      "object_version = 50\n"
    ).as_bytes()).unwrap();

    assert_eq!(m.object_version, ObjectVersion::Xcode93);
    assert_eq!(m.object_version.compatibility(), "Xcode 9.3");
  }

  #[test]
  fn manifest_toml_unknown_field_rejected() {
    let r: Result<Manifest, _> = toml::from_slice(concat!(
      "sources = [\"Demo/App.swift\"]\n",
      "\n",
      "[project]\n",
      "name = \"Demo\"\n",
      "bundle_id = \"com.example.demo\"\n",
      "mystery = true\n"
    ).as_bytes());

    assert!(r.is_err());
  }
}
