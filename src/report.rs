use glob::glob;
use std::collections::HashSet;
use std::path::Path;

use crate::ctx::{Error, GenResult, Manifest, RunResult};

pub struct PathCheck {
  pub path:    String,
  pub present: bool
}

/// Outcome of the post-generation verification pass, kept as data so the
/// strict-mode gate and the tests work on it without parsing console text.
pub struct Report {
  pub checks:    Vec<PathCheck>,
  pub untracked: Vec<String>
}

/// Checks every manifest path for existence under the project root and scans
/// for Swift sources on disk that the manifest does not list. Collects
/// everything before reporting; a missing file never halts the scan.
pub fn scan(root: &Path, manifest: &Manifest) -> GenResult<Report> {
  let checks = manifest.entries()
    .map(|(_, path)| PathCheck {
      path:    path.to_string(),
      present: root.join(path).exists()
    })
    .collect();

  let listed: HashSet<&str> = manifest.entries().map(|(_, p)| p).collect();

  let mut untracked = Vec::new();
  if let Some(pattern) = root.join("**/*.swift").to_str() {
    for entry in glob(pattern)? {
      // Unreadable directory entries are skipped, not fatal.
      let path = match entry {
        Ok(p)  => p,
        Err(_) => continue
      };
      if let Ok(rel) = path.strip_prefix(root) {
        let rel = rel.to_string_lossy();
        if !listed.contains(rel.as_ref()) {
          untracked.push(rel.into_owned());
        }
      }
    }
  }
  untracked.sort();

  Ok(Report { checks, untracked })
}

impl Report {
  pub fn missing(&self) -> usize {
    self.checks.iter().filter(|c| !c.present).count()
  }

  pub fn all_present(&self) -> bool {
    self.missing() == 0
  }

  pub fn lines(&self) -> Vec<String> {
    let mut out = vec!("📋 Checking manifest files…".to_string());

    for c in &self.checks {
      out.push(match c.present {
        true  => format!("  ✓ {}", c.path),
        false => format!("  ✗ MISSING: {}", c.path)
      });
    }
    for u in &self.untracked {
      out.push(format!("  • not in manifest: {}", u));
    }

    out.push(String::new());
    out.push(match self.missing() {
      0 => "✅ All manifest files present.".to_string(),
      n => format!("⚠️  {} manifest path(s) are missing. Create them before building.", n)
    });
    out
  }

  pub fn print(&self) {
    for line in self.lines() {
      println!("{}", line);
    }
  }

  /// Strict-mode gate, applied after the full report has been printed.
  pub fn require_complete(&self) -> RunResult {
    match self.missing() {
      0 => Ok(()),
      n => Err(Error::MissingPaths(n))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ctx::tests::demo_manifest;
  use std::fs;

  fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"").unwrap();
  }

  #[test]
  fn scan_marks_present_and_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let m = demo_manifest(vec!("Demo/App.swift", "Demo/Model.swift"),
                          vec!("Demo/Assets.xcassets"));
    touch(tmp.path(), "Demo/App.swift");

    let report = scan(tmp.path(), &m).unwrap();

    assert_eq!(report.checks.len(), 3);
    assert!(report.checks[0].present);
    assert!(!report.checks[1].present);
    assert_eq!(report.missing(), 2);
    assert!(!report.all_present());
    assert!(matches!(report.require_complete(), Err(Error::MissingPaths(2))));
  }

  #[test]
  fn scan_reports_untracked_swift_files() {
    let tmp = tempfile::tempdir().unwrap();
    let m = demo_manifest(vec!("Demo/App.swift"), vec!());
    touch(tmp.path(), "Demo/App.swift");
    touch(tmp.path(), "Demo/Stray.swift");

    let report = scan(tmp.path(), &m).unwrap();

    assert_eq!(report.untracked, vec!("Demo/Stray.swift".to_string()));
    assert!(report.lines().contains(&"  • not in manifest: Demo/Stray.swift".to_string()));
  }

  #[test]
  fn report_lines_follow_check_order() {
    let tmp = tempfile::tempdir().unwrap();
    let m = demo_manifest(vec!("Demo/App.swift"), vec!());

    let report = scan(tmp.path(), &m).unwrap();
    let lines  = report.lines();

    assert_eq!(lines[0], "📋 Checking manifest files…");
    assert_eq!(lines[1], "  ✗ MISSING: Demo/App.swift");
    assert!(lines.last().unwrap().starts_with("⚠️"));
  }

  #[test]
  fn complete_report_passes_strict_gate() {
    let tmp = tempfile::tempdir().unwrap();
    let m = demo_manifest(vec!("Demo/App.swift"), vec!());
    touch(tmp.path(), "Demo/App.swift");

    let report = scan(tmp.path(), &m).unwrap();

    assert!(report.all_present());
    assert!(report.require_complete().is_ok());
    assert_eq!(*report.lines().last().unwrap(), "✅ All manifest files present.");
  }
}
