use serde::Serialize;
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::ctx::{Error, GenResult};

#[derive(Serialize)]
struct Info {
  author:  &'static str,
  version: u32
}

impl Info {
  fn new() -> Self {
    Info {
      author:  "pbxgen",
      version: 1
    }
  }
}

#[derive(Serialize)]
struct Catalog {
  info: Info
}

#[derive(Serialize)]
struct IconSlot {
  idiom: &'static str,

  #[serde(skip_serializing_if = "Option::is_none")]
  platform: Option<&'static str>,

  size: &'static str,

  #[serde(skip_serializing_if = "Option::is_none")]
  scale: Option<&'static str>
}

#[derive(Serialize)]
struct IconSet {
  images: Vec<IconSlot>,
  info:   Info
}

#[derive(Serialize)]
struct Components {
  red:   &'static str,
  green: &'static str,
  blue:  &'static str,
  alpha: &'static str
}

#[derive(Serialize)]
struct ColorValue {
  #[serde(rename = "color-space")]
  color_space: &'static str,
  components:  Components
}

#[derive(Serialize)]
struct ColorSlot {
  idiom: &'static str,
  color: ColorValue
}

#[derive(Serialize)]
struct ColorSet {
  colors: Vec<ColorSlot>,
  info:   Info
}

/// One 1024x1024 slot per supported platform; Xcode scales the rest.
fn icon_set() -> IconSet {
  IconSet {
    images: vec!(
      IconSlot {
        idiom:    "universal",
        platform: Some("ios"),
        size:     "1024x1024",
        scale:    None
      },
      IconSlot {
        idiom:    "mac",
        platform: None,
        size:     "1024x1024",
        scale:    Some("1x")
      }
    ),
    info: Info::new()
  }
}

fn accent_color() -> ColorSet {
  ColorSet {
    colors: vec!(ColorSlot {
      idiom: "universal",
      color: ColorValue {
        color_space: "srgb",
        components:  Components {
          red:   "0.337",
          green: "0.333",
          blue:  "0.996",
          alpha: "1.000"
        }
      }
    }),
    info: Info::new()
  }
}

/// Scaffolds one asset catalog: the catalog root plus the app-icon and
/// accent-color sets a fresh application expects. Safe to re-run over an
/// existing catalog; the stubs are rewritten in place.
pub fn scaffold(catalog_dir: &Path) -> GenResult<()> {
  write_contents(catalog_dir, &Catalog { info: Info::new() })?;
  write_contents(&catalog_dir.join("AppIcon.appiconset"), &icon_set())?;
  write_contents(&catalog_dir.join("AccentColor.colorset"), &accent_color())?;
  Ok(())
}

fn write_contents<T: Serialize>(dir: &Path, content: &T) -> GenResult<()> {
  create_dir_all(dir).map_err(|e| Error::write(dir, e))?;

  let path = dir.join("Contents.json");
  let file = File::create(&path).map_err(|e| Error::write(&path, e))?;

  let mut f = BufWriter::new(file);
  serde_json::to_writer_pretty(&mut f, content)
    .map_err(|e| Error::write(&path, e.into()))?;
  f.flush().map_err(|e| Error::write(&path, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn catalog_root_stub() {
    assert_eq!(serde_json::to_value(Catalog { info: Info::new() }).unwrap(),
               json!({"info": {"author": "pbxgen", "version": 1}}));
  }

  #[test]
  fn icon_set_stub() {
    assert_eq!(serde_json::to_value(icon_set()).unwrap(), json!({
      "images": [
        {"idiom": "universal", "platform": "ios", "size": "1024x1024"},
        {"idiom": "mac", "size": "1024x1024", "scale": "1x"}
      ],
      "info": {"author": "pbxgen", "version": 1}
    }));
  }

  #[test]
  fn accent_color_stub() {
    assert_eq!(serde_json::to_value(accent_color()).unwrap(), json!({
      "colors": [
        {"idiom": "universal",
         "color": {"color-space": "srgb",
                   "components": {"red": "0.337", "green": "0.333",
                                  "blue": "0.996", "alpha": "1.000"}}}
      ],
      "info": {"author": "pbxgen", "version": 1}
    }));
  }

  #[test]
  fn scaffold_writes_all_three_stubs() {
    let tmp = tempfile::tempdir().unwrap();
    let cat = tmp.path().join("Assets.xcassets");

    scaffold(&cat).unwrap();
    assert!(cat.join("Contents.json").is_file());
    assert!(cat.join("AppIcon.appiconset/Contents.json").is_file());
    assert!(cat.join("AccentColor.colorset/Contents.json").is_file());

    // Re-running over the existing tree must succeed.
    scaffold(&cat).unwrap();

    let root = File::open(cat.join("Contents.json")).unwrap();
    let v: serde_json::Value = serde_json::from_reader(root).unwrap();
    assert_eq!(v["info"]["author"], "pbxgen");
  }
}
