use rand::RngCore;
use std::collections::HashSet;
use std::fmt;

use crate::ctx::{Error, GenResult, Manifest};

/// A 96-bit object identifier, rendered as 24 uppercase hex digits.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ObjectId(String);

impl ObjectId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(&self.0)
  }
}

const MAX_RETRIES: u32 = 16;

/// Hands out descriptor object identifiers. Every identifier drawn from one
/// allocator is unique; a drawn identifier that collides with an earlier one
/// is discarded and redrawn a bounded number of times.
pub struct Allocator {
  prefix: u32,
  seen:   HashSet<String>
}

impl Allocator {
  pub fn new() -> Self {
    Allocator {
      prefix: 0,
      seen:   HashSet::new()
    }
  }

  pub fn next(&mut self) -> GenResult<ObjectId> {
    for _ in 0..MAX_RETRIES {
      let id = self.candidate();
      if self.seen.insert(id.clone()) {
        self.prefix += 1;
        return Ok(ObjectId(id));
      }
    }

    Err(Error::IdCollision(MAX_RETRIES))
  }

  fn candidate(&self) -> String {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes[4..]);

    // Use a counter as the first ID bytes to keep Xcode from reordering
    // objects on its first re-save.
    bytes[0] =  (self.prefix >> 24)         as u8;
    bytes[1] = ((self.prefix >> 16) & 0xFF) as u8;
    bytes[2] = ((self.prefix >> 8)  & 0xFF) as u8;
    bytes[3] =  (self.prefix        & 0xFF) as u8;

    let mut id = String::with_capacity(24);
    for b in &bytes {
      id.push(hex_char(b >> 4));
      id.push(hex_char(b & 0xF));
    }
    id
  }
}

impl Default for Allocator {
  fn default() -> Self {
    Allocator::new()
  }
}

fn hex_char(b: u8) -> char {
  match b < 10 {
    true  => (b'0' + b)        as char,
    false => (b'A' + (b - 10)) as char
  }
}

/// The reference and build-phase membership identifiers of one file.
pub struct FileIds {
  pub reference:  ObjectId,
  pub membership: ObjectId
}

/// Every identifier the descriptor needs, allocated up front in a fixed
/// order so plans for identical manifests have identical shape.
pub struct Plan {
  pub project:        ObjectId,
  pub main_group:     ObjectId,
  pub products_group: ObjectId,
  pub target:         ObjectId,
  pub product_ref:    ObjectId,

  pub sources_phase:    ObjectId,
  pub resources_phase:  ObjectId,
  pub frameworks_phase: ObjectId,

  pub project_debug:   ObjectId,
  pub project_release: ObjectId,
  pub target_debug:    ObjectId,
  pub target_release:  ObjectId,
  pub project_cfgs:    ObjectId,
  pub target_cfgs:     ObjectId,

  pub frameworks: Vec<FileIds>,
  pub files:      Vec<FileIds>
}

impl Plan {
  pub fn assign(ids: &mut Allocator, manifest: &Manifest) -> GenResult<Self> {
    let pair = |ids: &mut Allocator| -> GenResult<FileIds> {
      Ok(FileIds {
        reference:  ids.next()?,
        membership: ids.next()?
      })
    };

    let mut plan = Plan {
      project:          ids.next()?,
      main_group:       ids.next()?,
      products_group:   ids.next()?,
      target:           ids.next()?,
      product_ref:      ids.next()?,
      sources_phase:    ids.next()?,
      resources_phase:  ids.next()?,
      frameworks_phase: ids.next()?,
      project_debug:    ids.next()?,
      project_release:  ids.next()?,
      target_debug:     ids.next()?,
      target_release:   ids.next()?,
      project_cfgs:     ids.next()?,
      target_cfgs:      ids.next()?,
      frameworks:       Vec::with_capacity(manifest.frameworks.len()),
      files:            Vec::with_capacity(manifest.sources.len() + manifest.resources.len())
    };

    for _ in &manifest.frameworks {
      plan.frameworks.push(pair(ids)?);
    }
    for _ in manifest.entries() {
      plan.files.push(pair(ids)?);
    }

    Ok(plan)
  }

  #[cfg(test)]
  pub fn object_count(&self) -> usize {
    14 + 2 * (self.frameworks.len() + self.files.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ctx::tests::demo_manifest;

  #[test]
  fn ids_are_24_uppercase_hex_digits() {
    let mut ids = Allocator::new();
    let id = ids.next().unwrap();

    assert_eq!(id.as_str().len(), 24);
    assert!(id.as_str().chars()
              .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
  }

  #[test]
  fn ids_are_unique() {
    let mut ids = Allocator::new();
    let mut seen = HashSet::new();
    for _ in 0..1000 {
      assert!(seen.insert(ids.next().unwrap()));
    }
  }

  #[test]
  fn ids_sort_in_allocation_order() {
    let mut ids = Allocator::new();
    let a = ids.next().unwrap();
    let b = ids.next().unwrap();
    let c = ids.next().unwrap();

    // The counter prefix occupies the first eight digits.
    assert!(a.as_str()[..8] < b.as_str()[..8]);
    assert!(b.as_str()[..8] < c.as_str()[..8]);
  }

  #[test]
  fn plan_covers_every_object() {
    let m = demo_manifest(vec!("Demo/App.swift", "Demo/Model.swift"),
                          vec!("Demo/Assets.xcassets"));
    let mut ids  = Allocator::new();
    let     plan = Plan::assign(&mut ids, &m).unwrap();

    assert_eq!(plan.frameworks.len(), 1);
    assert_eq!(plan.files.len(), 3);
    assert_eq!(plan.object_count(), 14 + 2 * (1 + 3));
  }
}
