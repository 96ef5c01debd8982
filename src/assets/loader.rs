//! Filesystem front-end that turns letter files into an [`AssetLibrary`].
//!
//! Decode failures never propagate: a letter that cannot be decoded is simply absent from the
//! library and reported in [`LoadReport::failed`].

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    assets::decode::{LetterFile, classify_file_name, decode_image},
    assets::library::{AssetDescriptor, AssetLibrary, Raster},
    assets::media,
    foundation::{
        core::Fps,
        error::{AnitypeError, AnitypeResult},
    },
};

/// Outcome of loading a set of letter files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Letters now present in the library, in insertion order.
    pub loaded: Vec<char>,
    /// Files that could not be decoded.
    pub failed: Vec<PathBuf>,
}

/// Replace the contents of `library` with the letters found in `files`.
///
/// Stills and videos are inserted in file order; image sequences are inserted afterwards in
/// order of their first frame, each sorted by frame number. Video frame counts are derived
/// at `project_fps`.
#[tracing::instrument(skip(files, library), fields(files = files.len()))]
pub fn load_files(files: &[PathBuf], project_fps: Fps, library: &mut AssetLibrary) -> LoadReport {
    library.clear();
    let mut report = LoadReport::default();
    let mut sequences: Vec<(char, Vec<(u64, PathBuf)>)> = Vec::new();

    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(kind) = classify_file_name(name) else {
            continue;
        };
        match kind {
            LetterFile::SequenceFrame { letter, index } => {
                match sequences.iter_mut().find(|(c, _)| *c == letter) {
                    Some((_, frames)) => frames.push((index, path.clone())),
                    None => sequences.push((letter, vec![(index, path.clone())])),
                }
            }
            LetterFile::Video { letter } => match media::open_video_asset(path, project_fps) {
                Ok(asset) => {
                    library.insert(letter, asset);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "video letter unavailable");
                    report.failed.push(path.clone());
                }
            },
            LetterFile::Still { letter } => match read_raster(path) {
                Ok(raster) => {
                    if let Ok(asset) = AssetDescriptor::image_sequence(vec![raster]) {
                        library.insert(letter, asset);
                    }
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "image letter unavailable");
                    report.failed.push(path.clone());
                }
            },
        }
    }

    for (letter, mut frames) in sequences {
        frames.sort_by_key(|(idx, _)| *idx);
        let mut rasters = Vec::with_capacity(frames.len());
        let mut broken = None;
        for (_, path) in &frames {
            match read_raster(path) {
                Ok(r) => rasters.push(r),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "sequence frame unavailable");
                    broken = Some(path.clone());
                    break;
                }
            }
        }
        if let Some(path) = broken {
            report.failed.push(path);
            continue;
        }
        if let Ok(asset) = AssetDescriptor::image_sequence(rasters) {
            library.insert(letter, asset);
        }
    }

    report.loaded = library.iter().map(|(c, _)| c).collect();
    tracing::info!(
        letters = report.loaded.len(),
        failed = report.failed.len(),
        "letter library loaded"
    );
    report
}

fn read_raster(path: &Path) -> AnitypeResult<Raster> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read letter file '{}'", path.display()))?;
    decode_image(&bytes)
}

/// One named variant of a font pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackVariant {
    pub name: String,
    pub files: Vec<PathBuf>,
}

/// A directory of letter files, optionally split into variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontPack {
    pub name: String,
    pub variants: Vec<PackVariant>,
}

/// Font packs and loose letter files found under an import root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackIndex {
    pub packs: Vec<FontPack>,
    pub loose: Vec<PathBuf>,
}

impl PackIndex {
    /// Files to load for `pack`/`variant`, defaulting to the first pack and its first variant.
    ///
    /// Without any packs, the loose files are returned.
    pub fn select(&self, pack: Option<&str>, variant: Option<&str>) -> AnitypeResult<Vec<PathBuf>> {
        if self.packs.is_empty() {
            if let Some(name) = pack {
                return Err(AnitypeError::validation(format!(
                    "font pack '{name}' not found (no packs under import root)"
                )));
            }
            return Ok(self.loose.clone());
        }
        let chosen = match pack {
            Some(name) => self
                .packs
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| AnitypeError::validation(format!("font pack '{name}' not found")))?,
            None => &self.packs[0],
        };
        let variant = match variant {
            Some(name) => chosen.variants.iter().find(|v| v.name == name).ok_or_else(|| {
                AnitypeError::validation(format!(
                    "variant '{name}' not found in font pack '{}'",
                    chosen.name
                ))
            })?,
            None => chosen.variants.first().ok_or_else(|| {
                AnitypeError::validation(format!("font pack '{}' is empty", chosen.name))
            })?,
        };
        Ok(variant.files.clone())
    }
}

/// Scan `root` for font packs.
///
/// `root/<pack>/<file>` belongs to the `default` variant of `<pack>`;
/// `root/<pack>/<variant>/**/<file>` to the named variant. Files directly under `root` are loose.
/// Names are sorted so the first pack and variant are stable.
pub fn discover_font_packs(root: &Path) -> AnitypeResult<PackIndex> {
    let mut index = PackIndex::default();
    for entry in sorted_entries(root)? {
        if entry.is_dir() {
            let name = file_name_string(&entry);
            let mut variants = BTreeMap::<String, Vec<PathBuf>>::new();
            for inner in sorted_entries(&entry)? {
                if inner.is_dir() {
                    let mut files = Vec::new();
                    collect_files(&inner, &mut files)?;
                    if !files.is_empty() {
                        variants.insert(file_name_string(&inner), files);
                    }
                } else {
                    variants
                        .entry("default".to_string())
                        .or_default()
                        .push(inner);
                }
            }
            if !variants.is_empty() {
                index.packs.push(FontPack {
                    name,
                    variants: variants
                        .into_iter()
                        .map(|(name, files)| PackVariant { name, files })
                        .collect(),
                });
            }
        } else {
            index.loose.push(entry);
        }
    }
    Ok(index)
}

fn sorted_entries(dir: &Path) -> AnitypeResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    let rd = std::fs::read_dir(dir).with_context(|| format!("read dir '{}'", dir.display()))?;
    for entry in rd {
        let entry = entry.with_context(|| format!("read dir entry in '{}'", dir.display()))?;
        out.push(entry.path());
    }
    out.sort();
    Ok(out)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> AnitypeResult<()> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
