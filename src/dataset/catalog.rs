//! The `labels.json` catalogue of a dataset folder.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color_utils;
use crate::constants::{LABEL_CATALOG_FILENAME, UNASSIGNED_CLASS_ID};
use crate::dataset::DatasetError;
use crate::format::FormatError;
use crate::model::{Category, ClassId};

/// On-disk shape of one catalogue entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryRecord {
    id: ClassId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

impl From<&Category> for CategoryRecord {
    fn from(cat: &Category) -> Self {
        Self {
            id: cat.id,
            name: cat.name.clone(),
            color: Some(cat.hex_color()),
        }
    }
}

/// Class names and colors of one dataset, persisted as `labels.json`.
///
/// Every mutation is written back immediately.
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    path: PathBuf,
    categories: Vec<Category>,
}

impl LabelCatalog {
    /// Path of the catalogue inside a dataset folder.
    pub fn path_for(folder: &Path) -> PathBuf {
        folder.join(LABEL_CATALOG_FILENAME)
    }

    /// Load the catalogue of `folder`.
    ///
    /// A missing file gives an empty catalogue. Entries without a valid
    /// `#RRGGBB` color get a generated one and the file is saved back.
    pub fn load(folder: &Path) -> Result<Self, DatasetError> {
        let path = Self::path_for(folder);
        if !path.exists() {
            log::info!("No {} in {:?}, starting with empty labels", LABEL_CATALOG_FILENAME, folder);
            return Ok(Self {
                path,
                categories: Vec::new(),
            });
        }

        let json = std::fs::read_to_string(&path).map_err(|e| DatasetError::io(&path, e))?;
        let records: Vec<CategoryRecord> =
            serde_json::from_str(&json).map_err(FormatError::from)?;

        let mut rng = rand::rng();
        let mut generated = 0;
        let categories = records
            .into_iter()
            .map(|record| {
                let color = match record.color.as_deref().and_then(color_utils::parse_hex) {
                    Some(color) => color,
                    None => {
                        if let Some(invalid) = &record.color {
                            log::warn!("Label '{}': invalid color {:?}", record.name, invalid);
                        }
                        generated += 1;
                        color_utils::random_label_color(&mut rng)
                    }
                };
                Category::new(record.id, &record.name, color)
            })
            .collect();

        let catalog = Self { path, categories };
        log::info!(
            "Loaded {} labels from {:?}",
            catalog.categories.len(),
            catalog.path
        );

        if generated > 0 {
            log::debug!("Generated {} label colors", generated);
            catalog.save()?;
        }
        Ok(catalog)
    }

    /// Write the catalogue back to `labels.json`.
    pub fn save(&self) -> Result<(), DatasetError> {
        let records: Vec<CategoryRecord> =
            self.categories.iter().map(CategoryRecord::from).collect();
        let json = serde_json::to_string_pretty(&records).map_err(FormatError::from)?;
        std::fs::write(&self.path, json).map_err(|e| DatasetError::io(&self.path, e))?;
        log::info!("Saved {} labels to {:?}", records.len(), self.path);
        Ok(())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: ClassId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Class selected by default: the first entry, or unassigned if there is none.
    pub fn default_class_id(&self) -> ClassId {
        self.categories
            .first()
            .map_or(UNASSIGNED_CLASS_ID, |c| c.id)
    }

    /// Add a label with the next free id and a generated color.
    pub fn add(&mut self, name: &str) -> Result<ClassId, DatasetError> {
        let id = self
            .categories
            .iter()
            .map(|c| c.id)
            .max()
            .map_or(0, |max| max + 1);
        let color = color_utils::random_label_color(&mut rand::rng());
        self.categories.push(Category::new(id, name, color));
        log::debug!("➕ Label '{}' added with id {}", name, id);
        self.save()?;
        Ok(id)
    }

    /// Rename a label. Returns `false` if the id is unknown.
    pub fn rename(&mut self, id: ClassId, name: &str) -> Result<bool, DatasetError> {
        let Some(category) = self.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        category.name = name.to_string();
        log::debug!("✏️ Label {} renamed to '{}'", id, name);
        self.save()?;
        Ok(true)
    }

    /// Remove a label. Boxes using its id are left untouched.
    pub fn remove(&mut self, id: ClassId) -> Result<bool, DatasetError> {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        if self.categories.len() == before {
            return Ok(false);
        }
        log::debug!("🗑️ Label {} removed", id);
        self.save()?;
        Ok(true)
    }

    /// Class id to color, for [`Canvas::set_label_color_map`](crate::canvas::Canvas::set_label_color_map).
    pub fn color_map(&self) -> HashMap<ClassId, [u8; 3]> {
        self.categories.iter().map(|c| (c.id, c.color)).collect()
    }
}
