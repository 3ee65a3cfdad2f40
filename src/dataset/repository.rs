//! Per-image state of a dataset folder and the hand-off to the canvas.

use std::path::{Path, PathBuf};

use crate::canvas::Canvas;
use crate::constants::{IMAGE_EXTENSIONS, LABEL_FILE_EXTENSION};
use crate::dataset::DatasetError;
use crate::format::{FormatError, LabelSerializer};
use crate::model::BoundingBox;

/// Check if a path has a supported image extension
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// A label file counts as labelled when it exists and is not empty.
fn has_label_content(label_path: &Path) -> bool {
    std::fs::metadata(label_path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// State of one image in the dataset.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    path: PathBuf,
    /// Hidden images are not shown on the canvas
    pub visible: bool,
    /// Whether a non-empty label file exists for the image
    pub labelled: bool,
    boxes: Vec<BoundingBox>,
    /// Label file already read into `boxes`
    loaded: bool,
    /// Label file failed to parse and has not been edited over since
    unreadable: bool,
    dimensions: Option<(u32, u32)>,
}

impl ImageRecord {
    fn new(path: PathBuf, labelled: bool) -> Self {
        Self {
            path,
            visible: true,
            labelled,
            boxes: Vec::new(),
            loaded: false,
            unreadable: false,
            dimensions: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Boxes kept in memory for this image (possibly unsaved).
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Pixel size, known once the image has been displayed.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }
}

/// Result of showing an image on the canvas.
#[derive(Debug)]
pub enum Displayed {
    /// The image is on the canvas with its boxes.
    Shown {
        width: u32,
        height: u32,
        box_count: usize,
        /// Set if the label file could not be read; the image is shown without boxes.
        label_error: Option<FormatError>,
    },
    /// The image is hidden; the canvas was emptied.
    Hidden,
}

/// What [`DatasetRepository::save_current`] did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The label file was written with this many lines.
    Written(usize),
    /// No eligible boxes: the label file was deleted.
    Removed,
    /// No eligible boxes and no label file existed.
    Unchanged,
    /// The label file could not be parsed and nothing was edited; it was left as is.
    Skipped,
}

/// Images of a dataset folder with their in-memory box lists.
#[derive(Debug, Clone)]
pub struct DatasetRepository {
    folder: PathBuf,
    images: Vec<ImageRecord>,
    /// Image whose boxes are on the canvas
    current: Option<usize>,
    /// Image last requested by the shell, shown or not
    selected: Option<usize>,
}

impl DatasetRepository {
    /// Discover image files in a folder, non-recursively, sorted by path.
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let folder = folder.into();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&folder)
            .map_err(|e| DatasetError::io(&folder, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();

        if paths.is_empty() {
            return Err(DatasetError::NoImages(folder));
        }
        paths.sort();

        let images: Vec<ImageRecord> = paths
            .into_iter()
            .map(|path| {
                let labelled = has_label_content(&label_path_for(&path));
                ImageRecord::new(path, labelled)
            })
            .collect();

        log::info!(
            "Opened dataset {:?}: {} images, {} labelled",
            folder,
            images.len(),
            images.iter().filter(|r| r.labelled).count()
        );

        Ok(Self {
            folder,
            images,
            current: None,
            selected: None,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Index of the image shown on the canvas.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn record(&self, index: usize) -> Option<&ImageRecord> {
        self.images.get(index)
    }

    /// Show image `index` on the canvas.
    ///
    /// The canvas boxes are first copied back to the image that was on
    /// screen, then the new image's boxes are handed over. The label file
    /// is read the first time an image is shown, and again on later visits
    /// while it fails to parse and has not been edited. Otherwise the
    /// in-memory list (with unsaved edits) is used.
    pub fn switch_image(
        &mut self,
        index: usize,
        canvas: &mut Canvas,
    ) -> Result<Displayed, DatasetError> {
        self.check_index(index)?;
        self.stash(canvas);
        self.selected = Some(index);

        let record = &mut self.images[index];
        if !record.visible {
            log::info!("Image hidden: {:?}", record.path);
            canvas.unload_image();
            self.current = None;
            return Ok(Displayed::Hidden);
        }

        let (width, height) = match image::image_dimensions(&record.path) {
            Ok(dimensions) => dimensions,
            Err(source) => {
                canvas.unload_image();
                self.current = None;
                return Err(DatasetError::ImageDimensions {
                    path: record.path.clone(),
                    source,
                });
            }
        };
        record.dimensions = Some((width, height));

        let mut label_error = None;
        if !record.loaded {
            match read_label_file(&record.path, width, height) {
                Ok(boxes) => {
                    record.boxes = boxes;
                    record.loaded = true;
                    record.unreadable = false;
                }
                Err(e) => {
                    log::warn!("Failed to load labels for {:?}: {}", record.path, e);
                    record.boxes.clear();
                    record.unreadable = true;
                    label_error = Some(e);
                }
            }
        }

        canvas.load_image(width, height);
        canvas.set_bounding_boxes(record.boxes.clone());
        self.current = Some(index);

        log::info!(
            "Displaying {:?} ({}x{}, {} boxes)",
            record.path,
            width,
            height,
            record.boxes.len()
        );
        Ok(Displayed::Shown {
            width,
            height,
            box_count: record.boxes.len(),
            label_error,
        })
    }

    /// Show or hide an image. Re-displays it if it is the selected one.
    pub fn set_visibility(
        &mut self,
        index: usize,
        visible: bool,
        canvas: &mut Canvas,
    ) -> Result<Option<Displayed>, DatasetError> {
        self.check_index(index)?;
        self.images[index].visible = visible;
        log::debug!("Image {} visible: {}", index, visible);

        if self.selected == Some(index) {
            self.switch_image(index, canvas).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Write the canvas boxes of the current image to its label file.
    ///
    /// With no eligible (non-degenerate) boxes the label file is removed
    /// instead. A label file that failed to parse is left untouched unless
    /// the boxes were edited. On I/O failure the labelled status is left as it was.
    pub fn save_current(&mut self, canvas: &Canvas) -> Result<SaveOutcome, DatasetError> {
        let Some(index) = self.current else {
            log::warn!("No image displayed, nothing to save");
            return Ok(SaveOutcome::Unchanged);
        };
        self.stash(canvas);

        let record = &mut self.images[index];
        let label_path = label_path_for(&record.path);

        if record.unreadable {
            log::warn!("Not saving over unreadable label file {:?}", label_path);
            return Ok(SaveOutcome::Skipped);
        }

        if LabelSerializer::eligible_count(&record.boxes) == 0 {
            return match std::fs::remove_file(&label_path) {
                Ok(()) => {
                    log::info!("🗑️ Removed empty label file {:?}", label_path);
                    record.labelled = false;
                    Ok(SaveOutcome::Removed)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    record.labelled = false;
                    Ok(SaveOutcome::Unchanged)
                }
                Err(e) => Err(DatasetError::io(label_path, e)),
            };
        }

        let (width, height) = record.dimensions.unwrap_or((0, 0));
        let serializer = LabelSerializer::new(width, height)?;
        let content = serializer.format_label_file(&record.boxes);
        std::fs::write(&label_path, &content).map_err(|e| DatasetError::io(&label_path, e))?;

        let lines = content.lines().count();
        record.labelled = true;
        log::info!("Saved {} boxes to {:?}", lines, label_path);
        Ok(SaveOutcome::Written(lines))
    }

    /// Remove all boxes of the current image (undoable on the canvas).
    ///
    /// The labelled status and the label file are kept until the next save.
    pub fn clear_current(&mut self, canvas: &mut Canvas) {
        let Some(index) = self.current else {
            log::warn!("No image displayed, nothing to clear");
            return;
        };
        canvas.clear_boxes();
        let record = &mut self.images[index];
        record.boxes.clear();
        log::debug!("🗑️ Cleared boxes of {:?}", record.path);
    }

    /// Read and validate the label file of an image without displaying it.
    ///
    /// Returns the number of boxes in the file (0 if there is none).
    pub fn check_labels(&self, index: usize) -> Result<usize, DatasetError> {
        self.check_index(index)?;
        let path = &self.images[index].path;
        let (width, height) =
            image::image_dimensions(path).map_err(|source| DatasetError::ImageDimensions {
                path: path.clone(),
                source,
            })?;
        Ok(read_label_file(path, width, height)?.len())
    }

    /// Copy the canvas boxes into the record of the image on screen.
    ///
    /// An unreadable label file stays pending for a re-read until the user
    /// edits the boxes.
    fn stash(&mut self, canvas: &Canvas) {
        if let Some(current) = self.current {
            let record = &mut self.images[current];
            record.boxes = canvas.bounding_boxes().to_vec();
            if record.unreadable && !canvas.store().can_undo() {
                return;
            }
            record.loaded = true;
            record.unreadable = false;
        }
    }

    fn check_index(&self, index: usize) -> Result<(), DatasetError> {
        if index < self.images.len() {
            Ok(())
        } else {
            Err(DatasetError::UnknownImage {
                index,
                len: self.images.len(),
            })
        }
    }
}

/// Label file of an image: same folder, same stem, `.txt`.
pub fn label_path_for(image_path: &Path) -> PathBuf {
    image_path.with_extension(LABEL_FILE_EXTENSION)
}

/// Load the boxes of an image's label file. A missing file means no boxes.
fn read_label_file(
    image_path: &Path,
    width: u32,
    height: u32,
) -> Result<Vec<BoundingBox>, FormatError> {
    let label_path = label_path_for(image_path);
    let content = match std::fs::read_to_string(&label_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    LabelSerializer::new(width, height)?.parse_label_file(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mode, Point, Rect};
    use crate::event::{InputEvent, MouseButton};

    struct TempDataset {
        dir: PathBuf,
    }

    impl TempDataset {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "annobox-dataset-{}-{}",
                name,
                std::process::id()
            ));
            let _ = std::fs::remove_dir_all(&dir);
            std::fs::create_dir_all(&dir).unwrap();
            Self { dir }
        }

        fn image(&self, name: &str, width: u32, height: u32) -> PathBuf {
            let path = self.dir.join(name);
            image::RgbImage::new(width, height).save(&path).unwrap();
            path
        }

        fn file(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.join(name);
            std::fs::write(&path, content).unwrap();
            path
        }
    }

    impl Drop for TempDataset {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn draw(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
        for event in [
            InputEvent::PointerPressed {
                button: MouseButton::Left,
                position: Point::new(from.0, from.1),
            },
            InputEvent::PointerMoved {
                position: Point::new(to.0, to.1),
            },
            InputEvent::PointerReleased {
                button: MouseButton::Left,
                position: Point::new(to.0, to.1),
            },
        ] {
            canvas.handle_event(&event);
        }
    }

    fn annotating_canvas() -> Canvas {
        let mut canvas = Canvas::new();
        canvas.set_mode(Mode::Annotate);
        canvas.set_current_class_id(1);
        canvas
    }

    #[test]
    fn test_open_scans_sorted_images() {
        let ds = TempDataset::new("scan");
        ds.image("b.png", 4, 4);
        ds.image("a.PNG", 4, 4);
        ds.file("a.txt", "0 0.5 0.5 0.5 0.5\n");
        ds.file("notes.md", "not an image");
        ds.file("b.txt", "");

        let repo = DatasetRepository::open(&ds.dir).unwrap();
        let names: Vec<_> = repo
            .images()
            .iter()
            .map(|r| r.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
        assert!(repo.images()[0].labelled);
        assert!(!repo.images()[1].labelled);
    }

    #[test]
    fn test_open_errors() {
        let ds = TempDataset::new("empty");
        ds.file("readme.txt", "hello");
        assert!(matches!(
            DatasetRepository::open(&ds.dir),
            Err(DatasetError::NoImages(_))
        ));
        assert!(matches!(
            DatasetRepository::open(ds.dir.join("missing")),
            Err(DatasetError::Io { .. })
        ));
    }

    #[test]
    fn test_switch_loads_label_file() {
        let ds = TempDataset::new("switch");
        ds.image("img.png", 1000, 500);
        ds.file("img.txt", "2 0.200000 0.300000 0.200000 0.200000\n");

        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = Canvas::new();
        let displayed = repo.switch_image(0, &mut canvas).unwrap();

        assert!(matches!(
            displayed,
            Displayed::Shown {
                width: 1000,
                height: 500,
                box_count: 1,
                label_error: None
            }
        ));
        let bbox = canvas.bounding_boxes()[0];
        assert_eq!(bbox.class_id, 2);
        assert!((bbox.rect.x - 100.0).abs() < 1e-6);
        assert!((bbox.rect.height - 100.0).abs() < 1e-6);
        assert!(!canvas.undo());
    }

    #[test]
    fn test_switch_keeps_unsaved_edits_per_image() {
        let ds = TempDataset::new("handoff");
        ds.image("a.png", 100, 100);
        ds.image("b.png", 100, 100);

        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = annotating_canvas();

        repo.switch_image(0, &mut canvas).unwrap();
        draw(&mut canvas, (10.0, 10.0), (20.0, 20.0));

        repo.switch_image(1, &mut canvas).unwrap();
        assert!(canvas.bounding_boxes().is_empty());
        draw(&mut canvas, (30.0, 30.0), (50.0, 50.0));
        draw(&mut canvas, (60.0, 60.0), (70.0, 70.0));

        repo.switch_image(0, &mut canvas).unwrap();
        assert_eq!(
            canvas.bounding_boxes(),
            &[BoundingBox::new(1, Rect::new(10.0, 10.0, 10.0, 10.0))]
        );
        assert_eq!(repo.images()[1].boxes().len(), 2);
        assert!(!ds.dir.join("a.txt").exists());
    }

    #[test]
    fn test_malformed_label_file_shows_no_boxes() {
        let ds = TempDataset::new("malformed");
        ds.image("img.png", 10, 10);
        ds.file("img.txt", "0 0.5 0.5 0.2 0.2\n1 bad\n");

        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = Canvas::new();
        let displayed = repo.switch_image(0, &mut canvas).unwrap();

        assert!(matches!(
            displayed,
            Displayed::Shown {
                box_count: 0,
                label_error: Some(FormatError::Parse { line: 2, .. }),
                ..
            }
        ));
        assert!(canvas.bounding_boxes().is_empty());
        assert_eq!(canvas.image_size(), Some((10, 10)));
    }

    #[test]
    fn test_save_writes_and_removes_label_file() {
        let ds = TempDataset::new("save");
        ds.image("img.png", 1000, 500);

        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = annotating_canvas();
        canvas.set_current_class_id(2);
        repo.switch_image(0, &mut canvas).unwrap();
        draw(&mut canvas, (100.0, 100.0), (300.0, 200.0));

        assert_eq!(repo.save_current(&canvas).unwrap(), SaveOutcome::Written(1));
        let label_path = ds.dir.join("img.txt");
        assert_eq!(
            std::fs::read_to_string(&label_path).unwrap(),
            "2 0.200000 0.300000 0.200000 0.200000\n"
        );
        assert!(repo.images()[0].labelled);

        repo.clear_current(&mut canvas);
        assert!(repo.images()[0].labelled);
        assert!(label_path.exists());

        assert_eq!(repo.save_current(&canvas).unwrap(), SaveOutcome::Removed);
        assert!(!label_path.exists());
        assert_eq!(repo.save_current(&canvas).unwrap(), SaveOutcome::Unchanged);
    }

    #[test]
    fn test_malformed_label_file_is_reread_once_fixed() {
        let ds = TempDataset::new("reread");
        ds.image("a.png", 10, 10);
        ds.image("b.png", 10, 10);
        ds.file("a.txt", "0 0.5 0.5 0.2 0.2\n1 bad\n");

        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = Canvas::new();
        repo.switch_image(0, &mut canvas).unwrap();
        repo.switch_image(1, &mut canvas).unwrap();

        ds.file("a.txt", "0 0.5 0.5 0.2 0.2\n");
        let displayed = repo.switch_image(0, &mut canvas).unwrap();
        assert!(matches!(
            displayed,
            Displayed::Shown {
                box_count: 1,
                label_error: None,
                ..
            }
        ));
        assert_eq!(canvas.bounding_boxes().len(), 1);
    }

    #[test]
    fn test_save_leaves_malformed_label_file_alone() {
        let ds = TempDataset::new("keep-malformed");
        ds.image("img.png", 10, 10);
        let content = "0 0.5 0.5 0.2 0.2\n1 bad\n";
        let label_path = ds.file("img.txt", content);

        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = annotating_canvas();
        repo.switch_image(0, &mut canvas).unwrap();

        assert_eq!(repo.save_current(&canvas).unwrap(), SaveOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&label_path).unwrap(), content);
        assert!(repo.images()[0].labelled);

        draw(&mut canvas, (1.0, 1.0), (5.0, 5.0));
        assert_eq!(repo.save_current(&canvas).unwrap(), SaveOutcome::Written(1));
        assert!(std::fs::read_to_string(&label_path).unwrap().starts_with("1 "));
    }

    #[test]
    fn test_undo_after_clear_restores_boxes() {
        let ds = TempDataset::new("undo-clear");
        ds.image("img.png", 100, 100);
        let label_path = ds.file("img.txt", "0 0.5 0.5 0.2 0.2\n");

        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = annotating_canvas();
        repo.switch_image(0, &mut canvas).unwrap();

        repo.clear_current(&mut canvas);
        assert!(canvas.bounding_boxes().is_empty());
        assert!(repo.images()[0].labelled);

        assert!(canvas.undo());
        assert_eq!(canvas.bounding_boxes().len(), 1);
        assert!(repo.images()[0].labelled);
        assert!(label_path.exists());

        assert_eq!(repo.save_current(&canvas).unwrap(), SaveOutcome::Written(1));
        assert!(repo.images()[0].labelled);
    }

    #[test]
    fn test_hidden_image_empties_canvas() {
        let ds = TempDataset::new("hidden");
        ds.image("img.png", 20, 20);

        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = annotating_canvas();
        repo.switch_image(0, &mut canvas).unwrap();
        draw(&mut canvas, (1.0, 1.0), (5.0, 5.0));

        let displayed = repo.set_visibility(0, false, &mut canvas).unwrap();
        assert!(matches!(displayed, Some(Displayed::Hidden)));
        assert_eq!(canvas.image_size(), None);
        assert_eq!(repo.current(), None);

        repo.set_visibility(0, true, &mut canvas).unwrap();
        assert_eq!(canvas.bounding_boxes().len(), 1);
    }

    #[test]
    fn test_unknown_index() {
        let ds = TempDataset::new("unknown");
        ds.image("img.png", 2, 2);
        let mut repo = DatasetRepository::open(&ds.dir).unwrap();
        let mut canvas = Canvas::new();

        assert!(matches!(
            repo.switch_image(5, &mut canvas),
            Err(DatasetError::UnknownImage { index: 5, len: 1 })
        ));
        assert!(repo.check_labels(1).is_err());
    }

    #[test]
    fn test_check_labels() {
        let ds = TempDataset::new("check");
        ds.image("a.png", 8, 8);
        ds.image("b.png", 8, 8);
        ds.file("a.txt", "0 0.5 0.5 0.5 0.5\n3 0.1 0.1 0.1 0.1\n");
        ds.file("b.txt", "0 0.5\n");

        let repo = DatasetRepository::open(&ds.dir).unwrap();
        assert_eq!(repo.check_labels(0).unwrap(), 2);
        assert!(matches!(
            repo.check_labels(1),
            Err(DatasetError::Format(FormatError::Parse { .. }))
        ));
    }
}
