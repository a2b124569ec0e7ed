//! Build directory layout and the sink writing accepted items into it

use crate::catalog::selection::Selection;
use crate::generation::executor::{GeneratedItem, ItemSink};
use crate::io::animation::GifExporter;
use crate::io::error::{GenerationError, Result, file_system};
use crate::io::metadata::MetadataWriter;
use crate::io::progress::ProgressManager;
use crate::io::render::Renderer;
use std::path::{Path, PathBuf};

/// Output directories of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Root of the build output
    pub root: PathBuf,
    /// Rendered PNG images
    pub images: PathBuf,
    /// Per-edition metadata and the index file
    pub json: PathBuf,
    /// Layer-by-layer animations, when enabled
    pub gifs: Option<PathBuf>,
}

impl BuildLayout {
    /// Describe the layout under `root`
    pub fn new(root: &Path, with_gifs: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            images: root.join("images"),
            json: root.join("json"),
            gifs: with_gifs.then(|| root.join("gifs")),
        }
    }

    /// Remove any previous build under the root and create fresh directories
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be removed or created
    pub fn prepare(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)
                .map_err(file_system(&self.root, "remove previous build"))?;
        }
        for dir in [Some(&self.images), Some(&self.json), self.gifs.as_ref()]
            .into_iter()
            .flatten()
        {
            std::fs::create_dir_all(dir).map_err(file_system(dir, "create directory"))?;
        }
        Ok(())
    }

    /// Path of an edition's image
    pub fn image_path(&self, edition: u32) -> PathBuf {
        self.images.join(format!("{edition}.png"))
    }

    /// Path of an edition's animation, if animations are enabled
    pub fn gif_path(&self, edition: u32) -> Option<PathBuf> {
        self.gifs
            .as_ref()
            .map(|dir| dir.join(format!("{edition}.gif")))
    }
}

/// Renders, animates and describes every accepted item
///
/// Rendering is skipped entirely when no renderer is set, which still
/// leaves one metadata file per edition.
pub struct BuildSink<R> {
    layout: BuildLayout,
    renderer: Option<R>,
    animation: Option<GifExporter>,
    metadata: MetadataWriter,
    progress: Option<ProgressManager>,
}

impl<R: Renderer> BuildSink<R> {
    /// Create a sink writing into `layout`
    pub const fn new(
        layout: BuildLayout,
        renderer: Option<R>,
        animation: Option<GifExporter>,
        metadata: MetadataWriter,
        progress: Option<ProgressManager>,
    ) -> Self {
        Self {
            layout,
            renderer,
            animation,
            metadata,
            progress,
        }
    }

    /// Metadata written so far
    pub const fn metadata(&self) -> &MetadataWriter {
        &self.metadata
    }

    /// Write the metadata index and close the progress display
    ///
    /// # Errors
    ///
    /// Returns an error if the index file cannot be written
    pub fn finish(&self) -> Result<PathBuf> {
        if let Some(ref progress) = self.progress {
            progress.finish();
        }
        self.metadata.write_index()
    }
}

impl<R: Renderer> ItemSink for BuildSink<R> {
    fn accept(&mut self, item: &GeneratedItem, selection: &Selection<'_>) -> Result<()> {
        if let Some(ref mut renderer) = self.renderer {
            let rendered = renderer.render(selection)?;
            let image_path = self.layout.image_path(item.edition);
            rendered
                .image
                .save(&image_path)
                .map_err(|source| GenerationError::ImageExport {
                    path: image_path,
                    source,
                })?;

            if let (Some(exporter), Some(gif_path)) =
                (&self.animation, self.layout.gif_path(item.edition))
            {
                exporter.export(&rendered.frames, &gif_path)?;
            }
        }

        self.metadata.write_item(item)?;

        if let Some(ref progress) = self.progress {
            progress.record_edition(item.edition);
        }
        Ok(())
    }

    fn batch_started(&mut self, batch_index: usize, size: usize) {
        if let Some(ref mut progress) = self.progress {
            progress.start_batch(batch_index, size);
        }
    }

    fn duplicate(&mut self, _batch_index: usize, consecutive: usize) {
        if let Some(ref mut progress) = self.progress {
            progress.record_duplicate(consecutive);
        }
    }
}
