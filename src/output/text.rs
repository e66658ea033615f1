//! Plain-text listings.

use std::io::{self, Write};
use std::path::PathBuf;

use bytesize::ByteSize;
use yansi::Paint;

use crate::library::LeafFolder;

use super::format_timestamp;

/// Line-oriented writer for terminals and pipes.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput {
    color: bool,
}

impl TextOutput {
    /// Create a writer; `color` enables ANSI styling.
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// One path per line.
    pub fn write_images<W: Write>(&self, mut writer: W, images: &[PathBuf]) -> io::Result<()> {
        for image in images {
            writeln!(writer, "{}", image.display())?;
        }
        Ok(())
    }

    /// `count  newest-date  path` per folder.
    pub fn write_leaves<W: Write>(&self, mut writer: W, leaves: &[LeafFolder]) -> io::Result<()> {
        let width = leaves
            .iter()
            .map(|l| l.count.to_string().len())
            .max()
            .unwrap_or(1);

        for leaf in leaves {
            let count = format!("{:>width$}", leaf.count);
            let date = format_timestamp(leaf.newest_effective_date);
            let path = leaf.path.display().to_string();
            if self.color {
                writeln!(writer, "{}  {}  {}", count.bold(), date.dim(), path.cyan())?;
            } else {
                writeln!(writer, "{}  {}  {}", count, date, path)?;
            }
        }
        Ok(())
    }

    /// Date cache location and size.
    pub fn write_cache_info<W: Write>(
        &self,
        mut writer: W,
        path: &std::path::Path,
        entries: usize,
        file_size: Option<u64>,
    ) -> io::Result<()> {
        let size = match file_size {
            Some(bytes) => ByteSize::b(bytes).to_string(),
            None => "not written yet".to_string(),
        };
        if self.color {
            writeln!(writer, "{} {}", "Date cache:".bold(), path.display())?;
        } else {
            writeln!(writer, "Date cache: {}", path.display())?;
        }
        writeln!(writer, "Entries:    {}", entries)?;
        writeln!(writer, "File size:  {}", size)
    }
}
