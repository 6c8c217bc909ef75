//! Image builder
//!
//! Writes the header, the reserved gap, both payloads and the trailing
//! padding to a sink, strictly in that order.

use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{ImageError, Result};
use crate::header::ImageHeader;
use crate::layout::ImageLayout;
use crate::utils::PAD_BYTE;

/// Default output image path
pub const DEFAULT_OUTPUT: &str = "kernel.img";

/// Paths for a single build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    /// Output image path
    pub output: PathBuf,
    /// Bootstrap payload path
    pub bootstrap: PathBuf,
    /// Kernel payload path
    pub kernel: PathBuf,
}

/// Summary of a finished build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    /// Header as written to the image
    pub header: ImageHeader,
    /// Header, gap and payload bytes
    pub bytes_written: u64,
    /// Fill bytes appended after the kernel payload
    pub padding: u64,
}

impl BuildReport {
    pub fn image_size(&self) -> u64 {
        self.bytes_written + self.padding
    }
}

/// Measure a source by seeking to its end, then rewind it
pub fn measure<S: Seek>(source: &mut S) -> io::Result<u64> {
    let len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;
    Ok(len)
}

/// Copy exactly `len` bytes from `source` to `sink`
pub fn copy_payload<R: Read, W: Write>(source: &mut R, sink: &mut W, len: u64) -> Result<()> {
    let copied = io::copy(&mut source.take(len), sink)?;
    if copied != len {
        return Err(ImageError::ShortPayload {
            expected: len,
            copied,
        });
    }
    Ok(())
}

fn write_fill<W: Write>(sink: &mut W, byte: u8, count: u64) -> io::Result<()> {
    io::copy(&mut io::repeat(byte).take(count), sink)?;
    Ok(())
}

/// Lay out both payloads in `sink`
///
/// Sources are measured here, so they may be at any position on entry.
pub fn write_image<B, K, W>(
    bootstrap: &mut B,
    kernel: &mut K,
    sink: &mut W,
) -> Result<BuildReport>
where
    B: Read + Seek,
    K: Read + Seek,
    W: Write,
{
    let bootstrap_size = measure(bootstrap)?;
    let kernel_size = measure(kernel)?;
    let layout = ImageLayout::new(bootstrap_size, kernel_size)?;
    emit(&layout, bootstrap, kernel, sink)
}

fn emit<B: Read, K: Read, W: Write>(
    layout: &ImageLayout,
    bootstrap: &mut B,
    kernel: &mut K,
    sink: &mut W,
) -> Result<BuildReport> {
    let header = layout.header();

    log::debug!("Writing header ({} bytes)", header.header_size);
    sink.write_all(&header.to_bytes())?;
    write_fill(sink, 0, layout.reserved_gap())?;

    log::debug!("Copying bootstrap to {:#x}", header.bootstrap_offset);
    copy_payload(bootstrap, sink, layout.bootstrap_size())?;

    log::debug!("Copying kernel to {:#x}", header.kernel_offset);
    copy_payload(kernel, sink, layout.kernel_size())?;

    write_fill(sink, PAD_BYTE, layout.padding())?;
    sink.flush()?;

    Ok(BuildReport {
        header,
        bytes_written: layout.data_end(),
        padding: layout.padding(),
    })
}

fn open_source(path: &Path) -> Result<(File, u64)> {
    let unavailable = |source: io::Error| ImageError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(unavailable)?;
    let len = measure(&mut file).map_err(unavailable)?;
    Ok((file, len))
}

/// Builds an image file from an [`ImageConfig`]
pub struct ImageBuilder {
    config: ImageConfig,
}

impl ImageBuilder {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Build the image
    ///
    /// Both payloads are opened before the output is created, so a missing
    /// source leaves the output untouched. A failure after that point may
    /// leave a partial image behind.
    pub fn build(&self) -> Result<BuildReport> {
        let (mut bootstrap, bootstrap_size) = open_source(&self.config.bootstrap)?;
        let (mut kernel, kernel_size) = open_source(&self.config.kernel)?;
        log::info!("  Bootstrap: {} bytes", bootstrap_size);
        log::info!("  Kernel:    {} bytes", kernel_size);

        let layout = ImageLayout::new(bootstrap_size, kernel_size)?;
        if layout.logical_sectors() != u64::from(layout.sector_count()) {
            log::debug!(
                "Header + payloads fit in {} sector(s); image spans {} with the MBR gap",
                layout.logical_sectors(),
                layout.sector_count()
            );
        }

        let out = File::create(&self.config.output).map_err(|source| {
            ImageError::SinkUnavailable {
                path: self.config.output.clone(),
                source,
            }
        })?;
        let mut sink = BufWriter::new(out);

        let report = emit(&layout, &mut bootstrap, &mut kernel, &mut sink)?;
        sink.into_inner()
            .map_err(|e| ImageError::Io(e.into_error()))?
            .sync_all()?;

        Ok(report)
    }
}
