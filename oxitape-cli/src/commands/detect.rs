//! Detect command implementation.

use oxitape_mtf::TapeFormat;
use std::fs::File;
use std::path::Path;

pub fn cmd_detect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut f = File::open(file)?;
    let (format, magic) = TapeFormat::detect(&mut f)?;

    println!("File: {}", file.display());
    println!("Format: {}", format);
    if format != TapeFormat::Unknown {
        println!("Extension: .{}", format.extension());
    }
    println!("Magic bytes: {:02X?}", &magic[..magic.len().min(16)]);

    if format.has_filemarks() {
        println!("Filemarks: recorded in the image");
    } else if format == TapeFormat::Mtf {
        println!("Filemarks: none (end of file ends the first data set)");
    }

    Ok(())
}
