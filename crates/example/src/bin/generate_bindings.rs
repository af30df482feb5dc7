//! Generates the C bindings and descriptor registry for the example schema.
//!
//! Writes `tlvc_addressbook.h` / `tlvc_addressbook.c` plus the
//! `registry.inc` / `registry.desc` pair into the output directory.

use std::env;
use std::fs;
use std::path::PathBuf;

use tlvc_codegen::registry::DescRegistry;
use tlvc_codegen::{generate, Result};
use tlvc_example::address_book_schema;

fn main() -> Result<()> {
    let out_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("generated"));
    fs::create_dir_all(&out_dir)?;

    let file = address_book_schema();
    generate(&file, "", &out_dir)?;

    let mut registry = DescRegistry::new();
    registry.add_file(&file);
    registry.write_to_dir(&out_dir, "registry")?;

    println!("Generated bindings in: {}", out_dir.display());
    Ok(())
}
