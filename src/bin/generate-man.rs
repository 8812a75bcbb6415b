// Writes senko.1 into the directory given as the first argument (default: man/)

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::CommandFactory;
use senko::cli::Cli;

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd.clone());
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;
    let path = out_dir.join("senko.1");
    std::fs::write(&path, buffer)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());

    for sub in cmd.get_subcommands() {
        let name = format!("senko-{}", sub.get_name());
        let man = clap_mangen::Man::new(sub.clone()).title(name.clone());
        let mut buffer: Vec<u8> = Vec::new();
        man.render(&mut buffer)?;
        let path = out_dir.join(format!("{}.1", name));
        std::fs::write(&path, buffer)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
