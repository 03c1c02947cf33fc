//! Create command implementation.

use crate::utils::{create_progress_bar, display_name, is_stdio};
use pbo_archive::{CreateOptions, collect_files, write_archive};
use pbo_core::Entry;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// Options for creating an archive.
pub struct CreateArgs<'a> {
    pub files: &'a [PathBuf],
    pub timestamps: bool,
    pub verbose: bool,
    pub progress: bool,
    pub properties: &'a [(String, String)],
}

pub fn cmd_create(archive: &Path, args: &CreateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = args
        .properties
        .iter()
        .fold(CreateOptions::new().with_timestamps(args.timestamps), |opts, (k, v)| {
            opts.with_property(k.as_str(), v.as_str())
        });

    let files = collect_files(args.files, &options)?;
    let pb = create_progress_bar(files.len() as u64, args.progress);
    let to_stdout = is_stdio(archive);

    // Names go to stderr when the archive itself is written to stdout.
    let report = |entry: &Entry| {
        if args.verbose {
            let name = display_name(entry);
            pb.suspend(|| {
                if to_stdout {
                    eprintln!("{name}");
                } else {
                    println!("{name}");
                }
            });
        }
        pb.inc(1);
    };

    if to_stdout {
        let stdout = io::stdout();
        write_archive(&files, BufWriter::new(stdout.lock()), &options, report)?;
    } else {
        let file = File::create(archive)?;
        write_archive(&files, BufWriter::new(file), &options, report)?;
    }

    pb.finish_and_clear();
    Ok(())
}
