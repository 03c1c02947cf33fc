//! Extract command implementation.

use crate::utils::{create_progress_bar, display_name, filter_entries, is_stdio, matches_filters};
use glob::Pattern;
use pbo_archive::{ExtractOptions, PboReader, extract_entries};
use pbo_core::ReadLimits;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Options for extracting an archive.
pub struct ExtractArgs<'a> {
    pub directory: &'a Path,
    pub timestamps: bool,
    pub verbose: bool,
    pub progress: bool,
    pub include: &'a [Pattern],
    pub exclude: &'a [Pattern],
    pub limits: ReadLimits,
}

pub fn cmd_extract(archive: &Path, args: &ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = ExtractOptions::new()
        .with_timestamps(args.timestamps)
        .with_limits(args.limits);

    if is_stdio(archive) {
        // Bodies are located by seeking, so standard input is buffered first.
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        run_extract(Cursor::new(data), args, &options)
    } else {
        let file = File::open(archive)?;
        run_extract(BufReader::new(file), args, &options)
    }
}

fn run_extract<R: Read + Seek>(
    reader: R,
    args: &ExtractArgs,
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pbo = PboReader::with_limits(reader, options.limits)?;
    let selected = filter_entries(pbo.entries(), args.include, args.exclude).len();
    let pb = create_progress_bar(selected as u64, args.progress);

    let count = extract_entries(&mut pbo, args.directory, options, |entry, _target| {
        let name = display_name(entry);
        if !matches_filters(&name, args.include, args.exclude) {
            return false;
        }
        if args.verbose {
            pb.suspend(|| println!("{name}"));
        }
        pb.inc(1);
        true
    })?;

    pb.finish_and_clear();
    if args.verbose {
        println!(
            "\nExtracted {} files to {}",
            count,
            args.directory.display()
        );
    }
    Ok(())
}
