//! List command implementation.

use crate::utils::{filter_entries, is_stdio, matches_filters, print_properties, print_table};
use glob::Pattern;
use pbo_archive::{List, ListOptions, list};
use pbo_core::{Entry, ReadLimits};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    path: String,
    size: u32,
    data_size: u32,
    offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<u32>,
}

impl EntryJson {
    fn from_entry(entry: &Entry) -> Self {
        Self {
            path: entry.host_path().display().to_string(),
            size: entry.original_size,
            data_size: entry.data_size,
            offset: entry.offset,
            timestamp: (entry.timestamp != 0).then_some(entry.timestamp),
        }
    }
}

/// JSON serializable metadata property.
#[derive(Debug, Serialize, Deserialize)]
struct PropertyJson {
    key: String,
    value: String,
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archive: String,
    properties: Vec<PropertyJson>,
    entries: Vec<EntryJson>,
}

/// Options for listing archive contents.
pub struct ListArgs<'a> {
    pub verbose: bool,
    pub json: bool,
    pub include: &'a [Pattern],
    pub exclude: &'a [Pattern],
    pub limits: ReadLimits,
}

pub fn cmd_list(archive: &Path, args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = ListOptions::default().with_limits(args.limits);
    let listing = if is_stdio(archive) {
        list(BufReader::new(io::stdin().lock()), &options)?
    } else {
        list(BufReader::new(File::open(archive)?), &options)?
    };

    if args.json {
        return print_json(archive, &listing, args);
    }

    if args.verbose {
        print_properties(listing.properties());
        print_table(&filter_entries(listing.entries(), args.include, args.exclude));
        return Ok(());
    }

    for path in listing {
        let name = path.display().to_string();
        if matches_filters(&name, args.include, args.exclude) {
            println!("{name}");
        }
    }
    Ok(())
}

fn print_json(
    archive: &Path,
    listing: &List,
    args: &ListArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = ArchiveListJson {
        archive: archive.display().to_string(),
        properties: listing
            .properties()
            .iter()
            .map(|p| PropertyJson {
                key: p.key_lossy().into_owned(),
                value: p.value_lossy().into_owned(),
            })
            .collect(),
        entries: filter_entries(listing.entries(), args.include, args.exclude)
            .into_iter()
            .map(EntryJson::from_entry)
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
