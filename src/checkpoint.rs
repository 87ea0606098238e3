use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use itertools::Itertools;

use crate::regret::RegretTable;

/// Maximum size, in bytes, of any one checkpoint part.
const MAX_PART_BYTES: usize = 50 * 1024 * 1024;

/// Writes `table` to `path`, splitting across `path`, `path_1`, `path_2`, ...
/// as needed to keep every part at or under [`MAX_PART_BYTES`]. Infosets are
/// sorted lexicographically before writing so the file order is stable.
pub fn save(table: &RegretTable, path: &Path) -> anyhow::Result<()> {
    save_with_part_limit(table, path, MAX_PART_BYTES)
}

/// Same as [`save`], but with the per-part byte budget as a parameter
/// instead of the fixed [`MAX_PART_BYTES`] constant, so tests can force real
/// multi-part splitting without writing a 50 MiB table.
pub fn save_with_part_limit(table: &RegretTable, path: &Path, part_limit_bytes: usize) -> anyhow::Result<()> {
    let entries = table.snapshot_sorted();
    let mut remaining = entries.into_iter().peekable();
    let mut part_index = 0usize;

    loop {
        let part_path = part_path(path, part_index);
        let file = File::create(&part_path)
            .with_context(|| format!("creating checkpoint part {part_path:?}"))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(b"REGRETS\n")
            .with_context(|| format!("writing header to {part_path:?}"))?;
        let mut written = "REGRETS\n".len();
        let mut wrote_any = false;

        while let Some((infoset, regrets)) = remaining.peek() {
            let line = format_line(infoset, regrets);
            if wrote_any && written + line.len() + 1 > part_limit_bytes {
                break;
            }
            writeln!(writer, "{line}").with_context(|| format!("writing to {part_path:?}"))?;
            written += line.len() + 1;
            wrote_any = true;
            remaining.next();
        }

        let more = remaining.peek().is_some();
        writer
            .write_all(if more { b"CONTINUED\n" } else { b"END\n" })
            .with_context(|| format!("writing trailer to {part_path:?}"))?;
        writer
            .flush()
            .with_context(|| format!("flushing {part_path:?}"))?;
        part_index += 1;
        if !more {
            break;
        }
    }
    Ok(())
}

/// Loads a regret table previously written by [`save`]. Returns an error
/// (rather than a partially populated table) on any malformed part.
pub fn load(path: &Path) -> anyhow::Result<RegretTable> {
    let table = RegretTable::new();
    let mut part_index = 0usize;

    loop {
        let part_path = part_path(path, part_index);
        let file = File::open(&part_path)
            .with_context(|| format!("opening checkpoint part {part_path:?}"))?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .transpose()
            .with_context(|| format!("reading header of {part_path:?}"))?
            .ok_or_else(|| anyhow!("checkpoint part {part_path:?} is empty"))?;
        if header != "REGRETS" {
            bail!("checkpoint part {part_path:?} has malformed header {header:?}");
        }

        let mut trailer = None;
        for line in lines {
            let line = line.with_context(|| format!("reading line from {part_path:?}"))?;
            if line == "CONTINUED" || line == "END" {
                trailer = Some(line);
                break;
            }
            let (infoset, regrets) = parse_line(&line)
                .with_context(|| format!("parsing regret line in {part_path:?}"))?;
            table.insert_raw(infoset, regrets);
        }

        match trailer.as_deref() {
            Some("END") => return Ok(table),
            Some("CONTINUED") => {
                part_index += 1;
                continue;
            }
            _ => bail!("checkpoint part {part_path:?} is missing its CONTINUED/END trailer"),
        }
    }
}

/// Attempts to load `path`; on any failure, logs once and returns an empty
/// table rather than propagating a partially populated one. This is the
/// entry point a [`crate::trainer::Trainer`] uses at startup.
pub fn load_or_empty(path: &Path) -> RegretTable {
    match load(path) {
        Ok(table) => {
            log::info!("loaded {} infosets from {:?}", table.len(), path);
            table
        }
        Err(err) => {
            log::warn!("could not load checkpoint from {path:?}: {err:#}; starting empty");
            RegretTable::new()
        }
    }
}

fn format_line(infoset: &str, regrets: &[f64]) -> String {
    format!("{}\t{}", infoset, regrets.iter().map(|r| r.to_string()).join(" "))
}

fn parse_line(line: &str) -> anyhow::Result<(String, Vec<f64>)> {
    let (infoset, rest) = line
        .split_once('\t')
        .ok_or_else(|| anyhow!("line is missing the infoset/regrets tab separator"))?;
    let regrets = rest
        .split(' ')
        .map(|s| s.parse::<f64>().with_context(|| format!("invalid regret value {s:?}")))
        .collect::<anyhow::Result<Vec<f64>>>()?;
    Ok((infoset.to_string(), regrets))
}

fn part_path(base: &Path, n: usize) -> PathBuf {
    if n == 0 {
        base.to_path_buf()
    } else {
        let mut name = base.as_os_str().to_owned();
        name.push(format!("_{n}"));
        PathBuf::from(name)
    }
}
