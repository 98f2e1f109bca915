//! Input loading: titles come from repeated `--title` flags, a CSV file, or
//! both. A CSV row is `title[,target_price]`; a plain one-title-per-line
//! text file is valid single-column CSV and accepted unchanged. Malformed
//! rows are fatal-input errors surfaced to the caller, never panics.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::model::TitleQuery;

pub fn load_queries(titles: &[String], input: Option<&Path>) -> Result<Vec<TitleQuery>> {
    let mut queries: Vec<TitleQuery> = titles.iter().map(|t| TitleQuery::new(t.clone())).collect();

    if let Some(path) = input {
        let file = File::open(path)
            .with_context(|| format!("couldn't open input file {}", path.display()))?;
        queries
            .extend(parse_csv(file).with_context(|| format!("in input file {}", path.display()))?);
    }

    if queries.is_empty() {
        bail!("no titles given; pass --title or --input");
    }
    Ok(queries)
}

fn parse_csv<R: Read>(reader: R) -> Result<Vec<TitleQuery>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut queries = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let line = i + 1;
        let record = record.with_context(|| format!("malformed CSV record at line {line}"))?;

        let name = record.get(0).unwrap_or_default();
        if name.is_empty() {
            bail!("empty title at line {line}");
        }

        let target = match record.get(1) {
            None | Some("") => None,
            Some(raw) => {
                let t: f64 = raw
                    .parse()
                    .with_context(|| format!("invalid target price {raw:?} at line {line}"))?;
                if t < 0.0 {
                    bail!("negative target price {raw:?} at line {line}");
                }
                Some(t)
            }
        };

        queries.push(TitleQuery {
            name: name.to_string(),
            target,
        });
    }
    Ok(queries)
}
