//! Query flags shared by `list` and `browse`, and their parsers.

use anyhow::{Context, Result, bail};
use clap::Args;

use geode_core::{FilterValue, QueryState, Sort};

/// Key the `--near` radius filter is stored under.
pub const RADIUS_KEY: &str = "location";

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Free-text search on the screen's primary field
    #[arg(long, short)]
    pub search: Option<String>,

    /// Substring filter on a field (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Numeric range filter; either bound may be omitted (repeatable)
    #[arg(long = "range", value_name = "KEY=MIN..MAX")]
    pub ranges: Vec<String>,

    /// Multi-choice filter (repeatable)
    #[arg(long = "choice", value_name = "KEY=A,B")]
    pub choices: Vec<String>,

    /// Only records within KM of a point
    #[arg(long, value_name = "LAT,LNG,KM")]
    pub near: Option<String>,

    /// Sort field and direction; `default` keeps server order
    #[arg(long, value_name = "FIELD[:asc|desc]")]
    pub sort: Option<Sort>,
}

impl QueryArgs {
    /// Layer the flags over a screen's starting query.
    pub fn apply(&self, mut query: QueryState) -> Result<QueryState> {
        if let Some(search) = &self.search {
            query.search_text = search.clone();
        }
        for raw in &self.filters {
            let (key, value) = parse_text(raw)?;
            query.filters.insert(key, value);
        }
        for raw in &self.ranges {
            let (key, value) = parse_range(raw)?;
            query.filters.insert(key, value);
        }
        for raw in &self.choices {
            let (key, value) = parse_choices(raw)?;
            query.filters.insert(key, value);
        }
        if let Some(raw) = &self.near {
            query.filters.insert(RADIUS_KEY.to_string(), parse_near(raw)?);
        }
        if let Some(sort) = &self.sort {
            query.sort = Some(sort.clone());
        }
        Ok(query)
    }
}

fn split_key(raw: &str) -> Result<(String, &str)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Missing filter key in '{}'", raw);
    }
    Ok((key.to_string(), value.trim()))
}

/// `KEY=VALUE`
pub fn parse_text(raw: &str) -> Result<(String, FilterValue)> {
    let (key, value) = split_key(raw)?;
    Ok((key, FilterValue::text(value)))
}

/// `KEY=MIN..MAX`, `KEY=MIN..` or `KEY=..MAX`
pub fn parse_range(raw: &str) -> Result<(String, FilterValue)> {
    let (key, value) = split_key(raw)?;
    let (min, max) = value
        .split_once("..")
        .with_context(|| format!("Expected MIN..MAX, got '{}'", value))?;

    let bound = |s: &str, open: f64| -> Result<f64> {
        let s = s.trim();
        if s.is_empty() {
            Ok(open)
        } else {
            s.parse().with_context(|| format!("Invalid range bound '{}'", s))
        }
    };
    let min = bound(min, f64::NEG_INFINITY)?;
    let max = bound(max, f64::INFINITY)?;
    if min > max {
        bail!("Range minimum {} is above maximum {}", min, max);
    }
    Ok((key, FilterValue::range(min, max)))
}

/// `KEY=A,B,C`
pub fn parse_choices(raw: &str) -> Result<(String, FilterValue)> {
    let (key, value) = split_key(raw)?;
    let choices = value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty());
    Ok((key, FilterValue::choices(choices)))
}

/// `LAT,LNG,KM`
pub fn parse_near(raw: &str) -> Result<FilterValue> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Expected LAT,LNG,KM, got '{}'", raw))?;

    match parts.as_slice() {
        [lat, lng, km] if *km >= 0.0 => Ok(FilterValue::radius(*lat, *lng, *km)),
        [_, _, _] => bail!("Radius must not be negative"),
        _ => bail!("Expected LAT,LNG,KM, got '{}'", raw),
    }
}
