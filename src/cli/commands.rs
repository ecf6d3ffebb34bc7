//! CLI command implementations.

use std::path::Path;

use crate::engine::{Operand, OperandResolver, QueryCache, TemporalMatch, RELATIONS};
use crate::format::literal::{parse_date_time, parse_interval};
use crate::graph::Binding;
use crate::index::{PersistentTemporalIndex, Range};
use crate::types::{
    parse_node_arg, Extent, IndexConfig, Node, Record, TemporalError, TemporalResult,
};

/// Open the index rooted at `dir`.
pub fn open_index(dir: &Path, config: IndexConfig) -> TemporalResult<PersistentTemporalIndex> {
    let mut index = PersistentTemporalIndex::new(dir, config)?;
    index.open()?;
    index.register();
    Ok(index)
}

/// Read a time argument: epoch milliseconds or an `xsd:dateTime`.
pub fn parse_time_arg(arg: &str) -> TemporalResult<i64> {
    match arg.trim().parse::<i64>() {
        Ok(millis) => Ok(millis),
        Err(_) => parse_date_time(arg),
    }
}

fn record_json(record: &Record) -> serde_json::Value {
    serde_json::json!({
        "node": record.node.to_string(),
        "type": record.extent.extent_type().name(),
        "start": record.extent.start_millis(),
        "end": record.extent.end_millis(),
        "display": record.extent.to_string(),
    })
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_records(records: &[Record], json: bool) {
    if json {
        let list: Vec<_> = records.iter().map(record_json).collect();
        print_json(&serde_json::json!({ "count": records.len(), "records": list }));
    } else {
        for r in records {
            println!("{}  [{}]  {}", r.node, r.extent.extent_type().name(), r.extent);
        }
        println!("{} record(s)", records.len());
    }
}

/// Store an extent for a node.
pub fn cmd_add(
    dir: &Path,
    config: IndexConfig,
    node: &str,
    start: &str,
    end: Option<&str>,
    json: bool,
) -> TemporalResult<()> {
    let start = parse_time_arg(start)?;
    let end = match end {
        Some(e) => parse_time_arg(e)?,
        None => start,
    };
    let record = Record::new(parse_node_arg(node), Extent::from_millis(start, end)?);
    add_record(dir, config, record, json)
}

/// Store the extent described by an interval or dateTime literal.
pub fn cmd_add_literal(
    dir: &Path,
    config: IndexConfig,
    node: &str,
    literal: &str,
    json: bool,
) -> TemporalResult<()> {
    let extent = if literal.contains(',') {
        parse_interval(literal)?
    } else {
        Extent::instant(parse_date_time(literal)?)
    };
    add_record(dir, config, Record::new(parse_node_arg(node), extent), json)
}

fn add_record(dir: &Path, config: IndexConfig, record: Record, json: bool) -> TemporalResult<()> {
    let mut index = open_index(dir, config)?;
    let added = index.add(&record)?;
    if json {
        let mut value = record_json(&record);
        value["added"] = serde_json::json!(added);
        print_json(&value);
    } else if added {
        println!("Added {} -> {}", record.node, record.extent);
    } else {
        println!("Unchanged {} -> {}", record.node, record.extent);
    }
    index.close();
    Ok(())
}

/// Remove the extent stored for a node.
pub fn cmd_remove(dir: &Path, config: IndexConfig, node: &str, json: bool) -> TemporalResult<()> {
    let mut index = open_index(dir, config)?;
    let node = parse_node_arg(node);
    let removed = index.remove_node(&node)?;
    if json {
        print_json(&serde_json::json!({ "node": node.to_string(), "removed": removed }));
    } else if removed {
        println!("Removed {}", node);
    } else {
        println!("Not found: {}", node);
    }
    index.close();
    Ok(())
}

/// Look up a node.
pub fn cmd_find(dir: &Path, config: IndexConfig, node: &str, json: bool) -> TemporalResult<()> {
    let index = open_index(dir, config)?;
    let node = parse_node_arg(node);
    match index.find(&node)? {
        Some(record) => print_records(&[record], json),
        None => {
            if json {
                print_json(&serde_json::json!({ "node": node.to_string(), "found": false }));
            } else {
                println!("Not found: {}", node);
            }
        }
    }
    Ok(())
}

/// List records, optionally restricted to a box.
pub fn cmd_scan(
    dir: &Path,
    config: IndexConfig,
    range: Option<Range>,
    limit: usize,
    json: bool,
) -> TemporalResult<()> {
    let index = open_index(dir, config)?;
    let scan = match range {
        Some(r) => index.range_query(r, crate::types::ExtentType::Any)?,
        None => index.iterator()?,
    };
    let records = scan.take(limit).collect::<TemporalResult<Vec<_>>>()?;
    print_records(&records, json);
    Ok(())
}

fn resolve_bound(
    index: &PersistentTemporalIndex,
    node: &str,
    cache: &mut QueryCache,
) -> TemporalResult<Operand> {
    let node = parse_node_arg(node);
    let op = OperandResolver::new(index).resolve(&node, &Binding::new(), cache)?;
    if !op.is_bound() {
        return Err(TemporalError::InvalidArgument(format!(
            "{} has no stored extent",
            node
        )));
    }
    Ok(op)
}

/// Evaluate a relation with one side fixed to a stored node.
///
/// By default `node` is the second argument and matches are the first;
/// `inverse` fixes the first argument instead.
pub fn cmd_query(
    dir: &Path,
    config: IndexConfig,
    relation: &str,
    node: &str,
    inverse: bool,
    limit: usize,
    json: bool,
) -> TemporalResult<()> {
    let index = open_index(dir, config)?;
    let operator = index.operator(relation)?;
    let mut cache = QueryCache::new();
    let bound = resolve_bound(&index, node, &mut cache)?;
    let free = Operand::new(Node::var("match"));

    let matches = if inverse {
        operator.evaluate(&bound, &free)?
    } else {
        operator.evaluate(&free, &bound)?
    };
    let matches: Vec<TemporalMatch> = matches.take(limit).collect::<TemporalResult<_>>()?;
    let records: Vec<Record> = matches
        .into_iter()
        .map(|m| if inverse { m.second } else { m.first })
        .collect();

    if json {
        let list: Vec<_> = records.iter().map(record_json).collect();
        print_json(&serde_json::json!({
            "relation": operator.relation().name,
            "bound": bound.node().to_string(),
            "inverse": inverse,
            "count": records.len(),
            "matches": list,
        }));
    } else {
        println!(
            "{} {} {}:",
            if inverse { bound.node().to_string() } else { "?match".to_string() },
            operator.relation().name,
            if inverse { "?match".to_string() } else { bound.node().to_string() },
        );
        print_records(&records, false);
    }
    Ok(())
}

/// Print the optimizer estimate for a relation with one or no side bound.
pub fn cmd_estimate(
    dir: &Path,
    config: IndexConfig,
    relation: &str,
    node: Option<&str>,
    inverse: bool,
    json: bool,
) -> TemporalResult<()> {
    let index = open_index(dir, config)?;
    let operator = index.operator(relation)?;
    let mut cache = QueryCache::new();
    let estimate = match node {
        Some(n) => {
            let bound = resolve_bound(&index, n, &mut cache)?;
            if inverse {
                operator.estimate(bound.extent(), None)?
            } else {
                operator.estimate(None, bound.extent())?
            }
        }
        None => operator.estimate(None, None)?,
    };
    if json {
        print_json(&serde_json::json!({
            "relation": operator.relation().name,
            "estimate": estimate,
        }));
    } else {
        println!("Estimate for {}: {}", operator.relation().name, estimate);
    }
    Ok(())
}

/// Size and bounds.
pub fn cmd_stats(dir: &Path, config: IndexConfig, json: bool) -> TemporalResult<()> {
    let index = open_index(dir, config)?;
    let stats = index.stats();
    if json {
        print_json(&serde_json::to_value(&stats).unwrap_or_default());
    } else {
        println!("Path: {}", stats.path);
        println!("Records: {}", stats.size);
        match stats.bounds {
            Some(b) => {
                println!("Start: {} .. {}", b.min_start, b.max_start);
                println!("End: {} .. {}", b.min_end, b.max_end);
            }
            None => println!("Bounds: (empty)"),
        }
    }
    Ok(())
}

/// Remove all records.
pub fn cmd_clear(dir: &Path, config: IndexConfig) -> TemporalResult<()> {
    let mut index = open_index(dir, config)?;
    index.clear()?;
    index.close();
    println!("Cleared {}", index.path().display());
    Ok(())
}

/// Remove the on-disk index.
pub fn cmd_delete(dir: &Path, config: IndexConfig) -> TemporalResult<()> {
    let mut index = PersistentTemporalIndex::new(dir, config)?;
    index.delete()?;
    println!("Deleted {}", index.path().display());
    Ok(())
}

/// List the supported relations.
pub fn cmd_relations(json: bool) -> TemporalResult<()> {
    if json {
        let list: Vec<_> = RELATIONS
            .iter()
            .map(|r| {
                serde_json::json!({
                    "name": r.name,
                    "iri": r.iri(),
                    "domain": r.domain.name(),
                    "range": r.range.name(),
                    "inverse": r.inverse,
                })
            })
            .collect();
        print_json(&serde_json::json!(list));
    } else {
        for r in RELATIONS {
            println!(
                "{:<24} ({}, {})  inverse: {}",
                r.name,
                r.domain.name(),
                r.range.name(),
                r.inverse
            );
        }
    }
    Ok(())
}
