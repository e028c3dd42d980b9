//! Topology files: one line per net, `"<netId>: v0 h0 v1 h1 ..."`, nets in
//! netlist order.

use crate::error::TopologyError;
use crate::topology::RoutingTopology;
use crate::tree::RoutingTree;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// What a resume line must match: the net id and its pin count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetShape {
    pub net_id: i64,
    pub pins: usize,
}

pub fn parse_resume(text: &str, nets: &[NetShape]) -> Result<Vec<RoutingTopology>, TopologyError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .collect();

    if lines.len() != nets.len() {
        return Err(TopologyError::MissingNet {
            expected: nets.len(),
            found: lines.len(),
        });
    }

    let mut topologies = Vec::with_capacity(nets.len());
    for (&(line, content), shape) in lines.iter().zip(nets) {
        let (id_part, edges_part) =
            content
                .split_once(':')
                .ok_or_else(|| TopologyError::MalformedResumeLine {
                    line,
                    reason: "missing ':' after net id".to_string(),
                })?;
        let net_id: i64 = id_part
            .trim()
            .parse()
            .map_err(|_| TopologyError::MalformedResumeLine {
                line,
                reason: format!("invalid net id '{}'", id_part.trim()),
            })?;
        if net_id != shape.net_id {
            return Err(TopologyError::NetIdMismatch {
                line,
                expected: shape.net_id,
                found: net_id,
            });
        }

        let flat = edges_part
            .split_whitespace()
            .map(|tok| {
                tok.parse::<usize>()
                    .map_err(|_| TopologyError::MalformedResumeLine {
                        line,
                        reason: format!("invalid node index '{}'", tok),
                    })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let expected = 2 * shape.pins.saturating_sub(1);
        if flat.len() != expected {
            return Err(TopologyError::ResumeLengthMismatch {
                line,
                net: net_id,
                expected,
                found: flat.len(),
            });
        }
        topologies.push(RoutingTopology::from_flat(&flat)?);
    }
    Ok(topologies)
}

pub fn read_resume(path: &Path, nets: &[NetShape]) -> anyhow::Result<Vec<RoutingTopology>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read topology file {:?}", path))?;
    let topologies =
        parse_resume(&text, nets).with_context(|| format!("Invalid topology file {:?}", path))?;
    log::info!("Loaded {} topologies from {:?}", topologies.len(), path);
    Ok(topologies)
}

pub fn write_line<W: Write>(
    out: &mut W,
    net_id: i64,
    topology: &RoutingTopology,
) -> std::io::Result<()> {
    write!(out, "{}:", net_id)?;
    for idx in topology.to_flat() {
        write!(out, " {}", idx)?;
    }
    writeln!(out)
}

/// Writes one line per `(net id, topology)` pair.
pub fn write_resume<'a, W, I>(out: &mut W, entries: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (i64, &'a RoutingTopology)>,
{
    for (net_id, topology) in entries {
        write_line(out, net_id, topology)?;
    }
    Ok(())
}

pub fn save_resume<'a, I>(path: &Path, entries: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = (i64, &'a RoutingTopology)>,
{
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut out = BufWriter::new(file);
    let mut count = 0usize;
    for (net_id, topology) in entries {
        write_line(&mut out, net_id, topology)?;
        count += 1;
    }
    out.flush()?;
    log::info!("Wrote {} topologies to {:?}", count, path);
    Ok(())
}

/// `(net id, topology)` pairs of a forest, for [`write_resume`].
pub fn entries(trees: &[RoutingTree]) -> impl Iterator<Item = (i64, &RoutingTopology)> {
    trees.iter().map(|t| (t.net_id(), t.topology()))
}
