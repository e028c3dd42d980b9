use crate::db::capacity::CapacityMatrix;
use crate::db::core::{NetlistDB, Pin};
use crate::geom::point::Point;
use anyhow::{Context, Result, anyhow, bail};
use std::str::FromStr;

/// Reads a netlist file (`HCAP`/`VCAP` capacity sections and `NET`
/// records) into `db`.
pub fn parse(db: &mut NetlistDB, filename: &str) -> Result<()> {
    log::info!("Parsing netlist: {}", filename);
    let text = std::fs::read_to_string(filename)
        .with_context(|| format!("Failed to open netlist file: {}", filename))?;
    parse_str(db, &text).with_context(|| format!("Invalid netlist '{}'", filename))
}

pub fn parse_str(db: &mut NetlistDB, text: &str) -> Result<()> {
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        let header = line.to_ascii_uppercase();
        let parts: Vec<&str> = header.split_whitespace().collect();

        if parts.is_empty() {
            i += 1;
            continue;
        }

        if parts[0].starts_with("HCAP") || parts[0].starts_with("VCAP") {
            let (matrix, consumed) = parse_capacity(&lines, i)?;
            log::info!(
                "{}: {} rows x {} cols",
                parts[0],
                matrix.rows(),
                matrix.cols()
            );
            if parts[0].starts_with("HCAP") {
                db.h_capacity = Some(matrix);
            } else {
                db.v_capacity = Some(matrix);
            }
            i += consumed;
        } else if parts[0].starts_with("NET") {
            i += parse_net(db, &lines, i)?;
        } else {
            log::warn!("Skipping unknown line {}: {}", i + 1, line);
            i += 1;
        }
    }

    if db.h_capacity.is_none() {
        bail!("HCAP section not found");
    }
    if db.v_capacity.is_none() {
        bail!("VCAP section not found");
    }

    log::info!(
        "Netlist: {} nets, {} pins, {} cells",
        db.num_nets(),
        db.num_pins(),
        db.num_cells()
    );
    Ok(())
}

fn token<T: FromStr>(parts: &[&str], idx: usize, what: &str, line_no: usize) -> Result<T> {
    let raw = parts
        .get(idx)
        .ok_or_else(|| anyhow!("line {}: missing {}", line_no, what))?;
    raw.parse::<T>()
        .map_err(|_| anyhow!("line {}: invalid {} '{}'", line_no, what, raw))
}

/// Parses a capacity section starting at `start`, returning the matrix and
/// the number of lines consumed (header included).
fn parse_capacity(lines: &[&str], start: usize) -> Result<(CapacityMatrix, usize)> {
    let parts: Vec<&str> = lines[start].split_whitespace().collect();
    let rows: usize = token(&parts, 1, "row count", start + 1)?;
    let cols: usize = token(&parts, 2, "column count", start + 1)?;

    let mut matrix = CapacityMatrix::new(rows, cols);
    for y in 0..rows {
        let line_idx = start + 1 + y;
        let line = lines
            .get(line_idx)
            .ok_or_else(|| anyhow!("capacity section truncated after {} of {} rows", y, rows))?;
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() != cols {
            bail!(
                "line {}: expected {} capacity values, found {}",
                line_idx + 1,
                cols,
                values.len()
            );
        }
        for (x, v) in values.iter().enumerate() {
            let cap: i32 = v
                .parse()
                .map_err(|_| anyhow!("line {}: invalid capacity '{}'", line_idx + 1, v))?;
            matrix.set(y, x, cap);
        }
    }
    Ok((matrix, rows + 1))
}

/// `NET <id> <name> <pinCount> ... [driverIndex]` followed by one line per
/// pin: `ID X Y IS_DRIVER ARRIVAL_TIME SLACK CELL_ID IS_SEQUENTIAL PIN_NAME CELL_NAME`.
fn parse_net(db: &mut NetlistDB, lines: &[&str], start: usize) -> Result<usize> {
    let line_no = start + 1;
    let parts: Vec<&str> = lines[start].split_whitespace().collect();
    let net_id: i64 = token(&parts, 1, "net id", line_no)?;
    let num_pins: usize = token(&parts, 3, "pin count", line_no)?;
    let declared_driver = if parts.len() > 5 {
        Some(token::<usize>(&parts, 5, "driver index", line_no)?)
    } else {
        None
    };
    let name = parts.get(2).map_or_else(String::new, |s| s.to_string());

    let net = db
        .add_net(net_id, name, declared_driver)
        .with_context(|| format!("line {}", line_no))?;
    let mut driver = None;

    for j in 0..num_pins {
        let idx = start + 1 + j;
        let line_no = idx + 1;
        let line = lines
            .get(idx)
            .ok_or_else(|| anyhow!("net {}: expected {} pins, found {}", net_id, num_pins, j))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 10 {
            bail!(
                "line {}: pin record needs 10 fields, found {}",
                line_no,
                tokens.len()
            );
        }

        let cell_id: i64 = token(&tokens, 6, "cell id", line_no)?;
        let is_sequential = tokens[7] == "1";
        let cell = db.get_or_create_cell(cell_id, tokens[9], is_sequential);

        let pin = Pin {
            id: token(&tokens, 0, "pin id", line_no)?,
            index_in_net: j,
            position: Point::new(
                token(&tokens, 1, "x", line_no)?,
                token(&tokens, 2, "y", line_no)?,
            ),
            is_driver: tokens[3] == "1",
            arrival_time: token(&tokens, 4, "arrival time", line_no)?,
            slack: token(&tokens, 5, "slack", line_no)?,
            net_id,
            cell_id,
            pin_name: tokens[8].to_string(),
            cell_name: tokens[9].to_string(),
        };
        if pin.is_driver {
            driver = Some(j);
        }
        db.add_pin(net, cell, pin);
    }

    if let Some(declared) = declared_driver.filter(|&d| driver != Some(d)) {
        bail!(
            "line {}: net {} declares driver {} but the driver pin is {}",
            line_no,
            net_id,
            declared,
            driver.map_or_else(|| "missing".to_string(), |d| d.to_string())
        );
    }

    Ok(num_pins + 1)
}
