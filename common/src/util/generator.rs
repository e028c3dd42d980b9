use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};

#[derive(Clone, Debug)]
pub struct BenchmarkParams {
    pub grid_width: usize,
    pub grid_height: usize,
    pub num_nets: usize,
    pub max_pins_per_net: usize,
    pub min_capacity: i32,
    pub max_capacity: i32,
    /// Slack spread in seconds; sink slacks are drawn from `[-spread, spread]`.
    pub slack_spread: f64,
    pub seed: u64,
}

impl Default for BenchmarkParams {
    fn default() -> Self {
        Self {
            grid_width: 64,
            grid_height: 64,
            num_nets: 500,
            max_pins_per_net: 8,
            min_capacity: 2,
            max_capacity: 6,
            slack_spread: 5e-11,
            seed: 1,
        }
    }
}

pub fn generate_random_netlist(filename: &str, params: &BenchmarkParams) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut out = BufWriter::new(file);
    write_random_netlist(&mut out, params)?;
    out.flush()
}

/// Writes a random benchmark in the netlist format: both capacity matrices
/// followed by `num_nets` nets, each with exactly one driver.
pub fn write_random_netlist<W: Write>(out: &mut W, params: &BenchmarkParams) -> std::io::Result<()> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let nx = params.grid_width.max(1);
    let ny = params.grid_height.max(1);
    let cap_lo = params.min_capacity.min(params.max_capacity);
    let cap_hi = params.max_capacity.max(params.min_capacity);

    log::info!(
        "Generating benchmark: {}x{} grid, {} nets, <= {} pins/net (seed {})",
        nx,
        ny,
        params.num_nets,
        params.max_pins_per_net,
        params.seed
    );

    for tag in ["HCAP", "VCAP"] {
        writeln!(out, "{} {} {}", tag, ny, nx)?;
        for _ in 0..ny {
            let row: Vec<String> = (0..nx)
                .map(|_| rng.gen_range(cap_lo..=cap_hi).to_string())
                .collect();
            writeln!(out, "{}", row.join(" "))?;
        }
    }

    let max_pins = params.max_pins_per_net.max(2);
    let num_cells = (params.num_nets * 2).max(1);
    let mut pin_id = 0usize;

    for net in 0..params.num_nets {
        let num_pins = rng.gen_range(2..=max_pins);
        let driver = rng.gen_range(0..num_pins);
        writeln!(out, "NET {} n{} {} DRIVER {}", net, net, num_pins, driver)?;

        let sink_slacks: Vec<f64> = (0..num_pins)
            .map(|_| rng.gen_range(-params.slack_spread..=params.slack_spread))
            .collect();
        let driver_slack = sink_slacks
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != driver)
            .map(|(_, &s)| s)
            .fold(f64::INFINITY, f64::min);

        for (i, &sink_slack) in sink_slacks.iter().enumerate() {
            let x = rng.gen_range(0..nx);
            let y = rng.gen_range(0..ny);
            let cell = rng.gen_range(0..num_cells);
            let is_driver = i == driver;
            let slack = if is_driver { driver_slack } else { sink_slack };
            let arrival: f64 = rng.gen_range(0.0..2e-10);
            writeln!(
                out,
                "{} {} {} {} {:e} {:e} {} {} {} c{}",
                pin_id,
                x,
                y,
                is_driver as u8,
                arrival,
                slack,
                cell,
                rng.gen_bool(0.2) as u8,
                if is_driver { "Q" } else { "D" },
                cell
            )?;
            pin_id += 1;
        }
    }
    Ok(())
}
