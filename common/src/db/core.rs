use crate::db::capacity::CapacityMatrix;
use crate::db::indices::*;
use crate::geom::point::Point;
use anyhow::{Result, bail};
use std::collections::HashMap;

/// Pin id used for Steiner placeholder nodes, which have no netlist pin.
pub const STEINER_PIN_ID: i64 = -1;

/// A net terminal as read from the input file.
///
/// Ids (`id`, `net_id`, `cell_id`) are the values written in the file;
/// `index_in_net` is the pin's position inside its net and is what routing
/// topologies refer to.
#[derive(Clone, Debug, PartialEq)]
pub struct Pin {
    pub id: i64,
    pub index_in_net: usize,
    pub position: Point<i32>,
    pub arrival_time: f64,
    pub slack: f64,
    pub is_driver: bool,
    pub net_id: i64,
    pub cell_id: i64,
    pub cell_name: String,
    pub pin_name: String,
}

impl Pin {
    /// Zero-slack stand-in for a Steiner point at `position`.
    pub fn steiner(index_in_net: usize, position: Point<i32>, net_id: i64) -> Self {
        Self {
            id: STEINER_PIN_ID,
            index_in_net,
            position,
            arrival_time: 0.0,
            slack: 0.0,
            is_driver: false,
            net_id,
            cell_id: 0,
            cell_name: String::new(),
            pin_name: String::new(),
        }
    }

    pub fn is_steiner(&self) -> bool {
        self.id == STEINER_PIN_ID
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.position.y
    }
}

#[derive(Clone, Debug)]
pub struct CellData {
    pub id: i64,
    pub name: String,
    pub is_sequential: bool,
    pub fanin_pins: Vec<PinId>,
    pub fanout_pins: Vec<PinId>,
}

#[derive(Clone, Debug)]
pub struct NetData {
    pub id: i64,
    pub name: String,
    /// Driver index declared in the NET header, if any.
    pub declared_driver: Option<usize>,
    pub pins: Vec<PinId>,
}

#[derive(Debug)]
pub struct NetlistDB {
    pub pins: Vec<Pin>,
    pub cells: Vec<CellData>,
    pub nets: Vec<NetData>,

    pub h_capacity: Option<CapacityMatrix>,
    pub v_capacity: Option<CapacityMatrix>,

    pub cell_id_map: HashMap<i64, CellId>,
    pub net_id_map: HashMap<i64, NetId>,
}

impl NetlistDB {
    pub fn new() -> Self {
        Self {
            pins: Vec::with_capacity(5000),
            cells: Vec::with_capacity(1000),
            nets: Vec::with_capacity(1000),
            h_capacity: None,
            v_capacity: None,
            cell_id_map: HashMap::new(),
            net_id_map: HashMap::new(),
        }
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    pub fn num_pins(&self) -> usize {
        self.pins.len()
    }

    /// Registers a new net. Net ids are unique within a netlist.
    pub fn add_net(
        &mut self,
        id: i64,
        name: String,
        declared_driver: Option<usize>,
    ) -> Result<NetId> {
        if self.net_id_map.contains_key(&id) {
            bail!("duplicate net id {}", id);
        }
        let net = NetId::new(self.nets.len());
        self.nets.push(NetData {
            id,
            name,
            declared_driver,
            pins: Vec::new(),
        });
        self.net_id_map.insert(id, net);
        Ok(net)
    }

    /// Returns the cell with file id `id`, creating it on first sight.
    pub fn get_or_create_cell(&mut self, id: i64, name: &str, is_sequential: bool) -> CellId {
        if let Some(&cell) = self.cell_id_map.get(&id) {
            return cell;
        }
        let cell = CellId::new(self.cells.len());
        self.cells.push(CellData {
            id,
            name: name.to_string(),
            is_sequential,
            fanin_pins: Vec::new(),
            fanout_pins: Vec::new(),
        });
        self.cell_id_map.insert(id, cell);
        cell
    }

    /// Appends `pin` to `net`, fixing up its `index_in_net` and the owning
    /// cell's fan-in / fan-out lists.
    pub fn add_pin(&mut self, net: NetId, cell: CellId, mut pin: Pin) -> PinId {
        let pid = PinId::new(self.pins.len());
        pin.index_in_net = self.nets[net.index()].pins.len();

        let cell_data = &mut self.cells[cell.index()];
        if pin.is_driver {
            cell_data.fanout_pins.push(pid);
        } else {
            cell_data.fanin_pins.push(pid);
        }

        self.nets[net.index()].pins.push(pid);
        self.pins.push(pin);
        pid
    }

    pub fn net_pins(&self, net: NetId) -> Vec<Pin> {
        self.nets[net.index()]
            .pins
            .iter()
            .map(|pid| self.pins[pid.index()].clone())
            .collect()
    }

    pub fn net_points(&self, net: NetId) -> Vec<Point<i32>> {
        self.nets[net.index()]
            .pins
            .iter()
            .map(|pid| self.pins[pid.index()].position)
            .collect()
    }
}

impl Default for NetlistDB {
    fn default() -> Self {
        Self::new()
    }
}
