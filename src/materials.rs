//! Material catalog and symmetry classes as the backend names them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Crystal symmetry class. The discriminant is the index the backend uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum Symmetry {
    #[default]
    Triclinic = 0,
    Monoclinic = 1,
    Orthorhombic = 2,
    Tetragonal = 3,
    Hexagonal = 4,
    Cubic = 5,
    Isotropic = 6,
}

impl Symmetry {
    pub fn all() -> &'static [Symmetry] {
        &[
            Symmetry::Triclinic,
            Symmetry::Monoclinic,
            Symmetry::Orthorhombic,
            Symmetry::Tetragonal,
            Symmetry::Hexagonal,
            Symmetry::Cubic,
            Symmetry::Isotropic,
        ]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Symmetry::Triclinic => "Triclinic",
            Symmetry::Monoclinic => "Monoclinic",
            Symmetry::Orthorhombic => "Orthorhombic",
            Symmetry::Tetragonal => "Tetragonal",
            Symmetry::Hexagonal => "Hexagonal",
            Symmetry::Cubic => "Cubic",
            Symmetry::Isotropic => "Isotropic",
        }
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Material shown when nothing else is configured.
pub const DEFAULT_MATERIAL: &str = "Si (silicio)";

/// Named materials the backend has constants for, with their symmetry class.
pub const CATALOG: &[(&str, Symmetry)] = &[
    ("Ag (plata)", Symmetry::Cubic),
    ("Al (aluminio)", Symmetry::Cubic),
    ("Au (oro)", Symmetry::Cubic),
    ("Cu (cobre)", Symmetry::Cubic),
    ("Ir (iridio)", Symmetry::Cubic),
    ("Ni (níquel)", Symmetry::Cubic),
    ("Pb (plomo)", Symmetry::Cubic),
    ("Pd (paladio)", Symmetry::Cubic),
    ("Pt (platino)", Symmetry::Cubic),
    ("Cr (cromo)", Symmetry::Cubic),
    ("Fe (hierro)", Symmetry::Cubic),
    ("K (potasio)", Symmetry::Cubic),
    ("Li (litio)", Symmetry::Cubic),
    ("Mo (molibdeno)", Symmetry::Cubic),
    ("Na (sodio)", Symmetry::Cubic),
    ("NaCl (sal)", Symmetry::Cubic),
    ("Nb (niobio)", Symmetry::Cubic),
    ("Ta (tantalio)", Symmetry::Cubic),
    ("V (vanadio)", Symmetry::Cubic),
    ("W (wolframio/tungsteno)", Symmetry::Cubic),
    ("C (grafito)", Symmetry::Hexagonal),
    ("C (diamante)", Symmetry::Cubic),
    ("Ge (germanio)", Symmetry::Cubic),
    ("Si (silicio)", Symmetry::Cubic),
    ("GaAs (arseniuro de galio)", Symmetry::Cubic),
    ("GaP (fosfuro de galio)", Symmetry::Cubic),
    ("InP (fosfuro de indio)", Symmetry::Cubic),
    ("KCl (cloruro de potasio)", Symmetry::Cubic),
    ("LiF (fluoruro de litio)", Symmetry::Cubic),
    ("MgO (óxido de magnesio)", Symmetry::Cubic),
    ("Ti (titanio)", Symmetry::Hexagonal),
    ("TiC (carburo de titanio)", Symmetry::Cubic),
    ("Be (berilio)", Symmetry::Hexagonal),
    ("Cd (cadmio)", Symmetry::Hexagonal),
    ("Co (cobalto)", Symmetry::Hexagonal),
    ("Hf (hafnio)", Symmetry::Hexagonal),
    ("Mg (magnesio)", Symmetry::Hexagonal),
    ("Re (renio)", Symmetry::Hexagonal),
    ("Zn (zinc)", Symmetry::Hexagonal),
    ("ZnO (óxido de zinc)", Symmetry::Hexagonal),
    ("Zr (zirconio)", Symmetry::Hexagonal),
];

/// Catalog names in picker order: grouped by symmetry class, alphabetical within a group.
pub fn picker_order() -> Vec<&'static str> {
    let mut entries: Vec<(Symmetry, &'static str)> = CATALOG.iter().map(|&(name, s)| (s, name)).collect();
    entries.sort_by(|a, b| a.0.index().cmp(&b.0.index()).then(a.1.cmp(b.1)));
    entries.into_iter().map(|(_, name)| name).collect()
}

pub fn symmetry_of(name: &str) -> Option<Symmetry> {
    CATALOG.iter().find(|(n, _)| *n == name).map(|&(_, s)| s)
}

/// Neighbor of `current` in picker order; `step` of 1 moves forward, -1 back.
/// Without a current material the walk starts at either end.
pub fn step_material(current: Option<&str>, step: isize) -> &'static str {
    let order = picker_order();
    let len = order.len() as isize;
    let position = current.and_then(|name| order.iter().position(|n| *n == name));
    let next = match position {
        Some(i) => (i as isize + step).rem_euclid(len),
        None if step < 0 => len - 1,
        None => 0,
    };
    order[next as usize]
}
